use board_client::{
    cache::FileCache,
    filter::PostFilter,
    post::PostView,
    remote::HttpPostService,
    store::{BoardStore, SubmitOutcome},
};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use time::{OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem, macros::format_description};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TIME_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]/[month]/[day] [hour]:[minute]");

/// Message board client. Posts are shown from the local cache when the board
/// API cannot be reached.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the board from the API and show it
    List {
        /// Only show posts created today (UTC)
        #[arg(long)]
        today: bool,
    },
    /// Show the cached board without contacting the API
    Cached {
        /// Only show posts created today (UTC)
        #[arg(long)]
        today: bool,
    },
    /// Submit a new post
    Post { author: String, message: String },
    /// Remove a post from the local cache only
    Delete { id: String },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error formatting timestamp: {0}")]
    Format(#[from] time::error::Format),
}

/// Read from `BOARD_*` environment variables.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    #[serde(default = "default_api_base")]
    api_base: String,
    #[serde(default = "default_cache_dir")]
    cache_dir: PathBuf,
}

fn default_api_base() -> String {
    "http://localhost:3000".to_owned()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".board-cache")
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "board_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn get_env() -> Result<Env, CliError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::prefixed("BOARD_").from_env().map_err(CliError::from)
}

fn date_filter(today: bool) -> PostFilter {
    if today {
        PostFilter::CreatedOn {
            date: OffsetDateTime::now_utc().date(),
            offset: UtcOffset::UTC,
        }
    } else {
        PostFilter::All
    }
}

fn print_posts(posts: &[PostView]) -> Result<(), CliError> {
    if posts.is_empty() {
        println!("No posts yet. Leave the first message!");
        return Ok(());
    }

    for post in posts {
        let badge = if post.pending { " [syncing]" } else { "" };
        println!(
            "{}  {}{badge}",
            post.created_at.format(TIME_FORMAT)?,
            post.author.get()
        );
        println!("    {}", post.message.get());
        println!("    id: {}", post.id);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    install_tracing();
    let cli = Cli::parse();
    let env = get_env()?;

    let store = BoardStore::new(
        HttpPostService::new(&env.api_base),
        FileCache::new(&env.cache_dir),
    );

    let filter = match cli.command {
        Command::List { today } => {
            store.initialize().await;
            date_filter(today)
        }
        Command::Cached { today } => date_filter(today),
        Command::Post { author, message } => {
            store.initialize().await;
            match store.submit(&author, &message).await {
                SubmitOutcome::Invalid(err) => eprintln!("Nothing posted: {err}"),
                SubmitOutcome::Confirmed(post) => eprintln!("Posted as {}", post.id),
                SubmitOutcome::Pending(local_id) => eprintln!("Kept locally as {local_id}"),
                SubmitOutcome::Discarded => {}
            }
            PostFilter::All
        }
        Command::Delete { id } => {
            if !store.delete(&id) {
                eprintln!("No post with id {id} in the cache");
            }
            PostFilter::All
        }
    };

    if let Some(advisory) = store.advisory() {
        eprintln!("{advisory}");
    }
    print_posts(&store.filtered_posts(filter))
}

use crate::record::{DbDataError, PostRecord, unix_millis};
use board_common::model::{
    Id,
    post::{Post, PostContent, PostMarker},
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info};

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] DbDataError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Clone, Debug)]
pub struct DbClient {
    pool: SqlitePool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `url`, creating the database file if it is missing.
    ///
    /// Every connection to `sqlite::memory:` opens a separate database, so
    /// in-memory urls should be used with a single connection.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        debug!(url, max_connections, "Connected to database");
        Ok(Self::new(pool))
    }

    /// Creates the posts table if it does not exist yet. Safe to run on every startup.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "
            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY NOT NULL,
                author TEXT NOT NULL,
                message TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS posts_created_at ON posts (created_at)")
            .execute(&self.pool)
            .await?;

        info!("Database schema is ready");
        Ok(())
    }

    /// All posts, newest first.
    pub async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let records = sqlx::query_as::<_, PostRecord>(
            "
            SELECT
                posts.id,
                posts.author,
                posts.message,
                posts.created_at
            FROM
                posts
            ORDER BY
                posts.created_at DESC,
                posts.rowid DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    pub async fn create_post(&self, content: &PostContent) -> Result<Post> {
        let record = PostRecord {
            id: Id::<PostMarker>::generate().into_inner(),
            author: content.author.get().to_owned(),
            message: content.message.get().to_owned(),
            created_at: unix_millis(OffsetDateTime::now_utc())?,
        };

        sqlx::query(
            "
            INSERT INTO posts (id, author, message, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(&record.id)
        .bind(&record.author)
        .bind(&record.message)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        let post = Post::try_from(record)?;
        debug!(id = %post.id, "Created post");
        Ok(post)
    }
}

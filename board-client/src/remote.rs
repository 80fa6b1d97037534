use board_common::model::post::{Post, PostContent};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request to the board API failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Board API answered with unexpected status {0}")]
    Status(StatusCode),
}

/// The persistence service as seen by the client store.
pub trait PostService {
    /// Every post, newest first.
    fn list_posts(&self) -> impl Future<Output = Result<Vec<Post>, ServiceError>>;

    fn create_post(
        &self,
        content: &PostContent,
    ) -> impl Future<Output = Result<Post, ServiceError>>;
}

#[derive(Clone, Debug)]
pub struct HttpPostService {
    client: Client,
    posts_url: String,
}

impl HttpPostService {
    /// `base_url` is the origin the API is served from, e.g. `http://localhost:3000`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            posts_url: format!("{}/api/posts", base_url.trim_end_matches('/')),
        }
    }
}

impl PostService for HttpPostService {
    async fn list_posts(&self) -> Result<Vec<Post>, ServiceError> {
        let response = self.client.get(&self.posts_url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ServiceError::Status(status));
        }

        let posts: Vec<Post> = response.json().await?;
        debug!(count = posts.len(), "Fetched posts");
        Ok(posts)
    }

    async fn create_post(&self, content: &PostContent) -> Result<Post, ServiceError> {
        let response = self
            .client
            .post(&self.posts_url)
            .json(content)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status));
        }

        Ok(response.json().await?)
    }
}

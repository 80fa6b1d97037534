use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use board_db::client::{DbClient, DbError};
use json::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::error;

mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
}

impl ServerState {
    #[must_use]
    pub fn new(db_client: DbClient) -> Self {
        Self {
            db_client: Arc::new(db_client),
        }
    }
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

/// The complete service: every route, request tracing and the shared state.
pub fn app(state: ServerState) -> Router {
    routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("The author is longer than {max} characters", max = routes::AUTHOR_MAX_LEN)]
    AuthorTooLong,
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] DbError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_) | ServerError::PathRejection(_) => StatusCode::NOT_FOUND,
            ServerError::JsonRejection(_) | ServerError::AuthorTooLong => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_) | ServerError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message sent to the caller. Internal details stay in the logs.
    fn public_message(&self) -> String {
        if self.status().is_server_error() {
            "Internal server error".to_owned()
        } else {
            self.to_string()
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
            error: self.public_message(),
        };
        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use crate::server::{ServerState, app};
    use axum::{Router, body::Body, http::Request, response::Response};
    use board_db::client::DbClient;
    use serde::de::DeserializeOwned;

    pub async fn test_app() -> Router {
        let db = DbClient::connect("sqlite::memory:", 1).await.unwrap();
        db.ensure_schema().await.unwrap();
        app(ServerState::new(db))
    }

    pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    pub async fn json_body<T: DeserializeOwned>(response: Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use crate::server::{
        ErrorResponse,
        test_util::{json_body, test_app},
    };
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = test_app().await;

        let response = app
            .oneshot(Request::get("/api/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error: ErrorResponse = json_body(response).await;
        assert_eq!(error.status, 404);
        assert!(error.error.contains("/api/nothing"));
    }
}

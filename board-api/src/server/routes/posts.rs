use crate::server::{
    Result, ServerError, ServerRouter,
    json::{Created, Json},
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use board_common::model::post::{Post, PostContent};
use board_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Width of the author column in the original board schema.
pub const AUTHOR_MAX_LEN: usize = 100;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_posts)
        .typed_post(create_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/api/posts", rejection(ServerError))]
struct PostsPath();

async fn list_posts(
    PostsPath(): PostsPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Vec<Post>>> {
    let posts = db.fetch_posts().await?;

    Ok(Json(posts))
}

async fn create_post(
    PostsPath(): PostsPath,
    State(db): State<Arc<DbClient>>,
    Json(content): Json<PostContent>,
) -> Result<Created<Post>> {
    if content.author.get().chars().count() > AUTHOR_MAX_LEN {
        return Err(ServerError::AuthorTooLong);
    }

    let post = db.create_post(&content).await?;
    info!(id = %post.id, author = post.author.get(), "Post created");

    Ok(Created(post))
}

#[cfg(test)]
mod tests {
    use crate::server::{
        ErrorResponse,
        routes::posts::AUTHOR_MAX_LEN,
        test_util::{json_body, json_request, test_app},
    };
    use axum::{body::Body, http::Request, http::StatusCode};
    use board_common::model::post::Post;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn list(app: &axum::Router) -> Vec<Post> {
        let response = app
            .clone()
            .oneshot(Request::get("/api/posts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await
    }

    #[tokio::test]
    async fn empty_board_lists_nothing() {
        let app = test_app().await;

        assert!(list(&app).await.is_empty());
    }

    #[tokio::test]
    async fn create_returns_created_post() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/posts",
                &json!({"author": "demo-user", "message": "hello"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = json_body(response).await;
        assert_eq!(body["author"], "demo-user");
        assert_eq!(body["message"], "hello");
        assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(body["createdAt"].is_string());
        assert!(body.get("pending").is_none());

        let created: Post = serde_json::from_value(body).unwrap();
        assert_eq!(list(&app).await, vec![created]);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let app = test_app().await;

        for message in ["older", "newer"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/api/posts",
                    &json!({"author": "a", "message": message}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let messages = list(&app)
            .await
            .into_iter()
            .map(|post| post.message.into_inner())
            .collect::<Vec<_>>();
        assert_eq!(messages, ["newer", "older"]);
    }

    #[tokio::test]
    async fn missing_or_empty_fields_are_rejected() {
        let app = test_app().await;

        let bodies = [
            json!({"author": "a"}),
            json!({"message": "m"}),
            json!({"author": "", "message": "m"}),
            json!({"author": "a", "message": "   "}),
            json!({}),
        ];

        for body in bodies {
            let response = app
                .clone()
                .oneshot(json_request("POST", "/api/posts", &body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");

            let error: ErrorResponse = json_body(response).await;
            assert_eq!(error.status, 400);
        }

        assert!(list(&app).await.is_empty());
    }

    #[tokio::test]
    async fn author_length_is_limited() {
        let app = test_app().await;

        let longest = "a".repeat(AUTHOR_MAX_LEN);
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/posts",
                &json!({"author": longest, "message": "m"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let too_long = "a".repeat(AUTHOR_MAX_LEN + 1);
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/posts",
                &json!({"author": too_long, "message": "m"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error: ErrorResponse = json_body(response).await;
        assert_eq!(error.status, 400);
        assert_eq!(list(&app).await.len(), 1);
    }
}

use crate::server::ServerRouter;

mod health;
mod posts;

pub use posts::AUTHOR_MAX_LEN;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .merge(posts::routes())
        .merge(health::routes())
}

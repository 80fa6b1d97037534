use crate::{
    cache::SnapshotCache,
    filter::PostFilter,
    post::{BoardPost, LocalId, PostView},
    remote::PostService,
};
use board_common::model::{
    ModelValidationError,
    post::{Post, PostContent},
};
use std::{
    fmt::{Display, Formatter},
    sync::{Mutex, MutexGuard, PoisonError},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Non-fatal problem shown alongside the (best-effort) post list.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum Advisory {
    FetchFailed,
    CreateFailed,
}

impl Display for Advisory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::FetchFailed => {
                f.write_str("Could not load posts from the server (showing cached posts)")
            }
            Advisory::CreateFailed => {
                f.write_str("Could not save the post on the server; it is kept locally")
            }
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum SubmitOutcome {
    /// Author or message was blank. Nothing changed and nothing was sent.
    Invalid(ModelValidationError),
    /// The server stored the post.
    Confirmed(Post),
    /// The server call failed; the provisional post stays in the list.
    Pending(LocalId),
    /// The store was torn down before the server answered.
    Discarded,
}

#[derive(Debug, Default)]
struct BoardState {
    posts: Vec<BoardPost>,
    advisory: Option<Advisory>,
    fetches_in_flight: usize,
}

fn lock(state: &Mutex<BoardState>) -> MutexGuard<'_, BoardState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Counts a fetch as in flight for as long as it is alive, including when the
/// fetching future is dropped before completing.
struct FetchGuard<'a>(&'a Mutex<BoardState>);

impl<'a> FetchGuard<'a> {
    fn new(state: &'a Mutex<BoardState>) -> Self {
        lock(state).fetches_in_flight += 1;
        Self(state)
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        lock(self.0).fetches_in_flight -= 1;
    }
}

/// The state lock is never held across an await.
pub struct BoardStore<S, C> {
    service: S,
    cache: C,
    state: Mutex<BoardState>,
    teardown: CancellationToken,
}

impl<S: PostService, C: SnapshotCache> BoardStore<S, C> {
    /// Creates the store with the cached snapshot as its initial list.
    ///
    /// An unreadable or corrupt cache is logged and treated as empty.
    pub fn new(service: S, cache: C) -> Self {
        let posts = cache.load().unwrap_or_else(|err| {
            error!(%err, "Failed to load post cache, starting empty");
            Vec::new()
        });
        debug!(count = posts.len(), "Loaded cached posts");

        Self {
            service,
            cache,
            state: Mutex::new(BoardState {
                posts,
                ..BoardState::default()
            }),
            teardown: CancellationToken::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        lock(&self.state)
    }

    /// Applies `update` to the post list and writes the result to the cache.
    fn update_posts(&self, update: impl FnOnce(&mut Vec<BoardPost>)) {
        let mut state = self.state();
        update(&mut state.posts);

        if let Err(err) = self.cache.save(&state.posts) {
            error!(%err, "Failed to save post cache");
        }
    }

    fn set_advisory(&self, advisory: Option<Advisory>) {
        self.state().advisory = advisory;
    }

    #[must_use]
    pub fn posts(&self) -> Vec<PostView> {
        self.state().posts.iter().map(PostView::from).collect()
    }

    #[must_use]
    pub fn filtered_posts(&self, filter: PostFilter) -> Vec<PostView> {
        filter.apply(self.posts())
    }

    #[must_use]
    pub fn advisory(&self) -> Option<Advisory> {
        self.state().advisory
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().fetches_in_flight > 0
    }

    /// Marks the store as torn down. Results of requests still in flight are
    /// dropped instead of being applied.
    pub fn teardown(&self) {
        self.teardown.cancel();
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.teardown.is_cancelled()
    }

    /// The initial fetch. The cached snapshot is already shown at this point.
    pub async fn initialize(&self) -> bool {
        self.refresh().await
    }

    /// Replaces the list with the server's. On failure the current list is
    /// kept and an advisory is set. Returns whether the server list was applied.
    pub async fn refresh(&self) -> bool {
        let result = {
            let _fetching = FetchGuard::new(&self.state);
            self.service.list_posts().await
        };

        if self.is_torn_down() {
            debug!("Store torn down, discarding fetched posts");
            return false;
        }

        match result {
            Ok(posts) => {
                debug!(count = posts.len(), "Replacing posts with server list");
                self.update_posts(|current| {
                    *current = posts.into_iter().map(BoardPost::from).collect();
                });
                self.set_advisory(None);
                true
            }
            Err(err) => {
                warn!(%err, "Fetching posts failed, falling back to cache");
                self.set_advisory(Some(Advisory::FetchFailed));
                false
            }
        }
    }

    /// Shows the post immediately as provisional, then asks the server to
    /// store it.
    pub async fn submit(&self, author: &str, message: &str) -> SubmitOutcome {
        let content = match PostContent::new(author, message) {
            Ok(content) => content,
            Err(err) => return SubmitOutcome::Invalid(err),
        };

        let local_id = LocalId::generate();
        let provisional = BoardPost::provisional(local_id.clone(), content.clone());
        self.update_posts(|posts| posts.insert(0, provisional));

        let result = self.service.create_post(&content).await;

        if self.is_torn_down() {
            debug!(%local_id, "Store torn down, discarding create result");
            return SubmitOutcome::Discarded;
        }

        match result {
            Ok(post) => {
                let confirmed = post.clone();
                self.update_posts(|posts| {
                    match posts.iter_mut().find(|entry| entry.is_provisional(&local_id)) {
                        Some(entry) => *entry = BoardPost::Confirmed(confirmed),
                        None => debug!(%local_id, "Provisional post is gone, not replacing it"),
                    }
                });
                self.set_advisory(None);
                SubmitOutcome::Confirmed(post)
            }
            Err(err) => {
                error!(%err, %local_id, "Creating post failed, keeping it locally");
                self.update_posts(|_| {});
                self.set_advisory(Some(Advisory::CreateFailed));
                SubmitOutcome::Pending(local_id)
            }
        }
    }

    /// Removes the post from the local list and cache. The server is not
    /// asked, so a later refresh brings back posts it still has.
    pub fn delete(&self, id: &str) -> bool {
        let mut removed = false;
        self.update_posts(|posts| {
            let before = posts.len();
            posts.retain(|post| post.id() != id);
            removed = posts.len() != before;
        });
        removed
    }
}

use crate::post::{BoardPost, PostView};
use board_common::model::EmptyIdError;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use thiserror::Error;

pub const CACHE_KEY: &str = "board-app-posts-cache";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache storage could not be accessed: {0}")]
    Io(#[from] io::Error),
    #[error("Cache snapshot could not be (de)serialized: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cache snapshot contains an invalid post: {0}")]
    InvalidPost(#[from] EmptyIdError),
}

pub trait SnapshotCache {
    /// The stored snapshot, or `None` if nothing was stored yet.
    fn read(&self) -> Result<Option<String>, CacheError>;

    fn write(&self, snapshot: &str) -> Result<(), CacheError>;

    fn load(&self) -> Result<Vec<BoardPost>, CacheError> {
        let Some(snapshot) = self.read()? else {
            return Ok(Vec::new());
        };

        let views: Vec<PostView> = serde_json::from_str(&snapshot)?;
        let posts = views
            .into_iter()
            .map(BoardPost::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    fn save(&self, posts: &[BoardPost]) -> Result<(), CacheError> {
        let views = posts.iter().map(PostView::from).collect::<Vec<_>>();
        self.write(&serde_json::to_string(&views)?)
    }
}

/// Stores the snapshot as `<dir>/board-app-posts-cache.json`.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{CACHE_KEY}.json")),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotCache for FileCache {
    fn read(&self) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(&self.path) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, snapshot: &str) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        // Readers only ever see a complete snapshot.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, snapshot)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    snapshot: Mutex<Option<String>>,
}

impl MemoryCache {
    #[must_use]
    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot.into())),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<String> {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SnapshotCache for MemoryCache {
    fn read(&self) -> Result<Option<String>, CacheError> {
        Ok(self.snapshot())
    }

    fn write(&self, snapshot: &str) -> Result<(), CacheError> {
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        cache::{CacheError, FileCache, MemoryCache, SnapshotCache},
        post::{BoardPost, LocalId, test_util::confirmed_post},
    };
    use board_common::model::post::PostContent;
    use time::macros::datetime;

    fn mixed_posts() -> Vec<BoardPost> {
        vec![
            BoardPost::provisional(LocalId::generate(), PostContent::new("demo-user", "still syncing").unwrap()),
            confirmed_post("2", "b", "second", datetime!(2025-10-24 10:31:00.5 UTC)).into(),
            confirmed_post("1", "a", "first", datetime!(2025-10-24 10:30 UTC)).into(),
        ]
    }

    #[test]
    fn file_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested"));
        let posts = mixed_posts();

        cache.save(&posts).unwrap();

        assert_eq!(cache.load().unwrap(), posts);
        assert!(cache.path().ends_with("board-app-posts-cache.json"));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());

        assert!(cache.load().unwrap().is_empty());
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let mut posts = mixed_posts();

        cache.save(&posts).unwrap();
        posts.truncate(1);
        cache.save(&posts).unwrap();

        assert_eq!(cache.load().unwrap(), posts);
    }

    #[test]
    fn memory_cache_round_trip() {
        let cache = MemoryCache::default();
        assert!(cache.snapshot().is_none());

        let posts = mixed_posts();
        cache.save(&posts).unwrap();

        assert_eq!(cache.load().unwrap(), posts);
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let cache = MemoryCache::with_snapshot("{not json");
        assert!(matches!(cache.load(), Err(CacheError::Json(_))));

        let cache = MemoryCache::with_snapshot(
            r#"[{"id":"","author":"a","message":"m","createdAt":"2025-10-24T10:30:00Z"}]"#,
        );
        assert!(matches!(cache.load(), Err(CacheError::InvalidPost(_))));
    }
}

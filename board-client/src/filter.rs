use crate::post::PostView;
use time::{Date, UtcOffset};

/// Selection of posts shown to the user.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub enum PostFilter {
    #[default]
    All,
    /// Posts created on `date` as seen from `offset`.
    CreatedOn { date: Date, offset: UtcOffset },
}

impl PostFilter {
    #[must_use]
    pub fn matches(self, post: &PostView) -> bool {
        match self {
            PostFilter::All => true,
            PostFilter::CreatedOn { date, offset } => post.created_at.to_offset(offset).date() == date,
        }
    }

    #[must_use]
    pub fn apply(self, posts: Vec<PostView>) -> Vec<PostView> {
        posts.into_iter().filter(|post| self.matches(post)).collect()
    }
}

use board_common::model::{
    EmptyIdError, Id,
    post::{Author, Message, Post, PostContent},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct ProvisionalMarker;

pub type LocalId = Id<ProvisionalMarker>;

/// An entry of the client's post list.
///
/// Provisional posts were submitted locally and are not (yet) known to the
/// server. They are replaced by their confirmed counterpart once the server
/// acknowledges them, matched by `local_id`.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum BoardPost {
    Provisional {
        local_id: LocalId,
        content: PostContent,
        created_at: OffsetDateTime,
    },
    Confirmed(Post),
}

impl BoardPost {
    #[must_use]
    pub fn provisional(local_id: LocalId, content: PostContent) -> Self {
        Self::Provisional {
            local_id,
            content,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Provisional { local_id, .. } => local_id.get(),
            Self::Confirmed(post) => post.id.get(),
        }
    }

    #[must_use]
    pub fn author(&self) -> &Author {
        match self {
            Self::Provisional { content, .. } => &content.author,
            Self::Confirmed(post) => &post.author,
        }
    }

    #[must_use]
    pub fn message(&self) -> &Message {
        match self {
            Self::Provisional { content, .. } => &content.message,
            Self::Confirmed(post) => &post.message,
        }
    }

    #[must_use]
    pub fn created_at(&self) -> OffsetDateTime {
        match self {
            Self::Provisional { created_at, .. } => *created_at,
            Self::Confirmed(post) => post.created_at,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Provisional { .. })
    }

    #[must_use]
    pub fn is_provisional(&self, id: &LocalId) -> bool {
        matches!(self, Self::Provisional { local_id, .. } if local_id == id)
    }

    #[must_use]
    pub fn view(&self) -> PostView {
        PostView::from(self)
    }
}

impl From<Post> for BoardPost {
    fn from(value: Post) -> Self {
        Self::Confirmed(value)
    }
}

/// Flat projection of a [`BoardPost`], used for display and as the snapshot
/// cache format.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub author: Author,
    pub message: Message,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub pending: bool,
}

impl From<&BoardPost> for PostView {
    fn from(value: &BoardPost) -> Self {
        Self {
            id: value.id().to_owned(),
            author: value.author().clone(),
            message: value.message().clone(),
            created_at: value.created_at(),
            pending: value.is_pending(),
        }
    }
}

impl TryFrom<PostView> for BoardPost {
    type Error = EmptyIdError;

    fn try_from(value: PostView) -> Result<Self, Self::Error> {
        let post = if value.pending {
            Self::Provisional {
                local_id: Id::new(value.id)?,
                content: PostContent {
                    author: value.author,
                    message: value.message,
                },
                created_at: value.created_at,
            }
        } else {
            Self::Confirmed(Post {
                id: Id::new(value.id)?,
                author: value.author,
                message: value.message,
                created_at: value.created_at,
            })
        };

        Ok(post)
    }
}


#[cfg(test)]
mod tests {
    use crate::post::{BoardPost, LocalId, PostView, test_util::confirmed_post};
    use board_common::model::post::PostContent;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn provisional_projection() {
        let post = BoardPost::provisional(LocalId::generate(), PostContent::new("a", "m").unwrap());
        let view = post.view();

        assert!(view.pending);
        assert_eq!(view.id, post.id());
        assert_eq!(view.author.get(), "a");
        assert_eq!(view.message.get(), "m");
        assert_eq!(BoardPost::try_from(view).unwrap(), post);
    }

    #[test]
    fn confirmed_projection() {
        let post = BoardPost::from(confirmed_post(
            "1",
            "a",
            "m",
            datetime!(2025-10-24 10:30 UTC),
        ));

        let view = post.view();
        assert!(!view.pending);
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "id": "1",
                "author": "a",
                "message": "m",
                "createdAt": "2025-10-24T10:30:00Z",
                "pending": false,
            })
        );
        assert_eq!(BoardPost::try_from(view).unwrap(), post);
    }

    #[test]
    fn provisional_match_is_by_local_id() {
        let post = BoardPost::provisional(LocalId::generate(), PostContent::new("a", "m").unwrap());
        let BoardPost::Provisional { local_id, .. } = &post else {
            unreachable!()
        };

        assert!(post.is_provisional(local_id));
        assert!(!post.is_provisional(&LocalId::generate()));
    }

    #[test]
    fn missing_pending_flag_means_confirmed() {
        let view: PostView = serde_json::from_value(json!({
            "id": "1",
            "author": "a",
            "message": "m",
            "createdAt": "2025-10-24T10:30:00Z",
        }))
        .unwrap();

        assert!(!view.pending);
    }
}

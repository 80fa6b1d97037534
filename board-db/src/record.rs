use board_common::model::{
    ModelValidationError,
    post::{Author, Message, Post},
};
use sqlx::FromRow;
use thiserror::Error;
use time::{OffsetDateTime, error::ComponentRange};

const NANOS_PER_MILLI: i128 = 1_000_000;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum DbDataError {
    #[error(transparent)]
    Model(#[from] ModelValidationError),
    #[error("Stored timestamp is out of range: {0}")]
    Timestamp(#[from] ComponentRange),
    #[error("Timestamp cannot be stored as milliseconds: {0}")]
    TimestampOverflow(OffsetDateTime),
}

/// Row of the `posts` table. `created_at` holds unix milliseconds.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct PostRecord {
    pub id: String,
    pub author: String,
    pub message: String,
    pub created_at: i64,
}

pub(crate) fn unix_millis(time: OffsetDateTime) -> Result<i64, DbDataError> {
    i64::try_from(time.unix_timestamp_nanos() / NANOS_PER_MILLI)
        .map_err(|_| DbDataError::TimestampOverflow(time))
}

impl TryFrom<PostRecord> for Post {
    type Error = DbDataError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        let created_at =
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(value.created_at) * NANOS_PER_MILLI)?;

        Ok(Self {
            id: value.id.try_into().map_err(ModelValidationError::from)?,
            author: Author::new(&value.author).map_err(ModelValidationError::from)?,
            message: Message::new(&value.message).map_err(ModelValidationError::from)?,
            created_at,
        })
    }
}

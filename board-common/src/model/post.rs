use crate::model::{Id, ModelValidationError};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

/// A post as stored and returned by the persistence service.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id<PostMarker>,
    pub author: Author,
    pub message: Message,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Body of a create request.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct PostContent {
    pub author: Author,
    pub message: Message,
}

impl PostContent {
    pub fn new(author: &str, message: &str) -> Result<Self, ModelValidationError> {
        Ok(Self {
            author: Author::new(author)?,
            message: Message::new(message)?,
        })
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct Author(String);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The author must not be empty")]
pub struct InvalidAuthorError;

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct Message(String);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The message must not be empty")]
pub struct InvalidMessageError;

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

impl Author {
    /// Surrounding whitespace is dropped before validating.
    pub fn new(author: &str) -> Result<Self, InvalidAuthorError> {
        trimmed(author).map(Self).ok_or(InvalidAuthorError)
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl Message {
    /// Surrounding whitespace is dropped before validating.
    pub fn new(message: &str) -> Result<Self, InvalidMessageError> {
        trimmed(message).map(Self).ok_or(InvalidMessageError)
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for Author {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Author::new(&inner).map_err(|_| Error::invalid_value(Unexpected::Str(&inner), &"Author"))
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Message::new(&inner).map_err(|_| Error::invalid_value(Unexpected::Str(&inner), &"Message"))
    }
}

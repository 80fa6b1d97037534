pub mod post;

use crate::model::post::{InvalidAuthorError, InvalidMessageError};
use derive_where::derive_where;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::{fmt::Display, marker::PhantomData};
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    Author(#[from] InvalidAuthorError),
    #[error(transparent)]
    Message(#[from] InvalidMessageError),
    #[error(transparent)]
    Id(#[from] EmptyIdError),
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Ids must not be empty")]
pub struct EmptyIdError;

/// String identifier tagged with the kind of entity it names.
///
/// Server-assigned and locally generated ids share this representation but
/// never the marker, so a provisional id cannot be passed where a confirmed one
/// is expected.
#[derive_where(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
#[derive(Serialize)]
#[serde(transparent)]
pub struct Id<Marker>(String, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyIdError> {
        let id = id.into();
        if id.is_empty() {
            Err(EmptyIdError)
        } else {
            Ok(Self(id, PhantomData))
        }
    }

    /// A fresh random (UUID v4) id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string(), PhantomData)
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

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> TryFrom<String> for Id<Marker> {
    type Error = EmptyIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de, Marker> Deserialize<'de> for Id<Marker> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Id::new(inner).map_err(|_| Error::invalid_value(Unexpected::Str(""), &"a non-empty id"))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{EmptyIdError, Id};

    struct TestMarker;

    #[test]
    fn empty_ids_are_rejected() {
        assert_eq!(Id::<TestMarker>::new(""), Err(EmptyIdError));
        assert!(serde_json::from_str::<Id<TestMarker>>(r#""""#).is_err());

        let id = serde_json::from_str::<Id<TestMarker>>(r#""1""#).unwrap();
        assert_eq!(id.get(), "1");
    }

    #[test]
    fn generated_ids_are_distinct() {
        let first = Id::<TestMarker>::generate();
        let second = Id::<TestMarker>::generate();

        assert_ne!(first, second);
        assert!(!first.get().is_empty());
    }
}

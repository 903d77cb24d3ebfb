//! Dog records and identifiers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a dog in the remote catalog.
///
/// The remote API hands out opaque string ids; this newtype keeps them from
/// being confused with names, breeds or zip codes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DogId(String);

impl DogId {
    /// Create a new dog id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DogId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DogId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for DogId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A dog record as returned by the remote API.
///
/// Records are immutable snapshots; identity is [`Dog::id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
    pub id: DogId,
    /// Absolute URL of the dog's photo.
    pub img: String,
    pub name: String,
    /// Age in years.
    pub age: u32,
    pub zip_code: String,
    pub breed: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dog_deserializes_remote_shape() {
        let json = r#"{
            "id": "NXGFTIcBOvEgQ5OCx8A1",
            "img": "https://frontend-take-home.fetch.com/dog-images/n02085620-Chihuahua/n02085620_10074.jpg",
            "name": "Emory",
            "age": 10,
            "zip_code": "48333",
            "breed": "Chihuahua"
        }"#;

        let dog: Dog = serde_json::from_str(json).unwrap();
        assert_eq!(dog.id.as_str(), "NXGFTIcBOvEgQ5OCx8A1");
        assert_eq!(dog.age, 10);
        assert_eq!(dog.zip_code, "48333");
        assert_eq!(dog.breed, "Chihuahua");
    }

    #[test]
    fn test_dog_id_is_transparent() {
        let id = DogId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        assert_eq!(id.to_string(), "abc");
    }
}

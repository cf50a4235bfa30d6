//! Domain DTOs for the bookstore API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch drift between the two crates. `Shelf` and `Book`
//! keep any fields the server adds beyond the documented ones, so comparing a
//! fetched resource against the created one stays an exact comparison.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A shelf as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shelf {
    pub id: i64,
    pub theme: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Shelf {
    pub fn new(id: i64, theme: impl Into<String>) -> Self {
        Self {
            id,
            theme: theme.into(),
            extra: Map::new(),
        }
    }

    /// The shelf as the JSON object the server sent.
    pub fn to_json(&self) -> Value {
        // Two string fields and a map of JSON values always serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A book as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: i64,
    pub shelf: i64,
    pub author: String,
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Book {
    pub fn new(id: i64, shelf: i64, author: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            shelf,
            author: author.into(),
            title: title.into(),
            extra: Map::new(),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Request payload for creating a shelf.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewShelf {
    pub theme: String,
}

impl NewShelf {
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
        }
    }
}

/// Request payload for creating a book under a shelf.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewBook {
    pub author: String,
    pub title: String,
}

impl NewBook {
    pub fn new(author: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            title: title.into(),
        }
    }
}

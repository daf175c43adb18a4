//! Core note type for notestore.
//!
//! A [`Note`] is the single record kind persisted by the store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single user-created note.
///
/// The `id` exists only so list-rendering code can tell notes apart; it carries
/// no other meaning. Two notes with the same title and description are still
/// different notes if their ids differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier, assigned at creation and never changed.
    pub id: Uuid,

    /// Headline text. May be empty.
    pub title: String,

    /// Body text. May be empty.
    pub description: String,
}

impl Note {
    /// Create a new note with a freshly generated identifier.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title, description)
    }

    /// Rebuild a note with a known identifier.
    #[must_use]
    pub fn with_id(id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Return a copy of this note with new text but the same identity.
    #[must_use]
    pub fn edited(&self, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_id(self.id, title, description)
    }

    /// Check whether two notes are the same entity, ignoring their text.
    #[must_use]
    pub fn same_identity(&self, other: &Note) -> bool {
        self.id == other.id
    }
}

//! On-disk encoding of the note collection.
//!
//! The backing file holds a single JSON array. Each element is an object with
//! exactly three string fields:
//!
//! ```json
//! [
//!   { "id": "67e55044-10b1-426f-9247-bb680e5fe0c8", "title": "...", "description": "..." }
//! ]
//! ```
//!
//! The whole array is rewritten on every persist.

use crate::error::{Error, Result};
use crate::note::Note;

/// Encode the full collection.
///
/// # Errors
///
/// Returns [`Error::Encode`] if serialization fails.
pub fn encode(notes: &[Note], pretty: bool) -> Result<Vec<u8>> {
    let mut bytes = if pretty {
        serde_json::to_vec_pretty(notes)
    } else {
        serde_json::to_vec(notes)
    }
    .map_err(Error::Encode)?;

    if pretty {
        bytes.push(b'\n');
    }
    Ok(bytes)
}

/// Decode a full collection.
///
/// # Errors
///
/// Returns the parser error if `bytes` is not a JSON array of notes.
pub fn decode(bytes: &[u8]) -> std::result::Result<Vec<Note>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

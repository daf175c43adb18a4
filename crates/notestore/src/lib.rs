//! `notestore` - A file-backed list of notes
//!
//! This library keeps an ordered collection of notes in memory, rewrites the
//! whole collection to a single JSON file after every change, and notifies
//! subscribers synchronously so a front end can re-render.
//!
//! ```no_run
//! use notestore::{Note, NoteStore};
//!
//! let mut store = NoteStore::open("notes.json")?;
//! store.subscribe(|notes| println!("{} notes", notes.len()));
//! store.create(Note::new("Groceries", "eggs, milk"))?;
//! # Ok::<(), notestore::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod note;
pub mod storage;

pub use config::{Config, FailurePolicy};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use note::Note;
pub use storage::{NoteStore, StoreStats, SubscriptionId};

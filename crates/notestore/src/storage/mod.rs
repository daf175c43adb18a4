//! Storage layer for notestore.
//!
//! This module provides [`NoteStore`], the single owner of the note
//! collection. Every mutation rewrites the whole backing file and then tells
//! registered observers about the new collection.

pub mod codec;
pub mod observer;
pub mod reorder;

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{Config, FailurePolicy};
use crate::error::{Error, LoadError, Result};
use crate::note::Note;

pub use observer::{Observer, Observers, SubscriptionId};

/// File-backed, ordered note collection.
///
/// Notes are kept newest first. The in-memory collection is the source of
/// truth; the backing file is rewritten after each mutation. Under
/// [`FailurePolicy::Lenient`] a failed write is logged and the mutation still
/// succeeds, so memory and disk can drift apart until the next good write.
///
/// A store is meant to be owned by one component and driven from one thread.
/// Mutations take `&mut self` and there is no internal locking.
#[derive(Debug)]
pub struct NoteStore {
    /// Path to the backing file.
    path: PathBuf,
    /// The collection, newest first.
    notes: Vec<Note>,
    /// How load and persist failures are handled.
    policy: FailurePolicy,
    /// Write indented JSON.
    pretty: bool,
    /// Change subscribers.
    observers: Observers,
    /// When this process last wrote the file successfully.
    last_persisted: Option<DateTime<Utc>>,
}

impl NoteStore {
    /// Read and decode a backing file.
    ///
    /// A missing file is an empty collection, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] if the file exists but cannot be read or does
    /// not hold a note collection.
    pub fn load(path: impl AsRef<Path>) -> Result<Vec<Note>> {
        let path = path.as_ref();

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No notes file at {}, starting empty", path.display());
                return Ok(Vec::new());
            }
            Err(err) => {
                return Err(Error::Load {
                    path: path.to_path_buf(),
                    source: LoadError::Read(err),
                })
            }
        };

        codec::decode(&bytes).map_err(|err| Error::Load {
            path: path.to_path_buf(),
            source: LoadError::Decode(err),
        })
    }

    /// Open the store at `path` with the lenient failure policy.
    ///
    /// # Errors
    ///
    /// Never fails under the lenient policy; the signature matches
    /// [`NoteStore::open_with`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, FailurePolicy::default())
    }

    /// Open the store at `path`.
    ///
    /// The file is read once here. If it cannot be loaded, the lenient policy
    /// starts from an empty collection; the strict policy returns the error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] under [`FailurePolicy::Strict`] if the file
    /// exists but is unreadable or malformed.
    pub fn open_with(path: impl AsRef<Path>, policy: FailurePolicy) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let notes = match Self::load(&path) {
            Ok(notes) => notes,
            Err(err) if policy.is_strict() => return Err(err),
            Err(err) => {
                warn!("{err}; starting with no notes");
                Vec::new()
            }
        };

        info!("Opened {} notes from {}", notes.len(), path.display());
        Ok(Self {
            path,
            notes,
            policy,
            pretty: true,
            observers: Observers::default(),
            last_persisted: None,
        })
    }

    /// Open the store described by `config`.
    ///
    /// # Errors
    ///
    /// See [`NoteStore::open_with`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Self::open_with(config.notes_path(), config.failure_policy())?;
        Ok(store.with_pretty(config.storage.pretty))
    }

    /// Choose between indented and compact JSON for future writes.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Get the path to the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the failure policy in effect.
    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// All notes, newest first.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Get the note at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    /// Find the current position of the note with `id`.
    #[must_use]
    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    /// Number of notes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Check if there are no notes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Register a callback that receives the collection after every change.
    ///
    /// Callbacks run synchronously, in subscription order, before the
    /// mutating call returns.
    pub fn subscribe(&mut self, observer: impl FnMut(&[Note]) + 'static) -> SubscriptionId {
        self.observers.subscribe(Box::new(observer))
    }

    /// Remove a callback. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Insert `note` at the front.
    ///
    /// # Errors
    ///
    /// Returns a storage error only under [`FailurePolicy::Strict`]. The note
    /// stays in memory either way.
    pub fn create(&mut self, note: Note) -> Result<()> {
        debug!("Creating note {}", note.id);
        self.notes.insert(0, note);
        self.commit("create")
    }

    /// Replace the note at `index`, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index` is not a position, in
    /// which case nothing changes. Storage errors as for [`NoteStore::create`].
    pub fn update(&mut self, note: Note, index: usize) -> Result<Note> {
        let len = self.notes.len();
        let slot = self
            .notes
            .get_mut(index)
            .ok_or_else(|| Error::index_out_of_range(index, len))?;

        debug!("Updating note at {index}");
        let previous = std::mem::replace(slot, note);
        self.commit("update")?;
        Ok(previous)
    }

    /// Remove the notes at `indices`, returning them in their original order.
    ///
    /// Every index refers to a position before the removal. Duplicate indices
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if any index is not a position, in
    /// which case nothing is removed. Storage errors as for
    /// [`NoteStore::create`].
    pub fn delete(&mut self, indices: impl IntoIterator<Item = usize>) -> Result<Vec<Note>> {
        let indices: BTreeSet<usize> = indices.into_iter().collect();
        let removed = reorder::remove_at(&mut self.notes, &indices)?;

        debug!("Deleted {} notes", removed.len());
        self.commit("delete")?;
        Ok(removed)
    }

    /// Move the notes at `from` as one block so it starts at position `to`.
    ///
    /// See [`reorder::move_block`] for the exact semantics and
    /// [`reorder::destination_from_offset`] to convert a list widget's drop
    /// offset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if a source index or `to` is not a
    /// valid position, in which case nothing moves. Storage errors as for
    /// [`NoteStore::create`].
    pub fn move_items(&mut self, from: impl IntoIterator<Item = usize>, to: usize) -> Result<()> {
        let from: BTreeSet<usize> = from.into_iter().collect();
        reorder::move_block(&mut self.notes, &from, to)?;

        debug!("Moved {} notes to {to}", from.len());
        self.commit("move")
    }

    /// Write the whole collection to the backing file.
    ///
    /// The data is written to a sibling temporary file first and renamed over
    /// the target, so a crash mid-write leaves the previous file intact.
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns a storage error if encoding or any file operation fails,
    /// regardless of the failure policy.
    pub fn persist(&mut self) -> Result<()> {
        let bytes = codec::encode(&self.notes, self.pretty)?;
        write_replacing(&self.path, &bytes)?;

        self.last_persisted = Some(Utc::now());
        debug!(
            "Persisted {} notes ({} bytes) to {}",
            self.notes.len(),
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Get storage statistics.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            note_count: self.notes.len(),
            file_size_bytes: std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0),
            last_persisted: self.last_persisted,
        }
    }

    /// Persist, notify, then apply the failure policy.
    ///
    /// Observers always see the in-memory collection, even when the write failed.
    fn commit(&mut self, operation: &str) -> Result<()> {
        let outcome = self.persist();
        self.observers.notify(&self.notes);

        match outcome {
            Ok(()) => Ok(()),
            Err(err) if self.policy.is_strict() => Err(err),
            Err(err) => {
                warn!("{operation} kept in memory only: {err}");
                Ok(())
            }
        }
    }
}

/// Write `bytes` to `path` through a temporary sibling file.
fn write_replacing(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let tmp_path = temp_path_for(path);
    let written = std::fs::write(&tmp_path, bytes).and_then(|()| std::fs::rename(&tmp_path, path));
    if let Err(source) = written {
        discard_temp(&tmp_path);
        return Err(Error::Persist {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// Remove a temporary file left by a failed write.
fn discard_temp(tmp_path: &Path) {
    match std::fs::remove_file(tmp_path) {
        Ok(()) => debug!("Removed {}", tmp_path.display()),
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => debug!("Could not remove {}: {err}", tmp_path.display()),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("notes"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of notes in memory.
    pub note_count: usize,
    /// Size of the backing file in bytes (0 if it does not exist yet).
    pub file_size_bytes: u64,
    /// When this process last wrote the backing file successfully.
    pub last_persisted: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tempfile::TempDir;

    use super::*;

    fn create_test_store() -> (TempDir, NoteStore) {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = NoteStore::open(dir.path().join("notes.json")).expect("failed to open store");
        (dir, store)
    }

    /// Store holding notes titled by each character of `titles`, in that order.
    fn store_with(titles: &str) -> (TempDir, NoteStore) {
        let (dir, mut store) = create_test_store();
        for title in titles.chars().rev() {
            store.create(Note::new(title.to_string(), "")).unwrap();
        }
        (dir, store)
    }

    fn titles(store: &NoteStore) -> String {
        store.notes().iter().map(|n| n.title.as_str()).collect()
    }

    /// Open a store in a fresh directory, then replace that directory with a
    /// regular file so every later write fails.
    fn open_unwritable(dir: &TempDir, policy: FailurePolicy) -> NoteStore {
        crate::logging::init_test_logging();
        let parent = dir.path().join("data");
        let store = NoteStore::open_with(parent.join("notes.json"), policy).unwrap();
        std::fs::write(&parent, b"").unwrap();
        store
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let (_dir, store) = create_test_store();
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let notes = NoteStore::load(dir.path().join("absent.json")).unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, "{ definitely not notes").unwrap();

        let err = NoteStore::load(&path).unwrap_err();
        assert!(matches!(
            err,
            Error::Load {
                source: LoadError::Decode(_),
                ..
            }
        ));
    }

    #[test]
    fn test_open_malformed_file_lenient_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, "garbage").unwrap();

        let store = NoteStore::open(&path).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_open_malformed_file_strict_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, "garbage").unwrap();

        let result = NoteStore::open_with(&path, FailurePolicy::Strict);
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[test]
    fn test_open_missing_file_strict_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = NoteStore::open_with(dir.path().join("notes.json"), FailurePolicy::Strict);
        assert!(store.unwrap().is_empty());
    }

    #[test]
    fn test_create_inserts_at_front() {
        let (_dir, mut store) = create_test_store();
        let first = Note::new("first", "");
        let second = Note::new("second", "");

        store.create(first.clone()).unwrap();
        store.create(second.clone()).unwrap();

        assert_eq!(store.notes(), &[second, first]);
    }

    #[test]
    fn test_create_accepts_empty_text() {
        let (_dir, mut store) = create_test_store();
        store.create(Note::new("", "")).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_persists_immediately() {
        let (_dir, mut store) = create_test_store();
        store.create(Note::new("saved", "body")).unwrap();

        let on_disk = NoteStore::load(store.path()).unwrap();
        assert_eq!(on_disk, store.notes());
    }

    #[test]
    fn test_update_replaces_in_place() {
        let (_dir, mut store) = store_with("ABC");
        let replacement = store.get(1).unwrap().edited("X", "changed");

        let previous = store.update(replacement.clone(), 1).unwrap();

        assert_eq!(previous.title, "B");
        assert_eq!(titles(&store), "AXC");
        assert_eq!(store.get(1), Some(&replacement));
        assert_eq!(NoteStore::load(store.path()).unwrap(), store.notes());
    }

    #[test]
    fn test_update_out_of_range() {
        let (_dir, mut store) = store_with("AB");
        let err = store.update(Note::new("X", ""), 2).unwrap_err();

        assert!(err.is_invalid_argument());
        assert_eq!(titles(&store), "AB");
    }

    #[test]
    fn test_delete_uses_original_positions() {
        let (_dir, mut store) = store_with("ABCD");
        let removed = store.delete([0, 2]).unwrap();

        assert_eq!(titles(&store), "BD");
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].title, "A");
        assert_eq!(removed[1].title, "C");
        assert_eq!(NoteStore::load(store.path()).unwrap(), store.notes());
    }

    #[test]
    fn test_delete_duplicate_indices() {
        let (_dir, mut store) = store_with("ABC");
        store.delete([1, 1]).unwrap();
        assert_eq!(titles(&store), "AC");
    }

    #[test]
    fn test_delete_out_of_range_removes_nothing() {
        let (_dir, mut store) = store_with("ABC");
        let err = store.delete([0, 9]).unwrap_err();

        assert!(matches!(err, Error::IndexOutOfRange { index: 9, len: 3 }));
        assert_eq!(titles(&store), "ABC");
    }

    #[test]
    fn test_move_single_block() {
        let (_dir, mut store) = store_with("ABCDE");
        store.move_items([1], 3).unwrap();

        assert_eq!(titles(&store), "ACDBE");
        assert_eq!(NoteStore::load(store.path()).unwrap(), store.notes());
    }

    #[test]
    fn test_move_multiple_keeps_order() {
        let (_dir, mut store) = store_with("ABCDE");
        store.move_items([3, 0], 1).unwrap();
        assert_eq!(titles(&store), "BADCE");
    }

    #[test]
    fn test_move_out_of_range() {
        let (_dir, mut store) = store_with("ABC");
        assert!(store.move_items([0], 3).unwrap_err().is_invalid_argument());
        assert!(store.move_items([3], 0).unwrap_err().is_invalid_argument());
        assert_eq!(titles(&store), "ABC");
    }

    #[test]
    fn test_position_of() {
        let (_dir, mut store) = store_with("AB");
        let note = Note::new("C", "");
        let id = note.id;
        store.create(note).unwrap();

        assert_eq!(store.position_of(id), Some(0));
        store.move_items([0], 2).unwrap();
        assert_eq!(store.position_of(id), Some(2));
        assert_eq!(store.position_of(Uuid::new_v4()), None);
    }

    #[test]
    fn test_observers_see_each_mutation() {
        let (_dir, mut store) = store_with("AB");
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        store.subscribe(move |notes| {
            sink.borrow_mut()
                .push(notes.iter().map(|n| n.title.clone()).collect::<String>());
        });

        store.create(Note::new("C", "")).unwrap();
        store.move_items([0], 2).unwrap();
        store.delete([0]).unwrap();
        let note = store.get(0).unwrap().edited("Z", "");
        store.update(note, 0).unwrap();

        assert_eq!(*seen.borrow(), vec!["CAB", "ABC", "BC", "ZC"]);
    }

    #[test]
    fn test_rejected_operations_do_not_notify() {
        let (_dir, mut store) = store_with("A");
        let calls = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&calls);
        store.subscribe(move |_| *counter.borrow_mut() += 1);

        let _ = store.update(Note::new("X", ""), 5);
        let _ = store.delete([5]);
        let _ = store.move_items([0], 5);

        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let (_dir, mut store) = create_test_store();
        let calls = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&calls);
        let id = store.subscribe(move |_| *counter.borrow_mut() += 1);
        store.create(Note::new("one", "")).unwrap();
        assert!(store.unsubscribe(id));
        store.create(Note::new("two", "")).unwrap();

        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_persist_failure_lenient_keeps_memory() {
        let dir = TempDir::new().unwrap();
        let mut store = open_unwritable(&dir, FailurePolicy::Lenient);

        store.create(Note::new("kept", "")).unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.stats().last_persisted.is_none());
    }

    #[test]
    fn test_persist_failure_strict_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut store = open_unwritable(&dir, FailurePolicy::Strict);
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        store.subscribe(move |_| *counter.borrow_mut() += 1);

        let err = store.create(Note::new("kept", "")).unwrap_err();

        assert!(matches!(err, Error::Persist { .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().title, "kept");
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_persist_direct_reports_failure_under_lenient() {
        let dir = TempDir::new().unwrap();
        let mut store = open_unwritable(&dir, FailurePolicy::Lenient);
        assert!(store.persist().is_err());
    }

    #[test]
    fn test_persist_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/notes.json");

        let mut store = NoteStore::open(&path).unwrap();
        store.create(Note::new("deep", "")).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_persist_leaves_no_temp_file() {
        let (dir, mut store) = create_test_store();
        store.create(Note::new("A", "")).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("notes.json")]);
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        crate::logging::init_test_logging();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), b"").unwrap();

        let mut store = NoteStore::open(&path).unwrap();
        let err = store.persist().unwrap_err();

        assert!(matches!(err, Error::Persist { .. }));
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_failed_write_leaves_existing_file_intact() {
        let (_dir, mut store) = store_with("AB");
        let before = std::fs::read(store.path()).unwrap();

        // A directory in the temp file's place makes the write itself fail
        let tmp_path = temp_path_for(store.path());
        std::fs::create_dir(&tmp_path).unwrap();
        assert!(store.persist().is_err());

        assert_eq!(std::fs::read(store.path()).unwrap(), before);
        assert!(tmp_path.is_dir());
    }

    #[test]
    fn test_lenient_recovers_corrupt_file_on_next_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, "garbage").unwrap();

        let mut store = NoteStore::open(&path).unwrap();
        store.create(Note::new("fresh", "")).unwrap();

        assert_eq!(NoteStore::load(&path).unwrap(), store.notes());
    }

    #[test]
    fn test_compact_output() {
        let (_dir, store) = create_test_store();
        let mut store = store.with_pretty(false);
        store.create(Note::new("A", "")).unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(!contents.contains('\n'));
    }

    #[test]
    fn test_from_config() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.notes_path = Some(dir.path().join("configured.json"));
        config.failure.policy = FailurePolicy::Strict;

        let store = NoteStore::from_config(&config).unwrap();
        assert_eq!(store.path(), dir.path().join("configured.json"));
        assert_eq!(store.policy(), FailurePolicy::Strict);
    }

    #[test]
    fn test_stats() {
        let (_dir, mut store) = create_test_store();
        let empty = store.stats();
        assert_eq!(empty.note_count, 0);
        assert_eq!(empty.file_size_bytes, 0);
        assert!(empty.last_persisted.is_none());

        store.create(Note::new("A", "")).unwrap();
        let stats = store.stats();
        assert_eq!(stats.note_count, 1);
        assert!(stats.file_size_bytes > 0);
        assert!(stats.last_persisted.is_some());
    }

    #[test]
    fn test_temp_path_for() {
        assert_eq!(
            temp_path_for(Path::new("/data/notes.json")),
            PathBuf::from("/data/notes.json.tmp")
        );
    }
}

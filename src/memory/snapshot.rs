//! Memory files.
//!
//! A memory file is a JSON document with an explicit, versioned schema:
//!
//! ```json
//! { "format": 1, "next_auto_index": 3, "bindings": { "1": "4", "pi": "3.14" } }
//! ```
//!
//! Fields this version doesn't know are ignored on read.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use super::Memory;
use crate::error::{Error, Result};

pub const FORMAT: u32 = 1;

/// File used by `save` and `restore` without a name.
pub const DEFAULT_SAVE: &str = "default";

/// Hidden, so it never shows up in [`SaveDir::list`] or clashes with a name
/// `save` accepts.
pub const AUTOSAVE: &str = ".autosave";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    format: u32,
    next_auto_index: u64,
    bindings: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn new(bindings: BTreeMap<String, String>, next_auto_index: u64) -> Self {
        Self {
            format: FORMAT,
            next_auto_index,
            bindings,
        }
    }

    pub fn into_parts(self) -> (BTreeMap<String, String>, u64) {
        (self.bindings, self.next_auto_index)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.format > FORMAT {
            return Err(serde_json::Error::custom(format!(
                "unsupported format version {}",
                snapshot.format
            )));
        }
        if snapshot.next_auto_index == 0 || snapshot.next_auto_index == u64::MAX {
            return Err(serde_json::Error::custom(format!(
                "next_auto_index out of range: {}",
                snapshot.next_auto_index
            )));
        }
        Ok(snapshot)
    }
}

/// The directory memory files live in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveDir {
    dir: PathBuf,
}

impl SaveDir {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, memory: &Memory, name: Option<&str>) -> Result<String> {
        let path = self.resolve(name)?;
        self.write(&path, memory)?;

        Ok(match name {
            Some(name) => format!("Saved contents of memory to '{}'.", name),
            None => String::from("Saved contents of memory."),
        })
    }

    /// Replaces `memory` with the named file's contents. `memory` is left
    /// untouched when the file can't be read or parsed.
    pub fn restore(&self, memory: &mut Memory, name: Option<&str>) -> Result<String> {
        let path = self.resolve(name)?;
        memory.absorb(read(&path, file_name(name))?);

        Ok(match name {
            Some(name) => format!("Restored contents of memory from '{}'.", name),
            None => String::from("Restored contents of memory."),
        })
    }

    pub fn remove(&self, name: &str) -> Result<String> {
        let path = self.resolve(Some(name))?;
        log::debug!("removing {}", path.display());
        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(name.to_string()),
            _ => Error::io(&path, e),
        })?;
        Ok(format!("Deleted memory file '{}'.", name))
    }

    /// Writes the session file picked up by the next [`autoload`](Self::autoload).
    pub fn autosave(&self, memory: &Memory) -> Result<()> {
        self.write(&self.dir.join(AUTOSAVE), memory)
    }

    /// Loads the last session's memory, if one was autosaved. Returns whether
    /// anything was loaded.
    pub fn autoload(&self, memory: &mut Memory) -> Result<bool> {
        match read(&self.dir.join(AUTOSAVE), AUTOSAVE) {
            Ok(snapshot) => {
                memory.absorb(snapshot);
                Ok(true)
            }
            Err(Error::FileNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn write(&self, path: &Path, memory: &Memory) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;

        let json = memory
            .snapshot()
            .to_json()
            .map_err(|e| Error::io(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;
        log::debug!("saving {} bindings to {}", memory.len(), path.display());
        fs::write(path, json).map_err(|e| Error::io(path, e))
    }

    /// Saved file names, sorted. Hidden entries are skipped. A missing or
    /// unreadable directory lists as empty.
    pub fn list(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    log::warn!("can't read {}: {}", self.dir.display(), e);
                }
                return Vec::new();
            }
        };

        let mut names = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    fn resolve(&self, name: Option<&str>) -> Result<PathBuf> {
        let name = file_name(name);
        if name.is_empty() || name.starts_with('.') || name.contains(&['/', '\\'][..]) {
            return Err(Error::InvalidFileName(name.to_string()));
        }
        Ok(self.dir.join(name))
    }
}

fn read(path: &Path, name: &str) -> Result<Snapshot> {
    log::debug!("restoring memory from {}", path.display());
    let json = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::FileNotFound(name.to_string()),
        _ => Error::io(path, e),
    })?;
    Snapshot::from_json(&json).map_err(|source| Error::Deserialization {
        name: name.to_string(),
        source,
    })
}

fn file_name(name: Option<&str>) -> &str {
    name.unwrap_or(DEFAULT_SAVE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Memory {
        let mut memory = Memory::new();
        memory.store(None, "4");
        memory.store(None, "1.2 x 10^30");
        memory.store(Some("pi"), "3.14159265358979323846");
        memory.update_last("3.14159265358979323846");
        memory
    }

    #[test]
    fn round_trip_named() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveDir::new(dir.path());
        let memory = sample();

        assert_eq!(
            saves.save(&memory, Some("f")).unwrap(),
            "Saved contents of memory to 'f'."
        );

        let mut restored = Memory::new();
        assert_eq!(
            saves.restore(&mut restored, Some("f")).unwrap(),
            "Restored contents of memory from 'f'."
        );
        assert_eq!(restored, memory);
        assert_eq!(restored.next_auto_index(), 3);
    }

    #[test]
    fn round_trip_empty_default() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveDir::new(dir.path());

        assert_eq!(
            saves.save(&Memory::new(), None).unwrap(),
            "Saved contents of memory."
        );
        assert!(dir.path().join(DEFAULT_SAVE).is_file());

        let mut memory = sample();
        assert_eq!(
            saves.restore(&mut memory, None).unwrap(),
            "Restored contents of memory."
        );
        assert_eq!(memory, Memory::new());
    }

    #[test]
    fn save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveDir::new(dir.path().join("nested").join(".cli-calc"));
        saves.save(&sample(), None).unwrap();
        assert_eq!(saves.list(), vec![DEFAULT_SAVE]);
    }

    #[test]
    fn save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveDir::new(dir.path());
        saves.save(&sample(), Some("f")).unwrap();
        saves.save(&Memory::new(), Some("f")).unwrap();

        let mut memory = sample();
        saves.restore(&mut memory, Some("f")).unwrap();
        assert!(memory.is_empty());
    }

    #[test]
    fn restore_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveDir::new(dir.path());
        let mut memory = sample();

        match saves.restore(&mut memory, Some("nope")) {
            Err(Error::FileNotFound(name)) => assert_eq!(name, "nope"),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(memory, sample());
    }

    #[test]
    fn restore_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad"), "--- !ruby/object:Memory").unwrap();
        let saves = SaveDir::new(dir.path());
        let mut memory = sample();

        assert!(matches!(
            saves.restore(&mut memory, Some("bad")),
            Err(Error::Deserialization { .. })
        ));
        assert_eq!(memory, sample());
    }

    #[test]
    fn restore_rejects_newer_format() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("future"),
            r#"{"format": 2, "next_auto_index": 1, "bindings": {}}"#,
        )
        .unwrap();
        let saves = SaveDir::new(dir.path());

        assert!(matches!(
            saves.restore(&mut Memory::new(), Some("future")),
            Err(Error::Deserialization { .. })
        ));
    }

    #[test]
    fn restore_rejects_zero_counter() {
        assert!(Snapshot::from_json(r#"{"format": 1, "next_auto_index": 0, "bindings": {}}"#)
            .is_err());
    }

    #[test]
    fn restore_rejects_exhausted_counter() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("huge"),
            r#"{"format":1,"next_auto_index":18446744073709551615,"bindings":{}}"#,
        )
        .unwrap();
        let saves = SaveDir::new(dir.path());
        let mut memory = sample();

        assert!(matches!(
            saves.restore(&mut memory, Some("huge")),
            Err(Error::Deserialization { .. })
        ));
        assert_eq!(memory, sample());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let snapshot = Snapshot::from_json(
            r#"{"format": 1, "next_auto_index": 4, "bindings": {"x": "1"}, "note": "hi"}"#,
        )
        .unwrap();
        let mut memory = Memory::new();
        memory.absorb(snapshot);
        assert_eq!(memory.get("x"), Some("1"));
        assert_eq!(memory.next_auto_index(), 4);
    }

    #[test]
    fn rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveDir::new(dir.path());
        for name in &["../escape", "a/b", ".history", ""] {
            assert!(matches!(
                saves.save(&Memory::new(), Some(name)),
                Err(Error::InvalidFileName(_))
            ));
        }
    }

    #[test]
    fn list_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SaveDir::new(dir.path().join("absent")).list().is_empty());
    }

    #[test]
    fn list_skips_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".history"), "2 + 2\n").unwrap();
        let saves = SaveDir::new(dir.path());
        saves.save(&Memory::new(), Some("work")).unwrap();
        saves.save(&Memory::new(), None).unwrap();
        assert_eq!(saves.list(), vec!["default", "work"]);
    }

    #[test]
    fn remove_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveDir::new(dir.path());
        saves.save(&sample(), Some("old")).unwrap();
        saves.save(&sample(), Some("keep")).unwrap();

        assert_eq!(saves.remove("old").unwrap(), "Deleted memory file 'old'.");
        assert_eq!(saves.list(), vec!["keep"]);
    }

    #[test]
    fn remove_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveDir::new(dir.path());

        match saves.remove("gone") {
            Err(Error::FileNotFound(name)) => assert_eq!(name, "gone"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(saves.remove("../x"), Err(Error::InvalidFileName(_))));
    }

    #[test]
    fn autosave_round_trip_stays_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveDir::new(dir.path().join("data"));
        saves.autosave(&sample()).unwrap();
        assert!(saves.list().is_empty());

        let mut memory = Memory::new();
        assert!(saves.autoload(&mut memory).unwrap());
        assert_eq!(memory, sample());
    }

    #[test]
    fn autoload_without_autosave() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveDir::new(dir.path());
        let mut memory = sample();

        assert!(!saves.autoload(&mut memory).unwrap());
        assert_eq!(memory, sample());
    }

    #[test]
    fn autoload_corrupt_autosave() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(AUTOSAVE), "{").unwrap();
        let saves = SaveDir::new(dir.path());
        let mut memory = Memory::new();

        assert!(matches!(
            saves.autoload(&mut memory),
            Err(Error::Deserialization { .. })
        ));
        assert!(memory.is_empty());
    }

    proptest! {
        #[test]
        fn json_preserves_values(
            bindings in proptest::collection::btree_map("[0-9A-Za-z_]{1,6}", "\\PC{0,12}", 0..8),
            next in 1u64..10_000,
        ) {
            let snapshot = Snapshot::new(bindings, next);
            let json = snapshot.to_json().unwrap();
            prop_assert_eq!(Snapshot::from_json(&json).unwrap(), snapshot);
        }
    }
}

pub mod archiver;
pub mod codec;
pub mod error;
pub mod walk;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Decode, Encode, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
}

/// One catalog record: a name plus a kind. The name is the path exactly as
/// it was given on input (top-level file arguments) or as produced by the
/// tree walk (everything under a directory argument).
#[derive(Debug, PartialEq, Eq, Clone, Decode, Encode, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
}

impl Entry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Ordered list of archive entries. Insertion order is significant: it is
/// both the pack-time payload write order and the unpack-time creation
/// order, and a directory entry always precedes the entries nested under it.
#[derive(Debug, PartialEq, Eq, Clone, Default, Decode, Encode, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<Entry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, name: impl Into<String>) {
        self.entries.push(Entry {
            name: name.into(),
            kind: EntryKind::File,
        });
    }

    pub fn add_directory(&mut self, name: impl Into<String>) {
        self.entries.push(Entry {
            name: name.into(),
            kind: EntryKind::Directory,
        });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// File entries only, in the same relative order as in the catalog.
    /// Drives the pack-time payload loop.
    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_file())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

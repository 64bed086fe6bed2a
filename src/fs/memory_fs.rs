//! In-memory filesystem probe
//!
//! A path table with a monotonic mtime counter. Used by tests and demos
//! so conditional predicates can be exercised without touching the real
//! filesystem.

use indexmap::IndexMap;

use crate::fs::types::{FileSystemProbe, MtimeComparison};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
    Symlink,
}

#[derive(Debug, Clone)]
struct Entry {
    kind: EntryKind,
    mtime: u64,
}

/// In-memory probe. Paths are matched as written; registering
/// `a/b/c.txt` also makes `a` and `a/b` answer as directories.
#[derive(Debug, Default)]
pub struct MemoryFs {
    entries: IndexMap<String, Entry>,
    clock: u64,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    pub fn add_file(&mut self, path: &str) {
        let mtime = self.tick();
        self.entries.insert(path.to_string(), Entry { kind: EntryKind::File, mtime });
    }

    pub fn add_directory(&mut self, path: &str) {
        let mtime = self.tick();
        self.entries.insert(path.to_string(), Entry { kind: EntryKind::Directory, mtime });
    }

    pub fn add_symlink(&mut self, path: &str) {
        let mtime = self.tick();
        self.entries.insert(path.to_string(), Entry { kind: EntryKind::Symlink, mtime });
    }

    /// Bump a path's modification time past everything else.
    pub fn touch(&mut self, path: &str) {
        let mtime = self.tick();
        if let Some(entry) = self.entries.get_mut(path) {
            entry.mtime = mtime;
        } else {
            self.entries.insert(path.to_string(), Entry { kind: EntryKind::File, mtime });
        }
    }

    fn is_implicit_directory(&self, path: &str) -> bool {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        self.entries.keys().any(|k| k.starts_with(&prefix))
    }

    fn mtime(&self, path: &str) -> Option<u64> {
        self.entries.get(path).map(|e| e.mtime)
    }
}

impl FileSystemProbe for MemoryFs {
    fn exists(&self, path: &str) -> bool {
        self.entries.contains_key(path) || self.is_implicit_directory(path)
    }

    fn is_directory(&self, path: &str) -> bool {
        match self.entries.get(path) {
            Some(entry) => entry.kind == EntryKind::Directory,
            None => self.is_implicit_directory(path),
        }
    }

    fn is_symlink(&self, path: &str) -> bool {
        matches!(self.entries.get(path), Some(e) if e.kind == EntryKind::Symlink)
    }

    fn mtime_compare(&self, left: &str, right: &str) -> MtimeComparison {
        match (self.mtime(left), self.mtime(right)) {
            (Some(l), Some(r)) => MtimeComparison::known(l >= r),
            _ => MtimeComparison::unknown(),
        }
    }
}

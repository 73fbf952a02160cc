use std::collections::HashSet;

use super::item::FileRecord;

/// Aggregate output of one scheduled run.
///
/// Order carries no meaning. Ids are unique: a file reachable through more
/// than one parent folder is kept once, at its first sighting.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    files: Vec<FileRecord>,
    seen: HashSet<String>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record. Returns false if a record with the same id was already present.
    pub fn insert(&mut self, file: FileRecord) -> bool {
        if !self.seen.insert(file.id.clone()) {
            return false;
        }
        self.files.push(file);
        true
    }

    /// Merge a batch of records, returning how many were new
    pub fn merge<I>(&mut self, files: I) -> usize
    where
        I: IntoIterator<Item = FileRecord>,
    {
        files
            .into_iter()
            .map(|file| self.insert(file))
            .filter(|inserted| *inserted)
            .count()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn ids(&self) -> HashSet<&str> {
        self.files.iter().map(|f| f.id.as_str()).collect()
    }

    pub fn into_files(self) -> Vec<FileRecord> {
        self.files
    }
}

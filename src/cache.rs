use crate::archive::ArchiveRecord;
use crate::error::RestoreResult;
use crate::version::is_newer_version;
use log::{debug, warn};
use std::path::Path;

const CACHE_SUFFIX: &str = ".pkg.tar.xz";

/// In-memory index of every archive in the package cache directory.
#[derive(Debug, Default)]
pub struct CacheIndex {
    records: Vec<ArchiveRecord>,
}

impl CacheIndex {
    pub fn scan(cache_dir: &Path) -> RestoreResult<Self> {
        let mut records = Vec::new();
        for entry in std::fs::read_dir(cache_dir)? {
            let entry = entry?;
            let path = entry.path();
            let is_cache_file = path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(CACHE_SUFFIX));
            if !is_cache_file {
                continue;
            }
            match ArchiveRecord::from_path(&path) {
                Ok(record) => records.push(record),
                Err(e) => warn!("skipping cache entry {}: {}", path.display(), e),
            }
        }
        debug!("indexed {} archives in {}", records.len(), cache_dir.display());
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<ArchiveRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name == name)
    }

    /// The cached archive with the greatest version for `name`, first one
    /// winning ties.
    pub fn best_version(&self, name: &str) -> Option<&ArchiveRecord> {
        let mut best: Option<&ArchiveRecord> = None;
        for record in self.records.iter().filter(|r| r.name == name) {
            match best {
                Some(current) if !is_newer_version(&current.version, &record.version) => {}
                _ => best = Some(record),
            }
        }
        best
    }
}

//! Stat: file identity and modification time snapshot.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Identity of a file across renames within one filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileKey {
    Inode { dev: u64, ino: u64 },
    /// Platforms without stable inodes fall back to the path.
    Path(PathBuf),
}

/// The subset of `stat(2)` the metadata cache needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub key: FileKey,
    pub name: String,
    pub mod_time: SystemTime,
}

impl FileStat {
    pub fn new(key: FileKey, name: impl Into<String>, mod_time: SystemTime) -> Self {
        Self { key, name: name.into(), mod_time }
    }

    pub fn from_metadata(path: &Path, metadata: &Metadata) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            key: file_key(path, metadata),
            name,
            mod_time: metadata.modified()?,
        })
    }
}

#[cfg(unix)]
fn file_key(_path: &Path, metadata: &Metadata) -> FileKey {
    use std::os::unix::fs::MetadataExt;
    FileKey::Inode { dev: metadata.dev(), ino: metadata.ino() }
}

#[cfg(not(unix))]
fn file_key(path: &Path, _metadata: &Metadata) -> FileKey {
    FileKey::Path(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_from_metadata_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tidb.log");
        fs::write(&path, "x").unwrap();
        let stat = FileStat::from_metadata(&path, &fs::metadata(&path).unwrap()).unwrap();
        assert_eq!(stat.name, "tidb.log");
    }

    #[cfg(unix)]
    #[test]
    fn test_rename_keeps_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tidb.log");
        let rotated = dir.path().join("tidb-1.log");
        fs::write(&path, "x").unwrap();
        let before = FileStat::from_metadata(&path, &fs::metadata(&path).unwrap()).unwrap();
        fs::rename(&path, &rotated).unwrap();
        let after = FileStat::from_metadata(&rotated, &fs::metadata(&rotated).unwrap()).unwrap();
        assert_eq!(before.key, after.key);
        assert_ne!(before.name, after.name);
    }
}

use crate::backup::checksum::{hash_directory, hash_file};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

/// What a backup captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    File,
    Directory,
    Package,
    Service,
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackupKind::File => "file",
            BackupKind::Directory => "directory",
            BackupKind::Package => "package",
            BackupKind::Service => "service",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Backup source not found: {0}")]
    NotFound(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("I/O failure at {path}: {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not a {expected}")]
    KindMismatch { path: PathBuf, expected: BackupKind },

    #[error("Snapshots of kind '{0}' are not supported")]
    UnsupportedKind(BackupKind),
}

impl BackupError {
    /// Map an error raised while reading the source
    fn from_source(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => BackupError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => BackupError::PermissionDenied(path.to_path_buf()),
            _ => BackupError::io(path, err),
        }
    }

    fn io(path: &Path, source: io::Error) -> Self {
        BackupError::IoFailure {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A persisted snapshot of one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub kind: BackupKind,
    pub source_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub size_bytes: u64,
    /// Lowercase hex SHA-256 of the snapshot contents
    pub checksum: String,
}

/// Writes snapshots under a backup root.
///
/// Snapshots are additive: every call gets a fresh `<id>-<epoch millis>`
/// path and nothing is ever overwritten or deleted. A failed copy leaves
/// whatever was written in place for the caller to inspect.
#[derive(Debug, Clone)]
pub struct BackupStore {
    root: PathBuf,
}

impl BackupStore {
    /// Create a store rooted at `root`. The directory is created on first snapshot.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy `source` into the backup root and return its record
    pub fn snapshot(&self, source: &Path, kind: BackupKind) -> Result<BackupRecord, BackupError> {
        if matches!(kind, BackupKind::Package | BackupKind::Service) {
            return Err(BackupError::UnsupportedKind(kind));
        }

        let metadata = fs::metadata(source).map_err(|e| BackupError::from_source(source, e))?;
        let matches_kind = match kind {
            BackupKind::Directory => metadata.is_dir(),
            _ => metadata.is_file(),
        };
        if !matches_kind {
            return Err(BackupError::KindMismatch {
                path: source.to_path_buf(),
                expected: kind,
            });
        }

        fs::create_dir_all(&self.root).map_err(|e| BackupError::io(&self.root, e))?;

        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let snapshot_path = self
            .root
            .join(format!("{}-{}", id, created_at.timestamp_millis()));

        let (size_bytes, checksum) = match kind {
            BackupKind::Directory => {
                let size = copy_directory(source, &snapshot_path)?;
                let checksum =
                    hash_directory(&snapshot_path).map_err(|e| BackupError::io(&snapshot_path, e))?;
                (size, checksum)
            }
            _ => {
                let size = copy_file(source, &snapshot_path)?;
                let checksum =
                    hash_file(&snapshot_path).map_err(|e| BackupError::io(&snapshot_path, e))?;
                (size, checksum)
            }
        };

        info!(
            id = %id,
            source = %source.display(),
            snapshot = %snapshot_path.display(),
            size_bytes,
            "snapshot created"
        );

        Ok(BackupRecord {
            id,
            created_at,
            kind,
            source_path: source.to_path_buf(),
            snapshot_path,
            size_bytes,
            checksum,
        })
    }

    /// Re-hash a record's snapshot and compare it with the stored checksum
    pub fn verify(&self, record: &BackupRecord) -> Result<bool, BackupError> {
        let actual = match record.kind {
            BackupKind::Directory => hash_directory(&record.snapshot_path),
            _ => hash_file(&record.snapshot_path),
        }
        .map_err(|e| BackupError::from_source(&record.snapshot_path, e))?;

        let intact = actual.eq_ignore_ascii_case(&record.checksum);
        if !intact {
            warn!(
                id = %record.id,
                expected = %record.checksum,
                actual = %actual,
                "snapshot checksum mismatch"
            );
        }

        Ok(intact)
    }
}

/// Check a snapshot on disk against an expected checksum
pub fn verify_snapshot(path: &Path, expected: &str) -> Result<bool, BackupError> {
    let metadata = fs::metadata(path).map_err(|e| BackupError::from_source(path, e))?;
    let actual = if metadata.is_dir() {
        hash_directory(path)
    } else {
        hash_file(path)
    }
    .map_err(|e| BackupError::from_source(path, e))?;

    Ok(actual.eq_ignore_ascii_case(expected.trim()))
}

fn copy_file(source: &Path, destination: &Path) -> Result<u64, BackupError> {
    // Surface unreadable sources as such rather than as a copy failure
    File::open(source).map_err(|e| BackupError::from_source(source, e))?;
    fs::copy(source, destination).map_err(|e| BackupError::io(destination, e))
}

fn copy_directory(source: &Path, destination: &Path) -> Result<u64, BackupError> {
    fs::read_dir(source).map_err(|e| BackupError::from_source(source, e))?;
    fs::create_dir_all(destination).map_err(|e| BackupError::io(destination, e))?;

    let mut total = 0u64;
    for entry in WalkDir::new(source).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            BackupError::from_source(&path, io::Error::from(e))
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| BackupError::io(entry.path(), io::Error::other(e)))?;
        let target = destination.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| BackupError::io(&target, e))?;
        } else if file_type.is_file() {
            // Read failures belong to the source; only write failures name the target
            File::open(entry.path()).map_err(|e| BackupError::from_source(entry.path(), e))?;
            total += fs::copy(entry.path(), &target).map_err(|e| BackupError::io(&target, e))?;
        } else {
            debug!(path = %entry.path().display(), "skipping non-regular entry");
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, BackupStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = BackupStore::new(temp_dir.path().join("backups"));
        (temp_dir, store)
    }

    #[test]
    fn test_snapshot_file() {
        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("hosts");
        fs::write(&source, b"127.0.0.1 localhost\n").unwrap();

        let record = store.snapshot(&source, BackupKind::File).unwrap();

        assert_eq!(record.kind, BackupKind::File);
        assert_eq!(record.source_path, source);
        assert_eq!(record.size_bytes, 20);
        assert_eq!(fs::read(&record.snapshot_path).unwrap(), b"127.0.0.1 localhost\n");
        assert!(record.snapshot_path.starts_with(store.root()));
        assert_eq!(record.checksum.len(), 64);
    }

    #[test]
    fn test_snapshot_path_format() {
        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("f");
        fs::write(&source, b"x").unwrap();

        let record = store.snapshot(&source, BackupKind::File).unwrap();
        let name = record.snapshot_path.file_name().unwrap().to_string_lossy().to_string();
        let expected = format!("{}-{}", record.id, record.created_at.timestamp_millis());
        assert_eq!(name, expected);
    }

    #[test]
    fn test_backup_root_created_on_first_use() {
        let (temp_dir, store) = setup();
        assert!(!store.root().exists());

        let source = temp_dir.path().join("f");
        fs::write(&source, b"x").unwrap();
        store.snapshot(&source, BackupKind::File).unwrap();

        assert!(store.root().is_dir());
    }

    #[test]
    fn test_verify_detects_corruption() {
        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("config");
        fs::write(&source, b"key = value\n").unwrap();

        let record = store.snapshot(&source, BackupKind::File).unwrap();
        assert!(store.verify(&record).unwrap());

        let mut bytes = fs::read(&record.snapshot_path).unwrap();
        bytes[0] ^= 0xff;
        fs::write(&record.snapshot_path, bytes).unwrap();

        assert!(!store.verify(&record).unwrap());
    }

    #[test]
    fn test_snapshot_directory() {
        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("app");
        fs::create_dir_all(source.join("conf.d")).unwrap();
        fs::create_dir_all(source.join("empty")).unwrap();
        fs::write(source.join("main.conf"), b"abc").unwrap();
        fs::write(source.join("conf.d/extra.conf"), b"defgh").unwrap();

        let record = store.snapshot(&source, BackupKind::Directory).unwrap();

        assert_eq!(record.size_bytes, 8);
        assert!(record.snapshot_path.join("empty").is_dir());
        assert_eq!(
            fs::read(record.snapshot_path.join("conf.d/extra.conf")).unwrap(),
            b"defgh"
        );
        assert_eq!(record.checksum, hash_directory(&source).unwrap());
        assert!(store.verify(&record).unwrap());

        fs::write(record.snapshot_path.join("main.conf"), b"abd").unwrap();
        assert!(!store.verify(&record).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_snapshot_skips_symlinks() {
        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("app");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("real.txt"), b"data").unwrap();
        std::os::unix::fs::symlink("/etc/hostname", source.join("link")).unwrap();

        let record = store.snapshot(&source, BackupKind::Directory).unwrap();

        assert!(record.snapshot_path.join("real.txt").exists());
        assert!(fs::symlink_metadata(record.snapshot_path.join("link")).is_err());
        assert_eq!(record.size_bytes, 4);
    }

    #[test]
    fn test_snapshots_are_additive() {
        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("f");
        fs::write(&source, b"same").unwrap();

        let first = store.snapshot(&source, BackupKind::File).unwrap();
        let second = store.snapshot(&source, BackupKind::File).unwrap();

        assert_ne!(first.id, second.id);
        assert_ne!(first.snapshot_path, second.snapshot_path);
        assert_eq!(first.checksum, second.checksum);
        assert!(first.snapshot_path.exists());
        assert!(store.verify(&first).unwrap());
    }

    #[test]
    fn test_missing_source() {
        let (temp_dir, store) = setup();
        let result = store.snapshot(&temp_dir.path().join("missing"), BackupKind::File);
        assert!(matches!(result, Err(BackupError::NotFound(_))));
    }

    #[test]
    fn test_kind_mismatch() {
        let (temp_dir, store) = setup();
        let result = store.snapshot(temp_dir.path(), BackupKind::File);
        assert!(matches!(result, Err(BackupError::KindMismatch { .. })));

        let file = temp_dir.path().join("f");
        fs::write(&file, b"x").unwrap();
        let result = store.snapshot(&file, BackupKind::Directory);
        assert!(matches!(
            result,
            Err(BackupError::KindMismatch { expected: BackupKind::Directory, .. })
        ));
    }

    #[test]
    fn test_unsupported_kinds() {
        let (temp_dir, store) = setup();
        for kind in [BackupKind::Package, BackupKind::Service] {
            let result = store.snapshot(temp_dir.path(), kind);
            assert!(matches!(result, Err(BackupError::UnsupportedKind(k)) if k == kind));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_source() {
        use std::os::unix::fs::PermissionsExt;

        // Root ignores file permissions
        if crate::system::is_root() {
            return;
        }

        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("secret");
        fs::write(&source, b"x").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o000)).unwrap();

        let result = store.snapshot(&source, BackupKind::File);
        assert!(matches!(result, Err(BackupError::PermissionDenied(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_nested_file() {
        use std::os::unix::fs::PermissionsExt;

        if crate::system::is_root() {
            return;
        }

        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("tree");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::write(source.join("open.txt"), b"a").unwrap();
        let locked = source.join("sub/locked.txt");
        fs::write(&locked, b"b").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let result = store.snapshot(&source, BackupKind::Directory);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

        match result {
            Err(BackupError::PermissionDenied(path)) => assert_eq!(path, locked),
            other => panic!("expected permission denied, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_snapshot_by_path() {
        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("f");
        fs::write(&source, b"payload").unwrap();

        let record = store.snapshot(&source, BackupKind::File).unwrap();
        assert!(verify_snapshot(&record.snapshot_path, &record.checksum).unwrap());
        assert!(verify_snapshot(&record.snapshot_path, &record.checksum.to_uppercase()).unwrap());
        assert!(!verify_snapshot(&record.snapshot_path, "deadbeef").unwrap());
    }

    #[test]
    fn test_record_serializes() {
        let (temp_dir, store) = setup();
        let source = temp_dir.path().join("f");
        fs::write(&source, b"x").unwrap();

        let record = store.snapshot(&source, BackupKind::File).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["sizeBytes"], 1);
        assert!(json["snapshotPath"].is_string());
    }
}

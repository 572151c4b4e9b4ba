//! SHA-256 content hashes for snapshots.
//!
//! A file hashes to the SHA-256 of its bytes. A directory hashes to the
//! SHA-256 of one line per regular file, sorted by relative path:
//!
//! ```text
//! <relative/path>\0<file sha256 hex>\n
//! ```
//!
//! Paths are the raw name bytes joined with `/`, so names that are not
//! valid UTF-8 stay distinct. Sorting makes the result independent of directory listing order.
//! Directories without files contribute nothing; symlinks and special files
//! are skipped, matching what a directory snapshot copies.

use sha2::{Digest, Sha256};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const BUFFER_SIZE: usize = 64 * 1024;

/// Hash a single file's contents
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Hash a directory tree using the sorted relative-path aggregation
pub fn hash_directory(root: &Path) -> io::Result<String> {
    let mut files = regular_files(root)?;
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    for (relative, absolute) in files {
        let file_hash = hash_file(&absolute)?;
        hasher.update(&relative);
        hasher.update([0u8]);
        hasher.update(file_hash.as_bytes());
        hasher.update(b"\n");
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Hash a file or directory, whichever `path` is
pub fn hash_path(path: &Path) -> io::Result<String> {
    if path.is_dir() {
        hash_directory(path)
    } else {
        hash_file(path)
    }
}

/// Regular files under `root` as (forward-slash relative path bytes, absolute path)
fn regular_files(root: &Path) -> io::Result<Vec<(Vec<u8>, PathBuf)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(io::Error::other)?;
        let key = relative
            .components()
            .map(|c| name_bytes(c.as_os_str()))
            .collect::<Vec<_>>()
            .join(&b'/');

        files.push((key, entry.path().to_path_buf()));
    }

    Ok(files)
}

#[cfg(unix)]
fn name_bytes(name: &OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    name.as_bytes().to_vec()
}

#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> Vec<u8> {
    name.to_string_lossy().into_owned().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_hash_file_known_value() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty");
        fs::write(&path, b"").unwrap();

        assert_eq!(
            hash_file(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_file_changes_with_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data");

        fs::write(&path, b"hello").unwrap();
        let first = hash_file(&path).unwrap();

        fs::write(&path, b"hellp").unwrap();
        let second = hash_file(&path).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_directory_hash_independent_of_creation_order() {
        let a = TempDir::new().unwrap();
        fs::create_dir_all(a.path().join("sub")).unwrap();
        fs::write(a.path().join("z.txt"), b"z").unwrap();
        fs::write(a.path().join("sub/a.txt"), b"a").unwrap();

        let b = TempDir::new().unwrap();
        fs::write(b.path().join("z.txt"), b"z").unwrap();
        fs::create_dir_all(b.path().join("sub")).unwrap();
        fs::write(b.path().join("sub/a.txt"), b"a").unwrap();

        assert_eq!(hash_directory(a.path()).unwrap(), hash_directory(b.path()).unwrap());
    }

    #[test]
    fn test_directory_hash_depends_on_paths() {
        let a = TempDir::new().unwrap();
        fs::write(a.path().join("one.txt"), b"same").unwrap();

        let b = TempDir::new().unwrap();
        fs::write(b.path().join("two.txt"), b"same").unwrap();

        assert_ne!(hash_directory(a.path()).unwrap(), hash_directory(b.path()).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_stay_distinct() {
        use std::os::unix::ffi::OsStrExt;

        let first = OsStr::from_bytes(b"\xff1");
        let second = OsStr::from_bytes(b"\xff2");

        let a = TempDir::new().unwrap();
        fs::write(a.path().join(first), b"one").unwrap();
        fs::write(a.path().join(second), b"two").unwrap();

        let b = TempDir::new().unwrap();
        fs::write(b.path().join(second), b"two").unwrap();
        fs::write(b.path().join(first), b"one").unwrap();

        let swapped = TempDir::new().unwrap();
        fs::write(swapped.path().join(first), b"two").unwrap();
        fs::write(swapped.path().join(second), b"one").unwrap();

        let hash = hash_directory(a.path()).unwrap();
        assert_eq!(hash, hash_directory(b.path()).unwrap());
        assert_ne!(hash, hash_directory(swapped.path()).unwrap());
    }

    #[test]
    fn test_hash_path_dispatches() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("f");
        fs::write(&file, b"x").unwrap();

        assert_eq!(hash_path(&file).unwrap(), hash_file(&file).unwrap());
        assert_eq!(
            hash_path(temp_dir.path()).unwrap(),
            hash_directory(temp_dir.path()).unwrap()
        );
    }

    #[test]
    fn test_hash_missing_file() {
        let result = hash_file(Path::new("/nonexistent/sysguard/file"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}

use crate::safety::PROTECTED_SYSTEM_PATHS;
use std::path::{Component, Path, PathBuf};

/// Whether an argument looks like a filesystem path
pub fn looks_like_path(arg: &str) -> bool {
    arg.starts_with('/') || arg.starts_with("./") || arg.starts_with("../")
}

/// Extract every path-like argument, resolved against `base` and normalized.
///
/// Duplicates are dropped; the first occurrence keeps its position.
pub fn extract_paths(args: &[String], base: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for arg in args.iter().filter(|a| looks_like_path(a)) {
        let resolved = normalize(&base.join(arg));
        if !paths.contains(&resolved) {
            paths.push(resolved);
        }
    }

    paths
}

/// Lexically normalize an absolute path: drop `.`, fold `..`.
///
/// Symlinks are not followed; classification does no filesystem I/O.
/// `..` at the root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::from("/");

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }

    normalized
}

/// Whether the path lies inside one of the protected system directories
pub fn is_system_path(path: &Path) -> bool {
    is_under(path, PROTECTED_SYSTEM_PATHS)
}

/// Whether any of `dirs` is a component prefix of `path`
pub fn is_under(path: &Path, dirs: &[&str]) -> bool {
    dirs.iter().any(|dir| path.starts_with(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_looks_like_path() {
        assert!(looks_like_path("/etc/passwd"));
        assert!(looks_like_path("./local"));
        assert!(looks_like_path("../parent"));
        assert!(!looks_like_path("-rf"));
        assert!(!looks_like_path("file.txt"));
        assert!(!looks_like_path(".hidden"));
    }

    #[test]
    fn test_extract_paths_empty_args() {
        let paths = extract_paths(&[], Path::new("/home/user"));
        assert!(paths.is_empty());
    }

    #[test]
    fn test_extract_relative_paths() {
        let paths = extract_paths(&args(&["-rf", "./build", "../shared"]), Path::new("/home/user/project"));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/home/user/project/build"),
                PathBuf::from("/home/user/shared"),
            ]
        );
    }

    #[test]
    fn test_extract_dedups_after_normalization() {
        let paths = extract_paths(
            &args(&["/etc/hosts", "/etc/./hosts", "/tmp/../etc/hosts"]),
            Path::new("/"),
        );
        assert_eq!(paths, vec![PathBuf::from("/etc/hosts")]);
    }

    #[test]
    fn test_normalize_parent_at_root() {
        assert_eq!(normalize(Path::new("/../../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize(Path::new("/")), PathBuf::from("/"));
    }

    #[test]
    fn test_relative_escape_into_system_dir() {
        let paths = extract_paths(&args(&["../../etc/shadow"]), Path::new("/home/user"));
        assert_eq!(paths, vec![PathBuf::from("/etc/shadow")]);
        assert!(is_system_path(&paths[0]));
    }

    #[test]
    fn test_system_path_is_component_prefix() {
        assert!(is_system_path(Path::new("/etc")));
        assert!(is_system_path(Path::new("/usr/local/bin/tool")));
        assert!(!is_system_path(Path::new("/etcetera/file")));
        assert!(!is_system_path(Path::new("/home/user/etc")));
        assert!(!is_system_path(Path::new("/")));
    }
}

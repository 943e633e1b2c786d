//! Path and URI helpers
//!
//! All comparisons between event paths happen on lexically normalized
//! component sequences, so `a/./b/` and `a/b` are the same directory.

use std::path::{Component, Path, PathBuf};

/// Convert a `file://` URI into a native path
///
/// Returns `None` for non-file URIs or URIs that do not parse.
pub fn uri_to_path(uri: &str) -> Option<PathBuf> {
    url::Url::parse(uri).ok()?.to_file_path().ok()
}

/// Convert a native absolute path into an LSP URI
pub fn path_to_uri(path: &Path) -> Option<lsp_types::Uri> {
    url::Url::from_file_path(path)
        .ok()?
        .to_string()
        .parse::<lsp_types::Uri>()
        .ok()
}

/// Lexically normalize a path: drop `.`, resolve `..` against preceding
/// normal components and discard trailing separators
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) && normalized.pop();
                if !popped {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Normalized parent directory, or `None` for a root
pub fn parent_dir(path: &Path) -> Option<PathBuf> {
    normalize(path).parent().map(Path::to_path_buf)
}

/// Last component of the normalized path as UTF-8
pub fn leaf_name(path: &Path) -> Option<String> {
    normalize(path)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

/// Longest directory that is an ancestor of (or equal to) the parent of every path
///
/// Each input is a file path, so the common ancestor is computed over the
/// parent directories. Returns `None` for an empty slice or when the paths
/// share no component at all.
pub fn longest_common_ancestor(paths: &[PathBuf]) -> Option<PathBuf> {
    let mut dirs = paths.iter().filter_map(|path| parent_dir(path));
    let first = dirs.next()?;
    let rest: Vec<PathBuf> = dirs.collect();
    let mut common: Vec<Component<'_>> = first.components().collect();
    for dir in &rest {
        let shared = common
            .iter()
            .zip(dir.components())
            .take_while(|(a, b)| *a == b)
            .count();
        common.truncate(shared);
    }

    if common.is_empty() {
        return None;
    }
    Some(common.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_dots_and_trailing_separators() {
        assert_eq!(normalize(Path::new("/ws/./src/a/")), PathBuf::from("/ws/src/a"));
        assert_eq!(normalize(Path::new("/ws/src/b/../a")), PathBuf::from("/ws/src/a"));
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_parent_and_leaf() {
        assert_eq!(
            parent_dir(Path::new("/ws/src/a/Foo.java")),
            Some(PathBuf::from("/ws/src/a"))
        );
        assert_eq!(leaf_name(Path::new("/ws/src/a/")), Some("a".to_string()));
        assert_eq!(parent_dir(Path::new("/")), None);
    }

    #[test]
    fn test_longest_common_ancestor() {
        let paths = vec![
            PathBuf::from("/ws/src/com/acme/b/Foo.java"),
            PathBuf::from("/ws/src/com/acme/b/Bar.java"),
        ];
        assert_eq!(
            longest_common_ancestor(&paths),
            Some(PathBuf::from("/ws/src/com/acme/b"))
        );

        let paths = vec![
            PathBuf::from("/ws/src/com/acme/b/Foo.java"),
            PathBuf::from("/ws/src/com/acme/c/Bar.java"),
        ];
        assert_eq!(
            longest_common_ancestor(&paths),
            Some(PathBuf::from("/ws/src/com/acme"))
        );

        assert_eq!(longest_common_ancestor(&[]), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_uri_round_trip_through_path() {
        let path = uri_to_path("file:///ws/src/a/Foo%20Bar.java").unwrap();
        assert_eq!(path, PathBuf::from("/ws/src/a/Foo Bar.java"));
        assert!(uri_to_path("untitled:Untitled-1").is_none());

        let uri = path_to_uri(Path::new("/ws/src/a/Foo.java")).unwrap();
        assert_eq!(uri.as_str(), "file:///ws/src/a/Foo.java");
    }
}

//! Lexical path normalization.
//!
//! Node identity compares paths byte for byte, so every path that ends up in a
//! node or descriptor goes through [`absolutize`]. Normalization is purely
//! lexical: symlinks are not resolved and the file system is never touched.

use std::path::{Component, Path, PathBuf};

/// Remove `.` components and fold `..` into the preceding component.
///
/// A `..` that would climb above the root of an absolute path is dropped.
/// For relative paths, leading `..` components are kept.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Resolve `path` against `base` when relative, then [`normalize`] it.
#[must_use]
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Directory a project bundle's relative paths are resolved against.
///
/// For `/work/App/App.xcodeproj` this is `/work/App`.
#[must_use]
pub fn source_root(bundle: &Path) -> PathBuf {
    bundle
        .parent()
        .map_or_else(|| bundle.to_path_buf(), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_current_dir() {
        assert_eq!(
            normalize(Path::new("/work/./App/./App.xcodeproj")),
            PathBuf::from("/work/App/App.xcodeproj")
        );
    }

    #[test]
    fn test_normalize_folds_parent_dir() {
        assert_eq!(
            normalize(Path::new("/work/App/../Core/Core.framework")),
            PathBuf::from("/work/Core/Core.framework")
        );
        assert_eq!(normalize(Path::new("/../work")), PathBuf::from("/work"));
    }

    #[test]
    fn test_normalize_keeps_leading_parent_for_relative_paths() {
        assert_eq!(
            normalize(Path::new("../../Vendor/lib.a")),
            PathBuf::from("../../Vendor/lib.a")
        );
    }

    #[test]
    fn test_absolutize() {
        let base = Path::new("/work/App");
        assert_eq!(
            absolutize(base, Path::new("../Frameworks/Kit.xcframework")),
            PathBuf::from("/work/Frameworks/Kit.xcframework")
        );
        assert_eq!(
            absolutize(base, Path::new("/opt/lib/libz.a")),
            PathBuf::from("/opt/lib/libz.a")
        );
    }

    #[test]
    fn test_source_root() {
        assert_eq!(
            source_root(Path::new("/work/App/App.xcodeproj")),
            PathBuf::from("/work/App")
        );
    }
}

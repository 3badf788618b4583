//! Host-to-container path mapping.
//!
//! Every container-side action keys on the path of a host file relative to
//! the configured host root. The mapping is purely lexical: nothing here
//! touches the filesystem, so paths that no longer exist (editor temp files
//! that were created and removed again) still map or fail deterministically.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Failure to express a host path relative to the host root.
///
/// Callers drop the event when they see this; it is never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathResolutionError {
    #[error("{path} is not an absolute path")]
    NotAbsolute { path: PathBuf },

    #[error("{path} is outside of {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("{path} is the host root itself")]
    IsRoot { path: PathBuf },
}

/// Compute the path of `path` relative to `root`.
///
/// The result never has a leading separator and never contains `..`.
pub fn relative(root: &Path, path: &Path) -> Result<PathBuf, PathResolutionError> {
    if !root.is_absolute() {
        return Err(PathResolutionError::NotAbsolute {
            path: root.to_path_buf(),
        });
    }
    if !path.is_absolute() {
        return Err(PathResolutionError::NotAbsolute {
            path: path.to_path_buf(),
        });
    }

    let root = normalize(root);
    let normalized = normalize(path);

    let rel = normalized
        .strip_prefix(&root)
        .map_err(|_| PathResolutionError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.clone(),
        })?;

    if rel.as_os_str().is_empty() {
        return Err(PathResolutionError::IsRoot {
            path: path.to_path_buf(),
        });
    }

    Ok(rel.to_path_buf())
}

/// Join a host-relative path onto a container directory.
///
/// Container paths are always `/`-separated regardless of the host platform.
pub fn container_join(container_dir: &str, rel: &Path) -> String {
    let mut joined = container_dir.trim_end_matches('/').to_string();
    for component in rel.components() {
        if let Component::Normal(part) = component {
            joined.push('/');
            joined.push_str(&part.to_string_lossy());
        }
    }
    if joined.is_empty() {
        joined.push('/');
    }
    joined
}

/// Container directory an entry at `rel` should be copied into.
pub fn container_parent(container_dir: &str, rel: &Path) -> String {
    match rel.parent() {
        Some(parent) => container_join(container_dir, parent),
        None => container_join(container_dir, Path::new("")),
    }
}

/// Lexically resolve `.` and `..` components of an absolute path.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

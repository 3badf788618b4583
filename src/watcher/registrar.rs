//! Watch registrar: keeps every directory under the host root registered.
//!
//! Registration is per directory, never per file. The registrar remembers
//! which directories it registered (the watch set) so overlapping walks
//! register each directory once, and so removed directories can be
//! forgotten again.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::WatchError;
use super::service::WatchService;

/// Registers directory trees with a [`WatchService`].
pub struct WatchRegistrar<W> {
    service: W,
    /// Directories currently registered.
    watch_set: HashSet<PathBuf>,
}

impl<W: WatchService> WatchRegistrar<W> {
    /// Create a registrar owning `service`.
    pub fn new(service: W) -> Self {
        Self {
            service,
            watch_set: HashSet::new(),
        }
    }

    /// Register every directory at or below `root`.
    ///
    /// Entries that disappear mid-walk are skipped. Symlinks are never
    /// followed, not even when `root` itself is one. Returns the number of
    /// directories newly registered.
    pub fn register_tree(&mut self, root: &Path) -> Result<usize, WatchError> {
        let mut registered = 0;

        let walk = WalkDir::new(root)
            .follow_links(false)
            .follow_root_links(false);
        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_not_found(&e) => {
                    crate::debug_event!(
                        "watcher",
                        "vanished during walk",
                        "{}",
                        e.path().unwrap_or(root).display()
                    );
                    continue;
                }
                Err(e) => {
                    return Err(WatchError::Walk {
                        path: e.path().unwrap_or(root).to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            if self.register_dir(entry.path())? {
                registered += 1;
            }
        }

        Ok(registered)
    }

    /// Register a single directory. Returns `false` if it was already
    /// registered or vanished before registration.
    fn register_dir(&mut self, dir: &Path) -> Result<bool, WatchError> {
        if self.watch_set.contains(dir) {
            return Ok(false);
        }

        match self.service.watch(dir) {
            Ok(()) => {
                crate::debug_event!("watcher", "watching", "{}", dir.display());
                self.watch_set.insert(dir.to_path_buf());
                Ok(true)
            }
            Err(WatchError::PathMissing { .. }) => {
                crate::debug_event!("watcher", "vanished before watch", "{}", dir.display());
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Unregister every registered directory at or below `path`.
    ///
    /// The OS usually drops watches on deleted directories by itself, so
    /// unwatch failures are only logged. Returns the number forgotten.
    pub fn forget_tree(&mut self, path: &Path) -> usize {
        let stale: Vec<PathBuf> = self
            .watch_set
            .iter()
            .filter(|dir| dir.starts_with(path))
            .cloned()
            .collect();

        for dir in &stale {
            self.watch_set.remove(dir);
            if let Err(e) = self.service.unwatch(dir) {
                crate::debug_event!("watcher", "unwatch skipped", "{e}");
            } else {
                crate::debug_event!("watcher", "unwatched", "{}", dir.display());
            }
        }

        stale.len()
    }

    /// Whether `dir` is currently registered.
    pub fn is_watched(&self, dir: &Path) -> bool {
        self.watch_set.contains(dir)
    }

    /// Number of registered directories.
    pub fn dir_count(&self) -> usize {
        self.watch_set.len()
    }

    /// The underlying watch service.
    pub fn service(&self) -> &W {
        &self.service
    }
}

fn is_not_found(e: &walkdir::Error) -> bool {
    e.io_error()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Records calls; optionally fails on one directory.
    #[derive(Default)]
    struct RecordingService {
        watched: Vec<PathBuf>,
        unwatched: Vec<PathBuf>,
        missing: Option<PathBuf>,
    }

    impl WatchService for RecordingService {
        fn watch(&mut self, dir: &Path) -> Result<(), WatchError> {
            if self.missing.as_deref() == Some(dir) {
                return Err(WatchError::PathMissing {
                    path: dir.to_path_buf(),
                });
            }
            self.watched.push(dir.to_path_buf());
            Ok(())
        }

        fn unwatch(&mut self, dir: &Path) -> Result<(), WatchError> {
            self.unwatched.push(dir.to_path_buf());
            Ok(())
        }
    }

    fn tree() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::create_dir_all(root.join("d")).unwrap();
        fs::write(root.join("top.txt"), "x").unwrap();
        fs::write(root.join("a/b/file.txt"), "x").unwrap();
        fs::write(root.join("a/b/c/deep.txt"), "x").unwrap();
        temp_dir
    }

    #[test]
    fn test_registers_every_directory_once() {
        let temp_dir = tree();
        let root = temp_dir.path();
        let mut registrar = WatchRegistrar::new(RecordingService::default());

        let count = registrar.register_tree(root).unwrap();

        let mut watched = registrar.service().watched.clone();
        watched.sort();
        let mut expected = vec![
            root.to_path_buf(),
            root.join("a"),
            root.join("a/b"),
            root.join("a/b/c"),
            root.join("d"),
        ];
        expected.sort();

        assert_eq!(count, 5);
        assert_eq!(watched, expected);
        assert_eq!(registrar.dir_count(), 5);
    }

    #[test]
    fn test_files_are_never_registered() {
        let temp_dir = tree();
        let mut registrar = WatchRegistrar::new(RecordingService::default());

        registrar.register_tree(temp_dir.path()).unwrap();

        assert!(registrar.service().watched.iter().all(|p| p.is_dir()));
    }

    #[test]
    fn test_overlapping_walk_registers_only_new_dirs() {
        let temp_dir = tree();
        let root = temp_dir.path();
        let mut registrar = WatchRegistrar::new(RecordingService::default());
        registrar.register_tree(root).unwrap();

        fs::create_dir_all(root.join("a/new/inner")).unwrap();
        let count = registrar.register_tree(&root.join("a")).unwrap();

        assert_eq!(count, 2);
        assert_eq!(registrar.service().watched.len(), 7);
        assert!(registrar.is_watched(&root.join("a/new/inner")));
    }

    #[test]
    fn test_vanished_directory_is_not_fatal() {
        let temp_dir = tree();
        let root = temp_dir.path();
        let service = RecordingService {
            missing: Some(root.join("d")),
            ..Default::default()
        };
        let mut registrar = WatchRegistrar::new(service);

        let count = registrar.register_tree(root).unwrap();

        assert_eq!(count, 4);
        assert!(!registrar.is_watched(&root.join("d")));
    }

    #[test]
    fn test_missing_root_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut registrar = WatchRegistrar::new(RecordingService::default());

        let count = registrar.register_tree(&temp_dir.path().join("gone")).unwrap();

        assert_eq!(count, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_not_followed() {
        let temp_dir = tree();
        let root = temp_dir.path();
        let outside = TempDir::new().unwrap();
        fs::create_dir_all(outside.path().join("x/y")).unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("link")).unwrap();
        let mut registrar = WatchRegistrar::new(RecordingService::default());

        assert_eq!(registrar.register_tree(root).unwrap(), 5);
        assert_eq!(registrar.register_tree(&root.join("link")).unwrap(), 0);
        assert!(!registrar.is_watched(&root.join("link")));
        assert!(!registrar.is_watched(&root.join("link/x/y")));
    }

    #[test]
    fn test_forget_tree_unwatches_subtree() {
        let temp_dir = tree();
        let root = temp_dir.path();
        let mut registrar = WatchRegistrar::new(RecordingService::default());
        registrar.register_tree(root).unwrap();

        let forgotten = registrar.forget_tree(&root.join("a"));

        assert_eq!(forgotten, 3);
        assert_eq!(registrar.dir_count(), 2);
        assert!(!registrar.is_watched(&root.join("a/b/c")));
        assert!(registrar.is_watched(&root.join("d")));

        // Forgotten directories can be registered again
        assert_eq!(registrar.register_tree(&root.join("a")).unwrap(), 3);
    }

    #[test]
    fn test_forget_file_path_is_noop() {
        let temp_dir = tree();
        let root = temp_dir.path();
        let mut registrar = WatchRegistrar::new(RecordingService::default());
        registrar.register_tree(root).unwrap();

        assert_eq!(registrar.forget_tree(&root.join("top.txt")), 0);
        assert!(registrar.service().unwatched.is_empty());
    }
}

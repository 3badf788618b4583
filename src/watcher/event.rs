//! File events as the sync loop sees them.
//!
//! A [`FileEvent`] is one notification for one path. The watch service turns
//! each raw `notify::Event` into zero or more of these before they reach the
//! loop, so nothing downstream depends on notify's platform-specific kinds.

use std::path::{Path, PathBuf};

use bitflags::bitflags;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};

bitflags! {
    /// Change kinds carried by a single notification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChangeKind: u8 {
        const WRITE = 1 << 0;
        const CREATE = 1 << 1;
        const REMOVE = 1 << 2;
        const RENAME = 1 << 3;
    }
}

/// One filesystem notification for one absolute host path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub kinds: ChangeKind,
}

impl FileEvent {
    pub fn new(path: impl Into<PathBuf>, kinds: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kinds,
        }
    }

    pub fn write(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::WRITE)
    }

    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::CREATE)
    }

    pub fn remove(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::REMOVE)
    }

    pub fn rename(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::RENAME)
    }

    /// Whether this event carries any of `kinds`.
    pub fn has(&self, kinds: ChangeKind) -> bool {
        self.kinds.intersects(kinds)
    }

    /// Convert a raw notify event into per-path file events.
    ///
    /// Renames are split so the old name carries `RENAME` and the new name
    /// carries `CREATE`. Backends that cannot tell the two sides apart
    /// (`RenameMode::Any`) are resolved by checking whether the path exists.
    pub fn from_notify(event: Event) -> Vec<FileEvent> {
        match event.kind {
            EventKind::Modify(ModifyKind::Name(mode)) => rename_events(mode, event.paths),
            kind => {
                let kinds = kinds_for(kind);
                event
                    .paths
                    .into_iter()
                    .map(|path| FileEvent::new(path, kinds))
                    .collect()
            }
        }
    }
}

fn kinds_for(kind: EventKind) -> ChangeKind {
    match kind {
        EventKind::Create(_) => ChangeKind::CREATE,
        EventKind::Remove(_) => ChangeKind::REMOVE,
        EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKind::empty(),
        EventKind::Modify(_) => ChangeKind::WRITE,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => ChangeKind::empty(),
    }
}

fn rename_events(mode: RenameMode, paths: Vec<PathBuf>) -> Vec<FileEvent> {
    match mode {
        RenameMode::From => paths.into_iter().map(FileEvent::rename).collect(),
        RenameMode::To => paths.into_iter().map(FileEvent::create).collect(),
        RenameMode::Both => {
            let mut paths = paths.into_iter();
            let mut events = Vec::with_capacity(2);
            if let Some(from) = paths.next() {
                events.push(FileEvent::rename(from));
            }
            events.extend(paths.map(FileEvent::create));
            events
        }
        RenameMode::Any | RenameMode::Other => paths
            .into_iter()
            .map(|path| {
                if exists(&path) {
                    FileEvent::create(path)
                } else {
                    FileEvent::rename(path)
                }
            })
            .collect(),
    }
}

fn exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind};
    use tempfile::TempDir;

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |e, p| e.add_path(PathBuf::from(p)))
    }

    #[test]
    fn test_basic_kinds() {
        let events = FileEvent::from_notify(event(
            EventKind::Create(CreateKind::File),
            &["/src/a.txt"],
        ));
        assert_eq!(events, vec![FileEvent::create("/src/a.txt")]);

        let events = FileEvent::from_notify(event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/src/a.txt"],
        ));
        assert_eq!(events, vec![FileEvent::write("/src/a.txt")]);

        let events = FileEvent::from_notify(event(
            EventKind::Remove(RemoveKind::File),
            &["/src/a.txt"],
        ));
        assert_eq!(events, vec![FileEvent::remove("/src/a.txt")]);
    }

    #[test]
    fn test_metadata_and_access_carry_no_kinds() {
        let events = FileEvent::from_notify(event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            &["/src/a.txt"],
        ));
        assert_eq!(events.len(), 1);
        assert!(events[0].kinds.is_empty());
    }

    #[test]
    fn test_one_event_per_path() {
        let events = FileEvent::from_notify(event(
            EventKind::Remove(RemoveKind::Any),
            &["/src/a.txt", "/src/b.txt"],
        ));
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.kinds == ChangeKind::REMOVE));
    }

    #[test]
    fn test_rename_both_splits_into_rename_and_create() {
        let events = FileEvent::from_notify(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/src/old.txt", "/src/new.txt"],
        ));
        assert_eq!(
            events,
            vec![
                FileEvent::rename("/src/old.txt"),
                FileEvent::create("/src/new.txt"),
            ]
        );
    }

    #[test]
    fn test_rename_from_and_to() {
        let from = FileEvent::from_notify(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            &["/src/old.txt"],
        ));
        assert_eq!(from, vec![FileEvent::rename("/src/old.txt")]);

        let to = FileEvent::from_notify(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/src/new.txt"],
        ));
        assert_eq!(to, vec![FileEvent::create("/src/new.txt")]);
    }

    #[test]
    fn test_ambiguous_rename_resolved_by_existence() {
        let temp_dir = TempDir::new().unwrap();
        let present = temp_dir.path().join("present.txt");
        std::fs::write(&present, "x").unwrap();
        let gone = temp_dir.path().join("gone.txt");

        let events = FileEvent::from_notify(
            Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Any)))
                .add_path(present.clone())
                .add_path(gone.clone()),
        );

        assert_eq!(
            events,
            vec![FileEvent::create(present), FileEvent::rename(gone)]
        );
    }

    #[test]
    fn test_has_checks_any_of() {
        let event = FileEvent::new("/src/a.txt", ChangeKind::WRITE | ChangeKind::REMOVE);
        assert!(event.has(ChangeKind::WRITE | ChangeKind::CREATE));
        assert!(event.has(ChangeKind::REMOVE));
        assert!(!event.has(ChangeKind::RENAME));
    }
}

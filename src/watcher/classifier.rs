//! Event classification.
//!
//! Maps each [`FileEvent`] to the container action it implies. Write and
//! create both mean "the entry now exists with content to push"; remove and
//! rename both mean "the old path no longer holds valid content".

use super::event::{ChangeKind, FileEvent};

/// Suffixes ignored when no others are configured.
pub const DEFAULT_IGNORED_SUFFIXES: &[&str] = &["~", ".swp", ".swx"];

/// Action the sync loop should take for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Copy the entry into the container, then set its ownership.
    Upsert,

    /// Remove the entry from the container.
    Delete,

    /// Do nothing.
    Ignore(IgnoreReason),
}

/// Why an event was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Editor backup or swap file.
    BackupFile,

    /// No supported change kind (metadata, access, ...).
    UnsupportedKind,
}

/// Decides a [`SyncAction`] per event.
#[derive(Debug, Clone)]
pub struct Classifier {
    ignored_suffixes: Vec<String>,
}

impl Classifier {
    /// Create a classifier ignoring paths that end in any of `suffixes`.
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored_suffixes: suffixes
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    /// Whether `event`'s path ends in an ignored suffix.
    pub fn is_backup(&self, event: &FileEvent) -> bool {
        let path = event.path.to_string_lossy();
        self.ignored_suffixes
            .iter()
            .any(|suffix| path.ends_with(suffix.as_str()))
    }

    /// Classify an event. Rules apply in order; the first match wins.
    pub fn classify(&self, event: &FileEvent) -> SyncAction {
        if self.is_backup(event) {
            SyncAction::Ignore(IgnoreReason::BackupFile)
        } else if event.has(ChangeKind::WRITE | ChangeKind::CREATE) {
            SyncAction::Upsert
        } else if event.has(ChangeKind::REMOVE | ChangeKind::RENAME) {
            SyncAction::Delete
        } else {
            SyncAction::Ignore(IgnoreReason::UnsupportedKind)
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORED_SUFFIXES.iter().copied())
    }
}

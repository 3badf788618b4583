//! Watch service: the notification primitive behind the registrar.
//!
//! The OS watcher needs one registration per directory; it reports
//! changes to entries directly inside each registered directory.

use std::path::Path;

use crossbeam_channel::{Receiver, Sender, unbounded};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use super::WatchError;
use super::event::FileEvent;

/// Directory registration with the notification service.
pub trait WatchService: Send {
    /// Start reporting changes to entries directly inside `dir`.
    fn watch(&mut self, dir: &Path) -> Result<(), WatchError>;

    /// Stop reporting changes for `dir`.
    fn unwatch(&mut self, dir: &Path) -> Result<(), WatchError>;
}

/// Receiving ends of a [`NotifyWatchService`].
pub struct WatchChannels {
    pub events: Receiver<FileEvent>,
    pub errors: Receiver<WatchError>,
}

/// [`WatchService`] backed by `notify::RecommendedWatcher`.
///
/// Events and errors are delivered on separate unbounded channels, in the
/// order the OS reports them.
pub struct NotifyWatchService {
    watcher: RecommendedWatcher,
}

impl NotifyWatchService {
    /// Create the OS watcher along with its delivery channels.
    pub fn new() -> Result<(Self, WatchChannels), WatchError> {
        let (event_tx, event_rx) = unbounded();
        let (error_tx, error_rx) = unbounded();

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            forward(res, &event_tx, &error_tx);
        })?;

        Ok((
            Self { watcher },
            WatchChannels {
                events: event_rx,
                errors: error_rx,
            },
        ))
    }
}

impl WatchService for NotifyWatchService {
    fn watch(&mut self, dir: &Path) -> Result<(), WatchError> {
        self.watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| path_error(dir, e))
    }

    fn unwatch(&mut self, dir: &Path) -> Result<(), WatchError> {
        self.watcher.unwatch(dir).map_err(|e| path_error(dir, e))
    }
}

fn forward(res: notify::Result<Event>, events: &Sender<FileEvent>, errors: &Sender<WatchError>) {
    match res {
        Ok(event) => {
            for file_event in FileEvent::from_notify(event) {
                // Receiver gone means the loop exited; nothing left to deliver to
                let _ = events.send(file_event);
            }
        }
        Err(e) => {
            let _ = errors.send(WatchError::EventError {
                details: e.to_string(),
            });
        }
    }
}

fn path_error(dir: &Path, e: notify::Error) -> WatchError {
    let missing = match e.kind {
        notify::ErrorKind::PathNotFound => true,
        notify::ErrorKind::Io(ref io) => io.kind() == std::io::ErrorKind::NotFound,
        _ => false,
    };
    if missing {
        WatchError::PathMissing {
            path: dir.to_path_buf(),
        }
    } else {
        WatchError::PathWatchFailed {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use notify::event::CreateKind;
    use std::path::PathBuf;

    #[test]
    fn test_forward_splits_events_and_errors() {
        let (event_tx, event_rx) = unbounded();
        let (error_tx, error_rx) = unbounded();

        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/src/a.txt"))
            .add_path(PathBuf::from("/src/b.txt"));
        forward(Ok(event), &event_tx, &error_tx);
        forward(
            Err(notify::Error::generic("queue overflow")),
            &event_tx,
            &error_tx,
        );

        let events: Vec<FileEvent> = event_rx.try_iter().collect();
        assert_eq!(
            events,
            vec![FileEvent::create("/src/a.txt"), FileEvent::create("/src/b.txt")]
        );

        let errors: Vec<WatchError> = error_rx.try_iter().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("queue overflow"));
    }

    #[test]
    fn test_missing_directory_is_recognized() {
        let err = path_error(Path::new("/gone"), notify::Error::path_not_found());
        assert!(matches!(err, WatchError::PathMissing { .. }));

        let err = path_error(Path::new("/src"), notify::Error::generic("too many watches"));
        assert!(matches!(err, WatchError::PathWatchFailed { .. }));
    }

    #[test]
    fn test_notify_service_watches_real_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let (mut service, _channels) = NotifyWatchService::new().unwrap();

        service.watch(temp_dir.path()).unwrap();
        service.unwatch(temp_dir.path()).unwrap();

        let err = service.watch(&temp_dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, WatchError::PathMissing { .. }));
    }
}

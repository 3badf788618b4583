//! The sync loop: one consumer turning file events into container actions.

use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, select};

use crate::config::SyncConfig;
use crate::container::{ContainerRuntime, RuntimeError};
use crate::display::Console;
use crate::path::{self, PathResolutionError};

use super::classifier::{Classifier, IgnoreReason, SyncAction};
use super::error::WatchError;
use super::event::FileEvent;
use super::registrar::WatchRegistrar;
use super::service::{WatchChannels, WatchService};

/// What [`SyncLoop::dispatch`] did with one event.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Copied in and ownership applied.
    Synced { relative: PathBuf },

    /// Copy failed; ownership was not attempted.
    CopyFailed {
        relative: PathBuf,
        error: RuntimeError,
    },

    /// Copied in, but setting ownership failed.
    OwnershipFailed {
        relative: PathBuf,
        error: RuntimeError,
    },

    /// Removed from the container.
    Removed { relative: PathBuf },

    /// Removal failed.
    RemoveFailed {
        relative: PathBuf,
        error: RuntimeError,
    },

    /// Classified as nothing to do.
    Ignored(IgnoreReason),

    /// Path could not be mapped into the container.
    Dropped(PathResolutionError),
}

/// Single-consumer dispatcher from file events to container actions.
///
/// Events are handled one at a time in delivery order. Each container
/// action is attempted at most once per event; failures are reported and
/// the loop moves on.
pub struct SyncLoop<R, W> {
    config: SyncConfig,
    classifier: Classifier,
    registrar: WatchRegistrar<W>,
    runtime: R,
    console: Console,
    events: Receiver<FileEvent>,
    errors: Receiver<WatchError>,
}

impl<R: ContainerRuntime, W: WatchService> SyncLoop<R, W> {
    /// Create a loop reading from `channels`.
    pub fn new(
        config: SyncConfig,
        registrar: WatchRegistrar<W>,
        runtime: R,
        channels: WatchChannels,
    ) -> Self {
        Self {
            config,
            classifier: Classifier::default(),
            registrar,
            runtime,
            console: Console::detect(),
            events: channels.events,
            errors: channels.errors,
        }
    }

    /// Use `classifier` instead of the default suffix list.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Use `console` for operator output.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// The registrar owning the watch set.
    pub fn registrar(&self) -> &WatchRegistrar<W> {
        &self.registrar
    }

    /// Process events until a delivery channel disconnects.
    ///
    /// With a live watch service this never returns.
    pub fn run(mut self) -> Result<(), WatchError> {
        crate::log_event!(
            "sync",
            "started",
            "{} directories watched",
            self.registrar.dir_count()
        );

        let events = self.events.clone();
        let errors = self.errors.clone();

        loop {
            select! {
                recv(events) -> msg => match msg {
                    Ok(event) => {
                        self.dispatch(&event);
                    }
                    Err(_) => return Err(WatchError::ChannelClosed),
                },
                recv(errors) -> msg => match msg {
                    Ok(e) => {
                        tracing::error!("[watcher] file watch error: {e}");
                        self.console.error(&e);
                    }
                    Err(_) => return Err(WatchError::ChannelClosed),
                },
            }
        }
    }

    /// Handle one event: classify, map the path, act on the container.
    pub fn dispatch(&mut self, event: &FileEvent) -> DispatchOutcome {
        match self.classifier.classify(event) {
            SyncAction::Ignore(reason) => self.ignore(event, reason),
            SyncAction::Upsert => match self.resolve(&event.path) {
                Ok(relative) => self.upsert(&event.path, relative),
                Err(e) => drop_event(e),
            },
            SyncAction::Delete => match self.resolve(&event.path) {
                Ok(relative) => self.delete(&event.path, relative),
                Err(e) => drop_event(e),
            },
        }
    }

    fn resolve(&self, host_path: &Path) -> Result<PathBuf, PathResolutionError> {
        path::relative(&self.config.host_path, host_path)
    }

    fn ignore(&self, event: &FileEvent, reason: IgnoreReason) -> DispatchOutcome {
        match reason {
            IgnoreReason::BackupFile => self.console.skipped(&event.path),
            IgnoreReason::UnsupportedKind => crate::debug_event!(
                "sync",
                "unsupported",
                "{:?} {}",
                event.kinds,
                event.path.display()
            ),
        }
        DispatchOutcome::Ignored(reason)
    }

    fn upsert(&mut self, host_path: &Path, relative: PathBuf) -> DispatchOutcome {
        // New directories are registered before the copy so entries created
        // inside them from now on are reported. Symlinks are synced as entries,
        // never followed, matching the startup walk.
        if is_real_dir(host_path) {
            self.watch_new_directory(host_path);
        }

        let config = &self.config;
        let container_dir = path::container_parent(&config.container_path, &relative);
        let target = path::container_join(&config.container_path, &relative);

        if let Err(error) = self
            .runtime
            .copy_in(host_path, &config.container_name, &container_dir)
        {
            tracing::warn!("[sync] copy failed for {}: {error}", relative.display());
            self.console
                .failure(&relative, "can't copy to container", &error);
            return DispatchOutcome::CopyFailed { relative, error };
        }

        self.console
            .copied(&relative, &config.container_name, &target);
        crate::log_event!("sync", "copied", "{}", relative.display());

        if let Err(error) = self.runtime.set_ownership(
            &config.container_name,
            &target,
            &config.user,
            &config.group,
        ) {
            tracing::warn!("[sync] chown failed for {}: {error}", relative.display());
            self.console
                .failure(&relative, "can't change ownership in container", &error);
            return DispatchOutcome::OwnershipFailed { relative, error };
        }

        DispatchOutcome::Synced { relative }
    }

    fn delete(&mut self, host_path: &Path, relative: PathBuf) -> DispatchOutcome {
        let forgotten = self.registrar.forget_tree(host_path);
        if forgotten > 0 {
            crate::debug_event!(
                "watcher",
                "forgot",
                "{forgotten} directories under {}",
                host_path.display()
            );
        }

        let config = &self.config;
        let target = path::container_join(&config.container_path, &relative);

        match self.runtime.remove_path(&config.container_name, &target) {
            Ok(()) => {
                self.console.removed(&target);
                crate::log_event!("sync", "removed", "{}", relative.display());
                DispatchOutcome::Removed { relative }
            }
            Err(error) => {
                tracing::warn!("[sync] remove failed for {}: {error}", relative.display());
                self.console
                    .failure(&relative, "can't remove from container", &error);
                DispatchOutcome::RemoveFailed { relative, error }
            }
        }
    }

    fn watch_new_directory(&mut self, dir: &Path) {
        match self.registrar.register_tree(dir) {
            Ok(0) => {}
            Ok(count) => {
                crate::log_event!("watcher", "watching new", "{count} under {}", dir.display())
            }
            Err(e) => {
                tracing::warn!("[watcher] failed to watch {}: {e}", dir.display());
                self.console.error(&e);
            }
        }
    }
}

fn is_real_dir(path: &Path) -> bool {
    path.symlink_metadata()
        .is_ok_and(|meta| meta.file_type().is_dir())
}

fn drop_event(e: PathResolutionError) -> DispatchOutcome {
    crate::debug_event!("sync", "dropped", "{e}");
    DispatchOutcome::Dropped(e)
}

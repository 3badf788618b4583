//! Startup and process lifetime.
//!
//! Order matters: the runtime check runs before anything is registered, so
//! a missing runtime exits without touching the watch set.

use std::thread;

use thiserror::Error;

use crate::config::{ConfigError, Settings, SyncConfig};
use crate::container::{ContainerRuntime, DockerCli, RuntimeError};
use crate::display::Console;
use crate::watcher::{
    Classifier, NotifyWatchService, SyncLoop, WatchChannels, WatchError, WatchRegistrar,
    WatchService,
};

/// Errors that end the process.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(
        "{runtime} command not found. Make sure {runtime} is installed and running. ({source})"
    )]
    RuntimeUnavailable {
        runtime: String,
        #[source]
        source: RuntimeError,
    },

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error("Failed to spawn sync thread")]
    Thread(#[source] std::io::Error),

    #[error("Sync thread panicked")]
    LoopPanicked,
}

/// Check the runtime, register the host tree and return the ready loop.
///
/// A failed initial walk is reported and startup continues with whatever
/// was registered.
pub fn start<R, W>(
    config: SyncConfig,
    classifier: Classifier,
    runtime: R,
    service: W,
    channels: WatchChannels,
    console: Console,
) -> Result<SyncLoop<R, W>, AppError>
where
    R: ContainerRuntime,
    W: WatchService,
{
    let version = runtime
        .check_available()
        .map_err(|source| AppError::RuntimeUnavailable {
            runtime: runtime.name().to_string(),
            source,
        })?;
    crate::debug_event!("docker", "available", "{version}");

    console.notice(format!("Host path: {}", config.host_path.display()));

    let mut registrar = WatchRegistrar::new(service);
    match registrar.register_tree(&config.host_path) {
        Ok(count) => crate::log_event!("watcher", "monitoring", "{count} directories"),
        Err(e) => {
            tracing::error!("[watcher] initial registration incomplete: {e}");
            console.error(&e);
        }
    }

    Ok(SyncLoop::new(config, registrar, runtime, channels)
        .with_classifier(classifier)
        .with_console(console))
}

/// Run the syncer described by `settings` until the process is killed.
pub fn run(settings: &Settings) -> Result<(), AppError> {
    let console = Console::detect();
    console.notice("Watching...");

    let config = settings.sync_config()?;
    let runtime = DockerCli::new(&settings.runtime.binary);
    let classifier = Classifier::new(settings.ignore.suffixes.iter().cloned());
    let (service, channels) = NotifyWatchService::new()?;

    let sync_loop = start(config, classifier, runtime, service, channels, console)?;

    let handle = thread::Builder::new()
        .name("sync-loop".to_string())
        .spawn(move || sync_loop.run())
        .map_err(AppError::Thread)?;

    // The loop owns the watcher, so its channels stay open and this blocks
    // for the life of the process
    match handle.join() {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => Err(AppError::LoopPanicked),
    }
}

//! Keep a running container's copy of a host directory in sync.
//!
//! Host-side writes, creations, deletions and renames are turned into
//! `docker cp` / `docker exec` invocations against a single container.
//! Sync is one-way and best effort: a failed action is reported and the
//! next change to the same path gets another chance.

pub mod app;
pub mod cli;
pub mod config;
pub mod container;
pub mod display;
pub mod logging;
pub mod path;
pub mod watcher;

pub use app::AppError;
pub use config::{Settings, SyncConfig};
pub use container::{ContainerRuntime, DockerCli, RuntimeError};
pub use path::PathResolutionError;
pub use watcher::{
    ChangeKind, Classifier, DispatchOutcome, FileEvent, SyncAction, SyncLoop, WatchError,
    WatchRegistrar, WatchService,
};

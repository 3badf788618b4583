//! File watching and event dispatch.
//!
//! # Architecture
//!
//! ```text
//! notify::RecommendedWatcher (one registration per directory)
//!   - NotifyWatchService: raw events -> FileEvent / WatchError channels
//!         |
//!    WatchRegistrar (owns the service and the watch set)
//!         |
//!    SyncLoop (single consumer)
//!      Classifier -> path mapping -> ContainerRuntime
//! ```

mod classifier;
mod error;
mod event;
mod registrar;
mod service;
mod sync_loop;

pub use classifier::{Classifier, DEFAULT_IGNORED_SUFFIXES, IgnoreReason, SyncAction};
pub use error::WatchError;
pub use event::{ChangeKind, FileEvent};
pub use registrar::WatchRegistrar;
pub use service::{NotifyWatchService, WatchChannels, WatchService};
pub use sync_loop::{DispatchOutcome, SyncLoop};

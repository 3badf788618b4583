//! Container-side actions.
//!
//! The only I/O boundary besides the filesystem watch. Every action is one
//! external process invocation against the container runtime, attempted
//! once per event with no retry.
//!
//! ```text
//! SyncLoop --> dyn ContainerRuntime
//!                 |-- DockerCli      (spawns `docker cp` / `docker exec`)
//!                 `-- test doubles   (record calls)
//! ```

mod docker;
mod error;
mod runtime;

pub use docker::DockerCli;
pub use error::RuntimeError;
pub use runtime::ContainerRuntime;

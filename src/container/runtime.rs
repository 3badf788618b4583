//! Capability trait for the container runtime.

use std::path::Path;

use super::RuntimeError;

/// Operations the sync loop performs against a container.
///
/// Implementations block until the underlying invocation finishes. A slow
/// runtime stalls event processing; there is no timeout.
pub trait ContainerRuntime: Send {
    /// Runtime name for logging.
    fn name(&self) -> &str;

    /// Verify the runtime can be invoked at all, returning its version line.
    fn check_available(&self) -> Result<String, RuntimeError>;

    /// Copy the host entry at `host_path` into `container_dir` inside `container`.
    ///
    /// Overwrites an existing entry of the same name.
    fn copy_in(
        &self,
        host_path: &Path,
        container: &str,
        container_dir: &str,
    ) -> Result<(), RuntimeError>;

    /// Set owner and group of `path` inside `container`.
    fn set_ownership(
        &self,
        container: &str,
        path: &str,
        user: &str,
        group: &str,
    ) -> Result<(), RuntimeError>;

    /// Delete the file at `path` inside `container`.
    fn remove_path(&self, container: &str, path: &str) -> Result<(), RuntimeError>;
}

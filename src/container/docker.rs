//! Docker CLI backend.
//!
//! Each action spawns the runtime binary and waits for it:
//!
//! - copy:      `docker cp <host path> <container>:<dir>`
//! - ownership: `docker exec <container> chown <user>:<group> <path>`
//! - delete:    `docker exec <container> rm <path>`
//! - check:     `docker -v`

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{ContainerRuntime, RuntimeError};

/// Container runtime driven through the `docker` command line.
///
/// Any CLI that accepts the same `cp`/`exec` shapes (e.g. `podman`) works
/// by pointing `binary` at it.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
    /// File name of `binary`, used in messages.
    name: String,
}

impl DockerCli {
    /// Create a backend that invokes `binary`.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        let binary = binary.into();
        let name = binary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| binary.to_string_lossy().into_owned());
        Self { binary, name }
    }

    /// Run the runtime binary with `args`, returning stdout on success.
    fn run<I, S>(&self, args: I) -> Result<String, RuntimeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        let command = render(&cmd);

        crate::debug_event!("docker", "exec", "{command}");

        let output = cmd.output().map_err(|source| RuntimeError::Spawn {
            command: command.clone(),
            source,
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(RuntimeError::CommandFailed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl ContainerRuntime for DockerCli {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_available(&self) -> Result<String, RuntimeError> {
        self.run(["-v"])
    }

    fn copy_in(
        &self,
        host_path: &Path,
        container: &str,
        container_dir: &str,
    ) -> Result<(), RuntimeError> {
        self.run(copy_args(host_path, container, container_dir))?;
        Ok(())
    }

    fn set_ownership(
        &self,
        container: &str,
        path: &str,
        user: &str,
        group: &str,
    ) -> Result<(), RuntimeError> {
        let owner = format!("{user}:{group}");
        self.run(["exec", container, "chown", owner.as_str(), path])?;
        Ok(())
    }

    fn remove_path(&self, container: &str, path: &str) -> Result<(), RuntimeError> {
        self.run(["exec", container, "rm", path])?;
        Ok(())
    }
}

/// Arguments for `cp`: the host path is passed through untouched, the
/// destination is `<container>:<dir>`.
fn copy_args(host_path: &Path, container: &str, container_dir: &str) -> Vec<OsString> {
    vec![
        OsString::from("cp"),
        host_path.as_os_str().to_os_string(),
        OsString::from(format!("{container}:{container_dir}")),
    ]
}

/// Human-readable command line for logs and errors.
fn render(cmd: &Command) -> String {
    let mut line = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

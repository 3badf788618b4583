//! CLI argument parsing using clap.

use clap::{
    Parser,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

use crate::config::Settings;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Mirror a host directory into a running container.
///
/// Host-side writes, creations, deletions and renames are copied into (or
/// removed from) the container as they happen. Changes made inside the
/// container are never copied back.
#[derive(Parser, Debug, Default)]
#[command(
    name = "docker-syncer",
    version,
    about = "Mirror a host directory into a running container",
    long_about = None,
    styles = clap_cargo_style(),
    after_help = "Example:\n  $ docker-syncer --host-path ./src --container-path /var/www/html --container-name web"
)]
pub struct Cli {
    /// Host directory to watch (required unless set in the settings file)
    #[arg(long, value_name = "DIR")]
    pub host_path: Option<PathBuf>,

    /// Target directory inside the container (required unless set in the settings file)
    #[arg(long, value_name = "DIR")]
    pub container_path: Option<String>,

    /// Target container name or id (required unless set in the settings file)
    #[arg(long, value_name = "NAME")]
    pub container_name: Option<String>,

    /// Owner applied to synced files [default: www-data]
    #[arg(long)]
    pub user: Option<String>,

    /// Group applied to synced files [default: www-data]
    #[arg(long)]
    pub group: Option<String>,

    /// Container runtime CLI to invoke [default: docker]
    #[arg(long, value_name = "PROGRAM")]
    pub runtime: Option<PathBuf>,

    /// Path to a settings file (defaults to .docker-syncer/settings.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the merged settings as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Apply flags given on the command line over `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.host_path {
            settings.sync.host_path = Some(path.clone());
        }
        if let Some(path) = &self.container_path {
            settings.sync.container_path = Some(path.clone());
        }
        if let Some(name) = &self.container_name {
            settings.sync.container_name = Some(name.clone());
        }
        if let Some(user) = &self.user {
            settings.sync.user = user.clone();
        }
        if let Some(group) = &self.group {
            settings.sync.group = group.clone();
        }
        if let Some(runtime) = &self.runtime {
            settings.runtime.binary = runtime.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "docker-syncer",
            "--host-path",
            "/src",
            "--container-path",
            "/app",
            "--container-name",
            "web",
            "--user",
            "app",
            "--group",
            "staff",
        ])
        .unwrap();

        assert_eq!(cli.host_path, Some(PathBuf::from("/src")));
        assert_eq!(cli.container_path.as_deref(), Some("/app"));
        assert_eq!(cli.container_name.as_deref(), Some("web"));
        assert_eq!(cli.user.as_deref(), Some("app"));
        assert_eq!(cli.group.as_deref(), Some("staff"));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_apply_overrides_only_given_flags() {
        let mut settings = Settings::default();
        settings.sync.container_name = Some("from-file".to_string());
        settings.sync.user = "file-user".to_string();

        let cli = Cli::try_parse_from(["docker-syncer", "--container-path", "/app", "--group", "staff"])
            .unwrap();
        cli.apply(&mut settings);

        assert_eq!(settings.sync.container_path.as_deref(), Some("/app"));
        assert_eq!(settings.sync.container_name.as_deref(), Some("from-file"));
        assert_eq!(settings.sync.user, "file-user");
        assert_eq!(settings.sync.group, "staff");
    }

    #[test]
    fn test_owner_defaults_come_from_settings() {
        let mut settings = Settings::default();
        Cli::default().apply(&mut settings);

        assert_eq!(settings.sync.user, "www-data");
        assert_eq!(settings.sync.group, "www-data");
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

use clap::Parser;

use docker_syncer::cli::Cli;
use docker_syncer::display::Console;
use docker_syncer::{AppError, Settings, app, logging};

fn main() {
    let cli = Cli::parse();

    let mut settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => fatal(&e.to_string()),
    };
    cli.apply(&mut settings);

    logging::init_with_config(&settings.logging, cli.verbose);

    if cli.print_config {
        match settings.to_toml() {
            Ok(toml) => {
                print!("{toml}");
                return;
            }
            Err(e) => fatal(&format!("Failed to render settings: {e}")),
        }
    }

    if let Err(e) = app::run(&settings) {
        tracing::error!("[app] {e}");
        match e {
            AppError::RuntimeUnavailable { .. } => fatal(&e.to_string()),
            other => fatal(&format!("{:#}", anyhow::Error::new(other))),
        }
    }
}

fn fatal(message: &str) -> ! {
    eprintln!("{}", Console::detect().fatal_line(message));
    std::process::exit(1);
}

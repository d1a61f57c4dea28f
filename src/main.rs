use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use watchlist::cli::commands::{directories, init};
use watchlist::cli::{Cli, Commands};
use watchlist::io::{Envelope, ExitCode, ResultCode};
use watchlist::{RegistryError, Settings, WatchApi, WatchRegistry, logging};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(Settings::default_config_path);
    let json = cli.json;

    let exit_code = match &cli.command {
        Commands::Init { force } => {
            logging::init();
            init::run_init(&config_path, *force, json)
        }
        Commands::Config => with_settings(&config_path, json, |settings| {
            init::run_config(settings, json)
        }),
        Commands::Add { paths } => {
            with_api(&config_path, json, |api| directories::run_add(api, paths, json))
        }
        Commands::Remove { path } => {
            with_api(&config_path, json, |api| directories::run_remove(api, path, json))
        }
        Commands::List => with_api(&config_path, json, |api| directories::run_list(api, json)),
        Commands::Check => with_api(&config_path, json, |api| directories::run_check(api, json)),
        Commands::Prune => with_api(&config_path, json, |api| directories::run_prune(api, json)),
    };
    exit_code.into()
}

/// Load settings, set up logging from them, then run `command`.
fn with_settings(
    config_path: &Path,
    json: bool,
    command: impl FnOnce(&Settings) -> ExitCode,
) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(settings) => settings,
        Err(e) => return report(&e, ResultCode::ConfigError, json),
    };
    logging::init_with_config(&settings.logging);
    command(&settings)
}

/// Open the configured watch list and run `command` against it.
fn with_api(
    config_path: &Path,
    json: bool,
    command: impl FnOnce(&WatchApi) -> ExitCode,
) -> ExitCode {
    with_settings(config_path, json, |settings| {
        let registry = match open_registry(settings) {
            Ok(registry) => registry,
            Err(e) => {
                let code = e
                    .downcast_ref::<RegistryError>()
                    .map(|err| ResultCode::from(err.kind()))
                    .unwrap_or(ResultCode::InternalError);
                return report(&e, code, json);
            }
        };
        command(&WatchApi::new(Arc::new(registry)))
    })
}

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    Settings::load_from(path)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn open_registry(settings: &Settings) -> anyhow::Result<WatchRegistry> {
    tracing::debug!("[main] opening watch list at {}", settings.store_path().display());
    let registry = settings.open_registry().context("Failed to open watch list")?;
    Ok(registry)
}

fn report(error: &anyhow::Error, code: ResultCode, json: bool) -> ExitCode {
    if json {
        let envelope: Envelope<()> = Envelope::error(code, format!("{error:#}"));
        if let Ok(body) = envelope.to_json() {
            println!("{body}");
        }
    } else {
        eprintln!("Error: {error:#}");
    }
    code.exit_code()
}

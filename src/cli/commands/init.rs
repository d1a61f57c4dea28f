//! Init and Config commands.

use std::path::Path;

use super::emit;
use crate::config::Settings;
use crate::io::{EntityType, Envelope, ExitCode, ResultCode};

/// Run init command - create configuration file.
pub fn run_init(config_path: &Path, force: bool, json: bool) -> ExitCode {
    let result = Settings::init_config_file(config_path, force);

    if json {
        let envelope = match result {
            Ok(path) => Envelope::success(path.display().to_string())
                .with_message("Created configuration file"),
            Err(e) => Envelope::error(ResultCode::ConfigError, e.to_string())
                .with_hint("Use --force to overwrite"),
        };
        return emit(&envelope.with_entity_type(EntityType::Settings));
    }

    match result {
        Ok(path) => {
            println!("Created configuration file at: {}", path.display());
            println!("Edit this file to customize your settings.");
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Configuration file: {}", config_path.display());
            ExitCode::ConfigError
        }
    }
}

/// Run config command - display current configuration.
pub fn run_config(config: &Settings, json: bool) -> ExitCode {
    if json {
        let envelope = Envelope::success(config)
            .with_message(format!("Watch list stored at {}", config.store_path().display()))
            .with_entity_type(EntityType::Settings);
        return emit(&envelope);
    }

    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    match toml::to_string_pretty(config) {
        Ok(toml_str) => println!("{toml_str}"),
        Err(e) => {
            eprintln!("Error displaying config: {e}");
            return ExitCode::GeneralError;
        }
    }
    println!("# watch list: {}", config.store_path().display());
    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_init_refuses_overwrite_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        assert_eq!(run_init(&config_path, false, false), ExitCode::Success);
        assert_eq!(run_init(&config_path, false, false), ExitCode::ConfigError);
        assert_eq!(run_init(&config_path, true, true), ExitCode::Success);
    }
}

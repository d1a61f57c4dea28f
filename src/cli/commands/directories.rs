//! Watched folder commands (add, remove, list, check, prune).

use std::path::{Path, PathBuf};

use super::emit;
use crate::api::{AddResponse, WatchApi};
use crate::io::{EntityType, Envelope, ErrorDetails, ExitCode, ResultCode};

/// Add each path, returning one response per input in order.
pub fn add_paths(api: &WatchApi, paths: &[PathBuf]) -> Vec<AddResponse> {
    paths.iter().map(|path| api.add(path)).collect()
}

/// Exit code for a batch of add responses: success when all were added,
/// otherwise the code of the first failure.
fn add_exit_code(responses: &[AddResponse]) -> ExitCode {
    responses
        .iter()
        .find_map(|r| r.kind)
        .map(ExitCode::from)
        .unwrap_or(ExitCode::Success)
}

/// Run add command.
pub fn run_add(api: &WatchApi, paths: &[PathBuf], json: bool) -> ExitCode {
    let responses = add_paths(api, paths);
    let exit_code = add_exit_code(&responses);

    if json {
        let added = responses.iter().filter(|r| r.ok).count();
        let count = responses.len();
        let envelope = match responses.iter().find_map(|r| r.kind) {
            None => Envelope::success(responses)
                .with_message(format!("Added {added} folder(s)")),
            Some(kind) => {
                let message = format!("{} of {count} folder(s) could not be added", count - added);
                let envelope = Envelope::error(ResultCode::from(kind), message)
                    .with_data(responses)
                    .with_hint("Paths must be existing, readable directories not already watched");
                if added > 0 {
                    envelope.partial()
                } else {
                    envelope
                }
            }
        };
        return emit(&envelope.with_entity_type(EntityType::WatchedPath).with_count(count));
    }

    for (input, response) in paths.iter().zip(&responses) {
        match (&response.path, &response.error) {
            (Some(path), _) => println!("Watching: {path}"),
            (None, Some(error)) => eprintln!("Error adding {}: {error}", input.display()),
            (None, None) => {}
        }
    }

    print_watched(api, "\nWatched folders:");
    exit_code
}

/// Run remove command.
pub fn run_remove(api: &WatchApi, path: &Path, json: bool) -> ExitCode {
    let response = api.remove(path);

    if json {
        let envelope = match response.error.clone() {
            Some(error) => Envelope::error(ResultCode::PersistenceFailure, error)
                .with_data(response),
            None if response.removed => Envelope::success(response)
                .with_message(format!("Stopped watching {}", path.display())),
            None => Envelope::success(response)
                .with_message(format!("{} was not watched", path.display())),
        };
        return emit(&envelope.with_entity_type(EntityType::WatchedPath));
    }

    if let Some(error) = &response.error {
        eprintln!("Error: {error}");
        return ExitCode::PersistenceFailure;
    }

    if response.removed {
        println!("Stopped watching: {}", path.display());
    } else {
        println!("Not watched: {}", path.display());
    }
    print_watched(api, "\nWatched folders:");
    ExitCode::Success
}

/// Run list command.
pub fn run_list(api: &WatchApi, json: bool) -> ExitCode {
    let paths = api.list();

    if json {
        let count = paths.len();
        let envelope = Envelope::success(paths)
            .with_message(format!("{count} watched folder(s)"))
            .with_entity_type(EntityType::WatchedPath)
            .with_count(count);
        return emit(&envelope);
    }

    print_watched(api, "Watched folders:");
    ExitCode::Success
}

/// Run check command - report folders that no longer exist.
pub fn run_check(api: &WatchApi, json: bool) -> ExitCode {
    let stale = api.check();
    let total = api.list().len();

    if json {
        let count = stale.len();
        let envelope = if stale.is_empty() {
            Envelope::success(stale).with_message(format!("All {total} watched folder(s) exist"))
        } else {
            Envelope::not_found(format!("{count} watched folder(s) no longer exist"))
                .with_data(stale)
                .with_hint("Run 'watchlist prune' to forget them")
        };
        return emit(&envelope.with_entity_type(EntityType::StalePath).with_count(count));
    }

    if stale.is_empty() {
        println!("All {total} watched folder(s) exist.");
        return ExitCode::Success;
    }

    println!("Missing folders:");
    for path in &stale {
        println!("  - {path}");
    }
    println!("\nRun 'watchlist prune' to forget them.");
    ExitCode::NotFound
}

/// Run prune command.
pub fn run_prune(api: &WatchApi, json: bool) -> ExitCode {
    let response = api.prune();

    if json {
        let count = response.pruned.len();
        let envelope = match response.error.clone() {
            Some(error) => Envelope::error(ResultCode::PersistenceFailure, error)
                .with_data(response)
                .with_error_details(ErrorDetails {
                    suggestions: vec!["Check that the watch list location is writable".to_string()],
                    context: None,
                }),
            None => Envelope::success(response).with_message(format!("Pruned {count} folder(s)")),
        };
        return emit(&envelope.with_entity_type(EntityType::StalePath).with_count(count));
    }

    if let Some(error) = &response.error {
        eprintln!("Error: {error}");
        return ExitCode::PersistenceFailure;
    }

    if response.pruned.is_empty() {
        println!("Nothing to prune.");
    } else {
        println!("Pruned folders:");
        for path in &response.pruned {
            println!("  - {path}");
        }
    }
    ExitCode::Success
}

fn print_watched(api: &WatchApi, header: &str) {
    let paths = api.list();
    println!("{header}");
    if paths.is_empty() {
        println!("  (none)");
        println!("\nTo add folders: watchlist add <path>");
    } else {
        for path in &paths {
            println!("  - {path}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ErrorKind, RegistryOptions, WatchRegistry, WatchStore};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn api(temp_dir: &TempDir) -> WatchApi {
        let registry = WatchRegistry::with_options(
            WatchStore::new(temp_dir.path().join("watched.toml")),
            RegistryOptions {
                home_dir: None,
                prune_on_load: false,
            },
        )
        .unwrap();
        WatchApi::new(Arc::new(registry))
    }

    #[test]
    fn test_add_paths_reports_each_input() {
        let temp_dir = TempDir::new().unwrap();
        let api = api(&temp_dir);
        let good = temp_dir.path().join("good");
        fs::create_dir(&good).unwrap();
        let missing = temp_dir.path().join("missing");

        let responses = add_paths(&api, &[good.clone(), missing, good]);
        assert_eq!(responses.len(), 3);
        assert!(responses[0].ok);
        assert_eq!(responses[1].kind, Some(ErrorKind::NotADirectory));
        assert_eq!(responses[2].kind, Some(ErrorKind::AlreadyWatched));

        // First failure decides the exit code
        assert_eq!(add_exit_code(&responses), ExitCode::NotADirectory);
        assert_eq!(api.list().len(), 1);
    }

    #[test]
    fn test_run_commands_exit_codes() {
        let temp_dir = TempDir::new().unwrap();
        let api = api(&temp_dir);
        let demo = temp_dir.path().join("demo");
        fs::create_dir(&demo).unwrap();

        assert_eq!(run_add(&api, std::slice::from_ref(&demo), false), ExitCode::Success);
        assert_eq!(
            run_add(&api, std::slice::from_ref(&demo), false),
            ExitCode::AlreadyWatched
        );
        assert_eq!(run_list(&api, true), ExitCode::Success);
        assert_eq!(run_check(&api, false), ExitCode::Success);

        fs::remove_dir(&demo).unwrap();
        assert_eq!(run_check(&api, true), ExitCode::NotFound);
        assert_eq!(run_prune(&api, false), ExitCode::Success);
        assert!(api.list().is_empty());

        // Removing something never watched is informational
        assert_eq!(run_remove(&api, &demo, false), ExitCode::Success);
    }
}

//! Main application entry point and high-level flow coordination.
//!
//! Parses the command line, sets up logging and the configuration directory,
//! then hands off to the runner or to a one-shot command:
//!
//! - `args`: command-line parsing and help/version display
//! - `config`: configuration directory selection and loading
//! - `commands`: `season`, `calendar`, `get` and `set`
//! - `Snowfall`: the long-running controller
//!
//! Failures are printed through the logger with their full context chain and
//! the process exits with a non-zero status.

use anyhow::Result;

use snowfall::args::{self, CliAction, GlobalOptions, ParsedArgs};
use snowfall::constants::EXIT_FAILURE;
use snowfall::logger::{Log, LoggerGuard};
use snowfall::{Snowfall, commands, config, log_end, log_error_exit, log_indented};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    if let Err(e) = dispatch(parsed_args.action) {
        Log::set_enabled(true);
        log_error_exit!("{}", e);
        for cause in e.chain().skip(1) {
            log_indented!("Caused by: {}", cause);
        }
        log_end!();
        std::process::exit(EXIT_FAILURE);
    }
}

fn dispatch(action: CliAction) -> Result<()> {
    match action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run {
            globals,
            date,
            worker_command,
        } => {
            let _log_guard = prepare(&globals)?;
            Snowfall::new(globals.debug_enabled)
                .with_date(date)
                .with_worker_command(worker_command)
                .run()
        }
        CliAction::Season {
            globals,
            query,
            json,
        } => {
            let _log_guard = prepare_quiet(&globals, json)?;
            commands::season::handle_season_command(&query, json, globals.debug_enabled)
        }
        CliAction::Calendar {
            globals,
            query,
            json,
        } => {
            let _log_guard = prepare_quiet(&globals, json)?;
            commands::calendar::handle_calendar_command(&query, json)
        }
        CliAction::Get { globals, json } => {
            let _log_guard = prepare_quiet(&globals, json)?;
            commands::get::handle_get_command(json, globals.debug_enabled)
        }
        CliAction::Set {
            globals,
            preference,
        } => {
            let _log_guard = prepare(&globals)?;
            commands::set::handle_set_command(preference, globals.debug_enabled)
        }
    }
}

/// Like [`prepare`], but JSON output must not be mixed with log lines.
fn prepare_quiet(globals: &GlobalOptions, json: bool) -> Result<Option<LoggerGuard>> {
    if json {
        Log::set_enabled(false);
    }
    prepare(globals)
}

/// Apply the global flags shared by every command.
///
/// The returned guard keeps the log file writer alive.
fn prepare(globals: &GlobalOptions) -> Result<Option<LoggerGuard>> {
    config::set_config_dir(globals.config_dir.clone())?;

    match globals.log_file {
        Some(ref path) => Ok(Some(Log::start_file_logging(path.clone())?)),
        None => Ok(None),
    }
}

//! Command-line argument parsing and processing.
//!
//! Global flags may appear anywhere on the command line. The first bare word
//! selects the command; without one the controller runs. Flags that only make
//! sense for a particular command are rejected elsewhere, so typos and
//! misplaced options show the help text instead of being silently ignored.

use chrono::NaiveDate;

use crate::preference::Preference;
use crate::season::CalendarType;
use crate::time_source::parse_date;

/// Flags accepted by every command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalOptions {
    pub debug_enabled: bool,
    pub config_dir: Option<String>,
    pub log_file: Option<String>,
}

/// Season inputs given on the command line. `None` means "use the config".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonQuery {
    pub date: Option<NaiveDate>,
    pub calendar_type: Option<CalendarType>,
    pub hemisphere: Option<String>,
    pub country_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub special: bool,
}

impl SeasonQuery {
    /// True when any location input was given.
    pub fn has_location(&self) -> bool {
        self.hemisphere.is_some()
            || self.country_code.is_some()
            || self.latitude.is_some()
            || self.longitude.is_some()
    }
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the controller on the terminal page
    Run {
        globals: GlobalOptions,
        date: Option<NaiveDate>,
        worker_command: Option<String>,
    },
    /// Classify a date
    Season {
        globals: GlobalOptions,
        query: SeasonQuery,
        json: bool,
    },
    /// List the season boundaries
    Calendar {
        globals: GlobalOptions,
        query: SeasonQuery,
        json: bool,
    },
    /// Print the stored preference
    Get { globals: GlobalOptions, json: bool },
    /// Store a preference
    Set {
        globals: GlobalOptions,
        preference: Preference,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to invalid arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Run,
    Season,
    Calendar,
    Get,
    Set,
}

impl Command {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "run" => Some(Command::Run),
            "season" => Some(Command::Season),
            "calendar" | "cal" => Some(Command::Calendar),
            "get" => Some(Command::Get),
            "set" => Some(Command::Set),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Command::Run => "run",
            Command::Season => "season",
            Command::Calendar => "calendar",
            Command::Get => "get",
            Command::Set => "set",
        }
    }

    /// Command specific flags this command accepts.
    fn accepts(&self, flag: &str) -> bool {
        match self {
            Command::Run => matches!(flag, "--date" | "--worker"),
            Command::Season => matches!(
                flag,
                "--date"
                    | "--calendar"
                    | "--hemisphere"
                    | "--country"
                    | "--lat"
                    | "--lon"
                    | "--special"
                    | "--json"
            ),
            Command::Calendar => {
                matches!(flag, "--hemisphere" | "--country" | "--lat" | "--lon" | "--json")
            }
            Command::Get => flag == "--json",
            Command::Set => false,
        }
    }
}

fn invalid() -> ParsedArgs {
    ParsedArgs {
        action: CliAction::ShowHelpDueToError,
    }
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name and is skipped.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut globals = GlobalOptions::default();
        let mut query = SeasonQuery::default();
        let mut display_help = false;
        let mut display_version = false;
        let mut json = false;
        let mut worker_command: Option<String> = None;
        let mut command: Option<Command> = None;
        let mut positional: Vec<String> = Vec::new();
        let mut command_flags: Vec<&'static str> = Vec::new();

        let mut idx = 0;
        while idx < args_vec.len() {
            let arg = args_vec[idx].as_str();

            // Flags taking a value read it from the next argument
            let mut value = || -> Option<String> {
                idx += 1;
                let value = args_vec.get(idx).cloned();
                if value.is_none() {
                    log_warning!("Missing value for '{}'", arg);
                }
                value
            };

            match arg {
                "-h" | "--help" => display_help = true,
                "-V" | "--version" => display_version = true,
                "-d" | "--debug" => globals.debug_enabled = true,
                "-c" | "--config" => match value() {
                    Some(dir) => globals.config_dir = Some(dir),
                    None => return invalid(),
                },
                "--log" => match value() {
                    Some(file) => globals.log_file = Some(file),
                    None => return invalid(),
                },
                "--date" => {
                    command_flags.push("--date");
                    let Some(raw) = value() else {
                        return invalid();
                    };
                    match parse_date(&raw) {
                        Ok(date) => query.date = Some(date),
                        Err(e) => {
                            log_warning!("{}", e);
                            return invalid();
                        }
                    }
                }
                "--worker" => {
                    command_flags.push("--worker");
                    match value() {
                        Some(cmd) => worker_command = Some(cmd),
                        None => return invalid(),
                    }
                }
                "--calendar" => {
                    command_flags.push("--calendar");
                    let Some(raw) = value() else {
                        return invalid();
                    };
                    match raw.parse::<CalendarType>() {
                        Ok(calendar_type) => query.calendar_type = Some(calendar_type),
                        Err(e) => {
                            log_warning!("{}. Use 'astronomical' or 'meteorological'", e);
                            return invalid();
                        }
                    }
                }
                "--hemisphere" => {
                    command_flags.push("--hemisphere");
                    match value() {
                        Some(hemisphere) => query.hemisphere = Some(hemisphere),
                        None => return invalid(),
                    }
                }
                "--country" => {
                    command_flags.push("--country");
                    match value() {
                        Some(code) => query.country_code = Some(code),
                        None => return invalid(),
                    }
                }
                "--lat" | "--lon" => {
                    let flag = if arg == "--lat" { "--lat" } else { "--lon" };
                    command_flags.push(flag);
                    let Some(raw) = value() else {
                        return invalid();
                    };
                    let Ok(number) = raw.parse::<f64>() else {
                        log_warning!("Invalid number for '{}': {}", flag, raw);
                        return invalid();
                    };
                    if flag == "--lat" {
                        query.latitude = Some(number);
                    } else {
                        query.longitude = Some(number);
                    }
                }
                "--special" => {
                    command_flags.push("--special");
                    query.special = true;
                }
                "--json" => {
                    command_flags.push("--json");
                    json = true;
                }
                _ if arg.starts_with('-') => {
                    log_warning!("Unknown option: {}", arg);
                    return invalid();
                }
                _ => {
                    if command.is_none() {
                        match Command::from_word(arg) {
                            Some(cmd) => command = Some(cmd),
                            None => {
                                log_warning!("Unknown command: {}", arg);
                                return invalid();
                            }
                        }
                    } else {
                        positional.push(arg.to_string());
                    }
                }
            }
            idx += 1;
        }

        // Help and version win over everything else
        if display_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if display_help {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }

        let command = command.unwrap_or(Command::Run);

        if let Some(flag) = command_flags.iter().find(|flag| !command.accepts(flag)) {
            log_warning!("'{}' cannot be used with '{}'", flag, command.name());
            return invalid();
        }

        let expected_positionals = usize::from(command == Command::Set);
        if positional.len() != expected_positionals {
            if positional.len() > expected_positionals {
                log_warning!("Unexpected argument: {}", positional[expected_positionals]);
            } else {
                log_warning!("Missing preference. Usage: snowfall set <snowfall|none>");
            }
            return invalid();
        }

        let action = match command {
            Command::Run => CliAction::Run {
                globals,
                date: query.date,
                worker_command,
            },
            Command::Season => CliAction::Season {
                globals,
                query,
                json,
            },
            Command::Calendar => CliAction::Calendar {
                globals,
                query,
                json,
            },
            Command::Get => CliAction::Get { globals, json },
            Command::Set => match positional[0].parse::<Preference>() {
                Ok(preference) => CliAction::Set {
                    globals,
                    preference,
                },
                Err(e) => {
                    log_warning!("{}. Use 'snowfall' or 'none'", e);
                    return invalid();
                }
            },
        };

        ParsedArgs { action }
    }

    /// Parse from the process arguments.
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("snowfall [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("    --log <file>       Also write output to a file");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("run                    Run the display controller (default)");
    log_indented!("    --date <YYYY-MM-DD>  Pretend today is this date");
    log_indented!("    --worker <command>   Send worker messages to this command");
    log_indented!("season                 Show the season for a date");
    log_indented!("    --date <YYYY-MM-DD>  Date to classify (default: today)");
    log_indented!("    --calendar <type>    astronomical or meteorological");
    log_indented!("    --hemisphere <name>  Northern or Southern");
    log_indented!("    --country <code>     ISO 3166-1 alpha-2 country code");
    log_indented!("    --lat <deg> --lon <deg>  Location coordinates");
    log_indented!("    --special            Request the Special season scheme");
    log_indented!("    --json               Print JSON");
    log_indented!("calendar, cal          List season boundaries for both schemes");
    log_indented!("get                    Print the stored animation preference");
    log_indented!("set <snowfall|none>    Store the animation preference");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        let mut full = vec!["snowfall"];
        full.extend_from_slice(args);
        ParsedArgs::parse(full).action
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(
            parse(&[]),
            CliAction::Run {
                globals: GlobalOptions::default(),
                date: None,
                worker_command: None,
            }
        );
    }

    #[test]
    fn test_parse_run_with_options() {
        let action = parse(&[
            "-d",
            "run",
            "--date",
            "2024-12-25",
            "--worker",
            "cat > /dev/null",
            "--config",
            "/tmp/cfg",
        ]);
        assert_eq!(
            action,
            CliAction::Run {
                globals: GlobalOptions {
                    debug_enabled: true,
                    config_dir: Some("/tmp/cfg".to_string()),
                    log_file: None,
                },
                date: NaiveDate::from_ymd_opt(2024, 12, 25),
                worker_command: Some("cat > /dev/null".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(parse(&["--help"]), CliAction::ShowHelp);
        assert_eq!(parse(&["season", "-h"]), CliAction::ShowHelp);
        assert_eq!(parse(&["-V"]), CliAction::ShowVersion);
        assert_eq!(parse(&["--version", "--help"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_parse_season_query() {
        let action = parse(&[
            "season",
            "--date",
            "2024-03-01",
            "--calendar",
            "Meteorological",
            "--lat",
            "-33.9",
            "--lon",
            "18.4",
            "--json",
        ]);
        let CliAction::Season { query, json, .. } = action else {
            panic!("expected season action");
        };
        assert!(json);
        assert_eq!(query.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(query.calendar_type, Some(CalendarType::Meteorological));
        assert_eq!(query.latitude, Some(-33.9));
        assert_eq!(query.longitude, Some(18.4));
        assert!(query.has_location());
        assert!(!query.special);
    }

    #[test]
    fn test_parse_calendar() {
        let action = parse(&["cal", "--country", "za"]);
        let CliAction::Calendar { query, json, .. } = action else {
            panic!("expected calendar action");
        };
        assert!(!json);
        assert_eq!(query.country_code.as_deref(), Some("za"));
    }

    #[test]
    fn test_parse_get_and_set() {
        assert_eq!(
            parse(&["get", "--json"]),
            CliAction::Get {
                globals: GlobalOptions::default(),
                json: true,
            }
        );
        assert_eq!(
            parse(&["set", "none", "--log", "/tmp/snow.log"]),
            CliAction::Set {
                globals: GlobalOptions {
                    log_file: Some("/tmp/snow.log".to_string()),
                    ..GlobalOptions::default()
                },
                preference: Preference::NoAnimation,
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        let cases: &[&[&str]] = &[
            &["--bogus"],
            &["snowstorm"],
            &["set"],
            &["set", "blizzard"],
            &["set", "none", "extra"],
            &["get", "extra"],
            &["season", "--date", "25/12/2024"],
            &["season", "--date"],
            &["season", "--calendar", "lunar"],
            &["season", "--lat", "north"],
            &["--config"],
            &["get", "--worker", "cat"],
            &["calendar", "--date", "2024-01-01"],
            &["run", "--json"],
            &["set", "none", "--json"],
        ];
        for args in cases {
            assert_eq!(parse(args), CliAction::ShowHelpDueToError, "args: {args:?}");
        }
    }

    #[test]
    fn test_run_is_default_command_with_date() {
        let action = parse(&["--date", "2025-01-15"]);
        assert_eq!(
            action,
            CliAction::Run {
                globals: GlobalOptions::default(),
                date: NaiveDate::from_ymd_opt(2025, 1, 15),
                worker_command: None,
            }
        );
    }
}

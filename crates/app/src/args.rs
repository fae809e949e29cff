use std::fmt;
use std::path::PathBuf;

use roadmap_core::model::Theme;

const DEFAULT_DB: &str = "sqlite:roadmap.sqlite3";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, what: &'static str },
    UnknownArg(String),
    UnknownSubcommand(String),
    InvalidDbUrl { raw: String },
    InvalidTheme { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command, what } => {
                write!(f, "{command} requires {what}")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownSubcommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidTheme { raw } => {
                write!(f, "invalid theme: {raw} (expected dark, light or toggle)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeAction {
    Show,
    Set(Theme),
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status { json: bool },
    Catalog,
    Toggle { item: String, completed: bool },
    Reset { confirmed: bool },
    Export { out: Option<PathBuf>, versioned: bool },
    Import { path: PathBuf },
    Search { term: String },
    Theme(ThemeAction),
    Help,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub db_url: String,
    pub command: Command,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  roadmap [--db <sqlite_url>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status [--json]                 overall and per-phase progress (default)");
    eprintln!("  catalog                         list every item with its state");
    eprintln!("  toggle <item> [--off]           mark an item done (or not done)");
    eprintln!("  reset --yes                     clear all progress");
    eprintln!("  export [--out <file>] [--versioned]");
    eprintln!("  import <file>                   replace progress with an exported file");
    eprintln!("  search <term>                   filter the roadmap");
    eprintln!("  theme [dark|light|toggle]       show or change the theme");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:roadmap.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ROADMAP_DB_URL, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    /// Parse everything after the program name. `env_db_url` is the value of
    /// `ROADMAP_DB_URL`, if set.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env_db_url: Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = normalize_sqlite_url(env_db_url.unwrap_or_else(|| DEFAULT_DB.into()));
        let mut positional = Vec::new();
        let mut flags = Vec::new();

        let mut iter = argv.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut iter, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--out" => {
                    let value = require_value(&mut iter, "--out")?;
                    flags.push(arg);
                    flags.push(value);
                }
                "--help" | "-h" => {
                    return Ok(Self {
                        db_url,
                        command: Command::Help,
                    });
                }
                _ if arg.starts_with("--") => flags.push(arg),
                _ => positional.push(arg),
            }
        }

        let command = build_command(positional, flags)?;
        Ok(Self { db_url, command })
    }
}

fn build_command(positional: Vec<String>, flags: Vec<String>) -> Result<Command, ArgsError> {
    let mut positional = positional.into_iter();
    let name = positional.next();
    let mut flags = flags.into_iter();

    let mut json = false;
    let mut off = false;
    let mut yes = false;
    let mut versioned = false;
    let mut out = None;
    while let Some(flag) = flags.next() {
        match flag.as_str() {
            "--json" => json = true,
            "--off" => off = true,
            "--yes" => yes = true,
            "--versioned" => versioned = true,
            "--out" => out = flags.next().map(PathBuf::from),
            _ => return Err(ArgsError::UnknownArg(flag)),
        }
    }

    let command = match name.as_deref() {
        None | Some("status") => Command::Status { json },
        Some("catalog") => Command::Catalog,
        Some("toggle") => Command::Toggle {
            item: positional.next().ok_or(ArgsError::MissingArgument {
                command: "toggle",
                what: "an item id",
            })?,
            completed: !off,
        },
        Some("reset") => Command::Reset { confirmed: yes },
        Some("export") => Command::Export { out, versioned },
        Some("import") => Command::Import {
            path: positional
                .next()
                .map(PathBuf::from)
                .ok_or(ArgsError::MissingArgument {
                    command: "import",
                    what: "a file path",
                })?,
        },
        Some("search") => {
            let term: Vec<String> = positional.by_ref().collect();
            Command::Search {
                term: term.join(" "),
            }
        }
        Some("theme") => match positional.next().as_deref() {
            None => Command::Theme(ThemeAction::Show),
            Some("toggle") => Command::Theme(ThemeAction::Toggle),
            Some(raw) => Command::Theme(ThemeAction::Set(
                raw.parse()
                    .map_err(|_| ArgsError::InvalidTheme { raw: raw.to_owned() })?,
            )),
        },
        Some(other) => return Err(ArgsError::UnknownSubcommand(other.to_owned())),
    };

    if let Some(extra) = positional.next() {
        return Err(ArgsError::UnknownArg(extra));
    }
    Ok(command)
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

mod args;
mod render;

use std::io::{Error as IoError, ErrorKind};
use std::path::Path;

use roadmap_core::StorageKeys;
use roadmap_core::search::filter_catalog;
use services::{AppServices, ProgressError};
use tracing_subscriber::EnvFilter;

use crate::args::{Args, Command, ThemeAction, print_usage};

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1), std::env::var("ROADMAP_DB_URL").ok())
        .map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;

    if parsed.command == Command::Help {
        print_usage();
        return Ok(());
    }

    let keys = StorageKeys::default();
    tracing::debug!(db_url = %parsed.db_url, "opening storage");
    // Each pooled connection to `sqlite::memory:` is a separate database, so
    // an in-memory session skips SQLite entirely.
    let mut services = if parsed.db_url == "sqlite::memory:" {
        AppServices::in_memory(&keys).await
    } else {
        prepare_sqlite_file(&parsed.db_url)?;
        AppServices::new_sqlite(&parsed.db_url, &keys).await?
    };

    if !services.progress().is_persistent() {
        eprintln!("warning: progress storage is unavailable, changes will not be saved");
    }

    // Views re-render from the store's change feed rather than reloading.
    let changes = services.progress().subscribe();

    match parsed.command {
        Command::Status { json } => {
            let stats = services.progress().stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", render::status(&stats));
            }
        }
        Command::Catalog => {
            let progress = services.progress();
            print!("{}", render::catalog(progress.catalog(), progress.map()));
        }
        Command::Toggle { item, completed } => {
            services.progress_mut().toggle(&item, completed).await?;
            print!("{}", render::status(&changes.borrow().stats));
        }
        Command::Reset { confirmed } => {
            if !confirmed {
                eprintln!("reset clears all progress and cannot be undone; re-run with --yes");
                return Err(IoError::new(ErrorKind::InvalidInput, "reset not confirmed").into());
            }
            services.progress_mut().reset().await;
            println!("Progress has been reset.");
            print!("{}", render::status(&changes.borrow().stats));
        }
        Command::Export { out, versioned } => {
            let progress = services.progress();
            let exported = if versioned {
                progress.export_versioned()?
            } else {
                progress.export()?
            };
            match out {
                Some(path) => {
                    tokio::fs::write(&path, exported).await?;
                    println!("Progress exported to {}", path.display());
                }
                None => println!("{exported}"),
            }
        }
        Command::Import { path } => {
            let Some(raw) = read_snapshot(&path).await? else {
                eprintln!("Invalid JSON file: {}", path.display());
                let err = IoError::new(ErrorKind::InvalidData, "snapshot is not UTF-8 text");
                return Err(err.into());
            };
            match services.progress_mut().import(&raw).await {
                Ok(_) => {
                    println!("Progress imported from {}", path.display());
                    print!("{}", render::status(&changes.borrow().stats));
                }
                Err(err @ ProgressError::MalformedInput(_)) => {
                    eprintln!("Invalid JSON file: {}", path.display());
                    return Err(err.into());
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Search { term } => {
            let catalog = services.progress().catalog();
            print!("{}", render::search(catalog, &filter_catalog(catalog, &term)));
        }
        Command::Theme(action) => {
            let preferences = services.preferences();
            let theme = match action {
                ThemeAction::Show => preferences.theme().await,
                ThemeAction::Set(theme) => preferences.set_theme(theme).await,
                ThemeAction::Toggle => preferences.toggle_theme().await,
            };
            println!("{theme}");
        }
        Command::Help => print_usage(),
    }

    Ok(())
}

/// Reads an import file. `None` means the bytes are not text at all.
async fn read_snapshot(path: &Path) -> Result<Option<String>, IoError> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == ErrorKind::InvalidData => Ok(None),
        Err(err) => Err(err),
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| args::ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(args::ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("roadmap-{}-{name}", std::process::id()));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn snapshot_with_invalid_utf8_is_not_text() {
        let path = scratch_file("binary.json", &[0x7b, 0xff, 0xfe, 0x7d]);
        assert_eq!(read_snapshot(&path).await.unwrap(), None);
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn snapshot_text_is_returned_as_is() {
        let path = scratch_file("flat.json", br#"{"soc-linux":true}"#);
        assert_eq!(
            read_snapshot(&path).await.unwrap().as_deref(),
            Some(r#"{"soc-linux":true}"#)
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn missing_snapshot_is_still_an_io_error() {
        let path = std::env::temp_dir().join("roadmap-does-not-exist.json");
        let err = read_snapshot(&path).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

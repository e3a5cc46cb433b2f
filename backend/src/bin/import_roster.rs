//! Import a CSV roster into a filesystem data directory, optionally setting
//! the current weekend.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use tokio::runtime::Builder;

use cw_backend::domain::ports::{CandidateAdminCommand, EventAdminCommand};
use cw_backend::domain::{CandidateAdminService, EventAdminService, WeekendId};
use cw_backend::outbound::{FilesystemObjectStore, FilesystemRecordStore};
use url::Url;

/// `import-roster` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "import-roster",
    about = "Create or reset candidates from a CSV roster",
    version
)]
struct CliArgs {
    /// CSV roster with `User ID` and `Email Address` columns.
    #[arg(value_name = "path")]
    roster: PathBuf,
    /// Data directory shared with the server (`CW_DATA_DIR`).
    #[arg(long = "data-dir", value_name = "dir", env = "CW_DATA_DIR")]
    data_dir: PathBuf,
    /// Also make this weekend the current one.
    #[arg(long = "current-weekend", value_name = "number", value_parser = parse_weekend)]
    current_weekend: Option<WeekendId>,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let csv = read_file(&args.roster)?;

    let records = Arc::new(FilesystemRecordStore::open(&args.data_dir)?);
    let summary = CandidateAdminService::new(records.clone())
        .import_roster(csv)
        .await
        .map_err(|error| io::Error::other(format!("roster import failed: {error}")))?;

    println!("imported={}", summary.imported);
    for id in &summary.candidates {
        println!("candidate={id}");
    }

    if let Some(weekend) = args.current_weekend {
        // Placeholder base: no attachment URLs are built here.
        let base = Url::parse("http://localhost/")
            .map_err(|error| io::Error::other(format!("build placeholder URL: {error}")))?;
        let objects = Arc::new(FilesystemObjectStore::open(&args.data_dir, base)?);
        EventAdminService::new(records, objects)
            .set_current_weekend(weekend.clone())
            .await
            .map_err(|error| io::Error::other(format!("set current weekend failed: {error}")))?;
        println!("current_weekend={weekend}");
    }

    Ok(())
}

fn parse_weekend(raw: &str) -> Result<WeekendId, String> {
    WeekendId::new(raw).map_err(|error| error.to_string())
}

fn read_file(path: &Path) -> io::Result<Vec<u8>> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "roster path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open roster directory '{}': {error}",
            parent.display()
        ))
    })?;
    directory
        .read(Path::new(file_name))
        .map_err(|error| io::Error::other(format!("read roster '{}': {error}", path.display())))
}

// Entry point and pipeline wiring.
//
// One run is a single synchronous pass: load every weekly snapshot,
// aggregate, render, write `audit_<YYYY-MM>.md`. Nothing is cached between
// runs; each invocation recomputes from the snapshot files on disk.
mod error;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use chrono::Local;
use error::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Filesystem locations for one audit run, passed explicitly into the
/// pipeline so nothing reads global state.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub report_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/weekly"),
            report_dir: PathBuf::from("reports"),
        }
    }
}

fn run(config: &Config) -> Result<PathBuf> {
    let load = loader::load_snapshots(&config.data_dir)?;
    info!(
        "Loaded {} records from {} snapshot files",
        util::format_int(load.records.len()),
        util::format_int(load.file_count)
    );
    if load.skipped_files > 0 || load.skipped_entries > 0 {
        warn!(
            "Skipped {} unusable files and {} unusable entries",
            util::format_int(load.skipped_files),
            util::format_int(load.skipped_entries)
        );
    }

    let audit = reports::build_audit(&load);
    let month = Local::now().format("%Y-%m").to_string();
    let doc = output::render_report(&audit, &month);
    let path = output::write_report(&config.report_dir, &month, &doc)?;
    info!("Wrote report: {}", path.display());
    Ok(path)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(&Config::default()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

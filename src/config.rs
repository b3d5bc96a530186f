//! Command line and seed-file configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SeedError;
use crate::roster::Applicant;
use crate::schedule::ScheduleData;
use crate::store::ScheduleStore;

/// Interview slot board for scheduling applicants into time and date slots.
#[derive(Debug, Parser)]
#[command(name = "interview-scheduler", version, about = "Interview slot scheduling board")]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// JSON file with a `schedule` and `applicants` to start from instead of the demo data.
    #[arg(long, global = true)]
    pub seed: Option<PathBuf>,

    /// Subcommand to run; prints the board when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the board and the unassigned applicants.
    Board(BoardArgs),
    /// Write the board and roster as CSV files.
    Export(ExportArgs),
    /// Serve the board over HTTP.
    Web(WebArgs),
}

/// Arguments for the `board` subcommand.
#[derive(Debug, Default, clap::Args)]
pub struct BoardArgs {
    /// Also write the rendered board to this file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `export` subcommand.
#[derive(Debug, clap::Args)]
pub struct ExportArgs {
    /// Path for the board CSV.
    #[arg(long, default_value = "schedule.csv")]
    pub board: PathBuf,

    /// Path for the applicant roster CSV.
    #[arg(long, default_value = "applicants.csv")]
    pub roster: PathBuf,
}

/// Arguments for the `web` subcommand.
#[derive(Debug, clap::Args)]
pub struct WebArgs {
    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Password required by admin endpoints (CSV import).
    #[arg(long, env = "ADMIN_PASSWORD", default_value = "admin123", hide_env_values = true)]
    pub admin_password: String,
}

/// On-disk snapshot of a board and its applicants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFile {
    pub schedule: ScheduleData,
    #[serde(default)]
    pub applicants: Vec<Applicant>,
}

impl SeedFile {
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        let seed: SeedFile = serde_json::from_str(json)?;
        seed.schedule.validate()?;
        Ok(seed)
    }

    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let json = fs::read_to_string(path)?;
        let seed = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            rows = seed.schedule.rows.len(),
            cols = seed.schedule.cols.len(),
            applicants = seed.applicants.len(),
            "loaded seed file"
        );
        Ok(seed)
    }

    pub fn into_store(self) -> ScheduleStore {
        ScheduleStore::new(self.schedule, self.applicants)
    }
}

/// Builds the starting store from `--seed`, or the demo data when absent.
pub fn initial_store(seed: Option<&Path>) -> Result<ScheduleStore, SeedError> {
    match seed {
        Some(path) => Ok(SeedFile::load(path)?.into_store()),
        None => Ok(ScheduleStore::default()),
    }
}

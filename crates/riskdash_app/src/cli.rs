use std::path::PathBuf;

use clap::{Parser, Subcommand};
use riskdash_core::FiscalYear;

use crate::config::DEFAULT_CONFIG_FILENAME;

#[derive(Debug, Parser)]
#[command(
    name = "riskdash",
    version,
    about = "Upload yearly filings, run risk analysis and follow the results"
)]
pub struct Cli {
    /// RON configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Backend base URL, overrides the config file.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List known companies.
    Companies,
    /// Register a new company.
    CreateCompany {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        sector: Option<String>,
    },
    /// List uploaded documents of a company.
    Documents { symbol: String },
    /// Upload a yearly filing.
    Upload {
        symbol: String,
        #[arg(long)]
        year: FiscalYear,
        file: PathBuf,
    },
    /// Start an analysis job and follow it until it finishes.
    Analyze {
        symbol: String,
        #[arg(long)]
        year: FiscalYear,
    },
    /// Show the analytics of a company.
    History { symbol: String },
}

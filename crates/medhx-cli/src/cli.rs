//! CLI argument definitions for `medhx`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "medhx",
    version,
    about = "Medication-history flat files - build patient loads, read acknowledgements and histories",
    long_about = "Build patient load (PMA) files for the medication-history clearinghouse and\n\
                  inspect the verification and flat-file response files it sends back."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include patient identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse an incoming file and summarize it.
    #[command(subcommand)]
    Inspect(InspectCommand),

    /// Build a patient load file from a JSON list of patients.
    Load(LoadArgs),
}

#[derive(Subcommand)]
pub enum InspectCommand {
    /// A patient verification (acknowledgement) file.
    Verification(VerificationArgs),

    /// A flat-file medication history response.
    Response(ResponseArgs),
}

#[derive(Args)]
pub struct VerificationArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// The patient load file being acknowledged; enables per-patient reconciliation.
    #[arg(long = "load", value_name = "FILE")]
    pub load: Option<PathBuf>,

    /// Print the parsed file as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ResponseArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Report unreadable detail rows instead of failing on the first one.
    #[arg(long)]
    pub lenient: bool,

    /// Print the parsed file as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct LoadArgs {
    /// Sender configuration file (TOML).
    #[arg(long, value_name = "TOML")]
    pub config: PathBuf,

    /// Patients to enroll (JSON array).
    #[arg(long, value_name = "JSON")]
    pub patients: PathBuf,

    /// Directory the load file is written to.
    #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Id of the facility requesting the histories.
    #[arg(long)]
    pub facility: String,

    /// NPI of the facility.
    #[arg(long)]
    pub npi: String,

    /// Customer the transmission belongs to (default: the facility id).
    #[arg(long)]
    pub customer: Option<String>,

    /// Population id (default: the facility id).
    #[arg(long)]
    pub population: Option<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

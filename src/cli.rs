use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::combine::CombineMode;
use crate::models::Platform;

#[derive(Parser, Debug)]
#[command(
    name = "codejson",
    about = "Infer code.json repository metadata and combine it into a policy-filtered catalog",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file [default: ./.codejson/config.toml, fallback ~/.config/codejson/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging verbosity (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "info", value_name = "LEVEL")]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Turn a JSON array of raw repositories into canonical code.json records
    Sanitize {
        /// Raw repository JSON file
        input: PathBuf,

        /// Where to write the record array
        #[arg(long, short)]
        output: PathBuf,

        /// Platform the repositories were fetched from
        #[arg(long, default_value = "github")]
        platform: PlatformArg,
    },

    /// Combine per-source record files into code.json
    Combine {
        /// Directory holding the per-source *.json files
        input_dir: PathBuf,

        /// Directory for code.json [default: INPUT_DIR]
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Which records make it into the catalog
        #[arg(long, default_value = "filter")]
        mode: ModeArg,
    },

    /// Summarize a code.json catalog and flag incomplete releases
    Review {
        /// Catalog to review
        #[arg(default_value = "code.json")]
        catalog: PathBuf,

        /// List every release, not just incomplete ones
        #[arg(short, long)]
        verbose: bool,

        /// Only print the summary line
        #[arg(short, long)]
        quiet: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    None,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum PlatformArg {
    Github,
    Gitlab,
    Ado,
}

impl From<&PlatformArg> for Platform {
    fn from(arg: &PlatformArg) -> Self {
        match arg {
            PlatformArg::Github => Platform::Github,
            PlatformArg::Gitlab => Platform::Gitlab,
            PlatformArg::Ado => Platform::Ado,
        }
    }
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ModeArg {
    /// Every record, unmodified
    Concat,
    /// Only public records from public platforms
    Public,
    /// Censor internal records and drop stale ones
    Filter,
}

impl From<&ModeArg> for CombineMode {
    fn from(arg: &ModeArg) -> Self {
        match arg {
            ModeArg::Concat => CombineMode::Concat,
            ModeArg::Public => CombineMode::Public,
            ModeArg::Filter => CombineMode::Filter,
        }
    }
}

use clap::{Parser, Subcommand};
use forms_export::DEFAULT_REPORT_NAME;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "formsctl")]
#[command(about = "Export survey forms to CSV reports")]
#[command(version)]
pub struct CliArgs {
    /// Config file (default: ~/.forms_export/config.json)
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a CSV report
    Export {
        /// Report selector: "specification", "alldata", anything else for answers
        #[arg(long = "type", short = 't', value_name = "TYPE", default_value = DEFAULT_REPORT_NAME)]
        report: String,

        /// Inclusive lower bound on submission time (epoch seconds)
        #[arg(long, value_name = "EPOCH", allow_negative_numbers = true)]
        from: Option<i64>,

        /// Inclusive upper bound on submission time (epoch seconds)
        #[arg(long, value_name = "EPOCH", allow_negative_numbers = true)]
        to: Option<i64>,

        /// Output path (default: <TYPE>.csv in the current directory)
        #[arg(long, short = 'o', value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Load a JSON array of form records into the forms table
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl CliArgs {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

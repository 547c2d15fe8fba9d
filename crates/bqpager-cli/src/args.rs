use crate::types::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bqpager")]
#[command(about = "Page through BigQuery query results in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// File containing the query text; read from stdin when omitted
    pub query_file: Option<PathBuf>,

    /// Project that runs the query
    #[arg(long)]
    pub project: Option<String>,

    /// Job location, e.g. US or asia-northeast1
    #[arg(long)]
    pub location: Option<String>,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Config file (defaults to the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Hide the REQUIRED header row
    #[arg(long)]
    pub no_required_row: bool,

    #[arg(long, default_value = "warn")]
    pub log_level: LogLevel,
}

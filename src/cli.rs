use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "caller-shell", version)]
#[command(about = "Desktop call client core - caller process supervision and local data")]
pub struct Cli {
    /// Config file path (defaults to root/configs/app.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory under which `storage/` is created (overrides storage.path)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the caller process and serve until Ctrl+C
    Run,
    /// Print the client id, generating one if needed
    ClientId,
    /// Show the forward URL, or set it when URL is given
    ForwardUrl {
        /// New forward URL
        url: Option<String>,
    },
    /// Read and write local data entries
    #[command(subcommand)]
    Data(DataCommands),
    /// Print the resolved configuration after env overrides and validation
    CheckConfig,
}

#[derive(Subcommand)]
pub enum DataCommands {
    /// Show the data stored under an id
    Get {
        id: String,
    },
    /// Store data under an id
    Set {
        id: String,
        /// JSON value; anything that is not valid JSON is stored as a string
        value: String,
        /// Entry type
        #[arg(short = 't', long = "type", default_value = "")]
        entry_type: String,
    },
    /// Remove the entry stored under an id
    #[command(alias = "rm")]
    Delete {
        id: String,
    },
    /// List every entry
    #[command(alias = "ls")]
    List,
}

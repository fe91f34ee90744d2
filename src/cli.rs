use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "starfield-db")]
#[command(version, about = "Restructure Starfield galaxy data and load it into SQLite")]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. "debug")
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the nested export and write the flat document
    Restructure {
        /// Nested source document (system -> bodies)
        source: PathBuf,

        /// Flat document to write
        output: PathBuf,

        /// Resource catalog
        #[arg(short, long)]
        resources: PathBuf,

        /// Replace unreadable counts and day lengths with defaults
        #[arg(long)]
        lenient: bool,

        /// Overwrite the output if it exists
        #[arg(short, long)]
        force: bool,
    },

    /// Load a flat document into a new SQLite database
    Load {
        /// Flat document produced by `restructure`
        input: PathBuf,

        /// SQLite database to create
        output_db: PathBuf,

        /// Overwrite the database if it exists
        #[arg(short, long)]
        force: bool,
    },

    /// Restructure and load using the standard file names in a data directory
    Build {
        /// Directory holding starfield_data_updated.json and resources.json
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Replace unreadable counts and day lengths with defaults
        #[arg(long)]
        lenient: bool,

        /// Overwrite galaxy.json and sf.db if they exist
        #[arg(short, long)]
        force: bool,
    },

    /// List all tables in insertion order
    Tables,

    /// Print the CREATE statements for the database schema
    Schema,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

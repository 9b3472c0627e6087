use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect to Discord and serve the slash command
    Run,

    /// Fetch one post and print the reply the bot would send
    Fetch {
        /// Subreddit to fetch from
        #[arg(short, long)]
        subreddit: String,

        /// Listing to pick from (hot, new, top, rising, controversial)
        #[arg(long)]
        sort: Option<String>,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete leftover files from the scratch directory
    Clean,

    /// Write the default configuration file
    Init {
        /// Output path for the configuration
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}

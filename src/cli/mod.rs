pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "velavida")]
#[command(about = "Velavida - Recipe search with suggestions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the search server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Search recipes on a running server
    Search {
        /// Search query
        query: String,
    },

    /// Run database migrations
    Migrate,

    /// Import foods and recipes from a JSON export
    Import {
        /// Path to a JSON file with "foods" and "recipes" arrays
        file: String,
    },
}

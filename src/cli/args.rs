// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to configuration file (optional)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the notes file and stored images (optional)
    #[arg(short, long, value_name = "DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute (list, create, delete, or render)
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List all notes with their resolved images
    List {
        /// Output notes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a note, optionally attaching an image
    Create {
        /// Note name
        #[arg(short, long)]
        name: String,

        /// Note description
        #[arg(long)]
        description: String,

        /// Image file to store and attach
        #[arg(short, long, value_name = "FILE")]
        image: Option<PathBuf>,
    },

    /// Delete a note by id
    Delete {
        /// Note ID to delete
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Render all notes as an HTML page
    Render {
        /// Write the page here instead of a temporary file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Do not open the page in the browser
        #[arg(long)]
        no_open: bool,
    },
}

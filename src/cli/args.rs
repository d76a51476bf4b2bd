// src/cli/args.rs
use clap::{Parser, Subcommand};
use regex::Regex;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to config file (optional, defaults to the user config dir)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List all notes with their status and image links
    List {
        /// Output notes as JSON
        #[arg(long, conflicts_with = "html")]
        json: bool,

        /// Open the list as a page in the browser
        #[arg(long)]
        html: bool,
    },

    /// Create a note, optionally uploading an image
    Create {
        /// Note name; also the storage key of the image
        #[arg(value_name = "NAME")]
        name: String,

        /// Note description
        #[arg(value_name = "DESCRIPTION")]
        description: String,

        /// Date the note should be completed by (YYYY-MM-DD)
        #[arg(short = 'd', long, value_name = "DATE", value_parser = parse_completion_date)]
        completion_date: Option<String>,

        /// Image file to attach
        #[arg(short, long, value_name = "IMAGE")]
        image: Option<PathBuf>,
    },

    /// Delete a note and its image
    Delete {
        /// Note ID to delete
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Toggle a note between InProgress and Completed
    Toggle {
        /// Note ID to toggle
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Write a default config file
    InitConfig {
        /// Where to write it (defaults to --config or the user config dir)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Accept the same values as a date input control: `YYYY-MM-DD`
pub fn parse_completion_date(value: &str) -> Result<String, String> {
    let date_re = Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$")
        .expect("Failed to compile date regex");
    if date_re.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(format!("'{value}' is not a date in YYYY-MM-DD format"))
    }
}

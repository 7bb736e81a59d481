//! Command-line argument parsing
//!
//! Supports:
//! - Printing a note, a line range of a note or a folder
//! - Choosing the print mode per invocation
//! - Inspecting and changing persisted settings

use crate::config::PrintMode;
use crate::utils::text::LineRange;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Print markdown notes
#[derive(Parser, Debug)]
#[command(name = "note-print", version, about = "Print markdown notes")]
pub struct CliArgs {
    /// Vault root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub vault: Option<PathBuf>,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Destination of basic-mode exports
    #[arg(short, long, global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Print mode override shared by the print commands
#[derive(Args, Debug, Clone, Default)]
pub struct ModeArgs {
    /// basic, standard, advanced or preview
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<PrintMode>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a note
    Note {
        /// Note path, relative to the vault or the working directory
        path: PathBuf,
        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Print lines of a note
    Selection {
        path: PathBuf,
        /// Lines to print: `start:end`, `start:` or a single line
        #[arg(short, long, value_name = "RANGE")]
        lines: LineRange,
        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Print every note in a folder
    Folder {
        /// Folder path (defaults to the folder of --note)
        path: Option<PathBuf>,
        /// Note whose folder is printed when no path is given
        #[arg(long, value_name = "NOTE")]
        note: Option<PathBuf>,
        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Inspect or change settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the current settings
    Show,
    /// Derive heading sizes from the base font size
    SyncSizes,
    /// Import heading colors from the theme stylesheet
    ImportTheme,
    /// Change one setting
    Set { key: String, value: String },
}

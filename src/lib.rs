//! Note Print - print-ready HTML for markdown note vaults
//!
//! Renders a note, a selection or a folder of notes to HTML, styles it for
//! paper and hands it to a native printer, the external browser or an in-app
//! preview window.

pub mod capture;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dom;
pub mod error;
pub mod file_handler;
pub mod folder;
pub mod host;
pub mod markdown;
pub mod output;
pub mod style;
pub mod utils;
pub mod vault;

#[cfg(test)]
pub mod testing;

pub use commands::Printer;
pub use config::{Config, PrintMode, RenderSettings};
pub use error::{PrintError, PrintResult};

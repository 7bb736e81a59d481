//! Error types for Note Print
//!
//! Errors are grouped by concern: printing pipeline failures, note file
//! access, and configuration. Every pipeline error is terminal for the current
//! print invocation and carries a short message suitable for a notification.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while producing or delivering a printout
#[derive(Error, Debug)]
pub enum PrintError {
    /// No preview surface is open
    #[error("No active preview")]
    NoActivePreview,

    /// The selection is absent or contains no content
    #[error("Selection is empty")]
    EmptySelection,

    /// The preview has no content-sizing wrapper to clone
    #[error("Preview content wrapper not found")]
    MissingContentWrapper,

    /// Neither an explicit file nor an active note is available
    #[error("No note to print")]
    NoFileToPrint,

    /// The markdown renderer failed
    #[error("Rendering failed: {0}")]
    RenderFailure(String),

    /// The external browser could not be opened
    #[error("Could not open browser: {0}")]
    LaunchFailure(String),

    /// The plugin base stylesheet could not be read
    #[error("Could not load stylesheet: {path}")]
    StyleLoadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another print operation is already running
    #[error("A print operation is already in progress")]
    Busy,

    /// No folder could be resolved for folder printing
    #[error("Could not resolve folder")]
    NoFolder,

    /// The folder contains no markdown notes
    #[error("No markdown files found in {0}")]
    EmptyFolder(PathBuf),

    /// Note file access errors
    #[error(transparent)]
    File(#[from] FileError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Note file related errors
#[derive(Error, Debug)]
pub enum FileError {
    /// File not found at specified path
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// File is too large to print
    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Error reading file
    #[error("Could not read file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing file
    #[error("Could not write file: {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory does not exist
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Error listing a directory
    #[error("Could not read directory: {path}")]
    DirectoryScanError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error saving configuration
    #[error("Could not save configuration: {0}")]
    SaveError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Unknown configuration key
    #[error("Unknown configuration key: {key}")]
    UnknownKey { key: String },

    /// Invalid configuration value
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Result type alias for print pipeline operations
pub type PrintResult<T> = Result<T, PrintError>;

/// Result type alias for file operations
pub type FileResult<T> = Result<T, FileError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl PrintError {
    /// Short message suitable for a user-facing notification
    pub fn user_message(&self) -> String {
        match self {
            PrintError::NoActivePreview => "No active markdown view.".to_string(),
            PrintError::EmptySelection => "No text selected.".to_string(),
            PrintError::MissingContentWrapper => "No preview element found.".to_string(),
            PrintError::NoFileToPrint => "No note to print.".to_string(),
            PrintError::RenderFailure(_) => "Failed to generate preview content.".to_string(),
            PrintError::LaunchFailure(reason) => {
                format!("Failed to open print dialog: {}", reason)
            }
            PrintError::StyleLoadFailure { .. } => {
                "Default styling could not be located.".to_string()
            }
            PrintError::Busy => "A print is already in progress.".to_string(),
            PrintError::NoFolder => "Could not resolve folder.".to_string(),
            PrintError::EmptyFolder(_) => "No markdown files found in the folder.".to_string(),
            PrintError::File(err) => err.user_message(),
            _ => self.to_string(),
        }
    }
}

impl FileError {
    /// Create a user-friendly error message suitable for notifications
    pub fn user_message(&self) -> String {
        match self {
            FileError::NotFound(_) => {
                "The note could not be found. It may have been moved or deleted.".to_string()
            }
            FileError::FileTooLarge { max_size, .. } => {
                format!(
                    "This note is too large to print. Maximum file size is {} bytes.",
                    max_size
                )
            }
            FileError::WriteError { .. } => {
                "Could not write the print file. Check disk space and permissions.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_display() {
        let err = FileError::NotFound(PathBuf::from("/vault/note.md"));
        assert!(err.to_string().contains("/vault/note.md"));
    }

    #[test]
    fn test_print_error_from_file_error() {
        let file_err = FileError::NotFound(PathBuf::from("/note.md"));
        let err: PrintError = file_err.into();
        assert!(matches!(err, PrintError::File(_)));
        assert!(err.user_message().contains("could not be found"));
    }

    #[test]
    fn test_launch_failure_message() {
        let err = PrintError::LaunchFailure("no browser".into());
        assert_eq!(err.user_message(), "Failed to open print dialog: no browser");
    }
}

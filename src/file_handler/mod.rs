//! File handler module for Note Print
//!
//! Handles all file system operations including:
//! - Reading notes with encoding detection
//! - Atomic writes of print documents
//! - Listing the notes of a folder

pub mod io;
pub mod scanner;

pub use io::*;
pub use scanner::*;

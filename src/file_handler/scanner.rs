//! Folder scanning for folder printing
//!
//! Lists the markdown notes directly inside a folder:
//! - Subfolders are not descended into
//! - Hidden files are skipped
//! - Results are sorted by file name

use crate::error::{FileError, FileResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Configuration for folder scanning
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File extensions to include
    pub include_extensions: HashSet<String>,

    /// Whether to include hidden files (starting with .)
    pub show_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let mut include_extensions = HashSet::new();
        include_extensions.insert("md".to_string());

        Self {
            include_extensions,
            show_hidden: false,
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn has_extension(path: &Path, config: &ScanConfig) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| config.include_extensions.contains(&e.to_lowercase()))
        .unwrap_or(false)
}

/// Notes directly inside `folder`, sorted by file name
pub fn list_notes(folder: impl AsRef<Path>, config: &ScanConfig) -> FileResult<Vec<PathBuf>> {
    let folder = folder.as_ref();
    if !folder.is_dir() {
        return Err(FileError::DirectoryNotFound {
            path: folder.to_path_buf(),
        });
    }

    let mut notes = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| FileError::DirectoryScanError {
            path: folder.to_path_buf(),
            source: e.into(),
        })?;

        if !entry.file_type().is_file() || (!config.show_hidden && is_hidden(&entry)) {
            continue;
        }
        if has_extension(entry.path(), config) {
            notes.push(entry.into_path());
        }
    }

    log::debug!("Found {} notes in {}", notes.len(), folder.display());
    Ok(notes)
}

//! Folder printing
//!
//! Renders every note directly inside a folder and concatenates the results,
//! one note per page unless notes are combined.

use crate::config::RenderSettings;
use crate::dom::Element;
use crate::error::{PrintError, PrintResult};
use crate::file_handler::{list_notes, ScanConfig};
use crate::host::Workspace;
use crate::markdown::ContentRenderer;
use std::path::{Path, PathBuf};

/// Class forcing a page break after a note
pub const PAGE_BREAK_CLASS: &str = "note-print-page-break";

/// Class of the container holding all folder notes
pub const FOLDER_CLASS: &str = "note-print-folder";

/// Folder to print: the explicit one, else the active note's folder
pub fn resolve_folder(workspace: &dyn Workspace, explicit: Option<PathBuf>) -> PrintResult<PathBuf> {
    explicit
        .or_else(|| workspace.active_folder())
        .ok_or(PrintError::NoFolder)
}

/// Display name of a folder
pub fn folder_label(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.display().to_string())
}

/// Render all notes of a folder into one container
///
/// Notes that fail to render are skipped with a warning. Fails with
/// [`PrintError::EmptyFolder`] when the folder holds no notes, or with the
/// last rendering error when none could be rendered.
pub fn render_folder(
    renderer: &ContentRenderer,
    workspace: &dyn Workspace,
    folder: &Path,
    settings: &RenderSettings,
    combine: bool,
) -> PrintResult<Element> {
    let notes = list_notes(folder, &ScanConfig::default())?;
    if notes.is_empty() {
        return Err(PrintError::EmptyFolder(folder.to_path_buf()));
    }

    let mut container = Element::with_class("div", FOLDER_CLASS);
    let mut last_error = None;

    for path in &notes {
        let file = workspace.note_at(path);
        match renderer.render_file(workspace, &file, settings) {
            Ok(mut content) => {
                if !combine {
                    content.add_class(PAGE_BREAK_CLASS);
                }
                container.push(content);
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", file.vault_path, e);
                last_error = Some(e);
            }
        }
    }

    if container.children.is_empty() {
        return Err(last_error.unwrap_or(PrintError::EmptyFolder(folder.to_path_buf())));
    }
    log::debug!(
        "Rendered {} of {} notes from {}",
        container.children.len(),
        notes.len(),
        folder.display()
    );
    Ok(container)
}

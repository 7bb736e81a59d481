//! Host application seams
//!
//! The printer never touches an editor, preview panel or theme directly; it
//! talks to them through these traits. The `vault` module provides the
//! filesystem-backed implementation used by the command line.

use crate::config::ViewMode;
use crate::dom::{Element, Node};
use crate::error::PrintResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// Structured key/value metadata from the top of a note, in source order
pub type Frontmatter = serde_yaml::Mapping;

/// A note in the vault
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoteFile {
    /// Absolute filesystem path
    pub path: PathBuf,
    /// Path relative to the vault root, `/`-separated
    pub vault_path: String,
}

impl NoteFile {
    pub fn new(path: impl Into<PathBuf>, vault_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            vault_path: vault_path.into(),
        }
    }

    /// File name without extension
    pub fn basename(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string()
    }

    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// The host's live rendered view of a note
#[async_trait]
pub trait PreviewSurface: Send + Sync {
    /// Current view mode
    fn mode(&self) -> ViewMode;

    /// Switch view mode; resolves once the host finished the switch
    async fn set_mode(&mut self, mode: ViewMode) -> PrintResult<()>;

    /// Remove height and overflow clipping from the surface root
    fn relax_clipping(&mut self);

    /// Resolves once the host reports its layout is ready
    async fn layout_ready(&self) {}

    /// Counter bumped on every mutation anywhere under the surface root
    fn mutations(&self) -> watch::Receiver<u64>;

    /// Deep clone of the content-sizing wrapper, if rendered
    fn content_wrapper(&self) -> Option<Element>;

    /// Deep clone of the live selection's top-level nodes; `None` without a selection
    fn selection(&self) -> Option<Vec<Node>>;

    /// Note shown by the surface
    fn file(&self) -> Option<NoteFile>;

    /// Force the surface to rebuild from scratch
    fn rebuild(&mut self);
}

/// Document model and editor access
pub trait Workspace: Send {
    /// Note open in the active editor
    fn active_file(&self) -> Option<NoteFile>;

    /// Raw markdown source of a note
    fn read_note(&self, file: &NoteFile) -> PrintResult<String>;

    /// Parsed front matter of a note, if any
    fn frontmatter(&self, file: &NoteFile) -> Option<Frontmatter>;

    /// Text selected in the active editor
    fn editor_selection(&self) -> Option<String>;

    /// The active preview surface, if one is open
    fn active_preview(&mut self) -> Option<&mut dyn PreviewSurface>;

    /// Note handle for a path inside the vault
    fn note_at(&self, path: &Path) -> NoteFile;

    /// Folder holding the active note; `None` for notes at the vault root
    fn active_folder(&self) -> Option<PathBuf>;
}

/// Theme state and stylesheet access
pub trait ThemeHost: Send + Sync {
    /// Whether the dark theme class is applied
    fn is_dark(&self) -> bool;

    /// Apply the dark or light theme class
    fn set_dark(&self, dark: bool);

    /// Text of the active theme stylesheet
    fn theme_css(&self) -> Option<String>;

    /// Computed color for a CSS color value under the current theme class
    fn computed_color(&self, value: &str) -> Option<String>;

    /// Computed color of the live inline title, if a note is open
    fn inline_title_color(&self) -> Option<String> {
        None
    }
}

/// Short user-facing notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

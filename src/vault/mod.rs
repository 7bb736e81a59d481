//! Filesystem host
//!
//! Backs the host traits with a vault directory on disk so the printer can be
//! driven from the command line.

pub mod overlay;
pub mod preview;
pub mod theme;

pub use overlay::TerminalOverlay;
pub use preview::VirtualPreview;
pub use theme::CssTheme;

use crate::error::{FileError, FileResult, PrintError, PrintResult};
use crate::file_handler::read_file_sync;
use crate::host::{Frontmatter, NoteFile, Notifier, PreviewSurface, Workspace};
use crate::markdown::{frontmatter, MarkdownRenderer};
use crate::utils::path::{expand_tilde, vault_path};
use crate::utils::text::{slice_lines, LineRange};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Workspace over a vault directory
pub struct FsWorkspace {
    root: PathBuf,
    active: Option<NoteFile>,
    selection: Option<String>,
    preview: Option<VirtualPreview>,
}

impl FsWorkspace {
    /// Open the vault rooted at `root`
    pub fn open(root: impl AsRef<Path>) -> FileResult<Self> {
        let root = expand_tilde(root.as_ref());
        if !root.is_dir() {
            return Err(FileError::DirectoryNotFound { path: root });
        }
        let root = root.canonicalize().map_err(|e| FileError::ReadError {
            path: root.clone(),
            source: e,
        })?;

        log::debug!("Opened vault {}", root.display());
        Ok(Self {
            root,
            active: None,
            selection: None,
            preview: None,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a user-supplied path against the vault, then the working directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let path = expand_tilde(path);
        if path.is_absolute() {
            return path;
        }
        let in_vault = self.root.join(&path);
        if in_vault.exists() {
            return in_vault;
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(&path))
            .unwrap_or(in_vault)
    }

    /// Make a note the active one
    pub fn activate(&mut self, path: &Path) -> FileResult<NoteFile> {
        let path = self.resolve(path);
        if !path.is_file() {
            return Err(FileError::NotFound(path));
        }
        let file = self.note_at(&path);
        log::debug!("Active note: {}", file.vault_path);
        self.active = Some(file.clone());
        self.selection = None;
        self.preview = None;
        Ok(file)
    }

    /// Select lines of the active note
    ///
    /// The selection is visible to the editor and, when open, the preview.
    pub fn select_lines(&mut self, range: LineRange) -> PrintResult<()> {
        let file = self.active.clone().ok_or(PrintError::NoFileToPrint)?;
        let text = slice_lines(&self.read_note(&file)?, range);
        if let Some(preview) = &mut self.preview {
            preview.select(Some(text.clone()));
        }
        self.selection = Some(text);
        Ok(())
    }

    /// Open a preview surface on the active note
    pub fn open_preview(&mut self, renderer: Arc<dyn MarkdownRenderer>) -> PrintResult<()> {
        let file = self.active.clone().ok_or(PrintError::NoFileToPrint)?;
        let text = self.read_note(&file)?;
        let mut preview = VirtualPreview::new(file, text, renderer);
        preview.select(self.selection.clone());
        self.preview = Some(preview);
        Ok(())
    }
}

impl Workspace for FsWorkspace {
    fn active_file(&self) -> Option<NoteFile> {
        self.active.clone()
    }

    fn read_note(&self, file: &NoteFile) -> PrintResult<String> {
        let read = read_file_sync(&file.path)?;
        if read.lossy {
            log::warn!("{} is not valid text, printing it lossily", file.vault_path);
        }
        Ok(read.content)
    }

    fn frontmatter(&self, file: &NoteFile) -> Option<Frontmatter> {
        let text = self.read_note(file).ok()?;
        frontmatter::parse(&text)
    }

    fn editor_selection(&self) -> Option<String> {
        self.selection.clone()
    }

    fn active_preview(&mut self) -> Option<&mut dyn PreviewSurface> {
        self.preview
            .as_mut()
            .map(|preview| preview as &mut dyn PreviewSurface)
    }

    fn note_at(&self, path: &Path) -> NoteFile {
        NoteFile::new(path, vault_path(path, &self.root))
    }

    fn active_folder(&self) -> Option<PathBuf> {
        let parent = self.active.as_ref()?.parent()?;
        (parent != self.root).then(|| parent.to_path_buf())
    }
}

/// Notifications printed to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CapturePolicy, CaptureTarget, StabilityPolicy, StableSnapshotCapture};
    use crate::config::{RenderSettings, ViewMode};
    use crate::markdown::CmarkRenderer;
    use std::time::Duration;
    use tempfile::TempDir;

    fn vault() -> (TempDir, FsWorkspace) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("daily")).unwrap();
        std::fs::write(
            dir.path().join("daily").join("Notes.md"),
            "---\nauthor: X\n---\n# Hello\n\nline one\nline two\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("Root.md"), "root").unwrap();
        let workspace = FsWorkspace::open(dir.path()).unwrap();
        (dir, workspace)
    }

    #[test]
    fn test_activate_and_paths() {
        let (_dir, mut workspace) = vault();
        let file = workspace.activate(Path::new("daily/Notes.md")).unwrap();
        assert_eq!(file.vault_path, "daily/Notes.md");
        assert_eq!(file.basename(), "Notes");
        assert_eq!(workspace.active_folder(), Some(workspace.root().join("daily")));

        workspace.activate(Path::new("Root.md")).unwrap();
        assert_eq!(workspace.active_folder(), None);

        assert!(matches!(
            workspace.activate(Path::new("missing.md")),
            Err(FileError::NotFound(_))
        ));
    }

    #[test]
    fn test_frontmatter_and_selection() {
        let (_dir, mut workspace) = vault();
        let file = workspace.activate(Path::new("daily/Notes.md")).unwrap();

        let frontmatter = workspace.frontmatter(&file).unwrap();
        assert_eq!(frontmatter.len(), 1);

        workspace.select_lines("6:7".parse().unwrap()).unwrap();
        assert_eq!(
            workspace.editor_selection().as_deref(),
            Some("line one\nline two")
        );
    }

    #[test]
    fn test_missing_vault() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            FsWorkspace::open(dir.path().join("nope")),
            Err(FileError::DirectoryNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_capture_through_virtual_preview() {
        let (_dir, mut workspace) = vault();
        workspace.activate(Path::new("daily/Notes.md")).unwrap();
        workspace.open_preview(Arc::new(CmarkRenderer::new())).unwrap();

        let settings = RenderSettings {
            show_metadata: true,
            ..Default::default()
        };
        let policy = CapturePolicy {
            toggle_settle: Duration::from_millis(1),
            wrapper_settle: Duration::from_millis(1),
            stability: StabilityPolicy {
                initial_delay: Duration::from_millis(1),
                poll_interval: Duration::from_millis(1),
                quiet_period: Duration::from_millis(5),
                safety_timeout: Duration::from_millis(100),
            },
        };
        let snapshot = StableSnapshotCapture::new(policy)
            .capture(&mut workspace, CaptureTarget::WholeDocument, &settings)
            .await
            .unwrap();

        assert_eq!(snapshot.title().unwrap().text_content(), "Notes");
        assert!(snapshot.metadata().unwrap().text_content().contains("author: X"));
        assert_eq!(workspace.active_preview().unwrap().mode(), ViewMode::Edit);
    }
}

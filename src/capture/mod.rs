//! Snapshotting the live preview
//!
//! [`StableSnapshotCapture`] drives a host preview surface into a fully
//! rendered, unclipped state, waits for asynchronous rendering to settle and
//! deep-clones the result (or the current selection) into a detached tree.
//! The surface's original view mode is restored on every exit path.

pub mod scope;
pub mod stability;

pub use scope::{LightThemeGuard, ModeScope};
pub use stability::{wait_for_stability, StabilityOutcome, StabilityPolicy, StabilityReport};

use crate::config::RenderSettings;
use crate::dom::{Element, Node};
use crate::error::{PrintError, PrintResult};
use crate::host::{Frontmatter, PreviewSurface, Workspace};
use crate::markdown::metadata::metadata_block;
use std::time::Duration;

/// Class of the preview root
pub const PREVIEW_VIEW_CLASS: &str = "markdown-preview-view";

/// Class of the content-sizing wrapper inside the preview root
pub const SIZER_CLASS: &str = "markdown-preview-sizer";

/// What to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    /// The whole rendered note
    WholeDocument,
    /// The live selection in the preview
    Selection,
}

/// Delays used while capturing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturePolicy {
    /// Pause after toggling to edit mode before returning to preview
    pub toggle_settle: Duration,
    /// Pause before cloning the content wrapper
    pub wrapper_settle: Duration,
    pub stability: StabilityPolicy,
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self {
            toggle_settle: Duration::from_millis(300),
            wrapper_settle: Duration::from_millis(300),
            stability: StabilityPolicy::default(),
        }
    }
}

/// Detached, print-ready copy of rendered note content
///
/// The root is a `div.markdown-preview-view` holding one
/// `div.markdown-preview-sizer` with the optional metadata block, the
/// optional title block and the rendered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableSnapshot {
    root: Element,
}

impl StableSnapshot {
    /// Wrap a content-sizing element in a fresh preview root
    pub fn from_content(content: Element) -> Self {
        let mut root = Element::with_class("div", PREVIEW_VIEW_CLASS);
        root.push(content);
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The content-sizing wrapper
    pub fn content(&self) -> Option<&Element> {
        self.root.find_by_class(SIZER_CLASS)
    }

    /// Title block, if the snapshot has one
    pub fn title(&self) -> Option<&Element> {
        self.root.find_by_class("inline-title")
    }

    /// Metadata block, if the snapshot has one
    pub fn metadata(&self) -> Option<&Element> {
        self.root.find_by_class(crate::markdown::metadata::CONTAINER_CLASS)
    }

    pub fn into_element(self) -> Element {
        self.root
    }

    pub fn to_html(&self) -> String {
        self.root.to_html()
    }
}

/// Captures stable snapshots from the workspace's active preview
#[derive(Debug, Clone, Default)]
pub struct StableSnapshotCapture {
    policy: CapturePolicy,
}

impl StableSnapshotCapture {
    pub fn new(policy: CapturePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CapturePolicy {
        &self.policy
    }

    /// Capture the active preview
    ///
    /// Fails with [`PrintError::NoActivePreview`] without a preview,
    /// [`PrintError::EmptySelection`] when a selection capture finds nothing
    /// selected and [`PrintError::MissingContentWrapper`] when the preview has
    /// no content wrapper. The first failure wins; a failure to restore the
    /// original mode is only reported when capturing itself succeeded.
    pub async fn capture(
        &self,
        workspace: &mut dyn Workspace,
        target: CaptureTarget,
        settings: &RenderSettings,
    ) -> PrintResult<StableSnapshot> {
        let file = workspace
            .active_preview()
            .ok_or(PrintError::NoActivePreview)?
            .file();
        let frontmatter = match (&file, settings.show_metadata) {
            (Some(file), true) => workspace.frontmatter(file),
            _ => None,
        };

        let surface = workspace
            .active_preview()
            .ok_or(PrintError::NoActivePreview)?;
        log::debug!(
            "Capturing {:?} from {}",
            target,
            file.as_ref()
                .map(|f| f.vault_path.as_str())
                .unwrap_or("<unsaved>")
        );

        let scope = ModeScope::enter(surface);
        let captured = self
            .capture_in_preview(surface, &scope, target, frontmatter.as_ref())
            .await;
        let restored = scope.restore(surface).await;

        let snapshot = captured?;
        restored?;
        Ok(snapshot)
    }

    async fn capture_in_preview(
        &self,
        surface: &mut dyn PreviewSurface,
        scope: &ModeScope,
        target: CaptureTarget,
        frontmatter: Option<&Frontmatter>,
    ) -> PrintResult<StableSnapshot> {
        scope
            .force_preview(surface, self.policy.toggle_settle)
            .await?;
        surface.relax_clipping();
        wait_for_stability(surface, &self.policy.stability).await;

        let mut content = match target {
            CaptureTarget::Selection => {
                let nodes = surface.selection().ok_or(PrintError::EmptySelection)?;
                selection_content(nodes)?
            }
            CaptureTarget::WholeDocument => {
                if surface.content_wrapper().is_none() {
                    return Err(PrintError::MissingContentWrapper);
                }
                tokio::time::sleep(self.policy.wrapper_settle).await;
                surface
                    .content_wrapper()
                    .ok_or(PrintError::MissingContentWrapper)?
            }
        };

        if let Some(block) = frontmatter.and_then(metadata_block) {
            content.prepend(block);
        }
        Ok(StableSnapshot::from_content(content))
    }
}

/// Build block content from a selection's top-level nodes
///
/// Bare text becomes a paragraph; whitespace-only text is dropped.
fn selection_content(nodes: Vec<Node>) -> PrintResult<Element> {
    let mut content = Element::with_class("div", SIZER_CLASS);
    for node in nodes.into_iter().filter(|node| !node.is_blank_text()) {
        match node {
            Node::Text(text) => content.push(Element::new("p").with_text(text)),
            other => content.push(other),
        }
    }

    let has_content = content
        .children
        .iter()
        .any(|node| !matches!(node, Node::Comment(_)));
    if !has_content {
        return Err(PrintError::EmptySelection);
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewMode;
    use crate::dom::parse_fragment;
    use crate::host::NoteFile;
    use crate::testing::{MockSurface, MockWorkspace};
    use serde_yaml::{Mapping, Value};

    fn fast_capture() -> StableSnapshotCapture {
        StableSnapshotCapture::new(CapturePolicy {
            toggle_settle: Duration::from_millis(30),
            wrapper_settle: Duration::from_millis(30),
            stability: StabilityPolicy {
                initial_delay: Duration::from_millis(50),
                poll_interval: Duration::from_millis(10),
                quiet_period: Duration::from_millis(100),
                safety_timeout: Duration::from_millis(500),
            },
        })
    }

    fn notes_wrapper() -> Element {
        let mut sizer = Element::with_class("div", SIZER_CLASS);
        sizer.push(Element::with_class("h1", "inline-title").with_text("Notes"));
        sizer.push(Element::new("h1").with_text("Hello"));
        sizer
    }

    fn notes_workspace(mode: ViewMode) -> MockWorkspace {
        let file = NoteFile::new("/vault/Notes.md", "Notes.md");
        let surface = MockSurface::new(mode)
            .with_wrapper(notes_wrapper())
            .with_file(file.clone());
        MockWorkspace::new()
            .with_note(file, "# Hello")
            .with_preview(surface)
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_notes_scenario() {
        let mut workspace = notes_workspace(ViewMode::Edit);
        let settings = RenderSettings {
            font_size: "12px".to_string(),
            print_title: true,
            ..Default::default()
        };

        let snapshot = fast_capture()
            .capture(&mut workspace, CaptureTarget::WholeDocument, &settings)
            .await
            .unwrap();

        assert!(snapshot.root().has_class(PREVIEW_VIEW_CLASS));
        assert_eq!(snapshot.title().unwrap().text_content(), "Notes");
        assert!(snapshot.metadata().is_none());
        let headings = snapshot.root().find_all("h1");
        assert!(headings.iter().any(|h| h.text_content() == "Hello"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_restores_edit_mode() {
        let mut workspace = notes_workspace(ViewMode::Edit);
        fast_capture()
            .capture(
                &mut workspace,
                CaptureTarget::WholeDocument,
                &RenderSettings::default(),
            )
            .await
            .unwrap();

        let surface = workspace.preview().unwrap();
        assert_eq!(surface.mode(), ViewMode::Edit);
        assert_eq!(surface.rebuilds(), 1);
        assert!(surface.was_relaxed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_restores_mode_on_failure() {
        let surface = MockSurface::new(ViewMode::Edit);
        let mut workspace = MockWorkspace::new().with_preview(surface);

        let result = fast_capture()
            .capture(
                &mut workspace,
                CaptureTarget::WholeDocument,
                &RenderSettings::default(),
            )
            .await;
        assert!(matches!(result, Err(PrintError::MissingContentWrapper)));

        let surface = workspace.preview().unwrap();
        assert_eq!(surface.mode(), ViewMode::Edit);
        assert_eq!(surface.rebuilds(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_from_preview_toggles_and_stays_in_preview() {
        let mut workspace = notes_workspace(ViewMode::Preview);
        fast_capture()
            .capture(
                &mut workspace,
                CaptureTarget::WholeDocument,
                &RenderSettings::default(),
            )
            .await
            .unwrap();

        let surface = workspace.preview().unwrap();
        assert_eq!(
            surface.mode_history(),
            vec![ViewMode::Edit, ViewMode::Preview]
        );
        assert_eq!(surface.mode(), ViewMode::Preview);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_active_preview() {
        let mut workspace = MockWorkspace::new();
        let result = fast_capture()
            .capture(
                &mut workspace,
                CaptureTarget::WholeDocument,
                &RenderSettings::default(),
            )
            .await;
        assert!(matches!(result, Err(PrintError::NoActivePreview)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_selection() {
        let surface = MockSurface::new(ViewMode::Edit).with_selection(vec![Node::text("  \n")]);
        let mut workspace = MockWorkspace::new().with_preview(surface);

        let result = fast_capture()
            .capture(
                &mut workspace,
                CaptureTarget::Selection,
                &RenderSettings::default(),
            )
            .await;
        assert!(matches!(result, Err(PrintError::EmptySelection)));
        assert_eq!(workspace.preview().unwrap().mode(), ViewMode::Edit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_selection() {
        let surface = MockSurface::new(ViewMode::Preview);
        let mut workspace = MockWorkspace::new().with_preview(surface);

        let result = fast_capture()
            .capture(
                &mut workspace,
                CaptureTarget::Selection,
                &RenderSettings::default(),
            )
            .await;
        assert!(matches!(result, Err(PrintError::EmptySelection)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_wraps_bare_text() {
        let mut nodes = vec![Node::text("loose words"), Node::text("\n")];
        nodes.extend(parse_fragment("<ul><li>item</li></ul>"));
        let surface = MockSurface::new(ViewMode::Preview).with_selection(nodes);
        let mut workspace = MockWorkspace::new().with_preview(surface);

        let snapshot = fast_capture()
            .capture(
                &mut workspace,
                CaptureTarget::Selection,
                &RenderSettings::default(),
            )
            .await
            .unwrap();

        let content = snapshot.content().unwrap();
        let children: Vec<_> = content.child_elements().map(|e| e.tag.as_str()).collect();
        assert_eq!(children, vec!["p", "ul"]);
        assert_eq!(content.children.len(), 2);
        assert_eq!(content.find_all("p")[0].text_content(), "loose words");
    }

    #[tokio::test(start_paused = true)]
    async fn test_metadata_prepended_when_enabled() {
        let file = NoteFile::new("/vault/Notes.md", "Notes.md");
        let mut frontmatter = Mapping::new();
        frontmatter.insert(
            Value::from("tags"),
            Value::Sequence(vec![Value::from("a"), Value::from("b")]),
        );
        frontmatter.insert(Value::from("author"), Value::from("X"));

        let surface = MockSurface::new(ViewMode::Edit)
            .with_wrapper(notes_wrapper())
            .with_file(file.clone());
        let mut workspace = MockWorkspace::new()
            .with_note(file.clone(), "# Hello")
            .with_frontmatter(file, frontmatter)
            .with_preview(surface);
        let settings = RenderSettings {
            show_metadata: true,
            ..Default::default()
        };

        let snapshot = fast_capture()
            .capture(&mut workspace, CaptureTarget::WholeDocument, &settings)
            .await
            .unwrap();

        let content = snapshot.content().unwrap();
        let first = content.child_elements().next().unwrap();
        assert!(first.has_class(crate::markdown::metadata::CONTAINER_CLASS));
        let lines: Vec<_> = first
            .find_all("div")
            .into_iter()
            .filter(|d| d.classes().next().is_none())
            .map(|d| d.text_content())
            .collect();
        assert_eq!(lines, vec!["tags: a, b", "author: X"]);
    }
}

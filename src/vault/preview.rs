//! In-process preview surface
//!
//! Stands in for a live preview panel: switching to preview mode renders the
//! note block by block, bumping the mutation counter once per block, the way
//! a real panel settles while it lays out content.

use crate::capture::SIZER_CLASS;
use crate::config::ViewMode;
use crate::dom::{Element, Node};
use crate::error::PrintResult;
use crate::host::{NoteFile, PreviewSurface};
use crate::markdown::{frontmatter, render::TITLE_CLASS, MarkdownRenderer};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

pub struct VirtualPreview {
    file: NoteFile,
    text: String,
    selection: Option<String>,
    renderer: Arc<dyn MarkdownRenderer>,
    mode: ViewMode,
    clipped: bool,
    rendered: Option<Element>,
    feed: watch::Sender<u64>,
}

impl VirtualPreview {
    pub fn new(file: NoteFile, text: String, renderer: Arc<dyn MarkdownRenderer>) -> Self {
        let (feed, _) = watch::channel(0);
        Self {
            file,
            text,
            selection: None,
            renderer,
            mode: ViewMode::Edit,
            clipped: true,
            rendered: None,
            feed,
        }
    }

    /// Markdown of the current selection inside the rendered view
    pub fn select(&mut self, markdown: Option<String>) {
        self.selection = markdown;
    }

    pub fn is_clipped(&self) -> bool {
        self.clipped
    }

    fn bump(&self) {
        self.feed.send_modify(|count| *count += 1);
    }

    fn render(&mut self) -> PrintResult<()> {
        let mut body = Element::new("div");
        self.renderer.render(
            frontmatter::strip(&self.text),
            Some(&self.file.path),
            &mut body,
        )?;

        let mut sizer = Element::with_class("div", SIZER_CLASS);
        sizer.push(Element::with_class("h1", TITLE_CLASS).with_text(self.file.basename()));
        self.bump();
        for node in body.children {
            sizer.push(node);
            self.bump();
        }

        log::trace!(
            "Rendered {} blocks for {}",
            sizer.children.len(),
            self.file.vault_path
        );
        self.rendered = Some(sizer);
        Ok(())
    }
}

#[async_trait]
impl PreviewSurface for VirtualPreview {
    fn mode(&self) -> ViewMode {
        self.mode
    }

    async fn set_mode(&mut self, mode: ViewMode) -> PrintResult<()> {
        log::debug!("Preview of {} switching to {:?}", self.file.vault_path, mode);
        self.mode = mode;
        match mode {
            ViewMode::Preview => self.render(),
            ViewMode::Edit => {
                self.rendered = None;
                self.bump();
                Ok(())
            }
        }
    }

    fn relax_clipping(&mut self) {
        self.clipped = false;
    }

    fn mutations(&self) -> watch::Receiver<u64> {
        self.feed.subscribe()
    }

    fn content_wrapper(&self) -> Option<Element> {
        self.rendered.clone()
    }

    fn selection(&self) -> Option<Vec<Node>> {
        let markdown = self.selection.as_deref()?;
        let mut holder = Element::new("div");
        match self.renderer.render(markdown, Some(&self.file.path), &mut holder) {
            Ok(()) => Some(holder.children),
            Err(e) => {
                log::warn!("Could not render selection: {}", e);
                None
            }
        }
    }

    fn file(&self) -> Option<NoteFile> {
        Some(self.file.clone())
    }

    fn rebuild(&mut self) {
        if self.mode == ViewMode::Preview {
            if let Err(e) = self.render() {
                log::warn!("Rebuild of {} failed: {}", self.file.vault_path, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::CmarkRenderer;

    fn preview(text: &str) -> VirtualPreview {
        VirtualPreview::new(
            NoteFile::new("/vault/Notes.md", "Notes.md"),
            text.to_string(),
            Arc::new(CmarkRenderer::new()),
        )
    }

    #[tokio::test]
    async fn test_renders_on_preview() {
        let mut preview = preview("---\ntags: a\n---\n# Hello\n\ntext");
        let feed = preview.mutations();
        assert!(preview.content_wrapper().is_none());

        preview.set_mode(ViewMode::Preview).await.unwrap();
        let wrapper = preview.content_wrapper().unwrap();
        assert!(wrapper.has_class(SIZER_CLASS));
        assert_eq!(
            wrapper.find_by_class(TITLE_CLASS).unwrap().text_content(),
            "Notes"
        );
        assert!(!wrapper.text_content().contains("tags"));
        assert!(*feed.borrow() >= 3);

        preview.set_mode(ViewMode::Edit).await.unwrap();
        assert!(preview.content_wrapper().is_none());
    }

    #[tokio::test]
    async fn test_selection_nodes() {
        let mut preview = preview("# Hello");
        assert!(preview.selection().is_none());

        preview.select(Some("**bold** words".to_string()));
        let nodes = preview.selection().unwrap();
        let p = nodes.iter().find_map(Node::as_element).unwrap();
        assert_eq!(p.tag, "p");
        assert_eq!(p.text_content(), "bold words");
    }

    #[tokio::test]
    async fn test_rebuild_only_in_preview() {
        let mut preview = preview("text");
        preview.rebuild();
        assert!(preview.content_wrapper().is_none());

        preview.set_mode(ViewMode::Preview).await.unwrap();
        let before = *preview.mutations().borrow();
        preview.rebuild();
        assert!(*preview.mutations().borrow() > before);
    }
}

//! Rendering notes from source
//!
//! The simple path: markdown text goes through a [`MarkdownRenderer`] into a
//! fresh preview container. Unlike capturing, nothing here waits for
//! asynchronous content.

use crate::capture::{PREVIEW_VIEW_CLASS, SIZER_CLASS};
use crate::config::RenderSettings;
use crate::dom::{self, Element};
use crate::error::{PrintError, PrintResult};
use crate::host::{Frontmatter, NoteFile, Workspace};
use crate::markdown::{frontmatter, metadata::metadata_block};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Class of the title block
pub const TITLE_CLASS: &str = "inline-title";

/// Markdown to HTML conversion provided by the host
pub trait MarkdownRenderer: Send + Sync {
    /// Render `markdown` into `target`; `source_path` locates relative links
    fn render(
        &self,
        markdown: &str,
        source_path: Option<&Path>,
        target: &mut Element,
    ) -> PrintResult<()>;
}

/// `pulldown-cmark` backed renderer
pub struct CmarkRenderer {
    options: Options,
}

impl CmarkRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self { options }
    }

    /// Render markdown to an HTML string
    pub fn to_html(&self, markdown: &str, source_path: Option<&Path>) -> String {
        let base = source_path.and_then(Path::parent);
        let parser = Parser::new_ext(markdown, self.options).map(|event| match event {
            Event::Start(Tag::Image(kind, dest, title)) => {
                Event::Start(Tag::Image(kind, rebase(dest, base), title))
            }
            Event::Start(Tag::Link(kind, dest, title)) => {
                Event::Start(Tag::Link(kind, rebase(dest, base), title))
            }
            other => other,
        });

        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, parser);
        html
    }
}

impl Default for CmarkRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer for CmarkRenderer {
    fn render(
        &self,
        markdown: &str,
        source_path: Option<&Path>,
        target: &mut Element,
    ) -> PrintResult<()> {
        let html = panic::catch_unwind(AssertUnwindSafe(|| self.to_html(markdown, source_path)))
            .map_err(|payload| {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "markdown renderer panicked".to_string());
                PrintError::RenderFailure(reason)
            })?;

        target.children.extend(dom::parse_fragment(&html));
        Ok(())
    }
}

/// Whether a link target is relative to the note
fn is_relative(dest: &str) -> bool {
    !(dest.is_empty()
        || dest.starts_with('#')
        || dest.starts_with('/')
        || dest.starts_with('\\')
        || dest.contains("://")
        || dest.starts_with("mailto:")
        || dest.starts_with("data:")
        || dest.starts_with("tel:"))
}

/// Point a relative link target at the note's directory
fn rebase<'a>(dest: CowStr<'a>, base: Option<&Path>) -> CowStr<'a> {
    let Some(base) = base.filter(|b| b.is_absolute()) else {
        return dest;
    };
    if !is_relative(&dest) {
        return dest;
    }

    let joined = base.join(dest.as_ref());
    let path = joined.to_string_lossy().replace('\\', "/").replace(' ', "%20");
    let url = if path.starts_with('/') {
        format!("file://{}", path)
    } else {
        format!("file:///{}", path)
    };
    CowStr::from(url)
}

/// Input for [`ContentRenderer::render`]
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    /// Markdown source, front matter included or not
    pub text: String,
    /// Absolute path of the source note
    pub source_path: Option<PathBuf>,
    /// Title block text
    pub title: Option<String>,
    pub frontmatter: Option<Frontmatter>,
}

impl RenderRequest {
    /// Request for a whole note, titled with its basename
    pub fn for_note(file: &NoteFile, text: String, frontmatter: Option<Frontmatter>) -> Self {
        Self {
            text,
            source_path: Some(file.path.clone()),
            title: Some(file.basename()),
            frontmatter,
        }
    }

    /// Untitled request for loose markdown, such as a selection
    pub fn for_text(text: String) -> Self {
        Self {
            text,
            ..Default::default()
        }
    }
}

/// Renders notes into preview-shaped containers
#[derive(Clone)]
pub struct ContentRenderer {
    renderer: Arc<dyn MarkdownRenderer>,
}

impl ContentRenderer {
    pub fn new(renderer: Arc<dyn MarkdownRenderer>) -> Self {
        Self { renderer }
    }

    /// Render a request into `div.markdown-preview-view > div.markdown-preview-sizer`
    ///
    /// The sizer holds the metadata block (when enabled and present), the title
    /// block (when enabled and the request has a title) and the body.
    pub fn render(&self, request: &RenderRequest, settings: &RenderSettings) -> PrintResult<Element> {
        let mut sizer = Element::with_class("div", SIZER_CLASS);

        if settings.show_metadata {
            if let Some(block) = request.frontmatter.as_ref().and_then(metadata_block) {
                sizer.push(block);
            }
        }

        if settings.print_title {
            if let Some(title) = &request.title {
                sizer.push(Element::with_class("h1", TITLE_CLASS).with_text(title.as_str()));
            }
        }

        let body = frontmatter::strip(&request.text);
        self.renderer
            .render(body, request.source_path.as_deref(), &mut sizer)?;

        let mut root = Element::with_class("div", PREVIEW_VIEW_CLASS);
        root.push(sizer);
        Ok(root)
    }

    /// Render a note read through the workspace
    pub fn render_file(
        &self,
        workspace: &dyn Workspace,
        file: &NoteFile,
        settings: &RenderSettings,
    ) -> PrintResult<Element> {
        let text = workspace.read_note(file)?;
        let frontmatter = workspace
            .frontmatter(file)
            .or_else(|| frontmatter::parse(&text));
        log::debug!("Rendering {}", file.vault_path);
        self.render(&RenderRequest::for_note(file, text, frontmatter), settings)
    }

    /// Render the active editor's text selection
    ///
    /// The title is omitted; metadata comes from the active note.
    pub fn render_selection(
        &self,
        workspace: &dyn Workspace,
        settings: &RenderSettings,
    ) -> PrintResult<Element> {
        let text = workspace
            .editor_selection()
            .filter(|s| !s.trim().is_empty())
            .ok_or(PrintError::EmptySelection)?;

        let mut request = RenderRequest::for_text(text);
        if let Some(file) = workspace.active_file() {
            request.source_path = Some(file.path.clone());
            request.frontmatter = workspace.frontmatter(&file);
        }
        self.render(&request, settings)
    }
}

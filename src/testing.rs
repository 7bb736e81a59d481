//! In-memory hosts for unit tests

use crate::config::ViewMode;
use crate::dom::{Element, Node};
use crate::error::{FileError, PrintError, PrintResult};
use crate::host::{Frontmatter, NoteFile, Notifier, PreviewSurface, ThemeHost, Workspace};
use crate::output::{BrowserLauncher, OutputSink, OverlayHost, PreviewAction, PrintJob};
use crate::style::ComposedStylesheet;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Theme host with a switchable dark flag and canned computed colors
pub struct MockTheme {
    dark: AtomicBool,
    css: String,
    colors: Mutex<HashMap<String, (String, String)>>,
    switches: AtomicUsize,
}

impl MockTheme {
    pub fn dark(css: &str) -> Self {
        Self::new(css, true)
    }

    pub fn light(css: &str) -> Self {
        Self::new(css, false)
    }

    fn new(css: &str, dark: bool) -> Self {
        Self {
            dark: AtomicBool::new(dark),
            css: css.to_string(),
            colors: Mutex::new(HashMap::new()),
            switches: AtomicUsize::new(0),
        }
    }

    /// Register the computed value of `value` under each theme
    pub fn add_color(&self, value: &str, light: &str, dark: &str) {
        self.colors
            .lock()
            .unwrap()
            .insert(value.to_string(), (light.to_string(), dark.to_string()));
    }

    /// Number of theme switches performed
    pub fn switches(&self) -> usize {
        self.switches.load(Ordering::SeqCst)
    }
}

impl ThemeHost for MockTheme {
    fn is_dark(&self) -> bool {
        self.dark.load(Ordering::SeqCst)
    }

    fn set_dark(&self, dark: bool) {
        self.switches.fetch_add(1, Ordering::SeqCst);
        self.dark.store(dark, Ordering::SeqCst);
    }

    fn theme_css(&self) -> Option<String> {
        (!self.css.is_empty()).then(|| self.css.clone())
    }

    fn computed_color(&self, value: &str) -> Option<String> {
        let colors = self.colors.lock().unwrap();
        colors.get(value).map(|(light, dark)| {
            if self.is_dark() {
                dark.clone()
            } else {
                light.clone()
            }
        })
    }
}

/// Scripted preview surface
pub struct MockSurface {
    mode: ViewMode,
    history: Vec<ViewMode>,
    fail_mode_changes: bool,
    rebuilds: usize,
    relaxed: bool,
    feed: Arc<watch::Sender<u64>>,
    wrapper: Option<Element>,
    selection: Option<Vec<Node>>,
    file: Option<NoteFile>,
}

impl MockSurface {
    pub fn new(mode: ViewMode) -> Self {
        let (feed, _) = watch::channel(0);
        Self {
            mode,
            history: Vec::new(),
            fail_mode_changes: false,
            rebuilds: 0,
            relaxed: false,
            feed: Arc::new(feed),
            wrapper: None,
            selection: None,
            file: None,
        }
    }

    pub fn with_wrapper(mut self, wrapper: Element) -> Self {
        self.wrapper = Some(wrapper);
        self
    }

    pub fn with_selection(mut self, nodes: Vec<Node>) -> Self {
        self.selection = Some(nodes);
        self
    }

    pub fn with_file(mut self, file: NoteFile) -> Self {
        self.file = Some(file);
        self
    }

    pub fn fail_mode_changes(&mut self, fail: bool) {
        self.fail_mode_changes = fail;
    }

    /// Handle for simulating mutations
    pub fn feed(&self) -> Arc<watch::Sender<u64>> {
        Arc::clone(&self.feed)
    }

    pub fn mode_history(&self) -> Vec<ViewMode> {
        self.history.clone()
    }

    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    pub fn was_relaxed(&self) -> bool {
        self.relaxed
    }
}

#[async_trait]
impl PreviewSurface for MockSurface {
    fn mode(&self) -> ViewMode {
        self.mode
    }

    async fn set_mode(&mut self, mode: ViewMode) -> PrintResult<()> {
        if self.fail_mode_changes {
            return Err(PrintError::RenderFailure("mode switch refused".to_string()));
        }
        self.mode = mode;
        self.history.push(mode);
        Ok(())
    }

    fn relax_clipping(&mut self) {
        self.relaxed = true;
    }

    fn mutations(&self) -> watch::Receiver<u64> {
        self.feed.subscribe()
    }

    fn content_wrapper(&self) -> Option<Element> {
        self.wrapper.clone()
    }

    fn selection(&self) -> Option<Vec<Node>> {
        self.selection.clone()
    }

    fn file(&self) -> Option<NoteFile> {
        self.file.clone()
    }

    fn rebuild(&mut self) {
        self.rebuilds += 1;
    }
}

/// Workspace backed by in-memory notes
#[derive(Default)]
pub struct MockWorkspace {
    active: Option<NoteFile>,
    notes: HashMap<PathBuf, String>,
    frontmatter: HashMap<PathBuf, Frontmatter>,
    editor_selection: Option<String>,
    preview: Option<MockSurface>,
    folder: Option<PathBuf>,
}

impl MockWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note and make it the active one
    pub fn with_note(mut self, file: NoteFile, text: &str) -> Self {
        self.notes.insert(file.path.clone(), text.to_string());
        self.active = Some(file);
        self
    }

    pub fn with_frontmatter(mut self, file: NoteFile, frontmatter: Frontmatter) -> Self {
        self.frontmatter.insert(file.path, frontmatter);
        self
    }

    pub fn with_editor_selection(mut self, text: &str) -> Self {
        self.editor_selection = Some(text.to_string());
        self
    }

    pub fn with_preview(mut self, surface: MockSurface) -> Self {
        self.preview = Some(surface);
        self
    }

    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn preview(&self) -> Option<&MockSurface> {
        self.preview.as_ref()
    }
}

impl Workspace for MockWorkspace {
    fn active_file(&self) -> Option<NoteFile> {
        self.active.clone()
    }

    fn read_note(&self, file: &NoteFile) -> PrintResult<String> {
        self.notes
            .get(&file.path)
            .cloned()
            .ok_or_else(|| FileError::NotFound(file.path.clone()).into())
    }

    fn frontmatter(&self, file: &NoteFile) -> Option<Frontmatter> {
        self.frontmatter.get(&file.path).cloned()
    }

    fn editor_selection(&self) -> Option<String> {
        self.editor_selection.clone()
    }

    fn active_preview(&mut self) -> Option<&mut dyn PreviewSurface> {
        self.preview
            .as_mut()
            .map(|surface| surface as &mut dyn PreviewSurface)
    }

    fn note_at(&self, path: &Path) -> NoteFile {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        NoteFile::new(path, name)
    }

    fn active_folder(&self) -> Option<PathBuf> {
        self.folder.clone()
    }
}

/// Notifier that records messages
#[derive(Default)]
pub struct MockNotifier {
    messages: Mutex<Vec<String>>,
}

impl MockNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Sink that records delivered jobs
#[derive(Default)]
pub struct RecordingSink {
    jobs: Mutex<Vec<PrintJob>>,
    theme: Option<Arc<dyn ThemeHost>>,
    dark_at_delivery: Mutex<Vec<bool>>,
}

impl RecordingSink {
    /// Sink that also records whether `theme` was dark at each delivery
    pub fn observing(theme: Arc<dyn ThemeHost>) -> Self {
        Self {
            theme: Some(theme),
            ..Default::default()
        }
    }

    pub fn jobs(&self) -> Vec<PrintJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn dark_at_delivery(&self) -> Vec<bool> {
        self.dark_at_delivery.lock().unwrap().clone()
    }
}

#[async_trait]
impl OutputSink for RecordingSink {
    async fn deliver(&self, job: PrintJob) -> PrintResult<()> {
        if let Some(theme) = &self.theme {
            self.dark_at_delivery.lock().unwrap().push(theme.is_dark());
        }
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}

/// Browser launcher that records opened paths
#[derive(Default)]
pub struct MockLauncher {
    fail: bool,
    opened: Mutex<Vec<PathBuf>>,
}

impl MockLauncher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().unwrap().clone()
    }
}

impl BrowserLauncher for MockLauncher {
    fn open(&self, path: &Path) -> std::io::Result<()> {
        if self.fail {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no browser available",
            ));
        }
        self.opened.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// Overlay host answering with a fixed action
pub struct MockOverlay {
    action: PreviewAction,
    mounted: AtomicUsize,
    unmounted: AtomicUsize,
    printed: Mutex<Vec<Element>>,
    labels: Mutex<Vec<String>>,
}

impl MockOverlay {
    pub fn new(action: PreviewAction) -> Self {
        Self {
            action,
            mounted: AtomicUsize::new(0),
            unmounted: AtomicUsize::new(0),
            printed: Mutex::new(Vec::new()),
            labels: Mutex::new(Vec::new()),
        }
    }

    pub fn mounted(&self) -> usize {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn unmounted(&self) -> usize {
        self.unmounted.load(Ordering::SeqCst)
    }

    pub fn printed(&self) -> Vec<Element> {
        self.printed.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }
}

#[async_trait]
impl OverlayHost for MockOverlay {
    fn mount(&self, _overlay: &Element) -> PrintResult<()> {
        self.mounted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn next_action(&self) -> PreviewAction {
        self.action
    }

    async fn print(
        &self,
        content: &Element,
        _stylesheet: &ComposedStylesheet,
        label: &str,
    ) -> PrintResult<()> {
        self.printed.lock().unwrap().push(content.clone());
        self.labels.lock().unwrap().push(label.to_string());
        Ok(())
    }

    fn unmount(&self) {
        self.unmounted.fetch_add(1, Ordering::SeqCst);
    }
}

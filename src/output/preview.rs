//! In-app preview window
//!
//! Shows the prepared printout in an overlay with Print and Close controls.
//! The light theme is forced while the window is open.

use crate::capture::LightThemeGuard;
use crate::dom::Element;
use crate::error::PrintResult;
use crate::host::ThemeHost;
use crate::output::{OutputSink, PrintJob};
use crate::style::{ComposedStylesheet, ROOT_CLASS};
use async_trait::async_trait;
use std::sync::Arc;

/// Class of the overlay root
pub const WINDOW_CLASS: &str = "print-preview-window";

/// Class added to math blocks so print styles can keep them whole
pub const MATH_PRINT_CLASS: &str = "math-print";

const WINDOW_CSS: &str = "
.print-preview-window {
    position: fixed;
    top: 50%;
    left: 50%;
    transform: translate(-50%, -50%);
    background: white;
    padding: 20px;
    border: 1px solid #ccc;
    box-shadow: 0 0 10px rgba(0, 0, 0, 0.2);
    z-index: 9999;
    overflow: auto;
    width: 90%;
    height: 90%;
}
.print-preview-controls {
    position: sticky;
    top: 0;
    padding: 10px;
    background-color: rgba(66, 67, 65, 0.12);
    border-bottom: 1px solid rgb(28, 27, 26);
    display: flex;
    gap: 10px;
    justify-content: flex-end;
    z-index: 1;
}
.print-preview-content {
    margin-top: 20px;
    background-color: #f0f0f0;
    padding: 10px;
    display: flex;
    flex-direction: column;
    align-items: center;
}
.print-preview-page {
    background-color: white;
    margin: 20px;
    box-shadow: 0 0 10px rgba(0, 0, 0, 0.3);
    box-sizing: border-box;
    overflow: visible;
}
.print-preview-page-content {
    padding: 20px;
    box-sizing: border-box;
    width: 100%;
    overflow: visible;
}
";

/// What the user chose in the preview window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewAction {
    Print,
    Close,
}

/// Host surface able to show an overlay
#[async_trait]
pub trait OverlayHost: Send + Sync {
    /// Show the overlay
    fn mount(&self, overlay: &Element) -> PrintResult<()>;

    /// Resolves with the user's choice
    async fn next_action(&self) -> PreviewAction;

    /// Print content through the host's print utility under `label`
    async fn print(
        &self,
        content: &Element,
        stylesheet: &ComposedStylesheet,
        label: &str,
    ) -> PrintResult<()>;

    /// Remove the overlay
    fn unmount(&self);
}

fn is_math(element: &Element) -> bool {
    element.has_class("math") || element.has_class("math-block")
}

/// Copy of the fragment marked up for printing
pub fn prepare_content(fragment: &Element) -> Element {
    let mut content = fragment.clone();
    content.add_class(ROOT_CLASS);
    if is_math(&content) {
        content.add_class(MATH_PRINT_CLASS);
    }
    content.walk_mut(&mut |element| {
        if is_math(element) {
            element.add_class(MATH_PRINT_CLASS);
        }
    });
    content
}

/// Build the overlay tree around prepared content
pub fn build_overlay(content: &Element, stylesheet: &ComposedStylesheet) -> Element {
    let mut style = Element::new("style");
    style.push_text(format!("{}\n{}", stylesheet, WINDOW_CSS));

    let mut controls = Element::with_class("div", "print-preview-controls");
    for (action, label) in [("print", "Print"), ("close", "Close")] {
        let mut button = Element::new("button").with_text(label);
        button.set_attr("data-action", action);
        controls.push(button);
    }

    let mut page_content = Element::with_class("div", "print-preview-page-content");
    page_content.push(content.clone());
    let mut page = Element::with_class("div", "print-preview-page");
    page.push(page_content);
    let mut container = Element::with_class("div", "print-preview-content");
    container.push(page);

    let mut window = Element::with_class("div", WINDOW_CLASS);
    window.push(style);
    window.push(controls);
    window.push(container);
    window
}

/// An open preview overlay
///
/// Closing (explicitly or by dropping) unmounts the overlay and restores the
/// theme that was active before opening.
pub struct PreviewWindow {
    host: Arc<dyn OverlayHost>,
    light: Option<LightThemeGuard>,
    content: Element,
}

impl PreviewWindow {
    pub fn open(
        host: Arc<dyn OverlayHost>,
        theme: Arc<dyn ThemeHost>,
        job: &PrintJob,
    ) -> PrintResult<Self> {
        let light = LightThemeGuard::acquire(theme);
        let content = prepare_content(&job.fragment);
        host.mount(&build_overlay(&content, &job.stylesheet))?;
        log::debug!("Opened preview window for {}", job.label);

        Ok(Self {
            host,
            light: Some(light),
            content,
        })
    }

    pub fn content(&self) -> &Element {
        &self.content
    }

    pub fn is_open(&self) -> bool {
        self.light.is_some()
    }

    pub fn close(&mut self) {
        if let Some(light) = self.light.take() {
            self.host.unmount();
            drop(light);
            log::debug!("Closed preview window");
        }
    }
}

impl Drop for PreviewWindow {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sink showing jobs in the preview window
pub struct PreviewWindowSink {
    host: Arc<dyn OverlayHost>,
    theme: Arc<dyn ThemeHost>,
}

impl PreviewWindowSink {
    pub fn new(host: Arc<dyn OverlayHost>, theme: Arc<dyn ThemeHost>) -> Self {
        Self { host, theme }
    }
}

#[async_trait]
impl OutputSink for PreviewWindowSink {
    async fn deliver(&self, job: PrintJob) -> PrintResult<()> {
        let mut window = PreviewWindow::open(Arc::clone(&self.host), Arc::clone(&self.theme), &job)?;

        let result = match self.host.next_action().await {
            PreviewAction::Print => {
                self.host
                    .print(window.content(), &job.stylesheet, &job.label)
                    .await
            }
            PreviewAction::Close => Ok(()),
        };
        window.close();
        result
    }
}

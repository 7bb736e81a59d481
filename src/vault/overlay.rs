//! Preview window for the command line
//!
//! The overlay is written to a temp page and opened in the browser; the
//! Print/Close choice is read from the terminal.

use crate::dom::Element;
use crate::error::PrintResult;
use crate::file_handler::write_file_atomic_sync;
use crate::output::{BrowserLauncher, OutputSink, OverlayHost, PreviewAction, PrintJob};
use crate::style::ComposedStylesheet;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Title of the preview page
const PREVIEW_TITLE: &str = "Print preview";

/// Interpret a line typed at the prompt
pub fn parse_action(line: &str) -> PreviewAction {
    match line.trim().to_lowercase().as_str() {
        "p" | "print" | "y" | "yes" => PreviewAction::Print,
        _ => PreviewAction::Close,
    }
}

/// Page showing the overlay on its own
pub fn overlay_page(overlay: &Element) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{}</body></html>",
        PREVIEW_TITLE,
        overlay.to_html()
    )
}

type Input = Box<dyn AsyncBufRead + Send + Unpin>;

pub struct TerminalOverlay {
    launcher: Arc<dyn BrowserLauncher>,
    printer: Arc<dyn OutputSink>,
    page: PathBuf,
    input: tokio::sync::Mutex<Input>,
    mounted: Mutex<bool>,
}

impl TerminalOverlay {
    /// Overlay reading the choice from stdin and printing through `printer`
    pub fn new(launcher: Arc<dyn BrowserLauncher>, printer: Arc<dyn OutputSink>) -> Self {
        Self::with_input(
            launcher,
            printer,
            std::env::temp_dir().join(format!("note-print-preview-{}.html", std::process::id())),
            Box::new(BufReader::new(tokio::io::stdin())),
        )
    }

    pub fn with_input(
        launcher: Arc<dyn BrowserLauncher>,
        printer: Arc<dyn OutputSink>,
        page: PathBuf,
        input: Input,
    ) -> Self {
        Self {
            launcher,
            printer,
            page,
            input: tokio::sync::Mutex::new(input),
            mounted: Mutex::new(false),
        }
    }

    fn set_mounted(&self, value: bool) -> bool {
        match self.mounted.lock() {
            Ok(mut mounted) => std::mem::replace(&mut *mounted, value),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), value),
        }
    }
}

#[async_trait]
impl OverlayHost for TerminalOverlay {
    fn mount(&self, overlay: &Element) -> PrintResult<()> {
        write_file_atomic_sync(&self.page, &overlay_page(overlay))?;
        self.set_mounted(true);
        if let Err(e) = self.launcher.open(&self.page) {
            log::warn!("Could not open preview {}: {}", self.page.display(), e);
        }
        eprintln!("Preview: {}", self.page.display());
        Ok(())
    }

    async fn next_action(&self) -> PreviewAction {
        eprint!("[p]rint or [c]lose? ");
        let mut line = String::new();
        let mut input = self.input.lock().await;
        match input.read_line(&mut line).await {
            Ok(0) => PreviewAction::Close,
            Ok(_) => parse_action(&line),
            Err(e) => {
                log::warn!("Could not read preview choice: {}", e);
                PreviewAction::Close
            }
        }
    }

    async fn print(
        &self,
        content: &Element,
        stylesheet: &ComposedStylesheet,
        label: &str,
    ) -> PrintResult<()> {
        let job = PrintJob {
            fragment: content.clone(),
            stylesheet: stylesheet.clone(),
            label: label.to_string(),
            advanced: false,
        };
        self.printer.deliver(job).await
    }

    fn unmount(&self) {
        if !self.set_mounted(false) {
            return;
        }
        match std::fs::remove_file(&self.page) {
            Ok(()) => log::debug!("Removed {}", self.page.display()),
            Err(e) => log::warn!("Could not remove {}: {}", self.page.display(), e),
        }
    }
}

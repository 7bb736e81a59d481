//! Output module for Note Print
//!
//! Delivers a finished print job to one of the output paths:
//! - Native print through the host
//! - A standalone document opened in the external browser
//! - The in-app preview window

pub mod browser;
pub mod document;
pub mod native;
pub mod preview;

pub use browser::{BrowserLauncher, BrowserSink, SystemBrowser};
pub use document::standalone_document;
pub use native::{FileExportPrinter, NativePrinter, NativeSink};
pub use preview::{OverlayHost, PreviewAction, PreviewWindow, PreviewWindowSink};

use crate::config::PrintMode;
use crate::dom::Element;
use crate::error::PrintResult;
use crate::style::ComposedStylesheet;
use async_trait::async_trait;
use std::sync::Arc;

/// A rendered fragment with its stylesheet, ready to print
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    pub fragment: Element,
    pub stylesheet: ComposedStylesheet,
    /// Human-readable name, usually the note basename
    pub label: String,
    /// Whether the fragment was captured from the live preview
    pub advanced: bool,
}

/// Somewhere a print job can go
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn deliver(&self, job: PrintJob) -> PrintResult<()>;
}

/// Routes jobs to the sink matching their print mode
#[derive(Clone)]
pub struct OutputDispatcher {
    native: Arc<dyn OutputSink>,
    browser: Arc<dyn OutputSink>,
    preview: Arc<dyn OutputSink>,
}

impl OutputDispatcher {
    pub fn new(
        native: Arc<dyn OutputSink>,
        browser: Arc<dyn OutputSink>,
        preview: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            native,
            browser,
            preview,
        }
    }

    pub fn sink_for(&self, mode: PrintMode) -> &Arc<dyn OutputSink> {
        match mode {
            PrintMode::Basic => &self.native,
            PrintMode::Standard | PrintMode::Advanced => &self.browser,
            PrintMode::Preview => &self.preview,
        }
    }

    pub async fn dispatch(&self, mode: PrintMode, job: PrintJob) -> PrintResult<()> {
        log::info!("Printing {} via {:?}", job.label, mode);
        self.sink_for(mode).deliver(job).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;

    fn job() -> PrintJob {
        PrintJob {
            fragment: Element::new("div"),
            stylesheet: ComposedStylesheet::default(),
            label: "Notes".to_string(),
            advanced: false,
        }
    }

    #[tokio::test]
    async fn test_dispatch_routes_by_mode() {
        let native = Arc::new(RecordingSink::default());
        let browser = Arc::new(RecordingSink::default());
        let preview = Arc::new(RecordingSink::default());
        let dispatcher = OutputDispatcher::new(native.clone(), browser.clone(), preview.clone());

        dispatcher.dispatch(PrintMode::Basic, job()).await.unwrap();
        dispatcher.dispatch(PrintMode::Standard, job()).await.unwrap();
        dispatcher.dispatch(PrintMode::Advanced, job()).await.unwrap();
        dispatcher.dispatch(PrintMode::Preview, job()).await.unwrap();

        assert_eq!(native.jobs().len(), 1);
        assert_eq!(browser.jobs().len(), 2);
        assert_eq!(preview.jobs().len(), 1);
    }
}

//! Native printing
//!
//! Hands the job to whatever the host offers as its own print facility. The
//! command-line host has no print dialog, so it exports the standalone
//! document to a file instead.

use crate::error::PrintResult;
use crate::file_handler::write_file_atomic;
use crate::output::{standalone_document, OutputSink, PrintJob};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The host's native print facility
#[async_trait]
pub trait NativePrinter: Send + Sync {
    async fn print(&self, job: &PrintJob) -> PrintResult<()>;
}

/// Sink delegating to a [`NativePrinter`]
pub struct NativeSink {
    printer: Arc<dyn NativePrinter>,
}

impl NativeSink {
    pub fn new(printer: Arc<dyn NativePrinter>) -> Self {
        Self { printer }
    }
}

#[async_trait]
impl OutputSink for NativeSink {
    async fn deliver(&self, job: PrintJob) -> PrintResult<()> {
        self.printer.print(&job).await
    }
}

/// Writes the standalone document to a chosen file
pub struct FileExportPrinter {
    output: Option<PathBuf>,
    fallback_dir: PathBuf,
}

impl FileExportPrinter {
    /// Export to `output`, or to `<label>.html` inside `fallback_dir`
    pub fn new(output: Option<PathBuf>, fallback_dir: PathBuf) -> Self {
        Self {
            output,
            fallback_dir,
        }
    }

    /// Where a job will be written
    pub fn output_path(&self, job: &PrintJob) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => suggest_output_path(&self.fallback_dir, &job.label),
        }
    }
}

/// `<dir>/<label>.html`, with path separators in the label replaced
pub fn suggest_output_path(dir: &Path, label: &str) -> PathBuf {
    let stem: String = label
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    let stem = if stem.trim().is_empty() {
        "document".to_string()
    } else {
        stem
    };
    dir.join(format!("{}.html", stem))
}

#[async_trait]
impl NativePrinter for FileExportPrinter {
    async fn print(&self, job: &PrintJob) -> PrintResult<()> {
        let path = self.output_path(job);
        write_file_atomic(&path, &standalone_document(job)).await?;
        log::info!("Exported {} to {}", job.label, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;
    use crate::style::ComposedStylesheet;
    use tempfile::TempDir;

    fn job(label: &str) -> PrintJob {
        PrintJob {
            fragment: Element::new("p").with_text("Hello"),
            stylesheet: ComposedStylesheet::default(),
            label: label.to_string(),
            advanced: false,
        }
    }

    #[test]
    fn test_suggest_output_path() {
        let dir = Path::new("/tmp/out");
        assert_eq!(suggest_output_path(dir, "Notes"), dir.join("Notes.html"));
        assert_eq!(suggest_output_path(dir, "a/b"), dir.join("a_b.html"));
        assert_eq!(suggest_output_path(dir, " "), dir.join("document.html"));
    }

    #[tokio::test]
    async fn test_export_to_fallback_dir() {
        let dir = TempDir::new().unwrap();
        let sink = NativeSink::new(Arc::new(FileExportPrinter::new(
            None,
            dir.path().to_path_buf(),
        )));

        sink.deliver(job("Notes")).await.unwrap();
        let html = std::fs::read_to_string(dir.path().join("Notes.html")).unwrap();
        assert!(html.contains("<p>Hello</p>"));
    }

    #[tokio::test]
    async fn test_export_to_explicit_path() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("custom.html");
        let printer = FileExportPrinter::new(Some(target.clone()), PathBuf::from("/unused"));

        printer.print(&job("Notes")).await.unwrap();
        assert!(target.exists());
    }
}

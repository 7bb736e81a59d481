//! External-browser printing
//!
//! Writes the standalone document to a uniquely named temp file, opens it in
//! the default browser (which shows the print dialog) and deletes the file
//! after a delay.

use crate::error::{PrintError, PrintResult};
use crate::file_handler::write_file_atomic;
use crate::output::{standalone_document, OutputSink, PrintJob};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Temp file name prefix
pub const TEMP_PREFIX: &str = "note-print";

/// Opens a file in a browser
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, path: &Path) -> std::io::Result<()>;
}

/// The system default browser
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, path: &Path) -> std::io::Result<()> {
        webbrowser::open(&path.to_string_lossy())
    }
}

/// Unique temp file name: `note-print-<millis>-<uuid>.html`
pub fn temp_file_name() -> String {
    format!(
        "{}-{}-{}.html",
        TEMP_PREFIX,
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Prints through the external browser
pub struct BrowserSink {
    launcher: Arc<dyn BrowserLauncher>,
    temp_dir: PathBuf,
    cleanup_delay: Duration,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl BrowserSink {
    pub fn new(cleanup_delay: Duration) -> Self {
        Self::with_launcher(Arc::new(SystemBrowser), std::env::temp_dir(), cleanup_delay)
    }

    pub fn with_launcher(
        launcher: Arc<dyn BrowserLauncher>,
        temp_dir: PathBuf,
        cleanup_delay: Duration,
    ) -> Self {
        Self {
            launcher,
            temp_dir,
            cleanup_delay,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Wait for every scheduled temp-file deletion to finish
    pub async fn wait_for_cleanup(&self) {
        let handles: Vec<_> = match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };
        for handle in handles {
            if let Err(e) = handle.await {
                log::warn!("Temp file cleanup task failed: {}", e);
            }
        }
    }

    fn schedule_cleanup(&self, path: PathBuf) {
        let delay = self.cleanup_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => log::debug!("Removed {}", path.display()),
                Err(e) => log::warn!("Could not remove {}: {}", path.display(), e),
            }
        });

        match self.pending.lock() {
            Ok(mut pending) => pending.push(handle),
            Err(poisoned) => poisoned.into_inner().push(handle),
        }
    }
}

#[async_trait]
impl OutputSink for BrowserSink {
    async fn deliver(&self, job: PrintJob) -> PrintResult<()> {
        let html = standalone_document(&job);
        let path = self.temp_dir.join(temp_file_name());

        write_file_atomic(&path, &html).await?;
        log::debug!("Wrote print document to {}", path.display());

        if let Err(e) = self.launcher.open(&path) {
            log::error!("Failed to open browser for {}: {}", path.display(), e);
            if let Err(e) = tokio::fs::remove_file(&path).await {
                log::warn!("Could not remove {}: {}", path.display(), e);
            }
            return Err(PrintError::LaunchFailure(e.to_string()));
        }

        self.schedule_cleanup(path);
        Ok(())
    }
}

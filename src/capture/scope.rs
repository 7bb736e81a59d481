//! Scoped changes to host-owned UI state
//!
//! Capturing mutates two pieces of state the host owns: the preview surface's
//! view mode and the document's light/dark theme class. Each is wrapped in a
//! scope that records the original state, forces the state printing needs and
//! restores the original afterwards.
//!
//! The theme switch is synchronous and restores on drop. The mode switch is
//! asynchronous, so it cannot restore from `Drop`; callers must run
//! [`ModeScope::restore`] on every exit path.

use crate::config::ViewMode;
use crate::error::PrintResult;
use crate::host::{PreviewSurface, ThemeHost};
use std::sync::Arc;
use std::time::Duration;

/// Forces the light theme while alive
pub struct LightThemeGuard {
    theme: Arc<dyn ThemeHost>,
    was_dark: bool,
}

impl LightThemeGuard {
    /// Switch to the light theme if the dark theme is active
    pub fn acquire(theme: Arc<dyn ThemeHost>) -> Self {
        let was_dark = theme.is_dark();
        if was_dark {
            log::trace!("Switching to light theme");
            theme.set_dark(false);
        }
        Self { theme, was_dark }
    }
}

impl Drop for LightThemeGuard {
    fn drop(&mut self) {
        if self.was_dark {
            log::trace!("Restoring dark theme");
            self.theme.set_dark(true);
        }
    }
}

/// Remembers a surface's view mode so it can be restored after capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeScope {
    original: ViewMode,
}

impl ModeScope {
    /// Record the surface's current mode
    pub fn enter(surface: &dyn PreviewSurface) -> Self {
        Self {
            original: surface.mode(),
        }
    }

    pub fn was_editing(&self) -> bool {
        self.original == ViewMode::Edit
    }

    /// Put the surface into preview mode with a fresh render
    ///
    /// A surface already in preview is cycled through edit mode so the host
    /// re-renders instead of reusing a cached layout.
    pub async fn force_preview(
        &self,
        surface: &mut dyn PreviewSurface,
        settle: Duration,
    ) -> PrintResult<()> {
        if !self.was_editing() {
            surface.set_mode(ViewMode::Edit).await?;
            tokio::time::sleep(settle).await;
        }
        surface.set_mode(ViewMode::Preview).await
    }

    /// Return the surface to its original mode and rebuild it
    ///
    /// The rebuild happens even when switching back fails.
    pub async fn restore(self, surface: &mut dyn PreviewSurface) -> PrintResult<()> {
        let result = if self.was_editing() {
            surface.set_mode(ViewMode::Edit).await
        } else {
            Ok(())
        };
        surface.rebuild();
        if let Err(err) = &result {
            log::error!("Could not restore {:?} mode: {}", self.original, err);
        }
        result
    }
}

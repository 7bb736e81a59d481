//! Print commands
//!
//! Entry points sequencing capture or rendering, stylesheet composition and
//! output. Every failure is logged and reported through the notifier before
//! being returned to the caller.

use crate::capture::{CapturePolicy, CaptureTarget, LightThemeGuard, StableSnapshotCapture};
use crate::config::{Config, PrintMode, RenderSettings};
use crate::dom::Element;
use crate::error::{PrintError, PrintResult};
use crate::folder::{folder_label, render_folder, resolve_folder};
use crate::host::{NoteFile, Notifier, ThemeHost, Workspace};
use crate::markdown::{CmarkRenderer, ContentRenderer, MarkdownRenderer};
use crate::output::{OutputDispatcher, PrintJob};
use crate::style::{compose, import_theme_colors, read_palette, ComposedStylesheet, StyleSources};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Label used when nothing names the printed content
const UNTITLED: &str = "Untitled";

/// Fill in derived settings that were never computed
///
/// Heading sizes are derived from the base size and theme colors imported
/// once. Returns whether anything changed and the settings need saving.
pub fn initialize_settings(config: &mut Config, theme: &Arc<dyn ThemeHost>) -> bool {
    let mut changed = false;
    if config.render.auto_sync_heading_sizes && !config.render.has_initialized_sizes {
        changed |= config.render.sync_heading_sizes();
    }
    if !config.render.has_initialized_colors {
        import_theme_colors(&mut config.render, &read_palette(theme));
        log::info!("Imported heading colors from the theme");
        changed = true;
    }
    changed
}

/// Marks the printer busy until dropped
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> PrintResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| PrintError::Busy)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The command surface
///
/// Holds a snapshot of the configuration taken when the command started.
/// Only one print runs at a time; a second request fails with
/// [`PrintError::Busy`].
pub struct Printer {
    config: Config,
    renderer: ContentRenderer,
    capture: StableSnapshotCapture,
    theme: Arc<dyn ThemeHost>,
    notifier: Arc<dyn Notifier>,
    dispatcher: OutputDispatcher,
    busy: AtomicBool,
}

impl Printer {
    pub fn new(
        config: Config,
        theme: Arc<dyn ThemeHost>,
        notifier: Arc<dyn Notifier>,
        dispatcher: OutputDispatcher,
    ) -> Self {
        Self {
            config,
            renderer: ContentRenderer::new(Arc::new(CmarkRenderer::new())),
            capture: StableSnapshotCapture::default(),
            theme,
            notifier,
            dispatcher,
            busy: AtomicBool::new(false),
        }
    }

    /// Replace the markdown renderer
    pub fn with_renderer(mut self, renderer: Arc<dyn MarkdownRenderer>) -> Self {
        self.renderer = ContentRenderer::new(renderer);
        self
    }

    /// Replace the capture timings
    pub fn with_capture_policy(mut self, policy: CapturePolicy) -> Self {
        self.capture = StableSnapshotCapture::new(policy);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Print a note, or the active one when `file` is `None`
    ///
    /// Advanced mode captures the live preview instead of rendering from
    /// source.
    pub async fn print_note(
        &self,
        workspace: &mut dyn Workspace,
        file: Option<NoteFile>,
        mode: Option<PrintMode>,
    ) -> PrintResult<()> {
        let result = match BusyGuard::acquire(&self.busy) {
            Ok(_busy) => self.run_note(workspace, file, mode).await,
            Err(e) => Err(e),
        };
        self.report(result)
    }

    /// Print the current selection
    pub async fn print_selection(
        &self,
        workspace: &mut dyn Workspace,
        mode: Option<PrintMode>,
    ) -> PrintResult<()> {
        let result = match BusyGuard::acquire(&self.busy) {
            Ok(_busy) => self.run_selection(workspace, mode).await,
            Err(e) => Err(e),
        };
        self.report(result)
    }

    /// Print every note directly inside a folder
    ///
    /// Uses the active note's folder when `folder` is `None`.
    pub async fn print_folder(
        &self,
        workspace: &mut dyn Workspace,
        folder: Option<PathBuf>,
        mode: Option<PrintMode>,
    ) -> PrintResult<()> {
        let result = match BusyGuard::acquire(&self.busy) {
            Ok(_busy) => self.run_folder(workspace, folder, mode).await,
            Err(e) => Err(e),
        };
        self.report(result)
    }

    async fn run_note(
        &self,
        workspace: &mut dyn Workspace,
        file: Option<NoteFile>,
        mode: Option<PrintMode>,
    ) -> PrintResult<()> {
        let settings = self.config.render.clone();
        let mode = self.config.output.resolve_mode(mode);
        let file = file.or_else(|| workspace.active_file());
        let _light = self.light_theme_for(mode);

        let (fragment, label) = match mode {
            PrintMode::Advanced => {
                let label = match (&file, workspace.active_preview()) {
                    (Some(file), _) => file.basename(),
                    (None, Some(surface)) => surface
                        .file()
                        .map(|f| f.basename())
                        .unwrap_or_else(|| UNTITLED.to_string()),
                    (None, None) => return Err(PrintError::NoFileToPrint),
                };
                let snapshot = self
                    .capture
                    .capture(workspace, CaptureTarget::WholeDocument, &settings)
                    .await?;
                (snapshot.into_element(), label)
            }
            _ => {
                let file = file.ok_or(PrintError::NoFileToPrint)?;
                let fragment = self.renderer.render_file(workspace, &file, &settings)?;
                (fragment, file.basename())
            }
        };

        self.deliver(mode, fragment, label, &settings).await
    }

    async fn run_selection(
        &self,
        workspace: &mut dyn Workspace,
        mode: Option<PrintMode>,
    ) -> PrintResult<()> {
        let settings = self.config.render.clone();
        let mode = self.config.output.resolve_mode(mode);
        let label = workspace
            .active_file()
            .map(|f| f.basename())
            .unwrap_or_else(|| UNTITLED.to_string());
        let _light = self.light_theme_for(mode);

        let fragment = match mode {
            PrintMode::Advanced => self
                .capture
                .capture(workspace, CaptureTarget::Selection, &settings)
                .await?
                .into_element(),
            _ => self.renderer.render_selection(workspace, &settings)?,
        };

        self.deliver(mode, fragment, label, &settings).await
    }

    async fn run_folder(
        &self,
        workspace: &mut dyn Workspace,
        folder: Option<PathBuf>,
        mode: Option<PrintMode>,
    ) -> PrintResult<()> {
        let settings = self.config.render.clone();
        let mode = match self.config.output.resolve_mode(mode) {
            PrintMode::Advanced => {
                log::debug!("Folders have no live preview, rendering from source");
                PrintMode::Standard
            }
            mode => mode,
        };

        let folder = resolve_folder(workspace, folder)?;
        let fragment = render_folder(
            &self.renderer,
            workspace,
            &folder,
            &settings,
            self.config.output.combine_folder_notes,
        )?;

        self.deliver(mode, fragment, folder_label(&folder), &settings)
            .await
    }

    /// Live captures are taken and styled under the light theme
    fn light_theme_for(&self, mode: PrintMode) -> Option<LightThemeGuard> {
        (mode == PrintMode::Advanced).then(|| LightThemeGuard::acquire(Arc::clone(&self.theme)))
    }

    async fn deliver(
        &self,
        mode: PrintMode,
        fragment: Element,
        label: String,
        settings: &RenderSettings,
    ) -> PrintResult<()> {
        let job = PrintJob {
            fragment,
            stylesheet: self.stylesheet(settings),
            label,
            advanced: mode == PrintMode::Advanced,
        };
        self.dispatcher.dispatch(mode, job).await
    }

    /// Compose the stylesheet, reporting unreadable style files without failing
    pub fn stylesheet(&self, settings: &RenderSettings) -> ComposedStylesheet {
        let (sources, failures) = StyleSources::load(&self.config.style);
        for failure in failures {
            log::warn!("{}", failure);
            self.notifier.notify(&failure.user_message());
        }

        let palette = settings
            .use_theme_colors
            .then(|| read_palette(&self.theme));
        compose(settings, palette.as_ref(), &sources)
    }

    fn report(&self, result: PrintResult<()>) -> PrintResult<()> {
        if let Err(e) = &result {
            log::error!("Print failed: {}", e);
            self.notifier.notify(&e.user_message());
        }
        result
    }
}

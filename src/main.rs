//! Note Print - print markdown notes from the command line
//!
//! Entry point. Handles CLI argument parsing, logging initialization and
//! wiring the filesystem host to the printer.

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use note_print::cli::{CliArgs, Command, ConfigCommand};
use note_print::commands::{initialize_settings, Printer};
use note_print::config::Config;
use note_print::host::ThemeHost;
use note_print::markdown::CmarkRenderer;
use note_print::output::{
    BrowserLauncher, BrowserSink, FileExportPrinter, NativeSink, OutputDispatcher,
    PreviewWindowSink, SystemBrowser,
};
use note_print::style::{import_theme_colors, read_palette};
use note_print::vault::{ConsoleNotifier, CssTheme, FsWorkspace, TerminalOverlay};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Application name for logging
const APP_NAME: &str = "note-print";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    init_logging(config.debug_mode || args.verbose);
    log::info!("Starting {} {}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let theme: Arc<dyn ThemeHost> = Arc::new(load_theme(&config));

    match args.command {
        Command::Config(command) => run_config(command, &mut config, &config_path, &theme),
        command => {
            if initialize_settings(&mut config, &theme) {
                config.save_to(&config_path)?;
            }
            let vault = match &args.vault {
                Some(vault) => vault.clone(),
                None => std::env::current_dir()?,
            };
            run_print(command, config, theme, &vault, args.output).await
        }
    }
}

/// Initialize the logging system
fn init_logging(debug: bool) {
    // Set default log level if not specified
    if std::env::var("RUST_LOG").is_err() {
        let filter = if debug {
            "info,note_print=trace"
        } else {
            "info,note_print=debug"
        };
        std::env::set_var("RUST_LOG", filter);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

fn load_theme(config: &Config) -> CssTheme {
    CssTheme::from_config(&config.style).unwrap_or_else(|e| {
        log::warn!("Theme stylesheet unavailable: {}", e);
        CssTheme::new(None, config.style.dark_mode)
    })
}

async fn run_print(
    command: Command,
    config: Config,
    theme: Arc<dyn ThemeHost>,
    vault: &Path,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let launcher: Arc<dyn BrowserLauncher> = Arc::new(SystemBrowser);
    let browser = Arc::new(BrowserSink::with_launcher(
        Arc::clone(&launcher),
        std::env::temp_dir(),
        Duration::from_secs(config.output.cleanup_delay_secs),
    ));
    let native = Arc::new(NativeSink::new(Arc::new(FileExportPrinter::new(
        output,
        std::env::current_dir()?,
    ))));
    let overlay = Arc::new(TerminalOverlay::new(launcher, browser.clone()));
    let preview = Arc::new(PreviewWindowSink::new(overlay, Arc::clone(&theme)));
    let dispatcher = OutputDispatcher::new(native, browser.clone(), preview);

    let renderer = Arc::new(CmarkRenderer::new());
    let printer = Printer::new(config, theme, Arc::new(ConsoleNotifier), dispatcher)
        .with_renderer(renderer.clone());
    let mut workspace = FsWorkspace::open(vault)?;

    let result = match command {
        Command::Note { path, mode } => {
            let file = workspace.activate(&path)?;
            workspace.open_preview(renderer)?;
            printer
                .print_note(&mut workspace, Some(file), mode.mode)
                .await
                .map_err(Into::into)
        }
        Command::Selection { path, lines, mode } => {
            workspace.activate(&path)?;
            workspace.open_preview(renderer)?;
            workspace.select_lines(lines)?;
            printer
                .print_selection(&mut workspace, mode.mode)
                .await
                .map_err(Into::into)
        }
        Command::Folder { path, note, mode } => {
            if let Some(note) = note {
                workspace.activate(&note)?;
            }
            let folder = path.map(|p| workspace.resolve(&p));
            printer
                .print_folder(&mut workspace, folder, mode.mode)
                .await
                .map_err(Into::into)
        }
        Command::Config(_) => Err(anyhow!("config commands do not print")),
    };

    browser.wait_for_cleanup().await;
    result
}

fn run_config(
    command: ConfigCommand,
    config: &mut Config,
    path: &Path,
    theme: &Arc<dyn ThemeHost>,
) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
            return Ok(());
        }
        ConfigCommand::SyncSizes => {
            if !config.render.sync_heading_sizes() {
                bail!("font size {:?} is not a pixel size", config.render.font_size);
            }
        }
        ConfigCommand::ImportTheme => {
            if theme.theme_css().is_none() {
                log::warn!("No theme stylesheet configured, headings default to black");
            }
            import_theme_colors(&mut config.render, &read_palette(theme));
        }
        ConfigCommand::Set { key, value } => config.set_value(&key, &value)?,
    }

    config.save_to(path)?;
    println!("Saved {}", path.display());
    Ok(())
}

//! Configuration management for Note Print
//!
//! Handles loading, saving, and deriving print settings. Configuration is
//! persisted as JSON in the user's configuration directory; every section
//! defaults missing keys so older files keep loading.

use crate::error::{ConfigError, ConfigResult};
use crate::style::fonts;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Application identifier used for the configuration directory
pub const APP_ID: &str = "note-print";

/// Configuration file name inside the configuration directory
pub const CONFIG_FILE: &str = "config.json";

/// Inline title size relative to the base font size
pub const INLINE_TITLE_MULTIPLIER: f64 = 2.2;

/// Default print font stack
pub const DEFAULT_FONT_FAMILY: &str = "var(--print-font-family, -apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, Arial, sans-serif)";

/// Heading levels in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// Ordered table of every heading level
    pub const ALL: [HeadingLevel; 6] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
        HeadingLevel::H6,
    ];

    /// Zero-based position in [`HeadingLevel::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Level number, 1 through 6
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=6 => Some(Self::ALL[number as usize - 1]),
            _ => None,
        }
    }

    /// HTML tag name
    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
            HeadingLevel::H5 => "h5",
            HeadingLevel::H6 => "h6",
        }
    }

    /// Size relative to the base font size when sizes are synced
    pub fn size_multiplier(self) -> f64 {
        match self {
            HeadingLevel::H1 => 1.9,
            HeadingLevel::H2 => 1.7,
            HeadingLevel::H3 => 1.5,
            HeadingLevel::H4 => 1.3,
            HeadingLevel::H5 => 1.2,
            HeadingLevel::H6 => 1.1,
        }
    }

    /// Size used before any sync has happened
    pub fn default_size(self) -> String {
        format!("{}px", 12 + (7 - self.number() as u32) * 2)
    }
}

/// Size and color of one heading level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingStyle {
    pub size: String,
    pub color: String,
}

/// Print rendering settings
///
/// A snapshot of this struct is taken for each print call; it is only
/// mutated through the settings operations below and saved after each change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Include the note title in the printout
    pub print_title: bool,

    /// Include the note front matter in the printout
    pub show_metadata: bool,

    /// Treat horizontal rules as page breaks
    pub hr_page_breaks: bool,

    /// CSS font stack for the printout
    pub font_family: String,

    /// Base font size (`<number>px`)
    pub font_size: String,

    /// Heading styles, indexed by [`HeadingLevel::index`]
    pub headings: [HeadingStyle; 6],

    /// Inline title size (`<number>px`)
    pub inline_title_size: String,

    /// Inline title color
    pub inline_title_color: String,

    /// Recompute heading sizes whenever the base font size changes
    pub auto_sync_heading_sizes: bool,

    /// Prefer live theme colors over stored heading colors
    pub use_theme_colors: bool,

    /// Whether heading sizes were derived at least once
    pub has_initialized_sizes: bool,

    /// Whether heading colors were imported at least once
    pub has_initialized_colors: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        let headings = HeadingLevel::ALL.map(|level| HeadingStyle {
            size: level.default_size(),
            color: "black".to_string(),
        });
        Self {
            print_title: true,
            show_metadata: false,
            hr_page_breaks: false,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: "12px".to_string(),
            headings,
            inline_title_size: "26px".to_string(),
            inline_title_color: "black".to_string(),
            auto_sync_heading_sizes: true,
            use_theme_colors: false,
            has_initialized_sizes: false,
            has_initialized_colors: false,
        }
    }
}

impl RenderSettings {
    pub fn heading(&self, level: HeadingLevel) -> &HeadingStyle {
        &self.headings[level.index()]
    }

    pub fn heading_mut(&mut self, level: HeadingLevel) -> &mut HeadingStyle {
        &mut self.headings[level.index()]
    }

    /// Derive heading and inline title sizes from the base font size
    ///
    /// Returns `false` and leaves sizes untouched when the base size does not
    /// parse.
    pub fn sync_heading_sizes(&mut self) -> bool {
        let Some(base) = parse_px(&self.font_size) else {
            log::warn!("Cannot derive heading sizes from {:?}", self.font_size);
            return false;
        };

        for level in HeadingLevel::ALL {
            self.heading_mut(level).size = format_px(base * level.size_multiplier());
        }
        self.inline_title_size = format_px(base * INLINE_TITLE_MULTIPLIER);
        self.has_initialized_sizes = true;
        true
    }

    /// Set the base font size, re-deriving heading sizes when auto-sync is on
    pub fn set_font_size(&mut self, size: String) {
        self.font_size = size;
        if self.auto_sync_heading_sizes {
            self.sync_heading_sizes();
        }
    }
}

/// Parse a `<number>px` (or bare number) size
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a size rounded to one decimal place
pub fn format_px(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    format!("{}px", rounded)
}

/// Validate user-entered sizes: positive integers with an optional `px` suffix
pub fn normalize_size(value: &str) -> Option<String> {
    static SIZE_RE: OnceLock<Regex> = OnceLock::new();
    let re = SIZE_RE.get_or_init(|| Regex::new(r"^\d+(?:px)?$").expect("valid size regex"));

    let value = value.trim().to_lowercase();
    if !re.is_match(&value) {
        return None;
    }
    let number: u32 = value.trim_end_matches("px").parse().ok()?;
    (number > 0).then(|| format!("{}px", number))
}

/// How a print request is turned into output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrintMode {
    /// Hand off to the host's native print
    Basic,
    /// Render from source and print through the browser
    #[default]
    Standard,
    /// Capture the live preview and print through the browser
    Advanced,
    /// Show the in-app preview window
    Preview,
}

impl std::str::FromStr for PrintMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(PrintMode::Basic),
            "standard" => Ok(PrintMode::Standard),
            "advanced" => Ok(PrintMode::Advanced),
            "preview" => Ok(PrintMode::Preview),
            other => Err(ConfigError::InvalidValue {
                key: "default_mode".to_string(),
                reason: format!("unknown print mode {:?}", other),
            }),
        }
    }
}

/// View mode of a preview surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ViewMode {
    /// Edit mode - raw markdown editing
    #[default]
    Edit,
    /// Preview mode - rendered markdown
    Preview,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Allow printing through the external browser
    pub use_browser_print: bool,

    /// Mode used when a command does not name one
    pub default_mode: PrintMode,

    /// Print folder notes as one flowing document instead of one note per page
    pub combine_folder_notes: bool,

    /// Seconds before the browser temp file is deleted
    pub cleanup_delay_secs: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_browser_print: true,
            default_mode: PrintMode::Standard,
            combine_folder_notes: false,
            cleanup_delay_secs: 5,
        }
    }
}

impl OutputConfig {
    /// Resolve the effective mode for a request
    pub fn resolve_mode(&self, requested: Option<PrintMode>) -> PrintMode {
        let mode = requested.unwrap_or(self.default_mode);
        match mode {
            PrintMode::Standard | PrintMode::Advanced if !self.use_browser_print => {
                log::debug!("Browser print disabled, falling back to basic print");
                PrintMode::Basic
            }
            mode => mode,
        }
    }
}

/// Stylesheet configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Base print stylesheet (bundled stylesheet when unset)
    pub stylesheet: Option<PathBuf>,

    /// User CSS snippet appended last
    pub snippet: Option<PathBuf>,

    /// Whether the user snippet is applied
    pub snippet_enabled: bool,

    /// Active theme stylesheet used for color import
    pub theme_css: Option<PathBuf>,

    /// Whether the theme is currently dark
    pub dark_mode: bool,
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering settings
    pub render: RenderSettings,

    /// Output configuration
    pub output: OutputConfig,

    /// Stylesheet configuration
    pub style: StyleConfig,

    /// Verbose diagnostics
    pub debug_mode: bool,
}

impl Config {
    /// Load configuration from a file; a missing file yields defaults
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;
        let mut config: Config =
            serde_json::from_str(&text).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config.render.auto_sync_heading_sizes && !config.render.has_initialized_sizes {
            config.render.sync_heading_sizes();
        }
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveError(format!("{}: {}", parent.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| ConfigError::SaveError(format!("{}: {}", path.display(), e)))?;
        log::debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the configuration file path
    pub fn config_path() -> ConfigResult<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE))
    }

    /// Update one setting from its textual form
    pub fn set_value(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let key = key.trim().replace('_', "-");

        if let Some(level) = heading_key(&key, "-size") {
            let size = require_size(&key, value)?;
            self.render.heading_mut(level).size = size;
            return Ok(());
        }
        if let Some(level) = heading_key(&key, "-color") {
            self.render.heading_mut(level).color = value.trim().to_string();
            return Ok(());
        }

        match key.as_str() {
            "print-title" => self.render.print_title = parse_bool(&key, value)?,
            "show-metadata" => self.render.show_metadata = parse_bool(&key, value)?,
            "hr-page-breaks" => self.render.hr_page_breaks = parse_bool(&key, value)?,
            "font-size" => {
                let size = require_size(&key, value)?;
                self.render.set_font_size(size);
            }
            "font-family" => {
                self.render.font_family = fonts::resolve(value)
                    .map(str::to_string)
                    .unwrap_or_else(|| value.trim().to_string());
            }
            "inline-title-size" => self.render.inline_title_size = require_size(&key, value)?,
            "inline-title-color" => self.render.inline_title_color = value.trim().to_string(),
            "auto-sync-heading-sizes" => {
                self.render.auto_sync_heading_sizes = parse_bool(&key, value)?
            }
            "use-theme-colors" => self.render.use_theme_colors = parse_bool(&key, value)?,
            "use-browser-print" => self.output.use_browser_print = parse_bool(&key, value)?,
            "combine-folder-notes" => self.output.combine_folder_notes = parse_bool(&key, value)?,
            "default-mode" => self.output.default_mode = value.parse()?,
            "stylesheet" => self.style.stylesheet = optional_path(value),
            "snippet" => self.style.snippet = optional_path(value),
            "snippet-enabled" => self.style.snippet_enabled = parse_bool(&key, value)?,
            "theme-css" => self.style.theme_css = optional_path(value),
            "dark-mode" => self.style.dark_mode = parse_bool(&key, value)?,
            "debug-mode" => self.debug_mode = parse_bool(&key, value)?,
            _ => return Err(ConfigError::UnknownKey { key }),
        }
        Ok(())
    }
}

fn heading_key(key: &str, suffix: &str) -> Option<HeadingLevel> {
    let number = key.strip_prefix('h')?.strip_suffix(suffix)?;
    HeadingLevel::from_number(number.parse().ok()?)
}

fn require_size(key: &str, value: &str) -> ConfigResult<String> {
    normalize_size(value).ok_or_else(|| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: "expected a positive number of pixels".to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("expected true or false, got {:?}", value),
        }),
    }
}

fn optional_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty() && value != "none").then(|| PathBuf::from(value))
}

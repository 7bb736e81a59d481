//! Print stylesheet composition
//!
//! The printed stylesheet is assembled from rule blocks in a fixed order;
//! later blocks override earlier ones through the normal cascade:
//!
//! 1. base font rule
//! 2. title rule (visible with size and color, or hidden)
//! 3. one rule per heading level
//! 4. horizontal-rule page breaks, when enabled
//! 5. metadata hiding, when metadata display is off
//! 6. base print stylesheet
//! 7. user snippet

pub mod fonts;
pub mod theme;

pub use theme::{import_theme_colors, read_palette, ThemePalette};

use crate::config::{HeadingLevel, RenderSettings, StyleConfig};
use crate::error::PrintError;
use std::fmt;
use std::path::Path;

/// Class applied to the root of every printout
pub const ROOT_CLASS: &str = "note-print";

/// Stylesheet shipped with the crate, used when none is configured
pub const BUNDLED_STYLESHEET: &str = include_str!("../../assets/print.css");

/// One CSS text assembled for a printout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedStylesheet(String);

impl ComposedStylesheet {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ComposedStylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// External CSS feeding the composer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSources {
    /// Base print stylesheet
    pub base: Option<String>,
    /// User snippet, only present when enabled
    pub snippet: Option<String>,
}

impl StyleSources {
    /// Read the configured stylesheets
    ///
    /// Unreadable files are skipped and reported as
    /// [`PrintError::StyleLoadFailure`]; printing continues without them.
    pub fn load(config: &StyleConfig) -> (Self, Vec<PrintError>) {
        let mut failures = Vec::new();

        let base = match &config.stylesheet {
            Some(path) => read_css(path).map_err(|e| failures.push(e)).ok(),
            None => Some(BUNDLED_STYLESHEET.to_string()),
        };

        let snippet = match (&config.snippet, config.snippet_enabled) {
            (Some(path), true) => read_css(path).map_err(|e| failures.push(e)).ok(),
            _ => None,
        };

        (Self { base, snippet }, failures)
    }
}

fn read_css(path: &Path) -> Result<String, PrintError> {
    std::fs::read_to_string(path).map_err(|source| {
        log::warn!("Could not read stylesheet {}: {}", path.display(), source);
        PrintError::StyleLoadFailure {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Build the print stylesheet
///
/// With `use_theme_colors` set, colors found in `palette` replace the stored
/// heading and title colors. Output depends only on the inputs.
pub fn compose(
    settings: &RenderSettings,
    palette: Option<&ThemePalette>,
    sources: &StyleSources,
) -> ComposedStylesheet {
    let palette = palette.filter(|_| settings.use_theme_colors);
    let mut blocks = Vec::with_capacity(11);

    blocks.push(format!(
        ".{root} {{ font-family: {}; font-size: {}; }}",
        settings.font_family,
        settings.font_size,
        root = ROOT_CLASS
    ));

    blocks.push(if settings.print_title {
        let color = palette
            .and_then(|p| p.inline_title.as_deref())
            .unwrap_or(settings.inline_title_color.as_str());
        format!(
            ".{root} .inline-title {{ display: block !important; font-size: {} !important; color: {} !important; }}",
            settings.inline_title_size,
            color,
            root = ROOT_CLASS
        )
    } else {
        format!(".{} .inline-title {{ display: none !important; }}", ROOT_CLASS)
    });

    for level in HeadingLevel::ALL {
        let style = settings.heading(level);
        let color = palette
            .and_then(|p| p.heading(level))
            .unwrap_or(style.color.as_str());
        blocks.push(format!(
            ".{} {} {{ font-size: {}; color: {}; }}",
            ROOT_CLASS,
            level.tag(),
            style.size,
            color
        ));
    }

    if settings.hr_page_breaks {
        blocks.push(format!(
            ".{} hr {{ page-break-before: always; break-before: page; border: none; }}",
            ROOT_CLASS
        ));
    }

    if !settings.show_metadata {
        blocks.push(metadata_hiding_rule());
    }

    if let Some(base) = &sources.base {
        blocks.push(base.clone());
    }
    if let Some(snippet) = &sources.snippet {
        blocks.push(snippet.clone());
    }

    ComposedStylesheet(blocks.join("\n"))
}

/// Rule hiding every metadata block
pub fn metadata_hiding_rule() -> String {
    format!(
        ".{root} .metadata-container, .{root} .custom-metadata-container {{ display: none !important; }}",
        root = ROOT_CLASS
    )
}

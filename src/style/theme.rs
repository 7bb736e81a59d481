//! Theme color import
//!
//! Recovers heading and inline-title colors from the active theme stylesheet.
//! Theme variables are looked up first, then direct heading rules. Values are
//! normalized to hex under the light theme, so a dark theme is switched to
//! light for the duration of the lookup.

use crate::capture::scope::LightThemeGuard;
use crate::config::{HeadingLevel, RenderSettings};
use crate::host::ThemeHost;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// Fallback when a theme defines no color
pub const DEFAULT_COLOR: &str = "#000000";

/// Colors recovered from the active theme
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemePalette {
    headings: [Option<String>; 6],
    pub inline_title: Option<String>,
}

impl ThemePalette {
    pub fn heading(&self, level: HeadingLevel) -> Option<&str> {
        self.headings[level.index()].as_deref()
    }

    pub fn set_heading(&mut self, level: HeadingLevel, color: impl Into<String>) {
        self.headings[level.index()] = Some(color.into());
    }
}

fn heading_var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"--h(\d)-color:\s*([^;]+);").expect("valid regex"))
}

fn heading_rule_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:\.cm-header-(\d)|\.markdown-preview-view\s+h(\d))[^{]*\{[^}]*?color:\s*([^;]+)",
        )
        .expect("valid regex")
    })
}

fn title_var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"--inline-title-color:\s*([^;]+);").expect("valid regex"))
}

fn title_rule_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\.inline-title[^{]*\{[^}]*?color:\s*([^;]+)")
            .expect("valid regex")
    })
}

/// Raw heading color values declared by a stylesheet
///
/// At most six declarations are considered; a later declaration for the same
/// level replaces an earlier one.
pub fn extract_heading_colors(css: &str) -> [Option<String>; 6] {
    let mut colors: [Option<String>; 6] = Default::default();
    let mut found = 0;

    for caps in heading_var_re().captures_iter(css) {
        if found >= 6 {
            break;
        }
        if let Some(level) = caps[1].parse().ok().and_then(HeadingLevel::from_number) {
            colors[level.index()] = Some(caps[2].trim().to_string());
            found += 1;
        }
    }

    if found == 0 {
        for caps in heading_rule_re().captures_iter(css) {
            if found >= 6 {
                break;
            }
            let number = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
            if let Some(level) = number
                .and_then(|n| n.parse().ok())
                .and_then(HeadingLevel::from_number)
            {
                colors[level.index()] = Some(caps[3].trim().to_string());
                found += 1;
            }
        }
    }

    colors
}

/// Raw inline-title color declared by a stylesheet
pub fn extract_inline_title_color(css: &str) -> Option<String> {
    title_var_re()
        .captures(css)
        .or_else(|| title_rule_re().captures(css))
        .map(|caps| caps[1].trim().to_string())
}

/// Convert `rgb(r, g, b)`-style values to `#rrggbb`; other input is returned unchanged
pub fn rgb_to_hex(rgb: &str) -> String {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = DIGITS.get_or_init(|| Regex::new(r"\d+").expect("valid regex"));

    let values: Vec<u8> = re
        .find_iter(rgb)
        .take(3)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .map(|v| v.min(255) as u8)
        .collect();
    if values.len() < 3 {
        return rgb.to_string();
    }
    format!("#{:02x}{:02x}{:02x}", values[0], values[1], values[2])
}

/// Normalize a theme color value to a concrete light-theme color
pub fn resolve_color(theme: &Arc<dyn ThemeHost>, value: &str) -> String {
    let value = value.trim();
    if value.starts_with('#') {
        return value.to_string();
    }
    if value.starts_with("rgb") {
        return rgb_to_hex(value);
    }

    let _light = LightThemeGuard::acquire(Arc::clone(theme));
    match theme.computed_color(value) {
        Some(computed) => rgb_to_hex(&computed),
        None => value.to_string(),
    }
}

/// Read heading and inline-title colors from the active theme
pub fn read_palette(theme: &Arc<dyn ThemeHost>) -> ThemePalette {
    let css = theme.theme_css().unwrap_or_default();
    let mut palette = ThemePalette::default();

    let raw = extract_heading_colors(&css);
    for level in HeadingLevel::ALL {
        if let Some(color) = &raw[level.index()] {
            palette.set_heading(level, resolve_color(theme, color));
        }
    }

    palette.inline_title = match extract_inline_title_color(&css) {
        Some(color) => Some(resolve_color(theme, &color)),
        None => theme.inline_title_color().map(|c| rgb_to_hex(&c)),
    };

    log::debug!("Read theme palette: {:?}", palette);
    palette
}

/// Store the palette in the settings, defaulting missing entries to black
pub fn import_theme_colors(settings: &mut RenderSettings, palette: &ThemePalette) {
    for level in HeadingLevel::ALL {
        settings.heading_mut(level).color = palette.heading(level).unwrap_or(DEFAULT_COLOR).to_string();
    }
    settings.inline_title_color = palette
        .inline_title
        .clone()
        .unwrap_or_else(|| DEFAULT_COLOR.to_string());
    settings.has_initialized_colors = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTheme;

    #[test]
    fn test_extract_heading_variables() {
        let css = "body { --h1-color: #112233; --h2-color: var(--accent); --h9-color: red; }";
        let colors = extract_heading_colors(css);
        assert_eq!(colors[0].as_deref(), Some("#112233"));
        assert_eq!(colors[1].as_deref(), Some("var(--accent)"));
        assert!(colors[2].is_none());
    }

    #[test]
    fn test_extract_direct_heading_rules() {
        let css = ".markdown-preview-view h2 { font-weight: 600; color: rgb(10, 20, 30); }\n\
                   .cm-header-3, .other { color: teal; }";
        let colors = extract_heading_colors(css);
        assert!(colors[0].is_none());
        assert_eq!(colors[1].as_deref(), Some("rgb(10, 20, 30)"));
        assert_eq!(colors[2].as_deref(), Some("teal"));
    }

    #[test]
    fn test_variables_take_precedence_over_rules() {
        let css = "--h1-color: #aaaaaa; .markdown-preview-view h2 { color: red; }";
        let colors = extract_heading_colors(css);
        assert_eq!(colors[0].as_deref(), Some("#aaaaaa"));
        assert!(colors[1].is_none());
    }

    #[test]
    fn test_extract_inline_title() {
        assert_eq!(
            extract_inline_title_color(".inline-title { color: #123456; }").as_deref(),
            Some("#123456")
        );
        assert_eq!(
            extract_inline_title_color(":root { --inline-title-color: navy; }").as_deref(),
            Some("navy")
        );
        assert!(extract_inline_title_color("h1 { color: red; }").is_none());
    }

    #[test]
    fn test_rgb_to_hex() {
        assert_eq!(rgb_to_hex("rgb(255, 0, 16)"), "#ff0010");
        assert_eq!(rgb_to_hex("rgba(1, 2, 3, 0.5)"), "#010203");
        assert_eq!(rgb_to_hex("red"), "red");
    }

    #[test]
    fn test_resolve_under_light_theme() {
        let mock = Arc::new(MockTheme::dark("--h1-color: var(--accent);"));
        mock.add_color("var(--accent)", "rgb(0, 0, 255)", "rgb(255, 255, 0)");
        let theme: Arc<dyn ThemeHost> = mock.clone();

        let palette = read_palette(&theme);
        assert_eq!(palette.heading(HeadingLevel::H1), Some("#0000ff"));
        assert!(mock.is_dark(), "dark theme restored after lookup");
    }

    #[test]
    fn test_import_defaults_missing_to_black() {
        let mut settings = RenderSettings::default();
        let mut palette = ThemePalette::default();
        palette.set_heading(HeadingLevel::H2, "#222222");

        import_theme_colors(&mut settings, &palette);
        assert_eq!(settings.heading(HeadingLevel::H1).color, DEFAULT_COLOR);
        assert_eq!(settings.heading(HeadingLevel::H2).color, "#222222");
        assert_eq!(settings.inline_title_color, DEFAULT_COLOR);
        assert!(settings.has_initialized_colors);
    }
}

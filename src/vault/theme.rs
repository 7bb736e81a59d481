//! Theme host backed by a CSS file
//!
//! Custom properties are collected per theme scope (`.theme-light`,
//! `.theme-dark`, and `body`/`:root` for both) so `var(--name)` references can
//! be resolved the way a browser would compute them under either theme.

use crate::config::StyleConfig;
use crate::error::FileResult;
use crate::file_handler::read_file_sync;
use crate::host::ThemeHost;
use regex::Regex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

/// Nested `var()` references followed before giving up
const MAX_VAR_DEPTH: usize = 8;

fn block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([^{}]+)\{([^{}]*)\}").expect("valid regex"))
}

fn property_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(--[\w-]+)\s*:\s*([^;]+)").expect("valid regex"))
}

fn var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^var\(\s*(--[\w-]+)\s*(?:,\s*(.+))?\)$").expect("valid regex")
    })
}

/// Computed form of the named colors themes commonly use
fn named_color(name: &str) -> Option<&'static str> {
    Some(match name.to_ascii_lowercase().as_str() {
        "black" => "rgb(0, 0, 0)",
        "white" => "rgb(255, 255, 255)",
        "red" => "rgb(255, 0, 0)",
        "green" => "rgb(0, 128, 0)",
        "blue" => "rgb(0, 0, 255)",
        "gray" | "grey" => "rgb(128, 128, 128)",
        "teal" => "rgb(0, 128, 128)",
        "navy" => "rgb(0, 0, 128)",
        "purple" => "rgb(128, 0, 128)",
        "orange" => "rgb(255, 165, 0)",
        _ => return None,
    })
}

#[derive(Debug, Default)]
struct Variables {
    shared: HashMap<String, String>,
    light: HashMap<String, String>,
    dark: HashMap<String, String>,
}

impl Variables {
    fn parse(css: &str) -> Self {
        let mut vars = Self::default();
        for block in block_re().captures_iter(css) {
            let selector = block[1].trim();
            let scope = if selector.contains(".theme-dark") {
                &mut vars.dark
            } else if selector.contains(".theme-light") {
                &mut vars.light
            } else if selector.contains("body") || selector.contains(":root") {
                &mut vars.shared
            } else {
                continue;
            };

            for property in property_re().captures_iter(&block[2]) {
                scope.insert(property[1].to_string(), property[2].trim().to_string());
            }
        }
        vars
    }

    fn lookup(&self, name: &str, dark: bool) -> Option<&String> {
        let themed = if dark { &self.dark } else { &self.light };
        themed.get(name).or_else(|| self.shared.get(name))
    }
}

/// Theme loaded from the configured theme stylesheet
pub struct CssTheme {
    css: Option<String>,
    variables: Variables,
    dark: AtomicBool,
}

impl CssTheme {
    pub fn new(css: Option<String>, dark: bool) -> Self {
        let variables = css.as_deref().map(Variables::parse).unwrap_or_default();
        Self {
            css,
            variables,
            dark: AtomicBool::new(dark),
        }
    }

    /// Load the theme named in the style configuration
    pub fn from_config(config: &StyleConfig) -> FileResult<Self> {
        let css = match &config.theme_css {
            Some(path) => {
                Some(read_file_sync(path)?.content).filter(|css| !css.trim().is_empty())
            }
            None => None,
        };
        Ok(Self::new(css, config.dark_mode))
    }

    fn resolve(&self, value: &str, depth: usize) -> Option<String> {
        let value = value.trim();
        if depth > MAX_VAR_DEPTH {
            log::warn!("Gave up resolving {} after {} references", value, MAX_VAR_DEPTH);
            return None;
        }

        if let Some(caps) = var_re().captures(value) {
            let dark = self.is_dark();
            return match self.variables.lookup(&caps[1], dark) {
                Some(next) => self.resolve(next, depth + 1),
                None => caps
                    .get(2)
                    .and_then(|fallback| self.resolve(fallback.as_str(), depth + 1)),
            };
        }

        if value.starts_with('#') || value.starts_with("rgb") {
            return Some(value.to_string());
        }
        named_color(value).map(str::to_string)
    }
}

impl ThemeHost for CssTheme {
    fn is_dark(&self) -> bool {
        self.dark.load(Ordering::SeqCst)
    }

    fn set_dark(&self, dark: bool) {
        self.dark.store(dark, Ordering::SeqCst);
    }

    fn theme_css(&self) -> Option<String> {
        self.css.clone()
    }

    fn computed_color(&self, value: &str) -> Option<String> {
        self.resolve(value, 0)
    }
}

//! Utilities module for Note Print
//!
//! Shared helper functions:
//! - Path utilities
//! - Text utilities

use std::path::{Path, PathBuf};

/// Path utilities
pub mod path {
    use super::*;

    /// Make a path relative to a base path
    pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
        path.strip_prefix(base).ok().map(|p| p.to_path_buf())
    }

    /// Vault-relative, `/`-separated form of `path`
    ///
    /// Paths outside the vault keep their full form.
    pub fn vault_path(path: &Path, vault: &Path) -> String {
        match relative_to(path, vault) {
            Some(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            None => path.to_string_lossy().into_owned(),
        }
    }

    /// Expand tilde to home directory
    pub fn expand_tilde(path: &Path) -> PathBuf {
        if let Ok(stripped) = path.strip_prefix("~") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        path.to_path_buf()
    }
}

/// Text utilities
pub mod text {
    /// Inclusive 1-based line range, parsed from `start:end`, `start:` or `line`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LineRange {
        pub start: usize,
        pub end: Option<usize>,
    }

    impl std::str::FromStr for LineRange {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let number = |part: &str| {
                part.trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| format!("invalid line number {:?}", part))
            };

            let (start, end) = match s.split_once(':') {
                Some((start, "")) => (number(start)?, None),
                Some((start, end)) => (number(start)?, Some(number(end)?)),
                None => {
                    let line = number(s)?;
                    (line, Some(line))
                }
            };
            if end.is_some_and(|end| end < start) {
                return Err(format!("line range {} ends before it starts", s));
            }
            Ok(Self { start, end })
        }
    }

    /// Lines of `text` inside `range`, joined with `\n`
    pub fn slice_lines(text: &str, range: LineRange) -> String {
        let take = range
            .end
            .map(|end| end + 1 - range.start)
            .unwrap_or(usize::MAX);
        text.lines()
            .skip(range.start - 1)
            .take(take)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

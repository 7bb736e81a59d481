//! Front matter parsing
//!
//! A note may start with a YAML block delimited by `---` lines. The block is
//! split off before rendering and parsed into an ordered mapping.

use crate::host::Frontmatter;
use serde_yaml::Value;

const OPEN_FENCE: &str = "---";
const CLOSE_FENCES: [&str; 2] = ["---", "..."];

/// Split a note into its raw front matter block and the remaining body
///
/// Returns `None` for the block when the note does not open with a fence or
/// the fence is never closed.
pub fn split(text: &str) -> (Option<&str>, &str) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(first_break) = text.find('\n') else {
        return (None, text);
    };
    if text[..first_break].trim_end() != OPEN_FENCE {
        return (None, text);
    }

    let yaml_start = first_break + 1;
    let mut offset = yaml_start;
    for line in text[yaml_start..].split_inclusive('\n') {
        let trimmed = line.trim_end();
        if CLOSE_FENCES.contains(&trimmed) {
            let yaml = &text[yaml_start..offset];
            let body = &text[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }
    (None, text)
}

/// Parse the front matter of a note, if it has a non-empty mapping
pub fn parse(text: &str) -> Option<Frontmatter> {
    let (yaml, _) = split(text);
    let yaml = yaml?;
    if yaml.trim().is_empty() {
        return None;
    }

    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(mapping)) if !mapping.is_empty() => Some(mapping),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Ignoring malformed front matter: {}", e);
            None
        }
    }
}

/// Note body without its front matter block
pub fn strip(text: &str) -> &str {
    split(text).1
}

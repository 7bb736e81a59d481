//! Metadata block
//!
//! Renders front matter as a plain `key: value` listing placed at the top of
//! printed content.

use crate::dom::Element;
use crate::host::Frontmatter;
use serde_yaml::Value;

/// Class of the metadata block root
pub const CONTAINER_CLASS: &str = "custom-metadata-container";

/// Class of the element holding the metadata lines
pub const CONTENT_CLASS: &str = "custom-metadata-content";

/// Build the metadata block; `None` when there is nothing to show
pub fn metadata_block(frontmatter: &Frontmatter) -> Option<Element> {
    if frontmatter.is_empty() {
        return None;
    }

    let mut content = Element::with_class("div", CONTENT_CLASS);
    for (key, value) in frontmatter {
        let line = format!("{}: {}", display_value(key), display_value(value));
        content.push(Element::new("div").with_text(line));
    }

    let mut container = Element::with_class("div", CONTAINER_CLASS);
    container.push(content);
    Some(container)
}

/// Flatten a front matter value to one line of text
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Mapping(_) => serde_json::to_string(value)
            .or_else(|_| serde_yaml::to_string(value).map(|s| s.trim().to_string()))
            .unwrap_or_default(),
        Value::Tagged(tagged) => display_value(&tagged.value),
    }
}

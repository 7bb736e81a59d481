//! Detached HTML trees
//!
//! Every fragment the printer handles (rendered notes, captured snapshots,
//! preview overlays) is an owned tree of [`Node`]s. Nothing here shares
//! structure with a live surface: cloning an [`Element`] is always a deep copy.
//!
//! Parsing goes through `scraper`; serialization follows the html5ever
//! serializer's escaping rules so a serialized tree re-parses to the same
//! markup.

use scraper::Html;

/// Elements that never have children or closing tags
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text content is written verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// A node in a detached HTML tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    /// Create a text node
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Whether this is a text node containing only whitespace
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.trim().is_empty())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Element(e) => {
                for child in &e.children {
                    child.collect_text(out);
                }
            }
            Node::Text(t) => out.push_str(t),
            Node::Comment(_) => {}
        }
    }

    /// Serialize this node
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out, false);
        out
    }

    fn write_html(&self, out: &mut String, raw_text: bool) {
        match self {
            Node::Element(e) => e.write_html(out),
            Node::Text(t) if raw_text => out.push_str(t),
            Node::Text(t) => escape_text(t, out),
            Node::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// An owned HTML element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an empty element carrying one or more space-separated classes
    pub fn with_class(tag: impl Into<String>, class: &str) -> Self {
        let mut element = Self::new(tag);
        element.set_attr("class", class);
        element
    }

    /// Builder-style text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::text(text));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr("class", joined);
    }

    /// Append a child node
    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    /// Insert a child node before the first child
    pub fn prepend(&mut self, node: impl Into<Node>) {
        self.children.insert(0, node.into());
    }

    /// Append a text child
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::text(text));
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// First descendant (excluding self) carrying `class`, depth-first
    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        for child in self.child_elements() {
            if child.has_class(class) {
                return Some(child);
            }
            if let Some(found) = child.find_by_class(class) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants (excluding self) with the given tag name, in document order
    pub fn find_all(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_tag(tag, &mut found);
        found
    }

    fn collect_tag<'a>(&'a self, tag: &str, found: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.tag == tag {
                found.push(child);
            }
            child.collect_tag(tag, found);
        }
    }

    /// Visit every descendant element (excluding self), depth-first
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        for child in self.children.iter_mut().filter_map(Node::as_element_mut) {
            f(child);
            child.walk_mut(f);
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Serialize the element including its own tag
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Serialize only the children
    pub fn inner_html(&self) -> String {
        let raw = RAW_TEXT_ELEMENTS.contains(&self.tag.as_str());
        let mut out = String::new();
        for child in &self.children {
            child.write_html(&mut out, raw);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_attr(value, out);
            out.push('"');
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }
        out.push_str(&self.inner_html());
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// Parse an HTML fragment into detached nodes
pub fn parse_fragment(html: &str) -> Vec<Node> {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .children()
        .filter_map(convert)
        .collect()
}

fn convert(node: ego_tree::NodeRef<'_, scraper::Node>) -> Option<Node> {
    match node.value() {
        scraper::Node::Element(element) => {
            let mut out = Element::new(element.name());
            out.attrs = element
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            out.children = node.children().filter_map(convert).collect();
            Some(Node::Element(out))
        }
        scraper::Node::Text(text) => Some(Node::Text(text.text.to_string())),
        scraper::Node::Comment(comment) => Some(Node::Comment(comment.comment.to_string())),
        _ => None,
    }
}

/// Escape text content the way html5ever does
pub fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

/// Escape an attribute value the way html5ever does
pub fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

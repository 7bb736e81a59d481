//! Print font stacks
//!
//! Static table shared by the configuration layer and the CLI listing.

/// One selectable font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontOption {
    pub key: &'static str,
    pub label: &'static str,
    pub css: &'static str,
}

pub const FONT_OPTIONS: &[FontOption] = &[
    FontOption {
        key: "system",
        label: "System Default",
        css: "var(--print-font-family, -apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, \"Helvetica Neue\", Arial, \"Noto Sans\", sans-serif)",
    },
    FontOption {
        key: "sans-serif",
        label: "Sans-serif Generic",
        css: "sans-serif",
    },
    FontOption {
        key: "arial",
        label: "Arial",
        css: "Arial, \"Helvetica Neue\", Helvetica, \"Liberation Sans\", sans-serif",
    },
    FontOption {
        key: "helvetica",
        label: "Helvetica",
        css: "\"Helvetica Neue\", Helvetica, Arial, \"Liberation Sans\", sans-serif",
    },
    FontOption {
        key: "roboto",
        label: "Roboto",
        css: "Roboto, \"Segoe UI\", -apple-system, BlinkMacSystemFont, \"Helvetica Neue\", Arial, sans-serif",
    },
    FontOption {
        key: "ubuntu",
        label: "Ubuntu",
        css: "Ubuntu, \"Liberation Sans\", \"DejaVu Sans\", Arial, sans-serif",
    },
    FontOption {
        key: "serif",
        label: "Serif Generic",
        css: "serif",
    },
    FontOption {
        key: "times",
        label: "Times New Roman",
        css: "\"Times New Roman\", Times, \"Liberation Serif\", \"DejaVu Serif\", serif",
    },
    FontOption {
        key: "georgia",
        label: "Georgia",
        css: "Georgia, \"Times New Roman\", Times, \"Liberation Serif\", serif",
    },
    FontOption {
        key: "garamond",
        label: "Garamond",
        css: "Garamond, \"EB Garamond\", \"Times New Roman\", serif",
    },
    FontOption {
        key: "palatino",
        label: "Palatino",
        css: "\"Palatino Linotype\", Palatino, \"Book Antiqua\", \"URW Palladio L\", serif",
    },
    FontOption {
        key: "monospace",
        label: "Monospace Generic",
        css: "monospace",
    },
    FontOption {
        key: "courier",
        label: "Courier New",
        css: "\"Courier New\", Courier, \"Liberation Mono\", \"DejaVu Sans Mono\", monospace",
    },
    FontOption {
        key: "firacode",
        label: "Fira Code",
        css: "\"Fira Code\", \"Source Code Pro\", Consolas, \"Liberation Mono\", monospace",
    },
    FontOption {
        key: "verdana",
        label: "Verdana",
        css: "Verdana, \"DejaVu Sans\", \"Liberation Sans\", sans-serif",
    },
];

/// Look up a font stack by its key (case-insensitive)
pub fn resolve(key: &str) -> Option<&'static str> {
    let key = key.trim();
    FONT_OPTIONS
        .iter()
        .find(|opt| opt.key.eq_ignore_ascii_case(key))
        .map(|opt| opt.css)
}

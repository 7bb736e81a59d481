//! Standalone print documents
//!
//! A print job becomes one self-contained HTML file: inline stylesheet, a
//! printer favicon and a script that opens the print dialog once loaded.

use crate::capture::PREVIEW_VIEW_CLASS;
use crate::dom::escape_text;
use crate::output::PrintJob;
use crate::style::ROOT_CLASS;

/// Title prefix marking documents captured from the live preview
pub const ADVANCED_MARKER: &str = "⚡";

const FAVICON: &str = "<link rel=\"icon\" href=\"data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>🖨️</text></svg>\">";

const PRINT_SCRIPT: &str = "<script>
window.onload = function() {
    setTimeout(function() {
        window.print();
    }, 100);
};
</script>";

/// Document title for a job
pub fn document_title(job: &PrintJob) -> String {
    if job.advanced {
        format!("{} {}", ADVANCED_MARKER, job.label)
    } else {
        job.label.clone()
    }
}

/// Keep stylesheet text from closing its `<style>` element early
fn guard_style_text(css: &str) -> String {
    css.replace("</style", "<\\/style")
}

/// Build the standalone HTML document for a job
///
/// The fragment is placed inside the wrapper with no surrounding whitespace
/// so the wrapper's inner markup is exactly the fragment.
pub fn standalone_document(job: &PrintJob) -> String {
    let mut title = String::new();
    escape_text(&document_title(job), &mut title);

    format!(
        "<!DOCTYPE html>
<html>
<head>
<meta charset=\"UTF-8\">
<title>{title}</title>
{favicon}
<style>{css}</style>
{script}
</head>
<body>
<div class=\"{root} {view}\">{content}</div>
</body>
</html>
",
        title = title,
        favicon = FAVICON,
        css = guard_style_text(job.stylesheet.as_str()),
        script = PRINT_SCRIPT,
        root = ROOT_CLASS,
        view = PREVIEW_VIEW_CLASS,
        content = job.fragment.to_html(),
    )
}

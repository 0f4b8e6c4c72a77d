//! Preview composition: folds the project's CSS and JS into its HTML page.

use crate::project::{FileStore, INDEX_HTML, SCRIPT_JS, STYLE_CSS};

pub mod server;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewDocument {
    pub revision: u64,
    pub html: String,
}

impl PreviewDocument {
    pub fn from_store(files: &FileStore, revision: u64) -> Self {
        Self {
            revision,
            html: compose_store(files),
        }
    }
}

pub fn compose_store(files: &FileStore) -> String {
    compose(
        files.get_or_empty(INDEX_HTML),
        files.get_or_empty(STYLE_CSS),
        files.get_or_empty(SCRIPT_JS),
    )
}

/// Inserts `<style>{css}</style>` before the first `</head>` and
/// `<script>{js}</script>` before the first `</body>`.
///
/// Both positions come from the original markup, so neither block can land
/// inside the other. Without `</head>` the style goes before `<body` (or at
/// the very start); without `</body>` the script is appended.
pub fn compose(html: &str, css: &str, js: &str) -> String {
    let style = format!("<style>{css}</style>");
    let script = format!("<script>{js}</script>");

    let style_at = find_ascii_ci(html, "</head>")
        .or_else(|| find_ascii_ci(html, "<body"))
        .unwrap_or(0);
    let script_at = find_ascii_ci(html, "</body>").unwrap_or(html.len());

    let mut out = String::with_capacity(html.len() + style.len() + script.len());
    if style_at <= script_at {
        out.push_str(&html[..style_at]);
        out.push_str(&style);
        out.push_str(&html[style_at..script_at]);
        out.push_str(&script);
        out.push_str(&html[script_at..]);
    } else {
        out.push_str(&html[..script_at]);
        out.push_str(&script);
        out.push_str(&html[script_at..style_at]);
        out.push_str(&style);
        out.push_str(&html[style_at..]);
    }
    out
}

fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn body_only_document_gets_both_blocks() {
        let mut files = FileStore::new();
        files.set(INDEX_HTML, "<body></body>");
        files.set(STYLE_CSS, "a{}");
        files.set(SCRIPT_JS, "");

        assert_eq!(
            compose_store(&files),
            "<style>a{}</style><body><script></script></body>"
        );
    }

    #[test]
    fn blocks_land_before_closing_tags() {
        let html = "<html><head><title>t</title></head><body><p>x</p></body></html>";
        let out = compose(html, "p{color:red}", "console.log(1)");
        assert_eq!(
            out,
            "<html><head><title>t</title><style>p{color:red}</style></head>\
             <body><p>x</p><script>console.log(1)</script></body></html>"
        );
    }

    #[test]
    fn empty_assets_still_inject_exactly_one_block_each() {
        let out = compose_store(&FileStore::starter());
        assert_eq!(count(&out, "<style>"), 1);
        assert_eq!(count(&out, "<script>"), 1);

        let out = compose("<head></head><body></body>", "", "");
        assert_eq!(out, "<head><style></style></head><body><script></script></body>");
    }

    #[test]
    fn asset_content_cannot_move_the_other_block() {
        let out = compose("<head></head><body></body>", "</body>", "</head>");
        assert_eq!(
            out,
            "<head><style></body></style></head><body><script></head></script></body>"
        );
    }

    #[test]
    fn tag_search_ignores_case_and_uses_first_occurrence() {
        let out = compose("<HEAD></HEAD><BODY>a</BODY>b</body>", "c", "j");
        assert_eq!(out, "<HEAD><style>c</style></HEAD><BODY>a<script>j</script></BODY>b</body>");
    }

    #[test]
    fn missing_tags_fall_back_to_document_edges() {
        assert_eq!(compose("<p>hi</p>", "c", "j"), "<style>c</style><p>hi</p><script>j</script>");
        assert_eq!(
            compose("<body>x", "c", "j"),
            "<style>c</style><body>x<script>j</script>"
        );
    }

    #[test]
    fn missing_files_compose_as_blank() {
        let out = compose_store(&FileStore::new());
        assert_eq!(out, "<style></style><script></script>");
    }
}

//! Idempotent insertion of the Ruffle loader into HTML text.
//!
//! A page needs exactly one loader reference. Documents that already carry
//! one (in any letter case) are left untouched, so a sweep can be re-run
//! over the same tree without stacking duplicates.

use std::sync::OnceLock;

use regex::Regex;

/// Loader fragment spliced into each unpatched document.
///
/// Ruffle's polyfill replaces `<object>`/`<embed>` SWF content with its own
/// player once the script is loaded from the CDN, so no other markup change
/// is needed.
pub const RUFFLE_SCRIPT: &str =
    r#"<script src="https://unpkg.com/@ruffle-rs/ruffle"></script>"#;

/// Substrings identifying an existing loader reference, matched
/// case-insensitively against the document text.
const MARKERS: [&str; 2] = ["@ruffle-rs/ruffle", "ruffle.js"];

/// Outcome of an injection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchResult {
    /// The document already references the loader, or insertion produced
    /// identical text.
    Unchanged,
    /// New document text with the loader inserted exactly once.
    Patched(String),
}

fn head_close() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</head\s*>").unwrap())
}

fn body_close() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</body\s*>").unwrap())
}

/// Check whether the document already references the loader.
pub fn already_patched(html: &str) -> bool {
    let low = html.to_ascii_lowercase();
    MARKERS.iter().any(|marker| low.contains(marker))
}

/// Insert the loader fragment before the first `</head>`, else before the
/// first `</body>`, else at the very start of the document.
///
/// Surrounding content is not modified; the fragment is spliced in with a
/// newline on each side (or a single trailing newline when prepended).
pub fn inject(html: &str) -> PatchResult {
    if already_patched(html) {
        return PatchResult::Unchanged;
    }

    let anchor = head_close()
        .find(html)
        .or_else(|| body_close().find(html))
        .map(|m| m.start());

    let patched = match anchor {
        Some(at) => format!("{}\n{}\n{}", &html[..at], RUFFLE_SCRIPT, &html[at..]),
        None => format!("{}\n{}", RUFFLE_SCRIPT, html),
    };

    if patched == html {
        PatchResult::Unchanged
    } else {
        PatchResult::Patched(patched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patched_text(html: &str) -> String {
        match inject(html) {
            PatchResult::Patched(text) => text,
            PatchResult::Unchanged => panic!("expected a patch for {:?}", html),
        }
    }

    #[test]
    fn test_inserts_before_head_close() {
        let html = "<html><head><title>x</title></head><body>y</body></html>";
        let text = patched_text(html);
        let expected = format!(
            "<html><head><title>x</title>\n{}\n</head><body>y</body></html>",
            RUFFLE_SCRIPT
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_head_close_beats_body_close() {
        let html = "<head></head><body></body>";
        let text = patched_text(html);
        assert!(text.find(RUFFLE_SCRIPT).unwrap() < text.find("</head>").unwrap());
        assert_eq!(text.matches(RUFFLE_SCRIPT).count(), 1);
    }

    #[test]
    fn test_falls_back_to_body_close() {
        let html = "<body>content</body>";
        let text = patched_text(html);
        let expected = format!("<body>content\n{}\n</body>", RUFFLE_SCRIPT);
        assert_eq!(text, expected);
    }

    #[test]
    fn test_prepends_without_anchor() {
        let html = "no structure here";
        let text = patched_text(html);
        let expected = format!("{}\n{}", RUFFLE_SCRIPT, html);
        assert_eq!(text, expected);

        // Stripping the fragment off the front reconstructs the original.
        let rest = text
            .strip_prefix(RUFFLE_SCRIPT)
            .and_then(|rest| rest.strip_prefix('\n'))
            .unwrap();
        assert_eq!(rest, html);
    }

    #[test]
    fn test_empty_document() {
        let text = patched_text("");
        assert_eq!(text, format!("{}\n", RUFFLE_SCRIPT));
    }

    #[test]
    fn test_tag_match_is_case_insensitive() {
        let text = patched_text("<HEAD></HEAD>");
        assert!(text.contains(RUFFLE_SCRIPT));
        assert!(text.ends_with("</HEAD>"));
    }

    #[test]
    fn test_tag_match_tolerates_whitespace() {
        let html = "<head></head >";
        let text = patched_text(html);
        assert_eq!(text, format!("<head>\n{}\n</head >", RUFFLE_SCRIPT));
    }

    #[test]
    fn test_only_first_head_close_is_used() {
        let html = "<head></head><head></head>";
        let text = patched_text(html);
        let expected = format!("<head>\n{}\n</head><head></head>", RUFFLE_SCRIPT);
        assert_eq!(text, expected);
    }

    #[test]
    fn test_marker_detection_is_case_insensitive() {
        assert_eq!(inject("<head>RUFFLE.JS</head>"), PatchResult::Unchanged);
        assert_eq!(
            inject("<script src=\"https://unpkg.com/@Ruffle-RS/Ruffle\"></script>"),
            PatchResult::Unchanged
        );
    }

    #[test]
    fn test_filename_marker_guards() {
        let html = "<head><script src=\"local/ruffle.js\"></script></head>";
        assert_eq!(inject(html), PatchResult::Unchanged);
    }

    #[test]
    fn test_inject_is_idempotent() {
        for html in [
            "<html><head></head><body></body></html>",
            "<body>only</body>",
            "bare text",
            "",
        ] {
            let once = patched_text(html);
            assert_eq!(inject(&once), PatchResult::Unchanged);
        }
    }
}

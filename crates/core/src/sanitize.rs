use std::fmt::Write;
use unicode_normalization::UnicodeNormalization;

// Smart punctuation that survives NFKC and would otherwise turn into opaque
// escape sequences. NBSP and ellipsis are also folded by NFKC on most inputs;
// keeping them here makes the table the single place to look.
const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2014}', "-"),   // em dash
    ('\u{2013}', "-"),   // en dash
    ('\u{2018}', "'"),   // left single quote
    ('\u{2019}', "'"),   // right single quote
    ('\u{201C}', "\""),  // left double quote
    ('\u{201D}', "\""),  // right double quote
    ('\u{2026}', "..."), // ellipsis
    ('\u{00A0}', " "),   // non-breaking space
];

/// Normalize arbitrary text to a pure-ASCII string.
///
/// NFKC first, then the fixed punctuation table, then a final guard that
/// renders any remaining non-ASCII scalar as a visible backslash escape
/// instead of dropping it or failing. Idempotent: the output contains no
/// character the earlier passes would rewrite.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfkc() {
        if let Some((_, replacement)) = REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            out.push_str(replacement);
        } else if c.is_ascii() {
            out.push(c);
        } else {
            push_escape(&mut out, c);
        }
    }
    out
}

fn push_escape(out: &mut String, c: char) {
    let cp = c as u32;
    if cp <= 0xFF {
        let _ = write!(out, "\\x{cp:02x}");
    } else if cp <= 0xFFFF {
        let _ = write!(out, "\\u{cp:04x}");
    } else {
        let _ = write!(out, "\\U{cp:08x}");
    }
}

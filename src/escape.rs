//! Reversible placeholder tokens for markup-significant characters
//!
//! Passes that must keep a character away from later passes (emphasis
//! inside URLs, brackets inside code, backslash escapes) swap it for a
//! token drawn from a fixed table. [`restore`] swaps every token back and
//! runs exactly once, at the end of a conversion.
//!
//! Tokens are `SENTINEL + digest + SENTINEL`. The sentinel is stripped from
//! input during normalization, so a token can never appear in author text.

use std::sync::LazyLock;

/// Delimiter for every placeholder the engine emits (U+001A SUBSTITUTE)
pub const SENTINEL: char = '\u{1A}';

/// Characters that carry meaning in Markdown and can be backslash-escaped
pub const ESCAPABLE_CHARS: &str = "\\`*_{}[]()>#+-.!";

/// Text emitted in place of HTML when safe mode is on
pub const HTML_REMOVED_TEXT: &str = "[HTML_REMOVED]";

static ESCAPE_TABLE: LazyLock<Vec<(char, String)>> = LazyLock::new(|| {
    ESCAPABLE_CHARS
        .chars()
        .map(|ch| {
            let mut buf = [0u8; 4];
            (ch, placeholder_for(ch.encode_utf8(&mut buf)))
        })
        .collect()
});

static HTML_REMOVED_MARKER: LazyLock<String> = LazyLock::new(|| {
    format!("{}HTML{}REMOVED{}", protect('['), protect('_'), protect(']'))
});

/// Build a placeholder key derived from `content`.
///
/// Used for the escape table and for every hash-and-restore store
/// (HTML blocks, code spans, link patterns).
pub fn placeholder_for(content: &str) -> String {
    token_from(blake3::hash(content.as_bytes()))
}

/// Key for author HTML. Derived in its own blake3 context so it never
/// equals the key of generated markup with the same text.
pub fn raw_placeholder_for(content: &str) -> String {
    let mut hasher = blake3::Hasher::new_derive_key("mdpress 2024 raw html block");
    hasher.update(content.as_bytes());
    token_from(hasher.finalize())
}

fn token_from(digest: blake3::Hash) -> String {
    format!("{SENTINEL}{}{SENTINEL}", &digest.to_hex().as_str()[..32])
}

/// Token standing in for `ch`.
///
/// Characters outside [`ESCAPABLE_CHARS`] have no token and map to the
/// empty string; callers only pass table characters.
pub fn protect(ch: char) -> &'static str {
    ESCAPE_TABLE
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, token)| token.as_str())
        .unwrap_or("")
}

/// Safe-mode replacement text, pre-protected against link and emphasis passes
pub fn html_removed_marker() -> &'static str {
    HTML_REMOVED_MARKER.as_str()
}

/// Swap every escape token back to its character
pub fn restore(text: &str) -> String {
    if !text.contains(SENTINEL) {
        return text.to_string();
    }
    let mut out = text.to_string();
    for (ch, token) in ESCAPE_TABLE.iter() {
        if out.contains(token.as_str()) {
            out = out.replace(token.as_str(), ch.encode_utf8(&mut [0u8; 4]));
        }
    }
    out
}

/// Replace `\X` with the token for `X`, scanning left to right so that
/// `\\` is consumed before the character that follows it.
pub fn encode_backslash_escapes(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\'
            && let Some(&next) = chars.peek()
            && ESCAPABLE_CHARS.contains(next)
        {
            out.push_str(protect(next));
            chars.next();
            continue;
        }
        out.push(ch);
    }
    out
}

/// Hide `*` and `_` from the emphasis passes
pub fn protect_emphasis(text: &str) -> String {
    text.replace('*', protect('*')).replace('_', protect('_'))
}

/// Escape the contents of a code span or code block.
///
/// Entities are not honoured inside code, so every `&` is encoded, then
/// angle brackets, then the characters the span passes react to.
pub fn encode_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '*' | '_' | '{' | '}' | '[' | ']' | '\\' => out.push_str(protect(ch)),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_distinct_and_delimited() {
        let mut seen = std::collections::HashSet::new();
        for ch in ESCAPABLE_CHARS.chars() {
            let token = protect(ch);
            assert!(token.starts_with(SENTINEL));
            assert!(token.ends_with(SENTINEL));
            assert_eq!(token.chars().count(), 34);
            assert!(seen.insert(token), "duplicate token for {ch:?}");
        }
    }

    #[test]
    fn test_protect_is_stable() {
        assert_eq!(protect('*'), protect('*'));
        assert_ne!(protect('*'), protect('_'));
        assert_eq!(protect('a'), "");
    }

    #[test]
    fn test_raw_keys_differ_from_generated_keys() {
        let raw = raw_placeholder_for("<hr />");
        assert_ne!(raw, placeholder_for("<hr />"));
        assert_eq!(raw, raw_placeholder_for("<hr />"));
        assert_eq!(raw.chars().count(), 34);
    }

    #[test]
    fn test_backslash_escapes_round_trip() {
        let encoded = encode_backslash_escapes(r"\*not emphasis\* and \[brackets\]");
        assert!(!encoded.contains('*'));
        assert!(!encoded.contains('['));
        assert_eq!(restore(&encoded), "*not emphasis* and [brackets]");
    }

    #[test]
    fn test_double_backslash_consumed_first() {
        let encoded = encode_backslash_escapes(r"\\*");
        assert!(encoded.ends_with('*'));
        assert_eq!(restore(&encoded), r"\*");
    }

    #[test]
    fn test_non_escapable_backslash_kept() {
        assert_eq!(encode_backslash_escapes(r"C:\path"), r"C:\path");
    }

    #[test]
    fn test_encode_code() {
        let encoded = encode_code("a < b && *c*");
        assert!(encoded.starts_with("a &lt; b &amp;&amp; "));
        assert_eq!(restore(&encoded), "a &lt; b &amp;&amp; *c*");
    }

    #[test]
    fn test_html_removed_marker_restores_to_text() {
        let marker = html_removed_marker();
        assert!(!marker.contains('_'));
        assert_eq!(restore(marker), HTML_REMOVED_TEXT);
    }
}

//! Link, image and footnote-reference resolution
//!
//! A left-to-right cursor scan rather than one big pattern: link text may
//! hold balanced brackets, the tail decides between five readings, and an
//! anchor may wrap an image but never another anchor.

use crate::context::ConversionContext;
use crate::converter::Markdown;
use crate::escape::protect_emphasis;
use crate::options::Extra;
use crate::references::normalize_footnote_id;

/// Link text longer than this is not treated as a link
const MAX_LINK_TEXT_SENTINEL: usize = 300;

/// `(url)` or `(url "title")`, the url optionally in angle brackets.
/// Named groups only: fancy-regex rejects numbered backreferences once a
/// group is named.
pub(crate) const INLINE_LINK_TAIL: &str =
    r#"(?s)\A\([ \t]*(?P<url><.*?>|.*?)[ \t]*(?:(?P<quote>['"])(?P<title>.*?)(?P=quote))?\)"#;

/// `[id]`, optionally after one space or one newline plus indentation
pub(crate) const REFERENCE_LINK_TAIL: &str = r"(?s)\A[ ]?(?:\n[ ]*)?\[(?P<id>.*?)\]";

/// Position of the `]` closing the `[` at `start`, within the sentinel span
fn closing_bracket(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, ch) in text[start + 1..].char_indices().take(MAX_LINK_TEXT_SENTINEL - 1) {
        match ch {
            ']' if depth == 0 => return Some(start + 1 + offset),
            ']' => depth -= 1,
            '[' => depth += 1,
            _ => {}
        }
    }
    None
}

fn title_attr(title: Option<&str>) -> String {
    match title {
        Some(title) if !title.is_empty() => format!(" title=\"{}\"", protect_emphasis(title)),
        _ => String::new(),
    }
}

/// What a matched tail resolved to
struct Target {
    url: String,
    title_str: String,
    /// Byte offset just past the tail
    end: usize,
}

impl Markdown {
    pub(crate) fn do_links(&self, ctx: &mut ConversionContext, text: &str) -> String {
        if !text.contains('[') {
            return text.to_string();
        }

        let footnotes = self.options.has_extra(Extra::Footnotes);
        let suffix = self.options.empty_element_suffix();
        let mut text = text.to_string();
        // anchors may start here or later; images anywhere from the cursor
        let mut anchor_allowed_pos = 0;
        let mut curr_pos = 0;

        loop {
            let Some(found) = text[curr_pos..].find('[') else {
                break;
            };
            let mut start_idx = curr_pos + found;

            let Some(close_idx) = closing_bracket(&text, start_idx) else {
                curr_pos = start_idx + 1;
                continue;
            };
            let link_text = text[start_idx + 1..close_idx].to_string();

            if footnotes && let Some(id) = link_text.strip_prefix('^') {
                let normed_id = normalize_footnote_id(id);
                if ctx.footnotes.contains_key(&normed_id) {
                    let number = ctx.footnote_number(&normed_id);
                    let result = format!(
                        "<sup class=\"footnote-ref\" id=\"fnref-{normed_id}\"><a href=\"#fn-{normed_id}\">{number}</a></sup>"
                    );
                    text.replace_range(start_idx..close_idx + 1, &result);
                    curr_pos = start_idx + result.len();
                } else {
                    log::debug!("Footnote reference [^{id}] has no definition");
                    curr_pos = close_idx + 1;
                }
                continue;
            }

            let p = close_idx + 1;
            if p == text.len() {
                break;
            }

            let target = if text[p..].starts_with('(') {
                match self.inline_target(&text, p) {
                    Some(target) => target,
                    None => {
                        curr_pos = start_idx + 1;
                        continue;
                    }
                }
            } else {
                let Ok(Some(caps)) = self.patterns.reference_link_tail.captures(&text[p..]) else {
                    curr_pos = start_idx + 1;
                    continue;
                };
                let end = p + caps.get(0).map_or(0, |m| m.end());
                let mut link_id = caps.name("id").map_or("", |m| m.as_str()).to_lowercase();
                if link_id.is_empty() {
                    link_id = link_text.to_lowercase();
                }
                let Some(reference) = ctx.references.get(&link_id) else {
                    curr_pos = end;
                    continue;
                };
                Target {
                    url: protect_emphasis(&reference.url),
                    title_str: title_attr(reference.title.as_deref()),
                    end,
                }
            };

            let is_img = start_idx > 0 && text.as_bytes()[start_idx - 1] == b'!';
            if is_img {
                start_idx -= 1;
                let result = format!(
                    "<img src=\"{}\" alt=\"{}\"{}{suffix}",
                    target.url,
                    link_text.replace('"', "&quot;"),
                    target.title_str
                );
                text.replace_range(start_idx..target.end, &result);
                curr_pos = start_idx + result.len();
            } else if start_idx >= anchor_allowed_pos {
                let result_head = format!("<a href=\"{}\"{}>", target.url, target.title_str);
                let result = format!("{result_head}{link_text}</a>");
                text.replace_range(start_idx..target.end, &result);
                // images may follow inside the anchor text, anchors may not
                curr_pos = start_idx + result_head.len();
                anchor_allowed_pos = start_idx + result.len();
            } else {
                curr_pos = start_idx + 1;
            }
        }

        text
    }

    /// Parse `(url "title")` starting at byte `p`
    fn inline_target(&self, text: &str, p: usize) -> Option<Target> {
        let Ok(Some(caps)) = self.patterns.inline_link_tail.captures(&text[p..]) else {
            return None;
        };
        let end = p + caps.get(0)?.end();
        let mut url = caps.name("url").map_or("", |m| m.as_str());
        if let Some(inner) = url.strip_prefix('<').and_then(|u| u.strip_suffix('>')) {
            url = inner;
        }
        let title = caps.name("title").map(|m| m.as_str().replace('"', "&quot;"));
        Some(Target {
            url: protect_emphasis(url),
            title_str: title_attr(title.as_deref()),
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closing_bracket_balances_nested() {
        let text = "[a [b] c](/u)";
        assert_eq!(closing_bracket(text, 0), Some(8));
        assert_eq!(closing_bracket(text, 3), Some(5));
    }

    #[test]
    fn test_closing_bracket_unmatched() {
        assert_eq!(closing_bracket("[a [b c", 0), None);
    }

    #[test]
    fn test_closing_bracket_sentinel_span() {
        let near = format!("[{}]", "x".repeat(MAX_LINK_TEXT_SENTINEL - 2));
        assert!(closing_bracket(&near, 0).is_some());
        let far = format!("[{}]", "x".repeat(MAX_LINK_TEXT_SENTINEL));
        assert_eq!(closing_bracket(&far, 0), None);
    }

    #[test]
    fn test_title_attr() {
        assert_eq!(title_attr(None), "");
        assert_eq!(title_attr(Some("")), "");
        assert_eq!(title_attr(Some("T")), " title=\"T\"");
    }
}

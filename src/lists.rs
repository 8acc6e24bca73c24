//! Ordered and unordered lists
//!
//! Whole lists are found first, then split into items. Top-level lists
//! must start the document or follow a blank line; once inside a list any
//! line may open a sub-list, so that
//!
//! ```text
//! I recommend upgrading to version
//! 8. Oops, this is not a list.
//! ```
//!
//! stays one paragraph at the top level.

use crate::context::ConversionContext;
use crate::converter::Markdown;
use crate::utils::{is_line_start, newline_run, outdent};

/// Length of a list marker (`*`, `+`, `-` or `digits.`) at `pos`
fn marker_len(text: &str, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes().get(pos..)?;
    match bytes.first()? {
        b'*' | b'+' | b'-' => Some(1),
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            (bytes.get(digits) == Some(&b'.')).then_some(digits + 1)
        }
        _ => None,
    }
}

/// Number of spaces and tabs at `pos`
fn blanks_at(text: &str, pos: usize) -> usize {
    text.as_bytes()
        .get(pos..)
        .map_or(0, |bytes| bytes.iter().take_while(|&&b| b == b' ' || b == b'\t').count())
}

/// Marker followed by at least one space or tab
fn starts_item(text: &str, pos: usize) -> bool {
    marker_len(text, pos).is_some_and(|len| blanks_at(text, pos + len) > 0)
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..].chars().next().map_or(pos, |ch| pos + ch.len_utf8())
}

/// A whole list starting at `start`
struct ListMatch {
    end: usize,
    ordered: bool,
}

/// One item inside a list string
struct ItemMatch {
    content_start: usize,
    /// Offset of the newline run that ends the item
    content_end: usize,
    /// Newlines owned by the item, one or two
    eols: usize,
}

impl ItemMatch {
    fn end(&self) -> usize {
        self.content_end + self.eols
    }
}

impl Markdown {
    pub(crate) fn do_lists(&self, ctx: &mut ConversionContext, text: &str) -> String {
        self.replace_lists(ctx, text, false)
    }

    /// Replace every list in `text` with the key of its stored HTML.
    ///
    /// With `hide_output` the key stays on the line the list started on,
    /// for callers that run span transforms over the result; otherwise it
    /// is set apart as a block of its own.
    fn replace_lists(&self, ctx: &mut ConversionContext, text: &str, hide_output: bool) -> String {
        if ctx.list_level >= self.options.max_nesting_depth {
            log::warn!(
                "Lists nested deeper than {} levels are left as text",
                self.options.max_nesting_depth
            );
            return text.to_string();
        }

        let nested = ctx.list_level > 0;
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut pos = 0;

        while pos < text.len() {
            if let Some((start, list)) = self.list_at(text, pos, nested) {
                let tag = if list.ordered { "ol" } else { "ul" };
                let items = self.process_list_items(ctx, &text[start..list.end]);
                let html = format!("<{tag}>\n{items}</{tag}>\n");

                let key = ctx.hash_html(html.trim_end_matches('\n'), false);
                out.push_str(&text[last..start]);
                if hide_output {
                    out.push_str(&key);
                    out.push('\n');
                } else {
                    out.push_str(&format!("\n\n{key}\n\n"));
                }
                last = list.end;
                pos = list.end;
                continue;
            }
            match text[pos..].find('\n') {
                Some(offset) => pos += offset + 1,
                None => break,
            }
        }

        if last == 0 {
            return text.to_string();
        }
        out.push_str(&text[last..]);
        out
    }

    /// List beginning at line start `pos`, with the offset where the
    /// replaced span starts
    fn list_at(&self, text: &str, pos: usize, nested: bool) -> Option<(usize, ListMatch)> {
        if nested {
            return self.whole_list(text, pos).map(|list| (pos, list));
        }
        if pos == 0 {
            // a single leading newline at document start is swallowed
            if text.starts_with('\n')
                && let Some(list) = self.whole_list(text, 1)
            {
                return Some((0, list));
            }
            return self.whole_list(text, 0).map(|list| (0, list));
        }
        let bytes = text.as_bytes();
        if pos >= 2 && bytes[pos - 1] == b'\n' && bytes[pos - 2] == b'\n' {
            return self.whole_list(text, pos).map(|list| (pos, list));
        }
        None
    }

    /// A list runs to the end of the text or to the first blank-line gap
    /// followed by something that is neither whitespace nor another item.
    /// The gap belongs to the list.
    fn whole_list(&self, text: &str, q: usize) -> Option<ListMatch> {
        let indent = text.as_bytes()[q..].iter().take_while(|&&b| b == b' ').count();
        if indent >= self.options.tab_width {
            return None;
        }
        let marker = q + indent;
        let len = marker_len(text, marker)?;
        let blanks = blanks_at(text, marker + len);
        if blanks == 0 {
            return None;
        }
        let ordered = text.as_bytes()[marker].is_ascii_digit();

        let content = marker + len + blanks;
        if content >= text.len() {
            return None;
        }
        let mut from = next_char_boundary(text, content);
        loop {
            let Some(offset) = text[from..].find('\n') else {
                return Some(ListMatch {
                    end: text.len(),
                    ordered,
                });
            };
            let gap = from + offset;
            let after = gap + newline_run(text, gap);
            if after == text.len() {
                return Some(ListMatch { end: after, ordered });
            }
            let next_is_content = text[after..].chars().next().is_some_and(|ch| !ch.is_whitespace());
            if after - gap >= 2 && next_is_content && !starts_item(text, after) {
                return Some(ListMatch { end: after, ordered });
            }
            from = after;
        }
    }

    fn process_list_items(&self, ctx: &mut ConversionContext, list_str: &str) -> String {
        ctx.list_level += 1;
        ctx.last_li_two_eols = false;

        let list_str = format!("{}\n", list_str.trim_end_matches('\n'));
        let bytes = list_str.as_bytes();
        let mut out = String::with_capacity(list_str.len());
        let mut last = 0;
        let mut pos = 0;

        while pos < list_str.len() {
            let leading_line = bytes[pos] == b'\n';
            let attempt = if leading_line {
                list_item_at(&list_str, pos + 1)
            } else if is_line_start(&list_str, pos) {
                list_item_at(&list_str, pos)
            } else {
                None
            };

            if let Some(item) = attempt {
                out.push_str(&list_str[last..pos]);
                out.push_str(&self.render_list_item(ctx, &list_str, &item, leading_line));
                last = item.end();
                pos = item.end();
                continue;
            }

            pos = if leading_line {
                pos + 1
            } else {
                match list_str[pos..].find('\n') {
                    Some(offset) => pos + offset,
                    None => break,
                }
            };
        }
        out.push_str(&list_str[last..]);

        ctx.list_level -= 1;
        out
    }

    fn render_list_item(
        &self,
        ctx: &mut ConversionContext,
        list_str: &str,
        item: &ItemMatch,
        leading_line: bool,
    ) -> String {
        let body = &list_str[item.content_start..item.end()];
        let body = outdent(body, self.options.tab_width);

        let html = if leading_line || body.contains("\n\n") || ctx.last_li_two_eols {
            self.run_nested_block_gamut(ctx, &body)
        } else {
            let mut inner = self.replace_lists(ctx, &body, true);
            if inner.ends_with('\n') {
                inner.pop();
            }
            self.run_span_gamut(ctx, &inner)
        };

        ctx.last_li_two_eols = item.eols == 2;
        format!("<li>{html}</li>\n")
    }
}

/// Item whose indentation starts at line start `pos`.
///
/// The item ends at the first newline run followed by the end of the list
/// or by a marker at the same indentation.
fn list_item_at(text: &str, pos: usize) -> Option<ItemMatch> {
    let indent_len = blanks_at(text, pos);
    let marker = pos + indent_len;
    let len = marker_len(text, marker)?;
    let blanks = blanks_at(text, marker + len);
    if blanks == 0 {
        return None;
    }
    let indent = &text[pos..marker];
    let content_start = marker + len + blanks;

    if content_start < text.len()
        && let Some((content_end, eols)) = item_end(text, next_char_boundary(text, content_start), indent)
    {
        return Some(ItemMatch {
            content_start,
            content_end,
            eols,
        });
    }
    // `-  ` with nothing after it keeps one blank as its content
    if blanks >= 2 {
        let content_start = content_start - 1;
        let (content_end, eols) = item_end(text, content_start + 1, indent)?;
        return Some(ItemMatch {
            content_start,
            content_end,
            eols,
        });
    }
    None
}

fn item_end(text: &str, mut from: usize, indent: &str) -> Option<(usize, usize)> {
    while from < text.len() {
        let end = from + text[from..].find('\n')?;
        let run = newline_run(text, end);
        let next = end + run;
        let sibling = text[next..]
            .strip_prefix(indent)
            .is_some_and(|_| starts_item(text, next + indent.len()));
        if next == text.len() || sibling {
            return Some((end, run.min(2)));
        }
        from = next;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ConvertOptions;

    fn engine() -> Markdown {
        Markdown::new(ConvertOptions::default()).unwrap()
    }

    #[test]
    fn test_marker_len() {
        assert_eq!(marker_len("- a", 0), Some(1));
        assert_eq!(marker_len("12. a", 0), Some(3));
        assert_eq!(marker_len("12 a", 0), None);
        assert_eq!(marker_len("a", 0), None);
        assert_eq!(marker_len("", 0), None);
    }

    #[test]
    fn test_whole_list_stops_at_paragraph() {
        let md = engine();
        let text = "- a\n- b\n\nPara\n";
        let list = md.whole_list(text, 0).unwrap();
        assert_eq!(&text[..list.end], "- a\n- b\n\n");
        assert!(!list.ordered);
    }

    #[test]
    fn test_whole_list_spans_blank_line_between_items() {
        let md = engine();
        let text = "1. a\n\n2. b\n\n\n";
        let list = md.whole_list(text, 0).unwrap();
        assert_eq!(list.end, text.len());
        assert!(list.ordered);
    }

    #[test]
    fn test_marker_needs_trailing_blank() {
        let md = engine();
        assert!(md.whole_list("-a\n", 0).is_none());
        assert!(md.whole_list("    - a\n", 0).is_none());
    }

    #[test]
    fn test_item_boundaries() {
        let text = "- a\n\n- b\n";
        let first = list_item_at(text, 0).unwrap();
        assert_eq!(&text[first.content_start..first.end()], "a\n\n");
        assert_eq!(first.eols, 2);
        let second = list_item_at(text, first.end()).unwrap();
        assert_eq!(&text[second.content_start..second.end()], "b\n");
        assert_eq!(second.eols, 1);
    }

    #[test]
    fn test_item_swallows_deeper_lines() {
        let text = "- a\n    - b\n- c\n";
        let first = list_item_at(text, 0).unwrap();
        assert_eq!(&text[first.content_start..first.end()], "a\n    - b\n");
    }

    fn lists(md: &Markdown, ctx: &mut ConversionContext, text: &str) -> String {
        let out = md.do_lists(ctx, text);
        md.restore_html_keys(ctx, &out).trim_matches('\n').to_string()
    }

    #[test]
    fn test_tight_and_loose_lists() {
        let md = engine();
        let mut ctx = ConversionContext::with_seed(0);
        assert_eq!(
            lists(&md, &mut ctx, "- a\n- b\n\n\n"),
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>"
        );
        assert_eq!(
            lists(&md, &mut ctx, "- a\n\n- b\n\n\n"),
            "<ul>\n<li><p>a</p></li>\n<li><p>b</p></li>\n</ul>"
        );
        assert_eq!(ctx.list_level, 0);
    }

    #[test]
    fn test_list_output_is_generated_block() {
        let md = engine();
        let mut ctx = ConversionContext::with_seed(0);
        let out = md.do_lists(&mut ctx, "- a\n\n\n");
        let key = out.trim_matches('\n');
        assert!(!ctx.html_blocks[key].raw);
    }

    #[test]
    fn test_top_level_list_needs_blank_line_before() {
        let md = engine();
        let mut ctx = ConversionContext::with_seed(0);
        let text = "I recommend version\n8. Oops\n\n";
        assert_eq!(md.do_lists(&mut ctx, text), text);
    }
}

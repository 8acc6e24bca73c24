//! Hiding block-level HTML from the Markdown passes
//!
//! Each block found is stored in the context and replaced by its key on a
//! line of its own, so paragraph formation later sees a segment that is
//! exactly a key and puts the block back untouched.
//!
//! Two line scanners run in turn. The strict one wants the closing tag at
//! the start of a line, which lets an indented inner `<div>` sit inside an
//! outer one. The liberal one accepts the first line that ends with the
//! closing tag. Deeply or irregularly nested HTML can still be cut short;
//! that is a known limitation of matching nested tags line by line.

use crate::context::ConversionContext;
use crate::converter::Markdown;
use crate::utils::fancy_replace_all;

const STRICT_BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "table", "dl", "ol", "ul", "script",
    "noscript", "form", "fieldset", "iframe", "math", "ins", "del",
];

/// Same as the strict set minus `ins` and `del`, which are often used inline
const LIBERAL_BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "table", "dl", "ol", "ul", "script",
    "noscript", "form", "fieldset", "iframe", "math",
];

pub(crate) fn hr_tag_pattern(tab_width: usize) -> String {
    format!(
        r"(?:(?<=\n\n)|\A\n?)([ ]{{0,{}}}<(hr)\b([^<>])*?/?>[ \t]*(?=\n{{2,}}|\z))",
        tab_width - 1
    )
}

pub(crate) fn html_comment_pattern(tab_width: usize) -> String {
    format!(
        r"(?s)(?:(?<=\n\n)|\A\n?)([ ]{{0,{}}}(?:<!(--.*?--\s*)+>)[ \t]*(?=\n{{2,}}|\z))",
        tab_width - 1
    )
}

impl Markdown {
    /// Replace block-level HTML with stored keys.
    ///
    /// Everything found here is author HTML. Markup the block pipeline
    /// generates is stored as it is created, so it is already a key by the
    /// time this runs again inside the pipeline.
    pub(crate) fn hash_html_blocks(&self, ctx: &mut ConversionContext, text: &str) -> String {
        if !text.contains('<') {
            return text.to_string();
        }

        let mut text = hash_line_blocks(ctx, text, strict_block_end);
        text = hash_line_blocks(ctx, &text, liberal_block_end);

        if text.contains("<hr") {
            text = fancy_replace_all(&self.patterns.hr_tag, &text, |caps| {
                let html = caps.get(1).map_or("", |m| m.as_str());
                format!("\n\n{}\n\n", ctx.hash_html(html, true))
            });
        }

        if text.contains("<!--") {
            text = fancy_replace_all(&self.patterns.html_comment, &text, |caps| {
                let html = caps.get(1).map_or("", |m| m.as_str());
                format!("\n\n{}\n\n", ctx.hash_html(html, true))
            });
        }

        text
    }
}

/// Run `block_end` at every line start and hash each block it reports
fn hash_line_blocks<F>(ctx: &mut ConversionContext, text: &str, block_end: F) -> String
where
    F: Fn(&str, usize) -> Option<usize>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut pos = 0;

    while pos < text.len() {
        if let Some(end) = block_end(text, pos) {
            out.push_str(&text[last..pos]);
            out.push_str("\n\n");
            out.push_str(&ctx.hash_html(&text[pos..end], true));
            out.push_str("\n\n");
            last = end;
            pos = end;
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

/// Name of a block tag opened at `pos`, if `<name` is followed by a
/// non-word character
fn opening_tag<'a>(text: &str, pos: usize, tags: &[&'a str]) -> Option<&'a str> {
    let rest = text[pos..].strip_prefix('<')?;
    let len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    let name = &rest[..len];
    tags.iter().copied().find(|tag| *tag == name)
}

fn line_end(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map_or(text.len(), |offset| pos + offset)
}

fn only_blanks(s: &str) -> bool {
    s.bytes().all(|b| b == b' ' || b == b'\t')
}

/// Block opened at `pos` whose closing tag starts a later line
fn strict_block_end(text: &str, pos: usize) -> Option<usize> {
    let tag = opening_tag(text, pos, STRICT_BLOCK_TAGS)?;
    let close = format!("</{tag}>");

    let mut start = line_end(text, pos) + 1;
    while start < text.len() {
        let end = line_end(text, start);
        if let Some(rest) = text[start..end].strip_prefix(close.as_str())
            && only_blanks(rest)
        {
            return Some(end);
        }
        start = end + 1;
    }
    None
}

/// Block opened at `pos` running to the first line, possibly the opening
/// one, that ends with the closing tag
fn liberal_block_end(text: &str, pos: usize) -> Option<usize> {
    let tag = opening_tag(text, pos, LIBERAL_BLOCK_TAGS)?;
    let close = format!("</{tag}>");

    // the closing tag may not overlap the opening `<tag`
    let mut search_from = pos + 1 + tag.len();
    let mut start = pos;
    while start < text.len() {
        let end = line_end(text, start);
        let line = text[search_from..end].trim_end_matches([' ', '\t']);
        if line.ends_with(close.as_str()) {
            return Some(end);
        }
        start = end + 1;
        search_from = start;
    }
    None
}

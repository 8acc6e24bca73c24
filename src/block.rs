//! Block-level transforms: headers, rules, code blocks, blockquotes and
//! paragraphs, applied in a fixed order by [`Markdown::run_block_gamut`]

use crate::context::ConversionContext;
use crate::converter::Markdown;
use crate::escape::{encode_code, html_removed_marker};
use crate::options::Extra;
use crate::utils::{fancy_replace_all, outdent};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static SETEXT_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^(.+)[ \t]*\n(=+|-+)[ \t]*\n+").unwrap());

static ATX_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]*(.+?)[ \t]*#*\n+").unwrap());

static HORIZONTAL_RULES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?m)^[ ]{0,2}([ ]?\*[ ]?){3,}[ \t]*$").unwrap(),
        Regex::new(r"(?m)^[ ]{0,2}([ ]?-[ ]?){3,}[ \t]*$").unwrap(),
        Regex::new(r"(?m)^[ ]{0,2}([ ]?_[ ]?){3,}[ \t]*$").unwrap(),
    ]
});

/// `>` lines, their lazy continuation lines and trailing blank lines
static BLOCK_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)((^[ \t]*>[ \t]?.+\n(.+\n)*\n*)+)").unwrap());

static BLOCK_QUOTE_LEVEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").unwrap());

pub(crate) static WS_ONLY_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]+$").unwrap());

static PRE_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)(\s*<pre>.+?</pre>)").unwrap());

static TWO_SPACE_INDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^  ").unwrap());

static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

pub(crate) fn code_block_pattern(tab_width: usize) -> String {
    format!(
        r"(?m)(?:\n\n|\A)((?:(?:[ ]{{{tab}}}|\t).*\n+)+)((?=^[ ]{{0,{tab}}}\S)|\z)",
        tab = tab_width
    )
}

impl Markdown {
    pub(crate) fn run_block_gamut(&self, ctx: &mut ConversionContext, text: &str) -> String {
        let mut text = self.do_headers(ctx, text);
        text = self.do_horizontal_rules(ctx, &text);
        text = self.do_lists(ctx, &text);
        text = self.do_code_blocks(ctx, &text);
        text = self.do_block_quotes(ctx, &text);
        // author HTML that only became standalone once the passes above
        // rewrote its neighbours
        text = self.hash_html_blocks(ctx, &text);
        self.form_paragraphs(ctx, &text)
    }

    /// Block pipeline for a blockquote or loose list item body.
    ///
    /// Past `max_nesting_depth` the body only gets span processing.
    pub(crate) fn run_nested_block_gamut(&self, ctx: &mut ConversionContext, text: &str) -> String {
        if ctx.depth >= self.options.max_nesting_depth {
            log::warn!(
                "Blocks nested deeper than {} levels are treated as inline text",
                self.options.max_nesting_depth
            );
            return self.run_span_gamut(ctx, text.trim_matches('\n'));
        }
        ctx.depth += 1;
        let html = self.run_block_gamut(ctx, text);
        ctx.depth -= 1;
        html
    }

    fn do_headers(&self, ctx: &mut ConversionContext, text: &str) -> String {
        let text = SETEXT_HEADER.replace_all(text, |caps: &Captures<'_>| {
            let level = if caps[2].starts_with('=') { 1 } else { 2 };
            let html = format!("<h{level}>{}</h{level}>", self.run_span_gamut(ctx, &caps[1]));
            format!("\n\n{}\n\n", ctx.hash_html(&html, false))
        });
        ATX_HEADER
            .replace_all(&text, |caps: &Captures<'_>| {
                let level = caps[1].len();
                let html = format!("<h{level}>{}</h{level}>", self.run_span_gamut(ctx, &caps[2]));
                format!("\n\n{}\n\n", ctx.hash_html(&html, false))
            })
            .into_owned()
    }

    fn do_horizontal_rules(&self, ctx: &mut ConversionContext, text: &str) -> String {
        if !HORIZONTAL_RULES.iter().any(|re| re.is_match(text)) {
            return text.to_string();
        }
        let html = format!("<hr{}", self.options.empty_element_suffix());
        let rule = format!("\n\n{}\n\n", ctx.hash_html(&html, false));
        let mut text = text.to_string();
        for re in HORIZONTAL_RULES.iter() {
            text = re.replace_all(&text, rule.as_str()).into_owned();
        }
        text
    }

    fn do_code_blocks(&self, ctx: &mut ConversionContext, text: &str) -> String {
        fancy_replace_all(&self.patterns.code_block, text, |caps| {
            let block = caps.get(1).map_or("", |m| m.as_str());
            let html = self.render_code_block(block);
            format!("\n\n{}\n\n", ctx.hash_html(&html, false))
        })
    }

    fn render_code_block(&self, block: &str) -> String {
        let mut code = outdent(block, self.options.tab_width);
        code = code.trim_start_matches('\n').trim_end().to_string();

        if self.options.has_extra(Extra::CodeColor)
            && let Some(directive) = code.strip_prefix(":::")
        {
            let (language, rest) = directive.split_once('\n').unwrap_or((directive, ""));
            let language = language.trim();
            let rest = rest.trim_start_matches('\n');
            if let Some(html) = self
                .highlighter
                .as_deref()
                .and_then(|highlighter| highlighter.highlight(rest, language))
            {
                return html;
            }
            log::debug!("Code block language {language:?} not highlighted; emitting plain block");
            code = rest.to_string();
        }

        format!("<pre><code>{}\n</code></pre>", encode_code(&code))
    }

    fn do_block_quotes(&self, ctx: &mut ConversionContext, text: &str) -> String {
        if !text.contains('>') {
            return text.to_string();
        }
        BLOCK_QUOTE
            .replace_all(text, |caps: &Captures<'_>| {
                let bq = BLOCK_QUOTE_LEVEL.replace_all(&caps[1], "");
                let bq = WS_ONLY_LINE.replace_all(&bq, "");
                let bq = self.hash_html_blocks(ctx, &bq);
                let bq = self.run_nested_block_gamut(ctx, &bq);

                let bq = format!("  {}", bq.replace('\n', "\n  "));
                // the indent must not leak into preformatted text
                let bq = PRE_BLOCK.replace_all(&bq, |pre: &Captures<'_>| {
                    TWO_SPACE_INDENT.replace_all(&pre[1], "").into_owned()
                });

                let html = format!("<blockquote>\n{bq}\n</blockquote>");
                format!("\n\n{}\n\n", ctx.hash_html(&html, false))
            })
            .into_owned()
    }

    /// Split on blank lines; stored blocks come back verbatim, everything
    /// else is wrapped in `<p>`
    fn form_paragraphs(&self, ctx: &mut ConversionContext, text: &str) -> String {
        let text = text.trim_matches('\n');
        if text.is_empty() {
            return String::new();
        }

        let mut grafs = Vec::new();
        for graf in PARAGRAPH_BREAK.split(text) {
            if let Some(block) = ctx.html_blocks.get(graf) {
                if block.raw && self.options.safe_mode {
                    grafs.push(html_removed_marker().to_string());
                } else {
                    grafs.push(block.text.clone());
                }
            } else {
                let span = self.run_span_gamut(ctx, graf);
                grafs.push(format!("<p>{}</p>", span.trim_start_matches([' ', '\t'])));
            }
        }
        grafs.join("\n\n")
    }
}

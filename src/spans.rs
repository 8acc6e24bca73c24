//! Span-level transforms: everything that happens inside a paragraph,
//! header or tight list item

use crate::context::ConversionContext;
use crate::converter::Markdown;
use crate::escape::{self, encode_backslash_escapes, encode_code, html_removed_marker, protect_emphasis};
use crate::options::Extra;
use crate::utils::fancy_replace_all;
use fancy_regex::Regex as FancyRegex;
use regex::Regex;
use std::sync::LazyLock;

/// Backtick run, content, and a closing run of the same length
static CODE_SPAN: LazyLock<FancyRegex> = LazyLock::new(|| FancyRegex::new(r"(?s)(`+)(.+?)(?<!`)\1(?!`)").unwrap());

/// Splits text into literal runs and HTML-ish tokens: tags, `<word...>`
/// auto-link shapes, comments and processing instructions
static HTML_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"</?(?:\w+)(?:\s+(?:[\w-]+:)?[\w-]+=(?:".*?"|'.*?'))*\s*/?>"#,
        r"|<\w+[^>]*>",
        r"|<!--.*?-->",
        r"|<\?.*?\?>"
    ))
    .unwrap()
});

static AUTO_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)<((https?|ftp):[^'">\s]+)>"#).unwrap());

// The sentinel is allowed in the local part so escaped characters survive
static AUTO_EMAIL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:mailto:)?([-.\w\x{1A}]+@[-\w]+(?:\.[-\w]+)*\.[a-zA-Z]+)>").unwrap()
});

/// `&` that does not start an entity
static BARE_AMPERSAND: LazyLock<FancyRegex> =
    LazyLock::new(|| FancyRegex::new(r"&(?!#?[xX]?(?:[0-9a-fA-F]+|\w+);)").unwrap());

/// `<` that cannot start a tag
static NAKED_LT: LazyLock<FancyRegex> = LazyLock::new(|| FancyRegex::new(r"(?i)<(?![a-z/?\$!])").unwrap());

static STRONG: LazyLock<FancyRegex> =
    LazyLock::new(|| FancyRegex::new(r"(?s)(\*\*|__)(?=\S)(.+?[*_]*)(?<=\S)\1").unwrap());
static EM: LazyLock<FancyRegex> = LazyLock::new(|| FancyRegex::new(r"(?s)(\*|_)(?=\S)(.+?)(?<=\S)\1").unwrap());
static CODE_FRIENDLY_STRONG: LazyLock<FancyRegex> =
    LazyLock::new(|| FancyRegex::new(r"(?s)(\*\*)(?=\S)(.+?[*_]*)(?<=\S)\*\*").unwrap());
static CODE_FRIENDLY_EM: LazyLock<FancyRegex> =
    LazyLock::new(|| FancyRegex::new(r"(?s)(\*)(?=\S)(.+?)(?<=\S)\*").unwrap());

static HARD_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}\n").unwrap());

/// Encode `&` outside entities and `<` that cannot open a tag
pub fn encode_amps_and_angles(text: &str) -> String {
    let mut text = text.to_string();
    if text.contains('&') {
        text = fancy_replace_all(&BARE_AMPERSAND, &text, |_| "&amp;".to_string());
    }
    if text.contains('<') {
        text = fancy_replace_all(&NAKED_LT, &text, |_| "&lt;".to_string());
    }
    text
}

impl Markdown {
    pub(crate) fn run_span_gamut(&self, ctx: &mut ConversionContext, text: &str) -> String {
        let mut text = self.do_code_spans(ctx, text);
        text = self.escape_special_chars(&text);
        text = self.do_links(ctx, &text);
        text = self.do_auto_links(ctx, &text);
        if self.options.has_extra(Extra::LinkPatterns) {
            text = self.do_link_patterns(&text);
        }
        text = encode_amps_and_angles(&text);
        text = self.do_italics_and_bold(&text);

        let line_break = format!(" <br{}\n", self.options.empty_element_suffix());
        HARD_BREAK.replace_all(&text, line_break.as_str()).into_owned()
    }

    /// Backtick code spans become `<code>` elements.
    ///
    /// The emitted element is stored as generated HTML so the tokenizer in
    /// [`Self::escape_special_chars`] never mistakes it for author markup.
    fn do_code_spans(&self, ctx: &mut ConversionContext, text: &str) -> String {
        if !text.contains('`') {
            return text.to_string();
        }
        fancy_replace_all(&CODE_SPAN, text, |caps| {
            let code = caps.get(2).map_or("", |m| m.as_str()).trim_matches([' ', '\t']);
            ctx.hash_html(&format!("<code>{}</code>", encode_code(code)), false)
        })
    }

    /// Protect markup tokens from emphasis and encode backslash escapes in
    /// the literal text between them.
    ///
    /// In safe mode each markup token becomes the removed-HTML marker.
    fn escape_special_chars(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for token in HTML_TOKEN.find_iter(text) {
            out.push_str(&encode_backslash_escapes(&text[last..token.start()]));
            if self.options.safe_mode {
                out.push_str(html_removed_marker());
            } else {
                out.push_str(&protect_emphasis(token.as_str()));
            }
            last = token.end();
        }
        out.push_str(&encode_backslash_escapes(&text[last..]));
        out
    }

    fn do_auto_links(&self, ctx: &mut ConversionContext, text: &str) -> String {
        if !text.contains('<') {
            return text.to_string();
        }
        let text = AUTO_LINK.replace_all(text, r#"<a href="$1">$1</a>"#);
        AUTO_EMAIL_LINK
            .replace_all(&text, |caps: &regex::Captures<'_>| {
                let addr = escape::restore(&caps[1]);
                // a stored code span or tag inside the local part
                if addr.contains(escape::SENTINEL) {
                    return caps[0].to_string();
                }
                encode_email_address(ctx, &addr)
            })
            .into_owned()
    }

    fn do_italics_and_bold(&self, text: &str) -> String {
        if !text.contains(['*', '_']) {
            return text.to_string();
        }
        let (strong, em) = if self.options.has_extra(Extra::CodeFriendly) {
            (&*CODE_FRIENDLY_STRONG, &*CODE_FRIENDLY_EM)
        } else {
            (&*STRONG, &*EM)
        };
        let text = fancy_replace_all(strong, text, |caps| {
            format!("<strong>{}</strong>", caps.get(2).map_or("", |m| m.as_str()))
        });
        fancy_replace_all(em, &text, |caps| {
            format!("<em>{}</em>", caps.get(2).map_or("", |m| m.as_str()))
        })
    }
}

/// Mailto link with every character of the address encoded at random as a
/// literal, a decimal entity or a hex entity. `@` is never literal.
fn encode_email_address(ctx: &mut ConversionContext, addr: &str) -> String {
    let chars: Vec<String> = "mailto:"
        .chars()
        .chain(addr.chars())
        .map(|ch| {
            let r = ctx.random();
            if r > 0.9 && ch != '@' {
                ch.to_string()
            } else if r < 0.45 {
                format!("&#x{:x};", ch as u32)
            } else {
                format!("&#{};", ch as u32)
            }
        })
        .collect();
    let link = format!("<a href=\"{}\">{}</a>", chars.concat(), chars[7..].concat());
    protect_emphasis(&link)
}

//! Link and footnote definitions
//!
//! Both kinds of definition are removed from the document and recorded in
//! the conversion context before the block pipeline runs.

use crate::context::{ConversionContext, LinkReference};
use crate::converter::Markdown;
use crate::spans::encode_amps_and_angles;
use crate::utils::{dedent, fancy_replace_all};

pub(crate) fn link_def_pattern(tab_width: usize) -> String {
    format!(
        concat!(
            r"(?m)^[ ]{{0,{less}}}\[(.+)\]:[ \t]*\n?[ \t]*",
            r"<?(\S+?)>?[ \t]*\n?[ \t]*",
            r#"(?:(?<=\s)['"(](.+?)['")][ \t]*)?"#,
            r"(?:\n+|\z)"
        ),
        less = tab_width - 1
    )
}

pub(crate) fn footnote_def_pattern(tab_width: usize) -> String {
    format!(
        concat!(
            r"(?m)^[ ]{{0,{less}}}\[\^(.+)\]:[ \t]*",
            r"((?:\s*.*\n+)(?:(?:[ ]{{{tab}}}|\t).*\n+)*)",
            r"(?:(?=^[ ]{{0,{tab}}}\S)|\z)"
        ),
        less = tab_width - 1,
        tab = tab_width
    )
}

/// Footnote ids are compared lower-cased with every non-word character
/// replaced by `-`, both where they are defined and where they are used
pub fn normalize_footnote_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

impl Markdown {
    pub(crate) fn strip_link_definitions(&self, ctx: &mut ConversionContext, text: &str) -> String {
        if !text.contains("]:") {
            return text.to_string();
        }
        fancy_replace_all(&self.patterns.link_def, text, |caps| {
            let id = caps.get(1).map_or("", |m| m.as_str());
            let url = caps.get(2).map_or("", |m| m.as_str());
            let title = caps
                .get(3)
                .map(|m| m.as_str())
                .filter(|t| !t.is_empty())
                .map(|t| t.replace('"', "&quot;"));
            ctx.references.insert(
                id.to_lowercase(),
                LinkReference {
                    url: encode_amps_and_angles(url),
                    title,
                },
            );
            String::new()
        })
    }

    pub(crate) fn strip_footnote_definitions(&self, ctx: &mut ConversionContext, text: &str) -> String {
        if !text.contains("[^") {
            return text.to_string();
        }
        fancy_replace_all(&self.patterns.footnote_def, text, |caps| {
            let id = caps.get(1).map_or("", |m| m.as_str());
            let body = caps.get(2).map_or("", |m| m.as_str());
            let body = dedent(body, 8, !body.starts_with('\n'));
            let paragraphs = encode_amps_and_angles(body.trim())
                .split("\n\n")
                .map(str::to_string)
                .collect();
            ctx.footnotes.insert(normalize_footnote_id(id), paragraphs);
            String::new()
        })
    }
}

//! The footnote appendix appended after the document body

use crate::context::ConversionContext;
use crate::converter::Markdown;

impl Markdown {
    /// Append the `<div class="footnotes">` list when any footnote was
    /// referenced. Footnotes are listed in first-reference order; a
    /// reference made inside a footnote appends to that order while the
    /// list is being built.
    pub(crate) fn add_footnotes(&self, ctx: &mut ConversionContext, text: &str) -> String {
        if ctx.footnote_ids.is_empty() {
            return text.to_string();
        }

        let mut footer = vec![
            "<div class=\"footnotes\">".to_string(),
            format!("<hr{}", self.options.empty_element_suffix()),
            "<ol>".to_string(),
        ];

        let mut idx = 0;
        while idx < ctx.footnote_ids.len() {
            let id = ctx.footnote_ids[idx].clone();
            if idx != 0 {
                footer.push(String::new());
            }
            footer.push(format!("<li id=\"fn-{id}\">"));

            let backlink = format!(
                "<a href=\"#fnref-{id}\" class=\"footnoteBackLink\" title=\"Jump back to footnote {} in the text.\">&#8617;</a>",
                idx + 1
            );
            let paragraphs = ctx.footnotes.get(&id).cloned().unwrap_or_default();
            if paragraphs.is_empty() {
                footer.push(format!("<p>{backlink}</p>"));
            }
            let last = paragraphs.len().saturating_sub(1);
            for (n, paragraph) in paragraphs.iter().enumerate() {
                let html = self.run_span_gamut(ctx, paragraph);
                if n == last {
                    footer.push(format!("<p>{html}&nbsp;{backlink}</p>"));
                } else {
                    footer.push(format!("<p>{html}</p>"));
                }
            }

            footer.push("</li>".to_string());
            idx += 1;
        }

        footer.push("</ol>".to_string());
        footer.push("</div>".to_string());
        format!("{text}\n\n{}", footer.join("\n"))
    }
}

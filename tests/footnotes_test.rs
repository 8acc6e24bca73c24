use mdpress_lib::{ConvertOptions, Extra, markdown};
use pretty_assertions::assert_eq;

fn convert(text: &str) -> String {
    markdown(text, &ConvertOptions::default().with_extra(Extra::Footnotes)).unwrap()
}

#[test]
fn test_numbering_follows_first_reference() {
    let html = convert("Foo[^b] bar[^a].\n\n[^a]: A note.\n\n[^b]: B note.\n");

    assert!(html.starts_with(concat!(
        "<p>Foo<sup class=\"footnote-ref\" id=\"fnref-b\"><a href=\"#fn-b\">1</a></sup> ",
        "bar<sup class=\"footnote-ref\" id=\"fnref-a\"><a href=\"#fn-a\">2</a></sup>.</p>\n\n"
    )));
    let b = html.find("<li id=\"fn-b\">").unwrap();
    let a = html.find("<li id=\"fn-a\">").unwrap();
    assert!(b < a);
    assert!(html.contains("<p>B note.&nbsp;<a href=\"#fnref-b\" class=\"footnoteBackLink\" title=\"Jump back to footnote 1 in the text.\">&#8617;</a></p>"));
    assert!(html.ends_with("</li>\n</ol>\n</div>\n"));
}

#[test]
fn test_multi_paragraph_footnote() {
    let html = convert("Text[^n].\n\n[^n]: First.\n\n    Second.\n");
    assert!(html.contains("<li id=\"fn-n\">\n<p>First.</p>\n<p>Second.&nbsp;<a href=\"#fnref-n\""));
}

#[test]
fn test_undefined_reference_is_literal() {
    assert_eq!(convert("Missing[^nope].\n"), "<p>Missing[^nope].</p>\n");
}

#[test]
fn test_ids_are_normalized() {
    let html = convert("See[^My Note].\n\n[^my note]: Hi.\n");
    assert!(html.contains("id=\"fnref-my-note\""));
    assert!(html.contains("<li id=\"fn-my-note\">"));
}

#[test]
fn test_without_extra_definitions_are_text() {
    let html = markdown("A[^1].\n\n[^1]: Note.\n", &ConvertOptions::default()).unwrap();
    assert!(!html.contains("footnote"));
}

#[test]
fn test_html4_rule_in_appendix() {
    let options = ConvertOptions::default()
        .with_extra(Extra::Footnotes)
        .with_tag_style(mdpress_lib::TagStyle::Html4);
    let html = markdown("A[^1].\n\n[^1]: Note.\n", &options).unwrap();
    assert!(html.contains("<div class=\"footnotes\">\n<hr>\n<ol>"));
}

#[test]
fn test_standard_extras_include_footnotes() {
    let options = ConvertOptions::default().with_standard_extras();
    let html = markdown("Foo[^1].\n\n[^1]: Note.\n", &options).unwrap();
    assert!(html.contains("<sup class=\"footnote-ref\" id=\"fnref-1\"><a href=\"#fn-1\">1</a></sup>"));
    assert!(html.contains("<div class=\"footnotes\">"));
}

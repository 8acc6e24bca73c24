use criterion::{Criterion, criterion_group, criterion_main};
use mdpress_lib::{ConvertOptions, Extra, Markdown};

fn generate_document(sections: usize) -> String {
    let mut doc = String::new();
    for i in 0..sections {
        doc.push_str(&format!("## Section {i}\n\n"));
        doc.push_str("Some *emphasis*, **strong** text and a [link][ref] with `code`.\n");
        doc.push_str("A second line with an <span>inline tag</span> & an ampersand.[^n]\n\n");
        doc.push_str("- item one\n- item two\n    - nested item\n- item three\n\n");
        doc.push_str("> quoted text\n> continues here\n\n");
        doc.push_str("    fn code() -> u32 {\n        42\n    }\n\n");
    }
    doc.push_str("[ref]: https://example.com \"Example\"\n\n[^n]: A footnote.\n");
    doc
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    group.sample_size(20);

    let content = generate_document(100);
    let plain = Markdown::new(ConvertOptions::default()).unwrap();
    group.bench_function("default", |b| {
        b.iter(|| std::hint::black_box(plain.convert(std::hint::black_box(&content))));
    });

    let extras = Markdown::new(
        ConvertOptions::default()
            .with_extra(Extra::Footnotes)
            .with_extra(Extra::CodeFriendly),
    )
    .unwrap();
    group.bench_function("footnotes", |b| {
        b.iter(|| std::hint::black_box(extras.convert(std::hint::black_box(&content))));
    });

    group.finish();
}

criterion_group!(benches, bench_convert);
criterion_main!(benches);

//! Benchmarks for tokenizing and rendering chat markup
//!
//! Run with: cargo bench -p moeparse-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use moeparse_core::{bbcode, Registry, Renderer};

/// A chat log mixing BBCode, chat styles, mentions and plain text
const CHAT_SAMPLE: &str = r#"@alice hey, did you see the [b]new build[/b]?
@bob yes! [i]finally[/i] the [url=https://example.com/ci]pipeline[/url] is green
*really* nice work on the [color=#3a3]colour[/color] tweaks, and ~~old~~ new _styles_
[quote]not a registered tag[/quote] stays as text, as does [b]this unclosed one
[code]fn main() { println!("[b]not bold[/b]"); }[/code]
[img]https://example.com/cat.png[/img] [img=https://example.com/dog.png]dog[/img]
[size=14][b][i][u]deeply [s]nested[/s] markup[/u][/i][/b][/size] with `inline code`
just some plain text without any markup at all, which should be the common case
"#;

fn registry() -> Registry {
    let mut registry = Registry::new();
    bbcode::register_bbcode(&mut registry);
    bbcode::register_chat_styles(&mut registry);
    registry.register(
        "mention",
        bbcode::mention(|name| match name {
            "alice" => Some("1".to_string()),
            "bob" => Some("2".to_string()),
            _ => None,
        }),
    );
    registry.compile().unwrap();
    registry
}

fn bench_chat(c: &mut Criterion) {
    let registry = registry();
    let tokenizer = registry.tokenizer();
    let renderer = Renderer::default();

    let mut group = c.benchmark_group("chat");
    group.throughput(Throughput::Bytes(CHAT_SAMPLE.len() as u64));

    group.bench_function("tokenize", |b| {
        b.iter(|| {
            let tokens = tokenizer.tokenize(black_box(CHAT_SAMPLE));
            black_box(tokens.len())
        })
    });

    group.bench_function("tokenize_render", |b| {
        b.iter(|| {
            let tokens = tokenizer.tokenize(black_box(CHAT_SAMPLE));
            black_box(renderer.render(&tokens).unwrap().len())
        })
    });

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let tokenizer = registry().tokenizer();
    let mut group = c.benchmark_group("scaling");

    for size in [1, 10, 100].iter() {
        let content = CHAT_SAMPLE.repeat(*size);
        group.throughput(Throughput::Bytes(content.len() as u64));

        group.bench_with_input(BenchmarkId::new("tokenize", size), &content, |b, content| {
            b.iter(|| black_box(tokenizer.tokenize(black_box(content)).len()))
        });
    }

    group.finish();
}

fn bench_nesting(c: &mut Criterion) {
    let tokenizer = registry().tokenizer();
    let mut group = c.benchmark_group("nesting");

    for depth in [4, 16, 64].iter() {
        let content = format!("{}x{}", "[b]".repeat(*depth), "[/b]".repeat(*depth));
        group.bench_with_input(BenchmarkId::new("balanced", depth), &content, |b, content| {
            b.iter(|| black_box(tokenizer.tokenize(black_box(content)).len()))
        });

        let unclosed = "[b]".repeat(*depth);
        group.bench_with_input(BenchmarkId::new("unclosed", depth), &unclosed, |b, content| {
            b.iter(|| black_box(tokenizer.tokenize(black_box(content)).len()))
        });
    }

    group.finish();
}

/// Inputs where every match is rejected or left unpaired. Time should grow
/// linearly with the repeat count.
fn bench_degenerate(c: &mut Criterion) {
    let tokenizer = registry().tokenizer();
    let mut group = c.benchmark_group("degenerate");
    group.sample_size(20);

    let units = [
        ("mid_word", "a_b "),
        ("unclosed", "[b]"),
        ("possible_single", "[url][/i]"),
    ];
    for (name, unit) in units {
        for repeat in [1_000, 10_000, 100_000].iter() {
            let content = unit.repeat(*repeat);
            group.throughput(Throughput::Bytes(content.len() as u64));
            group.bench_with_input(BenchmarkId::new(name, repeat), &content, |b, content| {
                b.iter(|| black_box(tokenizer.tokenize(black_box(content)).len()))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_chat, bench_scaling, bench_nesting, bench_degenerate);
criterion_main!(benches);

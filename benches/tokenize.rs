use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use livespell::checker::tokenizer::{tokenize, Tokenizer};
use livespell::parser::SourceLang;
use livespell::{Config, DictionarySpellProvider, FileType, Workspace};
use std::sync::Arc;

const SOURCE_LINE: &str =
    "let total = items.iter().sum::<u64>(); // recieve the totel, then \"send it\" on\n";

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    for lines in [1, 100, 1000] {
        let text = SOURCE_LINE.repeat(lines);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("default_breakers", lines), &text, |b, text| {
            b.iter(|| tokenize(black_box(text)).count())
        });
    }

    let whitespace_only = Tokenizer::new(" \t\n");
    let text = SOURCE_LINE.repeat(100);
    group.bench_function("whitespace_breakers", |b| {
        b.iter(|| whitespace_only.tokens(black_box(&text)).count())
    });

    group.finish();
}

/// A full pass over a freshly opened file: classify, tokenize, check, commit.
fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    group.sample_size(30);

    let config = Config {
        personal_dictionary: None,
        ..Config::default()
    };
    let speller = DictionarySpellProvider::new(&config).unwrap();
    let workspace = Workspace::new(Arc::new(speller), config);

    for lines in [10, 500] {
        let text = SOURCE_LINE.repeat(lines);
        group.bench_with_input(BenchmarkId::new("open_and_pass", lines), &text, |b, text| {
            b.iter(|| {
                let session = workspace.open("bench.rs", text.as_str(), FileType::SourceCode(SourceLang::Rust));
                black_box(session.reconcile_now())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_reconcile);
criterion_main!(benches);

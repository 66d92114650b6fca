use criterion::{criterion_group, criterion_main, Criterion};
use mbir_core::config::IdfMode;
use mbir_core::index::IndexBuilder;
use mbir_core::pipeline::search;

const WORDS: &[&str] = &[
    "bbc", "world", "service", "cuts", "egypt", "protest", "super", "bowl", "oil", "price",
    "storm", "snow", "airport", "delay", "music", "award", "election", "vote", "game", "score",
];

fn bench_search(c: &mut Criterion) {
    let mut builder = IndexBuilder::new();
    for i in 0..20_000usize {
        let text: Vec<&str> = (0..12).map(|j| WORDS[(i * 7 + j * 13) % WORDS.len()]).collect();
        builder.add_document(&i.to_string(), &text.join(" "));
    }
    let index = builder.finish();
    c.bench_function("search_top1000", |b| {
        b.iter(|| search(&index, "BBC World Service staff cuts", 1000, IdfMode::Smoothed, 1024))
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);

//! Benchmarks for the per-tick hot path
//!
//! Run with: cargo bench --package readalong-sync-engine

use criterion::{criterion_group, criterion_main, Criterion};
use readalong_core::{ChunkTable, TextChunk};
use readalong_sync_engine::{resolve, StyledParagraph};
use std::hint::black_box;

fn story(words: usize) -> (String, ChunkTable) {
    let mut paragraph = String::new();
    let mut chunks = Vec::with_capacity(words);
    for i in 0..words {
        let word = format!("word{} ", i);
        paragraph.push_str(&word);
        let start = i as f64 * 0.4;
        chunks.push(TextChunk::new(word, start, start + 0.35));
    }
    (paragraph, ChunkTable::new(chunks))
}

fn bench_resolve(c: &mut Criterion) {
    let (_, table) = story(500);

    c.bench_function("resolve_forward_with_hint", |b| {
        b.iter(|| {
            let mut active = None;
            for step in 0..2000 {
                active = resolve(black_box(step as f64 * 0.1), &table, active);
            }
            black_box(active)
        });
    });

    c.bench_function("resolve_without_hint", |b| {
        b.iter(|| resolve(black_box(123.45), &table, None));
    });
}

fn bench_build(c: &mut Criterion) {
    let (paragraph, table) = story(500);

    c.bench_function("styled_paragraph_build", |b| {
        b.iter(|| StyledParagraph::build(black_box(&paragraph), &table, Some(250)));
    });
}

criterion_group!(benches, bench_resolve, bench_build);
criterion_main!(benches);

//! Benchmarks for configuration system
//!
//! Run with: cargo bench --package readalong-config

use criterion::{criterion_group, criterion_main, Criterion};
use readalong_config::{Config, ConfigManager};
use std::hint::black_box;
use tempfile::TempDir;

fn bench_config_validation(c: &mut Criterion) {
    let config = Config::default();

    c.bench_function("config_validate", |b| {
        b.iter(|| black_box(config.validate()));
    });
}

fn bench_config_serialization(c: &mut Criterion) {
    let config = Config::default();
    let toml_string = toml::to_string(&config).expect("Failed to serialize");

    c.bench_function("config_serialize_toml", |b| {
        b.iter(|| black_box(toml::to_string(&config).expect("Failed to serialize")));
    });

    c.bench_function("config_deserialize_toml", |b| {
        b.iter(|| {
            let config: Config = toml::from_str(&toml_string).expect("Failed to deserialize");
            black_box(config)
        });
    });
}

fn bench_config_save_load(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let manager =
        ConfigManager::with_directory(temp_dir.path().to_path_buf()).expect("Failed to create manager");
    let config = Config::default();

    c.bench_function("config_save", |b| {
        b.iter(|| manager.save(black_box(&config)).expect("Failed to save"));
    });

    c.bench_function("config_load", |b| {
        b.iter(|| black_box(manager.load().expect("Failed to load")));
    });
}

criterion_group!(
    benches,
    bench_config_validation,
    bench_config_serialization,
    bench_config_save_load
);
criterion_main!(benches);

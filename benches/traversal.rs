//! Benchmarks comparing bulk traversal against a std::fs recursive walk.
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use turbowalk::{Walker, WalkOptions};

/// Build a tree of `dirs` directories, each `depth` levels deep, holding
/// `files` files per directory.
fn build_tree(dirs: usize, depth: usize, files: usize) -> TempDir {
    let root = tempfile::tempdir().expect("create temp dir");
    for d in 0..dirs {
        let mut dir = root.path().join(format!("group_{d:03}"));
        for level in 0..depth {
            dir = dir.join(format!("level_{level}"));
            fs::create_dir_all(&dir).expect("create dirs");
            for f in 0..files {
                fs::write(dir.join(format!("asset_{f:04}.nif")), b"payload").expect("write file");
            }
        }
    }
    root
}

fn std_walk(dir: &Path) -> usize {
    let mut count = 0;
    let Ok(listing) = fs::read_dir(dir) else {
        return 0;
    };
    for entry in listing.flatten() {
        count += 1;
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if metadata.is_dir() {
            count += std_walk(&entry.path());
        }
    }
    count
}

fn bulk_walk(root: &Path, options: WalkOptions) -> usize {
    let mut count = 0;
    Walker::new(root)
        .options(options)
        .run(|batch| count += batch.len())
        .expect("walk");
    count
}

/// Compare the bulk walker with std::fs on the same tree
fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");
    let tree = build_tree(20, 4, 50);

    group.bench_function("turbowalk", |b| {
        b.iter(|| bulk_walk(tree.path(), WalkOptions::default()))
    });
    group.bench_function("turbowalk_terminators", |b| {
        let options = WalkOptions {
            terminators: true,
            ..Default::default()
        };
        b.iter(|| bulk_walk(tree.path(), options))
    });
    group.bench_function("turbowalk_details", |b| {
        let options = WalkOptions {
            details: true,
            ..Default::default()
        };
        b.iter(|| bulk_walk(tree.path(), options))
    });
    group.bench_function("std_fs", |b| b.iter(|| std_walk(tree.path())));

    group.finish();
}

/// Benchmark with different buffer sizes
fn bench_buffer_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_size");
    let tree = build_tree(4, 1, 2000);

    for size in [1024, 16 * 1024, 64 * 1024, 256 * 1024] {
        let options = WalkOptions {
            buffer_size: size,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::new("turbowalk", format!("{}KB", size / 1024)),
            &options,
            |b, &options| b.iter(|| bulk_walk(tree.path(), options)),
        );
    }

    group.finish();
}

/// Benchmark batch thresholds through the worker thread
fn bench_thresholds(c: &mut Criterion) {
    let mut group = c.benchmark_group("threshold");
    let tree = build_tree(10, 3, 100);

    for threshold in [1, 64, 1024, 16384] {
        group.bench_with_input(
            BenchmarkId::new("stream", threshold),
            &threshold,
            |b, &threshold| {
                b.iter(|| {
                    let mut stream = Walker::new(tree.path())
                        .threshold(threshold)
                        .stream(8)
                        .expect("start stream");
                    let count: usize = stream
                        .by_ref()
                        .map(|batch| batch.expect("batch").len())
                        .sum();
                    stream.join().expect("join");
                    count
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_traversal, bench_buffer_sizes, bench_thresholds);
criterion_main!(benches);

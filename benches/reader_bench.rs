use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reflow::{discovery, reader};
use std::path::PathBuf;
use tempfile::TempDir;

/// Corpus of input files: REFLOW_BENCH_DIR when set, otherwise a generated tree
fn corpus() -> (Option<TempDir>, PathBuf) {
    if let Ok(dir) = std::env::var("REFLOW_BENCH_DIR") {
        return (None, PathBuf::from(dir));
    }

    let temp_dir = TempDir::new().unwrap();
    let page = "Short extracted line that wraps and con-\ntinues on the next line.\n\n".repeat(400);
    for i in 0..20 {
        let path = temp_dir.path().join(format!("dir{}/doc{i}.txt", i % 4));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, &page).unwrap();
    }
    let root = temp_dir.path().to_path_buf();
    (Some(temp_dir), root)
}

fn bench_discovery(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (_guard, root_dir) = corpus();

    let mut group = c.benchmark_group("discovery");
    group.sample_size(10);

    group.bench_function("glob", |b| {
        b.iter(|| {
            rt.block_on(async {
                let files = discovery::collect_discovered_files(&root_dir, discovery::DiscoveryConfig::default())
                    .await
                    .unwrap_or_default();
                black_box(files.len())
            })
        })
    });

    group.bench_function("parallel_walk", |b| {
        b.iter(|| {
            rt.block_on(async {
                let files =
                    discovery::collect_discovered_files_parallel(&root_dir, discovery::DiscoveryConfig::default())
                        .await
                        .unwrap_or_default();
                black_box(files.len())
            })
        })
    });
    group.finish();
}

fn bench_reading(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (_guard, root_dir) = corpus();

    let files = rt
        .block_on(discovery::find_input_files(&root_dir, discovery::DiscoveryConfig::default()))
        .unwrap_or_default();
    if files.is_empty() {
        eprintln!("No files found for reading benchmark");
        return;
    }

    let mut group = c.benchmark_group("reading");
    group.sample_size(10);

    for use_mmap in [false, true] {
        let name = if use_mmap { "mmap" } else { "buffered" };
        let file_reader = reader::AsyncFileReader::new(reader::ReaderConfig {
            use_mmap,
            ..Default::default()
        });

        group.bench_function(name, |b| {
            b.iter(|| {
                rt.block_on(async {
                    let mut total_bytes = 0u64;
                    for path in &files {
                        if let Ok((_text, stats)) = file_reader.read_file_text(path).await {
                            total_bytes += stats.bytes_read;
                        }
                    }
                    black_box(total_bytes)
                })
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_discovery, bench_reading);
criterion_main!(benches);

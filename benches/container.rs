//! Criterion benchmarks for the paged archive container: page-table
//! serialize/parse round trips and compaction throughput.
//!
//! Run with:
//!   cargo bench --bench container

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pfar::{CompressionKind, Container, OpenMode, PageFormat, PageKind};
use tempfile::NamedTempFile;

fn build_archive(num_pages: usize, page_size: usize) -> NamedTempFile {
    let tmp = NamedTempFile::new().unwrap();
    let mut c = Container::open(tmp.path(), OpenMode::Create).unwrap();
    let content = vec![0xABu8; page_size];
    for id in 0..num_pages as u32 {
        c.append_page(
            id,
            format!("page-{id}"),
            PageFormat::new(PageKind::File, CompressionKind::Plain),
            &content,
        )
        .unwrap();
    }
    c.close(true).unwrap();
    tmp
}

fn bench_open_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("container_open_parse_trailer");
    for &num_pages in &[16usize, 256] {
        let archive = build_archive(num_pages, 256);
        group.throughput(Throughput::Elements(num_pages as u64));
        group.bench_with_input(
            BenchmarkId::new("open_readonly", num_pages),
            &archive,
            |b, archive| {
                b.iter(|| {
                    let container = Container::open(archive.path(), OpenMode::ReadOnly).unwrap();
                    container.close(false).unwrap();
                })
            },
        );
    }
    group.finish();
}

fn bench_compaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("container_remove_pages_compaction");
    for &num_pages in &[64usize, 512] {
        group.throughput(Throughput::Elements(num_pages as u64));
        group.bench_with_input(
            BenchmarkId::new("remove_half", num_pages),
            &num_pages,
            |b, &num_pages| {
                b.iter_batched(
                    || build_archive(num_pages, 512),
                    |archive| {
                        let mut container =
                            Container::open(archive.path(), OpenMode::ReadWrite).unwrap();
                        let to_delete: Vec<u32> = (0..num_pages as u32).step_by(2).collect();
                        container.remove_pages(&to_delete).unwrap();
                        container.close(true).unwrap();
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_open_parse, bench_compaction);
criterion_main!(benches);

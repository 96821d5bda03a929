//! Benchmarks for Markdown link resolution and rendering.


use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdown");
    let ctx = fixtures::xwiki();

    for links in [10, 100, 1000] {
        let md = fixtures::markdown_with_links(links);
        group.throughput(Throughput::Bytes(md.len() as u64));

        group.bench_with_input(BenchmarkId::new("render", links), &md, |b, md| {
            b.iter(|| cristal::markdown::render(&ctx, black_box(md)));
        });

        group.bench_with_input(BenchmarkId::new("resolve_links", links), &md, |b, md| {
            b.iter(|| cristal::markdown::resolve_links(&ctx, black_box(md)));
        });
    }

    group.finish();
}

fn bench_breadcrumbs(c: &mut Criterion) {
    let ctx = fixtures::xwiki();
    let refs: Vec<_> = fixtures::xwiki_references()
        .iter()
        .filter_map(|r| ctx.parse_reference(r, None))
        .collect();

    c.bench_function("breadcrumbs", |b| {
        b.iter(|| {
            for r in &refs {
                black_box(cristal::hierarchy(&ctx, black_box(r)));
            }
        });
    });
}

criterion_group!(benches, bench_render, bench_breadcrumbs);
criterion_main!(benches);

//! Benchmark for the three generators.
//!
//! Run with: cargo bench --package atlas_procedural --bench generation_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use atlas_procedural::{BlockCoord, ChunkCoord, Generators, SectorCoord, WorldSeed};

fn benchmark_sector(c: &mut Criterion) {
    let gens = Generators::with_seed(WorldSeed::new(42));

    c.bench_function("generate_sector", |b| {
        b.iter(|| black_box(gens.world().generate_sector(black_box(SectorCoord::new(7, 9)))));
    });

    c.bench_function("summarize_world", |b| {
        b.iter(|| black_box(gens.world().summarize()));
    });
}

fn benchmark_block(c: &mut Criterion) {
    let gens = Generators::with_seed(WorldSeed::new(42));
    let coord = BlockCoord::new(115, 150);
    let Ok(sector) = gens.sector(coord.sector()) else {
        return;
    };

    c.bench_function("generate_block", |b| {
        b.iter(|| black_box(gens.regional().generate_block(&sector, black_box(coord))));
    });
}

fn benchmark_chunk(c: &mut Criterion) {
    let gens = Generators::with_seed(WorldSeed::new(42));
    let coord = ChunkCoord::new(3_700, 4_810);
    let Ok(block) = gens.block(coord.block()) else {
        return;
    };

    let mut group = c.benchmark_group("chunk_generation");
    group.sample_size(50);
    group.bench_function("generate_chunk", |b| {
        b.iter(|| black_box(gens.local().generate_chunk(&block, black_box(coord))));
    });
    group.bench_function("detect_clusters", |b| {
        b.iter(|| black_box(gens.local().cluster_field().detect(black_box(coord))));
    });
    group.finish();
}

criterion_group!(benches, benchmark_sector, benchmark_block, benchmark_chunk);
criterion_main!(benches);

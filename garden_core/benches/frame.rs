// Frame-loop benchmarks: painting a full garden and planting into one.

use criterion::{Criterion, criterion_group, criterion_main};
use garden_core::render::DrawList;
use garden_core::{GardenConfig, GardenSession, SvgSurface};
use std::hint::black_box;

const T0: u64 = 1_700_000_000_000;

fn full_session() -> GardenSession {
    let mut session = GardenSession::new(GardenConfig::default(), 7, (1920.0, 1080.0), T0)
        .expect("default config is valid");
    let lines = [
        "I am so happy today!",
        "this is terrible and I hate it",
        "quiet calm evening by the water",
        "I miss you and feel alone",
        "wow what a surprise",
    ];
    for i in 0..700u64 {
        session.hear(lines[i as usize % lines.len()], 0.9, T0 + i);
    }
    session.advance(T0 + 700);
    session
}

fn bench_render(c: &mut Criterion) {
    let mut session = full_session();
    let mut list = DrawList::new();
    let mut now = T0 + 1_000;
    c.bench_function("render_700_plants", |b| {
        b.iter(|| {
            list.clear();
            now += 16;
            black_box(session.render_frame(now, &mut list));
        })
    });

    c.bench_function("snapshot_svg_700_plants", |b| {
        b.iter(|| black_box(session.snapshot_svg()))
    });

    let mut svg = SvgSurface::new();
    c.bench_function("render_700_plants_svg", |b| {
        b.iter(|| {
            now += 16;
            black_box(session.render_frame(now, &mut svg));
        })
    });
}

fn bench_sprout(c: &mut Criterion) {
    let mut session = full_session();
    let mut now = T0 + 10_000;
    c.bench_function("hear_into_full_garden", |b| {
        b.iter(|| {
            now += 1;
            black_box(session.hear("a long rambling sentence about the weather today", 0.8, now));
        })
    });
}

criterion_group!(benches, bench_render, bench_sprout);
criterion_main!(benches);

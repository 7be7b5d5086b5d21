use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fleetgrid::{Entry, Grid, Location, PositionRecord, closest_linear};
use std::time::{Duration, UNIX_EPOCH};

// Deterministic scatter over a continent-sized area.
fn scatter(n: usize) -> Vec<Location> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let lat = ((state >> 33) % 20_000) as f64 / 1000.0 + 30.0;
            let lon = ((state >> 13) % 30_000) as f64 / 1000.0 - 10.0;
            Location::new(lat, lon)
        })
        .collect()
}

fn build_grid(points: &[Location]) -> Grid<usize> {
    let mut grid = Grid::new();
    for (i, &location) in points.iter().enumerate() {
        grid.add(i, location).unwrap();
    }
    grid
}

fn benchmark_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_insert");

    for size in [1_000, 10_000, 100_000] {
        let points = scatter(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| build_grid(black_box(points)))
        });
    }

    group.finish();
}

fn benchmark_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("closest");

    let points = scatter(100_000);
    let mut grid = build_grid(&points);
    let entries: Vec<Entry<usize>> = grid.iter().cloned().collect();
    let queries = scatter(64);

    group.bench_function("find_closest", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(grid.find_closest(black_box(*query)));
            }
        })
    });

    group.bench_function("find_closest_exact", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(grid.find_closest_exact(black_box(*query)));
            }
        })
    });

    group.bench_function("closest_linear", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(closest_linear(&entries, black_box(query)));
            }
        })
    });

    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let record = PositionRecord::new(
        42,
        "AB-123-CD",
        Location::new(34.5, -118.25),
        UNIX_EPOCH + Duration::from_secs(1_600_000_000),
    );
    let bytes = record.encode().unwrap();

    c.bench_function("record_decode", |b| {
        b.iter(|| PositionRecord::decode(black_box(&bytes)).unwrap())
    });
}

criterion_group!(benches, benchmark_insert, benchmark_queries, benchmark_decode);
criterion_main!(benches);

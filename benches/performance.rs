// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use meshbool::geometry::{Primitive, SphereSource};
use meshbool::{combine, repair, BooleanOp, RepairOptions};
use nalgebra::{Point3, Vector3};

fn bench_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("sphere");

    for resolution in [8u32, 32, 64] {
        group.bench_with_input(
            BenchmarkId::from_parameter(resolution),
            &resolution,
            |b, &resolution| {
                b.iter(|| {
                    SphereSource::new(Point3::origin(), black_box(1.0))
                        .with_resolution(resolution, resolution)
                        .to_mesh()
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_boolean_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("boolean_ops");

    let cube = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true)
        .to_mesh()
        .unwrap();
    // Poking through one face so every operation has to split
    let sphere = SphereSource::new(Point3::new(1.0, 0.0, 0.0), 0.8)
        .to_mesh()
        .unwrap();

    for op in BooleanOp::ALL {
        group.bench_function(op.name(), |b| {
            b.iter(|| combine(black_box(&cube), black_box(&sphere), op).unwrap());
        });
    }

    group.finish();
}

fn bench_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair");

    let mut open = SphereSource::new(Point3::origin(), 1.0)
        .with_resolution(32, 32)
        .to_mesh()
        .unwrap();
    open.triangles.retain(|t| !t.indices.contains(&0));

    group.bench_function("fill_holes", |b| {
        b.iter(|| repair(black_box(&open), &RepairOptions::default()).unwrap());
    });

    let cleaning = RepairOptions {
        clean: true,
        ..RepairOptions::default()
    };
    group.bench_function("fill_and_clean", |b| {
        b.iter(|| repair(black_box(&open), &cleaning).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_sphere, bench_boolean_ops, bench_repair);
criterion_main!(benches);

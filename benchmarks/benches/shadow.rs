//! Shadow projection benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench shadow
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench shadow -- classify

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::Vec3;
use std::hint::black_box;
use umbra::{
    calculate_shadow_projection, BoundingBox, BoundingSphere, CascadeConfig, CascadeManager,
    DirectionalLight, Frustum, ShadowCasterSet, ShadowProjectionMode, ShadowProjectionParameters,
    Viewer,
};
use umbra_bench::*;

fn light_direction() -> Vec3 {
    Vec3::new(-0.4, 0.3, -1.0).normalize()
}

// ---------------------------------------------------------------------------
// Culling
// ---------------------------------------------------------------------------

fn bench_culling(c: &mut Criterion) {
    let camera = default_camera();
    let frustum = Frustum::from_view_projection(camera.view_projection_matrix());
    let mut group = c.benchmark_group("culling");

    let visible = BoundingBox::new(Vec3::new(20.0, -1.0, 0.0), Vec3::new(22.0, 1.0, 3.0));
    group.bench_function("test_box", |b| {
        b.iter(|| frustum.test_box(black_box(&visible)));
    });

    let above = BoundingSphere::new(Vec3::new(30.0, 0.0, 80.0), 2.0);
    group.bench_function("test_swept_sphere", |b| {
        b.iter(|| frustum.test_swept_sphere(black_box(&above), light_direction()));
    });

    group.bench_function("from_view_projection", |b| {
        b.iter(|| Frustum::from_view_projection(black_box(camera.view_projection_matrix())));
    });
    group.finish();
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

fn bench_classify(c: &mut Criterion) {
    let camera = default_camera();
    let mut group = c.benchmark_group("classify");
    for &n in &[100, 1000, 5000] {
        let meshes = setup_city(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| ShadowCasterSet::classify(&camera, light_direction(), black_box(&meshes)));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Projection modes
// ---------------------------------------------------------------------------

fn bench_modes(c: &mut Criterion) {
    let camera = default_camera();
    let meshes = setup_city(1000);
    let mut group = c.benchmark_group("projection");
    for mode in [
        ShadowProjectionMode::Uniform,
        ShadowProjectionMode::Psm,
        ShadowProjectionMode::Lspsm,
        ShadowProjectionMode::Tsm,
    ] {
        group.bench_function(format!("{mode:?}"), |b| {
            let mut params = ShadowProjectionParameters::default();
            b.iter(|| {
                calculate_shadow_projection(
                    mode,
                    light_direction(),
                    &camera,
                    black_box(&meshes),
                    &mut params,
                )
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Cascades
// ---------------------------------------------------------------------------

fn bench_cascades(c: &mut Criterion) {
    let camera = default_camera();
    let light = DirectionalLight::from_direction(light_direction());
    let mut group = c.benchmark_group("cascades");
    for &splits in &[1, 4, 8] {
        let manager = CascadeManager::new(CascadeConfig::new(splits, 0.5, 10.0));
        group.bench_with_input(BenchmarkId::from_parameter(splits), &splits, |b, _| {
            b.iter(|| manager.cascade_shadow_map_data(black_box(&camera), &light));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_culling,
    bench_classify,
    bench_modes,
    bench_cascades
);
criterion_main!(benches);

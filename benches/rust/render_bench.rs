//! Rendering Benchmarks
//!
//! Throughput of the stages a draw call runs through: expansion of the surface
//! and its gradient, root isolation along single rays, and whole frames with
//! and without adaptive supersampling.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use algesurf::poly::{RowSubstitutor, UnivariatePolynomial, expand};
use algesurf::roots::{ClosedFormRootFinder, DescartesRootFinder, RealRootFinder};
use algesurf::{AntiAliasingPattern, RenderConfig, Renderer, Scene, Var, parameters, parse};

const TORUS: &str = "(x^2+y^2+z^2+R^2-r^2)^2-4*R^2*(x^2+y^2)";
const SEXTIC: &str = "(x^2+y^2+z^2+R^2-r^2)^3-4*R^2*(x^2+y^2)*(x^2+y^2+z^2)";

// =============================================================================
// Symbolic stages
// =============================================================================

fn bench_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expansion");
    let bindings = parameters([("R", 0.6), ("r", 0.25)]);

    for (name, source) in [("torus", TORUS), ("sextic", SEXTIC)] {
        let surface = parse(source).unwrap();
        group.bench_function(format!("{}/surface", name), |b| {
            b.iter(|| expand(black_box(&surface), black_box(&bindings)))
        });
        group.bench_function(format!("{}/gradient", name), |b| {
            b.iter(|| Var::ALL.map(|v| expand(&black_box(&surface).derive(v), &bindings)))
        });

        let expanded = expand(&surface, &bindings).unwrap();
        let camera = algesurf::geometry::Camera::default();
        let rc = algesurf::geometry::RayCreator::new(
            &camera,
            glam::DMat4::IDENTITY,
            glam::DMat4::IDENTITY,
            256,
            256,
        );
        let rows = RowSubstitutor::new(&expanded, &rc.ray_components());
        group.bench_function(format!("{}/row_column", name), |b| {
            b.iter(|| rows.for_row(black_box(0.1)).for_column(black_box(0.3)))
        });
    }
    group.finish();
}

// =============================================================================
// Root isolation
// =============================================================================

fn bench_roots(c: &mut Criterion) {
    let mut group = c.benchmark_group("roots");
    let quadratic = UnivariatePolynomial::from_roots(&[1.5, 2.75]);
    let quartic = UnivariatePolynomial::from_roots(&[0.4, 1.1, 2.3, 2.9]);
    let sextic = UnivariatePolynomial::from_roots(&[-1.0, 0.4, 1.1, 2.3, 2.9, 4.0]);

    group.bench_function("closed_form/quadratic", |b| {
        b.iter(|| ClosedFormRootFinder.find_first_root_in(black_box(&quadratic), 0.0, 5.0))
    });
    group.bench_function("closed_form/quartic", |b| {
        b.iter(|| ClosedFormRootFinder.find_all_roots(black_box(&quartic)))
    });
    let descartes = DescartesRootFinder::default();
    group.bench_function("descartes/quartic", |b| {
        b.iter(|| descartes.find_all_roots_in(black_box(&quartic), 0.0, 5.0))
    });
    group.bench_function("descartes/sextic", |b| {
        b.iter(|| descartes.find_all_roots_in(black_box(&sextic), 0.0, 5.0))
    });
    group.finish();
}

// =============================================================================
// Whole frames
// =============================================================================

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("frames");
    group.sample_size(10);

    let (w, h) = (160u32, 120u32);
    let mut buffer = vec![0u8; (w * h * 3) as usize];
    for pattern in [
        AntiAliasingPattern::OrderedGrid1x1,
        AntiAliasingPattern::OrderedGrid2x2,
        AntiAliasingPattern::OrderedGrid4x4,
    ] {
        let scene = Scene::new(parse(TORUS).unwrap())
            .with_parameter("R", 0.6)
            .with_parameter("r", 0.25);
        let renderer = Renderer::new(scene, RenderConfig::new().with_pattern(pattern)).unwrap();
        group.bench_function(format!("torus_160x120/{:?}", pattern), |b| {
            b.iter(|| renderer.draw(black_box(&mut buffer), w, h))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_expansion, bench_roots, bench_frames);
criterion_main!(benches);

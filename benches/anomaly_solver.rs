use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use starwatch::orbit::anomaly::solve;
use starwatch::OrbitElements;

const SAMPLES: usize = 10_000;

/// Elliptic orbits with e in [0, 0.9] at random times within one period
fn bench_elliptic(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xDEADBEEF);

    c.bench_function("anomaly/elliptic_e<=0.9", |b| {
        b.iter_batched(
            || {
                (0..SAMPLES)
                    .filter_map(|_| {
                        let e = rng.gen_range(0.0..=0.9);
                        let el = OrbitElements::elliptic(0.0, 2.5, e, 0.1, 0.2, 0.3, 0.0).ok()?;
                        let t = rng.gen::<f64>() * el.period()?;
                        Some((el, t))
                    })
                    .collect::<Vec<_>>()
            },
            |cases| {
                for (el, t) in cases {
                    black_box(solve(&el, black_box(t)).ok());
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// Near-parabolic ellipses routed to the universal variable near perihelion
fn bench_escape_hatch(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xBADF00D);

    c.bench_function("anomaly/escape_hatch_e>0.975", |b| {
        b.iter_batched(
            || {
                (0..SAMPLES)
                    .filter_map(|_| {
                        let e = rng.gen_range(0.976..0.999);
                        let q = rng.gen_range(0.3..3.0);
                        let el =
                            OrbitElements::elliptic(0.0, q / (1.0 - e), e, 0.0, 0.0, 0.0, 0.0)
                                .ok()?;
                        let t = rng.gen_range(-0.25..0.25) / el.mean_motion;
                        Some((el, t))
                    })
                    .collect::<Vec<_>>()
            },
            |cases| {
                for (el, t) in cases {
                    black_box(solve(&el, black_box(t)).ok());
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// Parabolic and hyperbolic comets within a year of perihelion
fn bench_open_orbits(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);

    c.bench_function("anomaly/parabolic_and_hyperbolic", |b| {
        b.iter_batched(
            || {
                (0..SAMPLES)
                    .filter_map(|i| {
                        let q = rng.gen_range(0.3..3.0);
                        let el = if i % 2 == 0 {
                            OrbitElements::parabolic(0.0, q, 0.0, 0.0, 0.0).ok()?
                        } else {
                            let e = rng.gen_range(1.0001..1.05);
                            OrbitElements::hyperbolic(0.0, q, e, 0.0, 0.0, 0.0).ok()?
                        };
                        Some((el, rng.gen_range(-365.0..365.0)))
                    })
                    .collect::<Vec<_>>()
            },
            |cases| {
                for (el, t) in cases {
                    black_box(solve(&el, black_box(t)).ok());
                }
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_elliptic, bench_escape_hatch, bench_open_orbits);
criterion_main!(benches);

//! Criterion benchmarks for the local-search optimizer.
//!
//! Measures optimization time for 20 and 50 stops so regressions in the
//! seed or the 2-opt loop show up early.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package wayfarer-solver-local
//! ```

#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use std::time::Duration;

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use geo::Coord;
use wayfarer_core::{
    CancellationToken, ModeSelection, OptimizationPreference, OptimizeRequest, Optimizer,
};
use wayfarer_solver_local::LocalSearchOptimizer;


use bench_support::{BENCHMARK_SEED, generate_clustered_stops};

/// Stop counts to benchmark.
const PROBLEM_SIZES: &[usize] = &[20, 50];

fn build_request(size: usize, preference: OptimizationPreference) -> Option<OptimizeRequest> {
    let start_time = NaiveDate::from_ymd_opt(2025, 5, 1)?.and_hms_opt(9, 0, 0)?;
    Some(OptimizeRequest {
        locations: generate_clustered_stops(size, BENCHMARK_SEED),
        start: Coord { x: 0.025, y: 0.025 },
        start_time,
        modes: ModeSelection::ByDistance,
        preference,
        budget: 500.0,
    })
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    group.sample_size(30);
    group.measurement_time(Duration::from_secs(10));

    let optimizer = LocalSearchOptimizer::default();
    for &size in PROBLEM_SIZES {
        for preference in [
            OptimizationPreference::TimeEfficient,
            OptimizationPreference::Balanced,
        ] {
            let Some(request) = build_request(size, preference) else {
                continue;
            };
            let stops = u64::try_from(size).unwrap_or(u64::MAX);
            group.throughput(Throughput::Elements(stops));
            group.bench_with_input(
                BenchmarkId::new(format!("{preference:?}"), size),
                &request,
                |b, req| {
                    b.iter(|| {
                        #[expect(
                            clippy::let_underscore_must_use,
                            reason = "Benchmarking optimization, result is intentionally discarded"
                        )]
                        let _ = optimizer.optimize(req, &CancellationToken::new());
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_optimize);
criterion_main!(benches);

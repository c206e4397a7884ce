//! Benchmarks for the SARIMA order search and the stationarity search.

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use realty_forecast::core::TimeSeries;
use realty_forecast::models::{Forecaster, GridSearchConfig, Sarima, SarimaGridSearch, SarimaOrder};
use realty_forecast::validation::{StationaritySearch, StationaritySearchConfig};

fn generate_prices(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            150_000.0
                + 600.0 * t
                + 1500.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin()
                + 300.0 * (t * 1.7).sin()
        })
        .collect()
}

fn make_series(n: usize) -> TimeSeries {
    let start = Utc.with_ymd_and_hms(2009, 1, 1, 0, 0, 0).unwrap();
    TimeSeries::monthly(start, generate_prices(n)).unwrap()
}

fn bench_sarima_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("sarima_fit");

    for size in [60, 120, 240].iter() {
        let series = make_series(*size);
        group.bench_with_input(BenchmarkId::new("(1,1,1)x(1,1,1,12)", size), size, |b, _| {
            b.iter(|| {
                let mut model =
                    Sarima::new(SarimaOrder::new(1, 1, 1).with_seasonal(1, 1, 1, 12));
                model.fit(black_box(&series))
            })
        });
    }

    group.finish();
}

fn bench_grid_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_search");
    group.sample_size(10);
    let series = make_series(112);

    for parallel in [false, true] {
        let search =
            SarimaGridSearch::new(GridSearchConfig::default().with_parallel(parallel)).unwrap();
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_function(label, |b| b.iter(|| search.run(black_box(&series))));
    }

    group.finish();
}

fn bench_stationarity_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("stationarity_search");
    let search = StationaritySearch::new(StationaritySearchConfig::default()).unwrap();

    for size in [60, 120, 240].iter() {
        let values = generate_prices(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| search.run(black_box(&values)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sarima_fit,
    bench_grid_search,
    bench_stationarity_search
);
criterion_main!(benches);

//! Analyse a small synthetic panel of regional house prices.
//!
//! Run with `RUST_LOG=realty_forecast=debug cargo run --example housing_forecast`
//! to see every candidate transform and fitted order.

use chrono::{TimeZone, Utc};
use realty_forecast::inference::{
    bonferroni_alpha, bootstrap_means, cohen_d, compare_groups, levene_test, normality_test,
    BootstrapConfig,
};
use realty_forecast::prelude::*;
use realty_forecast::regional::{top_growth_regions, DEFAULT_SPARSE_THRESHOLD};
use realty_forecast::validation::stationarity::ROLLING_WINDOW;
use realty_forecast::validation::stationarity_check;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn synthetic_region(base: f64, monthly_growth: f64, phase: f64) -> Result<TimeSeries> {
    let start = Utc
        .with_ymd_and_hms(2009, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AnalysisError::TimestampError("invalid start date".to_string()))?;
    let values = (0..112)
        .map(|i| {
            let t = i as f64;
            base + monthly_growth * t
                + 0.01 * base * (2.0 * std::f64::consts::PI * t / 12.0 + phase).sin()
                + 0.002 * base * (t * 2.3 + phase).cos()
        })
        .collect();
    TimeSeries::monthly(start, values)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "realty_forecast=info".into()),
        )
        .init();

    let mut panel = RegionPanel::new();
    panel.insert("Austin_78704", synthetic_region(250_000.0, 1_400.0, 0.0)?);
    panel.insert("Boise_83702", synthetic_region(180_000.0, 1_100.0, 1.0)?);
    panel.insert("Dayton_45402", synthetic_region(90_000.0, 150.0, 2.0)?);
    let panel = panel.without_sparse(DEFAULT_SPARSE_THRESHOLD)?;

    let table = panel.growth_table();
    for row in &table {
        println!(
            "{:<14} total {:>6.1}%  5yr {:>6.1}%  3yr {:>6.1}%  1yr {:>6.1}%",
            row.region,
            row.rates.total * 100.0,
            row.rates.five_year * 100.0,
            row.rates.three_year * 100.0,
            row.rates.one_year * 100.0
        );
    }
    let top = top_growth_regions(&table, 2);
    println!("Top growth regions: {:?}\n", top);

    let dayton = panel.require("Dayton_45402")?;
    let check = stationarity_check(dayton.values(), ROLLING_WINDOW)?;
    println!(
        "Dayton_45402 rolling mean drift {:.0} over {}-month windows",
        check.mean_drift().unwrap_or(0.0),
        check.window
    );
    println!("{}\n", check.adf);

    for (region, avg) in panel.average_yoy_change() {
        println!("{:<14} average YoY change {:.2}%", region, avg * 100.0);
    }
    println!();

    let config = PipelineConfig::default()
        .with_grid(GridSearchConfig::default().with_parallel(true))
        .with_investment(1.0e7);
    let pipeline = Pipeline::new(config)?;
    for summary in pipeline.run_panel(&panel) {
        println!("{}\n", summary);
    }

    // Compare recent prices of the two fastest-growing regions
    let recent = |name: &str| -> Result<Vec<f64>> {
        let series = panel.require(name)?;
        Ok(series.values()[series.len() - 24..].to_vec())
    };
    let austin = recent("Austin_78704")?;
    let boise = recent("Boise_83702")?;

    println!("{}", compare_groups(&[&austin, &boise])?);
    let sampling = BootstrapConfig::new(200).with_seed(42);
    let austin_means = bootstrap_means(&austin, &sampling)?;
    let boise_means = bootstrap_means(&boise, &sampling)?;

    let alpha = bonferroni_alpha(0.05, 2)?;
    println!("normality (Austin means): {}", normality_test(&austin_means)?.decision(alpha));
    println!("equal variances: {}", levene_test(&[&austin_means, &boise_means])?.decision(alpha));
    println!("Cohen's d: {:.2}", cohen_d(&austin_means, &boise_means)?);

    Ok(())
}

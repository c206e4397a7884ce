//! End-to-end analysis of one regional price series.
//!
//! Stationarity diagnostics, order search, a fit of the selected order,
//! growth along the forecast and the return on an investment.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::core::{MissingValuePolicy, TimeSeries};
use crate::error::{AnalysisError, Result};
use crate::models::{
    Coefficient, GridSearchConfig, GridSearchOutcome, SarimaGridSearch, SarimaOrder,
};
use crate::projection::{expected_growth, ForecastConfig, GrowthEstimate, RoiProjection};
use crate::regional::RegionPanel;
use crate::validation::{StationarityReport, StationaritySearch, StationaritySearchConfig};

/// Configuration for [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run the stationarity search first; `None` skips it.
    pub stationarity: Option<StationaritySearchConfig>,
    pub grid: GridSearchConfig,
    pub forecast: ForecastConfig,
    /// Amount invested at the current price.
    pub investment: f64,
    /// How missing observations are handled before fitting.
    pub missing_values: MissingValuePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stationarity: Some(StationaritySearchConfig::default()),
            grid: GridSearchConfig::default(),
            forecast: ForecastConfig::default(),
            investment: 1.0e7,
            missing_values: MissingValuePolicy::Drop,
        }
    }
}

impl PipelineConfig {
    pub fn with_stationarity(mut self, config: Option<StationaritySearchConfig>) -> Self {
        self.stationarity = config;
        self
    }

    pub fn with_grid(mut self, grid: GridSearchConfig) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_forecast(mut self, forecast: ForecastConfig) -> Self {
        self.forecast = forecast;
        self
    }

    pub fn with_investment(mut self, investment: f64) -> Self {
        self.investment = investment;
        self
    }

    pub fn with_missing_values(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_values = policy;
        self
    }
}

/// Everything the pipeline learned about one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub name: String,
    pub stationarity: Option<StationarityReport>,
    pub search: GridSearchOutcome,
    pub order: SarimaOrder,
    pub coefficients: Vec<Coefficient>,
    pub aic: f64,
    pub growth: GrowthEstimate,
    pub roi: RoiProjection,
}

impl fmt::Display for AnalysisSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.name)?;
        if let Some(report) = &self.stationarity {
            write!(f, "{}", report)?;
        }
        writeln!(
            f,
            "Selected {} with AIC {:.2} ({} of {} orders fitted)",
            self.order,
            self.aic,
            self.search.fitted().count(),
            self.search.attempted()
        )?;
        for c in &self.coefficients {
            writeln!(f, "  {:<10} {:>12.4} (p = {:.4})", c.name, c.value, c.p_value)?;
        }
        writeln!(f, "{}", self.growth.describe(&self.name))?;
        write!(f, "{}", self.roi)
    }
}

/// Runs the full analysis with one configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    search: SarimaGridSearch,
    stationarity: Option<StationaritySearch>,
}

impl Pipeline {
    /// Validate the configuration and build the pipeline.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.forecast.validate()?;
        if !(config.investment.is_finite() && config.investment >= 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "investment must be finite and non-negative, got {}",
                config.investment
            )));
        }
        let search = SarimaGridSearch::new(config.grid.clone())?;
        let stationarity = config
            .stationarity
            .clone()
            .map(StationaritySearch::new)
            .transpose()?;

        Ok(Self {
            config,
            search,
            stationarity,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyse `series` under the label `name`.
    pub fn run(&self, name: &str, series: &TimeSeries) -> Result<AnalysisSummary> {
        let span = info_span!("pipeline", region = name);
        let _guard = span.enter();

        let series = series.sanitized(self.config.missing_values)?;
        if series.is_empty() {
            return Err(AnalysisError::EmptyData);
        }

        let stationarity = match &self.stationarity {
            Some(search) => match search.run(series.values()) {
                Ok(report) => Some(report),
                Err(err) => {
                    warn!(error = %err, "stationarity search failed");
                    None
                }
            },
            None => None,
        };

        let (outcome, model) = self.search.fit_best(&series)?;
        let aic = model.aic().unwrap_or(outcome.best_aic);
        let coefficients = model.coefficients().map(<[_]>::to_vec).unwrap_or_default();

        let growth = expected_growth(
            &model,
            self.config.forecast.horizon,
            self.config.forecast.alpha,
        )?;
        let roi = RoiProjection::from_series(growth.projection, self.config.investment, &series)?;

        info!(
            order = %outcome.best_order,
            aic,
            mean_growth = growth.projection.mean,
            mean_return = roi.mean_return,
            "analysis complete"
        );

        Ok(AnalysisSummary {
            name: name.to_string(),
            stationarity,
            order: outcome.best_order,
            search: outcome,
            coefficients,
            aic,
            growth,
            roi,
        })
    }

    /// Analyse every region of a panel, skipping regions that fail.
    pub fn run_panel(&self, panel: &RegionPanel) -> Vec<AnalysisSummary> {
        panel
            .iter()
            .filter_map(|(name, series)| match self.run(name, series) {
                Ok(summary) => Some(summary),
                Err(err) => {
                    warn!(region = name, error = %err, "skipping region");
                    None
                }
            })
            .collect()
    }
}

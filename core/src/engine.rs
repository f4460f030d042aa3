use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::warn;

use crate::aggregate::{self, Granularity, GroupBy, SortOrder};
use crate::calculator::Calculator;
use crate::catalog::EmissionFactorCatalog;
use crate::config::EngineConfig;
use crate::electricity::ElectricityCalculator;
use crate::error::EngineResult;
use crate::forecast;
use crate::metrics::Metrics;
use crate::period::Period;
use crate::storage;
use crate::transport::{ModeOption, TransportCalculator};
use crate::types::{
    CalcRequest, CalculationResult, ElectricityInput, GroupStat, StatsSummary, TimeSeriesPoint, TransportInput,
    TrendForecast, WasteInput,
};
use crate::waste::WasteCalculator;

/// Entry point for the boundary layer: one read-only catalog, the three
/// calculators over it, analytics, and the counters.
#[derive(Debug)]
pub struct Engine {
    catalog: EmissionFactorCatalog,
    config: EngineConfig,
    metrics: Option<Metrics>,
}

impl Engine {
    pub fn with_catalog(catalog: EmissionFactorCatalog, config: EngineConfig) -> Result<Self> {
        let metrics = if config.metrics_enabled {
            Some(Metrics::new().context("registering engine metrics")?)
        } else {
            None
        };
        Ok(Self { catalog, config, metrics })
    }

    /// Loads catalog/appliance files named by the config.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let catalog = storage::catalog_from_config(&config)?;
        Self::with_catalog(catalog, config)
    }

    pub fn builtin() -> Result<Self> {
        Self::with_catalog(EmissionFactorCatalog::builtin(), EngineConfig::default())
    }

    pub fn catalog(&self) -> &EmissionFactorCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }

    pub fn electricity(&self) -> ElectricityCalculator<'_> {
        ElectricityCalculator::new(&self.catalog)
    }

    pub fn transport(&self) -> TransportCalculator<'_> {
        TransportCalculator::new(&self.catalog)
    }

    pub fn waste(&self) -> WasteCalculator<'_> {
        WasteCalculator::new(&self.catalog)
    }

    fn observe<T>(&self, outcome: EngineResult<T>, on_ok: impl FnOnce(&Metrics, &T)) -> EngineResult<T> {
        match (&outcome, &self.metrics) {
            (Ok(v), Some(m)) => on_ok(m, v),
            (Err(e), metrics) => {
                warn!("engine request failed ({}): {}", e.kind(), e);
                if let Some(m) = metrics {
                    m.observe_failure(e);
                }
            }
            _ => {}
        }
        outcome
    }

    fn run<C: Calculator>(&self, calculator: C, request: &CalcRequest<C::Input>) -> EngineResult<CalculationResult> {
        self.observe(calculator.compute(request), |m, r| m.observe_result(r))
    }

    pub fn calculate_electricity(&self, request: &CalcRequest<ElectricityInput>) -> EngineResult<CalculationResult> {
        self.run(self.electricity(), request)
    }

    pub fn calculate_transport(&self, request: &CalcRequest<TransportInput>) -> EngineResult<CalculationResult> {
        self.run(self.transport(), request)
    }

    pub fn calculate_waste(&self, request: &CalcRequest<WasteInput>) -> EngineResult<CalculationResult> {
        self.run(self.waste(), request)
    }

    pub fn transport_preview(&self, distance_km: f64, occupancy: Option<i64>) -> EngineResult<Vec<ModeOption>> {
        self.observe(self.transport().preview(distance_km, occupancy), |_, _| {})
    }

    pub fn aggregate(&self, results: &[CalculationResult], group_by: GroupBy, sort: SortOrder) -> Vec<GroupStat> {
        aggregate::aggregate(results, group_by, sort)
    }

    pub fn time_series(&self, results: &[CalculationResult], granularity: Granularity) -> Vec<TimeSeriesPoint> {
        aggregate::time_series(results, granularity)
    }

    pub fn summary(&self, results: &[CalculationResult], reference: Period, now: DateTime<Utc>) -> StatsSummary {
        aggregate::summary(results, reference, now)
    }

    /// Falls back to the configured horizon when none is given.
    pub fn forecast(&self, history: &[TimeSeriesPoint], horizon: Option<u32>) -> EngineResult<TrendForecast> {
        let horizon = horizon.unwrap_or(self.config.default_horizon);
        self.observe(forecast::forecast(history, horizon), |m, _| m.observe_forecast())
    }
}

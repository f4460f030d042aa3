use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::CalcError;
use crate::types::{CalculationResult, Category};

/// Engine counters on a private registry; the host decides where to expose them.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    calculations: IntCounterVec,
    failures: IntCounterVec,
    credits: IntCounter,
    forecasts: IntCounter,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let calculations = IntCounterVec::new(
            Opts::new("ecofootprint_calculations_total", "Accepted emission calculations"),
            &["category"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new("ecofootprint_calculation_failures_total", "Rejected engine requests"),
            &["kind"],
        )?;
        let credits = IntCounter::new(
            "ecofootprint_carbon_credits_total",
            "Calculations with a net negative result",
        )?;
        let forecasts = IntCounter::new("ecofootprint_forecasts_total", "Trend forecasts produced")?;

        registry.register(Box::new(calculations.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(credits.clone()))?;
        registry.register(Box::new(forecasts.clone()))?;

        Ok(Self { registry, calculations, failures, credits, forecasts })
    }

    pub fn observe_result(&self, result: &CalculationResult) {
        self.calculations.with_label_values(&[result.category.as_str()]).inc();
        if result.is_credit() {
            self.credits.inc();
        }
    }

    pub fn observe_failure(&self, err: &CalcError) {
        self.failures.with_label_values(&[err.kind()]).inc();
    }

    pub fn observe_forecast(&self) {
        self.forecasts.inc();
    }

    pub fn calculations(&self, category: Category) -> u64 {
        self.calculations.with_label_values(&[category.as_str()]).get()
    }

    pub fn failures(&self, kind: &str) -> u64 {
        self.failures.with_label_values(&[kind]).get()
    }

    pub fn credits(&self) -> u64 {
        self.credits.get()
    }

    pub fn forecasts(&self) -> u64 {
        self.forecasts.get()
    }

    /// Prometheus text exposition of every counter.
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        if TextEncoder::new().encode(&self.registry.gather(), &mut buf).is_err() {
            return String::new();
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("credits", &self.credits.get())
            .field("forecasts", &self.forecasts.get())
            .finish()
    }
}

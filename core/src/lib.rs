//! Emission calculation engine and trend forecaster for the student carbon
//! footprint tracker.
//!
//! Calculators turn typed activity inputs into signed kgCO2e results using a
//! versioned, read-only factor catalog. Analytics group stored results and
//! fit a linear trend to them. Nothing here performs I/O except the explicit
//! start-up loaders in [`storage`].

pub mod aggregate;
pub mod calculator;
pub mod catalog;
pub mod config;
pub mod electricity;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod metrics;
pub mod models;
pub mod period;
pub mod presentation;
pub mod storage;
pub mod transport;
pub mod types;
pub mod waste;

#[cfg(feature = "python")]
mod py;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub use aggregate::{aggregate, summary, time_series, Granularity, GroupBy, SortOrder};
pub use calculator::Calculator;
pub use catalog::{EmissionFactorCatalog, FactorQuery};
pub use config::EngineConfig;
pub use electricity::ElectricityCalculator;
pub use engine::Engine;
pub use error::{CalcError, EngineResult};
pub use forecast::forecast;
pub use models::{ApplianceProfile, CatalogVersion, EmissionFactor};
pub use period::Period;
pub use storage::{load_config, save_config};
pub use transport::{ModeOption, TransportCalculator};
pub use types::*;
pub use waste::WasteCalculator;

// ──────────────────────────────────────────────────────────────────────────────
// JSON boundary: bodies in the HTTP layer's camelCase shape
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviewBody {
    #[serde(alias = "distance")]
    distance_km: f64,
    #[serde(default)]
    occupancy: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregateBody {
    results: Vec<CalculationResult>,
    group_by: GroupBy,
    #[serde(default)]
    sort: SortOrder,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastBody {
    history: Vec<TimeSeriesPoint>,
    #[serde(default, alias = "predictMonths")]
    horizon: Option<u32>,
}

fn parse<T: DeserializeOwned>(body: &str) -> EngineResult<T> {
    let mut de = serde_json::Deserializer::from_str(body);
    let value = serde_path_to_error::deserialize(&mut de)?;
    // only whitespace may follow the body
    de.end().map_err(|e| CalcError::Json { path: String::new(), message: e.to_string() })?;
    Ok(value)
}

fn to_json<T: Serialize>(value: &T) -> EngineResult<String> {
    serde_json::to_string(value).map_err(|e| CalcError::Json { path: String::new(), message: e.to_string() })
}

pub fn calculate_electricity_json(engine: &Engine, body: &str) -> EngineResult<String> {
    let request: CalcRequest<ElectricityInput> = parse(body)?;
    to_json(&engine.calculate_electricity(&request)?)
}

pub fn calculate_transport_json(engine: &Engine, body: &str) -> EngineResult<String> {
    let request: CalcRequest<TransportInput> = parse(body)?;
    to_json(&engine.calculate_transport(&request)?)
}

pub fn calculate_waste_json(engine: &Engine, body: &str) -> EngineResult<String> {
    let request: CalcRequest<WasteInput> = parse(body)?;
    to_json(&engine.calculate_waste(&request)?)
}

pub fn transport_preview_json(engine: &Engine, body: &str) -> EngineResult<String> {
    let body: PreviewBody = parse(body)?;
    to_json(&engine.transport_preview(body.distance_km, body.occupancy)?)
}

pub fn aggregate_json(engine: &Engine, body: &str) -> EngineResult<String> {
    let body: AggregateBody = parse(body)?;
    to_json(&engine.aggregate(&body.results, body.group_by, body.sort))
}

pub fn forecast_json(engine: &Engine, body: &str) -> EngineResult<String> {
    let body: ForecastBody = parse(body)?;
    to_json(&engine.forecast(&body.history, body.horizon)?)
}

/// Failure payload for the boundary layer: `{"ok": false, "error": kind, ...}`.
pub fn error_json(err: &CalcError) -> String {
    let mut out = json!({
        "ok": false,
        "error": err.kind(),
        "message": err.to_string(),
    });
    match err {
        CalcError::Validation { field, .. } => out["field"] = json!(field),
        CalcError::Json { path, .. } => out["path"] = json!(path),
        _ => {}
    }
    out.to_string()
}

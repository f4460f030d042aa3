use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CalcError;
use crate::period::Period;

// ──────────────────────────────────────────────────────────────────────────────
// Closed vocabularies
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electricity,
    Transport,
    Waste,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Electricity, Category::Transport, Category::Waste];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electricity => "electricity",
            Category::Transport => "transport",
            Category::Waste => "waste",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Walking,
    Bicycle,
    Metro,
    Bus,
    Motorcycle,
    Car,
    Plane,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::Bicycle => "bicycle",
            TransportMode::Metro => "metro",
            TransportMode::Bus => "bus",
            TransportMode::Motorcycle => "motorcycle",
            TransportMode::Car => "car",
            TransportMode::Plane => "plane",
        }
    }

    /// Modes whose trip emissions are shared between the people on board.
    pub fn shares_occupancy(&self) -> bool {
        matches!(self, TransportMode::Car | TransportMode::Bus)
    }

    pub fn requires_fuel(&self) -> bool {
        matches!(self, TransportMode::Car | TransportMode::Motorcycle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Gasoline,
    Diesel,
    Electric,
    Hybrid,
}

impl FuelType {
    pub const ALL: [FuelType; 4] = [FuelType::Gasoline, FuelType::Diesel, FuelType::Electric, FuelType::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Gasoline => "gasoline",
            FuelType::Diesel => "diesel",
            FuelType::Electric => "electric",
            FuelType::Hybrid => "hybrid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteType {
    Organic,
    Paper,
    Plastic,
    Glass,
    Metal,
    Other,
}

impl WasteType {
    pub const ALL: [WasteType; 6] = [
        WasteType::Organic,
        WasteType::Paper,
        WasteType::Plastic,
        WasteType::Glass,
        WasteType::Metal,
        WasteType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WasteType::Organic => "organic",
            WasteType::Paper => "paper",
            WasteType::Plastic => "plastic",
            WasteType::Glass => "glass",
            WasteType::Metal => "metal",
            WasteType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisposalMethod {
    Mixed,
    Recycling,
    Composting,
    Landfill,
}

impl DisposalMethod {
    pub const ALL: [DisposalMethod; 4] = [
        DisposalMethod::Mixed,
        DisposalMethod::Recycling,
        DisposalMethod::Composting,
        DisposalMethod::Landfill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisposalMethod::Mixed => "mixed",
            DisposalMethod::Recycling => "recycling",
            DisposalMethod::Composting => "composting",
            DisposalMethod::Landfill => "landfill",
        }
    }
}

/// Environmental impact class; appliances only use the middle three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactClass {
    VerySustainable,
    Sustainable,
    Moderate,
    High,
    VeryHigh,
}

// ──────────────────────────────────────────────────────────────────────────────
// Inputs
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricityInput {
    #[serde(alias = "selectedAppliances")]
    pub selected_appliance_ids: BTreeSet<String>,
    pub country: String,
    pub period: Period,
}

impl ElectricityInput {
    pub fn builder() -> ElectricityInputBuilder {
        ElectricityInputBuilder::default()
    }
}

/// Collects appliance toggles and produces one immutable `ElectricityInput`.
#[derive(Debug, Clone, Default)]
pub struct ElectricityInputBuilder {
    selected: BTreeSet<String>,
    country: Option<String>,
    period: Option<Period>,
}

impl ElectricityInputBuilder {
    pub fn select(mut self, appliance_id: impl Into<String>) -> Self {
        self.selected.insert(appliance_id.into());
        self
    }

    pub fn deselect(mut self, appliance_id: &str) -> Self {
        self.selected.remove(appliance_id);
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn build(self) -> Result<ElectricityInput, CalcError> {
        if self.selected.is_empty() {
            return Err(CalcError::validation("selectedApplianceIds", "at least one appliance must be selected"));
        }
        Ok(ElectricityInput {
            selected_appliance_ids: self.selected,
            country: required_country(self.country)?,
            period: self.period.ok_or_else(|| CalcError::validation("period", "missing"))?,
        })
    }
}

/// Route details collected by the map widget; echoed for persistence only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportInput {
    #[serde(alias = "distance")]
    pub distance_km: f64,
    #[serde(alias = "transportMode")]
    pub mode: TransportMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<FuelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// People sharing the trip; signed so that bad values reach validation.
    pub occupancy: Option<i64>,
    pub country: String,
    pub period: Period,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteItem {
    pub waste_type: WasteType,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteInput {
    pub items: Vec<WasteItem>,
    pub disposal_method: DisposalMethod,
    pub country: String,
    pub period: Period,
}

impl WasteInput {
    pub fn builder(disposal_method: DisposalMethod) -> WasteInputBuilder {
        WasteInputBuilder {
            disposal_method,
            items: Vec::new(),
            country: None,
            period: None,
        }
    }

    pub fn total_weight_kg(&self) -> f64 {
        self.items.iter().map(|i| i.weight_kg).sum()
    }
}

/// Collects per-type weights (last write wins per type) into a `WasteInput`.
#[derive(Debug, Clone)]
pub struct WasteInputBuilder {
    disposal_method: DisposalMethod,
    items: Vec<WasteItem>,
    country: Option<String>,
    period: Option<Period>,
}

impl WasteInputBuilder {
    pub fn weight(mut self, waste_type: WasteType, weight_kg: f64) -> Self {
        match self.items.iter_mut().find(|i| i.waste_type == waste_type) {
            Some(item) => item.weight_kg = weight_kg,
            None => self.items.push(WasteItem { waste_type, weight_kg }),
        }
        self
    }

    pub fn remove(mut self, waste_type: WasteType) -> Self {
        self.items.retain(|i| i.waste_type != waste_type);
        self
    }

    pub fn disposal_method(mut self, method: DisposalMethod) -> Self {
        self.disposal_method = method;
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn build(self) -> Result<WasteInput, CalcError> {
        if !self.items.iter().any(|i| i.weight_kg > 0.0) {
            return Err(CalcError::validation("items", "at least one item must weigh more than 0 kg"));
        }
        Ok(WasteInput {
            items: self.items,
            disposal_method: self.disposal_method,
            country: required_country(self.country)?,
            period: self.period.ok_or_else(|| CalcError::validation("period", "missing"))?,
        })
    }
}

fn required_country(country: Option<String>) -> Result<String, CalcError> {
    match country {
        Some(c) if !c.trim().is_empty() => Ok(c),
        _ => Err(CalcError::validation("country", "missing")),
    }
}

/// Boundary envelope: who asked, and the key the persistence layer dedups on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcRequest<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[serde(flatten)]
    pub input: T,
}

impl<T> CalcRequest<T> {
    pub fn new(input: T) -> Self {
        Self { user_id: None, idempotency_key: None, input }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Results
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorInfo {
    pub value: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Catalog version label; empty on records stored before versioning.
    #[serde(default, rename = "versionLabel", alias = "version")]
    pub version: String,
    #[serde(default)]
    pub hash: String,
}

/// Emission figure produced by a calculator before the request envelope is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub kg_co2e: f64,
    pub subcategory: Option<String>,
    pub activity: Activity,
    pub factor_info: FactorInfo,
    pub impact: Option<ImpactClass>,
}

/// Reads records from the persistence layer too, where `period` and
/// `activity` may be absent: the period then comes from `createdAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredResult")]
pub struct CalculationResult {
    pub calc_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub period: Period,
    #[serde(rename = "kgCO2e")]
    pub kg_co2e: f64,
    pub activity: Activity,
    pub factor_info: FactorInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<ImpactClass>,
    #[serde(default)]
    pub input_snapshot: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredResult {
    calc_id: String,
    #[serde(default)]
    idempotency_key: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    category: Category,
    #[serde(default)]
    subcategory: Option<String>,
    #[serde(default)]
    period: Option<Period>,
    #[serde(rename = "kgCO2e")]
    kg_co2e: f64,
    #[serde(default)]
    activity: Activity,
    factor_info: FactorInfo,
    #[serde(default)]
    impact: Option<ImpactClass>,
    #[serde(default)]
    input_snapshot: Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<StoredResult> for CalculationResult {
    type Error = CalcError;

    fn try_from(r: StoredResult) -> Result<Self, Self::Error> {
        let period = match r.period {
            Some(p) => p,
            None => Period::of_date(r.created_at.date_naive())?,
        };
        Ok(CalculationResult {
            calc_id: r.calc_id,
            idempotency_key: r.idempotency_key,
            user_id: r.user_id,
            category: r.category,
            subcategory: r.subcategory,
            period,
            kg_co2e: r.kg_co2e,
            activity: r.activity,
            factor_info: r.factor_info,
            impact: r.impact,
            input_snapshot: r.input_snapshot,
            created_at: r.created_at,
        })
    }
}

impl CalculationResult {
    /// Negative totals are avoided-emission credits.
    pub fn is_credit(&self) -> bool {
        self.kg_co2e < 0.0
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Analytics
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStat {
    pub key: String,
    #[serde(rename = "totalKgCO2e")]
    pub total_kg_co2e: f64,
    pub record_count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub period: String,
    #[serde(rename = "totalKgCO2e")]
    pub total_kg_co2e: f64,
    #[serde(default)]
    pub record_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    #[serde(rename = "totalKgCO2e")]
    pub total_kg_co2e: f64,
    pub total_records: u64,
    #[serde(rename = "thisMonthKgCO2e")]
    pub this_month_kg_co2e: f64,
    #[serde(rename = "lastMonthKgCO2e")]
    pub last_month_kg_co2e: f64,
    pub average_per_month: f64,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub period: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendForecast {
    pub historical: Vec<TimeSeriesPoint>,
    pub trend_line: Vec<f64>,
    pub predictions: Vec<Prediction>,
    pub slope: f64,
    pub intercept: f64,
    pub direction: TrendDirection,
    pub avg_error: f64,
    pub confidence_band: ConfidenceBand,
}

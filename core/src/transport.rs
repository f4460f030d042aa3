use log::{debug, warn};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::calculator::Calculator;
use crate::catalog::{EmissionFactorCatalog, FactorQuery, UNIT_PER_KM};
use crate::error::{CalcError, EngineResult};
use crate::period::Period;
use crate::types::{Activity, Category, Estimate, FactorInfo, FuelType, ImpactClass, TransportInput, TransportMode};

/// One row of the mode comparison shown before a trip is committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeOption {
    pub key: String,
    pub mode: TransportMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<FuelType>,
    #[serde(rename = "kgCO2e")]
    pub kg_co2e: f64,
    pub impact: ImpactClass,
}

// Profiles compared in the preview, in display order before sorting.
const PREVIEW_PROFILES: &[(TransportMode, Option<FuelType>)] = &[
    (TransportMode::Walking, None),
    (TransportMode::Bicycle, None),
    (TransportMode::Metro, None),
    (TransportMode::Bus, None),
    (TransportMode::Car, Some(FuelType::Electric)),
    (TransportMode::Car, Some(FuelType::Hybrid)),
    (TransportMode::Car, Some(FuelType::Gasoline)),
    (TransportMode::Car, Some(FuelType::Diesel)),
    (TransportMode::Motorcycle, Some(FuelType::Gasoline)),
    (TransportMode::Plane, None),
];

/// Catalog key for a mode/fuel pair. Motorcycles only have a gasoline factor.
pub fn factor_key(mode: TransportMode, fuel: Option<FuelType>) -> EngineResult<String> {
    match mode {
        TransportMode::Car => {
            let fuel = fuel.ok_or_else(|| CalcError::validation("fuelType", "required for car trips"))?;
            Ok(format!("car_{}", fuel.as_str()))
        }
        TransportMode::Motorcycle => Ok("motorcycle_gasoline".to_string()),
        other => Ok(other.as_str().to_string()),
    }
}

pub fn impact_of(mode: TransportMode, fuel: Option<FuelType>) -> ImpactClass {
    match (mode, fuel) {
        (TransportMode::Walking | TransportMode::Bicycle | TransportMode::Metro, _) => ImpactClass::Sustainable,
        (TransportMode::Bus, _) => ImpactClass::Moderate,
        (TransportMode::Car, Some(FuelType::Electric | FuelType::Hybrid)) => ImpactClass::Moderate,
        (TransportMode::Car, _) | (TransportMode::Motorcycle, _) => ImpactClass::High,
        (TransportMode::Plane, _) => ImpactClass::VeryHigh,
    }
}

/// Trip distance × per-km factor, shared between passengers for car and bus.
#[derive(Debug, Clone, Copy)]
pub struct TransportCalculator<'c> {
    catalog: &'c EmissionFactorCatalog,
}

impl<'c> TransportCalculator<'c> {
    pub fn new(catalog: &'c EmissionFactorCatalog) -> Self {
        Self { catalog }
    }

    /// Checks the trip and returns how many people share it.
    fn validate(input: &TransportInput) -> EngineResult<u32> {
        if !input.distance_km.is_finite() || input.distance_km <= 0.0 {
            warn!("transport input rejected: distance {} km", input.distance_km);
            return Err(CalcError::validation(
                "distanceKm",
                format!("must be a positive number of km, got {}", input.distance_km),
            ));
        }
        if input.country.trim().is_empty() {
            return Err(CalcError::validation("country", "missing"));
        }
        match (input.mode.requires_fuel(), input.fuel_type) {
            (true, None) => {
                return Err(CalcError::validation(
                    "fuelType",
                    format!("required for {} trips", input.mode.as_str()),
                ))
            }
            (false, Some(f)) => {
                return Err(CalcError::validation(
                    "fuelType",
                    format!("`{}` given for {} trips, which take no fuel type", f.as_str(), input.mode.as_str()),
                ))
            }
            _ => {}
        }
        check_occupancy(input.occupancy)
    }

    /// Emissions for one profile, applying the same occupancy rule as committed trips.
    fn trip_emissions(
        &self,
        distance_km: f64,
        mode: TransportMode,
        fuel: Option<FuelType>,
        passengers: u32,
        period: Option<Period>,
    ) -> EngineResult<(f64, FactorInfo, String)> {
        let key = factor_key(mode, fuel)?;
        let mut query = FactorQuery::new(Category::Transport, &key);
        query.period = period;
        let resolved = self.catalog.lookup_for(&query)?;

        let base = distance_km * resolved.factor.value;
        let kg = if mode.shares_occupancy() {
            base / f64::from(passengers)
        } else {
            base
        };

        let info = FactorInfo {
            value: resolved.factor.value,
            unit: UNIT_PER_KM.to_string(),
            subcategory: Some(key.clone()),
            version: resolved.version.label.clone(),
            hash: resolved.version.hash.clone(),
        };
        Ok((kg, info, key))
    }

    /// Every mode for the same trip, cheapest first. For car profiles the
    /// caller's fuel type is irrelevant: each fuel gets its own row.
    pub fn preview(&self, distance_km: f64, occupancy: Option<i64>) -> EngineResult<Vec<ModeOption>> {
        if !distance_km.is_finite() || distance_km <= 0.0 {
            return Err(CalcError::validation(
                "distanceKm",
                format!("must be a positive number of km, got {distance_km}"),
            ));
        }
        let passengers = check_occupancy(occupancy)?;

        let mut options = Vec::with_capacity(PREVIEW_PROFILES.len());
        for (mode, fuel) in PREVIEW_PROFILES {
            let (kg, _, key) = self.trip_emissions(distance_km, *mode, *fuel, passengers, None)?;
            options.push(ModeOption {
                key,
                mode: *mode,
                fuel_type: *fuel,
                kg_co2e: kg,
                impact: impact_of(*mode, *fuel),
            });
        }
        options.sort_by_key(|o| OrderedFloat(o.kg_co2e));
        Ok(options)
    }
}

/// Number of people sharing the trip; absent means travelling alone.
fn check_occupancy(occupancy: Option<i64>) -> EngineResult<u32> {
    match occupancy {
        None => Ok(1),
        Some(n) if n < 1 => Err(CalcError::validation("occupancy", format!("must be at least 1, got {n}"))),
        Some(n) => u32::try_from(n).map_err(|_| CalcError::validation("occupancy", format!("{n} is too large"))),
    }
}

/// Up to `n` sustainable or moderate options, lowest emissions first.
pub fn greenest(options: &[ModeOption], n: usize) -> Vec<ModeOption> {
    options
        .iter()
        .filter(|o| o.impact <= ImpactClass::Moderate)
        .take(n)
        .cloned()
        .collect()
}

/// Up to `n` high-impact options, highest emissions first.
pub fn highest(options: &[ModeOption], n: usize) -> Vec<ModeOption> {
    options
        .iter()
        .rev()
        .filter(|o| o.impact >= ImpactClass::High)
        .take(n)
        .cloned()
        .collect()
}

impl Default for TransportCalculator<'static> {
    fn default() -> Self {
        Self::new(EmissionFactorCatalog::default_catalog())
    }
}

impl Calculator for TransportCalculator<'_> {
    type Input = TransportInput;

    const CATEGORY: Category = Category::Transport;

    fn estimate(&self, input: &TransportInput) -> EngineResult<Estimate> {
        let passengers = Self::validate(input)?;
        let (kg_co2e, factor_info, key) = self.trip_emissions(
            input.distance_km,
            input.mode,
            input.fuel_type,
            passengers,
            Some(input.period),
        )?;

        debug!(
            "transport {} {} km (occupancy {:?}) = {} kgCO2e",
            key, input.distance_km, input.occupancy, kg_co2e
        );

        Ok(Estimate {
            kg_co2e,
            subcategory: Some(key),
            activity: Activity { quantity: input.distance_km, unit: "km".to_string() },
            factor_info,
            impact: Some(impact_of(input.mode, input.fuel_type)),
        })
    }
}

//! Versioned emission-factor tables and the static appliance table.
//!
//! The catalog is the single source of truth for every calculation path:
//! committed calculations and the transport preview read the same entries.

use std::collections::HashSet;

use chrono::NaiveDate;
use log::{debug, info};
use once_cell::sync::Lazy;

use crate::error::{CalcError, EngineResult};
use crate::models::{ApplianceProfile, CatalogVersion, EmissionFactor};
use crate::period::Period;
use crate::types::{Category, DisposalMethod, ImpactClass, WasteType};

pub const UNIT_PER_KM: &str = "kgCO2e/km";
pub const UNIT_PER_KWH: &str = "kgCO2e/kWh";
pub const UNIT_PER_KG: &str = "kgCO2e/kg";

/// Electricity grid factors live under this subcategory, keyed by country.
pub const GRID_SUBCATEGORY: &str = "grid";

pub const BUILTIN_VERSION: &str = "2025.1";
const BUILTIN_HASH: &str = "ef-2025.1-4f2c9a";

static DEFAULT_CATALOG: Lazy<EmissionFactorCatalog> = Lazy::new(|| {
    let catalog = EmissionFactorCatalog::builtin();
    info!(
        "built-in emission factor catalog ready (version {}, {} factors, {} appliances)",
        BUILTIN_VERSION,
        catalog.versions[0].factors.len(),
        catalog.appliances.len()
    );
    catalog
});

const TRANSPORT_FACTORS: &[(&str, f64)] = &[
    ("car_gasoline", 0.120),
    ("car_diesel", 0.130),
    ("car_electric", 0.050),
    ("car_hybrid", 0.080),
    ("bus", 0.089),
    ("metro", 0.014),
    ("bicycle", 0.000),
    ("walking", 0.000),
    ("motorcycle_gasoline", 0.113),
    ("plane", 0.255),
];

// mixed, recycling, composting, landfill
const WASTE_FACTORS: &[(WasteType, [f64; 4])] = &[
    (WasteType::Organic, [0.40, 0.40, -0.10, 0.65]),
    (WasteType::Paper, [0.35, -1.20, 0.35, 0.90]),
    (WasteType::Plastic, [0.45, -0.80, 0.45, 0.50]),
    (WasteType::Glass, [0.20, -0.40, 0.20, 0.25]),
    (WasteType::Metal, [0.30, -2.50, 0.30, 0.35]),
    (WasteType::Other, [0.50, 0.50, 0.50, 0.55]),
];

const GRID_FACTORS: &[(&str, f64)] = &[
    ("CL", 0.32),
    ("AR", 0.31),
    ("BR", 0.09),
    ("CO", 0.16),
    ("MX", 0.42),
    ("PE", 0.25),
];

const APPLIANCES: &[(&str, f64, ImpactClass)] = &[
    ("laptop", 15.0, ImpactClass::Sustainable),
    ("monitor", 12.0, ImpactClass::Sustainable),
    ("phone_charger", 2.0, ImpactClass::Sustainable),
    ("router", 7.0, ImpactClass::Sustainable),
    ("led_lamp", 4.0, ImpactClass::Sustainable),
    ("desktop_pc", 45.0, ImpactClass::Moderate),
    ("tv", 25.0, ImpactClass::Moderate),
    ("refrigerator", 35.0, ImpactClass::Moderate),
    ("microwave", 10.0, ImpactClass::Moderate),
    ("electric_kettle", 8.0, ImpactClass::Moderate),
    ("washing_machine", 20.0, ImpactClass::Moderate),
    ("air_conditioner", 150.0, ImpactClass::High),
    ("electric_heater", 120.0, ImpactClass::High),
    ("clothes_dryer", 60.0, ImpactClass::High),
];

/// Lookup key for `EmissionFactorCatalog::lookup_for`.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorQuery<'a> {
    pub category: Category,
    pub subcategory: &'a str,
    pub method: Option<DisposalMethod>,
    pub country: Option<&'a str>,
    pub period: Option<Period>,
}

impl<'a> FactorQuery<'a> {
    pub fn new(category: Category, subcategory: &'a str) -> Self {
        Self { category, subcategory, method: None, country: None, period: None }
    }

    pub fn method(mut self, method: DisposalMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn country(mut self, country: &'a str) -> Self {
        self.country = Some(country);
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    fn unknown(&self) -> CalcError {
        CalcError::UnknownFactor {
            category: self.category,
            subcategory: self.subcategory.to_string(),
            method: self.method.map(|m| m.as_str().to_string()),
            country: self.country.map(str::to_string),
        }
    }
}

/// A factor together with the version it was taken from.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedFactor<'c> {
    pub factor: &'c EmissionFactor,
    pub version: &'c CatalogVersion,
}

#[derive(Debug, Clone)]
pub struct EmissionFactorCatalog {
    /// Newest `valid_from` first.
    versions: Vec<CatalogVersion>,
    appliances: Vec<ApplianceProfile>,
}

impl EmissionFactorCatalog {
    /// Validates and indexes the given tables. Rejects empty or inconsistent data.
    pub fn new(mut versions: Vec<CatalogVersion>, appliances: Vec<ApplianceProfile>) -> EngineResult<Self> {
        if versions.is_empty() {
            return Err(CalcError::validation("catalog", "no factor versions"));
        }
        for v in &versions {
            validate_version(v)?;
        }
        let mut ids = HashSet::new();
        for a in &appliances {
            if !ids.insert(a.appliance_id.as_str()) {
                return Err(CalcError::validation("catalog", format!("duplicate appliance `{}`", a.appliance_id)));
            }
            if !a.monthly_kwh.is_finite() || a.monthly_kwh < 0.0 {
                return Err(CalcError::validation(
                    "catalog",
                    format!("appliance `{}` has invalid monthly kWh {}", a.appliance_id, a.monthly_kwh),
                ));
            }
        }
        versions.sort_by(|a, b| b.valid_from.cmp(&a.valid_from));
        Ok(Self { versions, appliances })
    }

    /// Process-wide built-in catalog, built on first use and never mutated.
    pub fn default_catalog() -> &'static EmissionFactorCatalog {
        &DEFAULT_CATALOG
    }

    pub fn builtin() -> Self {
        let mut factors = Vec::new();
        for (key, value) in TRANSPORT_FACTORS {
            factors.push(EmissionFactor {
                category: Category::Transport,
                subcategory: (*key).to_string(),
                method: None,
                country: None,
                value: *value,
                unit: UNIT_PER_KM.to_string(),
            });
        }
        for (waste_type, values) in WASTE_FACTORS {
            for (method, value) in DisposalMethod::ALL.iter().zip(values.iter()) {
                factors.push(EmissionFactor {
                    category: Category::Waste,
                    subcategory: waste_type.as_str().to_string(),
                    method: Some(*method),
                    country: None,
                    value: *value,
                    unit: UNIT_PER_KG.to_string(),
                });
            }
        }
        for (country, value) in GRID_FACTORS {
            factors.push(EmissionFactor {
                category: Category::Electricity,
                subcategory: GRID_SUBCATEGORY.to_string(),
                method: None,
                country: Some((*country).to_string()),
                value: *value,
                unit: UNIT_PER_KWH.to_string(),
            });
        }

        let appliances = APPLIANCES
            .iter()
            .map(|(id, kwh, impact)| ApplianceProfile {
                appliance_id: (*id).to_string(),
                monthly_kwh: *kwh,
                impact_class: *impact,
            })
            .collect();

        Self {
            versions: vec![CatalogVersion {
                label: BUILTIN_VERSION.to_string(),
                valid_from: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN),
                valid_to: None,
                hash: BUILTIN_HASH.to_string(),
                factors,
            }],
            appliances,
        }
    }

    pub fn versions(&self) -> &[CatalogVersion] {
        &self.versions
    }

    pub fn appliances(&self) -> &[ApplianceProfile] {
        &self.appliances
    }

    /// Country-agnostic lookup in the newest version.
    pub fn lookup(
        &self,
        category: Category,
        subcategory: &str,
        method: Option<DisposalMethod>,
    ) -> EngineResult<&EmissionFactor> {
        let mut query = FactorQuery::new(category, subcategory);
        query.method = method;
        self.lookup_for(&query).map(|r| r.factor)
    }

    /// Picks the newest version valid for the query period, then prefers a
    /// country-specific entry over a country-agnostic one.
    pub fn lookup_for(&self, query: &FactorQuery<'_>) -> EngineResult<ResolvedFactor<'_>> {
        let version = match query.period {
            Some(p) => {
                let day = p.first_day();
                self.versions.iter().find(|v| v.applies_on(day))
            }
            None => self.versions.first(),
        }
        .ok_or_else(|| query.unknown())?;

        let candidates = version.factors.iter().filter(|f| {
            f.category == query.category && f.subcategory == query.subcategory && f.method == query.method
        });

        let mut fallback = None;
        for f in candidates {
            match (&f.country, query.country) {
                (Some(c), Some(q)) if c.eq_ignore_ascii_case(q) => {
                    debug!("factor {}/{} = {} {} (country {}, version {})", f.category, f.subcategory, f.value, f.unit, c, version.label);
                    return Ok(ResolvedFactor { factor: f, version });
                }
                (None, _) if fallback.is_none() => fallback = Some(f),
                _ => {}
            }
        }

        match fallback {
            Some(f) => {
                debug!("factor {}/{} = {} {} (version {})", f.category, f.subcategory, f.value, f.unit, version.label);
                Ok(ResolvedFactor { factor: f, version })
            }
            None => Err(query.unknown()),
        }
    }

    pub fn appliance(&self, appliance_id: &str) -> EngineResult<&ApplianceProfile> {
        self.appliances
            .iter()
            .find(|a| a.appliance_id == appliance_id)
            .ok_or_else(|| CalcError::validation("selectedApplianceIds", format!("unknown appliance `{appliance_id}`")))
    }
}

impl Default for EmissionFactorCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_version(v: &CatalogVersion) -> EngineResult<()> {
    if v.label.trim().is_empty() || v.hash.trim().is_empty() {
        return Err(CalcError::validation("catalog", "version label and hash are required"));
    }
    if let Some(to) = v.valid_to {
        if to < v.valid_from {
            return Err(CalcError::validation(
                "catalog",
                format!("version {} ends ({to}) before it starts ({})", v.label, v.valid_from),
            ));
        }
    }
    let mut seen = HashSet::new();
    for f in &v.factors {
        if !f.value.is_finite() {
            return Err(CalcError::validation(
                "catalog",
                format!("non-finite factor {}/{} in version {}", f.category, f.subcategory, v.label),
            ));
        }
        let key = (f.category, f.subcategory.as_str(), f.method, f.country.as_deref());
        if !seen.insert(key) {
            return Err(CalcError::validation(
                "catalog",
                format!("duplicate factor {}/{} in version {}", f.category, f.subcategory, v.label),
            ));
        }
    }
    Ok(())
}

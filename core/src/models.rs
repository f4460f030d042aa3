use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Category, DisposalMethod, ImpactClass};

/// One signed coefficient. Negative values are avoided-emission credits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionFactor {
    pub category: Category,
    pub subcategory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<DisposalMethod>,
    /// ISO-2 country; `None` applies to every country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub value: f64,
    pub unit: String,
}

/// A dated, hashed set of factors. The newest version valid for a period wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogVersion {
    pub label: String,
    pub valid_from: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<NaiveDate>,
    pub hash: String,
    pub factors: Vec<EmissionFactor>,
}

impl CatalogVersion {
    pub fn applies_on(&self, day: NaiveDate) -> bool {
        self.valid_from <= day && self.valid_to.map_or(true, |to| to >= day)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceProfile {
    pub appliance_id: String,
    pub monthly_kwh: f64,
    pub impact_class: ImpactClass,
}

use log::{debug, warn};

use crate::calculator::Calculator;
use crate::catalog::{EmissionFactorCatalog, FactorQuery, GRID_SUBCATEGORY, UNIT_PER_KWH};
use crate::error::{CalcError, EngineResult};
use crate::types::{Activity, Category, ElectricityInput, Estimate, FactorInfo, ImpactClass};

/// Monthly appliance consumption → kWh → kgCO2e through the country grid factor.
#[derive(Debug, Clone, Copy)]
pub struct ElectricityCalculator<'c> {
    catalog: &'c EmissionFactorCatalog,
}

impl<'c> ElectricityCalculator<'c> {
    pub fn new(catalog: &'c EmissionFactorCatalog) -> Self {
        Self { catalog }
    }

    /// Sum of monthly kWh over the selection, plus the worst impact class in it.
    pub fn total_kwh(&self, input: &ElectricityInput) -> EngineResult<(f64, Option<ImpactClass>)> {
        if input.selected_appliance_ids.is_empty() {
            warn!("electricity input rejected: empty appliance selection");
            return Err(CalcError::validation("selectedApplianceIds", "at least one appliance must be selected"));
        }

        let mut total = 0.0;
        let mut impact: Option<ImpactClass> = None;
        for id in &input.selected_appliance_ids {
            let appliance = self.catalog.appliance(id)?;
            total += appliance.monthly_kwh;
            impact = impact.max(Some(appliance.impact_class));
        }

        if !(total > 0.0) {
            warn!("electricity input rejected: total consumption {total} kWh");
            return Err(CalcError::validation(
                "selectedApplianceIds",
                format!("total monthly consumption must be > 0 kWh, got {total}"),
            ));
        }
        Ok((total, impact))
    }
}

impl Default for ElectricityCalculator<'static> {
    fn default() -> Self {
        Self::new(EmissionFactorCatalog::default_catalog())
    }
}

impl Calculator for ElectricityCalculator<'_> {
    type Input = ElectricityInput;

    const CATEGORY: Category = Category::Electricity;

    fn estimate(&self, input: &ElectricityInput) -> EngineResult<Estimate> {
        if input.country.trim().is_empty() {
            return Err(CalcError::validation("country", "missing"));
        }
        let (total_kwh, impact) = self.total_kwh(input)?;

        let query = FactorQuery::new(Category::Electricity, GRID_SUBCATEGORY)
            .country(input.country.trim())
            .period(input.period);
        let resolved = self.catalog.lookup_for(&query)?;
        let factor = resolved.factor.value;
        let kg_co2e = total_kwh * factor;

        debug!(
            "electricity {} {}: {} kWh x {} = {} kgCO2e",
            input.country, input.period, total_kwh, factor, kg_co2e
        );

        let subcategory = input
            .selected_appliance_ids
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        Ok(Estimate {
            kg_co2e,
            subcategory: Some(subcategory),
            activity: Activity { quantity: total_kwh, unit: "kWh".to_string() },
            factor_info: FactorInfo {
                value: factor,
                unit: UNIT_PER_KWH.to_string(),
                subcategory: None,
                version: resolved.version.label.clone(),
                hash: resolved.version.hash.clone(),
            },
            impact,
        })
    }
}

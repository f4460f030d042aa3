use log::{debug, warn};

use crate::calculator::Calculator;
use crate::catalog::{EmissionFactorCatalog, FactorQuery, UNIT_PER_KG};
use crate::error::{CalcError, EngineResult};
use crate::types::{Activity, Category, DisposalMethod, Estimate, FactorInfo, ImpactClass, WasteInput};

/// Impact label for a disposal route. Mixed handling is judged by total weight.
pub fn impact_for(method: DisposalMethod, total_weight_kg: f64) -> ImpactClass {
    match method {
        DisposalMethod::Recycling => ImpactClass::Sustainable,
        DisposalMethod::Composting => ImpactClass::VerySustainable,
        DisposalMethod::Landfill => ImpactClass::High,
        DisposalMethod::Mixed if total_weight_kg < 3.0 => ImpactClass::Sustainable,
        DisposalMethod::Mixed if total_weight_kg < 6.0 => ImpactClass::Moderate,
        DisposalMethod::Mixed => ImpactClass::High,
    }
}

/// Σ weight × factor(type, method). The sum keeps its sign: a negative total
/// is a carbon credit.
#[derive(Debug, Clone, Copy)]
pub struct WasteCalculator<'c> {
    catalog: &'c EmissionFactorCatalog,
}

impl<'c> WasteCalculator<'c> {
    pub fn new(catalog: &'c EmissionFactorCatalog) -> Self {
        Self { catalog }
    }
}

impl Default for WasteCalculator<'static> {
    fn default() -> Self {
        Self::new(EmissionFactorCatalog::default_catalog())
    }
}

impl Calculator for WasteCalculator<'_> {
    type Input = WasteInput;

    const CATEGORY: Category = Category::Waste;

    fn estimate(&self, input: &WasteInput) -> EngineResult<Estimate> {
        if input.country.trim().is_empty() {
            return Err(CalcError::validation("country", "missing"));
        }
        if let Some(bad) = input.items.iter().find(|i| !i.weight_kg.is_finite() || i.weight_kg < 0.0) {
            warn!("waste input rejected: {} weighs {} kg", bad.waste_type.as_str(), bad.weight_kg);
            return Err(CalcError::validation(
                "items",
                format!("{} weight must be a non-negative number, got {}", bad.waste_type.as_str(), bad.weight_kg),
            ));
        }
        if !input.items.iter().any(|i| i.weight_kg > 0.0) {
            warn!("waste input rejected: no item weighs more than 0 kg");
            return Err(CalcError::validation("items", "at least one item must weigh more than 0 kg"));
        }

        let method = input.disposal_method;
        let mut kg_co2e = 0.0;
        let mut total_weight = 0.0;
        let mut version = None;

        for item in input.items.iter().filter(|i| i.weight_kg > 0.0) {
            let query = FactorQuery::new(Category::Waste, item.waste_type.as_str())
                .method(method)
                .period(input.period);
            let resolved = self.catalog.lookup_for(&query)?;
            kg_co2e += item.weight_kg * resolved.factor.value;
            total_weight += item.weight_kg;
            version.get_or_insert(resolved.version);
        }

        // at least one positive item was looked up above
        let version = version.ok_or_else(|| CalcError::validation("items", "no weighed items"))?;
        debug!(
            "waste {} {} kg = {} kgCO2e{}",
            method.as_str(),
            total_weight,
            kg_co2e,
            if kg_co2e < 0.0 { " (credit)" } else { "" }
        );

        Ok(Estimate {
            kg_co2e,
            subcategory: Some(method.as_str().to_string()),
            activity: Activity { quantity: total_weight, unit: "kg".to_string() },
            factor_info: FactorInfo {
                value: kg_co2e / total_weight,
                unit: UNIT_PER_KG.to_string(),
                subcategory: Some(method.as_str().to_string()),
                version: version.label.clone(),
                hash: version.hash.clone(),
            },
            impact: Some(impact_for(method, total_weight)),
        })
    }
}

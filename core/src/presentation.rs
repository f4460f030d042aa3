//! Display helpers for the boundary layer. The engine itself never rounds.

use crate::types::{Category, ImpactClass, TrendDirection};

pub trait RoundTo {
    fn round_to(self, dp: u32) -> f64;
}

impl RoundTo for f64 {
    #[inline]
    fn round_to(self, dp: u32) -> f64 {
        if dp == 0 {
            return self.round();
        }
        let factor = 10_f64.powi(dp as i32);
        (self * factor).round() / factor
    }
}

pub fn category_label(category: Category) -> &'static str {
    match category {
        Category::Electricity => "Electricity",
        Category::Transport => "Transport",
        Category::Waste => "Waste",
    }
}

pub fn category_icon(category: Category) -> &'static str {
    match category {
        Category::Electricity => "⚡",
        Category::Transport => "🚌",
        Category::Waste => "♻️",
    }
}

pub fn impact_label(impact: ImpactClass) -> &'static str {
    match impact {
        ImpactClass::VerySustainable => "Very sustainable",
        ImpactClass::Sustainable => "Sustainable",
        ImpactClass::Moderate => "Moderate",
        ImpactClass::High => "High impact",
        ImpactClass::VeryHigh => "Very high impact",
    }
}

pub fn trend_label(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Increasing => "Increasing trend",
        TrendDirection::Decreasing => "Decreasing trend",
        TrendDirection::Stable => "Stable trend",
    }
}

/// Always shows the sign so credits cannot be mistaken for emissions.
pub fn format_kg(kg_co2e: f64, dp: u32) -> String {
    let rounded = kg_co2e.round_to(dp);
    // avoid printing "-0.00"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let sign = if rounded > 0.0 { "+" } else { "" };
    format!("{sign}{rounded:.prec$} kgCO2e", prec = dp as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signs_are_explicit() {
        assert_eq!(format_kg(1.2, 2), "+1.20 kgCO2e");
        assert_eq!(format_kg(-0.35, 2), "-0.35 kgCO2e");
        assert_eq!(format_kg(-0.0001, 2), "0.00 kgCO2e");
    }

    #[test]
    fn round_to_places() {
        assert_eq!(8.6400000001_f64.round_to(2), 8.64);
        assert_eq!(2.5_f64.round_to(0), 3.0);
    }
}

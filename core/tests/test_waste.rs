use ecofootprint_core::presentation::format_kg;
use ecofootprint_core::waste::impact_for;
use ecofootprint_core::{
    CalcError, CalcRequest, Calculator, DisposalMethod, ImpactClass, Period, WasteCalculator, WasteInput, WasteItem,
    WasteType,
};

fn period() -> Period {
    "2025-10".parse().unwrap()
}

#[test]
fn composting_organics_is_a_credit() {
    let input = WasteInput::builder(DisposalMethod::Composting)
        .weight(WasteType::Organic, 3.5)
        .country("CL")
        .period(period())
        .build()
        .unwrap();

    let result = WasteCalculator::default().compute(&CalcRequest::new(input)).unwrap();
    assert!((result.kg_co2e - (-0.35)).abs() < 1e-12, "got {}", result.kg_co2e);
    assert!(result.is_credit());
    assert_eq!(result.impact, Some(ImpactClass::VerySustainable));
    assert_eq!(format_kg(result.kg_co2e, 2), "-0.35 kgCO2e");

    // the sign survives the JSON boundary
    let json = serde_json::to_value(&result).unwrap();
    assert!(json["kgCO2e"].as_f64().unwrap() < 0.0);
}

#[test]
fn recycled_metal_uses_the_metal_credit() {
    let calc = WasteCalculator::default();
    for w in [0.1, 0.8, 2.0, 12.5] {
        let input = WasteInput::builder(DisposalMethod::Recycling)
            .weight(WasteType::Metal, w)
            .country("CL")
            .period(period())
            .build()
            .unwrap();
        let est = calc.estimate(&input).unwrap();
        assert_eq!(est.kg_co2e, w * -2.50);
    }
}

#[test]
fn mixed_basket_sums_signed_contributions() {
    let input = WasteInput::builder(DisposalMethod::Recycling)
        .weight(WasteType::Paper, 2.0)
        .weight(WasteType::Organic, 3.0)
        .weight(WasteType::Glass, 0.0)
        .country("CL")
        .period(period())
        .build()
        .unwrap();

    let est = WasteCalculator::default().estimate(&input).unwrap();
    let expected = 2.0 * -1.20 + 3.0 * 0.40;
    assert!((est.kg_co2e - expected).abs() < 1e-12);
    assert!((est.activity.quantity - 5.0).abs() < 1e-12);
    assert!((est.factor_info.value - expected / 5.0).abs() < 1e-12);
    assert_eq!(est.subcategory.as_deref(), Some("recycling"));
}

#[test]
fn builder_replaces_weights_per_type() {
    let input = WasteInput::builder(DisposalMethod::Landfill)
        .weight(WasteType::Plastic, 1.0)
        .weight(WasteType::Plastic, 2.5)
        .weight(WasteType::Paper, 1.0)
        .remove(WasteType::Paper)
        .country("CL")
        .period(period())
        .build()
        .unwrap();
    assert_eq!(input.items, vec![WasteItem { waste_type: WasteType::Plastic, weight_kg: 2.5 }]);
}

#[test]
fn all_zero_weights_are_rejected() {
    let built = WasteInput::builder(DisposalMethod::Mixed)
        .weight(WasteType::Paper, 0.0)
        .country("CL")
        .period(period())
        .build();
    assert!(matches!(built, Err(CalcError::Validation { field: "items", .. })));

    let input = WasteInput {
        items: vec![WasteItem { waste_type: WasteType::Glass, weight_kg: 0.0 }],
        disposal_method: DisposalMethod::Mixed,
        country: "CL".into(),
        period: period(),
    };
    assert!(WasteCalculator::default().estimate(&input).is_err());
}

#[test]
fn negative_weight_is_rejected() {
    let input = WasteInput {
        items: vec![
            WasteItem { waste_type: WasteType::Glass, weight_kg: 1.0 },
            WasteItem { waste_type: WasteType::Metal, weight_kg: -1.0 },
        ],
        disposal_method: DisposalMethod::Recycling,
        country: "CL".into(),
        period: period(),
    };
    let err = WasteCalculator::default().estimate(&input).unwrap_err();
    assert_eq!(err.kind(), "validation");
}

#[test]
fn mixed_disposal_impact_depends_on_weight() {
    assert_eq!(impact_for(DisposalMethod::Mixed, 2.9), ImpactClass::Sustainable);
    assert_eq!(impact_for(DisposalMethod::Mixed, 3.0), ImpactClass::Moderate);
    assert_eq!(impact_for(DisposalMethod::Mixed, 6.0), ImpactClass::High);
    assert_eq!(impact_for(DisposalMethod::Landfill, 0.5), ImpactClass::High);
    assert_eq!(impact_for(DisposalMethod::Recycling, 50.0), ImpactClass::Sustainable);
}

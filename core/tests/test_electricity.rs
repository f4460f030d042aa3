use ecofootprint_core::{
    CalcError, CalcRequest, Calculator, Category, ElectricityCalculator, ElectricityInput, ImpactClass, Period,
};

fn period() -> Period {
    "2025-09".parse().unwrap()
}

#[test]
fn laptop_and_monitor_in_chile() {
    let input = ElectricityInput::builder()
        .select("laptop")
        .select("monitor")
        .country("CL")
        .period(period())
        .build()
        .expect("valid input");

    let calc = ElectricityCalculator::default();
    let result = calc.compute(&CalcRequest::new(input)).expect("compute");

    assert_eq!(result.category, Category::Electricity);
    assert!((result.activity.quantity - 27.0).abs() < 1e-9);
    assert_eq!(result.activity.unit, "kWh");
    assert!((result.kg_co2e - 8.64).abs() < 1e-9, "got {}", result.kg_co2e);
    assert!((result.factor_info.value - 0.32).abs() < 1e-12);
    assert_eq!(result.factor_info.unit, "kgCO2e/kWh");
    assert_eq!(result.subcategory.as_deref(), Some("laptop, monitor"));
    assert_eq!(result.impact, Some(ImpactClass::Sustainable));
    assert_eq!(result.period.to_string(), "2025-09");
}

#[test]
fn worst_appliance_sets_the_impact() {
    let input = ElectricityInput::builder()
        .select("laptop")
        .select("air_conditioner")
        .country("MX")
        .period(period())
        .build()
        .unwrap();
    let estimate = ElectricityCalculator::default().estimate(&input).unwrap();
    assert_eq!(estimate.impact, Some(ImpactClass::High));
    assert!((estimate.kg_co2e - 165.0 * 0.42).abs() < 1e-9);
}

#[test]
fn empty_selection_is_rejected() {
    let built = ElectricityInput::builder().select("laptop").deselect("laptop").country("CL").period(period()).build();
    assert!(matches!(built, Err(CalcError::Validation { field: "selectedApplianceIds", .. })));

    // bypassing the builder still fails in the calculator
    let input = ElectricityInput {
        selected_appliance_ids: Default::default(),
        country: "CL".into(),
        period: period(),
    };
    let err = ElectricityCalculator::default().estimate(&input).unwrap_err();
    assert_eq!(err.kind(), "validation");
}

#[test]
fn unknown_appliance_is_a_validation_error() {
    let input = ElectricityInput::builder().select("toaster_9000").country("CL").period(period()).build().unwrap();
    let err = ElectricityCalculator::default().estimate(&input).unwrap_err();
    assert!(matches!(err, CalcError::Validation { field: "selectedApplianceIds", .. }));
}

#[test]
fn unknown_country_is_not_defaulted() {
    let input = ElectricityInput::builder().select("laptop").country("ZZ").period(period()).build().unwrap();
    let err = ElectricityCalculator::default().estimate(&input).unwrap_err();
    match err {
        CalcError::UnknownFactor { category, country, .. } => {
            assert_eq!(category, Category::Electricity);
            assert_eq!(country.as_deref(), Some("ZZ"));
        }
        other => panic!("expected UnknownFactor, got {other:?}"),
    }
}

#[test]
fn idempotency_key_is_passed_through_and_stable() {
    let input = ElectricityInput::builder().select("tv").country("CL").period(period()).build().unwrap();
    let request = CalcRequest::new(input).with_user("u-1").with_idempotency_key("web-demo");
    let calc = ElectricityCalculator::default();

    let a = calc.compute(&request).unwrap();
    let b = calc.compute(&request).unwrap();
    assert_eq!(a.idempotency_key.as_deref(), Some("web-demo"));
    assert_eq!(a.user_id.as_deref(), Some("u-1"));
    assert_eq!(a.calc_id, b.calc_id);

    let other = calc.compute(&request.clone().with_idempotency_key("web-demo-2")).unwrap();
    assert_ne!(a.calc_id, other.calc_id);
}

#[test]
fn calc_ids_do_not_collide_across_user_key_splits() {
    use ecofootprint_core::calculator::calc_id_for;

    let a = calc_id_for(Category::Transport, Some("u:1"), Some("k"));
    let b = calc_id_for(Category::Transport, Some("u"), Some("1:k"));
    assert_ne!(a, b);

    // anonymous and empty-named users are different callers
    assert_ne!(
        calc_id_for(Category::Transport, None, Some("k")),
        calc_id_for(Category::Transport, Some(""), Some("k"))
    );
    assert_ne!(
        calc_id_for(Category::Waste, Some("u"), Some("k")),
        calc_id_for(Category::Electricity, Some("u"), Some("k"))
    );
    assert_eq!(a, calc_id_for(Category::Transport, Some("u:1"), Some("k")));
}

use ecofootprint_core::transport::{factor_key, greenest, highest};
use ecofootprint_core::{
    CalcError, CalcRequest, Calculator, FuelType, ImpactClass, RouteInfo, TransportCalculator, TransportInput,
    TransportMode,
};

fn trip(mode: TransportMode, fuel: Option<FuelType>, distance_km: f64, occupancy: Option<i64>) -> TransportInput {
    TransportInput {
        distance_km,
        mode,
        fuel_type: fuel,
        occupancy,
        country: "CL".to_string(),
        period: "2025-09".parse().unwrap(),
        route: None,
    }
}

#[test]
fn bus_ten_km_single_occupant() {
    let calc = TransportCalculator::default();
    let est = calc.estimate(&trip(TransportMode::Bus, None, 10.0, Some(1))).unwrap();
    assert!((est.kg_co2e - 0.89).abs() < 1e-12, "got {}", est.kg_co2e);
    assert_eq!(est.subcategory.as_deref(), Some("bus"));
    assert_eq!(est.factor_info.unit, "kgCO2e/km");
}

#[test]
fn car_occupancy_divides_emissions() {
    let calc = TransportCalculator::default();
    for fuel in FuelType::ALL {
        let solo = calc.estimate(&trip(TransportMode::Car, Some(fuel), 37.5, Some(1))).unwrap().kg_co2e;
        for k in 2..=5i64 {
            let shared = calc.estimate(&trip(TransportMode::Car, Some(fuel), 37.5, Some(k))).unwrap().kg_co2e;
            assert!((shared - solo / k as f64).abs() < 1e-12, "{fuel:?} k={k}");
        }
    }
}

#[test]
fn committed_bus_trip_uses_its_own_occupancy() {
    let calc = TransportCalculator::default();
    let est = calc.estimate(&trip(TransportMode::Bus, None, 10.0, Some(4))).unwrap();
    assert!((est.kg_co2e - 0.89 / 4.0).abs() < 1e-12);
}

#[test]
fn occupancy_is_ignored_for_unshared_modes() {
    let calc = TransportCalculator::default();
    let one = calc.estimate(&trip(TransportMode::Plane, None, 500.0, Some(1))).unwrap().kg_co2e;
    let many = calc.estimate(&trip(TransportMode::Plane, None, 500.0, Some(3))).unwrap().kg_co2e;
    assert_eq!(one, many);
    assert!((one - 500.0 * 0.255).abs() < 1e-9);
}

#[test]
fn motorcycle_always_uses_the_gasoline_factor() {
    let calc = TransportCalculator::default();
    let est = calc.estimate(&trip(TransportMode::Motorcycle, Some(FuelType::Electric), 20.0, None)).unwrap();
    assert_eq!(est.subcategory.as_deref(), Some("motorcycle_gasoline"));
    assert!((est.kg_co2e - 20.0 * 0.113).abs() < 1e-12);
}

#[test]
fn walking_and_cycling_are_zero_not_errors() {
    let calc = TransportCalculator::default();
    assert_eq!(calc.estimate(&trip(TransportMode::Walking, None, 2.0, None)).unwrap().kg_co2e, 0.0);
    assert_eq!(calc.estimate(&trip(TransportMode::Bicycle, None, 8.0, None)).unwrap().kg_co2e, 0.0);
}

#[test]
fn invalid_trips_are_rejected() {
    let calc = TransportCalculator::default();

    let zero = calc.estimate(&trip(TransportMode::Bus, None, 0.0, None)).unwrap_err();
    assert!(matches!(zero, CalcError::Validation { field: "distanceKm", .. }));

    let nan = calc.estimate(&trip(TransportMode::Bus, None, f64::NAN, None)).unwrap_err();
    assert!(matches!(nan, CalcError::Validation { field: "distanceKm", .. }));

    let no_fuel = calc.estimate(&trip(TransportMode::Car, None, 5.0, None)).unwrap_err();
    assert!(matches!(no_fuel, CalcError::Validation { field: "fuelType", .. }));

    let stray_fuel = calc.estimate(&trip(TransportMode::Metro, Some(FuelType::Diesel), 5.0, None)).unwrap_err();
    assert!(matches!(stray_fuel, CalcError::Validation { field: "fuelType", .. }));

    let empty_car = calc.estimate(&trip(TransportMode::Car, Some(FuelType::Diesel), 5.0, Some(0))).unwrap_err();
    assert!(matches!(empty_car, CalcError::Validation { field: "occupancy", .. }));

    let empty_plane = calc.estimate(&trip(TransportMode::Plane, None, 5.0, Some(0))).unwrap_err();
    assert!(matches!(empty_plane, CalcError::Validation { field: "occupancy", .. }));

    let negative = calc.estimate(&trip(TransportMode::Bus, None, 5.0, Some(-1))).unwrap_err();
    assert!(matches!(negative, CalcError::Validation { field: "occupancy", .. }));

    let huge = calc.estimate(&trip(TransportMode::Car, Some(FuelType::Hybrid), 5.0, Some(i64::MAX))).unwrap_err();
    assert!(matches!(huge, CalcError::Validation { field: "occupancy", .. }));
    assert!(calc.preview(5.0, Some(-3)).is_err());
}

#[test]
fn route_details_are_echoed_not_used() {
    let mut input = trip(TransportMode::Car, Some(FuelType::Hybrid), 12.0, Some(2));
    let plain = TransportCalculator::default().compute(&CalcRequest::new(input.clone())).unwrap();

    input.route = Some(RouteInfo {
        origin_lat: Some(-33.45),
        origin_lng: Some(-70.66),
        origin_address: Some("Campus San Joaquín".into()),
        ..Default::default()
    });
    let routed = TransportCalculator::default().compute(&CalcRequest::new(input)).unwrap();

    assert_eq!(plain.kg_co2e, routed.kg_co2e);
    assert_eq!(routed.input_snapshot["route"]["originAddress"], "Campus San Joaquín");
    assert_eq!(routed.input_snapshot["mode"], "car");
}

#[test]
fn preview_matches_committed_calculations() {
    let calc = TransportCalculator::default();
    let options = calc.preview(14.0, Some(3)).unwrap();
    assert_eq!(options.len(), 10);

    for pair in options.windows(2) {
        assert!(pair[0].kg_co2e <= pair[1].kg_co2e);
    }

    for opt in &options {
        let committed = calc.estimate(&trip(opt.mode, opt.fuel_type, 14.0, Some(3))).unwrap();
        assert_eq!(opt.kg_co2e, committed.kg_co2e, "{}", opt.key);
        assert_eq!(Some(opt.key.as_str()), committed.subcategory.as_deref());
    }

    // bus shares with the same occupancy as the committed path
    let bus = options.iter().find(|o| o.key == "bus").unwrap();
    assert!((bus.kg_co2e - 14.0 * 0.089 / 3.0).abs() < 1e-12);
}

#[test]
fn preview_highlights() {
    let options = TransportCalculator::default().preview(10.0, None).unwrap();

    let green = greenest(&options, 3);
    assert_eq!(green.len(), 3);
    assert!(green.iter().all(|o| o.impact <= ImpactClass::Moderate));

    let worst = highest(&options, 3);
    assert_eq!(worst[0].key, "plane");
    assert!(worst.iter().all(|o| o.impact >= ImpactClass::High));
}

#[test]
fn factor_keys() {
    assert_eq!(factor_key(TransportMode::Car, Some(FuelType::Electric)).unwrap(), "car_electric");
    assert_eq!(factor_key(TransportMode::Metro, None).unwrap(), "metro");
    assert!(factor_key(TransportMode::Car, None).is_err());
}

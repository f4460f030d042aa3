use std::fs;

use ecofootprint_core::storage::{catalog_from_config, load_appliances, load_versions, save_appliances, save_catalog};
use ecofootprint_core::{
    load_config, save_config, CalcRequest, ElectricityInput, EmissionFactorCatalog, Engine, EngineConfig,
};

fn tmp(name: &str) -> String {
    std::env::temp_dir()
        .join(format!("ecofootprint_{}_{}", std::process::id(), name))
        .to_string_lossy()
        .into_owned()
}

#[test]
fn config_round_trip() {
    let path = tmp("config.json");
    let config = EngineConfig {
        catalog_path: Some("/srv/factors/catalog.json".into()),
        appliance_path: None,
        default_horizon: 6,
        metrics_enabled: false,
    };

    save_config(&config, &path).expect("save config");
    let loaded = load_config(&path).expect("load config");
    assert_eq!(loaded, config);

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"defaultHorizon\": 6"));

    fs::remove_file(&path).ok();
}

#[test]
fn missing_config_gives_defaults() {
    let loaded = load_config(&tmp("does_not_exist.json")).unwrap();
    assert_eq!(loaded, EngineConfig::default());
    assert_eq!(loaded.default_horizon, 3);
}

#[test]
fn partial_config_fills_defaults() {
    let path = tmp("partial.json");
    fs::write(&path, r#"{ "defaultHorizon": 12 }"#).unwrap();
    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.default_horizon, 12);
    assert!(loaded.metrics_enabled);
    fs::remove_file(&path).ok();
}

#[test]
fn broken_config_names_the_field() {
    let path = tmp("broken.json");
    fs::write(&path, r#"{ "defaultHorizon": "soon" }"#).unwrap();
    let err = load_config(&path).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("parsing config"), "{chain}");
    assert!(chain.contains("defaultHorizon"), "{chain}");
    fs::remove_file(&path).ok();
}

#[test]
fn catalog_and_appliances_round_trip() {
    let catalog_path = tmp("catalog.json");
    let appliance_path = tmp("appliances.json");
    let builtin = EmissionFactorCatalog::builtin();

    save_catalog(&builtin, &catalog_path).unwrap();
    save_appliances(&builtin, &appliance_path).unwrap();

    assert_eq!(load_versions(&catalog_path).unwrap(), builtin.versions());
    assert_eq!(load_appliances(&appliance_path).unwrap(), builtin.appliances());

    let config = EngineConfig {
        catalog_path: Some(catalog_path.clone()),
        appliance_path: Some(appliance_path.clone()),
        ..EngineConfig::default()
    };
    let rebuilt = catalog_from_config(&config).unwrap();
    assert_eq!(rebuilt.versions(), builtin.versions());

    fs::remove_file(&catalog_path).ok();
    fs::remove_file(&appliance_path).ok();
}

#[test]
fn engine_uses_the_configured_catalog() {
    let catalog_path = tmp("custom_catalog.json");
    fs::write(
        &catalog_path,
        r#"[{
            "label": "campus-2025",
            "validFrom": "2025-01-01",
            "hash": "campus-abc",
            "factors": [
                { "category": "electricity", "subcategory": "grid", "country": "CL", "value": 0.5, "unit": "kgCO2e/kWh" }
            ]
        }]"#,
    )
    .unwrap();

    let config = EngineConfig { catalog_path: Some(catalog_path.clone()), ..EngineConfig::default() };
    let engine = Engine::from_config(config).unwrap();

    let input = ElectricityInput::builder().select("laptop").country("CL").period("2025-05".parse().unwrap()).build().unwrap();
    let result = engine.calculate_electricity(&CalcRequest::new(input)).unwrap();
    assert_eq!(result.factor_info.version, "campus-2025");
    assert!((result.kg_co2e - 7.5).abs() < 1e-12);

    fs::remove_file(&catalog_path).ok();
}

#[test]
fn invalid_catalog_file_fails_engine_start() {
    let catalog_path = tmp("empty_catalog.json");
    fs::write(&catalog_path, "[]").unwrap();
    let config = EngineConfig { catalog_path: Some(catalog_path.clone()), ..EngineConfig::default() };
    let err = Engine::from_config(config).unwrap_err();
    assert!(format!("{err:#}").contains("validating emission factor catalog"));
    fs::remove_file(&catalog_path).ok();
}

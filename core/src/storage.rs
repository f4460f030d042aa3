use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::catalog::EmissionFactorCatalog;
use crate::config::EngineConfig;
use crate::models::{ApplianceProfile, CatalogVersion};

/// Reads the engine config (JSON). A missing file yields the defaults.
pub fn load_config(path: &str) -> Result<EngineConfig> {
    if !Path::new(path).exists() {
        warn!("config {} not found, using defaults", path);
        return Ok(EngineConfig::default());
    }
    let contents = std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
    let de = &mut serde_json::Deserializer::from_str(&contents);
    let config: EngineConfig =
        serde_path_to_error::deserialize(de).with_context(|| format!("parsing config {path}"))?;
    info!("config loaded from {} (default horizon {})", path, config.default_horizon);
    Ok(config)
}

pub fn save_config(config: &EngineConfig, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json).with_context(|| format!("writing config {path}"))?;
    Ok(())
}

/// Builds the catalog the config asks for: files where given, built-in tables otherwise.
pub fn catalog_from_config(config: &EngineConfig) -> Result<EmissionFactorCatalog> {
    let builtin = EmissionFactorCatalog::builtin();
    let versions = match &config.catalog_path {
        Some(path) => load_versions(path)?,
        None => builtin.versions().to_vec(),
    };
    let appliances = match &config.appliance_path {
        Some(path) => load_appliances(path)?,
        None => builtin.appliances().to_vec(),
    };
    let catalog = EmissionFactorCatalog::new(versions, appliances).context("validating emission factor catalog")?;
    info!(
        "catalog ready: {} version(s), {} appliance(s)",
        catalog.versions().len(),
        catalog.appliances().len()
    );
    Ok(catalog)
}

/// Factor versions from a JSON array.
pub fn load_versions(path: &str) -> Result<Vec<CatalogVersion>> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("reading catalog {path}"))?;
    let de = &mut serde_json::Deserializer::from_str(&contents);
    let versions = serde_path_to_error::deserialize(de).with_context(|| format!("parsing catalog {path}"))?;
    Ok(versions)
}

pub fn load_appliances(path: &str) -> Result<Vec<ApplianceProfile>> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("reading appliances {path}"))?;
    let de = &mut serde_json::Deserializer::from_str(&contents);
    let appliances = serde_path_to_error::deserialize(de).with_context(|| format!("parsing appliances {path}"))?;
    Ok(appliances)
}

/// Writes the catalog's factor versions as pretty JSON (the format `load_versions` reads).
pub fn save_catalog(catalog: &EmissionFactorCatalog, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(catalog.versions())?;
    std::fs::write(path, json).with_context(|| format!("writing catalog {path}"))?;
    info!("catalog saved to {} ({} version(s))", path, catalog.versions().len());
    Ok(())
}

pub fn save_appliances(catalog: &EmissionFactorCatalog, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(catalog.appliances())?;
    std::fs::write(path, json).with_context(|| format!("writing appliances {path}"))?;
    Ok(())
}

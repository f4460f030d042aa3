use thiserror::Error;

use crate::types::Category;

/// Typed failures reported by the calculation and forecasting engine.
#[derive(Debug, Error)]
pub enum CalcError {
    /// Malformed or out-of-range input (zero weight, zero distance, empty
    /// appliance set, invalid occupancy, bad period ...).
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// No catalog entry for the requested combination. Never defaulted to zero.
    #[error("no emission factor for {category}/{subcategory}{}{}", fmt_method(.method), fmt_country(.country))]
    UnknownFactor {
        category: Category,
        subcategory: String,
        method: Option<String>,
        country: Option<String>,
    },

    /// Forecast requested on a history the regression line is undefined for.
    #[error("forecast needs at least 2 distinct points, got {points}")]
    InsufficientData { points: usize },

    /// Boundary payload could not be decoded; `path` locates the bad field.
    #[error("invalid json at `{path}`: {message}")]
    Json { path: String, message: String },
}

fn fmt_method(method: &Option<String>) -> String {
    method.as_deref().map(|m| format!(" (method={m})")).unwrap_or_default()
}

fn fmt_country(country: &Option<String>) -> String {
    country.as_deref().map(|c| format!(" (country={c})")).unwrap_or_default()
}

impl CalcError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::Validation { field, reason: reason.into() }
    }

    /// Stable machine-readable tag for the boundary layer.
    pub fn kind(&self) -> &'static str {
        match self {
            CalcError::Validation { .. } => "validation",
            CalcError::UnknownFactor { .. } => "unknown_factor",
            CalcError::InsufficientData { .. } => "insufficient_data",
            CalcError::Json { .. } => "invalid_json",
        }
    }
}

impl<E> From<serde_path_to_error::Error<E>> for CalcError
where
    E: std::fmt::Display,
{
    fn from(err: serde_path_to_error::Error<E>) -> Self {
        CalcError::Json {
            path: err.path().to_string(),
            message: err.inner().to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, CalcError>;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::period::Period;
use crate::types::{CalcRequest, CalculationResult, Category, ElectricityInput, Estimate, TransportInput, WasteInput};

// Fixed namespace so the same idempotency key always maps to the same calc id.
const CALC_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_2b7e_93a4_4d0e_b5c8_0e4f_7a2d_9c31);

/// Inputs that belong to an accounting month.
pub trait ActivityInput: Serialize {
    fn period(&self) -> Period;
}

impl ActivityInput for ElectricityInput {
    fn period(&self) -> Period {
        self.period
    }
}

impl ActivityInput for TransportInput {
    fn period(&self) -> Period {
        self.period
    }
}

impl ActivityInput for WasteInput {
    fn period(&self) -> Period {
        self.period
    }
}

/// A category calculator. `estimate` is the pure emission rule; `compute`
/// wraps it in the request envelope (ids, timestamp, input snapshot).
pub trait Calculator {
    type Input: ActivityInput;

    const CATEGORY: Category;

    fn estimate(&self, input: &Self::Input) -> EngineResult<Estimate>;

    fn compute(&self, request: &CalcRequest<Self::Input>) -> EngineResult<CalculationResult> {
        self.compute_at(request, Utc::now())
    }

    fn compute_at(
        &self,
        request: &CalcRequest<Self::Input>,
        created_at: DateTime<Utc>,
    ) -> EngineResult<CalculationResult> {
        let estimate = self.estimate(&request.input)?;
        Ok(stamp(Self::CATEGORY, request, estimate, created_at))
    }
}

/// Deterministic for a given (category, user, key); random when no key is supplied.
pub fn calc_id_for(category: Category, user_id: Option<&str>, idempotency_key: Option<&str>) -> String {
    match idempotency_key {
        Some(key) => Uuid::new_v5(&CALC_ID_NAMESPACE, calc_id_name(category, user_id, key).as_bytes()).to_string(),
        None => Uuid::new_v4().to_string(),
    }
}

// Length-prefixed parts: no (user, key) split can collide with another.
fn calc_id_name(category: Category, user_id: Option<&str>, key: &str) -> String {
    let user = match user_id {
        Some(u) => format!("u{}:{}", u.len(), u),
        None => "-".to_string(),
    };
    format!("{}:{}:k{}:{}", category, user, key.len(), key)
}

fn stamp<T: ActivityInput>(
    category: Category,
    request: &CalcRequest<T>,
    estimate: Estimate,
    created_at: DateTime<Utc>,
) -> CalculationResult {
    CalculationResult {
        calc_id: calc_id_for(category, request.user_id.as_deref(), request.idempotency_key.as_deref()),
        idempotency_key: request.idempotency_key.clone(),
        user_id: request.user_id.clone(),
        category,
        subcategory: estimate.subcategory,
        period: request.input.period(),
        kg_co2e: estimate.kg_co2e,
        activity: estimate.activity,
        factor_info: estimate.factor_info,
        impact: estimate.impact,
        input_snapshot: serde_json::to_value(&request.input).unwrap_or(Value::Null),
        created_at,
    }
}

// Python bindings: every function takes a JSON string or a dict and returns a dict.
// Failures raise ValueError carrying the `error_json` payload.

use once_cell::sync::OnceCell;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::{error_json, CalcError, Engine, EngineResult};

static ENGINE: OnceCell<Engine> = OnceCell::new();

fn engine() -> PyResult<&'static Engine> {
    ENGINE.get_or_try_init(|| {
        let config = match std::env::var("ECOFOOTPRINT_CONFIG") {
            Ok(path) => crate::storage::load_config(&path),
            Err(_) => Ok(crate::EngineConfig::default()),
        };
        config
            .and_then(Engine::from_config)
            .map_err(|e| PyValueError::new_err(format!("engine init failed: {e:#}")))
    })
}

/// Accept both `str` and any json.dumps-able Python object.
fn payload_to_json(py: Python<'_>, payload: &PyAny) -> PyResult<String> {
    if let Ok(s) = payload.extract::<&str>() {
        return Ok(s.to_owned());
    }
    let json_mod = py
        .import("json")
        .map_err(|e| PyValueError::new_err(format!("failed to import json: {e}")))?;
    json_mod
        .call_method1("dumps", (payload,))
        .and_then(|o| o.extract::<String>())
        .map_err(|e| PyValueError::new_err(format!("failed to serialize payload with json.dumps: {e}")))
}

fn call(
    py: Python<'_>,
    payload: &PyAny,
    f: fn(&Engine, &str) -> EngineResult<String>,
) -> PyResult<PyObject> {
    let json_in = payload_to_json(py, payload)?;
    let out = f(engine()?, &json_in).map_err(|e: CalcError| PyValueError::new_err(error_json(&e)))?;

    // back to a dict through json.loads (no pyo3 serde feature needed)
    let json_mod = py
        .import("json")
        .map_err(|e| PyValueError::new_err(format!("failed to import json: {e}")))?;
    let obj = json_mod
        .call_method1("loads", (out.as_str(),))
        .map_err(|e| PyValueError::new_err(format!("internal JSON parse error via json.loads: {e}")))?;
    Ok(obj.into_py(py))
}

#[pyfunction]
fn calculate_electricity(py: Python<'_>, payload: &PyAny) -> PyResult<PyObject> {
    call(py, payload, crate::calculate_electricity_json)
}

#[pyfunction]
fn calculate_transport(py: Python<'_>, payload: &PyAny) -> PyResult<PyObject> {
    call(py, payload, crate::calculate_transport_json)
}

#[pyfunction]
fn calculate_waste(py: Python<'_>, payload: &PyAny) -> PyResult<PyObject> {
    call(py, payload, crate::calculate_waste_json)
}

#[pyfunction]
fn transport_preview(py: Python<'_>, payload: &PyAny) -> PyResult<PyObject> {
    call(py, payload, crate::transport_preview_json)
}

#[pyfunction]
fn aggregate(py: Python<'_>, payload: &PyAny) -> PyResult<PyObject> {
    call(py, payload, crate::aggregate_json)
}

#[pyfunction]
fn forecast(py: Python<'_>, payload: &PyAny) -> PyResult<PyObject> {
    call(py, payload, crate::forecast_json)
}

#[pyfunction]
fn metrics_text() -> PyResult<String> {
    Ok(engine()?.metrics().map(|m| m.render()).unwrap_or_default())
}

#[pymodule]
fn ecofootprint_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(calculate_electricity, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_transport, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_waste, m)?)?;
    m.add_function(wrap_pyfunction!(transport_preview, m)?)?;
    m.add_function(wrap_pyfunction!(aggregate, m)?)?;
    m.add_function(wrap_pyfunction!(forecast, m)?)?;
    m.add_function(wrap_pyfunction!(metrics_text, m)?)?;
    Ok(())
}

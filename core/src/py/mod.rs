// PyO3 bridge: thin JSON-string wrappers around crate::api.
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::api;
use crate::error::CoreError;

fn to_py_err(e: CoreError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

#[pyfunction]
fn evaluate_rows_json(json_in: &str) -> PyResult<String> {
    api::evaluate_rows_json(json_in).map_err(to_py_err)
}

#[pyfunction]
fn team_record_json(json_in: &str) -> PyResult<String> {
    api::team_record_json(json_in).map_err(to_py_err)
}

#[pyfunction]
fn athlete_category_json(json_in: &str) -> PyResult<String> {
    api::athlete_category_json(json_in).map_err(to_py_err)
}

#[pyfunction]
fn normalize_category_label(label: &str) -> String {
    crate::category::normalize_category_label(label)
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3 module
// ──────────────────────────────────────────────────────────────────────────────

#[pymodule]
fn judofed_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(evaluate_rows_json, m)?)?;
    m.add_function(wrap_pyfunction!(team_record_json, m)?)?;
    m.add_function(wrap_pyfunction!(athlete_category_json, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_category_label, m)?)?;
    Ok(())
}

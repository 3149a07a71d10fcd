//! Python FFI bindings via PyO3.
//!
//! Exposes the decision gate to Python: a `ParameterSet` class and an
//! `evaluate` function that takes raw CSV-style rows (`dict[str, str]`),
//! normalises them with the default column schema, and returns plain dicts.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! import csv
//! from dg_core import ParameterSet, evaluate
//!
//! with open("phase3_4b_abl_vs_dat_v2.csv", newline="") as f:
//!     reader = csv.DictReader(f)
//!     rows = list(reader)
//!
//! params = ParameterSet(steps=12, theta_on=1.2, theta_off=0.6)
//! params.validate()
//! results, traces = evaluate(rows, params, trace_filter="8:53,7:96,2:10",
//!                            fieldnames=reader.fieldnames)
//! print(sum(r["D_final"] for r in results), "segments switched on")
//! ```

#![allow(non_snake_case)]

use std::collections::{BTreeSet, HashMap};

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::assemble::{evaluate as evaluate_segments, ResultRecord, TraceRecord};
use crate::filter::TraceFilter;
use crate::normalize::SchemaMap;
use crate::params::ParameterSet as RustParameterSet;

// ── ParameterSet ──────────────────────────────────────────────────────────────

/// Weights, hysteresis thresholds, gain/decay rates, bias and step count.
///
/// All arguments are optional and default to the published measurement run.
#[pyclass(name = "ParameterSet")]
#[derive(Clone)]
pub struct PyParameterSet {
    inner: RustParameterSet,
}

#[pymethods]
impl PyParameterSet {
    /// Create a new ParameterSet.
    #[new]
    #[pyo3(signature = (
        w_a=1.0, w_b=1.0, w_cond=1.5, w_g=1.0,
        theta_on=1.2, theta_off=0.6,
        k_gen_a=0.35, k_dec_a=0.15, k_gen_b=0.35, k_dec_b=0.15,
        g=0.0, steps=12
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        w_a: f64,
        w_b: f64,
        w_cond: f64,
        w_g: f64,
        theta_on: f64,
        theta_off: f64,
        k_gen_a: f64,
        k_dec_a: f64,
        k_gen_b: f64,
        k_dec_b: f64,
        g: f64,
        steps: i32,
    ) -> Self {
        Self {
            inner: RustParameterSet {
                w_a,
                w_b,
                w_cond,
                w_g,
                theta_on,
                theta_off,
                k_gen_a,
                k_dec_a,
                k_gen_b,
                k_dec_b,
                g,
                steps,
            },
        }
    }

    /// Raise ValueError if the parameter set breaks the caller contract.
    pub fn validate(&self) -> PyResult<()> {
        self.inner
            .validate()
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Returns the on-threshold.
    #[getter]
    pub fn theta_on(&self) -> f64 {
        self.inner.theta_on
    }
    /// Returns the off-threshold.
    #[getter]
    pub fn theta_off(&self) -> f64 {
        self.inner.theta_off
    }
    /// Returns the step count.
    #[getter]
    pub fn steps(&self) -> i32 {
        self.inner.steps
    }

    /// Reproducibility echo, e.g. `w_a=1.0,w_b=1.0,...,g=0.0`.
    pub fn echo(&self) -> String {
        self.inner.to_string()
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!("ParameterSet({}, steps={})", self.inner, self.inner.steps)
    }
}

// ── Record conversion ─────────────────────────────────────────────────────────

fn locator_parts(locator: &Option<crate::segment::SourceLocator>) -> (&str, &str) {
    locator
        .as_ref()
        .map_or(("", ""), |l| (l.chapter.as_str(), l.verse.as_str()))
}

fn result_to_dict<'py>(py: Python<'py>, r: &ResultRecord) -> PyResult<Bound<'py, PyDict>> {
    let d = PyDict::new_bound(py);
    let (chapter, verse) = locator_parts(&r.locator);
    d.set_item("segment_id", &r.segment_id)?;
    d.set_item("collection", r.collection.as_deref().unwrap_or(""))?;
    d.set_item("chapter", chapter)?;
    d.set_item("verse", verse)?;
    d.set_item("class", &r.class)?;
    d.set_item("cond", r.cond)?;
    d.set_item("A0", r.a0)?;
    d.set_item("B0", r.b0)?;
    d.set_item("Pi0_static", r.pi0_static)?;
    d.set_item("D0_static", r.decision_static.as_bit())?;
    d.set_item("steps", r.steps)?;
    d.set_item("acc_a_final", r.acc_a_final)?;
    d.set_item("acc_b_final", r.acc_b_final)?;
    d.set_item("Pi_final", r.pi_final)?;
    d.set_item("D_final", r.decision_final.as_bit())?;
    d.set_item("params", r.params.to_string())?;
    Ok(d)
}

fn trace_to_dict<'py>(py: Python<'py>, t: &TraceRecord) -> PyResult<Bound<'py, PyDict>> {
    let d = PyDict::new_bound(py);
    let (chapter, verse) = locator_parts(&t.locator);
    d.set_item("t", t.step)?;
    d.set_item("segment_id", &t.segment_id)?;
    d.set_item("collection", t.collection.as_deref().unwrap_or(""))?;
    d.set_item("chapter", chapter)?;
    d.set_item("verse", verse)?;
    d.set_item("class", &t.class)?;
    d.set_item("cond", t.cond)?;
    d.set_item("A0", t.a0)?;
    d.set_item("B0", t.b0)?;
    d.set_item("acc_a", t.acc_a)?;
    d.set_item("acc_b", t.acc_b)?;
    d.set_item("Pi", t.pi)?;
    d.set_item("D", t.decision.as_bit())?;
    Ok(d)
}

// ── evaluate ──────────────────────────────────────────────────────────────────

/// Evaluate raw rows and return `(results, traces)` as lists of dicts.
///
/// Args:
///     rows:         list of dict[str, str], e.g. from csv.DictReader
///     params:       ParameterSet
///     trace_filter: "8:53,7:96" pairs and/or "segment_id=..." items
///     fieldnames:   header order for column auto-detection; defaults to the
///                   sorted union of all row keys
#[pyfunction]
#[pyo3(signature = (rows, params, trace_filter="", fieldnames=None))]
pub fn evaluate<'py>(
    py: Python<'py>,
    rows: Vec<HashMap<String, String>>,
    params: &PyParameterSet,
    trace_filter: &str,
    fieldnames: Option<Vec<String>>,
) -> PyResult<(Bound<'py, PyList>, Bound<'py, PyList>)> {
    let header: Vec<String> = fieldnames.unwrap_or_else(|| {
        rows.iter()
            .flat_map(|r| r.keys().cloned())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    });
    let mapping = SchemaMap::default()
        .resolve(header.as_slice())
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let segments = rows.iter().map(|row| mapping.normalize(row));
    let filter = TraceFilter::parse(trace_filter);
    let run = evaluate_segments(segments, &params.inner, &filter);

    let results = PyList::empty_bound(py);
    for r in &run.results {
        results.append(result_to_dict(py, r)?)?;
    }
    let traces = PyList::empty_bound(py);
    for t in &run.traces {
        traces.append(trace_to_dict(py, t)?)?;
    }
    Ok((results, traces))
}

// ── Module entry point ────────────────────────────────────────────────────────

/// Decision gate Python bindings.
#[pymodule]
pub fn dg_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyParameterSet>()?;
    m.add_function(wrap_pyfunction!(evaluate, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

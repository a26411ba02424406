//! Minimal PyO3 module exposing neuro-flap-core to the Python evolution loop.

use neuro_flap_core::{DecisionNetwork, NetworkParams};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Crate version reported to Python.
#[pyfunction]
fn version() -> &'static str {
    "0.1.0"
}

/// Params JSON for a freshly sampled network.
#[pyfunction]
fn random_params(seed: u64) -> PyResult<String> {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    DecisionNetwork::random(&mut rng)
        .to_params()
        .to_json()
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Jump probability for one sensor vector under the given params JSON.
#[pyfunction]
fn forward(params_json: &str, sensors: [f64; 3]) -> PyResult<f64> {
    let network = NetworkParams::from_json(params_json)
        .and_then(|params| DecisionNetwork::try_from(&params))
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(network.forward(&sensors))
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(random_params, m)?)?;
    m.add_function(wrap_pyfunction!(forward, m)?)?;
    Ok(())
}

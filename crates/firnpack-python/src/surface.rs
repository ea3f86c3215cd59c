use pyo3::prelude::*;

use firnpack_core::albedo::processes;
use firnpack_core::config::AlbedoConfig;
use firnpack_core::layer;

/// Age-only snow albedo with default parameters.
#[pyfunction]
fn simple_albedo(hours_since_snowfall: f64) -> f64 {
    processes::simple_albedo(&AlbedoConfig::default(), hours_since_snowfall)
}

/// Bougamont05 decay timescale [days] with default parameters.
#[pyfunction]
fn t_star(surface_temperature: f64) -> f64 {
    processes::t_star(&AlbedoConfig::default(), surface_temperature)
}

#[pyfunction]
fn lejeune_weight(snow_height: f64, critical_thickness: f64, exponent: f64) -> f64 {
    processes::lejeune_weight(snow_height, critical_thickness, exponent)
}

#[pyfunction]
fn ice_fraction_from_density(density: f64) -> f64 {
    layer::ice_fraction_from_density(density)
}

#[pyfunction]
fn irreducible_water_content(ice_fraction: f64) -> f64 {
    layer::irreducible_water_content(ice_fraction)
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "surface")?;
    m.add_function(wrap_pyfunction!(simple_albedo, &m)?)?;
    m.add_function(wrap_pyfunction!(t_star, &m)?)?;
    m.add_function(wrap_pyfunction!(lejeune_weight, &m)?)?;
    m.add_function(wrap_pyfunction!(ice_fraction_from_density, &m)?)?;
    m.add_function(wrap_pyfunction!(irreducible_water_content, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}

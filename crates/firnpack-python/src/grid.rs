use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::convert::{checked_slice_min, contiguous_slice, to_py_err};

use firnpack_core::layer::LayerProfile;
use firnpack_core::{
    init_snowpack, load_snowpack, AlbedoModel, AlbedoOutput, Grid, InitialForcing, ModelConfig,
    RoughnessModel, Snapshot,
};

// ---------------------------------------------------------------------------
// Typed pyclass result objects
// ---------------------------------------------------------------------------

define_profile_result! {
    /// Per-layer arrays of a grid snapshot, surface first.
    pub struct LayerArrays from LayerProfile {
        height, density, temperature, liquid_water_content, ice_fraction,
    }
}

define_scalar_result! {
    /// Surface albedo and the running snow albedo for the next call.
    pub struct AlbedoResult from AlbedoOutput {
        albedo, albedo_snow,
    }
}

fn load_config(path: Option<&str>) -> PyResult<ModelConfig> {
    match path {
        Some(p) => ModelConfig::from_file(p).map_err(to_py_err),
        None => Ok(ModelConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// One glacier column with its configured surface schemes.
#[pyclass(name = "Grid")]
pub struct PyGrid {
    grid: Grid,
    config: ModelConfig,
    albedo: AlbedoModel,
    roughness: RoughnessModel,
}

impl PyGrid {
    fn wrap(grid: Grid, config: ModelConfig) -> Self {
        Self {
            albedo: AlbedoModel::from_config(&config),
            roughness: RoughnessModel::from_config(&config),
            grid,
            config,
        }
    }
}

#[pymethods]
impl PyGrid {
    /// Cold-start a column from the initial snow height and air temperature.
    #[staticmethod]
    #[pyo3(signature = (temperature, snow_height=None, config_path=None))]
    fn init(temperature: f64, snow_height: Option<f64>, config_path: Option<&str>) -> PyResult<Self> {
        let config = load_config(config_path)?;
        let forcing = InitialForcing {
            snow_height,
            temperature,
        };
        let grid = init_snowpack(&forcing, &config).map_err(to_py_err)?;
        Ok(Self::wrap(grid, config))
    }

    /// Restore a column from per-layer arrays (restart).
    #[staticmethod]
    #[allow(clippy::too_many_arguments)]
    #[pyo3(signature = (
        height,
        density,
        temperature,
        liquid_water_content,
        ice_fraction=None,
        new_snow_height=0.0,
        new_snow_timestamp=0.0,
        old_snow_timestamp=0.0,
        config_path=None,
    ))]
    fn from_arrays<'py>(
        height: PyReadonlyArray1<'py, f64>,
        density: PyReadonlyArray1<'py, f64>,
        temperature: PyReadonlyArray1<'py, f64>,
        liquid_water_content: PyReadonlyArray1<'py, f64>,
        ice_fraction: Option<PyReadonlyArray1<'py, f64>>,
        new_snow_height: f64,
        new_snow_timestamp: f64,
        old_snow_timestamp: f64,
        config_path: Option<&str>,
    ) -> PyResult<Self> {
        let config = load_config(config_path)?;
        let h = contiguous_slice(&height)?;
        let n = h.len();
        let ice_fraction = match &ice_fraction {
            Some(arr) => checked_slice_min(arr, n, "ice_fraction")?.to_vec(),
            None => Vec::new(),
        };
        let snapshot = Snapshot {
            n_layers: n,
            layers: LayerProfile {
                height: h.to_vec(),
                density: checked_slice_min(&density, n, "density")?.to_vec(),
                temperature: checked_slice_min(&temperature, n, "temperature")?.to_vec(),
                liquid_water_content: checked_slice_min(
                    &liquid_water_content,
                    n,
                    "liquid_water_content",
                )?
                .to_vec(),
                ice_fraction,
            },
            materials: Vec::new(),
            new_snow_height,
            new_snow_timestamp,
            old_snow_timestamp,
        };
        let grid = load_snowpack(&snapshot, &config).map_err(to_py_err)?;
        Ok(Self::wrap(grid, config))
    }

    #[getter]
    fn number_of_layers(&self) -> usize {
        self.grid.number_of_layers()
    }

    fn total_height(&self) -> f64 {
        self.grid.total_height()
    }

    fn total_snowheight(&self) -> f64 {
        self.grid.total_snowheight()
    }

    fn number_snow_layers(&self) -> usize {
        self.grid.number_snow_layers()
    }

    fn heights<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_vec(py, self.grid.heights())
    }

    fn temperatures<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_vec(py, self.grid.temperatures())
    }

    fn densities<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_vec(py, self.grid.densities())
    }

    fn depths<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_vec(py, self.grid.depths())
    }

    /// Every per-layer quantity as a dict of numpy arrays.
    fn arrays<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let g = &self.grid;
        Ok(columns_to_dict!(py,
            height => g.heights(),
            density => g.densities(),
            temperature => g.temperatures(),
            liquid_water_content => g.liquid_water_contents(),
            ice_fraction => g.ice_fractions(),
            refreeze => g.refreezes(),
            specific_heat => g.specific_heats(),
            thermal_conductivity => g.thermal_conductivities(),
            cold_content => g.cold_contents(),
        ))
    }

    fn layer_density(&self, idx: usize) -> PyResult<f64> {
        self.grid.layer_density(idx).map_err(to_py_err)
    }

    fn layer_irreducible_water_content(&self, idx: usize) -> PyResult<f64> {
        self.grid
            .layer_irreducible_water_content(idx)
            .map_err(to_py_err)
    }

    fn set_layer_height(&mut self, idx: usize, value: f64) -> PyResult<()> {
        self.grid.set_layer_height(idx, value).map_err(to_py_err)
    }

    fn set_layer_temperature(&mut self, idx: usize, value: f64) -> PyResult<()> {
        self.grid.set_layer_temperature(idx, value).map_err(to_py_err)
    }

    fn set_layer_liquid_water_content(&mut self, idx: usize, value: f64) -> PyResult<()> {
        self.grid
            .set_layer_liquid_water_content(idx, value)
            .map_err(to_py_err)
    }

    #[pyo3(signature = (height, density, temperature, liquid_water_content=0.0))]
    fn add_fresh_snow(
        &mut self,
        height: f64,
        density: f64,
        temperature: f64,
        liquid_water_content: f64,
    ) -> PyResult<()> {
        self.grid
            .add_fresh_snow(height, density, temperature, liquid_water_content)
            .map_err(to_py_err)
    }

    fn remove_layer(&mut self, idx: usize) -> PyResult<()> {
        self.grid.remove_layer(idx).map(|_| ()).map_err(to_py_err)
    }

    fn remove_layers_merge(&mut self, idx: usize) -> PyResult<()> {
        self.grid.remove_layers_merge(idx).map_err(to_py_err)
    }

    fn split_layers(&mut self, threshold: f64) -> PyResult<usize> {
        self.grid.split_layers(threshold).map_err(to_py_err)
    }

    fn merge_layers(&mut self, threshold: f64) -> PyResult<usize> {
        self.grid.merge_layers(threshold).map_err(to_py_err)
    }

    /// Maintenance pass. Returns (removed, split, merged).
    fn update_grid(&mut self) -> PyResult<(usize, usize, usize)> {
        let s = self.grid.update_grid().map_err(to_py_err)?;
        Ok((s.removed, s.split, s.merged))
    }

    fn age_fresh_snow(&mut self, seconds: f64) {
        self.grid.age_fresh_snow(seconds);
    }

    /// (height, timestamp, old_timestamp) of the fresh snow.
    fn fresh_snow_props(&self) -> (f64, f64, f64) {
        let fs = self.grid.fresh_snow_props();
        (fs.height, fs.timestamp, fs.old_timestamp)
    }

    fn set_fresh_snow_props_to_old_props(&mut self) {
        self.grid.set_fresh_snow_props_to_old_props();
    }

    fn update_albedo(&mut self, surface_temperature: f64, albedo_snow: f64) -> AlbedoResult {
        let out = self
            .albedo
            .update(&mut self.grid, surface_temperature, albedo_snow);
        AlbedoResult::from_output(&out)
    }

    fn roughness(&self) -> f64 {
        self.roughness.roughness(&self.grid)
    }

    fn snapshot(&self, py: Python<'_>) -> LayerArrays {
        LayerArrays::from_profile(py, self.grid.snapshot().layers)
    }

    fn save(&self, path: &str) -> PyResult<()> {
        self.grid.snapshot().save_to_file(path).map_err(to_py_err)
    }

    #[getter]
    fn dt(&self) -> f64 {
        self.config.dt
    }

    fn __repr__(&self) -> String {
        format!(
            "Grid(layers={}, height={:.3}, snow={:.3})",
            self.grid.number_of_layers(),
            self.grid.total_height(),
            self.grid.total_snowheight()
        )
    }

    fn __str__(&self) -> String {
        self.grid.to_string()
    }
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "grid")?;
    m.add_class::<PyGrid>()?;
    m.add_class::<LayerArrays>()?;
    m.add_class::<AlbedoResult>()?;
    parent.add_submodule(&m)?;
    Ok(())
}

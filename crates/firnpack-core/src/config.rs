//! Model configuration.
//!
//! Read once at startup (JSON), validated, then shared read-only by every
//! grid instance. Every field has a default so a partial file is enough.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::albedo::AlbedoMethod;
use crate::constants::{ICE_DENSITY, ZERO_TEMPERATURE};
use crate::error::{GridError, GridResult};
use crate::roughness::RoughnessMethod;
use crate::traits::SchemeMethod;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Integration time step [s].
    #[serde(default = "default_dt")]
    pub dt: f64,

    #[serde(default)]
    pub grid: GridConfig,

    #[serde(default)]
    pub init: InitConfig,

    #[serde(default)]
    pub albedo: AlbedoConfig,

    #[serde(default)]
    pub roughness: RoughnessConfig,

    #[serde(default)]
    pub debris: DebrisConfig,
}

fn default_dt() -> f64 { 3600.0 }

/// Layer-management thresholds carried by each [`crate::grid::Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Bulk density separating snow from ice [kg m^-3].
    #[serde(default = "default_snow_ice_threshold")]
    pub snow_ice_threshold: f64,

    /// Layers thinner than this are merged away [m].
    #[serde(default = "default_min_layer_height")]
    pub min_layer_height: f64,

    /// Layers thicker than this are split; merges never exceed it [m].
    #[serde(default = "default_max_layer_height")]
    pub max_layer_height: f64,

    /// Height threshold handed to the merge pass [m].
    #[serde(default = "default_merge_threshold")]
    pub merge_threshold: f64,

    /// Density difference under which neighbours count as alike [kg m^-3].
    #[serde(default = "default_density_tolerance")]
    pub density_tolerance: f64,

    /// Temperature difference under which neighbours count as alike [K].
    #[serde(default = "default_temperature_tolerance")]
    pub temperature_tolerance: f64,

    /// Upper bound on the number of layers.
    #[serde(default = "default_max_layers")]
    pub max_layers: usize,

    /// Time step used to age the buried snow on snowfall [s].
    #[serde(default = "default_dt")]
    pub dt: f64,
}

fn default_snow_ice_threshold() -> f64 { 900.0 }
fn default_min_layer_height() -> f64 { 0.001 }
fn default_max_layer_height() -> f64 { 0.5 }
fn default_merge_threshold() -> f64 { 0.05 }
fn default_density_tolerance() -> f64 { 5.0 }
fn default_temperature_tolerance() -> f64 { 0.01 }
fn default_max_layers() -> usize { 200 }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            snow_ice_threshold: default_snow_ice_threshold(),
            min_layer_height: default_min_layer_height(),
            max_layer_height: default_max_layer_height(),
            merge_threshold: default_merge_threshold(),
            density_tolerance: default_density_tolerance(),
            temperature_tolerance: default_temperature_tolerance(),
            max_layers: default_max_layers(),
            dt: default_dt(),
        }
    }
}

/// Cold-start column construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    /// Snow height used when the forcing has none [m].
    #[serde(default = "default_initial_snowheight")]
    pub initial_snowheight_constant: f64,

    /// Target thickness of initial snow layers [m].
    #[serde(default = "default_optimal_snow_layer_height")]
    pub optimal_snow_layer_height: f64,

    #[serde(default = "default_max_initial_snow_layers")]
    pub max_initial_snow_layers: usize,

    /// Depth of the glacier ice section below the snow [m].
    #[serde(default = "default_initial_glacier_height")]
    pub initial_glacier_height: f64,

    /// Thickness of each initial ice layer [m].
    #[serde(default = "default_initial_glacier_layer_height")]
    pub initial_glacier_layer_height: f64,

    #[serde(default = "default_top_density")]
    pub initial_top_density_snowpack: f64,

    #[serde(default = "default_bottom_density")]
    pub initial_bottom_density_snowpack: f64,

    /// Bottom boundary temperature [K].
    #[serde(default = "default_temperature_bottom")]
    pub temperature_bottom: f64,
}

fn default_initial_snowheight() -> f64 { 0.2 }
fn default_optimal_snow_layer_height() -> f64 { 0.1 }
fn default_max_initial_snow_layers() -> usize { 5 }
fn default_initial_glacier_height() -> f64 { 40.0 }
fn default_initial_glacier_layer_height() -> f64 { 0.5 }
fn default_top_density() -> f64 { 300.0 }
fn default_bottom_density() -> f64 { 600.0 }
fn default_temperature_bottom() -> f64 { 270.16 }

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            initial_snowheight_constant: default_initial_snowheight(),
            optimal_snow_layer_height: default_optimal_snow_layer_height(),
            max_initial_snow_layers: default_max_initial_snow_layers(),
            initial_glacier_height: default_initial_glacier_height(),
            initial_glacier_layer_height: default_initial_glacier_layer_height(),
            initial_top_density_snowpack: default_top_density(),
            initial_bottom_density_snowpack: default_bottom_density(),
            temperature_bottom: default_temperature_bottom(),
        }
    }
}

/// Albedo scheme selection and parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbedoConfig {
    #[serde(default = "default_albedo_method")]
    pub method: AlbedoMethod,

    #[serde(default = "default_albedo_fresh_snow")]
    pub albedo_fresh_snow: f64,

    #[serde(default = "default_albedo_firn")]
    pub albedo_firn: f64,

    #[serde(default = "default_albedo_ice")]
    pub albedo_ice: f64,

    #[serde(default = "default_albedo_debris")]
    pub albedo_debris: f64,

    /// Snow aging e-folding time [days].
    #[serde(default = "default_snow_aging")]
    pub snow_aging: f64,

    /// Snow depth e-folding scale [cm].
    #[serde(default = "default_snow_depth")]
    pub snow_depth: f64,

    /// Decay timescale on a melting surface [days].
    #[serde(default = "default_t_star_wet")]
    pub t_star_wet: f64,

    /// Decay timescale on a dry surface at the melting point [days].
    #[serde(default = "default_t_star_dry")]
    pub t_star_dry: f64,

    /// Dry-surface timescale increase per kelvin below melting [days K^-1].
    #[serde(default = "default_t_star_k")]
    pub t_star_k: f64,

    /// Temperature below which the dry timescale stops growing [K].
    #[serde(default = "default_t_star_cutoff")]
    pub t_star_cutoff: f64,

    /// Snow thickness at which debris is fully masked [m].
    #[serde(default = "default_critical_snowpack_thickness")]
    pub critical_snowpack_thickness: f64,

    #[serde(default = "default_lejeune_exponent")]
    pub lejeune_exponent: f64,
}

fn default_albedo_method() -> AlbedoMethod { AlbedoMethod::Oerlemans98 }
fn default_albedo_fresh_snow() -> f64 { 0.85 }
fn default_albedo_firn() -> f64 { 0.55 }
fn default_albedo_ice() -> f64 { 0.3 }
fn default_albedo_debris() -> f64 { 0.07 }
fn default_snow_aging() -> f64 { 22.0 }
fn default_snow_depth() -> f64 { 3.0 }
fn default_t_star_wet() -> f64 { 5.0 }
fn default_t_star_dry() -> f64 { 30.0 }
fn default_t_star_k() -> f64 { 7.0 }
fn default_t_star_cutoff() -> f64 { 263.17 }
fn default_critical_snowpack_thickness() -> f64 { 0.05 }
fn default_lejeune_exponent() -> f64 { 0.5 }

impl Default for AlbedoConfig {
    fn default() -> Self {
        Self {
            method: default_albedo_method(),
            albedo_fresh_snow: default_albedo_fresh_snow(),
            albedo_firn: default_albedo_firn(),
            albedo_ice: default_albedo_ice(),
            albedo_debris: default_albedo_debris(),
            snow_aging: default_snow_aging(),
            snow_depth: default_snow_depth(),
            t_star_wet: default_t_star_wet(),
            t_star_dry: default_t_star_dry(),
            t_star_k: default_t_star_k(),
            t_star_cutoff: default_t_star_cutoff(),
            critical_snowpack_thickness: default_critical_snowpack_thickness(),
            lejeune_exponent: default_lejeune_exponent(),
        }
    }
}

/// Surface roughness scheme selection and parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoughnessConfig {
    #[serde(default = "default_roughness_method")]
    pub method: RoughnessMethod,

    /// [mm]
    #[serde(default = "default_roughness_fresh_snow")]
    pub roughness_fresh_snow: f64,

    /// [mm]
    #[serde(default = "default_roughness_firn")]
    pub roughness_firn: f64,

    /// [mm]
    #[serde(default = "default_roughness_ice")]
    pub roughness_ice: f64,

    /// Linear increase of snow roughness with age [mm h^-1].
    #[serde(default = "default_aging_factor_roughness")]
    pub aging_factor: f64,
}

fn default_roughness_method() -> RoughnessMethod { RoughnessMethod::Moelg12 }
fn default_roughness_fresh_snow() -> f64 { 0.24 }
fn default_roughness_firn() -> f64 { 4.0 }
fn default_roughness_ice() -> f64 { 1.7 }
fn default_aging_factor_roughness() -> f64 { 0.0026 }

impl Default for RoughnessConfig {
    fn default() -> Self {
        Self {
            method: default_roughness_method(),
            roughness_fresh_snow: default_roughness_fresh_snow(),
            roughness_firn: default_roughness_firn(),
            roughness_ice: default_roughness_ice(),
            aging_factor: default_aging_factor_roughness(),
        }
    }
}

/// Supraglacial debris cover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebrisConfig {
    #[serde(default)]
    pub use_debris: bool,

    /// [m]
    #[serde(default = "default_debris_thickness")]
    pub thickness: f64,

    /// [kg m^-3]
    #[serde(default = "default_debris_density")]
    pub density: f64,
}

fn default_debris_thickness() -> f64 { 0.1 }
fn default_debris_density() -> f64 { 1496.0 }

impl Default for DebrisConfig {
    fn default() -> Self {
        Self {
            use_debris: false,
            thickness: default_debris_thickness(),
            density: default_debris_density(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            grid: GridConfig::default(),
            init: InitConfig::default(),
            albedo: AlbedoConfig::default(),
            roughness: RoughnessConfig::default(),
            debris: DebrisConfig::default(),
        }
    }
}

fn require(ok: bool, key: &str, value: impl ToString, reason: &str) -> GridResult<()> {
    if ok {
        Ok(())
    } else {
        Err(GridError::invalid_config(key, value, reason))
    }
}

fn check_method_name<M: SchemeMethod>(value: &serde_json::Value, pointer: &str) -> GridResult<()> {
    match value.pointer(pointer).and_then(serde_json::Value::as_str) {
        Some(name) => M::from_name(name).map(|_| ()),
        None => Ok(()),
    }
}

impl ModelConfig {
    /// Load and validate a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> GridResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse and validate a JSON configuration. An unknown scheme name is
    /// reported as `InvalidConfiguration`, not as a parse failure.
    pub fn from_json(content: &str) -> GridResult<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        check_method_name::<AlbedoMethod>(&value, "/albedo/method")?;
        check_method_name::<RoughnessMethod>(&value, "/roughness/method")?;
        let config: ModelConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> GridResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Grid thresholds with the top-level time step applied.
    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            dt: self.dt,
            ..self.grid
        }
    }

    pub fn validate(&self) -> GridResult<()> {
        require(self.dt > 0.0, "dt", self.dt, "time step must be positive")?;

        let g = &self.grid;
        require(
            g.snow_ice_threshold > 0.0 && g.snow_ice_threshold <= ICE_DENSITY,
            "grid.snow_ice_threshold",
            g.snow_ice_threshold,
            "must lie in (0, ice density]",
        )?;
        require(
            g.min_layer_height >= 0.0,
            "grid.min_layer_height",
            g.min_layer_height,
            "must be non-negative",
        )?;
        require(
            g.max_layer_height > g.min_layer_height,
            "grid.max_layer_height",
            g.max_layer_height,
            "must exceed min_layer_height",
        )?;
        require(
            g.merge_threshold >= 0.0,
            "grid.merge_threshold",
            g.merge_threshold,
            "must be non-negative",
        )?;
        require(
            g.density_tolerance >= 0.0 && g.temperature_tolerance >= 0.0,
            "grid.tolerances",
            format!("{}/{}", g.density_tolerance, g.temperature_tolerance),
            "tolerances must be non-negative",
        )?;
        require(g.max_layers >= 1, "grid.max_layers", g.max_layers, "must be at least 1")?;

        let i = &self.init;
        require(
            i.initial_snowheight_constant >= 0.0,
            "init.initial_snowheight_constant",
            i.initial_snowheight_constant,
            "must be non-negative",
        )?;
        require(
            i.optimal_snow_layer_height > 0.0,
            "init.optimal_snow_layer_height",
            i.optimal_snow_layer_height,
            "must be positive",
        )?;
        require(
            i.initial_glacier_layer_height > 0.0
                && i.initial_glacier_height >= i.initial_glacier_layer_height,
            "init.initial_glacier_height",
            i.initial_glacier_height,
            "must hold at least one glacier layer",
        )?;
        require(
            i.initial_top_density_snowpack > 0.0
                && i.initial_bottom_density_snowpack <= ICE_DENSITY,
            "init.snowpack_density",
            format!(
                "{}/{}",
                i.initial_top_density_snowpack, i.initial_bottom_density_snowpack
            ),
            "densities must lie in (0, ice density]",
        )?;
        require(
            i.temperature_bottom <= ZERO_TEMPERATURE,
            "init.temperature_bottom",
            i.temperature_bottom,
            "must not exceed the melting point",
        )?;

        let a = &self.albedo;
        for (key, value) in [
            ("albedo.albedo_fresh_snow", a.albedo_fresh_snow),
            ("albedo.albedo_firn", a.albedo_firn),
            ("albedo.albedo_ice", a.albedo_ice),
            ("albedo.albedo_debris", a.albedo_debris),
        ] {
            require((0.0..=1.0).contains(&value), key, value, "albedo must lie in [0, 1]")?;
        }
        for (key, value) in [
            ("albedo.snow_aging", a.snow_aging),
            ("albedo.snow_depth", a.snow_depth),
            ("albedo.t_star_wet", a.t_star_wet),
            ("albedo.t_star_dry", a.t_star_dry),
            ("albedo.critical_snowpack_thickness", a.critical_snowpack_thickness),
        ] {
            require(value > 0.0, key, value, "must be positive")?;
        }

        let r = &self.roughness;
        require(
            r.roughness_fresh_snow >= 0.0 && r.roughness_firn >= r.roughness_fresh_snow,
            "roughness.roughness_firn",
            r.roughness_firn,
            "firn roughness must not be below fresh-snow roughness",
        )?;

        let d = &self.debris;
        if d.use_debris {
            require(d.thickness > 0.0, "debris.thickness", d.thickness, "must be positive")?;
            require(d.density > 0.0, "debris.density", d.density, "must be positive")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.albedo.method, AlbedoMethod::Oerlemans98);
        assert_eq!(config.roughness.method, RoughnessMethod::Moelg12);
    }

    #[test]
    fn rejects_non_positive_dt() {
        let mut config = ModelConfig::default();
        config.dt = 0.0;
        assert!(matches!(
            config.validate(),
            Err(GridError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn rejects_inverted_layer_bounds() {
        let mut config = ModelConfig::default();
        config.grid.max_layer_height = 0.0005;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_albedo_above_one() {
        let mut config = ModelConfig::default();
        config.albedo.albedo_fresh_snow = 1.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ModelConfig =
            serde_json::from_str(r#"{"dt": 1800.0, "albedo": {"method": "Bougamont05"}}"#).unwrap();
        assert_eq!(config.dt, 1800.0);
        assert_eq!(config.albedo.method, AlbedoMethod::Bougamont05);
        assert_eq!(config.albedo.albedo_ice, 0.3);
        assert_eq!(config.grid.max_layers, 200);
    }

    #[test]
    fn unknown_albedo_method_is_invalid_configuration() {
        let err = ModelConfig::from_json(r#"{"albedo": {"method": "Brock00"}}"#).unwrap_err();
        match err {
            GridError::InvalidConfiguration { key, value, .. } => {
                assert_eq!(key, "albedo.method");
                assert_eq!(value, "Brock00");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_roughness_method_is_invalid_configuration() {
        let err = ModelConfig::from_json(r#"{"roughness": {"method": "Foo"}}"#).unwrap_err();
        assert!(matches!(err, GridError::InvalidConfiguration { .. }));
    }

    #[test]
    fn config_file_with_unknown_method_is_invalid_configuration() {
        let path = std::env::temp_dir().join("firnpack_config_unknown_method.json");
        std::fs::write(&path, r#"{"albedo": {"method": "Brock00"}}"#).unwrap();
        let result = ModelConfig::from_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(GridError::InvalidConfiguration { .. })));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            ModelConfig::from_json("{ not json"),
            Err(GridError::Parse(_))
        ));
    }

    #[test]
    fn grid_config_takes_top_level_dt() {
        let mut config = ModelConfig::default();
        config.dt = 900.0;
        assert_eq!(config.grid_config().dt, 900.0);
    }

    #[test]
    fn serialize_deserialize() {
        let config = ModelConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ModelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.albedo.method, config.albedo.method);
        assert_eq!(parsed.grid, config.grid);
    }
}

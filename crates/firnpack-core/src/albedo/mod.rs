//! Surface albedo parameterizations.
//!
//! The scheme is chosen once from configuration. Per timestep the caller
//! passes the grid, the surface temperature and the running snow albedo
//! (only Bougamont05 evolves it) and gets both values back.

pub mod processes;

use serde::{Deserialize, Serialize};

use crate::config::{AlbedoConfig, ModelConfig};
use crate::constants::SECONDS_PER_DAY;
use crate::grid::Grid;
use crate::layer::LayerKind;
use crate::traits::{impl_scheme_conversions, SchemeMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AlbedoMethod {
    /// Age and depth decay (Oerlemans & Knap 1998).
    Oerlemans98,
    /// Temperature-dependent running decay (Bougamont et al. 2005).
    Bougamont05,
    /// Snow over debris (Lejeune et al. 2007).
    Lejeune13,
}

impl SchemeMethod for AlbedoMethod {
    const KEY: &'static str = "albedo.method";

    fn all() -> &'static [Self] {
        &[Self::Oerlemans98, Self::Bougamont05, Self::Lejeune13]
    }

    fn name(self) -> &'static str {
        match self {
            Self::Oerlemans98 => "Oerlemans98",
            Self::Bougamont05 => "Bougamont05",
            Self::Lejeune13 => "Lejeune13",
        }
    }
}

impl_scheme_conversions!(AlbedoMethod);

/// Result of one albedo update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbedoOutput {
    /// Surface albedo [-].
    pub albedo: f64,
    /// Running snow albedo to pass into the next call [-].
    pub albedo_snow: f64,
}

/// Fresh-snow state as seen by the age-based schemes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceProperties {
    pub fresh_snow_height: f64,
    pub fresh_snow_timestamp: f64,
    pub hours_since_snowfall: f64,
}

/// Read the fresh-snow age. If the fresh snow is gone before it had time to
/// age, the grid falls back to the age of the snow beneath it.
pub fn surface_properties(grid: &mut Grid, snow_aging_days: f64) -> SurfaceProperties {
    let mut fs = grid.fresh_snow_props();
    if fs.hours_since_snowfall() < snow_aging_days * 24.0 && fs.height <= 0.0 {
        grid.set_fresh_snow_props_to_old_props();
        fs = grid.fresh_snow_props();
    }
    SurfaceProperties {
        fresh_snow_height: fs.height,
        fresh_snow_timestamp: fs.timestamp,
        hours_since_snowfall: fs.hours_since_snowfall(),
    }
}

/// Configured albedo scheme.
#[derive(Debug, Clone)]
pub struct AlbedoModel {
    method: AlbedoMethod,
    params: AlbedoConfig,
    dt: f64,
}

impl AlbedoModel {
    /// Debris mode always uses Lejeune13, whatever method is configured.
    pub fn from_config(config: &ModelConfig) -> Self {
        let configured = config.albedo.method;
        let method = if config.debris.use_debris {
            AlbedoMethod::Lejeune13
        } else {
            configured
        };
        if method != configured {
            log::debug!("debris cover active: albedo method {} -> {}", configured, method);
        }
        Self {
            method,
            params: config.albedo.clone(),
            dt: config.dt,
        }
    }

    pub fn method(&self) -> AlbedoMethod {
        self.method
    }

    pub fn params(&self) -> &AlbedoConfig {
        &self.params
    }

    /// Compute the surface albedo for the current grid state.
    ///
    /// May reset the fresh-snow age to that of the underlying snow (see
    /// [`surface_properties`]). `albedo_snow` is returned unchanged by every
    /// scheme except Bougamont05.
    pub fn update(&self, grid: &mut Grid, surface_temperature: f64, albedo_snow: f64) -> AlbedoOutput {
        match self.method {
            AlbedoMethod::Oerlemans98 => AlbedoOutput {
                albedo: self.oerlemans(grid),
                albedo_snow,
            },
            AlbedoMethod::Bougamont05 => self.bougamont(grid, surface_temperature, albedo_snow),
            AlbedoMethod::Lejeune13 => AlbedoOutput {
                albedo: self.lejeune(grid),
                albedo_snow,
            },
        }
    }

    /// Albedo of a bare surface layer of the given kind.
    fn bare_albedo(&self, kind: LayerKind) -> f64 {
        match kind {
            LayerKind::Debris => self.params.albedo_debris,
            _ => self.params.albedo_ice,
        }
    }

    fn oerlemans(&self, grid: &mut Grid) -> f64 {
        let surface = surface_properties(grid, self.params.snow_aging);
        let top = grid.top().kind(grid.config().snow_ice_threshold);
        if top != LayerKind::Snow {
            return self.bare_albedo(top);
        }
        let albedo_snow = processes::simple_albedo(&self.params, surface.hours_since_snowfall);
        processes::depth_modulated(
            albedo_snow,
            self.params.albedo_ice,
            grid.total_snowheight(),
            self.params.snow_depth,
        )
    }

    fn bougamont(&self, grid: &Grid, surface_temperature: f64, albedo_snow: f64) -> AlbedoOutput {
        let top = grid.top().kind(grid.config().snow_ice_threshold);
        if top != LayerKind::Snow {
            return AlbedoOutput {
                albedo: self.bare_albedo(top),
                albedo_snow,
            };
        }
        let hours_since_snowfall = grid.fresh_snow_props().hours_since_snowfall();
        let t_star = processes::t_star(&self.params, surface_temperature);
        let mut albedo_snow = processes::decay_toward_firn(
            albedo_snow,
            self.params.albedo_firn,
            t_star,
            self.dt / SECONDS_PER_DAY,
        );
        if hours_since_snowfall == 0.0 {
            albedo_snow = self.params.albedo_fresh_snow;
        }
        AlbedoOutput {
            albedo: processes::depth_modulated(
                albedo_snow,
                self.params.albedo_ice,
                grid.total_snowheight(),
                self.params.snow_depth,
            ),
            albedo_snow,
        }
    }

    fn lejeune(&self, grid: &mut Grid) -> f64 {
        if grid.top().is_debris() {
            return self.params.albedo_debris;
        }
        let surface = surface_properties(grid, self.params.snow_aging);
        let weight = processes::lejeune_weight(
            surface.fresh_snow_height,
            self.params.critical_snowpack_thickness,
            self.params.lejeune_exponent,
        );
        let albedo_snow = processes::simple_albedo(&self.params, surface.hours_since_snowfall);
        processes::blend(weight, albedo_snow, self.params.albedo_debris)
    }
}

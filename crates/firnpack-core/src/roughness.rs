//! Aerodynamic roughness length of the surface.

use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, RoughnessConfig};
use crate::grid::Grid;
use crate::layer::LayerKind;
use crate::traits::{impl_scheme_conversions, SchemeMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RoughnessMethod {
    /// Linear growth with snow age (Mölg et al. 2009).
    Moelg12,
}

impl SchemeMethod for RoughnessMethod {
    const KEY: &'static str = "roughness.method";

    fn all() -> &'static [Self] {
        &[Self::Moelg12]
    }

    fn name(self) -> &'static str {
        match self {
            Self::Moelg12 => "Moelg12",
        }
    }
}

impl_scheme_conversions!(RoughnessMethod);

#[derive(Debug, Clone)]
pub struct RoughnessModel {
    method: RoughnessMethod,
    params: RoughnessConfig,
}

impl RoughnessModel {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            method: config.roughness.method,
            params: config.roughness.clone(),
        }
    }

    pub fn method(&self) -> RoughnessMethod {
        self.method
    }

    /// Roughness length [m] for the current surface.
    pub fn roughness(&self, grid: &Grid) -> f64 {
        match self.method {
            RoughnessMethod::Moelg12 => self.moelg(grid) / 1000.0,
        }
    }

    /// Snow roughness grows from the fresh-snow value toward firn; any
    /// other surface uses the ice value. [mm]
    fn moelg(&self, grid: &Grid) -> f64 {
        let p = &self.params;
        match grid.top().kind(grid.config().snow_ice_threshold) {
            LayerKind::Snow => {
                let hours = grid.fresh_snow_props().hours_since_snowfall();
                (p.roughness_fresh_snow + p.aging_factor * hours).min(p.roughness_firn)
            }
            LayerKind::Ice | LayerKind::Debris => p.roughness_ice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::constants::ICE_DENSITY;
    use crate::error::GridError;
    use crate::layer::Layer;

    fn ice_grid() -> Grid {
        let layer = Layer::from_density(1.0, ICE_DENSITY, 265.0, 0.0).unwrap();
        Grid::new(vec![layer], GridConfig::default()).unwrap()
    }

    fn model() -> RoughnessModel {
        RoughnessModel::from_config(&ModelConfig::default())
    }

    #[test]
    fn ice_surface() {
        let r = model().roughness(&ice_grid());
        assert!((r - 1.7e-3).abs() < 1e-12);
    }

    #[test]
    fn fresh_snow_then_aging() {
        let mut g = ice_grid();
        g.add_fresh_snow(0.1, 200.0, 265.0, 0.0).unwrap();
        let m = model();
        assert!((m.roughness(&g) - 0.24e-3).abs() < 1e-12);
        for _ in 0..100 {
            g.age_fresh_snow(3600.0);
        }
        let expected = (0.24 + 0.0026 * 100.0) / 1000.0;
        assert!((m.roughness(&g) - expected).abs() < 1e-12);
    }

    #[test]
    fn old_snow_capped_at_firn() {
        let mut g = ice_grid();
        g.add_fresh_snow(0.1, 200.0, 265.0, 0.0).unwrap();
        g.age_fresh_snow(1.0e8);
        assert!((model().roughness(&g) - 4.0e-3).abs() < 1e-12);
    }

    #[test]
    fn unknown_method_rejected() {
        assert!(matches!(
            "Z0const".parse::<RoughnessMethod>(),
            Err(GridError::InvalidConfiguration { .. })
        ));
        assert_eq!(RoughnessMethod::Moelg12.to_string(), "Moelg12");
    }
}

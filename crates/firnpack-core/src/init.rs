//! Grid construction: cold start from profiles, restart from a snapshot,
//! and debris augmentation.

use crate::config::ModelConfig;
use crate::constants::{ICE_DENSITY, ZERO_TEMPERATURE};
use crate::error::{GridError, GridResult};
use crate::grid::{Grid, Snapshot};
use crate::layer::{ice_fraction_from_density, Layer, Material};

/// Surface forcing at the first time step of a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialForcing {
    /// Initial snow height [m]. `None` or NaN falls back to the configured
    /// constant.
    pub snow_height: Option<f64>,
    /// 2 m air temperature [K].
    pub temperature: f64,
}

/// Build the initial column: snow layers over a glacier section, with
/// density and temperature varying linearly down to the bottom values.
pub fn init_snowpack(forcing: &InitialForcing, config: &ModelConfig) -> GridResult<Grid> {
    if !forcing.temperature.is_finite() {
        return Err(GridError::invalid_layer(
            "temperature",
            forcing.temperature,
            "initial air temperature must be finite",
        ));
    }
    let init = &config.init;
    let t_top = forcing.temperature.min(ZERO_TEMPERATURE);
    let snow_height = forcing
        .snow_height
        .filter(|h| !h.is_nan())
        .unwrap_or(init.initial_snowheight_constant);
    if !snow_height.is_finite() || snow_height < 0.0 {
        return Err(GridError::invalid_layer(
            "snow_height",
            snow_height,
            "initial snow height must be finite and non-negative",
        ));
    }

    let glacier_height = init.initial_glacier_height;
    let glacier_layer_height = init.initial_glacier_layer_height;
    let mut layers = Vec::new();

    // Gradient over the whole column, snow included.
    let (dt_dz, mut last_temperature) = if snow_height > 0.0 {
        let dt_dz = (t_top - init.temperature_bottom) / (snow_height + glacier_height);
        let n_snow = (snow_height / init.optimal_snow_layer_height)
            .min(init.max_initial_snow_layers as f64) as usize;
        if n_snow == 0 {
            layers.push(Layer::from_density(
                snow_height,
                init.initial_top_density_snowpack,
                t_top,
                0.0,
            )?);
            (dt_dz, t_top)
        } else {
            let layer_height = snow_height / n_snow as f64;
            let drho_dz = (init.initial_top_density_snowpack - init.initial_bottom_density_snowpack)
                / snow_height;
            let mut temperature = t_top;
            for i in 1..=n_snow {
                let depth = layer_height * i as f64;
                let density = init.initial_top_density_snowpack - drho_dz * depth;
                temperature = t_top - dt_dz * depth;
                layers.push(Layer::from_density(layer_height, density, temperature, 0.0)?);
            }
            (dt_dz, temperature)
        }
    } else {
        ((t_top - init.temperature_bottom) / glacier_height, t_top)
    };

    let n_glacier = (glacier_height / glacier_layer_height) as usize;
    let glacier_top = last_temperature;
    for j in 1..=n_glacier {
        last_temperature = glacier_top - dt_dz * glacier_layer_height * j as f64;
        layers.push(Layer::from_density(
            glacier_layer_height,
            ICE_DENSITY,
            last_temperature,
            0.0,
        )?);
    }

    let mut grid = Grid::new(layers, config.grid_config())?;
    log::debug!(
        "cold start: {} layers, {:.3} m snow, surface {:.2} K, bottom {:.2} K",
        grid.number_of_layers(),
        grid.total_snowheight(),
        t_top,
        last_temperature
    );
    if config.debris.use_debris {
        init_debris_pack(&mut grid, config)?;
    }
    Ok(grid)
}

/// Rebuild a grid from a checkpoint. The arrays are cut to `n_layers`.
/// Ice fraction is derived from density when the snapshot lacks it.
///
/// A NaN temperature logs the full reconstructed column and fails with
/// `CorruptRestartState`.
pub fn load_snowpack(snapshot: &Snapshot, config: &ModelConfig) -> GridResult<Grid> {
    let n = snapshot.n_layers;
    if n == 0 {
        return Err(GridError::corrupt_restart(0, "snapshot holds no layers"));
    }
    let mut profile = snapshot.layers.clone();
    if profile.ice_fraction.len() < n {
        profile.ice_fraction = profile
            .density
            .iter()
            .map(|&rho| ice_fraction_from_density(rho))
            .collect();
    }
    let available = profile.min_len();
    if available < n {
        return Err(GridError::corrupt_restart(
            available,
            format!("layer arrays shorter than n_layers={}", n),
        ));
    }
    profile.truncate(n);

    let mut layers = Vec::with_capacity(n);
    for i in 0..n {
        let values = profile
            .get(i)
            .ok_or_else(|| GridError::corrupt_restart(i, "missing layer values"))?;
        let material = snapshot.material(i);
        let ice_fraction = match material {
            Material::Debris { .. } => 0.0,
            Material::Glacial => values.ice_fraction,
        };
        layers.push(Layer::unchecked(
            values.height,
            ice_fraction,
            values.temperature,
            values.liquid_water_content,
            material,
        ));
    }

    let fresh_snow = snapshot.fresh_snow();
    if let Some(idx) = profile.temperature.iter().position(|t| t.is_nan()) {
        let grid = Grid::from_parts_unchecked(layers, fresh_snow, config.grid_config());
        log::error!("restart state has NaN temperatures:\n{}", grid);
        return Err(GridError::corrupt_restart(idx, "temperature is NaN"));
    }
    for (idx, layer) in layers.iter().enumerate() {
        layer
            .validate()
            .map_err(|err| GridError::corrupt_restart(idx, err.to_string()))?;
    }

    let grid = Grid::from_parts(layers, fresh_snow, config.grid_config())?;
    log::debug!(
        "restart: {} layers, {:.3} m total",
        grid.number_of_layers(),
        grid.total_height()
    );
    Ok(grid)
}

/// Cover the column with the configured debris layer.
pub fn init_debris_pack(grid: &mut Grid, config: &ModelConfig) -> GridResult<()> {
    let debris = &config.debris;
    let temperature = grid.layer_temperature(0)?.min(ZERO_TEMPERATURE);
    grid.add_fresh_debris(debris.thickness, debris.density, temperature, 0.0)?;
    log::debug!(
        "debris pack: {:.3} m at {:.0} kg m^-3",
        debris.thickness,
        debris.density
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerKind;

    fn forcing(snow_height: Option<f64>, temperature: f64) -> InitialForcing {
        InitialForcing {
            snow_height,
            temperature,
        }
    }

    // -- cold start --

    #[test]
    fn default_column_layout() {
        let config = ModelConfig::default();
        let g = init_snowpack(&forcing(Some(0.2), 268.0), &config).unwrap();
        assert_eq!(g.number_of_layers(), 2 + 80);
        assert!((g.total_height() - 40.2).abs() < 1e-9);
        assert_eq!(g.number_snow_layers(), 2);
        assert!((g.layer_height(0).unwrap() - 0.1).abs() < 1e-12);
        // Linear profile reaches the bottom boundary temperature.
        let bottom = g.layer_temperature(81).unwrap();
        assert!((bottom - config.init.temperature_bottom).abs() < 1e-9);
    }

    #[test]
    fn snow_density_increases_with_depth() {
        let config = ModelConfig::default();
        let g = init_snowpack(&forcing(Some(1.0), 265.0), &config).unwrap();
        assert_eq!(g.number_snow_layers(), 5);
        let rho = g.densities();
        for w in rho[..5].windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn zero_snow_gives_pure_glacier() {
        let config = ModelConfig::default();
        let g = init_snowpack(&forcing(Some(0.0), 268.0), &config).unwrap();
        assert_eq!(g.number_of_layers(), 80);
        assert_eq!(g.total_height(), 40.0);
        assert_eq!(g.kind(0).unwrap(), LayerKind::Ice);
        assert_eq!(g.total_snowheight(), 0.0);
    }

    #[test]
    fn thin_snow_is_one_layer() {
        let config = ModelConfig::default();
        let g = init_snowpack(&forcing(Some(0.05), 268.0), &config).unwrap();
        assert_eq!(g.number_snow_layers(), 1);
        assert_eq!(g.layer_height(0).unwrap(), 0.05);
        assert_eq!(g.layer_temperature(0).unwrap(), 268.0);
    }

    #[test]
    fn missing_snow_height_uses_constant() {
        let config = ModelConfig::default();
        for h in [None, Some(f64::NAN)] {
            let g = init_snowpack(&forcing(h, 268.0), &config).unwrap();
            assert!((g.total_snowheight() - 0.2).abs() < 1e-12);
        }
    }

    #[test]
    fn warm_air_is_capped_at_melting_point() {
        let config = ModelConfig::default();
        let g = init_snowpack(&forcing(Some(0.05), 285.0), &config).unwrap();
        assert_eq!(g.layer_temperature(0).unwrap(), ZERO_TEMPERATURE);
    }

    #[test]
    fn rejects_nan_temperature_and_negative_snow() {
        let config = ModelConfig::default();
        assert!(init_snowpack(&forcing(Some(0.2), f64::NAN), &config).is_err());
        assert!(init_snowpack(&forcing(Some(-0.1), 268.0), &config).is_err());
    }

    #[test]
    fn debris_cover_on_cold_start() {
        let mut config = ModelConfig::default();
        config.debris.use_debris = true;
        let g = init_snowpack(&forcing(Some(0.2), 268.0), &config).unwrap();
        assert_eq!(g.kind(0).unwrap(), LayerKind::Debris);
        assert_eq!(g.layer_height(0).unwrap(), config.debris.thickness);
        assert_eq!(g.number_of_layers(), 83);
    }

    // -- restart --

    #[test]
    fn restart_reproduces_grid() {
        let config = ModelConfig::default();
        let mut g = init_snowpack(&forcing(Some(0.3), 266.0), &config).unwrap();
        g.age_fresh_snow(7200.0);
        let restored = load_snowpack(&g.snapshot(), &config).unwrap();
        assert_eq!(restored.number_of_layers(), g.number_of_layers());
        assert_eq!(restored.heights(), g.heights());
        assert_eq!(restored.ice_fractions(), g.ice_fractions());
        assert_eq!(restored.fresh_snow_props(), g.fresh_snow_props());
    }

    #[test]
    fn restart_truncates_to_n_layers() {
        let config = ModelConfig::default();
        let g = init_snowpack(&forcing(Some(0.2), 268.0), &config).unwrap();
        let mut snap = g.snapshot();
        snap.n_layers = 10;
        let restored = load_snowpack(&snap, &config).unwrap();
        assert_eq!(restored.number_of_layers(), 10);
    }

    #[test]
    fn restart_derives_ice_fraction_from_density() {
        let config = ModelConfig::default();
        let g = init_snowpack(&forcing(Some(0.2), 268.0), &config).unwrap();
        let mut snap = g.snapshot();
        snap.layers.ice_fraction.clear();
        let restored = load_snowpack(&snap, &config).unwrap();
        let expected = ice_fraction_from_density(snap.layers.density[0]);
        assert_eq!(restored.layer_ice_fraction(0).unwrap(), expected);
    }

    #[test]
    fn restart_keeps_debris() {
        let mut config = ModelConfig::default();
        config.debris.use_debris = true;
        let g = init_snowpack(&forcing(Some(0.2), 268.0), &config).unwrap();
        let restored = load_snowpack(&g.snapshot(), &config).unwrap();
        assert_eq!(restored.kind(0).unwrap(), LayerKind::Debris);
    }

    #[test]
    fn nan_temperature_is_corrupt() {
        let config = ModelConfig::default();
        let g = init_snowpack(&forcing(Some(0.2), 268.0), &config).unwrap();
        let mut snap = g.snapshot();
        snap.layers.temperature[3] = f64::NAN;
        let err = load_snowpack(&snap, &config).unwrap_err();
        assert!(matches!(
            err,
            GridError::CorruptRestartState { layer: 3, .. }
        ));
    }

    #[test]
    fn short_arrays_are_corrupt() {
        let config = ModelConfig::default();
        let g = init_snowpack(&forcing(Some(0.2), 268.0), &config).unwrap();
        let mut snap = g.snapshot();
        snap.n_layers = 200;
        assert!(matches!(
            load_snowpack(&snap, &config),
            Err(GridError::CorruptRestartState { .. })
        ));
        snap.n_layers = 0;
        assert!(load_snowpack(&snap, &config).is_err());
    }

    #[test]
    fn short_column_reports_first_missing_layer() {
        let config = ModelConfig::default();
        let g = init_snowpack(&forcing(Some(0.2), 268.0), &config).unwrap();
        let mut snap = g.snapshot();
        snap.layers.temperature.truncate(5);
        assert!(matches!(
            load_snowpack(&snap, &config),
            Err(GridError::CorruptRestartState { layer: 5, .. })
        ));
    }

    #[test]
    fn partial_ice_fraction_column_is_rederived() {
        let config = ModelConfig::default();
        let g = init_snowpack(&forcing(Some(0.2), 268.0), &config).unwrap();
        let mut snap = g.snapshot();
        snap.layers.ice_fraction.truncate(3);
        let restored = load_snowpack(&snap, &config).unwrap();
        assert_eq!(restored.number_of_layers(), g.number_of_layers());
        let last = snap.n_layers - 1;
        let expected = ice_fraction_from_density(snap.layers.density[last]);
        assert_eq!(restored.layer_ice_fraction(last).unwrap(), expected);
    }
}

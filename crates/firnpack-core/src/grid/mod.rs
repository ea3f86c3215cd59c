//! Grid container: the ordered stack of layers for one simulated point.
//!
//! Index 0 is the surface layer, increasing index goes deeper. The grid
//! always holds at least one layer. Every mutator validates before it
//! touches state, so a rejected call leaves the grid as it was.

pub mod fresh_snow;
pub mod remesh;
pub mod snapshot;

use std::fmt;

use crate::config::GridConfig;
use crate::error::{GridError, GridResult};
use crate::layer::{Layer, LayerKind};

pub use fresh_snow::FreshSnow;
pub use remesh::RemeshSummary;
pub use snapshot::Snapshot;

#[derive(Debug, Clone)]
pub struct Grid {
    layers: Vec<Layer>,
    fresh_snow: FreshSnow,
    config: GridConfig,
}

/// Per-index getters delegating to the layer at that index.
macro_rules! layer_getters {
    ($( $(#[$meta:meta])* $name:ident => $layer_fn:ident ),+ $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(&self, idx: usize) -> GridResult<f64> {
                Ok(self.layer(idx)?.$layer_fn())
            }
        )+
    };
}

/// Per-index validated setters delegating to the layer at that index.
macro_rules! layer_setters {
    ($( $name:ident => $layer_fn:ident ),+ $(,)?) => {
        $(
            pub fn $name(&mut self, idx: usize, value: f64) -> GridResult<()> {
                self.layer_mut(idx)?.$layer_fn(value)
            }
        )+
    };
}

/// Whole-column arrays, surface first.
macro_rules! column_arrays {
    ($( $name:ident => $layer_fn:ident ),+ $(,)?) => {
        $(
            pub fn $name(&self) -> Vec<f64> {
                self.layers.iter().map(Layer::$layer_fn).collect()
            }
        )+
    };
}

impl Grid {
    /// Build a grid from surface-first layers with fresh-snow trackers at zero.
    pub fn new(layers: Vec<Layer>, config: GridConfig) -> GridResult<Self> {
        Self::from_parts(layers, FreshSnow::default(), config)
    }

    pub fn from_parts(
        layers: Vec<Layer>,
        fresh_snow: FreshSnow,
        config: GridConfig,
    ) -> GridResult<Self> {
        let grid = Self {
            layers,
            fresh_snow,
            config,
        };
        grid.check()?;
        Ok(grid)
    }

    /// Assemble a grid without checking it, for diagnosing restart data.
    pub(crate) fn from_parts_unchecked(
        layers: Vec<Layer>,
        fresh_snow: FreshSnow,
        config: GridConfig,
    ) -> Self {
        Self {
            layers,
            fresh_snow,
            config,
        }
    }

    /// Verify every structural and per-layer invariant.
    pub fn check(&self) -> GridResult<()> {
        if self.layers.is_empty() {
            return Err(GridError::invalid_layer(
                "layers",
                0.0,
                "grid must hold at least one layer",
            ));
        }
        for layer in &self.layers {
            layer.validate()?;
        }
        let fs = &self.fresh_snow;
        for (field, value) in [
            ("new_snow_height", fs.height),
            ("new_snow_timestamp", fs.timestamp),
            ("old_snow_timestamp", fs.old_timestamp),
        ] {
            if !value.is_finite() {
                return Err(GridError::invalid_layer(field, value, "must be finite"));
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, idx: usize) -> GridResult<&Layer> {
        let len = self.layers.len();
        self.layers
            .get(idx)
            .ok_or_else(|| GridError::index_out_of_range(idx, len))
    }

    pub fn layer_mut(&mut self, idx: usize) -> GridResult<&mut Layer> {
        let len = self.layers.len();
        self.layers
            .get_mut(idx)
            .ok_or_else(|| GridError::index_out_of_range(idx, len))
    }

    pub fn top(&self) -> &Layer {
        &self.layers[0]
    }

    fn check_index(&self, idx: usize) -> GridResult<()> {
        if idx >= self.layers.len() {
            return Err(GridError::index_out_of_range(idx, self.layers.len()));
        }
        Ok(())
    }

    // -- column queries --

    pub fn number_of_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn total_height(&self) -> f64 {
        self.layers.iter().map(Layer::height).sum()
    }

    fn snow_layers(&self) -> impl Iterator<Item = &Layer> {
        let threshold = self.config.snow_ice_threshold;
        self.layers
            .iter()
            .take_while(move |l| l.kind(threshold) == LayerKind::Snow)
    }

    /// Height of the contiguous snow cover at the surface [m].
    pub fn total_snowheight(&self) -> f64 {
        self.snow_layers().map(Layer::height).sum()
    }

    pub fn number_snow_layers(&self) -> usize {
        self.snow_layers().count()
    }

    pub fn kind(&self, idx: usize) -> GridResult<LayerKind> {
        Ok(self.layer(idx)?.kind(self.config.snow_ice_threshold))
    }

    pub fn is_snow(&self, idx: usize) -> GridResult<bool> {
        Ok(self.kind(idx)? == LayerKind::Snow)
    }

    /// Depth of the centre of layer `idx` below the surface [m].
    pub fn layer_depth(&self, idx: usize) -> GridResult<f64> {
        self.check_index(idx)?;
        let above: f64 = self.layers[..idx].iter().map(Layer::height).sum();
        Ok(above + 0.5 * self.layers[idx].height())
    }

    pub fn depths(&self) -> Vec<f64> {
        let mut top = 0.0;
        self.layers
            .iter()
            .map(|l| {
                let centre = top + 0.5 * l.height();
                top += l.height();
                centre
            })
            .collect()
    }

    layer_getters! {
        layer_height => height,
        layer_temperature => temperature,
        layer_ice_fraction => ice_fraction,
        layer_liquid_water_content => liquid_water_content,
        layer_refreeze => refreeze,
        layer_air_porosity => air_porosity,
        /// Bulk density of layer `idx` [kg m^-3].
        layer_density => density,
        layer_specific_heat => specific_heat,
        layer_thermal_conductivity => thermal_conductivity,
        layer_thermal_diffusivity => thermal_diffusivity,
        layer_cold_content => cold_content,
        layer_irreducible_water_content => irreducible_water_content,
    }

    layer_setters! {
        set_layer_height => set_height,
        set_layer_temperature => set_temperature,
        set_layer_ice_fraction => set_ice_fraction,
        set_layer_liquid_water_content => set_liquid_water_content,
        set_layer_refreeze => set_refreeze,
    }

    column_arrays! {
        heights => height,
        temperatures => temperature,
        ice_fractions => ice_fraction,
        liquid_water_contents => liquid_water_content,
        refreezes => refreeze,
        densities => density,
        specific_heats => specific_heat,
        thermal_conductivities => thermal_conductivity,
        cold_contents => cold_content,
    }

    // -- layer lifecycle --

    /// Put a new snow layer on top and restart the fresh-snow clock.
    pub fn add_fresh_snow(
        &mut self,
        height: f64,
        density: f64,
        temperature: f64,
        liquid_water_content: f64,
    ) -> GridResult<()> {
        if !(height > 0.0) {
            return Err(GridError::invalid_layer(
                "height",
                height,
                "fresh snow must have positive height",
            ));
        }
        let layer = Layer::from_density(height, density, temperature, liquid_water_content)?;
        self.layers.insert(0, layer);
        self.fresh_snow.snowfall(height, self.config.dt);
        log::debug!(
            "fresh snow: {:.4} m at {:.1} kg m^-3, {} layers",
            height,
            density,
            self.layers.len()
        );
        Ok(())
    }

    /// Put a debris layer on top. Fresh-snow trackers are left alone.
    pub fn add_fresh_debris(
        &mut self,
        height: f64,
        density: f64,
        temperature: f64,
        liquid_water_content: f64,
    ) -> GridResult<()> {
        if !(height > 0.0) {
            return Err(GridError::invalid_layer(
                "height",
                height,
                "debris must have positive height",
            ));
        }
        let layer = Layer::debris(height, density, temperature, liquid_water_content)?;
        self.layers.insert(0, layer);
        Ok(())
    }

    fn ensure_removable(&self, idx: usize) -> GridResult<()> {
        self.check_index(idx)?;
        if self.layers.len() == 1 {
            return Err(GridError::invalid_layer(
                "layers",
                1.0,
                "cannot remove the only layer of the grid",
            ));
        }
        Ok(())
    }

    /// Drop layer `idx` and its contents.
    pub fn remove_layer(&mut self, idx: usize) -> GridResult<Layer> {
        self.ensure_removable(idx)?;
        Ok(self.layers.remove(idx))
    }

    /// Remove layer `idx` by folding it into a neighbour of the same
    /// material, the deeper one when possible. Height, ice mass and liquid
    /// water are conserved.
    pub fn remove_layers_merge(&mut self, idx: usize) -> GridResult<()> {
        self.ensure_removable(idx)?;
        let material = self.layers[idx].material();
        let same = |j: usize| self.layers.get(j).map(Layer::material) == Some(material);
        let upper = if same(idx + 1) {
            idx
        } else if idx > 0 && same(idx - 1) {
            idx - 1
        } else {
            return Err(GridError::invalid_layer(
                "material",
                self.layers[idx].height(),
                "no neighbour of the same material to merge into",
            ));
        };
        self.merge_pair(upper)
    }

    /// Replace layers `upper` and `upper + 1` by their merge.
    pub(crate) fn merge_pair(&mut self, upper: usize) -> GridResult<()> {
        if upper + 1 >= self.layers.len() {
            return Err(GridError::index_out_of_range(upper + 1, self.layers.len()));
        }
        // Two empty layers carry nothing to combine.
        if self.layers[upper].height() + self.layers[upper + 1].height() == 0.0 {
            self.layers.remove(upper + 1);
            return Ok(());
        }
        let merged = self.layers[upper].merged_with(&self.layers[upper + 1])?;
        self.layers[upper] = merged;
        self.layers.remove(upper + 1);
        Ok(())
    }

    /// Replace layer `idx` by two halves with the same intensive state.
    pub(crate) fn split_at(&mut self, idx: usize) -> GridResult<()> {
        self.check_index(idx)?;
        let (upper, lower) = self.layers[idx].halved();
        self.layers[idx] = upper;
        self.layers.insert(idx + 1, lower);
        Ok(())
    }

    // -- fresh snow --

    pub fn fresh_snow_props(&self) -> FreshSnow {
        self.fresh_snow
    }

    /// Age the fresh snow as the snow underneath it, once the fresh layer
    /// itself has melted or been merged away.
    pub fn set_fresh_snow_props_to_old_props(&mut self) {
        self.fresh_snow.revert_to_old();
    }

    pub fn set_fresh_snow_height(&mut self, height: f64) -> GridResult<()> {
        if !height.is_finite() {
            return Err(GridError::invalid_layer(
                "new_snow_height",
                height,
                "must be finite",
            ));
        }
        self.fresh_snow.height = height.max(0.0);
        Ok(())
    }

    /// Advance the fresh-snow clocks by a step without snowfall.
    pub fn age_fresh_snow(&mut self, seconds: f64) {
        self.fresh_snow.age(seconds);
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>5} {:>6} {:>10} {:>10} {:>10} {:>8} {:>8} {:>10}",
            "idx", "kind", "height", "density", "temp", "lwc", "ice", "refreeze"
        )?;
        for (i, l) in self.layers.iter().enumerate() {
            let kind = match l.kind(self.config.snow_ice_threshold) {
                LayerKind::Snow => "snow",
                LayerKind::Ice => "ice",
                LayerKind::Debris => "debris",
            };
            writeln!(
                f,
                "{:>5} {:>6} {:>10.4} {:>10.2} {:>10.3} {:>8.4} {:>8.4} {:>10.6}",
                i,
                kind,
                l.height(),
                l.density(),
                l.temperature(),
                l.liquid_water_content(),
                l.ice_fraction(),
                l.refreeze()
            )?;
        }
        write!(
            f,
            "layers={} total_height={:.4} snow_height={:.4} new_snow_height={:.4} \
             new_snow_timestamp={:.1} old_snow_timestamp={:.1}",
            self.layers.len(),
            self.total_height(),
            self.total_snowheight(),
            self.fresh_snow.height,
            self.fresh_snow.timestamp,
            self.fresh_snow.old_timestamp
        )
    }
}

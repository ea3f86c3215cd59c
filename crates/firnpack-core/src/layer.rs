//! Layer record: one horizontal slab of the column.
//!
//! Stores height, the phase decomposition (ice fraction, liquid water
//! content, implicit air porosity), temperature and accumulated refreeze.
//! Bulk properties are mixing rules over the three phases and are computed
//! on demand.

use firnpack_macros::Profile;
use serde::{Deserialize, Serialize};

use crate::constants::{
    AIR_DENSITY, FRACTION_TOLERANCE, ICE_DENSITY, IRREDUCIBLE_LOWER_BREAK,
    IRREDUCIBLE_UPPER_BREAK, K_AIR, K_DEBRIS, K_ICE, K_WATER, SPEC_HEAT_AIR, SPEC_HEAT_DEBRIS,
    SPEC_HEAT_ICE, SPEC_HEAT_WATER, WATER_DENSITY, ZERO_TEMPERATURE,
};
use crate::error::{GridError, GridResult};

/// What a layer is made of. Snow and ice are both `Glacial`; which one a
/// glacial layer counts as follows from its density (see [`Layer::kind`]).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Material {
    #[default]
    Glacial,
    Debris { density: f64 },
}

/// Classification used by the albedo schemes and the merge rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Snow,
    Ice,
    Debris,
}

/// One row of the per-layer arrays exchanged with persistence.
#[derive(Debug, Clone, Copy, PartialEq, Profile)]
#[profile(
    profile_name = "LayerProfile",
    derive(Serialize, Deserialize),
    attr(serde(default))
)]
pub struct LayerValues {
    pub height: f64,
    pub density: f64,
    pub temperature: f64,
    pub liquid_water_content: f64,
    pub ice_fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    height: f64,
    ice_fraction: f64,
    liquid_water_content: f64,
    temperature: f64,
    refreeze: f64,
    material: Material,
}

/// Ice fraction of snow with bulk density `density` [kg m^-3], assuming the
/// pore space is filled with air.
pub fn ice_fraction_from_density(density: f64) -> f64 {
    (density - (1.0 - density / ICE_DENSITY) * AIR_DENSITY) / ICE_DENSITY
}

/// Piecewise-linear irreducible water content as a function of ice fraction.
pub fn irreducible_water_content(ice_fraction: f64) -> f64 {
    if ice_fraction <= 0.0 {
        0.0
    } else if ice_fraction <= IRREDUCIBLE_LOWER_BREAK {
        0.0264 + 0.0099 * ((1.0 - ice_fraction) / ice_fraction)
    } else if ice_fraction <= IRREDUCIBLE_UPPER_BREAK {
        0.08 - 0.1023 * (ice_fraction - 0.03)
    } else {
        0.0
    }
}

fn check_height(height: f64) -> GridResult<()> {
    if !height.is_finite() || height < 0.0 {
        return Err(GridError::invalid_layer(
            "height",
            height,
            "must be finite and non-negative",
        ));
    }
    Ok(())
}

fn check_temperature(temperature: f64) -> GridResult<()> {
    if !temperature.is_finite() || temperature > ZERO_TEMPERATURE || temperature <= 0.0 {
        return Err(GridError::invalid_layer(
            "temperature",
            temperature,
            format!("must lie in (0, {}] K", ZERO_TEMPERATURE),
        ));
    }
    Ok(())
}

fn check_fractions(ice_fraction: f64, liquid_water_content: f64) -> GridResult<()> {
    if !ice_fraction.is_finite() || !(0.0..=1.0).contains(&ice_fraction) {
        return Err(GridError::invalid_layer(
            "ice_fraction",
            ice_fraction,
            "must lie in [0, 1]",
        ));
    }
    if !liquid_water_content.is_finite() || liquid_water_content < 0.0 {
        return Err(GridError::invalid_layer(
            "liquid_water_content",
            liquid_water_content,
            "must be finite and non-negative",
        ));
    }
    if ice_fraction + liquid_water_content > 1.0 + FRACTION_TOLERANCE {
        return Err(GridError::invalid_layer(
            "liquid_water_content",
            liquid_water_content,
            format!(
                "ice fraction {} plus liquid water exceeds the layer volume",
                ice_fraction
            ),
        ));
    }
    Ok(())
}

fn check_refreeze(refreeze: f64) -> GridResult<()> {
    if !refreeze.is_finite() || refreeze < 0.0 {
        return Err(GridError::invalid_layer(
            "refreeze",
            refreeze,
            "must be finite and non-negative",
        ));
    }
    Ok(())
}

impl Layer {
    /// Glacial layer from an explicit ice fraction. A new layer must have
    /// thickness; only a setter may thin an existing one to zero.
    pub fn new(
        height: f64,
        ice_fraction: f64,
        temperature: f64,
        liquid_water_content: f64,
    ) -> GridResult<Self> {
        check_height(height)?;
        if height == 0.0 {
            return Err(GridError::invalid_layer("height", height, "must be positive"));
        }
        check_temperature(temperature)?;
        check_fractions(ice_fraction, liquid_water_content)?;
        Ok(Self {
            height,
            ice_fraction,
            liquid_water_content,
            temperature,
            refreeze: 0.0,
            material: Material::Glacial,
        })
    }

    /// Glacial layer from a bulk snow density [kg m^-3].
    pub fn from_density(
        height: f64,
        density: f64,
        temperature: f64,
        liquid_water_content: f64,
    ) -> GridResult<Self> {
        if !density.is_finite() || density <= 0.0 {
            return Err(GridError::invalid_layer("density", density, "must be positive"));
        }
        Self::new(
            height,
            ice_fraction_from_density(density),
            temperature,
            liquid_water_content,
        )
    }

    /// Debris layer of rock density `density` [kg m^-3]. Holds no ice.
    pub fn debris(
        height: f64,
        density: f64,
        temperature: f64,
        liquid_water_content: f64,
    ) -> GridResult<Self> {
        if !density.is_finite() || density <= 0.0 {
            return Err(GridError::invalid_layer(
                "debris_density",
                density,
                "must be positive",
            ));
        }
        let mut layer = Self::new(height, 0.0, temperature, liquid_water_content)?;
        layer.material = Material::Debris { density };
        Ok(layer)
    }

    /// Builds a layer without any range checks. Restart loading uses this to
    /// surface a corrupt state for diagnosis before rejecting it.
    pub(crate) fn unchecked(
        height: f64,
        ice_fraction: f64,
        temperature: f64,
        liquid_water_content: f64,
        material: Material,
    ) -> Self {
        Self {
            height,
            ice_fraction,
            liquid_water_content,
            temperature,
            refreeze: 0.0,
            material,
        }
    }

    /// Re-run every invariant check on the current values.
    pub fn validate(&self) -> GridResult<()> {
        check_height(self.height)?;
        check_temperature(self.temperature)?;
        check_fractions(self.ice_fraction, self.liquid_water_content)?;
        check_refreeze(self.refreeze)?;
        if let Material::Debris { density } = self.material {
            if !density.is_finite() || density <= 0.0 {
                return Err(GridError::invalid_layer(
                    "debris_density",
                    density,
                    "must be positive",
                ));
            }
        }
        Ok(())
    }

    // -- stored values --

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn ice_fraction(&self) -> f64 {
        self.ice_fraction
    }

    pub fn liquid_water_content(&self) -> f64 {
        self.liquid_water_content
    }

    pub fn refreeze(&self) -> f64 {
        self.refreeze
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn is_debris(&self) -> bool {
        matches!(self.material, Material::Debris { .. })
    }

    /// Snow, ice or debris, with glacial layers split at `snow_ice_threshold`.
    pub fn kind(&self, snow_ice_threshold: f64) -> LayerKind {
        match self.material {
            Material::Debris { .. } => LayerKind::Debris,
            Material::Glacial if self.density() <= snow_ice_threshold => LayerKind::Snow,
            Material::Glacial => LayerKind::Ice,
        }
    }

    // -- derived properties --

    /// Pore volume not taken by ice or water [-].
    pub fn air_porosity(&self) -> f64 {
        match self.material {
            Material::Glacial => (1.0 - self.liquid_water_content - self.ice_fraction).max(0.0),
            Material::Debris { .. } => 0.0,
        }
    }

    /// Bulk density [kg m^-3].
    pub fn density(&self) -> f64 {
        match self.material {
            Material::Glacial => {
                self.ice_fraction * ICE_DENSITY
                    + self.liquid_water_content * WATER_DENSITY
                    + self.air_porosity() * AIR_DENSITY
            }
            Material::Debris { density } => density + self.liquid_water_content * WATER_DENSITY,
        }
    }

    /// Bulk specific heat [J kg^-1 K^-1].
    pub fn specific_heat(&self) -> f64 {
        match self.material {
            Material::Glacial => {
                self.air_porosity() * SPEC_HEAT_AIR
                    + self.ice_fraction * SPEC_HEAT_ICE
                    + self.liquid_water_content * SPEC_HEAT_WATER
            }
            Material::Debris { .. } => SPEC_HEAT_DEBRIS,
        }
    }

    /// Bulk thermal conductivity [W m^-1 K^-1].
    pub fn thermal_conductivity(&self) -> f64 {
        match self.material {
            Material::Glacial => {
                self.ice_fraction * K_ICE
                    + self.air_porosity() * K_AIR
                    + self.liquid_water_content * K_WATER
            }
            Material::Debris { .. } => K_DEBRIS,
        }
    }

    /// Thermal diffusivity [m^2 s^-1].
    pub fn thermal_diffusivity(&self) -> f64 {
        self.thermal_conductivity() / (self.density() * self.specific_heat())
    }

    /// Volumetric heat capacity times height [J K^-1 m^-2].
    pub fn heat_capacity(&self) -> f64 {
        self.density() * self.specific_heat() * self.height
    }

    /// Energy needed to bring the layer to the melting point [J m^-2].
    pub fn cold_content(&self) -> f64 {
        -self.specific_heat() * self.density() * self.height * (self.temperature - ZERO_TEMPERATURE)
    }

    /// Liquid water the layer retains against drainage [-].
    pub fn irreducible_water_content(&self) -> f64 {
        match self.material {
            Material::Glacial => irreducible_water_content(self.ice_fraction),
            Material::Debris { .. } => 0.0,
        }
    }

    /// Ice mass per unit area [kg m^-2].
    pub fn ice_mass(&self) -> f64 {
        self.ice_fraction * ICE_DENSITY * self.height
    }

    /// Liquid water mass per unit area [kg m^-2].
    pub fn water_mass(&self) -> f64 {
        self.liquid_water_content * WATER_DENSITY * self.height
    }

    pub fn values(&self) -> LayerValues {
        LayerValues {
            height: self.height,
            density: self.density(),
            temperature: self.temperature,
            liquid_water_content: self.liquid_water_content,
            ice_fraction: self.ice_fraction,
        }
    }

    // -- validated setters --

    pub fn set_height(&mut self, height: f64) -> GridResult<()> {
        check_height(height)?;
        self.height = height;
        Ok(())
    }

    pub fn set_temperature(&mut self, temperature: f64) -> GridResult<()> {
        check_temperature(temperature)?;
        self.temperature = temperature;
        Ok(())
    }

    pub fn set_liquid_water_content(&mut self, liquid_water_content: f64) -> GridResult<()> {
        check_fractions(self.ice_fraction, liquid_water_content)?;
        self.liquid_water_content = liquid_water_content;
        Ok(())
    }

    pub fn set_ice_fraction(&mut self, ice_fraction: f64) -> GridResult<()> {
        if self.is_debris() && ice_fraction != 0.0 {
            return Err(GridError::invalid_layer(
                "ice_fraction",
                ice_fraction,
                "debris layers hold no ice",
            ));
        }
        check_fractions(ice_fraction, self.liquid_water_content)?;
        self.ice_fraction = ice_fraction;
        Ok(())
    }

    pub fn set_refreeze(&mut self, refreeze: f64) -> GridResult<()> {
        check_refreeze(refreeze)?;
        self.refreeze = refreeze;
        Ok(())
    }

    /// Combine this layer with the layer directly below it.
    ///
    /// Heights add; ice fraction and liquid water are height-weighted so ice
    /// and water mass are conserved; temperature is weighted by heat
    /// capacity so sensible heat is conserved; refreeze adds.
    pub fn merged_with(&self, below: &Layer) -> GridResult<Layer> {
        if self.material != below.material {
            return Err(GridError::invalid_layer(
                "material",
                below.height,
                "cannot merge layers of different material",
            ));
        }
        let height = self.height + below.height;
        if height <= 0.0 {
            return Err(GridError::invalid_layer(
                "height",
                height,
                "merged layer would have no thickness",
            ));
        }
        let ice_fraction =
            (self.ice_fraction * self.height + below.ice_fraction * below.height) / height;
        let liquid_water_content = (self.liquid_water_content * self.height
            + below.liquid_water_content * below.height)
            / height;

        let (c_top, c_below) = (self.heat_capacity(), below.heat_capacity());
        let temperature = if c_top + c_below > 0.0 {
            (self.temperature * c_top + below.temperature * c_below) / (c_top + c_below)
        } else {
            0.5 * (self.temperature + below.temperature)
        };
        // Rounding can lift a weighted mean of values at the melting point
        // above it by one ulp.
        let temperature = temperature.min(ZERO_TEMPERATURE);

        let mut merged = Layer::new(
            height,
            ice_fraction.clamp(0.0, 1.0),
            temperature,
            liquid_water_content,
        )?;
        merged.material = self.material;
        merged.set_refreeze(self.refreeze + below.refreeze)?;
        Ok(merged)
    }

    /// Two layers of half the height and identical intensive state.
    pub fn halved(&self) -> (Layer, Layer) {
        let mut half = *self;
        half.height = 0.5 * self.height;
        half.refreeze = 0.5 * self.refreeze;
        (half, half)
    }
}

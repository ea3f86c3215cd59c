//! Physical constants for the snow/firn/ice column.
//!
//! Fixed, process-wide values. Tunable model parameters live in
//! [`crate::config`].

/// Melting point of ice [K].
pub const ZERO_TEMPERATURE: f64 = 273.16;

/// Density of pure ice [kg m^-3].
pub const ICE_DENSITY: f64 = 917.0;

/// Density of liquid water [kg m^-3].
pub const WATER_DENSITY: f64 = 1000.0;

/// Density of air [kg m^-3].
pub const AIR_DENSITY: f64 = 1.1;

/// Specific heat of ice [J kg^-1 K^-1].
pub const SPEC_HEAT_ICE: f64 = 2050.0;

/// Specific heat of water [J kg^-1 K^-1].
pub const SPEC_HEAT_WATER: f64 = 4217.0;

/// Specific heat of air [J kg^-1 K^-1].
pub const SPEC_HEAT_AIR: f64 = 1004.7;

/// Specific heat of debris (rock) [J kg^-1 K^-1].
pub const SPEC_HEAT_DEBRIS: f64 = 948.0;

/// Thermal conductivity of ice [W m^-1 K^-1].
pub const K_ICE: f64 = 2.22;

/// Thermal conductivity of water [W m^-1 K^-1].
pub const K_WATER: f64 = 0.55;

/// Thermal conductivity of air [W m^-1 K^-1].
pub const K_AIR: f64 = 0.024;

/// Thermal conductivity of debris [W m^-1 K^-1].
pub const K_DEBRIS: f64 = 0.94;

/// Ice fraction below which irreducible water follows the porous-snow branch [-].
pub const IRREDUCIBLE_LOWER_BREAK: f64 = 0.23;

/// Ice fraction above which a layer retains no irreducible water [-].
pub const IRREDUCIBLE_UPPER_BREAK: f64 = 0.812;

/// Slack allowed on `ice_fraction + liquid_water_content <= 1`.
pub const FRACTION_TOLERANCE: f64 = 1e-12;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Seconds per day.
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Albedo process functions.
///
/// Pure functions of scalars; the grid is read by the caller in `mod.rs`.
use crate::config::AlbedoConfig;
use crate::constants::ZERO_TEMPERATURE;

/// Snow albedo from age alone (Oerlemans & Knap 1998).
///
/// Decays exponentially from fresh-snow albedo toward firn albedo with an
/// e-folding time of `snow_aging` days.
pub fn simple_albedo(params: &AlbedoConfig, hours_since_snowfall: f64) -> f64 {
    params.albedo_firn
        + (params.albedo_fresh_snow - params.albedo_firn)
            * (-hours_since_snowfall / (params.snow_aging * 24.0)).exp()
}

/// Pull a snow albedo toward ice albedo as the snow cover thins.
///
/// `snow_depth_cm` is the e-folding depth in centimetres. At zero snow
/// height the result is exactly the ice albedo.
pub fn depth_modulated(
    albedo_snow: f64,
    albedo_ice: f64,
    snow_height: f64,
    snow_depth_cm: f64,
) -> f64 {
    albedo_snow + (albedo_ice - albedo_snow) * (-snow_height / (snow_depth_cm / 100.0)).exp()
}

/// Albedo decay timescale t* [days] (Bougamont et al. 2005).
///
/// Melting surfaces use the wet timescale. Dry surfaces get longer
/// timescales the colder they are, down to the cutoff temperature.
pub fn t_star(params: &AlbedoConfig, surface_temperature: f64) -> f64 {
    if surface_temperature >= ZERO_TEMPERATURE {
        params.t_star_wet
    } else if surface_temperature < params.t_star_cutoff {
        params.t_star_dry + (ZERO_TEMPERATURE - params.t_star_cutoff) * params.t_star_k
    } else {
        params.t_star_dry + (ZERO_TEMPERATURE - surface_temperature) * params.t_star_k
    }
}

/// One explicit step of the t* relaxation of `albedo_snow` toward firn.
pub fn decay_toward_firn(albedo_snow: f64, albedo_firn: f64, t_star: f64, dt_days: f64) -> f64 {
    albedo_snow - (albedo_snow - albedo_firn) / t_star * dt_days
}

/// Share of snow albedo over debris (Lejeune et al. 2007).
pub fn lejeune_weight(snow_height: f64, critical_thickness: f64, exponent: f64) -> f64 {
    (snow_height / critical_thickness).powf(exponent).min(1.0)
}

/// Blend of snow and debris albedo by `weight`.
pub fn blend(weight: f64, albedo_snow: f64, albedo_debris: f64) -> f64 {
    weight * albedo_snow + (1.0 - weight) * albedo_debris
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> AlbedoConfig {
        AlbedoConfig::default()
    }

    // -- simple_albedo --

    #[test]
    fn fresh_snow_has_fresh_albedo() {
        let p = params();
        assert!((simple_albedo(&p, 0.0) - p.albedo_fresh_snow).abs() < 1e-12);
    }

    #[test]
    fn old_snow_tends_to_firn() {
        let p = params();
        let a = simple_albedo(&p, 1.0e6);
        assert!((a - p.albedo_firn).abs() < 1e-10);
    }

    #[test]
    fn aging_reduces_albedo() {
        let p = params();
        let mut last = simple_albedo(&p, 0.0);
        for h in [1.0, 24.0, 240.0, 2400.0] {
            let a = simple_albedo(&p, h);
            assert!(a < last);
            last = a;
        }
    }

    // -- depth_modulated --

    #[test]
    fn no_snow_gives_ice_albedo() {
        assert!((depth_modulated(0.85, 0.3, 0.0, 3.0) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn deep_snow_keeps_snow_albedo() {
        let a = depth_modulated(0.85, 0.3, 5.0, 3.0);
        assert!((a - 0.85).abs() < 1e-10);
    }

    // -- t_star --

    #[test]
    fn melting_surface_uses_wet_timescale() {
        let p = params();
        assert_eq!(t_star(&p, ZERO_TEMPERATURE), p.t_star_wet);
        assert_eq!(t_star(&p, 280.0), p.t_star_wet);
    }

    #[test]
    fn dry_timescale_grows_with_cold() {
        let p = params();
        let t = t_star(&p, 268.0);
        assert!((t - (30.0 + (ZERO_TEMPERATURE - 268.0) * 7.0)).abs() < 1e-10);
    }

    #[test]
    fn dry_timescale_capped_at_cutoff() {
        let p = params();
        assert_eq!(t_star(&p, 240.0), t_star(&p, 250.0));
        let capped = 30.0 + (ZERO_TEMPERATURE - p.t_star_cutoff) * 7.0;
        assert!((t_star(&p, 240.0) - capped).abs() < 1e-10);
    }

    // -- decay_toward_firn --

    #[test]
    fn decay_moves_toward_firn() {
        let a = decay_toward_firn(0.85, 0.55, 5.0, 1.0);
        assert!((a - (0.85 - 0.3 / 5.0)).abs() < 1e-12);
        assert_eq!(decay_toward_firn(0.55, 0.55, 5.0, 1.0), 0.55);
    }

    // -- lejeune_weight --

    #[test]
    fn weight_bounds() {
        assert_eq!(lejeune_weight(0.0, 0.05, 0.5), 0.0);
        assert_eq!(lejeune_weight(0.05, 0.05, 0.5), 1.0);
        assert_eq!(lejeune_weight(1.0, 0.05, 0.5), 1.0);
        let w = lejeune_weight(0.0125, 0.05, 0.5);
        assert!((w - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_weight_blend_is_debris() {
        assert_eq!(blend(0.0, 0.85, 0.07), 0.07);
        assert_eq!(blend(1.0, 0.85, 0.07), 0.85);
    }
}

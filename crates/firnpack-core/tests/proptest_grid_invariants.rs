//! Property-based invariant tests for grid layer management.
//!
//! 1. Merging a layer away conserves height, ice mass and water mass.
//! 2. A merged temperature lies between its inputs and never above melting.
//! 3. Splitting a layer and merging the halves restores it.
//! 4. `update_grid` conserves mass and leaves every height within bounds,
//!    including columns with empty and sub-minimum layers.
//! 5. `update_grid` never re-merges the halves it just split.
//! 6. Fresh-snow age grows monotonically without snowfall.

use approx::assert_relative_eq;
use firnpack_core::constants::ZERO_TEMPERATURE;
use firnpack_core::{Grid, GridConfig, Layer};
use proptest::prelude::*;

// -- helpers --

fn layer_strategy(max_height: f64) -> impl Strategy<Value = Layer> {
    (
        0.0001f64..max_height,
        100.0f64..850.0,
        240.0f64..ZERO_TEMPERATURE,
        0.0f64..0.05,
    )
        .prop_map(|(h, rho, t, lwc)| Layer::from_density(h, rho, t, lwc).unwrap())
}

/// Grids where some layers were melted to nothing or thinned below the
/// minimum height after construction.
fn thinned_grid_strategy(max_height: f64) -> impl Strategy<Value = Grid> {
    prop::collection::vec((layer_strategy(max_height), 0u8..4, 0.0f64..0.001), 2..30).prop_map(
        |entries| {
            let layers = entries
                .into_iter()
                .map(|(mut layer, mode, thin)| {
                    match mode {
                        0 => layer.set_height(0.0).unwrap(),
                        1 => layer.set_height(thin).unwrap(),
                        _ => {}
                    }
                    layer
                })
                .collect();
            Grid::new(layers, GridConfig::default()).unwrap()
        },
    )
}

fn ice_mass(g: &Grid) -> f64 {
    g.layers().iter().map(Layer::ice_mass).sum()
}

fn water_mass(g: &Grid) -> f64 {
    g.layers().iter().map(Layer::water_mass).sum()
}

// -- 1. remove_layers_merge conservation --

proptest! {
    #[test]
    fn remove_layers_merge_conserves_mass(g in thinned_grid_strategy(0.5), pick in any::<prop::sample::Index>()) {
        let mut g = g;
        let idx = pick.index(g.number_of_layers());
        let (h, ice, water) = (g.total_height(), ice_mass(&g), water_mass(&g));
        g.remove_layers_merge(idx).unwrap();
        prop_assert!((g.total_height() - h).abs() < 1e-9);
        prop_assert!((ice_mass(&g) - ice).abs() < 1e-9 * ice.max(1.0));
        prop_assert!((water_mass(&g) - water).abs() < 1e-9 * water.max(1.0));
        prop_assert!(g.check().is_ok());
    }
}

// -- 2. merged temperature bounds --

proptest! {
    #[test]
    fn merged_temperature_is_bounded(a in layer_strategy(0.5), b in layer_strategy(0.5)) {
        let m = a.merged_with(&b).unwrap();
        let lo = a.temperature().min(b.temperature());
        let hi = a.temperature().max(b.temperature());
        prop_assert!(m.temperature() >= lo - 1e-9);
        prop_assert!(m.temperature() <= hi + 1e-9);
        prop_assert!(m.temperature() <= ZERO_TEMPERATURE);
    }
}

// -- 3. split then merge --

proptest! {
    #[test]
    fn split_then_merge_is_identity(layer in layer_strategy(2.0)) {
        let mut g = Grid::new(vec![layer], GridConfig::default()).unwrap();
        let threshold = layer.height() * 0.9;
        prop_assert_eq!(g.split_layers(threshold).unwrap(), 1);
        prop_assert_eq!(g.merge_layers(threshold).unwrap(), 1);
        let after = g.layer(0).unwrap();
        assert_relative_eq!(after.height(), layer.height(), max_relative = 1e-12);
        assert_relative_eq!(after.temperature(), layer.temperature(), max_relative = 1e-12);
        assert_relative_eq!(after.density(), layer.density(), max_relative = 1e-12);
        assert_relative_eq!(
            after.liquid_water_content(),
            layer.liquid_water_content(),
            epsilon = 1e-15,
            max_relative = 1e-12
        );
    }
}

// -- 4. update_grid --

proptest! {
    #[test]
    fn update_grid_conserves_and_bounds(g in thinned_grid_strategy(2.0)) {
        let mut g = g;
        let (h, ice, water) = (g.total_height(), ice_mass(&g), water_mass(&g));
        g.update_grid().unwrap();
        let cfg = *g.config();
        prop_assert!((g.total_height() - h).abs() < 1e-9);
        prop_assert!((ice_mass(&g) - ice).abs() < 1e-9 * ice.max(1.0));
        prop_assert!((water_mass(&g) - water).abs() < 1e-9 * water.max(1.0));
        prop_assert!(g.number_of_layers() <= cfg.max_layers);
        let single = g.number_of_layers() == 1;
        for height in g.heights() {
            prop_assert!(single || height >= cfg.min_layer_height);
            prop_assert!(height <= cfg.max_layer_height + 1e-12);
        }
        prop_assert!(g.check().is_ok());
    }
}

// -- 5. no re-merge of split halves --

proptest! {
    #[test]
    fn update_grid_keeps_halves_split(layer in layer_strategy(2.0)) {
        let mut g = Grid::new(vec![layer], GridConfig::default()).unwrap();
        let cfg = *g.config();
        g.update_grid().unwrap();
        for height in g.heights() {
            prop_assert!(height <= cfg.max_layer_height + 1e-12);
        }
    }
}

// -- 6. aging --

proptest! {
    #[test]
    fn aging_is_monotonic(steps in prop::collection::vec(1.0f64..86400.0, 1..50)) {
        let layer = Layer::from_density(0.5, 300.0, 265.0, 0.0).unwrap();
        let mut g = Grid::new(vec![layer], GridConfig::default()).unwrap();
        let mut last = g.fresh_snow_props().hours_since_snowfall();
        for s in steps {
            g.age_fresh_snow(s);
            let hours = g.fresh_snow_props().hours_since_snowfall();
            prop_assert!(hours > last);
            last = hours;
        }
    }
}

//! Persisted grid state for restarts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{FreshSnow, Grid};
use crate::error::GridResult;
use crate::layer::{LayerProfile, Material};

/// Grid state at a checkpoint: per-layer arrays plus the fresh-snow
/// trackers. Arrays may be longer than `n_layers`; the tail is ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub n_layers: usize,
    pub layers: LayerProfile,
    /// Material per layer. Empty means every layer is glacial.
    #[serde(default)]
    pub materials: Vec<Material>,
    pub new_snow_height: f64,
    pub new_snow_timestamp: f64,
    pub old_snow_timestamp: f64,
}

impl Snapshot {
    pub fn fresh_snow(&self) -> FreshSnow {
        FreshSnow::new(
            self.new_snow_height,
            self.new_snow_timestamp,
            self.old_snow_timestamp,
        )
    }

    /// Material of layer `idx`, glacial when not recorded.
    pub fn material(&self, idx: usize) -> Material {
        self.materials.get(idx).copied().unwrap_or_default()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> GridResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> GridResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Grid {
    /// Capture the current state for a later `load_snowpack`.
    pub fn snapshot(&self) -> Snapshot {
        let mut layers = LayerProfile::with_capacity(self.layers.len());
        for layer in &self.layers {
            layers.push(&layer.values());
        }
        let materials = if self.layers.iter().any(|l| l.is_debris()) {
            self.layers.iter().map(|l| l.material()).collect()
        } else {
            Vec::new()
        };
        Snapshot {
            n_layers: self.layers.len(),
            layers,
            materials,
            new_snow_height: self.fresh_snow.height,
            new_snow_timestamp: self.fresh_snow.timestamp,
            old_snow_timestamp: self.fresh_snow.old_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_grid;
    use super::*;
    use crate::error::GridError;

    #[test]
    fn snapshot_mirrors_grid() {
        let mut g = sample_grid();
        g.age_fresh_snow(1800.0);
        let snap = g.snapshot();
        assert_eq!(snap.n_layers, 5);
        assert_eq!(snap.layers.len(), 5);
        assert_eq!(snap.layers.height, g.heights());
        assert_eq!(snap.layers.temperature, g.temperatures());
        assert!(snap.materials.is_empty());
        assert_eq!(snap.fresh_snow(), g.fresh_snow_props());
    }

    #[test]
    fn snapshot_records_debris() {
        let mut g = sample_grid();
        g.add_fresh_debris(0.1, 1496.0, 270.0, 0.0).unwrap();
        let snap = g.snapshot();
        assert_eq!(snap.materials.len(), 6);
        assert_eq!(snap.material(0), Material::Debris { density: 1496.0 });
        assert_eq!(snap.material(1), Material::Glacial);
    }

    #[test]
    fn missing_columns_default_to_empty() {
        let json = r#"{
            "n_layers": 1,
            "layers": {"height": [1.0], "density": [917.0], "temperature": [265.0],
                       "liquid_water_content": [0.0]},
            "new_snow_height": 0.0,
            "new_snow_timestamp": 0.0,
            "old_snow_timestamp": 0.0
        }"#;
        let snap: Snapshot = serde_json::from_str(json).unwrap();
        assert!(snap.layers.ice_fraction.is_empty());
        assert!(snap.materials.is_empty());
        assert_eq!(snap.material(0), Material::Glacial);
    }

    #[test]
    fn file_round_trip() {
        let path =
            std::env::temp_dir().join(format!("firnpack_snapshot_{}.json", std::process::id()));
        let snap = sample_grid().snapshot();
        snap.save_to_file(&path).unwrap();
        let loaded = Snapshot::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.n_layers, snap.n_layers);
        for (a, b) in loaded.layers.density.iter().zip(&snap.layers.density) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Snapshot::from_file("/nonexistent/firnpack/snapshot.json").unwrap_err();
        assert!(matches!(err, GridError::Io(_)));
    }
}

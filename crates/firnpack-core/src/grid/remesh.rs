//! Layer management: split, merge and the per-timestep maintenance pass.
//!
//! The external solvers change heights, densities and temperatures freely;
//! `update_grid` brings the mesh back into shape afterwards.

use smallvec::SmallVec;

use super::Grid;
use crate::error::{GridError, GridResult};

/// Counts of the structural edits made by one maintenance pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemeshSummary {
    /// Thin layers folded into a neighbour.
    pub removed: usize,
    pub split: usize,
    pub merged: usize,
}

impl RemeshSummary {
    pub fn is_empty(&self) -> bool {
        self.removed == 0 && self.split == 0 && self.merged == 0
    }
}

fn check_threshold(key: &str, threshold: f64) -> GridResult<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(GridError::invalid_config(
            key,
            threshold,
            "threshold must be finite and non-negative",
        ));
    }
    Ok(())
}

impl Grid {
    /// Halve every layer thicker than `threshold` [m]. Each layer is split at
    /// most once per call. Returns the number of splits.
    pub fn split_layers(&mut self, threshold: f64) -> GridResult<usize> {
        check_threshold("split threshold", threshold)?;
        let thick: SmallVec<[usize; 8]> = self
            .layers
            .iter()
            .enumerate()
            .filter(|(_, l)| l.height() > threshold)
            .map(|(i, _)| i)
            .collect();
        // Deepest first so the remaining indices stay valid.
        for &idx in thick.iter().rev() {
            self.split_at(idx)?;
        }
        Ok(thick.len())
    }

    /// Whether layers `i` and `i + 1` should become one. With a `cap`, no
    /// pair whose combined height exceeds it merges.
    fn should_merge(&self, i: usize, threshold: f64, cap: Option<f64>) -> bool {
        let (a, b) = (&self.layers[i], &self.layers[i + 1]);
        let cfg = &self.config;
        if a.material() != b.material()
            || a.kind(cfg.snow_ice_threshold) != b.kind(cfg.snow_ice_threshold)
        {
            return false;
        }
        let combined = a.height() + b.height();
        if cap.is_some_and(|cap| combined > cap) {
            return false;
        }
        if combined < threshold {
            return true;
        }
        (a.height() - b.height()).abs() < threshold
            && (a.density() - b.density()).abs() <= cfg.density_tolerance
            && (a.temperature() - b.temperature()).abs() <= cfg.temperature_tolerance
    }

    /// One top-down pass merging redundant or thin neighbours.
    ///
    /// A pair merges when it is of one kind and either its combined height
    /// is below `threshold`, or the heights differ by less than `threshold`
    /// and density and temperature agree within the configured tolerances.
    /// After a merge the merged layer is compared with its new lower
    /// neighbour. `merge_layers(t)` undoes `split_layers(t)`.
    pub fn merge_layers(&mut self, threshold: f64) -> GridResult<usize> {
        self.merge_pass(threshold, None)
    }

    fn merge_pass(&mut self, threshold: f64, cap: Option<f64>) -> GridResult<usize> {
        check_threshold("merge threshold", threshold)?;
        let mut merged = 0;
        let mut i = 0;
        while i + 1 < self.layers.len() {
            if self.should_merge(i, threshold, cap) {
                self.merge_pair(i)?;
                merged += 1;
            } else {
                i += 1;
            }
        }
        Ok(merged)
    }

    /// Fold every layer thinner than `min_layer_height` into a neighbour.
    /// An empty layer with nowhere to go is dropped.
    fn remove_thin_layers(&mut self) -> usize {
        let min_height = self.config.min_layer_height;
        let mut removed = 0;
        let mut i = 0;
        while i < self.layers.len() && self.layers.len() > 1 {
            if self.layers[i].height() >= min_height {
                i += 1;
                continue;
            }
            let folded = self.remove_layers_merge(i).or_else(|err| {
                if self.layers[i].height() == 0.0 {
                    self.remove_layer(i).map(|_| ())
                } else {
                    Err(err)
                }
            });
            match folded {
                Ok(()) => removed += 1,
                Err(err) => {
                    log::warn!("keeping thin layer {}: {}", i, err);
                    i += 1;
                }
            }
        }
        removed
    }

    /// Merge the thinnest same-material pair until the count fits
    /// `max_layers`.
    fn enforce_max_layers(&mut self) -> GridResult<usize> {
        let mut merged = 0;
        while self.layers.len() > self.config.max_layers {
            let thinnest = self
                .layers
                .windows(2)
                .enumerate()
                .filter(|(_, pair)| pair[0].material() == pair[1].material())
                .map(|(i, pair)| (i, pair[0].height() + pair[1].height()))
                .min_by(|a, b| a.1.total_cmp(&b.1));
            let Some((i, _)) = thinnest else {
                log::warn!(
                    "{} layers exceed max_layers={} but no pair can merge",
                    self.layers.len(),
                    self.config.max_layers
                );
                break;
            };
            self.merge_pair(i)?;
            merged += 1;
        }
        Ok(merged)
    }

    /// Per-timestep maintenance: drop thin layers, split thick ones, merge
    /// redundant neighbours and keep the layer count bounded.
    pub fn update_grid(&mut self) -> GridResult<RemeshSummary> {
        let removed = self.remove_thin_layers();
        let mut split = 0;
        loop {
            let n = self.split_layers(self.config.max_layer_height)?;
            if n == 0 {
                break;
            }
            split += n;
        }
        // Capped so the merge does not rebuild what the split just cut.
        let cap = Some(self.config.max_layer_height);
        let merged =
            self.merge_pass(self.config.merge_threshold, cap)? + self.enforce_max_layers()?;
        let summary = RemeshSummary {
            removed,
            split,
            merged,
        };
        if !summary.is_empty() {
            log::debug!(
                "remesh: removed={} split={} merged={} -> {} layers",
                removed,
                split,
                merged,
                self.layers.len()
            );
        }
        Ok(summary)
    }
}

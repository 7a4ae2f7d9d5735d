//! Personal neutral-posture baseline
//!
//! The baseline is a single nose-to-shoulder ratio captured while the user
//! sits upright. [`CalibrationSampler`] averages it over a hold-still window.

use log::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Calibration {
    baseline: Option<f64>,
}

impl Calibration {
    pub fn new() -> Self {
        Self { baseline: None }
    }

    /// Store `raw_ratio` as the neutral baseline.
    ///
    /// Non-finite ratios are ignored and the previous state kept.
    pub fn calibrate(&mut self, raw_ratio: f64) {
        if !raw_ratio.is_finite() {
            warn!("ignoring non-finite slouch baseline {raw_ratio}");
            return;
        }
        info!("slouch baseline calibrated at {raw_ratio:.4}");
        self.baseline = Some(raw_ratio);
    }

    pub fn reset(&mut self) {
        if self.baseline.take().is_some() {
            info!("slouch baseline cleared");
        }
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }
}

/// Collects raw ratios over a fixed number of usable frames
#[derive(Debug, Clone)]
pub struct CalibrationSampler {
    target: usize,
    samples: Vec<f64>,
}

impl CalibrationSampler {
    pub fn new(target: usize) -> Self {
        let target = target.max(1);
        Self {
            target,
            samples: Vec::with_capacity(target),
        }
    }

    /// Add one frame's ratio. Frames without a ratio are skipped.
    ///
    /// Returns the mean once `target` samples have been collected.
    pub fn push(&mut self, ratio: Option<f64>) -> Option<f64> {
        if let Some(r) = ratio.filter(|r| r.is_finite()) {
            if self.samples.len() < self.target {
                self.samples.push(r);
            }
        }
        self.mean()
    }

    pub fn mean(&self) -> Option<f64> {
        if !self.is_complete() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    pub fn is_complete(&self) -> bool {
        self.samples.len() >= self.target
    }

    /// Fraction of the window collected, 0.0-1.0
    pub fn progress(&self) -> f64 {
        self.samples.len() as f64 / self.target as f64
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::posture::Thresholds;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thresholds: Thresholds,
    pub alerts: AlertConfig,
    pub calibration: CalibrationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// On-screen lifetime of an alert, 0 keeps it until dismissed
    pub duration_ms: u64,
    /// Continuous bad posture before an alert is raised
    pub violation_timeout_secs: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            duration_ms: 5000,
            violation_timeout_secs: 3.0,
        }
    }
}

impl AlertConfig {
    /// Zero means the alert stays until dismissed
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Frames averaged while the user holds still (~3s at 30fps)
    pub hold_frames: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self { hold_frames: 90 }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        for (name, value) in [
            ("thresholds.min_distance", t.min_distance),
            ("thresholds.max_lean_angle", t.max_lean_angle),
            ("thresholds.max_slouch_angle", t.max_slouch_angle),
        ] {
            if !(value.is_finite() && value > 0.0) {
                bail!("{name} must be a positive number, got {value}");
            }
        }
        let timeout = self.alerts.violation_timeout_secs;
        // zero alerts on the first bad frame
        if !timeout.is_finite() || timeout < 0.0 {
            bail!("alerts.violation_timeout_secs must be >= 0, got {timeout}");
        }
        if self.calibration.hold_frames == 0 {
            bail!("calibration.hold_frames must be at least 1");
        }
        Ok(())
    }
}

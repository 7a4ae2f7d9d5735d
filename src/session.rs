//! Session statistics and the posture store driven by the tracking loop

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::posture::{PoseAnalysis, PostureStatus, Thresholds};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Seconds
    pub total_time: f64,
    /// Seconds, never more than `total_time`
    pub good_posture_time: f64,
    pub alerts: u32,
    pub start_time: Option<DateTime<Utc>>,
}

impl SessionStats {
    /// Share of tracked time spent in good posture, 0-100.
    ///
    /// 100 before any time has been tracked.
    pub fn posture_score(&self) -> u8 {
        if self.total_time <= 0.0 {
            return 100;
        }
        (self.good_posture_time / self.total_time * 100.0).round() as u8
    }
}

/// Latest classification plus everything accumulated for the session.
///
/// Owned by the tracking loop and passed explicitly to whoever reads it.
#[derive(Debug, Clone)]
pub struct PostureStore {
    pub status: PostureStatus,
    pub confidence: u8,
    pub distance: f64,
    pub lean_angle: f64,
    pub shoulder_angle: f64,
    pub is_tracking: bool,
    pub thresholds: Thresholds,
    /// Last time a GOOD frame was seen
    pub last_good_posture: DateTime<Utc>,
    /// Seconds of continuous bad posture
    pub bad_posture_duration: f64,
    calibration: Calibration,
    stats: SessionStats,
}

impl PostureStore {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            status: PostureStatus::NotDetected,
            confidence: 0,
            distance: 0.0,
            lean_angle: 0.0,
            shoulder_angle: 0.0,
            is_tracking: false,
            thresholds,
            last_good_posture: Utc::now(),
            bad_posture_duration: 0.0,
            calibration: Calibration::new(),
            stats: SessionStats::default(),
        }
    }

    /// Copy a classifier result into the live fields
    pub fn apply(&mut self, analysis: &PoseAnalysis) {
        self.status = analysis.status;
        self.confidence = analysis.confidence;
        self.distance = analysis.distance;
        self.lean_angle = analysis.lean_angle;
        self.shoulder_angle = analysis.shoulder_angle;
    }

    pub fn set_tracking(&mut self, tracking: bool) {
        self.is_tracking = tracking;
    }

    pub fn session_stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Discard all accumulated stats and start timing now
    pub fn start_session(&mut self) {
        self.stats = SessionStats {
            total_time: 0.0,
            good_posture_time: 0.0,
            alerts: 0,
            start_time: Some(Utc::now()),
        };
        info!("session started");
    }

    pub fn update_stats(&mut self, delta_seconds: f64, is_good: bool) {
        // negative or NaN deltas would break good <= total
        if delta_seconds.is_nan() || delta_seconds <= 0.0 {
            return;
        }
        self.stats.total_time += delta_seconds;
        if is_good {
            self.stats.good_posture_time += delta_seconds;
        }
    }

    pub fn increment_alerts(&mut self) {
        self.stats.alerts += 1;
    }

    pub fn posture_score(&self) -> u8 {
        self.stats.posture_score()
    }

    pub fn calibrate_slouch_baseline(&mut self, baseline: f64) {
        self.calibration.calibrate(baseline);
    }

    pub fn reset_calibration(&mut self) {
        self.calibration.reset();
    }

    pub fn slouch_baseline(&self) -> Option<f64> {
        self.calibration.baseline()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_calibrated()
    }
}

impl Default for PostureStore {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

//! Threshold-based posture classification
//!
//! `analyze_pose` turns one landmark frame into a single status, a
//! confidence score and the list of concurrently detected issues.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geometry::{estimate_distance, lean_angle, slouch_angle};
use crate::landmark::{LandmarkSet, LEFT_SHOULDER, MIN_LANDMARKS, NOSE, RIGHT_SHOULDER};

/// Severe when the measurement is this far past the threshold
const DANGER_FACTOR: f64 = 1.5;
/// Too-close is severe below this fraction of the minimum distance
const DISTANCE_DANGER_FACTOR: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureStatus {
    Good,
    Leaning,
    TooClose,
    Slouching,
    #[default]
    NotDetected,
}

impl PostureStatus {
    pub fn name(&self) -> &'static str {
        match self {
            PostureStatus::Good => "good",
            PostureStatus::Leaning => "leaning",
            PostureStatus::TooClose => "too_close",
            PostureStatus::Slouching => "slouching",
            PostureStatus::NotDetected => "not_detected",
        }
    }

    /// A detected body with at least one issue
    pub fn is_issue(&self) -> bool {
        !matches!(self, PostureStatus::Good | PostureStatus::NotDetected)
    }
}

impl fmt::Display for PostureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    TooClose,
    Leaning,
    Slouching,
}

impl IssueKind {
    pub fn status(&self) -> PostureStatus {
        match self {
            IssueKind::TooClose => PostureStatus::TooClose,
            IssueKind::Leaning => PostureStatus::Leaning,
            IssueKind::Slouching => PostureStatus::Slouching,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,
    pub severity: Severity,
}

/// Classification limits, owned and edited by the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Centimeters
    pub min_distance: f64,
    /// Degrees
    pub max_lean_angle: f64,
    /// Pseudo-degrees
    pub max_slouch_angle: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_distance: 50.0,
            max_lean_angle: 8.0,
            max_slouch_angle: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseAnalysis {
    pub status: PostureStatus,
    /// 0-100
    pub confidence: u8,
    /// Centimeters, 0 when unavailable
    pub distance: f64,
    pub lean_angle: f64,
    /// Slouch angle
    pub shoulder_angle: f64,
    pub issues: Vec<PostureIssue>,
}

impl PoseAnalysis {
    pub fn not_detected() -> Self {
        Self {
            status: PostureStatus::NotDetected,
            confidence: 0,
            distance: 0.0,
            lean_angle: 0.0,
            shoulder_angle: 0.0,
            issues: Vec::new(),
        }
    }

    /// Issue that decided `status`
    pub fn primary_issue(&self) -> Option<&PostureIssue> {
        self.issues
            .iter()
            .find(|i| i.severity == Severity::Danger)
            .or_else(|| self.issues.first())
    }
}

/// Classify one frame.
///
/// `None` or a frame with fewer than [`MIN_LANDMARKS`] entries yields
/// [`PoseAnalysis::not_detected`].
pub fn analyze_pose(
    landmarks: Option<&LandmarkSet>,
    thresholds: &Thresholds,
    slouch_baseline: Option<f64>,
) -> PoseAnalysis {
    let landmarks = match landmarks {
        Some(set) if set.len() >= MIN_LANDMARKS => set,
        _ => return PoseAnalysis::not_detected(),
    };

    let distance = estimate_distance(landmarks);
    let lean = lean_angle(landmarks);
    let slouch = slouch_angle(landmarks, slouch_baseline);
    let confidence = key_confidence(landmarks);

    let mut issues = Vec::new();

    if let Some(d) = distance.filter(|d| *d < thresholds.min_distance) {
        issues.push(PostureIssue {
            kind: IssueKind::TooClose,
            message: format!("Too close to screen ({d}cm)"),
            severity: if d < thresholds.min_distance * DISTANCE_DANGER_FACTOR {
                Severity::Danger
            } else {
                Severity::Warning
            },
        });
    }

    let lean_abs = lean.abs();
    if lean_abs > thresholds.max_lean_angle {
        let direction = if lean > 0.0 { "right" } else { "left" };
        issues.push(PostureIssue {
            kind: IssueKind::Leaning,
            message: format!("Leaning {direction} ({lean_abs}°)"),
            severity: if lean_abs > thresholds.max_lean_angle * DANGER_FACTOR {
                Severity::Danger
            } else {
                Severity::Warning
            },
        });
    }

    // One-sided: sitting back never counts
    if slouch > thresholds.max_slouch_angle {
        issues.push(PostureIssue {
            kind: IssueKind::Slouching,
            message: format!("Slouching detected ({slouch}°)"),
            severity: if slouch > thresholds.max_slouch_angle * DANGER_FACTOR {
                Severity::Danger
            } else {
                Severity::Warning
            },
        });
    }

    let mut analysis = PoseAnalysis {
        status: PostureStatus::Good,
        confidence,
        distance: distance.unwrap_or(0.0),
        lean_angle: lean,
        shoulder_angle: slouch,
        issues,
    };
    analysis.status = analysis
        .primary_issue()
        .map_or(PostureStatus::Good, |issue| issue.kind.status());

    debug!(
        "pose: status={} confidence={} distance={} lean={} slouch={} issues={}",
        analysis.status,
        analysis.confidence,
        analysis.distance,
        analysis.lean_angle,
        analysis.shoulder_angle,
        analysis.issues.len()
    );

    analysis
}

/// Mean visibility of nose and shoulders as 0-100
fn key_confidence(landmarks: &LandmarkSet) -> u8 {
    let keys = [NOSE, LEFT_SHOULDER, RIGHT_SHOULDER];
    let sum: f64 = keys
        .iter()
        .map(|&i| {
            landmarks
                .get(i)
                .and_then(|l| l.visibility)
                .filter(|v| !v.is_nan())
                .map_or(0.0, |v| v.clamp(0.0, 1.0) as f64)
        })
        .sum();
    (sum / keys.len() as f64 * 100.0).round() as u8
}

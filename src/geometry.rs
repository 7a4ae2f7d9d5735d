//! Scalar posture features from a landmark frame
//!
//! Every feature uses only the shoulders and the nose. Missing landmarks
//! or degenerate geometry degrade to `None` / `0.0`, never to an error.

use crate::landmark::{LandmarkSet, NOSE};

/// Normalized shoulder width × distance in cm for an average adult at a
/// typical webcam field of view
pub const DISTANCE_CONSTANT: f64 = 24.0;

/// Ratio deviation → pseudo-degrees
pub const SLOUCH_SCALE: f64 = 150.0;

/// Shoulders closer than this horizontally give no usable tilt
const MIN_SHOULDER_SPAN: f64 = 0.01;

/// Round to one decimal place, half away from zero
pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Estimate distance from the camera in whole centimeters.
///
/// Inverse of the horizontal shoulder separation: `DISTANCE_CONSTANT / width`.
/// Returns `None` when a shoulder is missing or the estimate is not finite.
pub fn estimate_distance(landmarks: &LandmarkSet) -> Option<f64> {
    let (left, right) = landmarks.shoulders()?;
    let width = (left.x as f64 - right.x as f64).abs();
    let estimate = (DISTANCE_CONSTANT / width).round();
    estimate.is_finite().then_some(estimate)
}

/// Shoulder-line tilt from horizontal in degrees.
///
/// Positive = leaning right as seen in the mirrored camera view.
pub fn lean_angle(landmarks: &LandmarkSet) -> f64 {
    let Some((left, right)) = landmarks.shoulders() else {
        return 0.0;
    };

    let delta_y = left.y as f64 - right.y as f64;
    let delta_x = (right.x as f64 - left.x as f64).abs();

    if delta_x < MIN_SHOULDER_SPAN {
        return 0.0;
    }

    let angle = delta_y.atan2(delta_x).to_degrees();
    round_tenth(-angle)
}

/// Vertical nose-to-shoulder-midpoint distance (calibration input)
pub fn nose_to_shoulder_ratio(landmarks: &LandmarkSet) -> Option<f64> {
    let nose = landmarks.get(NOSE)?;
    let (left, right) = landmarks.shoulders()?;
    let shoulder_mid_y = (left.y as f64 + right.y as f64) / 2.0;
    Some(shoulder_mid_y - nose.y as f64)
}

/// Forward-head deviation from `baseline` in pseudo-degrees.
///
/// Positive = head dropped toward the shoulders (slouching), negative =
/// sitting straighter than the baseline. Without a baseline the current
/// frame is taken as neutral, so the result is 0.
pub fn slouch_angle(landmarks: &LandmarkSet, baseline: Option<f64>) -> f64 {
    let Some(ratio) = nose_to_shoulder_ratio(landmarks) else {
        return 0.0;
    };
    let baseline = baseline.unwrap_or(ratio);
    round_tenth((baseline - ratio) * SLOUCH_SCALE)
}

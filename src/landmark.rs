//! Body landmarks as produced by the pose-estimation model
//!
//! Indices follow the 33-point MediaPipe Pose layout. Only the nose and
//! the two shoulders are read by the posture pipeline.

use serde::{Deserialize, Serialize};

pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;

/// Fewer entries than this means the model has not produced a body yet
pub const MIN_LANDMARKS: usize = 25;

/// Full MediaPipe Pose landmark count
pub const POSE_LANDMARK_COUNT: usize = 33;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One frame of landmarks, indexed by anatomical position.
///
/// Entries may be explicitly absent (`null` on the wire).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Option<Landmark>>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Option<Landmark>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Landmark at `index`, or `None` when absent, out of range or non-finite
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points
            .get(index)
            .and_then(Option::as_ref)
            .filter(|l| l.is_finite())
    }

    pub fn set(&mut self, index: usize, landmark: Option<Landmark>) {
        if index >= self.points.len() {
            self.points.resize(index + 1, None);
        }
        self.points[index] = landmark;
    }

    /// Both shoulders, left first
    pub fn shoulders(&self) -> Option<(&Landmark, &Landmark)> {
        Some((self.get(LEFT_SHOULDER)?, self.get(RIGHT_SHOULDER)?))
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self {
        Self {
            points: points.into_iter().map(Some).collect(),
        }
    }
}

//! BackTrack - sitting-posture monitoring from body landmarks
//!
//! Landmarks from an external pose model flow through
//! `geometry` → `posture` (classification) → `session` (stats) and
//! `notifications` (alerts). `monitor` wires them into a per-frame loop.

pub mod calibration;
pub mod config;
pub mod geometry;
pub mod landmark;
pub mod monitor;
pub mod notifications;
pub mod posture;
pub mod scheduler;
pub mod session;

pub use calibration::{Calibration, CalibrationSampler};
pub use config::Config;
pub use landmark::{Landmark, LandmarkSet};
pub use monitor::PostureMonitor;
pub use notifications::{
    Notification, NotificationCenter, NotificationType, Notifier, Permission, PlatformNotification,
};
pub use posture::{analyze_pose, IssueKind, PoseAnalysis, PostureIssue, PostureStatus, Severity, Thresholds};
pub use session::{PostureStore, SessionStats};

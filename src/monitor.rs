//! Per-frame tracking loop: classify, accumulate, alert
//!
//! The classifier reports every frame; the monitor only raises an alert
//! once bad posture has persisted for the configured timeout, and then at
//! most once per winning status within a bad-posture episode.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info};

use crate::calibration::CalibrationSampler;
use crate::config::Config;
use crate::geometry::nose_to_shoulder_ratio;
use crate::landmark::{LandmarkSet, MIN_LANDMARKS};
use crate::notifications::{NotificationCenter, Notifier};
use crate::posture::{analyze_pose, PoseAnalysis, PostureStatus};
use crate::session::PostureStore;

pub struct PostureMonitor {
    store: PostureStore,
    notifications: NotificationCenter,
    calibration: Option<CalibrationSampler>,
    violation_timeout: f64,
    alert_duration: Duration,
    /// Statuses already alerted for in the current bad-posture episode
    alerted: HashSet<PostureStatus>,
}

impl PostureMonitor {
    pub fn new(config: &Config, notifier: Option<Box<dyn Notifier>>) -> Self {
        Self {
            store: PostureStore::new(config.thresholds),
            notifications: NotificationCenter::new(notifier),
            calibration: None,
            violation_timeout: config.alerts.violation_timeout_secs,
            alert_duration: config.alerts.duration(),
            alerted: HashSet::new(),
        }
    }

    pub fn store(&self) -> &PostureStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PostureStore {
        &mut self.store
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    /// Begin a fresh session and start accumulating time
    pub fn start(&mut self) {
        self.store.start_session();
        self.store.set_tracking(true);
        self.store.bad_posture_duration = 0.0;
        self.alerted.clear();
    }

    pub fn stop(&mut self) {
        self.store.set_tracking(false);
        info!(
            "session stopped: {:.1}s tracked, score {}",
            self.store.session_stats().total_time,
            self.store.posture_score()
        );
    }

    /// Average the next `frames` usable frames into a new baseline
    pub fn begin_calibration(&mut self, frames: usize) {
        info!("calibrating over {frames} frames, hold still");
        self.calibration = Some(CalibrationSampler::new(frames));
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibration.is_some()
    }

    /// Process one frame captured `delta` after the previous one
    pub fn tick(&mut self, landmarks: Option<&LandmarkSet>, delta: Duration) -> PoseAnalysis {
        let dt = delta.as_secs_f64();
        self.feed_calibration(landmarks);

        let analysis = analyze_pose(
            landmarks,
            &self.store.thresholds,
            self.store.slouch_baseline(),
        );
        self.store.apply(&analysis);

        if self.store.is_tracking {
            self.store
                .update_stats(dt, analysis.status == PostureStatus::Good);
            self.track_violation(&analysis, dt);
        }

        self.notifications.advance(delta);
        analysis
    }

    fn feed_calibration(&mut self, landmarks: Option<&LandmarkSet>) {
        let Some(sampler) = self.calibration.as_mut() else {
            return;
        };
        let ratio = landmarks
            .filter(|set| set.len() >= MIN_LANDMARKS)
            .and_then(nose_to_shoulder_ratio);
        if let Some(mean) = sampler.push(ratio) {
            self.store.calibrate_slouch_baseline(mean);
            self.calibration = None;
        }
    }

    fn track_violation(&mut self, analysis: &PoseAnalysis, dt: f64) {
        match analysis.status {
            PostureStatus::Good => {
                self.store.bad_posture_duration = 0.0;
                self.store.last_good_posture = Utc::now();
                self.alerted.clear();
            }
            // Nobody in frame: hold the episode as is
            PostureStatus::NotDetected => {}
            status => {
                self.store.bad_posture_duration += dt;
                if self.is_calibrating()
                    || self.store.bad_posture_duration < self.violation_timeout
                    || self.alerted.contains(&status)
                {
                    return;
                }
                if let Some(issue) = analysis.primary_issue() {
                    debug!(
                        "alerting after {:.1}s of {status}",
                        self.store.bad_posture_duration
                    );
                    self.notifications.add(
                        issue.message.clone(),
                        issue.severity.into(),
                        Some(self.alert_duration),
                    );
                    self.store.increment_alerts();
                    self.alerted.insert(status);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{Landmark, LEFT_SHOULDER, NOSE, POSE_LANDMARK_COUNT, RIGHT_SHOULDER};

    const FRAME: Duration = Duration::from_millis(500);

    fn frame(shoulder_span: f32, left_y: f32) -> LandmarkSet {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.0).with_visibility(1.0); POSE_LANDMARK_COUNT];
        points[NOSE] = Landmark::new(0.5, 0.3, 0.0).with_visibility(1.0);
        points[LEFT_SHOULDER] =
            Landmark::new(0.5 + shoulder_span / 2.0, left_y, 0.0).with_visibility(1.0);
        points[RIGHT_SHOULDER] =
            Landmark::new(0.5 - shoulder_span / 2.0, 0.6, 0.0).with_visibility(1.0);
        LandmarkSet::from(points)
    }

    fn good() -> LandmarkSet {
        frame(0.4, 0.6)
    }

    fn too_close() -> LandmarkSet {
        frame(0.6, 0.6)
    }

    fn leaning() -> LandmarkSet {
        // 60cm, left shoulder raised ~14 degrees
        frame(0.4, 0.5)
    }

    fn monitor() -> PostureMonitor {
        let mut m = PostureMonitor::new(&Config::default(), None);
        m.start();
        m
    }

    #[test]
    fn test_stats_follow_status() {
        let mut m = monitor();
        m.tick(Some(&good()), FRAME);
        m.tick(Some(&too_close()), FRAME);

        let stats = m.store().session_stats();
        assert_eq!(stats.total_time, 1.0);
        assert_eq!(stats.good_posture_time, 0.5);
        assert_eq!(m.store().posture_score(), 50);
    }

    #[test]
    fn test_no_stats_when_not_tracking() {
        let mut m = PostureMonitor::new(&Config::default(), None);
        let analysis = m.tick(Some(&good()), FRAME);
        assert_eq!(analysis.status, PostureStatus::Good);
        assert_eq!(m.store().status, PostureStatus::Good);
        assert_eq!(m.store().session_stats().total_time, 0.0);
    }

    #[test]
    fn test_alert_after_timeout_once() {
        let mut m = monitor();
        for _ in 0..5 {
            m.tick(Some(&too_close()), FRAME);
        }
        // 2.5s of bad posture, timeout is 3s
        assert!(m.notifications().notifications().is_empty());

        m.tick(Some(&too_close()), FRAME);
        assert_eq!(m.notifications().notifications().len(), 1);
        assert_eq!(m.store().session_stats().alerts, 1);

        for _ in 0..4 {
            m.tick(Some(&too_close()), FRAME);
        }
        assert_eq!(m.store().session_stats().alerts, 1);
    }

    #[test]
    fn test_good_frame_rearms() {
        let mut m = monitor();
        for _ in 0..6 {
            m.tick(Some(&too_close()), FRAME);
        }
        m.tick(Some(&good()), FRAME);
        assert_eq!(m.store().bad_posture_duration, 0.0);

        for _ in 0..6 {
            m.tick(Some(&too_close()), FRAME);
        }
        assert_eq!(m.store().session_stats().alerts, 2);
    }

    #[test]
    fn test_status_change_realerts() {
        let mut m = monitor();
        for _ in 0..6 {
            m.tick(Some(&too_close()), FRAME);
        }
        m.tick(Some(&leaning()), FRAME);
        assert_eq!(m.store().status, PostureStatus::Leaning);
        assert_eq!(m.store().session_stats().alerts, 2);
    }

    #[test]
    fn test_flapping_status_alerts_once_each() {
        let mut m = monitor();
        for _ in 0..6 {
            m.tick(Some(&too_close()), FRAME);
        }
        for _ in 0..3 {
            m.tick(Some(&leaning()), FRAME);
            m.tick(Some(&too_close()), FRAME);
        }
        assert_eq!(m.store().session_stats().alerts, 2);
        assert_eq!(m.notifications().notifications().len(), 2);
    }

    #[test]
    fn test_start_stop_toggle_tracking() {
        let mut m = monitor();
        assert!(m.store().is_tracking);
        m.stop();
        assert!(!m.store().is_tracking);

        m.tick(Some(&good()), FRAME);
        assert_eq!(m.store().session_stats().total_time, 0.0);
    }

    #[test]
    fn test_not_detected_holds_episode() {
        let mut m = monitor();
        for _ in 0..4 {
            m.tick(Some(&too_close()), FRAME);
        }
        m.tick(None, FRAME);
        assert_eq!(m.store().status, PostureStatus::NotDetected);
        assert_eq!(m.store().bad_posture_duration, 2.0);

        m.tick(Some(&too_close()), FRAME);
        m.tick(Some(&too_close()), FRAME);
        assert_eq!(m.store().session_stats().alerts, 1);
    }

    #[test]
    fn test_alert_expires_with_frames() {
        let mut m = monitor();
        for _ in 0..6 {
            m.tick(Some(&too_close()), FRAME);
        }
        assert_eq!(m.notifications().notifications().len(), 1);

        // 5s dismissal + 300ms exit grace
        for _ in 0..11 {
            m.tick(Some(&good()), FRAME);
        }
        assert!(m.notifications().notifications().is_empty());
    }

    #[test]
    fn test_calibration_window() {
        let mut m = monitor();
        m.begin_calibration(3);
        m.tick(Some(&good()), FRAME);
        m.tick(None, FRAME);
        m.tick(Some(&good()), FRAME);
        assert!(m.is_calibrating());

        m.tick(Some(&good()), FRAME);
        assert!(!m.is_calibrating());
        let baseline = m.store().slouch_baseline().unwrap();
        assert!((baseline - 0.3).abs() < 1e-6);
    }
}

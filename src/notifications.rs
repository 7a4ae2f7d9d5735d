//! In-app notifications with timed dismissal and an optional platform sink
//!
//! Removal is two-phase: an entry is first flagged `exiting` so the
//! presentation layer can animate it out, and only dropped from the list
//! after [`EXIT_GRACE`]. All timers run on a virtual [`Scheduler`] clock
//! driven by [`NotificationCenter::advance`].

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::posture::Severity;
use crate::scheduler::Scheduler;

pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);
pub const EXIT_GRACE: Duration = Duration::from_millis(300);

pub const APP_TITLE: &str = "BackTrack";
pub const APP_ICON: &str = "/favicon.svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Warning,
    Danger,
    Success,
    Info,
}

impl NotificationType {
    pub fn glyph(&self) -> &'static str {
        match self {
            NotificationType::Danger => "🚨",
            NotificationType::Warning => "⚠️",
            NotificationType::Success => "✅",
            NotificationType::Info => "ℹ️",
        }
    }

    /// Only posture problems reach the platform
    pub fn is_alert(&self) -> bool {
        matches!(self, NotificationType::Warning | NotificationType::Danger)
    }
}

impl From<Severity> for NotificationType {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => NotificationType::Warning,
            Severity::Danger => NotificationType::Danger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Granted,
    Denied,
    #[default]
    Default,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Permission::Granted => "granted",
            Permission::Denied => "denied",
            Permission::Default => "default",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub timestamp: DateTime<Utc>,
    pub exiting: bool,
}

/// Payload handed to the platform notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    /// Unique per alert so an undismissed one never suppresses the next
    pub tag: String,
}

/// Platform notification capability
pub trait Notifier {
    /// Current permission, without prompting
    fn permission(&self) -> Permission;

    /// Prompt the user; returns the resulting permission
    fn request_permission(&mut self) -> Permission;

    fn show(&mut self, notification: PlatformNotification);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Dismiss(u64),
    Purge(u64),
}

pub struct NotificationCenter {
    notifications: Vec<Notification>,
    next_id: u64,
    permission: Permission,
    notifier: Option<Box<dyn Notifier>>,
    timers: Scheduler<Timer>,
}

impl NotificationCenter {
    /// `notifier` is `None` where the platform has no notification support
    pub fn new(notifier: Option<Box<dyn Notifier>>) -> Self {
        let permission = notifier
            .as_ref()
            .map_or(Permission::Default, |n| n.permission());
        Self {
            notifications: Vec::new(),
            next_id: 0,
            permission,
            notifier,
            timers: Scheduler::new(),
        }
    }

    /// Active notifications in display order
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Re-read the permission in case it changed outside the app
    pub fn refresh_permission(&mut self) -> Permission {
        if let Some(notifier) = &self.notifier {
            self.permission = notifier.permission();
        }
        self.permission
    }

    pub fn request_permission(&mut self) -> Permission {
        let Some(notifier) = self.notifier.as_mut() else {
            return Permission::Denied;
        };
        self.permission = notifier.request_permission();
        if self.permission != Permission::Granted {
            warn!("platform notifications {}, alerts stay in-app", self.permission);
        }
        self.permission
    }

    /// Show `message` and return its id.
    ///
    /// `None` dismisses after [`DEFAULT_DURATION`]; a zero duration keeps
    /// the entry until it is removed.
    pub fn add(
        &mut self,
        message: impl Into<String>,
        kind: NotificationType,
        duration: Option<Duration>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        let notification = Notification {
            id,
            message: message.into(),
            kind,
            timestamp: Utc::now(),
            exiting: false,
        };
        info!("notification #{id} ({kind:?}): {}", notification.message);

        let duration = duration.unwrap_or(DEFAULT_DURATION);
        if !duration.is_zero() {
            self.timers.schedule(duration, Timer::Dismiss(id));
        }

        if kind.is_alert() && self.permission == Permission::Granted {
            self.send_platform(&notification);
        }

        self.notifications.push(notification);
        id
    }

    /// Flag `id` as exiting; it is dropped after [`EXIT_GRACE`].
    ///
    /// Unknown ids are ignored.
    pub fn remove(&mut self, id: u64) {
        let Some(n) = self.notifications.iter_mut().find(|n| n.id == id) else {
            return;
        };
        n.exiting = true;
        self.timers.schedule(EXIT_GRACE, Timer::Purge(id));
    }

    /// Drop everything now, skipping the exit phase
    pub fn clear(&mut self) {
        self.notifications.clear();
    }

    /// Move the virtual clock and run any timers that came due
    pub fn advance(&mut self, by: Duration) {
        let deadline = self.timers.now() + by;
        while let Some(timer) = self.timers.pop_due(deadline) {
            debug!("notification timer fired: {timer:?}");
            match timer {
                Timer::Dismiss(id) => self.remove(id),
                Timer::Purge(id) => self.notifications.retain(|n| n.id != id),
            }
        }
        self.timers.set_now(deadline);
    }

    fn send_platform(&mut self, notification: &Notification) {
        let Some(notifier) = self.notifier.as_mut() else {
            return;
        };
        notifier.show(PlatformNotification {
            title: APP_TITLE.to_string(),
            body: format!("{} {}", notification.kind.glyph(), notification.message),
            icon: APP_ICON.to_string(),
            tag: format!(
                "posture-alert-{}-{}",
                notification.timestamp.timestamp_millis(),
                notification.id
            ),
        });
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(None)
    }
}

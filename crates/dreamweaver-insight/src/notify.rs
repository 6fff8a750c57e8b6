//! Notification delivery boundary.

use async_trait::async_trait;
use tracing::info;

use dreamweaver_core::config::{NotificationTemplate, NotificationsConfig};

/// Longest insight text shown in a notification body.
const INSIGHT_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Morning,
    Evening,
    Insight,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Morning => "morning",
            NotificationKind::Evening => "evening",
            NotificationKind::Insight => "insight",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

impl Notification {
    /// Morning or evening reminder from its configured template.
    pub fn reminder(kind: NotificationKind, config: &NotificationsConfig) -> Self {
        let template = match kind {
            NotificationKind::Morning => &config.morning,
            NotificationKind::Evening => &config.evening,
            NotificationKind::Insight => &config.insight,
        };
        Self::from_template(kind, template)
    }

    /// Announce a new insight, previewing its first 100 characters.
    pub fn insight(template: &NotificationTemplate, recommendation: &str) -> Self {
        let mut body: String = recommendation.chars().take(INSIGHT_PREVIEW_CHARS).collect();
        if recommendation.chars().count() > INSIGHT_PREVIEW_CHARS {
            body.push_str("...");
        }
        Self {
            kind: NotificationKind::Insight,
            title: template.title.clone(),
            body,
        }
    }

    fn from_template(kind: NotificationKind, template: &NotificationTemplate) -> Self {
        Self {
            kind,
            title: template.title.clone(),
            body: template.body.clone(),
        }
    }
}

/// Something that can put a notification in front of the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification);
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) {
        info!(
            kind = notification.kind.as_str(),
            title = %notification.title,
            body = %notification.body,
            "Notification shown"
        );
    }
}

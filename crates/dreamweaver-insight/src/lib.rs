//! DreamWeaver insight crate - scoring, coaching and notifications.
//!
//! Provides:
//! - Heuristic sleep quality scoring and duration formatting
//! - The coaching recommendation boundary with a static fallback
//! - The notification boundary with a logging notifier
//! - The end-of-night flow tying them to the active backend

pub mod coach;
pub mod generator;
pub mod notify;
pub mod scoring;

pub use coach::{CompletedNight, SessionOutcome, SleepCoach};
pub use generator::{
    InsightGenerator, InsightRequest, StaticInsightGenerator, FALLBACK_RECOMMENDATION,
};
pub use notify::{LogNotifier, Notification, NotificationKind, Notifier};
pub use scoring::{calculate_sleep_quality, format_duration, QualityBand};

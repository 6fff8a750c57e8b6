//! Heuristic sleep quality scoring.

use dreamweaver_core::config::QualityThresholds;

/// Activities that lower the score by 10 points each.
pub const NEGATIVE_ACTIVITIES: [&str; 3] = ["caffeine", "screen_time", "stress"];
/// Activities that raise the score by 10 points each.
pub const POSITIVE_ACTIVITIES: [&str; 3] = ["exercise", "meditation", "reading"];

/// Estimate sleep quality (0 to 100) from duration and pre-sleep activities.
///
/// Starts at 50. Seven to nine hours adds 30, six to seven or nine to ten
/// hours adds 20, anything else adds 10. Each listed activity then moves the
/// score by 10 points.
pub fn calculate_sleep_quality<S: AsRef<str>>(duration_minutes: i64, activities: &[S]) -> u8 {
    let mut score: i64 = 50;

    score += match duration_minutes {
        420..=540 => 30,
        360..=419 | 541..=600 => 20,
        _ => 10,
    };

    for activity in activities {
        let activity = activity.as_ref();
        if NEGATIVE_ACTIVITIES.contains(&activity) {
            score -= 10;
        } else if POSITIVE_ACTIVITIES.contains(&activity) {
            score += 10;
        }
    }

    score.clamp(0, 100) as u8
}

/// Render minutes as `"{h}h {m}m"`.
pub fn format_duration(minutes: i64) -> String {
    format!("{}h {}m", minutes.div_euclid(60), minutes.rem_euclid(60))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QualityBand {
    VeryPoor,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityBand {
    pub fn classify(score: u8, thresholds: &QualityThresholds) -> Self {
        if score >= thresholds.excellent {
            QualityBand::Excellent
        } else if score >= thresholds.good {
            QualityBand::Good
        } else if score >= thresholds.fair {
            QualityBand::Fair
        } else if score >= thresholds.poor {
            QualityBand::Poor
        } else {
            QualityBand::VeryPoor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityBand::Excellent => "excellent",
            QualityBand::Good => "good",
            QualityBand::Fair => "fair",
            QualityBand::Poor => "poor",
            QualityBand::VeryPoor => "very poor",
        }
    }
}

impl std::fmt::Display for QualityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

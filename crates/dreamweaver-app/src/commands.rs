//! Subcommand handlers.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use dreamweaver_core::config::DreamweaverConfig;
use dreamweaver_core::error::{DreamweaverError, Result};
use dreamweaver_core::types::{
    NotificationPreferences, PreferencesPatch, SleepGoals, Theme, User, UserPreferences,
};
use dreamweaver_database::{DataManager, DataSync, DatabaseContext};
use dreamweaver_insight::{format_duration, CompletedNight, NotificationKind, QualityBand, SleepCoach};
use dreamweaver_storage::{snapshot, Repositories};

use crate::cli::{Command, LogSleepArgs, PrefsAction, PrefsSetArgs, RangeArgs, ReminderKind, ThemeArg};

/// Everything a command needs, built once by `main`.
pub struct App {
    pub config: DreamweaverConfig,
    pub data_dir: PathBuf,
    pub repos: Repositories,
    pub context: DatabaseContext,
}

impl App {
    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Export { out, stdout } => self.export(out, stdout),
            Command::Import { file } => self.import(&file),
            Command::Stats(range) => self.stats(&range).await,
            Command::Sessions(range) => self.sessions(&range).await,
            Command::Insights { limit } => {
                self.insights(limit);
                Ok(())
            }
            Command::LogSleep(args) => self.log_sleep(args).await,
            Command::Journal {
                feelings,
                activities,
            } => self.journal(&feelings, &activities).await,
            Command::Prefs { action } => self.prefs(action),
            Command::Sync => self.sync().await,
            Command::Remind { kind } => {
                self.remind(kind).await;
                Ok(())
            }
            Command::Clear { yes } => {
                self.clear(yes);
                Ok(())
            }
        }
    }

    fn manager(&self) -> DataManager {
        DataManager::from_context(&self.context)
    }

    fn coach(&self) -> SleepCoach {
        SleepCoach::new(
            self.context.database(),
            self.repos.preferences.clone(),
            &self.config,
        )
    }

    fn export(&self, out: Option<PathBuf>, stdout: bool) -> Result<()> {
        let document = snapshot::export_all(&self.repos);
        if stdout {
            println!("{}", document.to_json_pretty()?);
            return Ok(());
        }
        let dir = out.unwrap_or_else(|| self.data_dir.join("backups"));
        let path = document.write_backup(&dir)?;
        println!("Backup written to {}", path.display());
        Ok(())
    }

    fn import(&self, file: &Path) -> Result<()> {
        let json = std::fs::read_to_string(file)?;
        if snapshot::import_all(&self.repos, &json) {
            println!("Imported {}", file.display());
            Ok(())
        } else {
            Err(DreamweaverError::Import(format!(
                "{} is not a valid DreamWeaver backup",
                file.display()
            )))
        }
    }

    async fn stats(&self, range: &RangeArgs) -> Result<()> {
        let (start, end) = range.resolve(Utc::now())?;
        let stats = self.manager().sleep_stats(start, end).await?;
        println!("{}", serde_json::to_string_pretty(&stats)?);
        Ok(())
    }

    async fn sessions(&self, range: &RangeArgs) -> Result<()> {
        let (start, end) = range.resolve(Utc::now())?;
        let thresholds = &self.config.sleep.quality_thresholds;
        let sessions = self.manager().sleep_sessions().await?;
        let in_range: Vec<_> = sessions
            .iter()
            .filter(|s| s.start_time >= start && s.start_time <= end)
            .collect();

        if in_range.is_empty() {
            println!("No sleep sessions between {} and {}", start.date_naive(), end.date_naive());
            return Ok(());
        }
        for session in in_range {
            println!(
                "{}  {}  {:>3} ({})  {}",
                session.start_time.format("%Y-%m-%d %H:%M"),
                format_duration(session.duration_minutes()),
                session.quality_score,
                QualityBand::classify(session.quality_score, thresholds),
                session.notes.as_deref().unwrap_or(""),
            );
        }
        Ok(())
    }

    fn insights(&self, limit: Option<usize>) {
        let insights = self.repos.insights.get_recent(limit);
        if insights.is_empty() {
            println!("No coaching insights yet");
        }
        for insight in insights {
            println!(
                "{}  {}",
                insight.generated_at.format("%Y-%m-%d %H:%M"),
                insight.recommendation
            );
        }
    }

    /// The stored user, created on first use.
    async fn current_user(&self, name: &str) -> Result<User> {
        let manager = self.manager();
        if let Some(user) = manager.current_user().await? {
            return Ok(user);
        }
        let user = User::new(name);
        manager.save_user(&user).await?;
        info!(user_id = %user.user_id, "Created user");
        Ok(user)
    }

    async fn log_sleep(&self, args: LogSleepArgs) -> Result<()> {
        let end_time = args.end.unwrap_or_else(Utc::now);
        if end_time < args.start {
            return Err(DreamweaverError::InvalidInput(
                "wake time is before bedtime".to_string(),
            ));
        }

        let user = self.current_user(&args.name).await?;
        let night = CompletedNight {
            user_id: user.user_id,
            start_time: args.start,
            end_time,
            pre_notes: String::new(),
            post_notes: args.feelings,
            activities: args.activities,
        };

        let outcome = self.coach().complete_session(night).await?;
        println!(
            "Slept {} - quality {} ({})",
            format_duration(outcome.session.duration_minutes()),
            outcome.session.quality_score,
            outcome.band
        );
        if let Some(insight) = outcome.insight {
            println!("Insight: {}", insight.recommendation);
        }
        Ok(())
    }

    async fn journal(&self, feelings: &str, activities: &[String]) -> Result<()> {
        let user = self.current_user("Sleeper").await?;
        let entry = self
            .coach()
            .log_pre_sleep(&user.user_id, feelings, activities)
            .await?;
        println!("Journal entry {} saved", entry.entry_id);
        Ok(())
    }

    fn prefs(&self, action: Option<PrefsAction>) -> Result<()> {
        match action.unwrap_or(PrefsAction::Show) {
            PrefsAction::Show => {}
            PrefsAction::Set(args) => {
                let patch = preferences_patch(&self.repos.preferences.get(), &args);
                self.repos.preferences.update(patch);
            }
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&self.repos.preferences.get())?
        );
        Ok(())
    }

    async fn sync(&self) -> Result<()> {
        let manager = self.manager();
        manager.sync_data().await?;

        let sync = DataSync::new(self.context.database(), self.repos.settings.clone());
        if self.config.features.cloud_sync {
            let pushed = sync.sync_to_cloud().await;
            let pulled = sync.sync_from_cloud().await;
            println!("Upload: {}, download: {}", outcome(pushed), outcome(pulled));
        } else {
            warn!("Cloud sync is disabled in configuration");
        }

        match sync.last_sync_date() {
            Some(at) => println!("Last synced {}", at.to_rfc3339()),
            None => println!("Never synced"),
        }
        Ok(())
    }

    async fn remind(&self, kind: ReminderKind) {
        let kind = match kind {
            ReminderKind::Morning => NotificationKind::Morning,
            ReminderKind::Evening => NotificationKind::Evening,
        };
        if !self.coach().remind(kind).await {
            println!("The {} reminder is turned off", kind.as_str());
        }
    }

    fn clear(&self, yes: bool) {
        if !yes {
            println!("This deletes every session, entry and insight. Re-run with --yes to confirm.");
            return;
        }
        snapshot::clear_all(&self.repos);
        println!("All data cleared");
    }
}

fn outcome(done: bool) -> &'static str {
    if done {
        "done"
    } else {
        "skipped"
    }
}

/// Build a preferences patch from CLI flags; sections with no flag set are
/// left out so they stay untouched.
fn preferences_patch(
    current: &UserPreferences,
    args: &PrefsSetArgs,
) -> PreferencesPatch {
    let theme = args.theme.map(|t| match t {
        ThemeArg::Dark => Theme::Dark,
        ThemeArg::Light => Theme::Light,
        ThemeArg::Auto => Theme::Auto,
    });

    let sleep_goals = (args.target_duration.is_some() || args.target_quality.is_some()).then(|| {
        SleepGoals {
            target_duration: args
                .target_duration
                .unwrap_or(current.sleep_goals.target_duration),
            target_quality: args
                .target_quality
                .unwrap_or(current.sleep_goals.target_quality),
        }
    });

    let notifications = (args.morning_reminder.is_some()
        || args.evening_reminder.is_some()
        || args.insight_notifications.is_some())
    .then(|| NotificationPreferences {
        morning_reminder: args
            .morning_reminder
            .unwrap_or(current.notifications.morning_reminder),
        evening_reminder: args
            .evening_reminder
            .unwrap_or(current.notifications.evening_reminder),
        insight_notifications: args
            .insight_notifications
            .unwrap_or(current.notifications.insight_notifications),
    });

    PreferencesPatch {
        notifications,
        sleep_goals,
        privacy: None,
        theme,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dreamweaver_storage::KvStore;

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let repos = Repositories::unbounded(KvStore::in_memory());
        let app = App {
            config: DreamweaverConfig::default(),
            data_dir: dir.path().to_path_buf(),
            context: DatabaseContext::new(repos.clone()),
            repos,
        };
        (app, dir)
    }

    #[test]
    fn test_preferences_patch_only_touches_set_sections() {
        let current = UserPreferences::default();
        let patch = preferences_patch(
            &current,
            &PrefsSetArgs {
                target_quality: Some(90),
                ..Default::default()
            },
        );
        assert!(patch.notifications.is_none());
        assert!(patch.theme.is_none());
        let goals = patch.sleep_goals.unwrap();
        assert_eq!(goals.target_quality, 90);
        assert_eq!(goals.target_duration, 480);
    }

    #[tokio::test]
    async fn test_log_sleep_then_export_and_import() {
        let (app, dir) = app();
        let start = Utc::now() - Duration::hours(8);
        app.run(Command::LogSleep(LogSleepArgs {
            start,
            end: Some(start + Duration::hours(8)),
            feelings: "good".to_string(),
            activities: vec!["reading".to_string()],
            name: "Ada".to_string(),
        }))
        .await
        .unwrap();

        assert_eq!(app.repos.sessions.get_all().len(), 1);
        assert_eq!(app.repos.users.get().unwrap().display_name, "Ada");
        assert_eq!(app.repos.insights.get_all().len(), 1);

        let backups = dir.path().join("backups");
        app.run(Command::Export {
            out: Some(backups.clone()),
            stdout: false,
        })
        .await
        .unwrap();
        let file = std::fs::read_dir(&backups)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();

        app.run(Command::Clear { yes: true }).await.unwrap();
        assert!(app.repos.sessions.get_all().is_empty());

        app.run(Command::Import { file }).await.unwrap();
        assert_eq!(app.repos.sessions.get_all().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_without_confirmation_keeps_data() {
        let (app, _dir) = app();
        app.run(Command::Journal {
            feelings: "sleepy".to_string(),
            activities: vec![],
        })
        .await
        .unwrap();
        app.run(Command::Clear { yes: false }).await.unwrap();
        assert_eq!(app.repos.entries.get_all().len(), 1);
    }

    #[tokio::test]
    async fn test_import_rejects_garbage() {
        let (app, dir) = app();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let err = app.run(Command::Import { file: path }).await.unwrap_err();
        assert!(matches!(err, DreamweaverError::Import(_)));
    }

    #[tokio::test]
    async fn test_log_sleep_rejects_reversed_times() {
        let (app, _dir) = app();
        let start = Utc::now();
        let result = app
            .run(Command::LogSleep(LogSleepArgs {
                start,
                end: Some(start - Duration::hours(1)),
                feelings: String::new(),
                activities: vec![],
                name: "Ada".to_string(),
            }))
            .await;
        assert!(matches!(result, Err(DreamweaverError::InvalidInput(_))));
        assert!(app.repos.sessions.get_all().is_empty());
        assert!(app.repos.users.get().is_none());
    }

    #[tokio::test]
    async fn test_range_commands_reject_huge_days() {
        let (app, _dir) = app();
        let range = RangeArgs {
            from: None,
            to: None,
            days: 100_000_000,
        };
        let stats = app.run(Command::Stats(range.clone())).await;
        assert!(matches!(stats, Err(DreamweaverError::InvalidInput(_))));
        let sessions = app.run(Command::Sessions(range)).await;
        assert!(matches!(sessions, Err(DreamweaverError::InvalidInput(_))));
    }
}

//! CLI argument definitions for the DreamWeaver application.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use dreamweaver_core::error::{DreamweaverError, Result};

/// DreamWeaver - a local-first sleep journal and coach.
#[derive(Parser, Debug)]
#[command(name = "dreamweaver", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding the SQLite store and backups.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Database provider (local, supabase, firebase, custom).
    #[arg(long = "provider", global = true)]
    pub provider: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a JSON backup of all data.
    Export {
        /// Directory for the backup file. Defaults to `<data-dir>/backups`.
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print the document instead of writing a file.
        #[arg(long)]
        stdout: bool,
    },
    /// Restore data from a JSON backup.
    Import {
        file: PathBuf,
    },
    /// Sleep statistics over a date range.
    Stats(RangeArgs),
    /// List sleep sessions.
    Sessions(RangeArgs),
    /// List the most recent coaching insights.
    Insights {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Record a finished night of sleep.
    LogSleep(LogSleepArgs),
    /// Record a pre-sleep journal entry.
    Journal {
        /// How you feel before bed.
        #[arg(short, long, default_value = "")]
        feelings: String,
        /// Activity done before bed (repeatable).
        #[arg(short, long = "activity")]
        activities: Vec<String>,
    },
    /// Show or change preferences.
    Prefs {
        #[command(subcommand)]
        action: Option<PrefsAction>,
    },
    /// Sync with the configured backend.
    Sync,
    /// Send the morning or evening reminder.
    Remind {
        #[arg(value_enum)]
        kind: ReminderKind,
    },
    /// Delete all stored data.
    Clear {
        /// Confirm deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    /// First day (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Number of days back from today, used when --from is absent.
    #[arg(long, default_value_t = 7)]
    pub days: i64,
}

impl RangeArgs {
    /// Resolve to `[start, end]` instants covering whole days.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let to = self.to.unwrap_or_else(|| now.date_naive());
        let from = match self.from {
            Some(from) => Some(from),
            None => u64::try_from(self.days.max(1) - 1)
                .ok()
                .and_then(|back| to.checked_sub_days(Days::new(back))),
        };
        let from = from.ok_or_else(out_of_bounds)?;
        let next = to.checked_add_days(Days::new(1)).ok_or_else(out_of_bounds)?;

        let start = from.and_time(NaiveTime::MIN).and_utc();
        let end = next.and_time(NaiveTime::MIN).and_utc() - TimeDelta::milliseconds(1);
        Ok((start, end))
    }
}

fn out_of_bounds() -> DreamweaverError {
    DreamweaverError::InvalidInput("date range out of bounds".to_string())
}

#[derive(Args, Debug, Clone)]
pub struct LogSleepArgs {
    /// Bedtime (RFC 3339).
    #[arg(long)]
    pub start: DateTime<Utc>,
    /// Wake time (RFC 3339). Defaults to now.
    #[arg(long)]
    pub end: Option<DateTime<Utc>>,
    /// How you feel after waking.
    #[arg(short, long, default_value = "")]
    pub feelings: String,
    /// Activity done before bed (repeatable).
    #[arg(short, long = "activity")]
    pub activities: Vec<String>,
    /// Display name used when no user exists yet.
    #[arg(long, default_value = "Sleeper")]
    pub name: String,
}

#[derive(Subcommand, Debug)]
pub enum PrefsAction {
    /// Print current preferences as JSON.
    Show,
    /// Change individual preferences.
    Set(PrefsSetArgs),
}

#[derive(Args, Debug, Default)]
pub struct PrefsSetArgs {
    #[arg(long, value_enum)]
    pub theme: Option<ThemeArg>,
    /// Target sleep duration in minutes.
    #[arg(long)]
    pub target_duration: Option<u32>,
    /// Target quality score.
    #[arg(long)]
    pub target_quality: Option<u8>,
    #[arg(long)]
    pub morning_reminder: Option<bool>,
    #[arg(long)]
    pub evening_reminder: Option<bool>,
    #[arg(long)]
    pub insight_notifications: Option<bool>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeArg {
    Dark,
    Light,
    Auto,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Morning,
    Evening,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > DREAMWEAVER_CONFIG env var > ~/.dreamweaver/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("DREAMWEAVER_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the data directory.
    ///
    /// Priority: --data-dir flag > config file value.
    pub fn resolve_data_dir(&self, config_dir: &str) -> PathBuf {
        match &self.data_dir {
            Some(p) => p.clone(),
            None => expand_home(config_dir),
        }
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let home = std::env::var("USERPROFILE");
    #[cfg(not(target_os = "windows"))]
    let home = std::env::var("HOME");
    home.ok().map(PathBuf::from)
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        home_dir().unwrap_or_else(|| PathBuf::from(".")).join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(".dreamweaver").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_log_sleep() {
        let cli = parse(&[
            "dreamweaver",
            "log-sleep",
            "--start",
            "2024-03-01T23:00:00Z",
            "--end",
            "2024-03-02T07:00:00Z",
            "-a",
            "reading",
            "-a",
            "caffeine",
        ]);
        match cli.command {
            Command::LogSleep(args) => {
                assert_eq!(args.start, Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 0).unwrap());
                assert_eq!(args.activities, ["reading", "caffeine"]);
                assert_eq!(args.name, "Sleeper");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["dreamweaver", "sync", "--provider", "supabase", "-l", "debug"]);
        assert_eq!(cli.provider.as_deref(), Some("supabase"));
        assert_eq!(cli.resolve_log_level("info"), "debug");
    }

    #[test]
    fn test_clear_requires_nothing_but_flag() {
        let cli = parse(&["dreamweaver", "clear"]);
        assert!(matches!(cli.command, Command::Clear { yes: false }));
    }

    #[test]
    fn test_range_defaults_to_last_week() {
        let range = RangeArgs {
            from: None,
            to: None,
            days: 7,
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let (start, end) = range.resolve(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap());
        assert_eq!(end.date_naive(), now.date_naive());
    }

    #[test]
    fn test_range_explicit_days() {
        let cli = parse(&["dreamweaver", "stats", "--from", "2024-01-01", "--to", "2024-01-31"]);
        let Command::Stats(range) = cli.command else {
            panic!("expected stats");
        };
        let (start, end) = range.resolve(Utc::now()).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(end > Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_range_days_out_of_bounds() {
        let cli = parse(&["dreamweaver", "stats", "--days", "100000000"]);
        let Command::Stats(range) = cli.command else {
            panic!("expected stats");
        };
        let err = range.resolve(Utc::now()).unwrap_err();
        assert!(matches!(err, DreamweaverError::InvalidInput(_)));

        let range = RangeArgs {
            from: None,
            to: None,
            days: i64::MAX,
        };
        assert!(range.resolve(Utc::now()).is_err());
    }

    #[test]
    fn test_range_to_at_max_date() {
        let range = RangeArgs {
            from: Some(NaiveDate::MAX),
            to: Some(NaiveDate::MAX),
            days: 1,
        };
        assert!(range.resolve(Utc::now()).is_err());
    }

    #[test]
    fn test_range_non_positive_days_is_single_day() {
        let range = RangeArgs {
            from: None,
            to: None,
            days: -5,
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let (start, end) = range.resolve(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
        assert_eq!(end.date_naive(), now.date_naive());
    }

    #[test]
    fn test_data_dir_flag_overrides_config() {
        let cli = parse(&["dreamweaver", "-d", "/tmp/dw", "sync"]);
        assert_eq!(cli.resolve_data_dir("~/.dreamweaver/data"), PathBuf::from("/tmp/dw"));
    }

    #[test]
    fn test_expand_home_passthrough() {
        assert_eq!(expand_home("/var/lib/dw"), PathBuf::from("/var/lib/dw"));
        assert!(!expand_home("~/data").to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_config_flag_wins() {
        let cli = parse(&["dreamweaver", "--config", "/etc/dw.toml", "sync"]);
        assert_eq!(cli.resolve_config_path(), PathBuf::from("/etc/dw.toml"));
    }
}

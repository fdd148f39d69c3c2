use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::model::DurationConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Snapshot file the CLI loads.
    pub data_path: PathBuf,
    /// Business time zone for "today" and "tomorrow".
    pub tz: Tz,
    /// Durations used when the snapshot carries no settings.
    pub durations: DurationConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    UnknownTimeZone(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownTimeZone(tz) => write!(f, "unknown time zone: {tz}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable numbers fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = DurationConfig::default();
        let parsed = |key: &str, default: u32| -> u32 {
            lookup(key).and_then(|s| s.parse().ok()).unwrap_or(default)
        };

        let tz_name = lookup("CREWCAL_TZ").unwrap_or_else(|| "America/New_York".into());
        let tz = Tz::from_str(&tz_name).map_err(|_| ConfigError::UnknownTimeZone(tz_name.clone()))?;

        Ok(Self {
            data_path: lookup("CREWCAL_DATA")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./crewcal.json")),
            tz,
            durations: DurationConfig {
                minutes_per_unit: parsed("CREWCAL_MINUTES_PER_UNIT", defaults.minutes_per_unit),
                minutes_per_common_space: parsed(
                    "CREWCAL_MINUTES_PER_COMMON_SPACE",
                    defaults.minutes_per_common_space,
                ),
                swab_minutes: parsed("CREWCAL_SWAB_MINUTES", defaults.swab_minutes),
                asbestos_minutes: parsed("CREWCAL_ASBESTOS_MINUTES", defaults.asbestos_minutes),
            },
        })
    }
}

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use coach_core::{validate_threshold, CoachSettings, DEFAULT_NEAR_LIMIT_THRESHOLD};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub coach: CoachSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachSection {
    /// Share of a budget at which it is flagged as near its limit
    pub near_limit_threshold: Decimal,
    /// Months shown by `coach trajectory` when `--months` is not given
    pub trajectory_months: i32,
    /// IANA zone used to decide what "today" and "this month" are
    pub timezone: String,
}

impl Default for CoachSection {
    fn default() -> Self {
        Self {
            near_limit_threshold: DEFAULT_NEAR_LIMIT_THRESHOLD,
            trajectory_months: 6,
            timezone: "UTC".to_string(),
        }
    }
}

impl CoachSection {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|e| {
            anyhow::anyhow!("invalid timezone '{}' in config.toml: {e}", self.timezone)
        })
    }

    pub fn today(&self) -> Result<NaiveDate> {
        Ok(Utc::now().with_timezone(&self.tz()?).date_naive())
    }

    /// Coach settings, with an optional per-command threshold override.
    pub fn settings(&self, threshold: Option<Decimal>) -> Result<CoachSettings> {
        let near_limit_threshold = threshold.unwrap_or(self.near_limit_threshold);
        validate_threshold(near_limit_threshold)?;
        Ok(CoachSettings { near_limit_threshold })
    }
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join("config.toml")
}

pub fn load_config(home: &Path) -> Result<Config> {
    let p = config_path(home);
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(home: &Path, cfg: &Config) -> Result<()> {
    let p = config_path(home);
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// Write the default config unless one exists. Returns whether a file was written.
pub fn init_config(home: &Path) -> Result<bool> {
    if config_path(home).exists() {
        return Ok(false);
    }
    save_config(home, &Config::default())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg.coach.near_limit_threshold, dec!(0.8));
        assert_eq!(cfg.coach.trajectory_months, 6);
        assert_eq!(cfg.coach.tz().unwrap(), chrono_tz::UTC);
    }

    #[test]
    fn test_init_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        assert!(init_config(dir.path()).unwrap());
        assert!(!init_config(dir.path()).unwrap());

        let written = fs::read_to_string(config_path(dir.path())).unwrap();
        assert!(written.contains("[coach]"));
        assert!(written.contains(r#"near_limit_threshold = "0.8""#));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            config_path(dir.path()),
            "[coach]\ntimezone = \"Australia/Sydney\"\n",
        )
        .unwrap();
        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg.coach.tz().unwrap(), chrono_tz::Australia::Sydney);
        assert_eq!(cfg.coach.trajectory_months, 6);
    }

    #[test]
    fn test_settings_override_and_validation() {
        let section = CoachSection::default();
        assert_eq!(section.settings(None).unwrap().near_limit_threshold, dec!(0.8));
        assert_eq!(section.settings(Some(dec!(0.9))).unwrap().near_limit_threshold, dec!(0.9));
        assert!(section.settings(Some(dec!(1.5))).is_err());
    }

    #[test]
    fn test_bad_timezone() {
        let section = CoachSection {
            timezone: "Mars/Olympus".to_string(),
            ..CoachSection::default()
        };
        assert!(section.tz().is_err());
    }
}

use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    core::{
        errors::{CoreError, Result},
        services::projection_model::{DEFAULT_RATE, DEFAULT_YEARS},
        utils::{ensure_dir, PathResolver},
    },
    currency::{CurrencyCode, LocaleConfig},
    domain::WaitOption,
};

const TMP_SUFFIX: &str = "tmp";
const DEFAULT_POLL_SECS: u64 = 15;
const MAX_PROJECTION_YEARS: u32 = 100;

/// Keys accepted by `config set`.
pub const CONFIG_KEYS: [&str; 6] = [
    "locale",
    "currency",
    "reminder_poll_secs",
    "default_wait",
    "projection_years",
    "projection_rate",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// Minimum seconds between two reminder sweeps in the shell.
    pub reminder_poll_secs: u64,
    pub default_wait: WaitOption,
    pub projection_years: u32,
    pub projection_rate: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "pt-BR".into(),
            currency: "BRL".into(),
            reminder_poll_secs: DEFAULT_POLL_SECS,
            default_wait: WaitOption::OneDay,
            projection_years: DEFAULT_YEARS,
            projection_rate: DEFAULT_RATE,
        }
    }
}

impl Config {
    pub fn locale_config(&self) -> LocaleConfig {
        LocaleConfig::for_tag(&self.locale)
    }

    pub fn currency_code(&self) -> CurrencyCode {
        CurrencyCode::new(self.currency.as_str())
    }

    /// Validates and applies one `key = value` change.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "locale" => {
                if value.is_empty() {
                    return Err(invalid(key, "cannot be empty"));
                }
                self.locale = value.to_string();
            }
            "currency" => {
                if value.len() != 3 || !value.chars().all(|ch| ch.is_ascii_alphabetic()) {
                    return Err(invalid(key, "expected a three-letter ISO code"));
                }
                self.currency = value.to_ascii_uppercase();
            }
            "reminder_poll_secs" => {
                self.reminder_poll_secs = value
                    .parse()
                    .map_err(|_| invalid(key, "expected a whole number of seconds"))?;
            }
            "default_wait" => {
                self.default_wait = value
                    .parse()
                    .map_err(|_| invalid(key, "expected one of 1h, 24h, 72h, 7d"))?;
            }
            "projection_years" => {
                let years: u32 = value
                    .parse()
                    .map_err(|_| invalid(key, "expected a whole number of years"))?;
                if years == 0 || years > MAX_PROJECTION_YEARS {
                    return Err(invalid(key, "must be between 1 and 100"));
                }
                self.projection_years = years;
            }
            "projection_rate" => {
                let rate: f64 = value
                    .replace(',', ".")
                    .parse()
                    .map_err(|_| invalid(key, "expected a decimal rate such as 0.10"))?;
                if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                    return Err(invalid(key, "must be between 0 and 1"));
                }
                self.projection_rate = rate;
            }
            other => {
                return Err(CoreError::Config(format!(
                    "unknown key `{}` (expected one of: {})",
                    other,
                    CONFIG_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Key/value pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("locale", self.locale.clone()),
            ("currency", self.currency.clone()),
            ("reminder_poll_secs", self.reminder_poll_secs.to_string()),
            ("default_wait", self.default_wait.to_string()),
            ("projection_years", self.projection_years.to_string()),
            ("projection_rate", self.projection_rate.to_string()),
        ]
    }
}

fn invalid(key: &str, reason: &str) -> CoreError {
    CoreError::Config(format!("`{}` {}", key, reason))
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::from_base(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    /// Missing file means defaults; a malformed one is an error.
    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)
                .map_err(|err| CoreError::Config(format!("{}: {}", self.path.display(), err)))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.reminder_poll_secs, 15);
        assert_eq!(config.default_wait, WaitOption::OneDay);
    }

    #[test]
    fn save_then_load_keeps_changes() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set_value("default_wait", "7d").unwrap();
        config.set_value("projection_rate", "0,08").unwrap();
        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.default_wait, WaitOption::OneWeek);
        assert_eq!(loaded.projection_rate, 0.08);
    }

    #[test]
    fn partial_file_fills_missing_keys() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"currency": "USD"}"#).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.currency, "USD");
        assert_eq!(loaded.projection_years, 10);
    }

    #[test]
    fn invalid_values_are_rejected_without_change() {
        let mut config = Config::default();
        assert!(config.set_value("projection_rate", "3").is_err());
        assert!(config.set_value("currency", "reais").is_err());
        assert!(config.set_value("default_wait", "2h").is_err());
        assert!(config.set_value("theme", "dark").is_err());
        assert_eq!(config, Config::default());
    }
}

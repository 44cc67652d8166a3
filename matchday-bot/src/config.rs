use matchday_game::{CareerConfig, CareerConfigError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::i18n;

const DEFAULT_LOCALE: &str = "ru";
const DEFAULT_PAUSE_MS: u64 = 1_500;
const MAX_PAUSE_MS: u64 = 30_000;

/// Front-end settings plus the career rules the engine runs with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "BotConfig::default_locale")]
    pub locale: String,
    /// Delay between consecutive match messages.
    #[serde(default = "BotConfig::default_pause_ms")]
    pub pause_ms: u64,
    #[serde(default = "BotConfig::default_log_level")]
    pub log_level: String,
    /// Directory holding `<image_key>.jpg` illustrations.
    #[serde(default)]
    pub image_root: Option<PathBuf>,
    /// Users allowed to run admin commands.
    #[serde(default)]
    pub admins: Vec<u64>,
    /// Channel subscribers; `None` disables the subscription gate.
    #[serde(default)]
    pub subscribers: Option<Vec<u64>>,
    /// JSON file the player store persists to; in-memory when unset.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    /// Seed for match randomness; random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub career: CareerConfig,
}

impl BotConfig {
    fn default_locale() -> String {
        DEFAULT_LOCALE.to_string()
    }

    const fn default_pause_ms() -> u64 {
        DEFAULT_PAUSE_MS
    }

    fn default_log_level() -> String {
        "info".to_string()
    }

    /// Read a JSON config file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, BotConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| BotConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        log::debug!("loaded bot config from {}", path.display());
        Ok(config)
    }

    /// # Errors
    ///
    /// Rejects unknown locales, oversized pauses and invalid career rules.
    pub fn validate(&self) -> Result<(), BotConfigError> {
        if !i18n::locales().iter().any(|meta| meta.code == self.locale) {
            return Err(BotConfigError::UnknownLocale(self.locale.clone()));
        }
        if self.pause_ms > MAX_PAUSE_MS {
            return Err(BotConfigError::PauseTooLong(self.pause_ms));
        }
        self.career.validate()?;
        Ok(())
    }

    #[must_use]
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admins.contains(&user_id)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            locale: Self::default_locale(),
            pause_ms: Self::default_pause_ms(),
            log_level: Self::default_log_level(),
            image_root: None,
            admins: Vec::new(),
            subscribers: None,
            data_file: None,
            seed: None,
            career: CareerConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BotConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing bot config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("locale {0:?} is not bundled")]
    UnknownLocale(String),
    #[error("pause of {0} ms is longer than {MAX_PAUSE_MS} ms")]
    PauseTooLong(u64),
    #[error(transparent)]
    Career(#[from] CareerConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_takes_defaults() {
        let config: BotConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BotConfig::default());
        assert_eq!(config.locale, "ru");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_career_overrides_are_read() {
        let config: BotConfig = serde_json::from_str(
            r#"{"locale": "en", "admins": [7], "career": {"registration_offers": 5}}"#,
        )
        .unwrap();
        assert!(config.is_admin(7));
        assert!(!config.is_admin(8));
        assert_eq!(config.career.registration_offers, 5);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let config = BotConfig {
            locale: "de".to_string(),
            ..BotConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BotConfigError::UnknownLocale(_))
        ));

        let config = BotConfig {
            pause_ms: 60_000,
            ..BotConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BotConfigError::PauseTooLong(60_000))
        ));

        let mut config = BotConfig::default();
        config.career.registration_offers = 0;
        assert!(matches!(config.validate(), Err(BotConfigError::Career(_))));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = BotConfig::load(Path::new("/nonexistent/matchday.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/matchday.json"));
    }
}

use crate::analysis::aggregator::ThemeGrouping;
use crate::error::{Error, Result};
use crate::text::NormalizeMode;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 16;
pub const DEFAULT_BATCH_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub huggingface_token: Option<String>,
    pub sentiment_model: String,
    pub batch_size: usize,
    pub batch_timeout_secs: u64,
    pub concurrency_limit: usize,
    pub taxonomy_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_path = env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "reviewscope.db".to_string());

        let huggingface_token = env::var("HF_API_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let sentiment_model = env::var("SENTIMENT_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let batch_size = parse_number(
            "SENTIMENT_BATCH_SIZE",
            env::var("SENTIMENT_BATCH_SIZE").ok(),
            DEFAULT_BATCH_SIZE,
        )?;
        let batch_timeout_secs = parse_number(
            "SENTIMENT_BATCH_TIMEOUT_SECS",
            env::var("SENTIMENT_BATCH_TIMEOUT_SECS").ok(),
            DEFAULT_BATCH_TIMEOUT_SECS,
        )?;
        let concurrency_limit = parse_number(
            "CONCURRENCY_LIMIT",
            env::var("CONCURRENCY_LIMIT").ok(),
            1,
        )?;

        let taxonomy_path = env::var("THEME_TAXONOMY_PATH").ok();

        let config = Self {
            database_path,
            huggingface_token,
            sentiment_model,
            batch_size,
            batch_timeout_secs,
            concurrency_limit,
            taxonomy_path,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch size must be at least 1".to_string()));
        }
        if self.concurrency_limit == 0 {
            return Err(Error::Config("concurrency limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "reviewscope.db".to_string(),
            huggingface_token: None,
            sentiment_model: DEFAULT_MODEL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_timeout_secs: DEFAULT_BATCH_TIMEOUT_SECS,
            concurrency_limit: 1,
            taxonomy_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub batch_timeout: Option<Duration>,
    pub concurrency_limit: usize,
    pub normalize_mode: NormalizeMode,
    pub theme_grouping: ThemeGrouping,
    pub show_progress: bool,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch size must be at least 1".to_string()));
        }
        if self.concurrency_limit == 0 {
            return Err(Error::Config("concurrency limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            batch_size: config.batch_size,
            batch_timeout: (config.batch_timeout_secs > 0)
                .then(|| Duration::from_secs(config.batch_timeout_secs)),
            concurrency_limit: config.concurrency_limit,
            normalize_mode: NormalizeMode::Basic,
            theme_grouping: ThemeGrouping::Combined,
            show_progress: true,
        }
    }
}

/// Unset means `default`; a value that does not parse is a configuration error.
fn parse_number<T: FromStr>(name: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(v) => v.trim().parse().map_err(|_| {
            Error::Config(format!("{} must be a non-negative integer, got '{}'", name, v))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_from_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.batch_size, 16);
        assert_eq!(config.batch_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.concurrency_limit, 1);
        assert_eq!(config.theme_grouping, ThemeGrouping::Combined);
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config = Config {
            batch_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(PipelineConfig::from(&config).batch_timeout, None);
    }

    #[test]
    fn test_numeric_settings_reject_garbage() {
        assert_eq!(parse_number::<u64>("SENTIMENT_BATCH_TIMEOUT_SECS", None, 60).unwrap(), 60);
        assert_eq!(parse_number::<u64>("SENTIMENT_BATCH_TIMEOUT_SECS", Some(" 5 ".into()), 60).unwrap(), 5);
        assert!(matches!(
            parse_number::<u64>("SENTIMENT_BATCH_TIMEOUT_SECS", Some("soon".into()), 60),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_number::<usize>("CONCURRENCY_LIMIT", Some("-2".into()), 1),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = Config {
            batch_size: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}

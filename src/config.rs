use std::str::FromStr;

use thiserror::Error;
use tracing::info;

use crate::buckets::Lookback;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set to a production Postgres instance")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub lookback: Lookback,
    pub icon_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `get` so tests never touch the process
    /// environment.
    pub fn from_env_with<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let defaults = Lookback::default();
        let years = parse_or(&get, "NUMBER_OF_YEARS", defaults.years)?;
        if i32::try_from(years).is_err() {
            return Err(ConfigError::Invalid {
                key: "NUMBER_OF_YEARS",
                value: years.to_string(),
            });
        }

        Ok(Self {
            database_url,
            max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?,
            lookback: Lookback {
                weeks: parse_or(&get, "NUMBER_OF_WEEKS", defaults.weeks)?,
                months: parse_or(&get, "NUMBER_OF_MONTHS", defaults.months)?,
                years,
            },
            icon_base_url: get("MOOD_ICON_BASE_URL")
                .unwrap_or_else(|| "https://cdn.example.com/icons".to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn icon_url(&self, file: &str) -> String {
        format!("{}/{}", self.icon_base_url, file)
    }
}

fn parse_or<F, T>(get: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    match get(key) {
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|_| ConfigError::Invalid { key, value })
        }
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_is_required() {
        let res = Config::from_env_with(|_| None);
        assert_eq!(res.unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = Config::from_env_with(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/mood".into()),
            _ => None,
        })
        .expect("cfg");
        assert_eq!(cfg.lookback, Lookback::default());
        assert_eq!(cfg.max_connections, 5);
        assert_eq!(
            cfg.icon_url("neutral.png"),
            "https://cdn.example.com/icons/neutral.png"
        );
    }

    #[test]
    fn reads_lookback_and_icon_base() {
        let cfg = Config::from_env_with(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/mood".into()),
            "NUMBER_OF_WEEKS" => Some("8".into()),
            "NUMBER_OF_YEARS" => Some(" 1 ".into()),
            "MOOD_ICON_BASE_URL" => Some("http://icons.local/".into()),
            _ => None,
        })
        .expect("cfg");
        assert_eq!(cfg.lookback.weeks, 8);
        assert_eq!(cfg.lookback.months, 5);
        assert_eq!(cfg.lookback.years, 1);
        assert_eq!(cfg.icon_url("a.png"), "http://icons.local/a.png");
    }

    #[test]
    fn rejects_malformed_numbers() {
        let res = Config::from_env_with(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/mood".into()),
            "NUMBER_OF_MONTHS" => Some("six".into()),
            _ => None,
        });
        assert!(matches!(
            res,
            Err(ConfigError::Invalid {
                key: "NUMBER_OF_MONTHS",
                ..
            })
        ));
    }

    #[test]
    fn rejects_year_lookback_beyond_calendar_range() {
        let res = Config::from_env_with(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/mood".into()),
            "NUMBER_OF_YEARS" => Some("4294967295".into()),
            _ => None,
        });
        assert_eq!(
            res.unwrap_err(),
            ConfigError::Invalid {
                key: "NUMBER_OF_YEARS",
                value: "4294967295".into(),
            }
        );
    }
}

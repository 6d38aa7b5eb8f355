use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use maplewatch_core::report::DEFAULT_REPORT_ROWS;
use maplewatch_core::TrackedNames;

/// Characters hidden from the roster unless `EXCLUDED_CHARACTERS` says
/// otherwise.
const DEFAULT_EXCLUDED: &str = "Admin";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// MySQL URL of the game server database.
    pub database_url: String,
    /// Chat webhook for notifications; `None` logs them instead.
    pub webhook_url: Option<String>,
    /// Delay between the end of one poll cycle and the start of the next.
    pub poll_interval: Duration,
    /// Upper bound on a single roster fetch.
    pub fetch_timeout: Duration,
    /// Characters compared against each other for crossings and ties.
    pub tracked: TrackedNames,
    /// Names filtered out of the roster query.
    pub excluded: Vec<String>,
    /// Default length of the rank report.
    pub report_rows: usize,
    /// Command server bind address.
    pub host: String,
    /// Command server bind port.
    pub port: u16,
}

impl WorkerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var               | Default   |
    /// |-----------------------|-----------|
    /// | `DATABASE_URL`        | required  |
    /// | `NOTIFY_WEBHOOK_URL`  | unset     |
    /// | `POLL_INTERVAL_SECS`  | `60`      |
    /// | `FETCH_TIMEOUT_SECS`  | `10`      |
    /// | `TRACKED_CHARACTERS`  | all       |
    /// | `EXCLUDED_CHARACTERS` | `Admin`   |
    /// | `REPORT_ROWS`         | `14`      |
    /// | `HOST`                | `0.0.0.0` |
    /// | `PORT`                | `3000`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let webhook_url = lookup("NOTIFY_WEBHOOK_URL").filter(|v| !v.trim().is_empty());

        let poll_interval_secs: u64 = parse_var(&lookup, "POLL_INTERVAL_SECS", 60)?;
        if poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "POLL_INTERVAL_SECS",
                reason: "must be at least 1".to_string(),
            });
        }
        let fetch_timeout_secs: u64 = parse_var(&lookup, "FETCH_TIMEOUT_SECS", 10)?;
        if fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "FETCH_TIMEOUT_SECS",
                reason: "must be at least 1".to_string(),
            });
        }

        let tracked = TrackedNames::from_list(parse_list(
            &lookup("TRACKED_CHARACTERS").unwrap_or_default(),
        ));
        let excluded =
            parse_list(&lookup("EXCLUDED_CHARACTERS").unwrap_or_else(|| DEFAULT_EXCLUDED.into()));

        let report_rows = parse_var(&lookup, "REPORT_ROWS", DEFAULT_REPORT_ROWS)?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_var(&lookup, "PORT", 3000u16)?;

        Ok(Self {
            database_url,
            webhook_url,
            poll_interval: Duration::from_secs(poll_interval_secs),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            tracked,
            excluded,
            report_rows,
            host,
            port,
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: format!("{raw:?}: {e}"),
        }),
    }
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<WorkerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WorkerConfig::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = load(&[("DATABASE_URL", "mysql://maple@localhost/maple")]).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.tracked, TrackedNames::All);
        assert_eq!(config.excluded, ["Admin"]);
        assert_eq!(config.report_rows, 14);
        assert_eq!(config.port, 3000);
        assert!(config.webhook_url.is_none());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert_matches!(load(&[]), Err(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn tracked_characters_are_parsed_from_list() {
        let config = load(&[
            ("DATABASE_URL", "mysql://x"),
            ("TRACKED_CHARACTERS", " Alice, Bob ,,Carol "),
        ])
        .unwrap();
        assert_eq!(
            config.tracked,
            TrackedNames::Only(vec!["Alice".into(), "Bob".into(), "Carol".into()])
        );
    }

    #[test]
    fn repeated_tracked_characters_are_kept_once() {
        let config = load(&[
            ("DATABASE_URL", "mysql://x"),
            ("TRACKED_CHARACTERS", "Bob,Alice,Bob"),
        ])
        .unwrap();
        assert_eq!(
            config.tracked,
            TrackedNames::Only(vec!["Bob".into(), "Alice".into()])
        );
    }

    #[test]
    fn empty_exclusion_list_disables_filtering() {
        let config = load(&[("DATABASE_URL", "mysql://x"), ("EXCLUDED_CHARACTERS", "")]).unwrap();
        assert!(config.excluded.is_empty());
    }

    #[test]
    fn invalid_number_names_the_variable() {
        let err = load(&[("DATABASE_URL", "mysql://x"), ("POLL_INTERVAL_SECS", "soon")])
            .unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "POLL_INTERVAL_SECS", .. });
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = load(&[("DATABASE_URL", "mysql://x"), ("POLL_INTERVAL_SECS", "0")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "POLL_INTERVAL_SECS", .. });
    }

    #[test]
    fn blank_webhook_is_treated_as_unset() {
        let config = load(&[("DATABASE_URL", "mysql://x"), ("NOTIFY_WEBHOOK_URL", "  ")]).unwrap();
        assert!(config.webhook_url.is_none());
    }
}

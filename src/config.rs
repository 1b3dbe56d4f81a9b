// SPDX-License-Identifier: MIT
use crate::error::DbError;
use crate::repository::HoursParsing;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// tracing filter directive, e.g. "warn" or "employee_db=debug"
    pub log_filter: String,
    pub log_json: bool,
    pub strict_hours: bool,
    /// fsync after every rewrite
    pub durable_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
            log_json: false,
            strict_hours: false,
            durable_writes: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, DbError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            log_filter: lookup("EMPDB_LOG").unwrap_or(defaults.log_filter),
            log_json: flag(&lookup, "EMPDB_LOG_JSON", defaults.log_json)?,
            strict_hours: flag(&lookup, "EMPDB_STRICT_HOURS", defaults.strict_hours)?,
            durable_writes: flag(&lookup, "EMPDB_DURABLE_WRITES", defaults.durable_writes)?,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.log_filter.trim().is_empty() {
            return Err("EMPDB_LOG cannot be empty".to_string());
        }

        Ok(())
    }

    pub fn hours_parsing(&self) -> HoursParsing {
        if self.strict_hours {
            HoursParsing::Strict
        } else {
            HoursParsing::Lenient
        }
    }
}

fn flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, DbError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DbError::Config(format!(
            "{} must be a boolean, got {:?}",
            key, raw
        ))),
    }
}

//! TOML-based billing configuration and preset definitions.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::billing::tariff::Tariff;

/// Top-level billing configuration parsed from TOML.
///
/// All fields have defaults matching the `b19` preset. Load from TOML with
/// [`BillingConfig::from_toml_file`] or use [`BillingConfig::b19`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BillingConfig {
    /// Rate schedule applied to every cycle.
    #[serde(default)]
    pub tariff: Tariff,
    /// CSV column names and timestamp format.
    #[serde(default)]
    pub input: InputConfig,
}

/// CSV layout of the interval data export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Column holding the interval start, e.g. `01-31-2024 13:15`.
    pub timestamp_column: String,
    /// Column holding energy usage (kWh).
    pub usage_column: String,
    /// Column holding peak demand (kW).
    pub demand_column: String,
    /// chrono format string for the timestamp column.
    pub timestamp_format: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            timestamp_column: "Start Date Time".to_string(),
            usage_column: "Usage".to_string(),
            demand_column: "Peak Demand".to_string(),
            timestamp_format: "%m-%d-%Y %H:%M".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"tariff.energy.summer.peak"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl BillingConfig {
    /// B-19 rates with the mandatory customer charge and the default CSV layout.
    pub fn b19() -> Self {
        Self {
            tariff: Tariff::b19(),
            input: InputConfig::default(),
        }
    }

    /// B-19 rates with the voluntary customer charge.
    pub fn b19_voluntary() -> Self {
        Self {
            tariff: Tariff::b19_voluntary(),
            input: InputConfig::default(),
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["b19", "b19_voluntary"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "b19" => Ok(Self::b19()),
            "b19_voluntary" => Ok(Self::b19_voluntary()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for (path, rate) in self.tariff.rates() {
            if rate.is_sign_negative() {
                errors.push(ConfigError {
                    field: format!("tariff.{path}"),
                    message: "must be >= 0".into(),
                });
            }
        }

        let input = &self.input;
        let columns = [
            ("input.timestamp_column", &input.timestamp_column),
            ("input.usage_column", &input.usage_column),
            ("input.demand_column", &input.demand_column),
        ];
        let mut seen = HashSet::new();
        for (field, name) in columns {
            if name.trim().is_empty() {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "must not be empty".into(),
                });
            } else if !seen.insert(name.trim()) {
                errors.push(ConfigError {
                    field: field.into(),
                    message: format!("duplicates another column name \"{name}\""),
                });
            }
        }

        if input.timestamp_format.trim().is_empty() {
            errors.push(ConfigError {
                field: "input.timestamp_format".into(),
                message: "must not be empty".into(),
            });
        } else if NaiveDateTime::parse_from_str(
            &sample_timestamp(&input.timestamp_format),
            &input.timestamp_format,
        )
        .is_err()
        {
            errors.push(ConfigError {
                field: "input.timestamp_format".into(),
                message: format!(
                    "\"{}\" must include a date and a time of day",
                    input.timestamp_format
                ),
            });
        }

        errors
    }
}

/// Formats a fixed instant with `format` so it can be parsed back.
fn sample_timestamp(format: &str) -> String {
    use std::fmt::Write;

    let instant = chrono::NaiveDate::from_ymd_opt(2024, 1, 31)
        .and_then(|d| d.and_hms_opt(13, 45, 0))
        .unwrap_or_default();
    let mut out = String::new();
    // Unknown specifiers make the formatter fail; treat that as unparseable.
    if write!(out, "{}", instant.format(format)).is_err() {
        out.clear();
    }
    out
}

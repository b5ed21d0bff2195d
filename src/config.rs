//! JSON property files and name resolution.
//!
//! Physical table names follow the `lavender-{environment}-{tableName}`
//! convention, where the environment comes from the `environment_name`
//! process variable.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::{Error, Result};

/// Environment variable holding the deployment environment name.
pub const ENVIRONMENT_VAR: &str = "environment_name";

/// Static application secrets.
///
/// The `encriptionKey` spelling is the on-disk contract; existing secret
/// files use it.
#[derive(Debug, Clone, Deserialize)]
pub struct Secrets {
    #[serde(rename = "reCaptchaServerSecret")]
    pub recaptcha_server_secret: String,
    #[serde(rename = "encriptionKey")]
    pub encryption_key: String,
}

impl Secrets {
    /// Load secrets from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path)
    }
}

/// DynamoDB table name mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct TableProperties {
    pub region: String,
    #[serde(rename = "tableInfo")]
    table_info: HashMap<String, TableInfo>,
    #[serde(skip)]
    environment: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TableInfo {
    #[serde(rename = "tableName")]
    table_name: String,
}

impl TableProperties {
    /// Load the table mapping from a JSON file, capturing the environment
    /// name from the process environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let environment = env::var(ENVIRONMENT_VAR)
            .map_err(|_| Error::Config(format!("{} not set", ENVIRONMENT_VAR)))?;
        Ok(Self {
            environment,
            ..read_json(path)?
        })
    }

    /// Load the table mapping with an explicit environment name.
    pub fn load_with_environment(
        path: impl AsRef<Path>,
        environment: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            environment: environment.into(),
            ..read_json(path)?
        })
    }

    /// Resolve a logical table name to its physical, environment-specific
    /// name.
    pub fn resolve(&self, logical_name: &str) -> Result<String> {
        let info = self
            .table_info
            .get(logical_name)
            .ok_or_else(|| Error::Config(format!("unknown table: {}", logical_name)))?;

        Ok(format!(
            "lavender-{}-{}",
            self.environment, info.table_name
        ))
    }

    /// The deployment environment this mapping was loaded for.
    pub fn environment(&self) -> &str {
        &self.environment
    }
}

/// Google Calendar name mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarProperties {
    #[serde(rename = "calendarInfo")]
    calendar_info: HashMap<String, CalendarInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct CalendarInfo {
    #[serde(rename = "name")]
    calendar_id: String,
}

impl CalendarProperties {
    /// Load the calendar mapping from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path)
    }

    /// Resolve a logical calendar name to its calendar id.
    pub fn resolve(&self, logical_name: &str) -> Result<&str> {
        self.calendar_info
            .get(logical_name)
            .map(|info| info.calendar_id.as_str())
            .ok_or_else(|| Error::Config(format!("unknown calendar: {}", logical_name)))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    info!(path = %path.display(), "Reading property file");
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE_JSON: &str = r#"{
        "region": "eu-central-1",
        "tableInfo": {
            "userData": {"tableName": "user_data"},
            "reservation": {"tableName": "reservation"}
        }
    }"#;

    fn table_properties(environment: &str) -> TableProperties {
        let mut props: TableProperties = serde_json::from_str(TABLE_JSON).unwrap();
        props.environment = environment.to_string();
        props
    }

    #[test]
    fn resolves_table_name_with_environment() {
        let props = table_properties("prod");
        assert_eq!(props.resolve("userData").unwrap(), "lavender-prod-user_data");
    }

    #[test]
    fn unknown_table_is_a_config_error() {
        let props = table_properties("dev");
        assert!(matches!(props.resolve("missing"), Err(Error::Config(_))));
    }

    #[test]
    fn parses_secrets() {
        let json = r#"{"reCaptchaServerSecret":"captcha-secret","encriptionKey":"0123456789abcdef0123456789abcdef"}"#;
        let secrets: Secrets = serde_json::from_str(json).unwrap();
        assert_eq!(secrets.recaptcha_server_secret, "captcha-secret");
        assert_eq!(secrets.encryption_key.len(), 32);
    }

    #[test]
    fn resolves_calendar_id() {
        let json = r#"{"calendarInfo":{"reservations":{"name":"abc123@group.calendar.google.com"}}}"#;
        let props: CalendarProperties = serde_json::from_str(json).unwrap();
        assert_eq!(
            props.resolve("reservations").unwrap(),
            "abc123@group.calendar.google.com"
        );
        assert!(matches!(props.resolve("other"), Err(Error::Config(_))));
    }
}

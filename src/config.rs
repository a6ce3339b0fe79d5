// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Connection configuration.
//!
//! A [`ConnectionConfig`] is built once from key/value options and is
//! immutable afterwards. Missing required keys and unrecognized keys are
//! rejected before any network activity.

use crate::error::Error;
use crate::quote::quote_identifier;
use adbc_core::options::OptionValue;
use std::fmt;

pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_MAX_BACKOFF_ATTEMPTS: u32 = 5;

const REQUIRED_OPTIONS: [&str; 3] = ["host", "user", "password"];

const ALLOWED_OPTIONS: [&str; 15] = [
    "host",
    "user",
    "password",
    "port",
    "tracing",
    "loginTimeout",
    "networkTimeout",
    "queryTimeout",
    "maxBackoffAttempts",
    "database",
    "schema",
    "warehouse",
    "runId",
    "clientSessionKeepAlive",
    "application",
];

/// Reasons a configuration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing options: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("Unknown options: {}", .0.join(", "))]
    Unknown(Vec<String>),

    #[error("Invalid value for option '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::adapter_with_source(err.to_string(), None, err)
    }
}

/// Validated settings for one warehouse connection.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    host: String,
    user: String,
    password: String,
    port: u16,
    tracing: i64,
    login_timeout: Option<u64>,
    network_timeout: Option<u64>,
    query_timeout: Option<u64>,
    max_backoff_attempts: u32,
    database: Option<String>,
    schema: Option<String>,
    warehouse: Option<String>,
    run_id: Option<String>,
    client_session_keep_alive: bool,
    application: Option<String>,
}

impl ConnectionConfig {
    /// Builds a configuration from `(key, value)` options.
    ///
    /// All missing required keys are reported together, then all unknown
    /// keys in the order they were supplied.
    pub fn from_options<I, K>(options: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, OptionValue)>,
        K: Into<String>,
    {
        let options: Vec<(String, OptionValue)> = options
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();

        let missing: Vec<String> = REQUIRED_OPTIONS
            .iter()
            .filter(|required| !options.iter().any(|(key, _)| key == *required))
            .map(|required| required.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let mut unknown: Vec<String> = Vec::new();
        for (key, _) in &options {
            if !ALLOWED_OPTIONS.contains(&key.as_str()) && !unknown.contains(key) {
                unknown.push(key.clone());
            }
        }
        if !unknown.is_empty() {
            return Err(ConfigError::Unknown(unknown));
        }

        let mut config = Self {
            host: String::new(),
            user: String::new(),
            password: String::new(),
            port: DEFAULT_PORT,
            tracing: 0,
            login_timeout: None,
            network_timeout: None,
            query_timeout: None,
            max_backoff_attempts: DEFAULT_MAX_BACKOFF_ATTEMPTS,
            database: None,
            schema: None,
            warehouse: None,
            run_id: None,
            client_session_keep_alive: false,
            application: None,
        };

        for (key, value) in options {
            match key.as_str() {
                "host" => {
                    let host = string_value(&key, value)?;
                    if host
                        .chars()
                        .any(|c| c.is_whitespace() || matches!(c, ';' | '=' | '{' | '}'))
                    {
                        return Err(invalid(&key, "must not contain ';', '=', braces or whitespace"));
                    }
                    config.host = host;
                }
                "user" => config.user = string_value(&key, value)?,
                "password" => config.password = string_value(&key, value)?,
                "port" => config.port = int_value(&key, value)?,
                "tracing" => config.tracing = int_value(&key, value)?,
                "loginTimeout" => config.login_timeout = Some(int_value(&key, value)?),
                "networkTimeout" => config.network_timeout = Some(int_value(&key, value)?),
                "queryTimeout" => config.query_timeout = Some(int_value(&key, value)?),
                "maxBackoffAttempts" => config.max_backoff_attempts = int_value(&key, value)?,
                "database" => config.database = Some(string_value(&key, value)?),
                "schema" => config.schema = Some(string_value(&key, value)?),
                "warehouse" => config.warehouse = Some(string_value(&key, value)?),
                "runId" => config.run_id = Some(string_value(&key, value)?),
                "clientSessionKeepAlive" => {
                    config.client_session_keep_alive = bool_value(&key, value)?
                }
                "application" => {
                    let tag = string_value(&key, value)?;
                    if tag.is_empty()
                        || !tag
                            .chars()
                            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
                    {
                        return Err(invalid(&key, "expected letters, digits, '_', '.' or '-'"));
                    }
                    config.application = Some(tag);
                }
                _ => return Err(ConfigError::Unknown(vec![key.clone()])),
            }
        }
        Ok(config)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn tracing(&self) -> i64 {
        self.tracing
    }

    pub fn login_timeout(&self) -> Option<u64> {
        self.login_timeout
    }

    pub fn network_timeout(&self) -> Option<u64> {
        self.network_timeout
    }

    pub fn query_timeout(&self) -> Option<u64> {
        self.query_timeout
    }

    pub fn max_backoff_attempts(&self) -> u32 {
        self.max_backoff_attempts
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn warehouse(&self) -> Option<&str> {
        self.warehouse.as_deref()
    }

    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    pub fn client_session_keep_alive(&self) -> bool {
        self.client_session_keep_alive
    }

    pub fn application(&self) -> Option<&str> {
        self.application.as_deref()
    }

    /// Builds the semicolon-delimited driver connection string.
    pub fn dsn(&self) -> String {
        let mut dsn = format!(
            "Driver=SnowflakeDSIIDriver;Server={};Port={};Tracing={}",
            self.host, self.port, self.tracing
        );
        if let Some(timeout) = self.login_timeout {
            dsn.push_str(&format!(";Login_timeout={timeout}"));
        }
        if let Some(timeout) = self.network_timeout {
            dsn.push_str(&format!(";Network_timeout={timeout}"));
        }
        if let Some(timeout) = self.query_timeout {
            dsn.push_str(&format!(";Query_timeout={timeout}"));
        }
        if let Some(database) = &self.database {
            dsn.push_str(&format!(";Database={}", quote_identifier(database)));
        }
        if let Some(schema) = &self.schema {
            dsn.push_str(&format!(";Schema={}", quote_identifier(schema)));
        }
        if let Some(warehouse) = &self.warehouse {
            dsn.push_str(&format!(";Warehouse={}", quote_identifier(warehouse)));
        }
        if let Some(application) = &self.application {
            dsn.push_str(&format!(";application={application}"));
        }
        if self.client_session_keep_alive {
            dsn.push_str(";CLIENT_SESSION_KEEP_ALIVE=TRUE");
        }
        dsn
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("port", &self.port)
            .field("tracing", &self.tracing)
            .field("login_timeout", &self.login_timeout)
            .field("network_timeout", &self.network_timeout)
            .field("query_timeout", &self.query_timeout)
            .field("max_backoff_attempts", &self.max_backoff_attempts)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("warehouse", &self.warehouse)
            .field("run_id", &self.run_id)
            .field("client_session_keep_alive", &self.client_session_keep_alive)
            .field("application", &self.application)
            .finish()
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn string_value(key: &str, value: OptionValue) -> Result<String, ConfigError> {
    match value {
        OptionValue::String(s) => Ok(s),
        _ => Err(invalid(key, "expected a string")),
    }
}

fn int_value<T: TryFrom<i64>>(key: &str, value: OptionValue) -> Result<T, ConfigError> {
    let number = match value {
        OptionValue::Int(n) => n,
        OptionValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(key, format!("'{s}' is not an integer")))?,
        _ => return Err(invalid(key, "expected an integer")),
    };
    T::try_from(number).map_err(|_| invalid(key, format!("{number} is out of range")))
}

fn bool_value(key: &str, value: OptionValue) -> Result<bool, ConfigError> {
    match value {
        OptionValue::Int(n) => Ok(n != 0),
        OptionValue::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(invalid(key, format!("'{s}' is not a boolean"))),
        },
        _ => Err(invalid(key, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> OptionValue {
        OptionValue::String(value.into())
    }

    fn required() -> Vec<(&'static str, OptionValue)> {
        vec![
            ("host", s("acme.snowflakecomputing.com")),
            ("user", s("loader")),
            ("password", s("secret")),
        ]
    }

    #[test]
    fn test_config_defaults() {
        let config = ConnectionConfig::from_options(required()).unwrap();
        assert_eq!(config.port(), 443);
        assert_eq!(config.tracing(), 0);
        assert_eq!(config.max_backoff_attempts(), 5);
        assert!(!config.client_session_keep_alive());
        assert_eq!(
            config.dsn(),
            "Driver=SnowflakeDSIIDriver;Server=acme.snowflakecomputing.com;Port=443;Tracing=0"
        );
    }

    #[test]
    fn test_config_missing_user() {
        let err = ConnectionConfig::from_options([
            ("host", s("h")),
            ("password", s("p")),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing(vec!["user".into()]));
        assert_eq!(err.to_string(), "Missing options: user");
    }

    #[test]
    fn test_config_unknown_options() {
        let mut options = required();
        options.push(("someRandomParameter", OptionValue::Int(0)));
        options.push(("otherRandomParameter", OptionValue::Int(0)));
        let err = ConnectionConfig::from_options(options).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown options: someRandomParameter, otherRandomParameter"
        );
    }

    #[test]
    fn test_config_invalid_values() {
        let mut options = required();
        options.push(("port", s("https")));
        let err = ConnectionConfig::from_options(options).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "port"));

        let mut options = required();
        options.push(("application", s("app;Server=evil")));
        assert!(ConnectionConfig::from_options(options).is_err());

        let mut options = required();
        options.push(("queryTimeout", OptionValue::Int(-1)));
        assert!(ConnectionConfig::from_options(options).is_err());
    }

    #[test]
    fn test_config_host_cannot_inject_dsn_attributes() {
        for host in [
            "acme.example;Driver=Evil;Server=attacker.example",
            "acme.example Port=1",
            "{acme.example}",
            "acme=example",
        ] {
            let err = ConnectionConfig::from_options([
                ("host", s(host)),
                ("user", s("loader")),
                ("password", s("secret")),
            ])
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "host"),
                "{host} was accepted"
            );
        }
    }

    #[test]
    fn test_config_full_dsn() {
        let mut options = required();
        options.extend([
            ("port", OptionValue::Int(8443)),
            ("tracing", s("6")),
            ("loginTimeout", OptionValue::Int(30)),
            ("networkTimeout", OptionValue::Int(60)),
            ("queryTimeout", OptionValue::Int(600)),
            ("database", s("KEBOOLA_\"DB")),
            ("schema", s("in.c-main")),
            ("warehouse", s("DEV")),
            ("application", s("keboola_connection")),
            ("clientSessionKeepAlive", s("true")),
            ("maxBackoffAttempts", OptionValue::Int(2)),
        ]);
        let config = ConnectionConfig::from_options(options).unwrap();
        assert_eq!(config.max_backoff_attempts(), 2);
        assert_eq!(
            config.dsn(),
            "Driver=SnowflakeDSIIDriver;Server=acme.snowflakecomputing.com;Port=8443;Tracing=6\
             ;Login_timeout=30;Network_timeout=60;Query_timeout=600\
             ;Database=\"KEBOOLA_\"\"DB\";Schema=\"in.c-main\";Warehouse=\"DEV\"\
             ;application=keboola_connection;CLIENT_SESSION_KEEP_ALIVE=TRUE"
        );
    }

    #[test]
    fn test_config_debug_hides_password() {
        let config = ConnectionConfig::from_options(required()).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("loader"));
    }

    #[test]
    fn test_config_error_is_generic_adapter_error() {
        let err: Error = ConfigError::Missing(vec!["user".into()]).into();
        assert_eq!(
            err.category(),
            crate::error::ErrorCategory::GenericAdapterError
        );
        assert_eq!(err.to_string(), "Missing options: user");
    }
}

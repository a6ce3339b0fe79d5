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

//! Error types for the Snowflake adapter.
//!
//! Every failure surfaced by the adapter is an [`Error`], and every
//! [`Error`] belongs to exactly one [`ErrorCategory`] so callers can branch
//! on the kind of failure without parsing message text.

use adbc_core::error::Status;

/// Boxed error kept as the underlying cause of an adapter error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The coarse failure categories callers can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    StringTooLong,
    WarehouseTimeout,
    ObjectNotAccessible,
    QueryExecutionFailed,
    GenericAdapterError,
}

/// The error type for Snowflake adapter operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value did not fit into the target column.
    #[error("String '{value}' cannot be inserted because it's bigger than column size")]
    StringTooLong {
        value: String,
        driver_message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The statement or warehouse timeout was reached.
    #[error("Query reached its timeout {seconds} second(s)")]
    WarehouseTimeout {
        seconds: u64,
        driver_message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The object referenced by the query does not exist or the current
    /// role cannot see it.
    #[error("Cannot access object or object does not exist. Executed query \"{sql}\"")]
    ObjectNotAccessible {
        sql: String,
        driver_message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Any other failure of a known statement.
    #[error("Error \"{message}\" while executing query \"{sql}\"")]
    QueryExecutionFailed {
        message: String,
        sql: String,
        code: Option<i32>,
        #[source]
        source: Option<BoxError>,
    },

    /// Catch-all for configuration, connection and unmatched failures.
    #[error("{message}")]
    Adapter {
        message: String,
        code: Option<i32>,
        #[source]
        source: Option<BoxError>,
    },
}

/// A convenient alias for Results with adapter errors.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a generic adapter error with no underlying cause.
    pub fn adapter(message: impl Into<String>) -> Self {
        Self::Adapter {
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Creates a generic adapter error wrapping `source`.
    pub fn adapter_with_source(
        message: impl Into<String>,
        code: Option<i32>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Adapter {
            message: message.into(),
            code,
            source: Some(source.into()),
        }
    }

    /// Returns the category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::StringTooLong { .. } => ErrorCategory::StringTooLong,
            Self::WarehouseTimeout { .. } => ErrorCategory::WarehouseTimeout,
            Self::ObjectNotAccessible { .. } => ErrorCategory::ObjectNotAccessible,
            Self::QueryExecutionFailed { .. } => ErrorCategory::QueryExecutionFailed,
            Self::Adapter { .. } => ErrorCategory::GenericAdapterError,
        }
    }

    /// Returns the SQL text the error is attached to, if any.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::ObjectNotAccessible { sql, .. } | Self::QueryExecutionFailed { sql, .. } => {
                Some(sql)
            }
            _ => None,
        }
    }

    /// Returns the vendor error code reported by the driver, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::QueryExecutionFailed { code, .. } | Self::Adapter { code, .. } => *code,
            _ => None,
        }
    }

    /// Converts the error into an ADBC error for ADBC-shaped call sites.
    pub fn to_adbc(&self) -> adbc_core::error::Error {
        let status = match self.category() {
            ErrorCategory::StringTooLong => Status::InvalidData,
            ErrorCategory::WarehouseTimeout => Status::Timeout,
            ErrorCategory::ObjectNotAccessible => Status::NotFound,
            ErrorCategory::QueryExecutionFailed => Status::Unknown,
            ErrorCategory::GenericAdapterError => Status::Internal,
        };
        let mut error =
            adbc_core::error::Error::with_message_and_status(format!("[Snowflake] {self}"), status);
        if let Some(code) = self.code() {
            error.vendor_code = code;
        }
        error
    }
}

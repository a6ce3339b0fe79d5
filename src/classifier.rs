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

//! Maps raw driver failures onto the typed [`Error`] taxonomy.
//!
//! Classification is an ordered list of rules where the first match wins.
//! Message patterns are checked before the SQL-context rules because a
//! timeout or truncation message is more specific than "the query failed".
//!
//! The patterns follow the English wording and SQLSTATE codes of the
//! Snowflake ODBC driver. Messages from another driver version or locale
//! fall through to the generic rules.

use crate::driver::DriverError;
use crate::error::{BoxError, Error};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// A failure waiting to be classified.
#[derive(Debug)]
pub enum Failure {
    /// An error reported by the underlying driver.
    Driver(DriverError),
    /// An error already produced by this crate.
    Adapter(Error),
    /// A bare message and optional vendor code with no error value behind it.
    Message { message: String, code: Option<i32> },
}

impl Failure {
    fn message(&self) -> String {
        match self {
            Self::Driver(err) => err.message.clone(),
            Self::Adapter(err) => err.to_string(),
            Self::Message { message, .. } => message.clone(),
        }
    }

    fn code(&self) -> Option<i32> {
        match self {
            Self::Driver(err) if err.vendor_code != 0 => Some(err.vendor_code),
            Self::Driver(_) => None,
            Self::Adapter(err) => err.code(),
            Self::Message { code, .. } => *code,
        }
    }

    fn into_source(self) -> Option<BoxError> {
        match self {
            Self::Driver(err) => Some(Box::new(err) as BoxError),
            Self::Adapter(err) => Some(Box::new(err) as BoxError),
            Self::Message { .. } => None,
        }
    }
}

impl From<DriverError> for Failure {
    fn from(err: DriverError) -> Self {
        Self::Driver(err)
    }
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        Self::Adapter(err)
    }
}

struct PatternRule {
    pattern: Regex,
    build: fn(&Captures<'_>, String, Option<BoxError>) -> Error,
}

static PATTERN_RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        PatternRule {
            pattern: Regex::new(r"String '([^']*)' is too long .* SQL state 22000")
                .expect("string too long pattern is valid"),
            build: |captures, driver_message, source| Error::StringTooLong {
                value: captures[1].to_string(),
                driver_message,
                source,
            },
        },
        PatternRule {
            pattern: Regex::new(
                r"Statement reached its statement or warehouse timeout of ([0-9]+) second.* SQL state 57014",
            )
            .expect("warehouse timeout pattern is valid"),
            build: |captures, driver_message, source| Error::WarehouseTimeout {
                seconds: captures[1].parse().unwrap_or(u64::MAX),
                driver_message,
                source,
            },
        },
    ]
});

const OBJECT_DOES_NOT_EXIST: &str = "Object does not exist";

/// Classifies `failure`, optionally raised while executing `sql`.
pub fn classify(failure: impl Into<Failure>, sql: Option<&str>) -> Error {
    let failure = failure.into();
    let message = failure.message();

    for rule in PATTERN_RULES.iter() {
        if let Some(captures) = rule.pattern.captures(&message) {
            return (rule.build)(&captures, message.clone(), failure.into_source());
        }
    }

    if let Some(sql) = sql {
        if message.contains(OBJECT_DOES_NOT_EXIST) {
            return Error::ObjectNotAccessible {
                sql: sql.to_string(),
                driver_message: message,
                source: failure.into_source(),
            };
        }
        return Error::QueryExecutionFailed {
            code: failure.code(),
            message,
            sql: sql.to_string(),
            source: failure.into_source(),
        };
    }

    match failure {
        Failure::Adapter(err) => err,
        other => Error::Adapter {
            code: other.code(),
            message,
            source: other.into_source(),
        },
    }
}

/// Classifies a bare message, the form errors take in logs and tests.
pub fn classify_message(message: impl Into<String>, code: Option<i32>, sql: Option<&str>) -> Error {
    classify(
        Failure::Message {
            message: message.into(),
            code,
        },
        sql,
    )
}

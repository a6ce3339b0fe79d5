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

//! The seam between the adapter and the underlying database driver.
//!
//! A [`Connector`] authenticates and hands out a [`DriverHandle`]; the
//! handle prepares, binds, executes and streams rows for one statement at a
//! time. [`AdbcConnector`] implements both on top of any ADBC driver.

pub mod adbc;
#[cfg(test)]
pub(crate) mod fake;

pub use adbc::{AdbcConnector, AdbcHandle};

use crate::result::Row;

/// Errors reported by the driver layer.
pub type DriverError = adbc_core::error::Error;

/// SQLSTATE the driver reports when its underlying service request failed.
pub const TRANSIENT_SQLSTATE: &str = "S1000";

/// Opens driver handles.
pub trait Connector {
    type Handle: DriverHandle;

    /// Authenticates against the warehouse described by `dsn`.
    fn connect(
        &mut self,
        dsn: &str,
        user: &str,
        password: &str,
    ) -> Result<Self::Handle, DriverError>;
}

/// A live driver session.
///
/// Handles are not safe for concurrent use; every method takes `&mut self`.
pub trait DriverHandle {
    /// Rows of the statement currently executing. Dropping the iterator
    /// releases the statement.
    type Rows<'a>: Iterator<Item = Result<Row, DriverError>>
    where
        Self: 'a;

    /// Prepares `sql`, binds `params` positionally and executes it.
    fn execute(&mut self, sql: &str, params: &[String]) -> Result<Self::Rows<'_>, DriverError>;

    /// Releases the session. Calling it again is a no-op.
    fn close(&mut self) -> Result<(), DriverError>;
}

/// Returns the five-character SQLSTATE carried by `err`, if any.
pub fn sqlstate(err: &DriverError) -> Option<String> {
    if err.sqlstate.iter().all(|&c| c == 0) {
        return None;
    }
    Some(
        err.sqlstate
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| c as u8 as char)
            .collect(),
    )
}

/// Returns true for the failed-service-request signature worth retrying.
///
/// ODBC-style drivers only put the state in the message text, so both are
/// checked.
pub fn is_transient(err: &DriverError) -> bool {
    if sqlstate(err).as_deref() == Some(TRANSIENT_SQLSTATE) {
        return true;
    }
    err.message
        .to_ascii_uppercase()
        .contains(TRANSIENT_SQLSTATE)
}

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

//! Connection manager.
//!
//! A [`Connection`] owns exactly one driver handle. It is created by a
//! successful authentication (retrying transient failures with exponential
//! backoff), executes any number of statements, and releases the handle
//! once on [`Connection::disconnect`] or drop.

use crate::backoff::Backoff;
use crate::classifier::classify;
use crate::config::ConnectionConfig;
use crate::driver::{is_transient, Connector, DriverError, DriverHandle};
use crate::error::{Error, Result};
use crate::query_builder::QueryBuilder;
use crate::result::Row;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, error, warn};

static QUOTED_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^'.*'$").expect("quoted literal pattern is valid"));

static PASSWORD_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(PASSWORD\s*=\s*)'(?:[^'\\]|\\.)*'")
        .expect("password literal pattern is valid")
});

/// Lifecycle of a [`Connection`].
///
/// `Disconnected` and `Connecting` are only reported in the logs of
/// [`Connection::open`]. A returned connection is `Connected` until
/// [`Connection::disconnect`], then `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

/// An authenticated session with the warehouse.
///
/// Not safe for concurrent use: every execution method takes `&mut self`,
/// so callers sharing a connection must serialize access themselves.
pub struct Connection<H: DriverHandle> {
    config: ConnectionConfig,
    handle: Option<H>,
    state: ConnectionState,
}

impl<H: DriverHandle> Connection<H> {
    /// Connects with the backoff budget from `config`.
    pub fn open<C>(config: ConnectionConfig, connector: &mut C) -> Result<Self>
    where
        C: Connector<Handle = H>,
    {
        let backoff = Backoff::from_config(&config);
        Self::open_with_backoff(config, connector, backoff)
    }

    /// Connects, retrying transient failures according to `backoff`.
    pub fn open_with_backoff<C>(
        config: ConnectionConfig,
        connector: &mut C,
        backoff: Backoff,
    ) -> Result<Self>
    where
        C: Connector<Handle = H>,
    {
        let dsn = config.dsn();
        debug!(host = config.host(), state = ?ConnectionState::Disconnected, "opening connection");

        let mut attempt = 0;
        let handle = loop {
            backoff.wait(attempt);
            debug!(attempt, state = ?ConnectionState::Connecting, "authenticating");
            match connector.connect(&dsn, config.user(), config.password()) {
                Ok(handle) => break handle,
                Err(err) if is_transient(&err) => {
                    attempt += 1;
                    if attempt > backoff.max_attempts {
                        error!(attempts = attempt, "giving up on connection: {}", err.message);
                        return Err(connect_failed(err));
                    }
                    warn!(
                        attempt,
                        delay = ?backoff.delay(attempt),
                        "transient connection failure, retrying: {}",
                        err.message
                    );
                }
                Err(err) => return Err(connect_failed(err)),
            }
        };

        let mut connection = Self {
            config,
            handle: Some(handle),
            state: ConnectionState::Connected,
        };
        debug!(state = ?connection.state, retries = attempt, "connection established");

        if let Some(run_id) = connection.config.run_id() {
            let sql = QueryBuilder::set_query_tag(run_id);
            connection.query(&sql, &[])?;
        }
        Ok(connection)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Executes `sql` and discards any result rows.
    pub fn query(&mut self, sql: &str, bind: &[&str]) -> Result<()> {
        self.run(sql, bind, |_| {})
    }

    /// Executes `sql` and collects every row.
    ///
    /// Use [`Connection::fetch`] for large results.
    pub fn fetch_all(&mut self, sql: &str, bind: &[&str]) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        self.run(sql, bind, |row| rows.push(row))?;
        Ok(rows)
    }

    /// Executes `sql` and hands each row to `handler` as it arrives.
    pub fn fetch<F>(&mut self, sql: &str, bind: &[&str], handler: F) -> Result<()>
    where
        F: FnMut(Row),
    {
        self.run(sql, bind, handler)
    }

    fn run<F>(&mut self, sql: &str, bind: &[&str], mut on_row: F) -> Result<()>
    where
        F: FnMut(Row),
    {
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| Error::adapter("Connection is closed"))?;
        let params = repair_bindings(bind);
        debug!(
            sql = %redact_passwords(sql),
            params = params.len(),
            "executing statement"
        );

        match drain(handle, sql, &params, &mut on_row) {
            Ok(count) => {
                debug!(rows = count, "statement finished");
                Ok(())
            }
            Err(err) => Err(classify(err, Some(sql))),
        }
    }

    /// Releases the driver handle. Safe to call more than once.
    pub fn disconnect(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if let Err(err) = handle.close() {
                warn!("error while closing connection: {}", err.message);
            }
            debug!("connection closed");
        }
        self.state = ConnectionState::Closed;
    }
}

impl<H: DriverHandle> Drop for Connection<H> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl<H: DriverHandle> fmt::Debug for Connection<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Streams every row of `sql` into `on_row`, returning the row count.
fn drain<H, F>(
    handle: &mut H,
    sql: &str,
    params: &[String],
    on_row: &mut F,
) -> std::result::Result<usize, DriverError>
where
    H: DriverHandle,
    F: FnMut(Row),
{
    let mut count = 0;
    for row in handle.execute(sql, params)? {
        on_row(row?);
        count += 1;
    }
    Ok(count)
}

fn connect_failed(err: DriverError) -> Error {
    let code = (err.vendor_code != 0).then_some(err.vendor_code);
    Error::adapter_with_source(
        format!("Initializing Snowflake connection failed: {}", err.message),
        code,
        err,
    )
}

/// Masks `PASSWORD = '...'` literals so statements can be logged.
fn redact_passwords(sql: &str) -> Cow<'_, str> {
    PASSWORD_LITERAL.replace_all(sql, "$1'***'")
}

/// Pads values shaped like a quoted literal with a space on each side.
///
/// ODBC execute treats a bind value of the form `'...'` as a file name to
/// read the parameter from; the padding stops that.
fn repair_bindings(bind: &[&str]) -> Vec<String> {
    bind.iter()
        .map(|value| {
            if QUOTED_LITERAL.is_match(value) {
                format!(" {value} ")
            } else {
                value.to_string()
            }
        })
        .collect()
}

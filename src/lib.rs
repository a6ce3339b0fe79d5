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

//! Snowflake database adapter.
//!
//! This crate connects to a Snowflake warehouse through a pluggable driver
//! and gives callers a small, safe surface on top of it:
//!
//! - [`ConnectionConfig`] - Validated connection options and the driver DSN
//! - [`Connection`] - An authenticated session with retrying connect,
//!   statement execution and streaming fetch
//! - [`QueryBuilder`] - Introspection and administration statements with
//!   every caller-supplied name and value quoted
//! - [`classify`] - Maps driver failures onto typed [`Error`]s
//!
//! The [`driver`] module defines the seam to the underlying driver;
//! [`AdbcConnector`] implements it for any ADBC driver.
//!
//! ## Example
//!
//! ```ignore
//! use adbc_core::options::OptionValue;
//! use snowflake_db_adapter::{AdbcConnector, Connection, ConnectionConfig};
//!
//! let config = ConnectionConfig::from_options([
//!     ("host", OptionValue::String("acme.snowflakecomputing.com".into())),
//!     ("user", OptionValue::String("loader".into())),
//!     ("password", OptionValue::String(password)),
//! ])?;
//! let mut connector = AdbcConnector::new(driver);
//! let mut connection = Connection::open(config, &mut connector)?;
//! for row in connection.fetch_all("SELECT CURRENT_VERSION() AS \"v\"", &[])? {
//!     println!("{:?}", row.get("v"));
//! }
//! ```

pub mod backoff;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod query_builder;
pub mod quote;
pub mod result;

pub use backoff::{Backoff, Sleeper, ThreadSleeper};
pub use classifier::{classify, classify_message, Failure};
pub use config::{ConfigError, ConnectionConfig};
pub use connection::{Connection, ConnectionState};
pub use driver::{AdbcConnector, AdbcHandle, Connector, DriverError, DriverHandle};
pub use error::{Error, ErrorCategory, Result};
pub use query_builder::{
    GranteeType, ObjectType, Options, Privilege, QueryBuilder, SchemaObjectKind, Setting,
};
pub use quote::{qualified, quote_identifier, quote_literal, Expr, SqlValue};
pub use result::Row;

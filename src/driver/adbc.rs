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

//! [`Connector`] and [`DriverHandle`] on top of an ADBC driver.
//!
//! The DSN is passed as the database `uri` option together with the
//! username and password, which is what ODBC-bridging ADBC drivers expect.

use super::{Connector, DriverError, DriverHandle};
use crate::result::{BatchRows, Row};
use adbc_core::error::Status;
use adbc_core::options::{OptionDatabase, OptionValue};
use adbc_core::{Connection as _, Database as _, Statement as _};
use arrow_array::{ArrayRef, RecordBatch, StringArray};
use arrow_schema::{ArrowError, DataType, Field, Schema};
use std::sync::Arc;

type DatabaseOf<D> = <D as adbc_core::Driver>::DatabaseType;
type ConnectionOf<D> = <DatabaseOf<D> as adbc_core::Database>::ConnectionType;
type StatementOf<D> = <ConnectionOf<D> as adbc_core::Connection>::StatementType;

/// Opens sessions through an ADBC driver.
#[derive(Debug, Default)]
pub struct AdbcConnector<D> {
    driver: D,
}

impl<D: adbc_core::Driver> AdbcConnector<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

impl<D: adbc_core::Driver> Connector for AdbcConnector<D> {
    type Handle = AdbcHandle<D>;

    fn connect(
        &mut self,
        dsn: &str,
        user: &str,
        password: &str,
    ) -> Result<Self::Handle, DriverError> {
        let opts = [
            (OptionDatabase::Uri, OptionValue::String(dsn.to_string())),
            (OptionDatabase::Username, OptionValue::String(user.to_string())),
            (
                OptionDatabase::Password,
                OptionValue::String(password.to_string()),
            ),
        ];
        let database = self.driver.new_database_with_opts(opts)?;
        let connection = database.new_connection()?;
        Ok(AdbcHandle {
            statement: None,
            connection: Some(connection),
            database: Some(database),
        })
    }
}

/// A live ADBC session.
///
/// Fields drop in declaration order, so the statement goes before the
/// connection and the connection before the database.
pub struct AdbcHandle<D: adbc_core::Driver> {
    statement: Option<StatementOf<D>>,
    connection: Option<ConnectionOf<D>>,
    database: Option<DatabaseOf<D>>,
}

impl<D: adbc_core::Driver> DriverHandle for AdbcHandle<D> {
    type Rows<'a>
        = AdbcRows<'a>
    where
        Self: 'a;

    fn execute(&mut self, sql: &str, params: &[String]) -> Result<AdbcRows<'_>, DriverError> {
        self.statement = None;
        let connection = self.connection.as_mut().ok_or_else(|| {
            DriverError::with_message_and_status("connection is closed", Status::InvalidState)
        })?;
        let statement = self.statement.insert(connection.new_statement()?);
        statement.set_sql_query(sql)?;
        statement.prepare()?;
        if !params.is_empty() {
            statement.bind(bind_batch(params).map_err(arrow_error)?)?;
        }
        let reader = statement.execute()?;
        Ok(AdbcRows(BatchRows::new(Box::new(reader))))
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.statement = None;
        self.connection = None;
        self.database = None;
        Ok(())
    }
}

/// Rows streamed from an ADBC statement.
pub struct AdbcRows<'a>(BatchRows<'a>);

impl Iterator for AdbcRows<'_> {
    type Item = Result<Row, DriverError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|row| row.map_err(arrow_error))
    }
}

/// Builds the one-row parameter batch for positional binding.
fn bind_batch(params: &[String]) -> Result<RecordBatch, ArrowError> {
    let fields: Vec<Field> = (1..=params.len())
        .map(|position| Field::new(position.to_string(), DataType::Utf8, false))
        .collect();
    let columns: Vec<ArrayRef> = params
        .iter()
        .map(|value| Arc::new(StringArray::from(vec![value.as_str()])) as ArrayRef)
        .collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
}

fn arrow_error(err: ArrowError) -> DriverError {
    DriverError::with_message_and_status(err.to_string(), Status::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::cast::AsArray;

    #[test]
    fn test_bind_batch_is_one_positional_row() {
        let params = vec!["a".to_string(), " 'b' ".to_string()];
        let batch = bind_batch(&params).unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.num_columns(), 2);
        assert_eq!(batch.schema().field(0).name(), "1");
        assert_eq!(batch.column(1).as_string::<i32>().value(0), " 'b' ");
    }

    #[test]
    fn test_arrow_error_maps_to_internal() {
        let err = arrow_error(ArrowError::ComputeError("overflow".into()));
        assert_eq!(err.status, Status::Internal);
        assert!(err.message.contains("overflow"));
    }

    #[test]
    fn test_adbc_connector_is_a_connector() {
        fn assert_connector<C: Connector>() {}
        #[allow(dead_code)]
        fn check<D: adbc_core::Driver>() {
            assert_connector::<AdbcConnector<D>>();
        }
    }
}

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

//! Table and session introspection on top of [`Connection`].

use crate::connection::Connection;
use crate::driver::DriverHandle;
use crate::error::{Error, Result};
use crate::query_builder::QueryBuilder;
use crate::result::Row;

impl<H: DriverHandle> Connection<H> {
    /// Returns the `SHOW TABLES` row of `table` in `schema`.
    ///
    /// `LIKE` is a pattern match, so the row is picked by exact name.
    pub fn describe_table(&mut self, schema: &str, table: &str) -> Result<Row> {
        let sql = QueryBuilder::show_table_in_schema(schema, table);
        self.fetch_all(&sql, &[])?
            .into_iter()
            .find(|row| row.get("name") == Some(table))
            .ok_or_else(|| Error::adapter(format!("Table {table} not found in schema {schema}")))
    }

    /// Returns the raw `SHOW COLUMNS` rows of a table.
    pub fn describe_table_columns(&mut self, schema: &str, table: &str) -> Result<Vec<Row>> {
        self.fetch_all(&QueryBuilder::show_columns(schema, table), &[])
    }

    /// Column names in table order.
    pub fn get_table_columns(&mut self, schema: &str, table: &str) -> Result<Vec<String>> {
        Ok(self
            .describe_table_columns(schema, table)?
            .iter()
            .filter_map(|row| row.get("column_name").map(str::to_string))
            .collect())
    }

    /// Names of the primary key columns, in table order.
    pub fn get_table_primary_key(&mut self, schema: &str, table: &str) -> Result<Vec<String>> {
        let rows = self.fetch_all(&QueryBuilder::describe_table(schema, table), &[])?;
        Ok(rows
            .iter()
            .filter(|row| row.get("primary key") == Some("Y"))
            .filter_map(|row| row.get("name").map(str::to_string))
            .collect())
    }

    /// The active role, or `None` when the session has none.
    pub fn current_role(&mut self) -> Result<Option<String>> {
        let rows = self.fetch_all(&QueryBuilder::current_role(), &[])?;
        Ok(rows
            .first()
            .and_then(|row| row.get("name"))
            .map(str::to_string))
    }
}

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

//! Result rows and their conversion from Arrow record batches.

use arrow_array::{RecordBatch, RecordBatchReader};
use arrow_cast::display::array_value_to_string;
use arrow_schema::ArrowError;
use indexmap::IndexMap;

/// A single result row: column name to text value, in column order.
///
/// SQL NULL is represented as `None`; every other value is the text the
/// driver rendered for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: IndexMap<String, Option<String>>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `column`, or `None` if it is NULL or missing.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).and_then(|value| value.as_deref())
    }

    /// Returns true if the row has a column with this exact name.
    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn is_null(&self, column: &str) -> bool {
        matches!(self.columns.get(column), Some(None))
    }

    /// Returns the column names in result order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Option<String>) {
        self.columns.insert(column.into(), value);
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, Option<String>)>>(iter: T) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

/// Reads row `index` of `batch` as text.
pub fn row_at(batch: &RecordBatch, index: usize) -> Result<Row, ArrowError> {
    let schema = batch.schema();
    let mut row = Row::new();
    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        let value = if column.is_null(index) {
            None
        } else {
            Some(array_value_to_string(column, index)?)
        };
        row.insert(field.name().clone(), value);
    }
    Ok(row)
}

/// Streams rows out of a record batch reader, one batch in memory at a time.
pub struct BatchRows<'a> {
    reader: Box<dyn RecordBatchReader + Send + 'a>,
    batch: Option<RecordBatch>,
    position: usize,
}

impl<'a> BatchRows<'a> {
    pub fn new(reader: Box<dyn RecordBatchReader + Send + 'a>) -> Self {
        Self {
            reader,
            batch: None,
            position: 0,
        }
    }
}

impl Iterator for BatchRows<'_> {
    type Item = Result<Row, ArrowError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(batch) = &self.batch {
                if self.position < batch.num_rows() {
                    let row = row_at(batch, self.position);
                    self.position += 1;
                    return Some(row);
                }
            }
            match self.reader.next()? {
                Ok(batch) => {
                    self.batch = Some(batch);
                    self.position = 0;
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

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

//! In-memory driver used by unit tests.

use super::{Connector, DriverError, DriverHandle};
use crate::result::Row;
use adbc_core::error::Status;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Everything the fake driver saw, shared between the test and the handle.
#[derive(Debug, Default)]
pub(crate) struct Journal {
    pub connects: Vec<String>,
    pub executed: Vec<(String, Vec<String>)>,
    pub closes: usize,
}

pub(crate) type SharedJournal = Rc<RefCell<Journal>>;

#[derive(Debug, Clone)]
enum Response {
    Rows(Vec<Row>),
    Fail(String),
}

/// Connector that replays scripted connect results, then succeeds.
#[derive(Debug, Default)]
pub(crate) struct FakeConnector {
    pub journal: SharedJournal,
    connect_failures: VecDeque<String>,
    responses: HashMap<String, Response>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next connect attempt fail with `message`.
    pub fn fail_connect(mut self, message: &str) -> Self {
        self.connect_failures.push_back(message.to_string());
        self
    }

    pub fn respond(mut self, sql: impl Into<String>, rows: Vec<Row>) -> Self {
        self.responses.insert(sql.into(), Response::Rows(rows));
        self
    }

    pub fn fail_on(mut self, sql: impl Into<String>, message: &str) -> Self {
        self.responses
            .insert(sql.into(), Response::Fail(message.to_string()));
        self
    }
}

impl Connector for FakeConnector {
    type Handle = FakeHandle;

    fn connect(&mut self, dsn: &str, _user: &str, _password: &str) -> Result<FakeHandle, DriverError> {
        self.journal.borrow_mut().connects.push(dsn.to_string());
        if let Some(message) = self.connect_failures.pop_front() {
            return Err(DriverError::with_message_and_status(message, Status::IO));
        }
        Ok(FakeHandle {
            journal: Rc::clone(&self.journal),
            responses: self.responses.clone(),
            open: true,
        })
    }
}

#[derive(Debug)]
pub(crate) struct FakeHandle {
    journal: SharedJournal,
    responses: HashMap<String, Response>,
    open: bool,
}

impl DriverHandle for FakeHandle {
    type Rows<'a> = std::vec::IntoIter<Result<Row, DriverError>>;

    fn execute(&mut self, sql: &str, params: &[String]) -> Result<Self::Rows<'_>, DriverError> {
        self.journal
            .borrow_mut()
            .executed
            .push((sql.to_string(), params.to_vec()));
        match self.responses.get(sql) {
            Some(Response::Fail(message)) => Err(DriverError::with_message_and_status(
                message.clone(),
                Status::Unknown,
            )),
            Some(Response::Rows(rows)) => Ok(rows.iter().cloned().map(Ok).collect::<Vec<_>>().into_iter()),
            None => Ok(Vec::new().into_iter()),
        }
    }

    fn close(&mut self) -> Result<(), DriverError> {
        if self.open {
            self.open = false;
            self.journal.borrow_mut().closes += 1;
        }
        Ok(())
    }
}

/// Builds a row from `(column, value)` pairs.
pub(crate) fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(name, value)| (*name, Some(value.to_string())))
        .collect()
}

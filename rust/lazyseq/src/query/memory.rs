//! An in-memory query backend over JSON records.
//!
//! Records are kept as [`serde_json::Value`]s and decoded into the caller's row type
//! by the cursor, one row per `next` call, the way a remote result set is decoded
//! into a typed row.

use std::{fs::File, io::Read, marker::PhantomData, path::Path, sync::Arc};

use lazyseq_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{CursorError, Query, RowCursor};

/// An immutable table of JSON records. Cheap to clone.
#[derive(Clone, Debug, Default)]
pub struct MemoryTable {
    records: Arc<Vec<Value>>,
}

impl MemoryTable {
    pub fn new(records: Vec<Value>) -> MemoryTable {
        MemoryTable {
            records: Arc::new(records),
        }
    }

    /// Loads a table from a JSON array of records.
    pub fn from_reader<R: Read>(reader: R) -> Result<MemoryTable> {
        let value: Value = serde_json::from_reader(reader)
            .map_err(|e| Error::invalid_format("table", e.to_string()))?;
        match value {
            Value::Array(records) => Ok(MemoryTable::new(records)),
            _ => Err(Error::invalid_format("table", "expected a JSON array of records")),
        }
    }

    /// Loads a table from a file holding a JSON array of records.
    pub fn from_path(path: impl AsRef<Path>) -> Result<MemoryTable> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::open(path, e))?;
        MemoryTable::from_reader(std::io::BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A query selecting every record of the table, decoded as `R`.
    pub fn select<R>(&self) -> MemoryQuery<R> {
        MemoryQuery {
            table: self.clone(),
            limit: None,
            _row: PhantomData,
        }
    }
}

/// Selects the records of a [`MemoryTable`], optionally limited to the first `limit`.
#[derive(Clone, Debug)]
pub struct MemoryQuery<R> {
    table: MemoryTable,
    limit: Option<usize>,
    _row: PhantomData<fn() -> R>,
}

impl<R> MemoryQuery<R> {
    pub fn with_limit(mut self, limit: usize) -> MemoryQuery<R> {
        self.limit = Some(limit);
        self
    }
}

impl<R: DeserializeOwned> Query for MemoryQuery<R> {
    type Cursor = MemoryCursor<R>;

    fn read(&self) -> std::result::Result<MemoryCursor<R>, serde_json::Error> {
        let len = self.table.len();
        let end = self.limit.map_or(len, |limit| limit.min(len));
        Ok(MemoryCursor {
            records: self.table.records.clone(),
            position: 0,
            end,
            _row: PhantomData,
        })
    }
}

/// Cursor over the records selected by a [`MemoryQuery`].
pub struct MemoryCursor<R> {
    records: Arc<Vec<Value>>,
    position: usize,
    end: usize,
    _row: PhantomData<fn() -> R>,
}

impl<R: DeserializeOwned> RowCursor for MemoryCursor<R> {
    type Row = R;
    type Error = serde_json::Error;

    fn next(&mut self, row: &mut R) -> std::result::Result<(), CursorError<serde_json::Error>> {
        if self.position >= self.end {
            return Err(CursorError::Done);
        }
        let record = &self.records[self.position];
        self.position += 1;
        *row = R::deserialize(record)?;
        Ok(())
    }
}

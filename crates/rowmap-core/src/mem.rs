//! In-memory cursor over prepared rows.

use crate::cursor::Cursor;
use crate::error::AccessError;
use crate::value::Value;

/// An owned cursor over rows built in memory.
///
/// Useful for tests and for mapping data that never came from a database.
/// Rows are yielded in insertion order; ragged rows are permitted and
/// short cells simply report an index error when read.
#[derive(Debug)]
pub struct MemCursor {
    names: Vec<String>,
    rows: std::vec::IntoIter<Vec<Value>>,
    current: Option<Vec<Value>>,
}

impl MemCursor {
    /// Build a cursor over `rows` with the given column names.
    pub fn new<N, S>(names: N, rows: Vec<Vec<Value>>) -> Self
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            rows: rows.into_iter(),
            current: None,
        }
    }

    /// A cursor with the given column names and no rows.
    pub fn empty<N, S>(names: N) -> Self
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names, Vec::new())
    }

    fn current(&self) -> Result<&[Value], AccessError> {
        self.current.as_deref().ok_or(AccessError::NotOnRow)
    }
}

impl Cursor for MemCursor {
    fn advance(&mut self) -> Result<bool, AccessError> {
        self.current = self.rows.next();
        Ok(self.current.is_some())
    }

    fn column_count(&self) -> usize {
        self.names.len()
    }

    fn column_name(&self, index: usize) -> Result<&str, AccessError> {
        self.names
            .get(index)
            .map(String::as_str)
            .ok_or(AccessError::ColumnIndex {
                index,
                count: self.names.len(),
            })
    }

    fn value_at(&self, index: usize) -> Result<Value, AccessError> {
        let row = self.current()?;
        row.get(index).cloned().ok_or(AccessError::ColumnIndex {
            index,
            count: self.names.len(),
        })
    }
}

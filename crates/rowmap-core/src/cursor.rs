//! Forward-only tabular cursor abstraction.
//!
//! A [`Cursor`] is the engine's only view of a data source: an ordered
//! sequence of rows with named columns. Adapters implement the four
//! required methods; everything else is provided on top of
//! [`value_at`](Cursor::value_at) and may be overridden where the backend
//! has a cheaper path.

use crate::error::AccessError;
use crate::value::{FromValue, Value};

fn coerce<T: FromValue>(value: Value, index: usize) -> Result<T, AccessError> {
    T::from_value(value).map_err(|source| AccessError::Coerce { index, source })
}

/// Forward-only cursor over rows of named columns.
///
/// Indices are zero-based. The cursor starts positioned before the first
/// row; cell accessors are valid only after [`advance`](Cursor::advance)
/// has returned `true`.
pub trait Cursor {
    /// Move to the next row. `false` means the cursor is exhausted.
    fn advance(&mut self) -> Result<bool, AccessError>;

    /// Number of columns in the row shape.
    fn column_count(&self) -> usize;

    /// Name of the column at `index`.
    fn column_name(&self, index: usize) -> Result<&str, AccessError>;

    /// Raw value of the cell at `index` on the current row.
    fn value_at(&self, index: usize) -> Result<Value, AccessError>;

    /// Zero-based index of the column named `name`.
    fn column_index(&self, name: &str) -> Result<usize, AccessError> {
        for index in 0..self.column_count() {
            if self.column_name(index)? == name {
                return Ok(index);
            }
        }
        Err(AccessError::ColumnName {
            name: name.to_string(),
        })
    }

    /// Boolean cell at `index`.
    fn get_bool(&self, index: usize) -> Result<bool, AccessError> {
        coerce(self.value_at(index)?, index)
    }

    /// 8-bit integer cell at `index`.
    fn get_i8(&self, index: usize) -> Result<i8, AccessError> {
        coerce(self.value_at(index)?, index)
    }

    /// 16-bit integer cell at `index`.
    fn get_i16(&self, index: usize) -> Result<i16, AccessError> {
        coerce(self.value_at(index)?, index)
    }

    /// 32-bit integer cell at `index`.
    fn get_i32(&self, index: usize) -> Result<i32, AccessError> {
        coerce(self.value_at(index)?, index)
    }

    /// 64-bit integer cell at `index`.
    fn get_i64(&self, index: usize) -> Result<i64, AccessError> {
        coerce(self.value_at(index)?, index)
    }

    /// 32-bit float cell at `index`.
    fn get_f32(&self, index: usize) -> Result<f32, AccessError> {
        coerce(self.value_at(index)?, index)
    }

    /// 64-bit float cell at `index`.
    fn get_f64(&self, index: usize) -> Result<f64, AccessError> {
        coerce(self.value_at(index)?, index)
    }

    /// Text cell at `index`.
    fn get_text(&self, index: usize) -> Result<String, AccessError> {
        coerce(self.value_at(index)?, index)
    }

    /// Binary cell at `index`.
    fn get_bytes(&self, index: usize) -> Result<Vec<u8>, AccessError> {
        coerce(self.value_at(index)?, index)
    }

    /// Typed cell at `index` via [`FromValue`].
    fn get<T: FromValue>(&self, index: usize) -> Result<T, AccessError>
    where
        Self: Sized,
    {
        coerce(self.value_at(index)?, index)
    }

    /// Typed cell in the column named `name`.
    fn get_named<T: FromValue>(&self, name: &str) -> Result<T, AccessError>
    where
        Self: Sized,
    {
        let index = self.column_index(name)?;
        coerce(self.value_at(index)?, index)
    }
}

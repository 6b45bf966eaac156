//! Cursor over a SQLite result set.

use rowmap_core::{AccessError, Cursor, Error, Value};
use rusqlite::types::ValueRef;
use rusqlite::{Params, Rows, Statement};

/// A [`Cursor`] over the rows of a prepared SQLite statement.
///
/// Column names are captured when the query starts; each `advance`
/// buffers the row's cells into owned [`Value`]s, so reads never touch
/// SQLite after the step that produced them.
pub struct SqliteCursor<'stmt> {
    names: Vec<String>,
    rows: Rows<'stmt>,
    current: Option<Vec<Value>>,
}

impl<'stmt> SqliteCursor<'stmt> {
    /// Run `stmt` with `params` and cursor over its rows.
    pub fn query<P: Params>(stmt: &'stmt mut Statement<'_>, params: P) -> Result<Self, Error> {
        let names = stmt.column_names().into_iter().map(String::from).collect();
        let rows = stmt.query(params).map_err(backend)?;
        Ok(Self {
            names,
            rows,
            current: None,
        })
    }
}

impl Cursor for SqliteCursor<'_> {
    fn advance(&mut self) -> Result<bool, AccessError> {
        let Some(row) = self.rows.next().map_err(backend_access)? else {
            self.current = None;
            return Ok(false);
        };
        let mut cells = Vec::with_capacity(self.names.len());
        for index in 0..self.names.len() {
            let cell = row.get_ref(index).map_err(backend_access)?;
            cells.push(to_value(cell));
        }
        self.current = Some(cells);
        Ok(true)
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
        let row = self.current.as_ref().ok_or(AccessError::NotOnRow)?;
        row.get(index).cloned().ok_or(AccessError::ColumnIndex {
            index,
            count: self.names.len(),
        })
    }
}

fn to_value(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int(v),
        ValueRef::Real(v) => Value::Float(v),
        ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => Value::Bytes(v.to_vec()),
    }
}

fn backend_access(err: rusqlite::Error) -> AccessError {
    AccessError::Backend(Box::new(err))
}

pub(crate) fn backend(err: rusqlite::Error) -> Error {
    backend_access(err).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn sample_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE track (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                seconds REAL NOT NULL,
                cover BLOB,
                rating INTEGER
            );
            INSERT INTO track VALUES (1, 'Intro', 12.5, x'0102', 4);
            INSERT INTO track VALUES (2, 'Outro', 98.25, NULL, NULL);
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_reads_names_and_values() {
        let conn = sample_connection();
        let mut stmt = conn
            .prepare("SELECT id, title, seconds, cover, rating FROM track ORDER BY id")
            .unwrap();
        let mut cursor = SqliteCursor::query(&mut stmt, []).unwrap();

        assert_eq!(cursor.column_count(), 5);
        assert_eq!(cursor.column_name(1).unwrap(), "title");

        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.value_at(0).unwrap(), Value::Int(1));
        assert_eq!(cursor.value_at(1).unwrap(), Value::Text("Intro".into()));
        assert_eq!(cursor.value_at(2).unwrap(), Value::Float(12.5));
        assert_eq!(cursor.value_at(3).unwrap(), Value::Bytes(vec![1, 2]));

        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.value_at(3).unwrap(), Value::Null);
        assert_eq!(cursor.value_at(4).unwrap(), Value::Null);

        assert!(!cursor.advance().unwrap());
    }

    #[test]
    fn test_typed_reads_through_cursor_trait() {
        let conn = sample_connection();
        let mut stmt = conn
            .prepare("SELECT id, title, seconds FROM track WHERE id = ?1")
            .unwrap();
        let mut cursor = SqliteCursor::query(&mut stmt, [1_i64]).unwrap();

        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.get_i64(0).unwrap(), 1);
        assert_eq!(cursor.get_text(1).unwrap(), "Intro");
        assert_eq!(cursor.get_f64(2).unwrap(), 12.5);
        assert_eq!(cursor.get_named::<String>("title").unwrap(), "Intro");
    }

    #[test]
    fn test_read_before_advance_is_rejected() {
        let conn = sample_connection();
        let mut stmt = conn.prepare("SELECT id FROM track").unwrap();
        let cursor = SqliteCursor::query(&mut stmt, []).unwrap();

        assert!(matches!(cursor.value_at(0), Err(AccessError::NotOnRow)));
    }

    #[test]
    fn test_out_of_range_column() {
        let conn = sample_connection();
        let mut stmt = conn.prepare("SELECT id FROM track").unwrap();
        let mut cursor = SqliteCursor::query(&mut stmt, []).unwrap();

        assert!(cursor.advance().unwrap());
        assert!(matches!(
            cursor.value_at(7),
            Err(AccessError::ColumnIndex { index: 7, count: 1 })
        ));
    }
}

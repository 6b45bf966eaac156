//! Rowmap SQLite - Cursor adapter and query helpers over rusqlite.
//!
//! This crate bridges SQLite result sets into the rowmap engine: a
//! [`SqliteCursor`] implements the cursor seam over a prepared
//! statement, and the free functions run a query and hand its rows to a
//! mapper in one call.

mod cursor;

use rowmap_core::collect::vec_mapper;
use rowmap_core::{mapper, Error, Mappable};
use rusqlite::{Connection, Params};
use tracing::trace;

pub use cursor::SqliteCursor;

use cursor::backend;

/// Map every row of `sql` into entities of type `E`.
pub fn query<E, P>(conn: &Connection, sql: &str, params: P) -> Result<Vec<E>, Error>
where
    E: Mappable + Default,
    P: Params,
{
    let mapper = mapper::<E>()?;
    let mut stmt = conn.prepare(sql).map_err(backend)?;
    let mut cursor = SqliteCursor::query(&mut stmt, params)?;
    let entities = vec_mapper(mapper).collect(&mut cursor)?;
    trace!(sql, rows = entities.len(), "mapped query");
    Ok(entities)
}

/// Map the first row of `sql`, if any.
pub fn query_first<E, P>(conn: &Connection, sql: &str, params: P) -> Result<Option<E>, Error>
where
    E: Mappable + Default,
    P: Params,
{
    let mapper = mapper::<E>()?;
    let mut stmt = conn.prepare(sql).map_err(backend)?;
    let mut cursor = SqliteCursor::query(&mut stmt, params)?;
    mapper.map(&mut cursor)
}

/// Execute a statement, returning the affected row count.
pub fn execute<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<usize, Error> {
    conn.execute(sql, params).map_err(backend)
}

/// Turn on foreign key enforcement for the connection.
pub fn enable_foreign_keys(conn: &Connection) -> Result<(), Error> {
    conn.pragma_update(None, "foreign_keys", "ON").map_err(backend)
}

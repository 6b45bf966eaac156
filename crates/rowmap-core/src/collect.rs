//! Row accumulation into containers and untyped row mapping.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::cursor::Cursor;
use crate::error::Error;
use crate::mapper::RowMapper;
use crate::value::Value;

/// Accumulate every remaining row into a container.
///
/// The result always materializes: when the cursor is already exhausted,
/// `empty_value` is returned; otherwise `make_container` starts the
/// container and `add` folds in each mapped row, in cursor order.
/// Deduplication is whatever the container itself does.
pub fn accumulate<M, C>(
    cursor: &mut dyn Cursor,
    mapper: &M,
    make_container: impl FnOnce() -> C,
    mut add: impl FnMut(&mut C, M::Output),
    empty_value: impl FnOnce() -> C,
) -> Result<C, Error>
where
    M: RowMapper + ?Sized,
{
    let Some(first) = mapper.map_row(cursor)? else {
        return Ok(empty_value());
    };
    let mut container = make_container();
    add(&mut container, first);
    while let Some(item) = mapper.map_row(cursor)? {
        add(&mut container, item);
    }
    Ok(container)
}

/// A reusable mapper that folds every remaining row into one container.
///
/// Unlike a plain row mapper it never reports absence: an exhausted
/// cursor yields the empty value, so callers always receive a container.
pub struct CollectionMapper<M: RowMapper, C> {
    mapper: M,
    make_container: Box<dyn Fn() -> C + Send + Sync>,
    add: Box<dyn Fn(&mut C, M::Output) + Send + Sync>,
    empty_value: Box<dyn Fn() -> C + Send + Sync>,
}

impl<M: RowMapper, C> CollectionMapper<M, C> {
    /// Assemble from a row mapper and container callbacks.
    pub fn new(
        mapper: M,
        make_container: impl Fn() -> C + Send + Sync + 'static,
        add: impl Fn(&mut C, M::Output) + Send + Sync + 'static,
        empty_value: impl Fn() -> C + Send + Sync + 'static,
    ) -> Self {
        Self {
            mapper,
            make_container: Box::new(make_container),
            add: Box::new(add),
            empty_value: Box::new(empty_value),
        }
    }

    /// Drain the cursor into one container.
    pub fn collect(&self, cursor: &mut dyn Cursor) -> Result<C, Error> {
        accumulate(
            cursor,
            &self.mapper,
            &*self.make_container,
            |container, item| (self.add)(container, item),
            &*self.empty_value,
        )
    }
}

impl<M: RowMapper, C> RowMapper for CollectionMapper<M, C> {
    type Output = C;

    fn map_row(&self, cursor: &mut dyn Cursor) -> Result<Option<C>, Error> {
        self.collect(cursor).map(Some)
    }
}

/// Collect rows into a `Vec`, empty when the cursor has no rows.
pub fn vec_mapper<M: RowMapper>(mapper: M) -> CollectionMapper<M, Vec<M::Output>>
where
    M::Output: 'static,
{
    CollectionMapper::new(mapper, Vec::new, |items, item| items.push(item), Vec::new)
}

/// Collect rows into a `HashSet`; duplicate rows collapse.
pub fn set_mapper<M>(mapper: M) -> CollectionMapper<M, HashSet<M::Output>>
where
    M: RowMapper,
    M::Output: Eq + Hash + Send + Sync + 'static,
{
    CollectionMapper::new(
        mapper,
        HashSet::new,
        |items, item| {
            items.insert(item);
        },
        HashSet::new,
    )
}

/// Collect rows into a `HashMap` keyed by `key`. A later row with an
/// already-seen key replaces the earlier one.
pub fn keyed_mapper<M, K>(
    mapper: M,
    key: impl Fn(&M::Output) -> K + Send + Sync + 'static,
) -> CollectionMapper<M, HashMap<K, M::Output>>
where
    M: RowMapper,
    M::Output: Send + Sync + 'static,
    K: Eq + Hash + Send + Sync + 'static,
{
    CollectionMapper::new(
        mapper,
        HashMap::new,
        move |items, item| {
            items.insert(key(&item), item);
        },
        HashMap::new,
    )
}

/// Maps one row to a column-name keyed map of raw values.
///
/// The untyped escape hatch: every column is captured, no descriptor
/// involved. With duplicate column names the rightmost wins.
#[derive(Debug, Clone, Default)]
pub struct ValueRowMapper {
    lowercase_keys: bool,
}

impl ValueRowMapper {
    /// Keys exactly as the cursor reports them.
    pub fn new() -> Self {
        Self {
            lowercase_keys: false,
        }
    }

    /// Keys folded to ASCII lowercase.
    pub fn lowercase() -> Self {
        Self {
            lowercase_keys: true,
        }
    }
}

impl RowMapper for ValueRowMapper {
    type Output = HashMap<String, Value>;

    fn map_row(&self, cursor: &mut dyn Cursor) -> Result<Option<Self::Output>, Error> {
        if !cursor.advance()? {
            return Ok(None);
        }
        let mut row = HashMap::with_capacity(cursor.column_count());
        for index in 0..cursor.column_count() {
            let mut name = cursor.column_name(index)?.to_string();
            if self.lowercase_keys {
                name.make_ascii_lowercase();
            }
            row.insert(name, cursor.value_at(index)?);
        }
        Ok(Some(row))
    }
}

//! Process-wide type coercion registry.
//!
//! Maps a field value type to the extraction function used to pull that
//! type out of a cursor cell. Factories consult the registry while a
//! mapper is being built; mappers already built keep the extractor they
//! were built with, so late registrations only affect later builds.

use std::any::{Any, TypeId};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::cursor::Cursor;
use crate::error::{AccessError, Error};
use crate::value::FromValue;

/// Extraction function: reads the cell at `index` from the cursor's
/// current row and returns the erased field value.
pub type Extractor =
    Arc<dyn Fn(&dyn Cursor, usize) -> Result<Box<dyn Any + Send>, Error> + Send + Sync>;

fn reader<T, F>(read: F) -> Extractor
where
    T: Send + 'static,
    F: Fn(&dyn Cursor, usize) -> Result<T, AccessError> + Send + Sync + 'static,
{
    Arc::new(move |cursor, index| Ok(Box::new(read(cursor, index)?) as Box<dyn Any + Send>))
}

/// Extractor that pulls the raw cell and converts through [`FromValue`].
pub(crate) fn from_value_extractor<V: FromValue + Send + 'static>() -> Extractor {
    Arc::new(move |cursor, index| {
        let value = cursor.value_at(index)?;
        let converted =
            V::from_value(value).map_err(|source| AccessError::Coerce { index, source })?;
        Ok(Box::new(converted) as Box<dyn Any + Send>)
    })
}

static COERCIONS: LazyLock<DashMap<TypeId, Extractor>> = LazyLock::new(|| {
    let map = DashMap::new();
    map.insert(TypeId::of::<bool>(), reader(|c: &dyn Cursor, i| c.get_bool(i)));
    map.insert(TypeId::of::<i8>(), reader(|c: &dyn Cursor, i| c.get_i8(i)));
    map.insert(TypeId::of::<i16>(), reader(|c: &dyn Cursor, i| c.get_i16(i)));
    map.insert(TypeId::of::<i32>(), reader(|c: &dyn Cursor, i| c.get_i32(i)));
    map.insert(TypeId::of::<i64>(), reader(|c: &dyn Cursor, i| c.get_i64(i)));
    map.insert(TypeId::of::<f32>(), reader(|c: &dyn Cursor, i| c.get_f32(i)));
    map.insert(TypeId::of::<f64>(), reader(|c: &dyn Cursor, i| c.get_f64(i)));
    map.insert(
        TypeId::of::<Vec<u8>>(),
        reader(|c: &dyn Cursor, i| c.get_bytes(i)),
    );
    map.insert(TypeId::of::<Uuid>(), from_value_extractor::<Uuid>());
    map.insert(
        TypeId::of::<OffsetDateTime>(),
        from_value_extractor::<OffsetDateTime>(),
    );
    map.insert(TypeId::of::<Decimal>(), from_value_extractor::<Decimal>());
    map
});

/// Register (or replace) the extractor for fields of value type `V`.
///
/// Replacement is atomic: concurrent builders observe either the previous
/// extractor or the new one, never a torn entry.
pub fn register<V, F>(read: F)
where
    V: Send + 'static,
    F: Fn(&dyn Cursor, usize) -> Result<V, Error> + Send + Sync + 'static,
{
    debug!(value_type = std::any::type_name::<V>(), "registered coercion");
    COERCIONS.insert(
        TypeId::of::<V>(),
        Arc::new(move |cursor, index| Ok(Box::new(read(cursor, index)?) as Box<dyn Any + Send>)),
    );
}

/// The registered extractor for a value type, if any.
pub fn lookup(type_id: TypeId) -> Option<Extractor> {
    COERCIONS.get(&type_id).map(|entry| entry.clone())
}

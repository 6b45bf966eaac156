//! Rowmap - Declarative row-to-object mapping for SQL-shaped data.
//!
//! This crate bundles the full mapping stack behind one dependency:
//! descriptors, coercions, markers, and the row mapping engine from
//! `rowmap-core`, the `#[derive(Mappable)]` and `#[derive(Symbolic)]`
//! macros from `rowmap-derive` (feature `derive`, on by default), and
//! the `rusqlite` cursor adapter from `rowmap-sqlite` (feature
//! `sqlite`).
//!
//! ```ignore
//! use rowmap::{mapper, vec_mapper, Mappable, MemCursor};
//!
//! #[derive(Debug, Default, Mappable)]
//! #[row(naming = "snake", map_all)]
//! struct User {
//!     id: i64,
//!     display_name: String,
//! }
//!
//! let mut cursor = MemCursor::new(
//!     ["id", "display_name"],
//!     vec![vec![1i64.into(), "ada".into()]],
//! );
//! let users = vec_mapper(mapper::<User>()?).collect(&mut cursor)?;
//! # Ok::<(), rowmap::Error>(())
//! ```

// Core engine exports
pub use rowmap_core::{
    accumulate, build_field, build_mapper, coercion_factory, keyed_mapper, mapper, mapper_factory,
    register_bundle, set_mapper, vec_mapper, AccessError, AssignFn, CoerceError, CoercionFactory,
    CoercionFactoryRef, CollectionMapper, ColumnCase, ColumnPlan, ConfigError, Cursor,
    DefaultCoercionFactory, DefaultMapperFactory, DescriptorBuilder, EntityMapper, Error,
    Extractor, Field, FieldBinding, FieldDescriptor, FieldMapper, FieldMarker, FromValue, Mappable,
    MapperFactory, MapperFactoryRef, MappingError, Marker, MarkerSet, MemCursor, RawMapper,
    RowMapper, SupplyFn, Symbolic, TypeDescriptor, TypeMarker, Value, ValueRowMapper,
};

// Module access for coercion registration and marker resolution
pub use rowmap_core::{marker, registry, resolve};

// Derive macros
#[cfg(feature = "derive")]
pub use rowmap_derive::{Mappable, Symbolic};

// SQLite adapter
#[cfg(feature = "sqlite")]
pub use rowmap_sqlite as sqlite;

/// Single-line import for the common mapping surface.
pub mod prelude {
    pub use rowmap_core::{
        build_mapper, keyed_mapper, mapper, set_mapper, vec_mapper, ColumnCase, Cursor,
        EntityMapper, Error, Field, FromValue, Mappable, MemCursor, RowMapper, Symbolic,
        TypeDescriptor, Value,
    };

    #[cfg(feature = "derive")]
    pub use rowmap_derive::{Mappable, Symbolic};
}

//! Rowmap Core - Descriptor model, coercion registry, and row mapping engine.
//!
//! This crate provides the core mapping machinery for Rowmap: entity
//! descriptors, marker resolution, column-name conventions, value
//! coercion, and the mapper factories that tie a cursor row to an
//! entity instance.

pub mod collect;
pub mod cursor;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod mapper;
pub mod marker;
pub mod mem;
pub mod naming;
pub mod registry;
pub mod resolve;
pub mod symbol;
pub mod value;

pub use collect::{
    accumulate, keyed_mapper, set_mapper, vec_mapper, CollectionMapper, ValueRowMapper,
};
pub use cursor::Cursor;
pub use descriptor::{
    AssignFn, DescriptorBuilder, Field, FieldBinding, FieldDescriptor, Mappable, TypeDescriptor,
};
pub use error::{AccessError, CoerceError, ConfigError, Error, MappingError};
pub use field::{
    build_field, coercion_factory, CoercionFactory, CoercionFactoryRef, DefaultCoercionFactory,
    FieldMapper,
};
pub use mapper::{
    build_mapper, mapper, mapper_factory, ColumnPlan, DefaultMapperFactory, EntityMapper,
    MapperFactory, MapperFactoryRef, RawMapper, RowMapper, SupplyFn,
};
pub use marker::{register_bundle, FieldMarker, Marker, MarkerSet, TypeMarker};
pub use mem::MemCursor;
pub use naming::ColumnCase;
pub use registry::Extractor;
pub use symbol::Symbolic;
pub use value::{FromValue, Value};

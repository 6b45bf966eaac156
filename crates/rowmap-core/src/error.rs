//! Mapping engine error types.
//!
//! Errors fall into three families with distinct lifecycles:
//!
//! - [`ConfigError`] is raised while a mapper is being assembled, before any
//!   row is read. A plan that would silently map nothing is rejected here.
//! - [`MappingError`] is raised while applying a mapper to the current row,
//!   when a cell cannot become the declared field value.
//! - [`AccessError`] originates at the cursor boundary (the underlying data
//!   source) and is propagated unchanged.

use thiserror::Error;

/// Top-level error for the mapping engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Mapper construction failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Applying a mapper to the current row failed.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// The underlying cursor failed.
    #[error(transparent)]
    Access(#[from] AccessError),
}

/// Build-time configuration errors.
///
/// These fire while a mapper is assembled and always name the offending
/// type or marker, so a misconfigured descriptor surfaces immediately
/// instead of producing empty objects at row time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Plan construction found no mappable fields.
    #[error("no mappable fields for entity `{entity}`")]
    NoMappableFields {
        /// Entity type name.
        entity: &'static str,
    },

    /// A bundle marker referenced a name missing from the registry.
    #[error("unknown marker bundle `{name}`")]
    UnknownBundle {
        /// The unresolved bundle name.
        name: String,
    },

    /// An inherited field descriptor targets a different entity type.
    #[error("field `{field}` does not belong to entity `{entity}`")]
    ForeignField {
        /// Field name as declared.
        field: &'static str,
        /// Entity the mapper is being built for.
        entity: &'static str,
    },

    /// A custom factory rejected its input.
    #[error("factory `{factory}` failed for `{subject}`: {reason}")]
    Factory {
        /// Factory type name.
        factory: &'static str,
        /// Field or entity the factory was invoked for.
        subject: &'static str,
        /// Factory-provided detail.
        reason: String,
    },

    /// No extraction path exists for a field's declared value type.
    #[error("no coercion available for field `{field}` of type `{value_type}`")]
    NoCoercion {
        /// Field name as declared.
        field: &'static str,
        /// Declared value type name.
        value_type: &'static str,
    },
}

/// Row-time mapping errors.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A symbolic column value matched none of the declared symbols.
    #[error("column `{column}`: `{value}` is not a known symbol of `{expected}`")]
    UnknownSymbol {
        /// Column name as seen on the cursor.
        column: String,
        /// The offending cell text.
        value: String,
        /// Target enum type name.
        expected: &'static str,
    },

    /// An extracted value could not be assigned to its field.
    #[error("value for field `{field}` does not fit declared type `{expected}`")]
    ValueType {
        /// Target field name.
        field: &'static str,
        /// Declared field type name.
        expected: &'static str,
    },

    /// A type-erased entity was not of the expected concrete type.
    #[error("row produced a value that is not a `{expected}`")]
    EntityType {
        /// Expected entity type name.
        expected: &'static str,
    },
}

/// Errors surfaced by a [`Cursor`](crate::cursor::Cursor).
#[derive(Debug, Error)]
pub enum AccessError {
    /// Column index out of range for the current row shape.
    #[error("column index {index} out of range ({count} columns)")]
    ColumnIndex {
        /// Requested zero-based index.
        index: usize,
        /// Number of columns on the cursor.
        count: usize,
    },

    /// No column with the requested name.
    #[error("no column named `{name}`")]
    ColumnName {
        /// Requested column name.
        name: String,
    },

    /// A cell was read before the first `advance` or after exhaustion.
    #[error("cursor is not positioned on a row")]
    NotOnRow,

    /// A cell value did not convert to the requested type.
    #[error("column index {index}: {source}")]
    Coerce {
        /// Zero-based column index.
        index: usize,
        /// Conversion failure detail.
        #[source]
        source: CoerceError,
    },

    /// Backend-specific failure from the underlying data source.
    #[error("data source error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Value conversion failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    /// The cell held a different kind of value than requested.
    #[error("requested {requested}, found {found}")]
    Kind {
        /// Requested Rust type name.
        requested: &'static str,
        /// Kind of value actually present.
        found: &'static str,
    },

    /// The cell value was out of range for the requested type.
    #[error("value {value} out of range for {requested}")]
    Range {
        /// Requested Rust type name.
        requested: &'static str,
        /// The offending value, rendered as text.
        value: String,
    },

    /// Text did not parse as the requested type.
    #[error("cannot parse as {requested}: {message}")]
    Parse {
        /// Requested Rust type name.
        requested: &'static str,
        /// Parser-provided detail.
        message: String,
    },
}

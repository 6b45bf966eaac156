//! Mapping markers and the process-wide bundle registry.
//!
//! Markers are plain descriptor data. A [`TypeMarker`] opts a type into
//! mapping and carries type-wide options; a [`FieldMarker`] opts a field in
//! (or out) and carries per-field options. Markers attach to descriptors
//! either directly or through named [`Marker::Bundle`] groups, which may
//! nest and are resolved recursively with first-wins precedence.

use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::RwLock;

use crate::field::CoercionFactoryRef;
use crate::mapper::MapperFactoryRef;
use crate::naming::ColumnCase;

/// Type-level mapping options.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeMarker {
    /// Factory override used to assemble the mapper for this type.
    pub factory: Option<MapperFactoryRef>,
    /// Naming convention for fields without an explicit column override.
    pub naming: ColumnCase,
    /// Match column names case-insensitively.
    pub ignore_case: bool,
    /// Map every field, including those without a field marker.
    pub map_all_fields: bool,
}

impl TypeMarker {
    /// Marker with defaults: no factory, verbatim naming, case-sensitive,
    /// marked fields only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mapper factory override.
    pub fn with_factory(mut self, factory: MapperFactoryRef) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Set the naming convention.
    pub fn with_naming(mut self, naming: ColumnCase) -> Self {
        self.naming = naming;
        self
    }

    /// Match column names case-insensitively.
    pub fn with_ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    /// Map all fields, marked or not.
    pub fn with_map_all_fields(mut self) -> Self {
        self.map_all_fields = true;
        self
    }
}

/// Field-level mapping options.
#[derive(Debug, Clone, Default)]
pub struct FieldMarker {
    /// Column name override. Blank overrides fall back to the naming
    /// convention.
    pub column: Option<String>,
    /// Coercion factory override for this field.
    pub factory: Option<CoercionFactoryRef>,
    /// Exclude the field from mapping entirely.
    pub ignore: bool,
}

impl FieldMarker {
    /// Marker with defaults: convention-derived column, default coercion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the column name override.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the coercion factory override.
    pub fn with_factory(mut self, factory: CoercionFactoryRef) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Exclude the field from mapping.
    pub fn with_ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// The column override, ignoring blank values.
    pub fn column_override(&self) -> Option<&str> {
        self.column
            .as_deref()
            .filter(|column| !column.trim().is_empty())
    }
}

/// A marker attached to a type or field descriptor.
#[derive(Debug, Clone)]
pub enum Marker {
    /// Type-level options.
    Type(TypeMarker),
    /// Field-level options.
    Field(FieldMarker),
    /// A named group of markers from the bundle registry.
    Bundle(&'static str),
    /// A foundational tag with no mapping meaning of its own. Tags are
    /// never expanded and never recorded.
    Tag(&'static str),
}

static BUNDLES: LazyLock<RwLock<HashMap<&'static str, Vec<Marker>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Register a named marker bundle process-wide.
///
/// Bundles may reference other bundles; self-referential graphs are
/// tolerated at resolution time. Registering an existing name replaces the
/// previous definition for all mappers built afterwards.
pub fn register_bundle(name: &'static str, markers: Vec<Marker>) {
    BUNDLES.write().insert(name, markers);
}

/// Look up a bundle's markers. Clones, so resolution never holds the lock.
pub(crate) fn bundle_markers(name: &str) -> Option<Vec<Marker>> {
    BUNDLES.read().get(name).cloned()
}

/// The resolved marker table for one descriptor: at most one effective
/// marker of each kind, first discovered wins.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    type_marker: Option<TypeMarker>,
    field_marker: Option<FieldMarker>,
}

impl MarkerSet {
    /// The effective type marker, if any was discovered.
    pub fn type_marker(&self) -> Option<&TypeMarker> {
        self.type_marker.as_ref()
    }

    /// The effective field marker, if any was discovered.
    pub fn field_marker(&self) -> Option<&FieldMarker> {
        self.field_marker.as_ref()
    }

    pub(crate) fn record_type(&mut self, marker: TypeMarker) {
        if self.type_marker.is_none() {
            self.type_marker = Some(marker);
        }
    }

    pub(crate) fn record_field(&mut self, marker: &FieldMarker) {
        if self.field_marker.is_none() {
            self.field_marker = Some(marker.clone());
        }
    }

    /// Fill kinds this set is missing from `other`. Existing entries are
    /// never displaced.
    pub(crate) fn fill_from(&mut self, other: &MarkerSet) {
        if let Some(marker) = other.type_marker {
            self.record_type(marker);
        }
        if let Some(marker) = &other.field_marker {
            self.record_field(marker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_recorded_marker_wins() {
        let mut set = MarkerSet::default();
        set.record_type(TypeMarker::new().with_ignore_case());
        set.record_type(TypeMarker::new().with_map_all_fields());

        let effective = set.type_marker().unwrap();
        assert!(effective.ignore_case);
        assert!(!effective.map_all_fields);
    }

    #[test]
    fn test_fill_from_only_fills_gaps() {
        let mut set = MarkerSet::default();
        set.record_field(&FieldMarker::new().with_column("id"));

        let mut other = MarkerSet::default();
        other.record_type(TypeMarker::new().with_map_all_fields());
        other.record_field(&FieldMarker::new().with_column("other"));

        set.fill_from(&other);
        assert!(set.type_marker().unwrap().map_all_fields);
        assert_eq!(set.field_marker().unwrap().column.as_deref(), Some("id"));
    }

    #[test]
    fn test_blank_column_override_is_ignored() {
        assert_eq!(FieldMarker::new().column_override(), None);
        assert_eq!(
            FieldMarker::new().with_column("  ").column_override(),
            None
        );
        assert_eq!(
            FieldMarker::new().with_column("user_id").column_override(),
            Some("user_id")
        );
    }
}

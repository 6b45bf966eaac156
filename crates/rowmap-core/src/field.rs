//! Per-field mapper construction.
//!
//! A field mapper pairs the extractor chosen for a field with its erased
//! assignment. Both choices happen once, while the entity mapper is
//! built; rows then reuse the same pair. The extractor choice goes
//! through a [`CoercionFactory`], overridable per field through a marker.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use tracing::trace;

use crate::cursor::Cursor;
use crate::descriptor::{AssignFn, FieldBinding, FieldDescriptor};
use crate::error::{ConfigError, Error};
use crate::marker::TypeMarker;
use crate::registry::{self, Extractor};
use crate::resolve::resolve_markers;

/// Chooses the extractor for one field while a mapper is being built.
pub trait CoercionFactory: Send + Sync {
    /// The extractor used for this field on every subsequent row.
    fn extractor(&self, binding: &FieldBinding) -> Result<Extractor, Error>;
}

/// Default extractor choice: symbolic fields resolve symbols, registered
/// value types read through the registry, everything else converts
/// through `FromValue`.
///
/// Symbolic fields never consult the registry; declaring a field symbolic
/// is the stronger statement.
#[derive(Debug, Default)]
pub struct DefaultCoercionFactory;

impl CoercionFactory for DefaultCoercionFactory {
    fn extractor(&self, binding: &FieldBinding) -> Result<Extractor, Error> {
        if let Some(symbolic) = binding.symbolic() {
            return Ok(symbolic);
        }
        if let Some(found) = registry::lookup(binding.value_type()) {
            return Ok(found);
        }
        binding.fallback().ok_or_else(|| {
            ConfigError::NoCoercion {
                field: binding.name(),
                value_type: binding.value_type_name(),
            }
            .into()
        })
    }
}

static COERCION_FACTORIES: LazyLock<DashMap<TypeId, Arc<dyn CoercionFactory>>> =
    LazyLock::new(DashMap::new);

/// Reference to a coercion factory type: identity plus construction.
///
/// References are plain data so they can live inside markers. The factory
/// instance itself is constructed once per process and shared.
#[derive(Debug, Clone, Copy)]
pub struct CoercionFactoryRef {
    type_id: TypeId,
    type_name: &'static str,
    construct: fn() -> Arc<dyn CoercionFactory>,
}

impl CoercionFactoryRef {
    /// Factory type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn instance(&self) -> Arc<dyn CoercionFactory> {
        if let Some(found) = COERCION_FACTORIES.get(&self.type_id) {
            return found.clone();
        }
        let entry = COERCION_FACTORIES
            .entry(self.type_id)
            .or_insert_with(self.construct);
        entry.clone()
    }
}

/// Reference the coercion factory type `F`.
pub fn coercion_factory<F>() -> CoercionFactoryRef
where
    F: CoercionFactory + Default + 'static,
{
    fn construct<F: CoercionFactory + Default + 'static>() -> Arc<dyn CoercionFactory> {
        Arc::new(F::default())
    }
    CoercionFactoryRef {
        type_id: TypeId::of::<F>(),
        type_name: std::any::type_name::<F>(),
        construct: construct::<F>,
    }
}

/// One column's worth of mapping work: extract, then assign.
#[derive(Clone)]
pub struct FieldMapper {
    field: &'static str,
    extract: Extractor,
    assign: AssignFn,
}

impl FieldMapper {
    /// Pair a field descriptor with its chosen extractor.
    pub fn new(field: &FieldDescriptor, extract: Extractor) -> Self {
        Self {
            field: field.name(),
            extract,
            assign: field.assign_fn(),
        }
    }

    /// Field name as declared on the entity.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Extract the cell at `index` and assign it into `entity`.
    pub fn apply(
        &self,
        cursor: &dyn Cursor,
        index: usize,
        entity: &mut dyn Any,
    ) -> Result<(), Error> {
        let value = (self.extract)(cursor, index)?;
        (self.assign)(entity, value)
    }
}

impl fmt::Debug for FieldMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMapper")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

/// Resolve one field into its column name and mapper.
///
/// The column name is the field marker's non-blank override when present,
/// otherwise the owning type's naming convention applied to the field
/// name. The extractor comes from the field's factory override, or the
/// default coercion.
pub fn build_field(
    field: &FieldDescriptor,
    type_marker: &TypeMarker,
) -> Result<(String, FieldMapper), Error> {
    let markers = resolve_markers(field.markers())?;
    let field_marker = markers.field_marker();

    let column = field_marker
        .and_then(|m| m.column_override())
        .map(str::to_string)
        .unwrap_or_else(|| type_marker.naming.column_name(field.name()));

    let factory_ref = field_marker
        .and_then(|m| m.factory)
        .unwrap_or_else(coercion_factory::<DefaultCoercionFactory>);
    let extract = factory_ref.instance().extractor(field.binding())?;

    trace!(field = field.name(), column = %column, "bound field");
    Ok((column, FieldMapper::new(field, extract)))
}

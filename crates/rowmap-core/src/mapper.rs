//! Entity mapper assembly and row mapping.
//!
//! The mapper itself is type-erased: a [`RawMapper`] owns an entity
//! supplier and a [`ColumnPlan`], and maps rows into boxed entities. The
//! erasure keeps the factory seam object-safe so descriptors can swap
//! factories at runtime; [`EntityMapper`] restores typing at the public
//! boundary.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use tracing::debug;

use crate::cursor::Cursor;
use crate::descriptor::{Mappable, TypeDescriptor};
use crate::error::{ConfigError, Error, MappingError};
use crate::field::{build_field, FieldMapper};
use crate::marker::MarkerSet;
use crate::resolve::{resolve_markers, resolve_type_markers};

/// Erased entity constructor.
pub type SupplyFn = Arc<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>;

/// Maps the next cursor row to a value.
///
/// The composition seam shared by entity mappers, collection mappers, and
/// the untyped value-row mapper.
pub trait RowMapper {
    /// Mapped output.
    type Output;

    /// Advance the cursor and map the row it lands on. `None` means the
    /// cursor was already exhausted.
    fn map_row(&self, cursor: &mut dyn Cursor) -> Result<Option<Self::Output>, Error>;
}

/// Column-name keyed field mappers with first-wins insertion.
#[derive(Clone, Default)]
pub struct ColumnPlan {
    entries: HashMap<String, FieldMapper>,
    ignore_case: bool,
}

impl ColumnPlan {
    /// An empty plan. Case-insensitive plans fold keys to ASCII lowercase
    /// on both insertion and lookup.
    pub fn new(ignore_case: bool) -> Self {
        Self {
            entries: HashMap::new(),
            ignore_case,
        }
    }

    /// Plan a column unless it is already planned.
    pub fn insert(&mut self, column: String, mapper: FieldMapper) {
        let key = if self.ignore_case {
            column.to_ascii_lowercase()
        } else {
            column
        };
        self.entries.entry(key).or_insert(mapper);
    }

    /// The mapper planned for `column`, if any.
    pub fn get(&self, column: &str) -> Option<&FieldMapper> {
        if self.ignore_case {
            self.entries.get(&column.to_ascii_lowercase())
        } else {
            self.entries.get(column)
        }
    }

    /// Number of planned columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the plan maps nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ColumnPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut columns: Vec<_> = self.entries.keys().collect();
        columns.sort();
        f.debug_struct("ColumnPlan")
            .field("columns", &columns)
            .field("ignore_case", &self.ignore_case)
            .finish()
    }
}

/// Type-erased entity mapper: supplier plus column plan.
///
/// Immutable once built; shared freely across threads.
pub struct RawMapper {
    entity: &'static str,
    entity_id: TypeId,
    supply: SupplyFn,
    plan: ColumnPlan,
}

impl RawMapper {
    /// Assemble a mapper. A plan that maps nothing is rejected so a
    /// misconfigured type cannot silently produce untouched entities.
    pub fn new(
        entity: &'static str,
        entity_id: TypeId,
        supply: SupplyFn,
        plan: ColumnPlan,
    ) -> Result<Self, Error> {
        if plan.is_empty() {
            return Err(ConfigError::NoMappableFields { entity }.into());
        }
        Ok(Self {
            entity,
            entity_id,
            supply,
            plan,
        })
    }

    /// Entity type name.
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Entity type id.
    pub fn entity_id(&self) -> TypeId {
        self.entity_id
    }

    /// The plan driving this mapper.
    pub fn plan(&self) -> &ColumnPlan {
        &self.plan
    }

    /// Map the next row into an erased entity.
    ///
    /// Columns the plan does not cover are skipped; planned columns the
    /// cursor lacks leave their fields at the supplier's value. The first
    /// failing cell aborts the row, so no partial entity escapes.
    pub fn map_raw(&self, cursor: &mut dyn Cursor) -> Result<Option<Box<dyn Any + Send>>, Error> {
        if !cursor.advance()? {
            return Ok(None);
        }
        let mut entity = (self.supply)();
        for index in 0..cursor.column_count() {
            let Some(mapper) = self.plan.get(cursor.column_name(index)?) else {
                continue;
            };
            mapper.apply(cursor, index, &mut *entity)?;
        }
        Ok(Some(entity))
    }
}

impl fmt::Debug for RawMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawMapper")
            .field("entity", &self.entity)
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

/// Assembles mappers from resolved descriptors.
///
/// The type-level override seam: a type marker may name a factory type,
/// and that factory builds the mapper instead of the default one.
pub trait MapperFactory: Send + Sync {
    /// Build the mapper for `ty` given its resolved markers and entity
    /// supplier.
    fn build(
        &self,
        ty: &TypeDescriptor,
        markers: &MarkerSet,
        supply: SupplyFn,
    ) -> Result<RawMapper, Error>;
}

/// Default mapper assembly.
///
/// Walks own fields first and then the ancestor chain, applies the
/// inclusion rule (marked fields, or all fields when the type opts in,
/// minus ignored ones), and plans each included field under its column
/// name with first-wins precedence, so a type's own field shadows a
/// same-named ancestor column.
#[derive(Debug, Default)]
pub struct DefaultMapperFactory;

impl MapperFactory for DefaultMapperFactory {
    fn build(
        &self,
        ty: &TypeDescriptor,
        markers: &MarkerSet,
        supply: SupplyFn,
    ) -> Result<RawMapper, Error> {
        let type_marker = markers.type_marker().copied().unwrap_or_default();
        let mut plan = ColumnPlan::new(type_marker.ignore_case);

        for field in ty.all_fields() {
            if field.target() != ty.entity_id() {
                return Err(ConfigError::ForeignField {
                    field: field.name(),
                    entity: ty.entity(),
                }
                .into());
            }
            let field_markers = resolve_markers(field.markers())?;
            let included = match field_markers.field_marker() {
                Some(marker) => !marker.ignore,
                None => type_marker.map_all_fields,
            };
            if !included {
                continue;
            }
            let (column, mapper) = build_field(field, &type_marker)?;
            plan.insert(column, mapper);
        }

        debug!(entity = ty.entity(), columns = plan.len(), "built entity mapper");
        RawMapper::new(ty.entity(), ty.entity_id(), supply, plan)
    }
}

static MAPPER_FACTORIES: LazyLock<DashMap<TypeId, Arc<dyn MapperFactory>>> =
    LazyLock::new(DashMap::new);

/// Reference to a mapper factory type: identity plus construction.
#[derive(Debug, Clone, Copy)]
pub struct MapperFactoryRef {
    type_id: TypeId,
    type_name: &'static str,
    construct: fn() -> Arc<dyn MapperFactory>,
}

impl MapperFactoryRef {
    /// Factory type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn instance(&self) -> Arc<dyn MapperFactory> {
        if let Some(found) = MAPPER_FACTORIES.get(&self.type_id) {
            return found.clone();
        }
        let entry = MAPPER_FACTORIES
            .entry(self.type_id)
            .or_insert_with(self.construct);
        entry.clone()
    }
}

/// Reference the mapper factory type `F`.
pub fn mapper_factory<F>() -> MapperFactoryRef
where
    F: MapperFactory + Default + 'static,
{
    fn construct<F: MapperFactory + Default + 'static>() -> Arc<dyn MapperFactory> {
        Arc::new(F::default())
    }
    MapperFactoryRef {
        type_id: TypeId::of::<F>(),
        type_name: std::any::type_name::<F>(),
        construct: construct::<F>,
    }
}

static MAPPERS: LazyLock<DashMap<TypeId, Arc<RawMapper>>> = LazyLock::new(DashMap::new);

/// Build the mapper for `E`, supplying fresh entities with `supply`.
///
/// Mappers are cached per entity type; concurrent first builds may race
/// and the first inserted mapper wins, which is sound because racing
/// builds of the same type produce behaviorally identical mappers.
pub fn build_mapper<E: Mappable>(
    supply: impl Fn() -> E + Send + Sync + 'static,
) -> Result<EntityMapper<E>, Error> {
    let entity_id = TypeId::of::<E>();
    if let Some(found) = MAPPERS.get(&entity_id) {
        return Ok(EntityMapper::from_raw(found.clone()));
    }

    let ty = E::descriptor();
    let markers = resolve_type_markers(&ty)?;
    let factory_ref = markers
        .type_marker()
        .and_then(|m| m.factory)
        .unwrap_or_else(mapper_factory::<DefaultMapperFactory>);
    let supply: SupplyFn = Arc::new(move || Box::new(supply()) as Box<dyn Any + Send>);

    let raw = factory_ref.instance().build(&ty, &markers, supply)?;
    if raw.entity_id() != entity_id {
        return Err(ConfigError::Factory {
            factory: factory_ref.type_name(),
            subject: ty.entity(),
            reason: "produced a mapper for a different entity type".to_string(),
        }
        .into());
    }

    let entry = MAPPERS.entry(entity_id).or_insert_with(|| Arc::new(raw));
    Ok(EntityMapper::from_raw(entry.clone()))
}

/// Build the mapper for `E` using `E::default` as the supplier.
pub fn mapper<E: Mappable + Default>() -> Result<EntityMapper<E>, Error> {
    build_mapper(E::default)
}

/// Typed mapper for entity `E`.
///
/// Cheap to clone; clones share the underlying plan.
pub struct EntityMapper<E> {
    raw: Arc<RawMapper>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityMapper<E> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for EntityMapper<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMapper")
            .field("raw", &self.raw)
            .finish()
    }
}

impl<E: Send + 'static> EntityMapper<E> {
    pub(crate) fn from_raw(raw: Arc<RawMapper>) -> Self {
        Self {
            raw,
            _entity: PhantomData,
        }
    }

    /// The type-erased mapper underneath.
    pub fn raw(&self) -> &Arc<RawMapper> {
        &self.raw
    }

    /// Map the next row. `None` when the cursor is exhausted.
    pub fn map(&self, cursor: &mut dyn Cursor) -> Result<Option<E>, Error> {
        match self.raw.map_raw(cursor)? {
            Some(entity) => match entity.downcast::<E>() {
                Ok(entity) => Ok(Some(*entity)),
                Err(_) => Err(MappingError::EntityType {
                    expected: std::any::type_name::<E>(),
                }
                .into()),
            },
            None => Ok(None),
        }
    }
}

impl<E: Send + 'static> RowMapper for EntityMapper<E> {
    type Output = E;

    fn map_row(&self, cursor: &mut dyn Cursor) -> Result<Option<E>, Error> {
        self.map(cursor)
    }
}

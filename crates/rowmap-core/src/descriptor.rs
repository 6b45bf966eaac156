//! Static type descriptors and their builders.
//!
//! A [`TypeDescriptor`] is the declarative record a mapper is built from:
//! the entity type, its markers, its fields with their erased setters, and
//! an optional ancestor descriptor whose fields and markers compose in
//! behind the type's own. Descriptors are type-erased so factories can be
//! swapped through object-safe seams; the typed builders keep construction
//! safe at the edges.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::cursor::Cursor;
use crate::error::{AccessError, Error, MappingError};
use crate::field::CoercionFactoryRef;
use crate::mapper::MapperFactoryRef;
use crate::marker::{FieldMarker, Marker, TypeMarker};
use crate::naming::ColumnCase;
use crate::registry::{from_value_extractor, Extractor};
use crate::symbol::Symbolic;
use crate::value::FromValue;

/// Erased field assignment: place an extracted value into an entity.
pub type AssignFn =
    Arc<dyn Fn(&mut dyn Any, Box<dyn Any + Send>) -> Result<(), Error> + Send + Sync>;

/// A type with a static descriptor, buildable from cursor rows.
pub trait Mappable: Send + Sized + 'static {
    /// The descriptor mapper construction is driven by.
    fn descriptor() -> Arc<TypeDescriptor>;
}

/// Descriptor of one mappable type.
pub struct TypeDescriptor {
    entity: &'static str,
    entity_id: TypeId,
    markers: Vec<Marker>,
    fields: Vec<FieldDescriptor>,
    extends: Option<Arc<TypeDescriptor>>,
}

impl TypeDescriptor {
    /// Start a descriptor for entity type `E`.
    pub fn builder<E: Send + 'static>() -> DescriptorBuilder<E> {
        DescriptorBuilder::new()
    }

    /// Entity type name.
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Entity type id.
    pub fn entity_id(&self) -> TypeId {
        self.entity_id
    }

    /// Markers attached to the type itself.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// The type's own fields, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Ancestor descriptor, if the type extends one.
    pub fn extends(&self) -> Option<&Arc<TypeDescriptor>> {
        self.extends.as_ref()
    }

    /// Own fields first, then each ancestor's, nearest ancestor first.
    pub fn all_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        let mut chain = Vec::new();
        let mut node = Some(self);
        while let Some(ty) = node {
            chain.push(ty);
            node = ty.extends.as_deref();
        }
        chain.into_iter().flat_map(|ty| ty.fields.iter())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("entity", &self.entity)
            .field("fields", &self.fields)
            .field("extends", &self.extends)
            .finish_non_exhaustive()
    }
}

/// Descriptor of one field within a type.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    target: TypeId,
    markers: Vec<Marker>,
    binding: FieldBinding,
    assign: AssignFn,
}

impl FieldDescriptor {
    /// Field name as declared.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Markers attached to the field.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// The binding handed to coercion factories.
    pub fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    /// Entity type this field belongs to.
    pub(crate) fn target(&self) -> TypeId {
        self.target
    }

    /// Assign an extracted value to the erased entity.
    pub fn assign(&self, entity: &mut dyn Any, value: Box<dyn Any + Send>) -> Result<(), Error> {
        (self.assign)(entity, value)
    }

    pub(crate) fn assign_fn(&self) -> AssignFn {
        self.assign.clone()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.binding.value_type_name)
            .finish_non_exhaustive()
    }
}

/// What a coercion factory sees of one field when choosing its extractor.
#[derive(Clone)]
pub struct FieldBinding {
    name: &'static str,
    value_type: TypeId,
    value_type_name: &'static str,
    fallback: Option<Extractor>,
    symbolic: Option<Extractor>,
}

impl FieldBinding {
    /// Field name as declared.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared value type.
    pub fn value_type(&self) -> TypeId {
        self.value_type
    }

    /// Declared value type name, for diagnostics.
    pub fn value_type_name(&self) -> &'static str {
        self.value_type_name
    }

    /// Monomorphized conversion through [`FromValue`]. Absent for fields
    /// declared with [`Field::custom`], whose value types convert only
    /// through the registry or a factory override.
    pub fn fallback(&self) -> Option<Extractor> {
        self.fallback.clone()
    }

    /// Symbol-resolving extractor, present only for symbolic fields.
    pub fn symbolic(&self) -> Option<Extractor> {
        self.symbolic.clone()
    }
}

fn assign_fn<E, V>(
    name: &'static str,
    setter: impl Fn(&mut E, V) + Send + Sync + 'static,
) -> AssignFn
where
    E: Send + 'static,
    V: Send + 'static,
{
    Arc::new(move |entity, value| {
        let entity = entity.downcast_mut::<E>().ok_or(MappingError::EntityType {
            expected: std::any::type_name::<E>(),
        })?;
        let value = value.downcast::<V>().map_err(|_| MappingError::ValueType {
            field: name,
            expected: std::any::type_name::<V>(),
        })?;
        setter(entity, *value);
        Ok(())
    })
}

fn unknown_symbol<V: Symbolic>(cursor: &dyn Cursor, index: usize, value: String) -> Error {
    MappingError::UnknownSymbol {
        column: cursor.column_name(index).unwrap_or("?").to_string(),
        value,
        expected: std::any::type_name::<V>(),
    }
    .into()
}

fn symbol_extractor<V: Symbolic>() -> Extractor {
    Arc::new(move |cursor, index| {
        let text = cursor.get_text(index)?;
        match V::from_symbol(&text) {
            Some(variant) => Ok(Box::new(variant) as Box<dyn Any + Send>),
            None => Err(unknown_symbol::<V>(cursor, index, text)),
        }
    })
}

fn symbol_opt_extractor<V: Symbolic>() -> Extractor {
    Arc::new(move |cursor, index| {
        let value = cursor.value_at(index)?;
        if value.is_null() {
            return Ok(Box::new(None::<V>) as Box<dyn Any + Send>);
        }
        let text =
            String::from_value(value).map_err(|source| AccessError::Coerce { index, source })?;
        match V::from_symbol(&text) {
            Some(variant) => Ok(Box::new(Some(variant)) as Box<dyn Any + Send>),
            None => Err(unknown_symbol::<V>(cursor, index, text)),
        }
    })
}

/// Builder for one field of entity `E`.
///
/// The value type is erased immediately; what remains is the field name,
/// its markers, and the erased extraction and assignment hooks.
pub struct Field<E> {
    name: &'static str,
    markers: Vec<Marker>,
    direct: Option<(usize, FieldMarker)>,
    binding: FieldBinding,
    assign: AssignFn,
    _entity: PhantomData<fn(&mut E)>,
}

impl<E: Send + 'static> Field<E> {
    /// A field whose value converts through [`FromValue`].
    pub fn new<V>(name: &'static str, setter: impl Fn(&mut E, V) + Send + Sync + 'static) -> Self
    where
        V: FromValue + Send + 'static,
    {
        Self {
            name,
            markers: Vec::new(),
            direct: None,
            binding: FieldBinding {
                name,
                value_type: TypeId::of::<V>(),
                value_type_name: std::any::type_name::<V>(),
                fallback: Some(from_value_extractor::<V>()),
                symbolic: None,
            },
            assign: assign_fn::<E, V>(name, setter),
            _entity: PhantomData,
        }
    }

    /// A field whose value type has no [`FromValue`] conversion.
    ///
    /// Extraction must come from the registry or a factory override;
    /// building a mapper fails if neither provides one.
    pub fn custom<V>(name: &'static str, setter: impl Fn(&mut E, V) + Send + Sync + 'static) -> Self
    where
        V: Send + 'static,
    {
        Self {
            name,
            markers: Vec::new(),
            direct: None,
            binding: FieldBinding {
                name,
                value_type: TypeId::of::<V>(),
                value_type_name: std::any::type_name::<V>(),
                fallback: None,
                symbolic: None,
            },
            assign: assign_fn::<E, V>(name, setter),
            _entity: PhantomData,
        }
    }

    /// A field holding a [`Symbolic`] enum stored as text.
    pub fn symbolic<V>(
        name: &'static str,
        setter: impl Fn(&mut E, V) + Send + Sync + 'static,
    ) -> Self
    where
        V: Symbolic,
    {
        let symbolic = symbol_extractor::<V>();
        Self {
            name,
            markers: Vec::new(),
            direct: None,
            binding: FieldBinding {
                name,
                value_type: TypeId::of::<V>(),
                value_type_name: std::any::type_name::<V>(),
                fallback: Some(symbolic.clone()),
                symbolic: Some(symbolic),
            },
            assign: assign_fn::<E, V>(name, setter),
            _entity: PhantomData,
        }
    }

    /// A nullable [`Symbolic`] enum field; a null cell becomes `None`.
    pub fn symbolic_opt<V>(
        name: &'static str,
        setter: impl Fn(&mut E, Option<V>) + Send + Sync + 'static,
    ) -> Self
    where
        V: Symbolic,
    {
        let symbolic = symbol_opt_extractor::<V>();
        Self {
            name,
            markers: Vec::new(),
            direct: None,
            binding: FieldBinding {
                name,
                value_type: TypeId::of::<Option<V>>(),
                value_type_name: std::any::type_name::<Option<V>>(),
                fallback: Some(symbolic.clone()),
                symbolic: Some(symbolic),
            },
            assign: assign_fn::<E, Option<V>>(name, setter),
            _entity: PhantomData,
        }
    }

    /// Set the column name override.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.direct_mut().column = Some(column.into());
        self
    }

    /// Set the coercion factory override.
    pub fn with_factory(mut self, factory: CoercionFactoryRef) -> Self {
        self.direct_mut().factory = Some(factory);
        self
    }

    /// Exclude the field from mapping.
    pub fn with_ignore(mut self) -> Self {
        self.direct_mut().ignore = true;
        self
    }

    /// Attach a marker.
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Attach a bundle reference.
    pub fn with_bundle(mut self, name: &'static str) -> Self {
        self.markers.push(Marker::Bundle(name));
        self
    }

    /// Attach an inert tag.
    pub fn with_tag(mut self, name: &'static str) -> Self {
        self.markers.push(Marker::Tag(name));
        self
    }

    /// The direct field marker, created at the current marker position on
    /// first use so later sugar calls merge into it.
    fn direct_mut(&mut self) -> &mut FieldMarker {
        let at = self.markers.len();
        &mut self.direct.get_or_insert_with(|| (at, FieldMarker::new())).1
    }

    fn into_descriptor(self) -> FieldDescriptor {
        let mut markers = self.markers;
        if let Some((at, marker)) = self.direct {
            markers.insert(at, Marker::Field(marker));
        }
        FieldDescriptor {
            name: self.name,
            target: TypeId::of::<E>(),
            markers,
            binding: self.binding,
            assign: self.assign,
        }
    }
}

/// Builder for a [`TypeDescriptor`] of entity `E`.
pub struct DescriptorBuilder<E> {
    entity: &'static str,
    markers: Vec<Marker>,
    direct: Option<(usize, TypeMarker)>,
    fields: Vec<FieldDescriptor>,
    extends: Option<Arc<TypeDescriptor>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Send + 'static> DescriptorBuilder<E> {
    fn new() -> Self {
        Self {
            entity: std::any::type_name::<E>(),
            markers: Vec::new(),
            direct: None,
            fields: Vec::new(),
            extends: None,
            _entity: PhantomData,
        }
    }

    /// Set the naming convention for unoverridden columns.
    pub fn with_naming(mut self, naming: ColumnCase) -> Self {
        self.direct_mut().naming = naming;
        self
    }

    /// Match column names case-insensitively.
    pub fn with_ignore_case(mut self) -> Self {
        self.direct_mut().ignore_case = true;
        self
    }

    /// Map all fields, marked or not.
    pub fn with_map_all_fields(mut self) -> Self {
        self.direct_mut().map_all_fields = true;
        self
    }

    /// Set the mapper factory override.
    pub fn with_factory(mut self, factory: MapperFactoryRef) -> Self {
        self.direct_mut().factory = Some(factory);
        self
    }

    /// Attach a marker.
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Attach a bundle reference.
    pub fn with_bundle(mut self, name: &'static str) -> Self {
        self.markers.push(Marker::Bundle(name));
        self
    }

    /// Attach an inert tag.
    pub fn with_tag(mut self, name: &'static str) -> Self {
        self.markers.push(Marker::Tag(name));
        self
    }

    /// Compose an ancestor descriptor behind this one.
    pub fn with_extends(mut self, parent: Arc<TypeDescriptor>) -> Self {
        self.extends = Some(parent);
        self
    }

    /// Add a field.
    pub fn field(mut self, field: Field<E>) -> Self {
        self.fields.push(field.into_descriptor());
        self
    }

    /// Finish the descriptor.
    pub fn build(self) -> Arc<TypeDescriptor> {
        let mut markers = self.markers;
        if let Some((at, marker)) = self.direct {
            markers.insert(at, Marker::Type(marker));
        }
        Arc::new(TypeDescriptor {
            entity: self.entity,
            entity_id: TypeId::of::<E>(),
            markers,
            fields: self.fields,
            extends: self.extends,
        })
    }

    fn direct_mut(&mut self) -> &mut TypeMarker {
        let at = self.markers.len();
        &mut self.direct.get_or_insert_with(|| (at, TypeMarker::new())).1
    }
}

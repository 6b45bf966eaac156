//! `#[row(...)]` attribute parsing.
//!
//! Struct-level attributes are parsed with darling; fields are walked by
//! hand so each `#[row]` occurrence can be merged with marker semantics:
//! direct settings are first-wins across attributes, bundles and tags
//! accumulate in declaration order.

use darling::{FromDeriveInput, FromMeta};
use syn::{DeriveInput, Ident, Meta, Type};

/// Column naming convention selector, as written in `naming = "..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingArg {
    /// Field names are used verbatim.
    #[default]
    FieldName,
    /// `camelCase` columns.
    Camel,
    /// `snake_case` columns.
    Snake,
    /// `kebab-case` columns.
    Kebab,
    /// `PascalCase` columns.
    Pascal,
}

impl FromMeta for NamingArg {
    fn from_string(value: &str) -> darling::Result<Self> {
        match value.to_lowercase().as_str() {
            "field_name" | "exact" => Ok(Self::FieldName),
            "camel" => Ok(Self::Camel),
            "snake" => Ok(Self::Snake),
            "kebab" => Ok(Self::Kebab),
            "pascal" => Ok(Self::Pascal),
            _ => Err(darling::Error::unknown_value(value)),
        }
    }
}

/// Struct-level attributes parsed from `#[row(...)]`.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(row), supports(struct_named))]
struct EntityAttrs {
    ident: Ident,
    naming: Option<NamingArg>,
    #[darling(default)]
    ignore_case: bool,
    #[darling(default)]
    map_all: bool,
    factory: Option<syn::Path>,
    #[darling(multiple, rename = "bundle")]
    bundles: Vec<String>,
    #[darling(multiple, rename = "tag")]
    tags: Vec<String>,
}

/// One `#[row(...)]` occurrence on a field.
#[derive(Debug, Default, FromMeta)]
#[darling(default)]
struct RowArgs {
    column: Option<String>,
    factory: Option<syn::Path>,
    ignore: bool,
    symbolic: bool,
    custom: bool,
    #[darling(multiple, rename = "bundle")]
    bundles: Vec<String>,
    #[darling(multiple, rename = "tag")]
    tags: Vec<String>,
}

impl RowArgs {
    fn has_direct_keys(&self) -> bool {
        self.column.is_some() || self.factory.is_some() || self.ignore || self.symbolic || self.custom
    }

    fn has_marker_lists(&self) -> bool {
        !self.bundles.is_empty() || !self.tags.is_empty()
    }
}

/// Field definition with all parsed attributes.
#[derive(Debug)]
pub struct FieldDef {
    /// Field identifier.
    pub ident: Ident,
    /// Field type as declared.
    pub ty: Type,
    /// Column name override from `column = "..."`.
    pub column: Option<String>,
    /// Coercion factory override from `factory = "..."`.
    pub factory: Option<syn::Path>,
    /// Excluded from mapping via `ignore`.
    pub ignore: bool,
    /// Converts through symbol resolution via `symbolic`.
    pub symbolic: bool,
    /// Converts only through the registry via `custom`.
    pub custom: bool,
    /// Whether any `#[row]` attribute marks the field for mapping.
    pub marked: bool,
    /// Bundle references, in declaration order.
    pub bundles: Vec<String>,
    /// Inert tags, in declaration order.
    pub tags: Vec<String>,
}

impl FieldDef {
    fn from_field(field: &syn::Field) -> darling::Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| darling::Error::custom("named field required").with_span(field))?;
        let mut def = Self {
            ident,
            ty: field.ty.clone(),
            column: None,
            factory: None,
            ignore: false,
            symbolic: false,
            custom: false,
            marked: false,
            bundles: Vec::new(),
            tags: Vec::new(),
        };

        let mut errors = darling::Error::accumulator();
        for attr in &field.attrs {
            if !attr.path().is_ident("row") {
                continue;
            }
            let args = match &attr.meta {
                Meta::Path(_) => Some(RowArgs::default()),
                meta => errors.handle(RowArgs::from_meta(meta)),
            };
            let Some(args) = args else { continue };

            // A bare `#[row]` marks the field; an attribute carrying only
            // bundle/tag entries does not.
            def.marked |= args.has_direct_keys() || !args.has_marker_lists();
            if def.column.is_none() {
                def.column = args.column;
            }
            if def.factory.is_none() {
                def.factory = args.factory;
            }
            def.ignore |= args.ignore;
            def.symbolic |= args.symbolic;
            def.custom |= args.custom;
            def.bundles.extend(args.bundles);
            def.tags.extend(args.tags);
        }
        if def.symbolic && def.custom {
            errors.push(
                darling::Error::custom("`symbolic` and `custom` are mutually exclusive")
                    .with_span(&def.ident),
            );
        }
        errors.finish_with(def)
    }

    /// The inner type when the field is `Option<T>`, checked by the last
    /// path segment. Drives `symbolic` fields toward null-tolerant
    /// extraction.
    pub fn option_inner(&self) -> Option<&Type> {
        let Type::Path(type_path) = &self.ty else {
            return None;
        };
        let segment = type_path.path.segments.last()?;
        if segment.ident != "Option" {
            return None;
        }
        let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
            return None;
        };
        if args.args.len() != 1 {
            return None;
        }
        match args.args.first()? {
            syn::GenericArgument::Type(inner) => Some(inner),
            _ => None,
        }
    }
}

/// Complete parsed entity definition.
#[derive(Debug)]
pub struct EntityDef {
    /// Struct identifier.
    pub ident: Ident,
    /// Naming convention from `naming = "..."`.
    pub naming: Option<NamingArg>,
    /// Case-insensitive column matching via `ignore_case`.
    pub ignore_case: bool,
    /// Map unmarked fields too, via `map_all`.
    pub map_all: bool,
    /// Mapper factory override from `factory = "..."`.
    pub factory: Option<syn::Path>,
    /// Bundle references, in declaration order.
    pub bundles: Vec<String>,
    /// Inert tags, in declaration order.
    pub tags: Vec<String>,
    /// All field definitions from the struct.
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    /// Parse the entity definition from syn's `DeriveInput`.
    pub fn from_derive_input(input: &DeriveInput) -> darling::Result<Self> {
        let attrs = EntityAttrs::from_derive_input(input)?;
        if !input.generics.params.is_empty() {
            return Err(
                darling::Error::custom("`Mappable` cannot be derived for generic types")
                    .with_span(&input.generics),
            );
        }

        let fields = match &input.data {
            syn::Data::Struct(data) => match &data.fields {
                syn::Fields::Named(named) => {
                    let mut errors = darling::Error::accumulator();
                    let fields: Vec<_> = named
                        .named
                        .iter()
                        .filter_map(|field| errors.handle(FieldDef::from_field(field)))
                        .collect();
                    errors.finish_with(fields)?
                }
                _ => {
                    return Err(darling::Error::custom("`Mappable` requires named fields")
                        .with_span(&input.ident));
                }
            },
            _ => {
                return Err(
                    darling::Error::custom("`Mappable` can only be derived for structs")
                        .with_span(&input.ident),
                );
            }
        };

        Ok(Self {
            ident: attrs.ident,
            naming: attrs.naming,
            ignore_case: attrs.ignore_case,
            map_all: attrs.map_all,
            factory: attrs.factory,
            bundles: attrs.bundles,
            tags: attrs.tags,
            fields,
        })
    }
}

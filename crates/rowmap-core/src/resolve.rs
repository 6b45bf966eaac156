//! Recursive marker resolution.
//!
//! Resolution walks a descriptor's marker list in declaration order,
//! expanding bundles depth-first at the position they appear. The first
//! marker of each kind wins; later ones, whether direct or reached through
//! a bundle, are ignored. Bundle graphs may be self-referential: a bundle
//! already expanded in the current walk is skipped, not an error.

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::LazyLock;

use dashmap::DashMap;
use tracing::trace;

use crate::descriptor::TypeDescriptor;
use crate::error::{ConfigError, Error};
use crate::marker::{bundle_markers, Marker, MarkerSet};

static TYPE_MARKERS: LazyLock<DashMap<TypeId, MarkerSet>> = LazyLock::new(DashMap::new);

/// Resolve the markers attached to one descriptor element.
pub fn resolve_markers(markers: &[Marker]) -> Result<MarkerSet, Error> {
    let mut set = MarkerSet::default();
    let mut visited = HashSet::new();
    collect(markers, &mut set, &mut visited)?;
    Ok(set)
}

fn collect(
    markers: &[Marker],
    set: &mut MarkerSet,
    visited: &mut HashSet<&'static str>,
) -> Result<(), Error> {
    for marker in markers {
        match marker {
            Marker::Type(m) => set.record_type(*m),
            Marker::Field(m) => set.record_field(m),
            Marker::Tag(_) => {}
            Marker::Bundle(name) => {
                if !visited.insert(name) {
                    continue;
                }
                let inner = bundle_markers(name).ok_or_else(|| ConfigError::UnknownBundle {
                    name: (*name).to_string(),
                })?;
                collect(&inner, set, visited)?;
            }
        }
    }
    Ok(())
}

/// Resolve a type's markers, falling back along its ancestor chain.
///
/// The type's own markers are resolved first; each ancestor, nearest
/// first, fills only the kinds still absent. The result is cached per
/// entity type, so repeated mapper builds resolve once.
pub fn resolve_type_markers(ty: &TypeDescriptor) -> Result<MarkerSet, Error> {
    if let Some(found) = TYPE_MARKERS.get(&ty.entity_id()) {
        return Ok(found.clone());
    }

    let mut set = resolve_markers(ty.markers())?;
    let mut ancestor = ty.extends();
    while let Some(parent) = ancestor {
        set.fill_from(&resolve_markers(parent.markers())?);
        ancestor = parent.extends();
    }
    trace!(entity = ty.entity(), "resolved type markers");

    let entry = TYPE_MARKERS.entry(ty.entity_id()).or_insert(set);
    Ok(entry.clone())
}

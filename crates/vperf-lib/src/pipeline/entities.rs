//! Entity resolution
//!
//! One bulk property retrieval per scrape turns the traversal of the
//! inventory graph into canonical [`Entity`] values. Only the `name`
//! property is requested, plus the type-specific summary name for
//! network-like objects whose generic name is empty or stale; those get
//! their name overwritten before the entity is emitted.

use std::str::FromStr;

use tracing::{debug, warn};

use crate::config::RootSelector;
use crate::error::VimError;
use crate::models::{Entity, ManagedEntityType};
use crate::vim::session::Session;
use crate::vim::traversal;
use crate::vim::types::{ObjectContent, ObjectRef, PropertyFilterSpec, PropertySpec};

const NAME_PROPERTY: &str = "name";
const SUMMARY_NAME_PROPERTY: &str = "summary.name";

/// Discover entities of the given types under the given roots with one
/// retrieval call. Retrieval errors propagate unchanged; an empty result
/// is logged, not an error.
pub async fn resolve_entities(
    session: &Session,
    roots: &[ObjectRef],
    types: &[ManagedEntityType],
    include_roots: bool,
) -> Result<Vec<Entity>, VimError> {
    let object_set = roots
        .iter()
        .map(|root| {
            let root_type = ManagedEntityType::from_str(&root.entity_type)?;
            Ok(traversal::descendants(root.clone(), root_type, include_roots))
        })
        .collect::<Result<Vec<_>, VimError>>()?;

    let prop_set = types
        .iter()
        .map(|t| {
            let mut path_set = vec![NAME_PROPERTY.to_string()];
            if t.needs_name_override() {
                path_set.push(SUMMARY_NAME_PROPERTY.to_string());
            }
            PropertySpec { entity_type: t.wire_name().to_string(), path_set }
        })
        .collect();

    let contents = session
        .retrieve_properties(PropertyFilterSpec { object_set, prop_set })
        .await?;

    let entities: Vec<Entity> = contents.into_iter().filter_map(to_entity).collect();
    if entities.is_empty() {
        debug!(?types, "no entities discovered");
    }

    Ok(entities)
}

/// Discover entities either under resolved root entities (`Some`, roots
/// included in the result) or from the endpoint's global root (`None`).
pub async fn resolve_under_roots(
    session: &Session,
    roots: Option<&[Entity]>,
    types: &[ManagedEntityType],
) -> Result<Vec<Entity>, VimError> {
    match roots {
        Some(roots) => {
            let refs: Vec<ObjectRef> = roots.iter().map(Entity::object_ref).collect();
            resolve_entities(session, &refs, types, true).await
        }
        None => resolve_entities(session, &[session.root_folder()], types, false).await,
    }
}

/// Resolve the configured roots to concrete entities.
///
/// `None` means "no root filter": a configured `(Folder, "")` universal
/// marker switches discovery to everything under the global root.
/// Otherwise, discovered entities are matched on `(type, name)` exactly;
/// an empty selection is a warning, not an error.
pub async fn resolve_roots(
    session: &Session,
    roots: &[RootSelector],
) -> Result<Option<Vec<Entity>>, VimError> {
    if roots.iter().any(RootSelector::is_universal) {
        return Ok(None);
    }

    let types: Vec<ManagedEntityType> = roots.iter().map(|r| r.entity_type).collect();
    let candidates = resolve_entities(session, &[session.root_folder()], &types, false).await?;

    let selected: Vec<Entity> = candidates
        .into_iter()
        .filter(|e| {
            roots
                .iter()
                .any(|r| r.entity_type == e.entity_type && r.name == e.name)
        })
        .collect();

    if selected.is_empty() {
        warn!(?roots, "no entity matched the configured roots");
    }

    Ok(Some(selected))
}

/// Discover every entity type beneath the selected root entities,
/// roots included. A universal selector widens to the global root; an
/// unmatched selection yields an empty result, not an error.
pub async fn resolve_all_under_roots(
    session: &Session,
    selectors: &[RootSelector],
) -> Result<Vec<Entity>, VimError> {
    match resolve_roots(session, selectors).await? {
        None => resolve_under_roots(session, None, ManagedEntityType::values()).await,
        Some(roots) if roots.is_empty() => Ok(Vec::new()),
        Some(roots) => {
            resolve_under_roots(session, Some(&roots), ManagedEntityType::values()).await
        }
    }
}

/// Reify one raw record. Records of unknown type are dropped with a
/// warning; the rest of the batch is unaffected.
fn to_entity(content: ObjectContent) -> Option<Entity> {
    let entity_type = match ManagedEntityType::from_str(&content.obj.entity_type) {
        Ok(t) => t,
        Err(_) => {
            warn!(entity_type = %content.obj.entity_type, id = %content.obj.id, "unknown entity type in retrieval result");
            return None;
        }
    };

    let mut name = content.props.get(NAME_PROPERTY).cloned().unwrap_or_default();
    if entity_type.needs_name_override() {
        if let Some(summary_name) = content.props.get(SUMMARY_NAME_PROPERTY) {
            name = summary_name.clone();
        }
    }

    Some(Entity { id: content.obj.id, name, entity_type })
}

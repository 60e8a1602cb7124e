use std::collections::HashSet;

use tower_lsp::lsp_types::Position;

use super::item::{HierarchyDirection, HierarchyItem};
use super::parents::type_parents;
use super::position::find_record_type_at;
use crate::semantic::{RecordId, SemanticModel};
use crate::subtypes::SubtypeSource;

/// Resolve the type hierarchy of the record at `position`.
///
/// Ancestor expansion is never depth-limited; descendant expansion is
/// bounded by `resolve_levels` (`0` yields a present-but-empty `children`
/// sequence on the root). Returns `None` when no record type resolves at
/// the position.
pub fn get_type_hierarchy(
    model: &SemanticModel,
    position: Position,
    resolve_levels: u32,
    direction: HierarchyDirection,
    subtypes: Option<&dyn SubtypeSource>,
) -> Option<HierarchyItem> {
    let root = find_record_type_at(model, position)?;

    let mut item = if direction.wants_parents() {
        let mut path = HashSet::new();
        // The path set is empty, so the root itself can never be rejected.
        type_ancestors(model, root, &mut path).unwrap_or_else(|| to_item(model, root))
    } else {
        to_item(model, root)
    };

    if direction.wants_children() {
        let mut path = HashSet::new();
        path.insert(guard_key(model, root));
        item.children = Some(type_descendants(model, root, resolve_levels, subtypes, &mut path));
    }

    Some(item)
}

/// Identity used by the recursion guard.
///
/// Specializations and instantiations collapse to their primary template's
/// pattern, so a self-referential chain like `S<N> : S<N + 1>` (or
/// `S<N> : S<N - 1>` with an `S<0>` base case) registers as a repeat on the
/// second level no matter how its arguments change.
fn guard_key(
    model: &SemanticModel,
    id: RecordId,
) -> RecordId {
    let record = model.record(id);
    record.template.template_name().and_then(|t| model.primary_pattern(t)).unwrap_or(id)
}

/// Depth-first ancestor expansion over base edges.
///
/// `path` holds the guard keys of the in-progress path only — inserted
/// before recursing, removed on unwind — so the same type may still appear
/// in sibling branches (diamond inheritance is preserved, not collapsed).
/// A repeat on the current path stops that branch: the node found so far is
/// returned without further parents, and the underlying declarations are
/// untouched.
fn type_ancestors(
    model: &SemanticModel,
    id: RecordId,
    path: &mut HashSet<RecordId>,
) -> Option<HierarchyItem> {
    let key = guard_key(model, id);
    if !path.insert(key) {
        return None;
    }

    let mut item = to_item(model, id);
    let mut parents = Vec::new();
    for parent in type_parents(model, id) {
        if let Some(parent_item) = type_ancestors(model, parent, path) {
            parents.push(parent_item);
        }
    }
    item.parents = Some(parents);

    path.remove(&key);
    Some(item)
}

/// Descendant expansion via the external subtype-search facility, bounded
/// by `levels` and guarded like ancestor expansion.
fn type_descendants(
    model: &SemanticModel,
    id: RecordId,
    levels: u32,
    subtypes: Option<&dyn SubtypeSource>,
    path: &mut HashSet<RecordId>,
) -> Vec<HierarchyItem> {
    if levels == 0 {
        return Vec::new();
    }
    let Some(source) = subtypes else {
        return Vec::new();
    };

    let mut children = Vec::new();
    for sub in source.direct_subtypes(model, id) {
        let key = guard_key(model, sub);
        if path.contains(&key) {
            continue;
        }
        path.insert(key);
        let mut item = to_item(model, sub);
        if levels > 1 {
            item.children = Some(type_descendants(model, sub, levels - 1, subtypes, path));
        }
        path.remove(&key);
        children.push(item);
    }
    children
}

fn to_item(
    model: &SemanticModel,
    id: RecordId,
) -> HierarchyItem {
    let record = model.record(id);
    HierarchyItem {
        name: record.name,
        kind: record.kind,
        declaration_range: record.declaration_range,
        selection_range: record.selection_range,
        parents: None,
        children: None,
    }
}

#[cfg(test)]
#[path = "../../tests/src/hierarchy/builder_tests.rs"]
mod tests;

//! Subtype search: the external collaborator the hierarchy builder queries
//! for descendant expansion.

use std::collections::HashMap;

use crate::hierarchy::type_parents;
use crate::semantic::{RecordId, SemanticModel};

/// Supplies, for a record type, the set of directly-derived record types.
///
/// The hierarchy core only consumes this boundary; where the derived types
/// come from (a same-TU reverse map, a project-wide index) is up to the
/// implementation.
pub trait SubtypeSource {
    fn direct_subtypes(
        &self,
        model: &SemanticModel,
        of: RecordId,
    ) -> Vec<RecordId>;
}

/// Reference `SubtypeSource` built by reversing the base edges of one
/// semantic model.
///
/// Child ordering follows model declaration order, which keeps descendant
/// expansion stable across queries.
pub struct SubtypeIndex {
    map: HashMap<RecordId, Vec<RecordId>>,
}

impl SubtypeIndex {
    pub fn build(model: &SemanticModel) -> Self {
        let mut map: HashMap<RecordId, Vec<RecordId>> = HashMap::new();
        for id in model.ids() {
            for parent in type_parents(model, id) {
                map.entry(parent).or_default().push(id);
            }
        }
        Self {
            map,
        }
    }
}

impl SubtypeSource for SubtypeIndex {
    fn direct_subtypes(
        &self,
        _model: &SemanticModel,
        of: RecordId,
    ) -> Vec<RecordId> {
        self.map.get(&of).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/src/subtypes_tests.rs"]
mod tests;

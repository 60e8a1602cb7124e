use tower_lsp::lsp_types::Position;
use tracing::debug;

use crate::semantic::{AnchorTarget, RecordId, SemanticModel};

/// Map a source position to the unique record type it unambiguously denotes.
///
/// Positions on a type name, on a record-typed variable (declaration or
/// use), or on a method name all resolve; a position on a *field* name is
/// ambiguous by design and yields no match, as does any position outside a
/// record-bearing construct. Read-only; never a fault.
pub fn find_record_type_at(
    model: &SemanticModel,
    position: Position,
) -> Option<RecordId> {
    let anchor = model.anchor_at(position)?;
    match &anchor.target {
        AnchorTarget::Record(id) => Some(*id),
        AnchorTarget::Type(written) => {
            let resolved = model.resolve_written_type(written);
            if resolved.is_none() {
                debug!("[hierarchy] no record resolves for written type {written:?}");
            }
            resolved
        },
        AnchorTarget::AmbiguousMember => None,
    }
}

#[cfg(test)]
#[path = "../../tests/src/hierarchy/position_tests.rs"]
mod tests;

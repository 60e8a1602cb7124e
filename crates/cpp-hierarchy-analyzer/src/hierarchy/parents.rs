use crate::semantic::{RecordId, RecordInfo, SemanticModel};
use crate::semantic::type_name::{mentions_param, split_template_id, strip_elaboration, unqualified_tail};

/// Outcome of resolving one base specifier to a declaration.
///
/// A closed set with explicit policy per variant; base resolution never
/// falls back to ad hoc guessing beyond what these variants encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBase {
    /// An ordinary declaration — or, for a dependent base like `Parent<T>`,
    /// the primary template's pattern as a best-effort stand-in.
    Concrete(RecordId),
    /// The implicit instantiation for the written arguments, found in the
    /// model or materialized on demand.
    ImplicitInstantiation(RecordId),
    /// A user-written specialization matching the written arguments.
    ExplicitSpecialization(RecordId),
    /// A dependent base beyond the primary-template heuristic
    /// (`Parent<T>::Type`, a bare parameter `T`); silently omitted.
    Unresolved,
}

impl ResolvedBase {
    pub fn record_id(self) -> Option<RecordId> {
        match self {
            Self::Concrete(id) | Self::ImplicitInstantiation(id) | Self::ExplicitSpecialization(id) => Some(id),
            Self::Unresolved => None,
        }
    }
}

/// Resolve one written base specifier of `owner` to the best available
/// concrete declaration.
pub fn resolve_base(
    model: &SemanticModel,
    owner: &RecordInfo,
    written: &str,
) -> ResolvedBase {
    let text = strip_elaboration(written);

    match split_template_id(text) {
        Some(tid) => {
            if !tid.suffix.is_empty() {
                // Nested dependent name (`Parent<T>::Type`): nothing we can do.
                return ResolvedBase::Unresolved;
            }
            let template = unqualified_tail(tid.template);
            if tid.args.iter().any(|arg| mentions_param(arg, &owner.template_params)) {
                // Dependent arguments: use the primary template as a
                // best-effort guess.
                return match model.primary_pattern(template) {
                    Some(id) => ResolvedBase::Concrete(id),
                    None => ResolvedBase::Unresolved,
                };
            }
            if let Some((id, is_explicit)) = model.find_specialization(template, &tid.args) {
                return if is_explicit {
                    ResolvedBase::ExplicitSpecialization(id)
                } else {
                    ResolvedBase::ImplicitInstantiation(id)
                };
            }
            match model.materialize_instantiation(template, &tid.args) {
                Some(id) => ResolvedBase::ImplicitInstantiation(id),
                None => ResolvedBase::Unresolved,
            }
        },
        None => {
            let name = unqualified_tail(text);
            if owner.template_params.iter().any(|p| p == name) {
                // A base that is itself a bare template parameter.
                return ResolvedBase::Unresolved;
            }
            match model.lookup_record(name) {
                Some(id) => ResolvedBase::Concrete(id),
                None => ResolvedBase::Unresolved,
            }
        },
    }
}

/// Immediate declared base types of a record, in base-specifier declaration
/// order, resolved to the best available declarations.
///
/// Unresolvable dependent bases are omitted, never guessed; nothing is
/// deduplicated. An incomplete record — e.g. an instantiation the compiler
/// aborted at its depth limit — enumerates no bases.
pub fn type_parents(
    model: &SemanticModel,
    id: RecordId,
) -> Vec<RecordId> {
    let record = model.record(id);
    if !record.is_definition {
        return Vec::new();
    }
    record.bases.iter().filter_map(|base| resolve_base(model, &record, base).record_id()).collect()
}

#[cfg(test)]
#[path = "../../tests/src/hierarchy/parents_tests.rs"]
mod tests;

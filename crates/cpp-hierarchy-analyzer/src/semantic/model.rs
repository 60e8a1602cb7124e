use std::collections::HashMap;
use std::sync::Mutex;

use tower_lsp::lsp_types::Position;
use tracing::debug;

use super::record::{RecordInfo, TemplateForm};
use super::type_name::{normalize_type_text, split_template_id, strip_elaboration, substitute_params, unqualified_tail};

/// Opaque handle to a record declaration inside one [`SemanticModel`].
///
/// Two handles denote the same type iff they are equal; for templates that
/// means the same instantiation or specialization. Handles are only
/// meaningful against the model that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(usize);

/// What a source position unambiguously denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorTarget {
    /// A record declaration's own name token.
    Record(RecordId),
    /// A written type to resolve at query time (variable types, base
    /// expressions of member accesses).
    Type(String),
    /// A field name: equally suggests the record being accessed and the
    /// field's own type, so the resolver refuses to guess.
    AmbiguousMember,
}

/// A token span mapped to a resolution outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionAnchor {
    pub file: String,
    /// 0-based line.
    pub line: u32,
    /// 0-based start column.
    pub col: u32,
    /// Token length in columns.
    pub len: u32,
    pub target: AnchorTarget,
}

impl PositionAnchor {
    fn contains(&self, position: Position) -> bool {
        position.line == self.line && position.character >= self.col && position.character < self.col + self.len
    }
}

/// Records materialized on demand during base resolution.
///
/// Append-only; the map key is the normalized display name
/// (e.g. `"Parent<float>"`).
#[derive(Debug, Default)]
struct MaterializedArena {
    records: Vec<RecordInfo>,
    by_display: HashMap<String, usize>,
}

/// Indexed semantic data for a single translation unit.
///
/// The model owns all record storage; the hierarchy core only ever holds
/// [`RecordId`] handles into it. It is immutable for the duration of a
/// query except for on-demand implicit instantiation, which appends to an
/// interior arena and never touches existing records.
#[derive(Debug)]
pub struct SemanticModel {
    pub records: Vec<RecordInfo>,
    pub anchors: Vec<PositionAnchor>,
    /// Map from unqualified record name to indices in `records`.
    pub name_to_records: HashMap<String, Vec<usize>>,
    /// Typedef/alias name to underlying written type.
    pub aliases: HashMap<String, String>,
    /// Cap on on-demand materializations, standing in for the compiler's
    /// template instantiation depth limit.
    pub template_depth: usize,
    /// Path of the document this model was built for. When set, position
    /// lookup ignores anchors from other files, so a record declared in an
    /// included header cannot shadow the document's own content at the same
    /// line/column.
    pub primary_file: Option<String>,
    materialized: Mutex<MaterializedArena>,
}

pub(crate) const DEFAULT_TEMPLATE_DEPTH: usize = 256;

impl SemanticModel {
    pub fn new(
        records: Vec<RecordInfo>,
        anchors: Vec<PositionAnchor>,
        aliases: HashMap<String, String>,
        template_depth: usize,
    ) -> Self {
        let mut name_to_records: HashMap<String, Vec<usize>> = HashMap::with_capacity(records.len());
        for (i, rec) in records.iter().enumerate() {
            name_to_records.entry(rec.name.clone()).or_default().push(i);
        }
        Self {
            records,
            anchors,
            name_to_records,
            aliases,
            template_depth,
            primary_file: None,
            materialized: Mutex::new(MaterializedArena::default()),
        }
    }

    /// All prebuilt record handles, in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = RecordId> + use<> {
        (0..self.records.len()).map(RecordId)
    }

    /// Snapshot of the record behind a handle.
    pub fn record(&self, id: RecordId) -> RecordInfo {
        if id.0 < self.records.len() {
            return self.records[id.0].clone();
        }
        let arena = self.materialized_lock();
        arena.records[id.0 - self.records.len()].clone()
    }

    /// Prebuilt record handles sharing an unqualified name.
    pub fn records_named(&self, name: &str) -> Vec<RecordId> {
        self.name_to_records.get(name).map(|v| v.iter().map(|&i| RecordId(i)).collect()).unwrap_or_default()
    }

    /// Resolve a plain (non-template-id) name to an ordinary record.
    ///
    /// Prefers complete definitions over forward declarations.
    pub fn lookup_record(&self, name: &str) -> Option<RecordId> {
        let indices = self.name_to_records.get(name)?;
        let candidates: Vec<usize> =
            indices.iter().copied().filter(|&i| self.records[i].template == TemplateForm::None).collect();
        candidates.iter().copied().find(|&i| self.records[i].is_definition).or_else(|| candidates.first().copied()).map(RecordId)
    }

    /// The pattern record of the class template with the given name.
    pub fn primary_pattern(&self, template_name: &str) -> Option<RecordId> {
        let indices = self.name_to_records.get(template_name)?;
        indices.iter().copied().find(|&i| self.records[i].template == TemplateForm::Primary).map(RecordId)
    }

    /// Find an existing specialization of `template_name` for `args`.
    ///
    /// Returns the handle and whether the match is an explicit (user-written)
    /// specialization.
    pub fn find_specialization(&self, template_name: &str, args: &[String]) -> Option<(RecordId, bool)> {
        let wanted = display_key(template_name, args);
        if let Some(indices) = self.name_to_records.get(template_name) {
            for &i in indices {
                let rec = &self.records[i];
                match &rec.template {
                    TemplateForm::ExplicitSpecialization { .. } if normalize_type_text(&rec.display_name()) == wanted => {
                        return Some((RecordId(i), true));
                    },
                    TemplateForm::ImplicitInstantiation { .. } if normalize_type_text(&rec.display_name()) == wanted => {
                        return Some((RecordId(i), false));
                    },
                    _ => {},
                }
            }
        }
        let arena = self.materialized_lock();
        arena.by_display.get(&wanted).map(|&i| (RecordId(self.records.len() + i), false))
    }

    /// Materialize the implicit instantiation of `template_name` for `args`
    /// from the primary pattern.
    ///
    /// Returns `None` when no primary template is known or the instantiation
    /// depth budget is exhausted; callers treat that as an unresolvable base.
    pub fn materialize_instantiation(&self, template_name: &str, args: &[String]) -> Option<RecordId> {
        let pattern_id = self.primary_pattern(template_name)?;
        let pattern = self.records[pattern_id.index()].clone();

        let mut arena = self.materialized_lock();
        let key = display_key(template_name, args);
        if let Some(&i) = arena.by_display.get(&key) {
            return Some(RecordId(self.records.len() + i));
        }
        if arena.records.len() >= self.template_depth {
            debug!("[model] instantiation depth budget ({}) exhausted materializing {key}", self.template_depth);
            return None;
        }

        let bindings: Vec<(String, String)> =
            pattern.template_params.iter().cloned().zip(args.iter().cloned()).collect();
        let bases = pattern.bases.iter().map(|b| substitute_params(b, &bindings)).collect();

        let record = RecordInfo {
            id: String::new(),
            name: pattern.name.clone(),
            kind: pattern.kind,
            template: TemplateForm::ImplicitInstantiation {
                template: template_name.to_owned(),
                args: args.to_vec(),
            },
            template_params: Vec::new(),
            bases,
            is_definition: pattern.is_definition,
            file: pattern.file.clone(),
            declaration_range: pattern.declaration_range,
            selection_range: pattern.selection_range,
        };

        let idx = arena.records.len();
        arena.records.push(record);
        arena.by_display.insert(key, idx);
        Some(RecordId(self.records.len() + idx))
    }

    /// Resolve a written type text to the best available record declaration.
    ///
    /// Follows typedef/alias chains (bounded), resolves template-ids to their
    /// specialization (materializing the implicit instantiation if needed),
    /// and plain names to ordinary records.
    pub fn resolve_written_type(&self, written: &str) -> Option<RecordId> {
        let mut text = strip_elaboration(written).to_owned();
        for _ in 0..8 {
            match self.aliases.get(text.as_str()) {
                Some(underlying) => text = strip_elaboration(underlying).to_owned(),
                None => break,
            }
        }

        match split_template_id(&text) {
            Some(tid) => {
                if !tid.suffix.is_empty() {
                    return None;
                }
                let template = unqualified_tail(tid.template);
                if let Some((id, _)) = self.find_specialization(template, &tid.args) {
                    return Some(id);
                }
                self.materialize_instantiation(template, &tid.args)
            },
            None => self.lookup_record(unqualified_tail(&text)),
        }
    }

    /// Find a record by its display name (`"Parent"`, `"Parent<int>"`).
    ///
    /// Used by the presentation layer to resume a hierarchy item. Prefers
    /// complete definitions over forward declarations, like
    /// [`lookup_record`](Self::lookup_record).
    pub fn record_by_display_name(&self, display: &str) -> Option<RecordId> {
        let wanted = normalize_type_text(display);
        let mut fallback = None;
        for (i, rec) in self.records.iter().enumerate() {
            if normalize_type_text(&rec.display_name()) == wanted {
                if rec.is_definition {
                    return Some(RecordId(i));
                }
                fallback.get_or_insert(RecordId(i));
            }
        }
        if fallback.is_some() {
            return fallback;
        }
        let arena = self.materialized_lock();
        arena.by_display.get(&wanted).map(|&i| RecordId(self.records.len() + i))
    }

    /// The narrowest anchor in the primary file whose token span contains
    /// `position`.
    pub fn anchor_at(&self, position: Position) -> Option<&PositionAnchor> {
        self.anchors
            .iter()
            .filter(|a| self.primary_file.as_deref().is_none_or(|f| a.file == f))
            .filter(|a| a.contains(position))
            .min_by_key(|a| a.len)
    }

    fn materialized_lock(&self) -> std::sync::MutexGuard<'_, MaterializedArena> {
        self.materialized.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordId {
    pub(crate) fn index(self) -> usize {
        self.0
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

fn display_key(template_name: &str, args: &[String]) -> String {
    normalize_type_text(&format!("{}<{}>", template_name, args.join(", ")))
}

#[cfg(test)]
#[path = "../../tests/src/semantic/model_tests.rs"]
mod tests;

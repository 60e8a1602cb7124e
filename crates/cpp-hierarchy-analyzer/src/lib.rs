pub mod document;
pub mod hierarchy;
pub mod semantic;
pub mod server;
pub mod subtypes;
pub mod vfs;

pub use hierarchy::{
    HierarchyDirection, HierarchyItem, ResolvedBase, find_record_type_at, get_type_hierarchy,
    resolve_base, type_parents,
};
pub use semantic::{RecordId, RecordInfo, RecordKind, SemanticModel, TemplateForm, build_model};
pub use server::HierarchyLanguageServer;
pub use subtypes::{SubtypeIndex, SubtypeSource};

//! Semantic model over a Clang AST dump.
//!
//! The model is the AST-provider boundary of the hierarchy core: it owns
//! record storage, hands out opaque [`RecordId`] handles, and answers
//! declaration lookups. The core never walks raw AST nodes.

pub(crate) mod ast_dump;
mod builder;
pub mod clang_nodes;
mod model;
mod record;
pub mod type_name;

pub use builder::build_model;
pub use clang_nodes::Node;
pub use model::{AnchorTarget, PositionAnchor, RecordId, SemanticModel};
pub use record::{RecordInfo, RecordKind, TemplateForm};

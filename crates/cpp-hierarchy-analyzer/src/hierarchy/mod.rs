//! Type hierarchy resolution: position -> record -> ancestor/descendant tree.

mod builder;
mod item;
mod parents;
mod position;

pub use builder::get_type_hierarchy;
pub use item::{HierarchyDirection, HierarchyItem};
pub use parents::{ResolvedBase, resolve_base, type_parents};
pub use position::find_record_type_at;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::Range;

use crate::semantic::RecordKind;

/// Which edges of the hierarchy a query expands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyDirection {
    Parents,
    Children,
    Both,
}

impl HierarchyDirection {
    pub fn wants_parents(self) -> bool {
        matches!(self, Self::Parents | Self::Both)
    }

    pub fn wants_children(self) -> bool {
        matches!(self, Self::Children | Self::Both)
    }
}

/// One node of a resolved type hierarchy.
///
/// `parents`, when present, always covers every ancestor level; `children`
/// is bounded by the query's resolve levels and is `None` on items whose
/// depth budget was exhausted (versus `Some(vec![])` for "expanded, none
/// found").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyItem {
    /// Unqualified display name, without template arguments.
    pub name: String,
    pub kind: RecordKind,
    pub declaration_range: Range,
    pub selection_range: Range,
    /// Direct base types, in base-specifier declaration order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<HierarchyItem>>,
    /// Direct derived types, in stable model order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<HierarchyItem>>,
}

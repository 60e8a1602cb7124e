use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::Range;

/// Category of a record declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Struct,
    Class,
    Union,
}

impl RecordKind {
    /// Map Clang's `tagUsed` string. Unknown tags default to `Struct`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("class") => Self::Class,
            Some("union") => Self::Union,
            _ => Self::Struct,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Class => "class",
            Self::Union => "union",
        }
    }
}

/// How a record relates to the template system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateForm {
    /// Ordinary, non-template record.
    None,
    /// The pattern record of a class template (`template <...> struct X`).
    Primary,
    /// A specialization materialized from the primary template for specific
    /// arguments, not written by the user.
    ImplicitInstantiation { template: String, args: Vec<String> },
    /// A user-written (full or partial) specialization.
    ExplicitSpecialization { template: String, args: Vec<String> },
}

impl TemplateForm {
    /// The template this record specializes, if it is a specialization.
    pub fn template_name(&self) -> Option<&str> {
        match self {
            Self::ImplicitInstantiation { template, .. } | Self::ExplicitSpecialization { template, .. } => {
                Some(template)
            },
            Self::None | Self::Primary => None,
        }
    }

    pub fn args(&self) -> &[String] {
        match self {
            Self::ImplicitInstantiation { args, .. } | Self::ExplicitSpecialization { args, .. } => args,
            Self::None | Self::Primary => &[],
        }
    }

    /// True iff this is an implicit instantiation of the named template.
    pub fn is_implicit_instantiation_of(&self, name: &str) -> bool {
        matches!(self, Self::ImplicitInstantiation { template, .. } if template == name)
    }
}

/// A record declaration known to the semantic model.
///
/// Plain data; identity lives in the [`RecordId`](super::RecordId) handle,
/// never in this struct.
#[derive(Debug, Clone)]
pub struct RecordInfo {
    /// Clang AST node id (e.g. `"0x714cc9008"`); empty for records
    /// materialized on demand.
    pub id: String,
    /// Unqualified name without template arguments.
    pub name: String,
    pub kind: RecordKind,
    pub template: TemplateForm,
    /// Template parameter names in scope of this record's base specifiers.
    pub template_params: Vec<String>,
    /// Base specifier type texts, in declaration order, as written.
    pub bases: Vec<String>,
    /// Whether a complete definition was seen. A recursive instantiation the
    /// compiler aborted at its depth limit stays incomplete and therefore
    /// enumerates no bases.
    pub is_definition: bool,
    /// Absolute file path of the declaration.
    pub file: String,
    /// Full extent of the declaration.
    pub declaration_range: Range,
    /// The defining name token, used by editors for navigation.
    pub selection_range: Range,
}

impl RecordInfo {
    /// Name including template arguments for specializations
    /// (e.g. `"Parent<int>"`); the bare name otherwise.
    pub fn display_name(&self) -> String {
        let args = self.template.args();
        if args.is_empty() {
            self.name.clone()
        } else {
            format!("{}<{}>", self.name, args.join(", "))
        }
    }
}

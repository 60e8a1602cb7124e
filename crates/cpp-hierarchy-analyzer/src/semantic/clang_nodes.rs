use clang_ast::{BareSourceLocation, Id, SourceLocation};
use serde::Deserialize;

pub type Node = clang_ast::Node<Clang>;

/// Typed representation of Clang AST node kinds relevant to hierarchy
/// resolution.
///
/// Each variant corresponds to a Clang AST node `"kind"` value.
/// The `Other` fallback efficiently skips all unrecognized node kinds.
#[derive(Deserialize)]
pub enum Clang {
    // --- Record declarations ---
    CXXRecordDecl(RecordData),
    ClassTemplateDecl(DeclData),
    ClassTemplateSpecializationDecl(RecordData),
    ClassTemplatePartialSpecializationDecl(RecordData),

    // --- Template machinery ---
    TemplateTypeParmDecl(DeclData),
    NonTypeTemplateParmDecl(DeclData),
    TemplateTemplateParmDecl(DeclData),
    TemplateArgument(TemplateArgumentData),

    // --- Members and typed declarations ---
    CXXMethodDecl(DeclData),
    CXXConstructorDecl(DeclData),
    FieldDecl(DeclData),
    VarDecl(DeclData),
    ParmVarDecl(DeclData),
    TypedefDecl(DeclData),
    TypeAliasDecl(DeclData),

    // --- References ---
    DeclRefExpr(RefExprData),
    MemberExpr(MemberExprData),

    // --- Catch-all ---
    // The `loc` and `range` fields MUST be deserialized even for unrecognized
    // node kinds. The `clang-ast` crate tracks "current file" state across the
    // deserialization stream via `SourceLocation`; if we skip locations for
    // nodes that set the file path, all subsequent nodes inherit an empty file.
    #[allow(dead_code)]
    Other {
        #[serde(default)]
        loc: Option<SourceLocation>,
        #[serde(default)]
        range: Option<clang_ast::SourceRange>,
    },
}

/// Common data for declaration nodes that are not records.
#[derive(Deserialize, Debug)]
pub struct DeclData {
    pub name: Option<String>,
    pub loc: Option<SourceLocation>,
    pub range: Option<clang_ast::SourceRange>,
    #[serde(rename = "isImplicit")]
    pub is_implicit: Option<bool>,
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
}

/// Data carried by `CXXRecordDecl` and class-template specialization nodes.
#[derive(Deserialize, Debug)]
pub struct RecordData {
    pub name: Option<String>,
    pub loc: Option<SourceLocation>,
    pub range: Option<clang_ast::SourceRange>,
    #[serde(rename = "isImplicit")]
    pub is_implicit: Option<bool>,
    /// `"struct"`, `"class"` or `"union"`.
    #[serde(rename = "tagUsed")]
    pub tag_used: Option<String>,
    /// Present and `true` only on the defining declaration. A failed
    /// recursive instantiation shows up as a specialization without it.
    #[serde(rename = "completeDefinition", default)]
    pub complete_definition: bool,
    /// Base specifiers in declaration order.
    #[serde(default)]
    pub bases: Vec<BaseSpecifierData>,
}

/// One entry of a record's `"bases"` array.
#[derive(Deserialize, Debug)]
pub struct BaseSpecifierData {
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
    #[allow(dead_code)]
    pub access: Option<String>,
}

/// A `TemplateArgument` child of a specialization node.
#[derive(Deserialize, Debug)]
pub struct TemplateArgumentData {
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
    /// Integral non-type argument value.
    pub value: Option<i64>,
}

/// Reference expression data (`DeclRefExpr`).
#[derive(Deserialize, Debug)]
pub struct RefExprData {
    pub loc: Option<SourceLocation>,
    pub range: Option<clang_ast::SourceRange>,
    #[serde(rename = "referencedDecl")]
    pub referenced_decl: Option<ReferencedDecl>,
    #[serde(rename = "isImplicit")]
    pub is_implicit: Option<bool>,
}

/// Member access data (`MemberExpr`). The `loc` sits on the member name
/// token, not on the base expression.
#[derive(Deserialize, Debug)]
pub struct MemberExprData {
    pub loc: Option<SourceLocation>,
    pub range: Option<clang_ast::SourceRange>,
    #[serde(rename = "referencedMemberDecl")]
    pub referenced_member_decl: Option<Id>,
    #[serde(rename = "isImplicit")]
    pub is_implicit: Option<bool>,
}

/// Inline summary of a referenced declaration.
#[derive(Deserialize, Debug)]
pub struct ReferencedDecl {
    pub id: Id,
    pub kind: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
}

/// Clang's qualified type representation.
#[derive(Deserialize, Debug)]
pub struct QualType {
    #[serde(rename = "qualType")]
    pub qual_type: Option<String>,
}

impl DeclData {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn is_implicit(&self) -> bool {
        self.is_implicit.unwrap_or(false)
    }
    pub fn qual_type(&self) -> Option<&str> {
        self.ty.as_ref().and_then(|t| t.qual_type.as_deref())
    }
}

impl RecordData {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn is_implicit(&self) -> bool {
        self.is_implicit.unwrap_or(false)
    }
    /// Base specifier type texts in declaration order.
    pub fn base_types(&self) -> Vec<String> {
        self.bases
            .iter()
            .filter_map(|b| b.ty.as_ref().and_then(|t| t.qual_type.as_deref()))
            .map(str::to_owned)
            .collect()
    }
}

impl TemplateArgumentData {
    /// Display text of the argument (`"int"`, `"2"`), if representable.
    pub fn display(&self) -> Option<String> {
        if let Some(t) = self.ty.as_ref().and_then(|t| t.qual_type.as_deref()) {
            return Some(t.to_owned());
        }
        self.value.map(|v| v.to_string())
    }
}

/// Extract the best concrete source location from a [`SourceLocation`].
///
/// Prefers the expansion location (where a macro was invoked — the position
/// the user sees in their source file) over the spelling location (inside the
/// macro definition).
pub fn resolve_loc(loc: &SourceLocation) -> Option<&BareSourceLocation> {
    loc.expansion_loc.as_ref().or(loc.spelling_loc.as_ref())
}

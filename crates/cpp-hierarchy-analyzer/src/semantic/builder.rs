use std::collections::HashMap;

use clang_ast::BareSourceLocation;
use tower_lsp::lsp_types::{Position, Range};
use tracing::debug;

use super::clang_nodes::{Clang, DeclData, Node, RecordData, resolve_loc};
use super::model::{AnchorTarget, DEFAULT_TEMPLATE_DEPTH, PositionAnchor, RecordId, SemanticModel};
use super::record::{RecordInfo, RecordKind, TemplateForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberKind {
    Field,
    Method,
}

/// Accumulates records, anchors and member ownership during the AST walk.
#[derive(Default)]
struct Collector {
    records: Vec<RecordInfo>,
    anchors: Vec<PositionAnchor>,
    aliases: HashMap<String, String>,
    /// Member decl id -> (kind, owning record index).
    members: HashMap<String, (MemberKind, usize)>,
    /// Member accesses to resolve once all members are known:
    /// (file, line, col, len, member decl id).
    member_refs: Vec<(String, u32, u32, u32, String)>,
}

/// Build a [`SemanticModel`] from a deserialized Clang AST root node.
///
/// `tmp_files` are the possible paths of the temp file that was compiled.
/// `original_file` is the real document path — any location whose file
/// matches one of `tmp_files` is rewritten to `original_file`.
pub fn build_model(
    root: &Node,
    tmp_files: &[String],
    original_file: Option<&str>,
    template_depth: Option<usize>,
) -> SemanticModel {
    let mut collector = Collector::default();
    collector.walk(root, None, &[]);
    collector.resolve_member_refs();

    let Collector {
        mut records,
        mut anchors,
        aliases,
        ..
    } = collector;

    debug!("[build-model] collected {} records, {} anchors (original_file={:?})", records.len(), anchors.len(), original_file,);

    if let Some(orig) = original_file {
        for rec in &mut records {
            if tmp_files.iter().any(|tmp| paths_equivalent(&rec.file, tmp)) {
                rec.file = orig.to_owned();
            }
        }
        for anchor in &mut anchors {
            if tmp_files.iter().any(|tmp| paths_equivalent(&anchor.file, tmp)) {
                anchor.file = orig.to_owned();
            }
        }
    }

    let mut model = SemanticModel::new(records, anchors, aliases, template_depth.unwrap_or(DEFAULT_TEMPLATE_DEPTH));
    model.primary_file = original_file.map(str::to_owned);
    model
}

impl Collector {
    fn walk(
        &mut self,
        node: &Node,
        owner: Option<usize>,
        params: &[String],
    ) {
        match &node.kind {
            Clang::ClassTemplateDecl(d) => {
                self.walk_class_template(node, d, owner, params);
            },

            Clang::CXXRecordDecl(rd) => {
                if rd.is_implicit() || rd.name().is_none_or(str::is_empty) {
                    // Injected-class-name or anonymous record: nothing to
                    // collect, but members inside still belong to `owner`.
                    self.walk_children(node, owner, params);
                    return;
                }
                match self.collect_record(node, rd, TemplateForm::None, params.to_vec()) {
                    Some(idx) => self.walk_children(node, Some(idx), params),
                    None => self.walk_children(node, owner, params),
                }
            },

            Clang::ClassTemplateSpecializationDecl(rd) => {
                // Reached outside a ClassTemplateDecl: a user-written
                // specialization at its lexical position.
                let form = TemplateForm::ExplicitSpecialization {
                    template: rd.name().unwrap_or_default().to_owned(),
                    args: template_args(node),
                };
                match self.collect_record(node, rd, form, Vec::new()) {
                    Some(idx) => self.walk_children(node, Some(idx), &[]),
                    None => self.walk_children(node, owner, params),
                }
            },

            Clang::ClassTemplatePartialSpecializationDecl(rd) => {
                let own_params = template_param_names(node);
                let form = TemplateForm::ExplicitSpecialization {
                    template: rd.name().unwrap_or_default().to_owned(),
                    args: template_args(node),
                };
                match self.collect_record(node, rd, form, own_params.clone()) {
                    Some(idx) => self.walk_children(node, Some(idx), &own_params),
                    None => self.walk_children(node, owner, params),
                }
            },

            Clang::TypedefDecl(d) | Clang::TypeAliasDecl(d) => {
                if let (Some(name), Some(underlying)) = (d.name(), d.qual_type())
                    && !d.is_implicit()
                {
                    self.aliases.insert(name.to_owned(), underlying.to_owned());
                }
                self.walk_children(node, owner, params);
            },

            Clang::CXXMethodDecl(d) | Clang::CXXConstructorDecl(d) => {
                if let Some(owner_idx) = owner
                    && !d.is_implicit()
                {
                    // A method is not itself typed as a record, so its name
                    // unambiguously denotes the owning record.
                    if let Some(bare) = d.loc.as_ref().and_then(resolve_loc) {
                        self.push_anchor(bare, AnchorTarget::Record(RecordId::from_index(owner_idx)));
                    }
                    self.members.insert(node.id.to_string(), (MemberKind::Method, owner_idx));
                }
                self.walk_children(node, owner, params);
            },

            Clang::FieldDecl(d) => {
                if let Some(owner_idx) = owner
                    && !d.is_implicit()
                {
                    if let Some(bare) = d.loc.as_ref().and_then(resolve_loc) {
                        self.push_anchor(bare, AnchorTarget::AmbiguousMember);
                    }
                    self.members.insert(node.id.to_string(), (MemberKind::Field, owner_idx));
                    self.push_type_token_anchor(d);
                }
                self.walk_children(node, owner, params);
            },

            Clang::VarDecl(d) | Clang::ParmVarDecl(d) => {
                if !d.is_implicit()
                    && let Some(qual_type) = d.qual_type()
                {
                    // The declared-name token resolves to the variable's
                    // record type, as does the declared-type token.
                    if let Some(bare) = d.loc.as_ref().and_then(resolve_loc) {
                        self.push_anchor(bare, AnchorTarget::Type(qual_type.to_owned()));
                    }
                    self.push_type_token_anchor(d);
                }
                self.walk_children(node, owner, params);
            },

            Clang::DeclRefExpr(r) => {
                if !r.is_implicit.unwrap_or(false)
                    && let Some(referenced) = &r.referenced_decl
                    && matches!(
                        referenced.kind.as_deref(),
                        Some("VarDecl" | "ParmVarDecl" | "FieldDecl" | "NonTypeTemplateParmDecl")
                    )
                    && let Some(qual_type) = referenced.ty.as_ref().and_then(|t| t.qual_type.as_deref())
                {
                    let loc = r.loc.as_ref().or(r.range.as_ref().map(|range| &range.begin));
                    if let Some(bare) = loc.and_then(resolve_loc) {
                        self.push_anchor(bare, AnchorTarget::Type(qual_type.to_owned()));
                    }
                }
                self.walk_children(node, owner, params);
            },

            Clang::MemberExpr(m) => {
                if !m.is_implicit.unwrap_or(false)
                    && let Some(target) = &m.referenced_member_decl
                    && let Some(bare) = m.loc.as_ref().and_then(resolve_loc)
                    && bare.line > 0
                {
                    self.member_refs.push((
                        bare.file.to_string(),
                        bare.line as u32,
                        bare.col as u32,
                        bare.tok_len as u32,
                        target.to_string(),
                    ));
                }
                self.walk_children(node, owner, params);
            },

            Clang::TemplateTypeParmDecl(_)
            | Clang::NonTypeTemplateParmDecl(_)
            | Clang::TemplateTemplateParmDecl(_)
            | Clang::TemplateArgument(_)
            | Clang::Other {
                ..
            } => {
                self.walk_children(node, owner, params);
            },
        }
    }

    /// A `ClassTemplateDecl` wraps its parameter list, the pattern record,
    /// and the specializations Clang materialized for this TU. User-written
    /// specializations appear at their own lexical position instead, which
    /// is what distinguishes the two without sema.
    fn walk_class_template(
        &mut self,
        node: &Node,
        data: &DeclData,
        owner: Option<usize>,
        outer_params: &[String],
    ) {
        let template_name = match data.name() {
            Some(n) if !n.is_empty() => n.to_owned(),
            _ => {
                self.walk_children(node, owner, outer_params);
                return;
            },
        };

        let mut params = outer_params.to_vec();
        params.extend(template_param_names(node));

        for child in &node.inner {
            match &child.kind {
                Clang::CXXRecordDecl(rd) if rd.name() == Some(template_name.as_str()) && !rd.is_implicit() => {
                    match self.collect_record(child, rd, TemplateForm::Primary, params.clone()) {
                        Some(idx) => self.walk_children(child, Some(idx), &params),
                        None => self.walk_children(child, owner, &params),
                    }
                },
                Clang::ClassTemplateSpecializationDecl(rd) => {
                    let form = TemplateForm::ImplicitInstantiation {
                        template: template_name.clone(),
                        args: template_args(child),
                    };
                    match self.collect_record(child, rd, form, Vec::new()) {
                        Some(idx) => self.walk_children(child, Some(idx), &[]),
                        None => self.walk_children(child, owner, &params),
                    }
                },
                _ => self.walk(child, owner, &params),
            }
        }
    }

    /// Collect one record declaration; returns its index in `records`.
    fn collect_record(
        &mut self,
        node: &Node,
        data: &RecordData,
        template: TemplateForm,
        template_params: Vec<String>,
    ) -> Option<usize> {
        let name = match data.name() {
            Some(n) if !n.is_empty() => n.to_owned(),
            _ => return None,
        };
        let bare = match data.loc.as_ref().and_then(resolve_loc) {
            Some(bare) if bare.line > 0 => bare,
            _ => return None,
        };

        let selection_range = token_range(bare);
        let declaration_range = data.range.as_ref().and_then(span_range).unwrap_or(selection_range);

        let idx = self.records.len();
        self.records.push(RecordInfo {
            id: node.id.to_string(),
            name,
            kind: RecordKind::from_tag(data.tag_used.as_deref()),
            template,
            template_params,
            bases: data.base_types(),
            is_definition: data.complete_definition,
            file: bare.file.to_string(),
            declaration_range,
            selection_range,
        });

        self.push_anchor(bare, AnchorTarget::Record(RecordId::from_index(idx)));
        Some(idx)
    }

    /// Anchor the first token of a declaration's extent — the written type —
    /// to the declaration's type.
    fn push_type_token_anchor(
        &mut self,
        data: &DeclData,
    ) {
        let Some(qual_type) = data.qual_type() else {
            return;
        };
        let begin = data.range.as_ref().and_then(|range| resolve_loc(&range.begin));
        let name_loc = data.loc.as_ref().and_then(resolve_loc);
        if let Some(bare) = begin {
            let shadows_name =
                name_loc.is_some_and(|name| name.file == bare.file && name.line == bare.line && name.col == bare.col);
            if !shadows_name {
                self.push_anchor(bare, AnchorTarget::Type(qual_type.to_owned()));
            }
        }
    }

    fn push_anchor(
        &mut self,
        bare: &BareSourceLocation,
        target: AnchorTarget,
    ) {
        if bare.line == 0 || bare.tok_len == 0 || bare.file.is_empty() {
            return;
        }
        self.anchors.push(PositionAnchor {
            file: bare.file.to_string(),
            line: bare.line as u32 - 1,
            col: bare.col.saturating_sub(1) as u32,
            len: bare.tok_len as u32,
            target,
        });
    }

    fn resolve_member_refs(&mut self) {
        let refs = std::mem::take(&mut self.member_refs);
        for (file, line, col, len, target_id) in refs {
            let target = match self.members.get(&target_id) {
                Some((MemberKind::Method, owner)) => AnchorTarget::Record(RecordId::from_index(*owner)),
                // A field name does not unambiguously specify a record type
                // (it suggests both the accessed record and the field's own
                // type), so the resolver must refuse it.
                Some((MemberKind::Field, _)) => AnchorTarget::AmbiguousMember,
                None => continue,
            };
            self.anchors.push(PositionAnchor {
                file,
                line: line - 1,
                col: col.saturating_sub(1),
                len,
                target,
            });
        }
    }

    fn walk_children(
        &mut self,
        node: &Node,
        owner: Option<usize>,
        params: &[String],
    ) {
        for child in &node.inner {
            self.walk(child, owner, params);
        }
    }
}

/// Template parameter names declared directly under `node`, in order.
fn template_param_names(node: &Node) -> Vec<String> {
    let mut params = Vec::new();
    for child in &node.inner {
        match &child.kind {
            Clang::TemplateTypeParmDecl(d) | Clang::NonTypeTemplateParmDecl(d) | Clang::TemplateTemplateParmDecl(d) => {
                if let Some(name) = d.name() {
                    params.push(name.to_owned());
                }
            },
            _ => {},
        }
    }
    params
}

/// Display texts of the `TemplateArgument` children of a specialization.
fn template_args(node: &Node) -> Vec<String> {
    node.inner
        .iter()
        .filter_map(|child| match &child.kind {
            Clang::TemplateArgument(arg) => arg.display(),
            _ => None,
        })
        .collect()
}

/// 0-based single-token range.
fn token_range(bare: &BareSourceLocation) -> Range {
    let line = bare.line.saturating_sub(1) as u32;
    let col = bare.col.saturating_sub(1) as u32;
    Range::new(Position::new(line, col), Position::new(line, col + bare.tok_len as u32))
}

/// 0-based range covering a source extent, through the last token.
fn span_range(range: &clang_ast::SourceRange) -> Option<Range> {
    let begin = resolve_loc(&range.begin)?;
    let end = resolve_loc(&range.end)?;
    Some(Range::new(
        Position::new(begin.line.saturating_sub(1) as u32, begin.col.saturating_sub(1) as u32),
        Position::new(end.line.saturating_sub(1) as u32, (end.col.saturating_sub(1) + end.tok_len) as u32),
    ))
}

/// Check if two file paths refer to the same file.
///
/// Handles the common case where the AST dump reports a canonicalized path
/// while the temp file list has the original path (or vice versa).
fn paths_equivalent(
    a: &str,
    b: &str,
) -> bool {
    if a == b {
        return true;
    }
    let pa = std::path::Path::new(a);
    let pb = std::path::Path::new(b);
    if let (Ok(ca), Ok(cb)) = (pa.canonicalize(), pb.canonicalize()) {
        return ca == cb;
    }
    // Last resort: compare file names only.
    matches!((pa.file_name(), pb.file_name()), (Some(fa), Some(fb)) if fa == fb)
}

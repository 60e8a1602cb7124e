use std::collections::HashMap;

use tower_lsp::lsp_types::{Position, Range};

use super::*;
use crate::semantic::RecordKind;

fn rec(
    name: &str,
    template: TemplateForm,
    params: &[&str],
    bases: &[&str],
    is_definition: bool,
) -> RecordInfo {
    RecordInfo {
        id: format!("0x{name:?}"),
        name: name.to_owned(),
        kind: RecordKind::Struct,
        template,
        template_params: params.iter().map(|p| (*p).to_owned()).collect(),
        bases: bases.iter().map(|b| (*b).to_owned()).collect(),
        is_definition,
        file: "/tmp/test.cpp".to_owned(),
        declaration_range: Range::default(),
        selection_range: Range::default(),
    }
}

fn model(records: Vec<RecordInfo>) -> SemanticModel {
    SemanticModel::new(records, Vec::new(), HashMap::new(), DEFAULT_TEMPLATE_DEPTH)
}

#[test]
fn lookup_prefers_complete_definition_over_forward_declaration() {
    let model = model(vec![
        rec("Child", TemplateForm::None, &[], &[], false),
        rec("Child", TemplateForm::None, &[], &["Parent"], true),
    ]);

    let id = model.lookup_record("Child").expect("record");
    assert!(model.record(id).is_definition);
    assert_eq!(model.record(id).bases, vec!["Parent".to_owned()]);
}

#[test]
fn lookup_ignores_template_patterns_and_specializations() {
    let model = model(vec![rec("S", TemplateForm::Primary, &["N"], &[], true)]);
    assert_eq!(model.lookup_record("S"), None);
    assert!(model.primary_pattern("S").is_some());
}

#[test]
fn finds_explicit_specialization_with_normalized_arguments() {
    let spec = TemplateForm::ExplicitSpecialization {
        template: "Parent".to_owned(),
        args: vec!["int".to_owned()],
    };
    let model = model(vec![
        rec("Parent", TemplateForm::Primary, &["T"], &[], true),
        rec("Parent", spec, &[], &[], true),
    ]);

    let (id, is_explicit) = model.find_specialization("Parent", &["int".to_owned()]).expect("specialization");
    assert!(is_explicit);
    assert_eq!(model.record(id).display_name(), "Parent<int>");
}

#[test]
fn materialization_substitutes_pattern_bases_and_is_cached() {
    let model = model(vec![
        rec("Base", TemplateForm::None, &[], &[], true),
        rec("Parent", TemplateForm::Primary, &["T"], &["Base"], true),
    ]);

    let first = model.materialize_instantiation("Parent", &["float".to_owned()]).expect("instantiation");
    let second = model.materialize_instantiation("Parent", &["float".to_owned()]).expect("instantiation");
    assert_eq!(first, second);

    let record = model.record(first);
    assert_eq!(record.display_name(), "Parent<float>");
    assert!(record.template.is_implicit_instantiation_of("Parent"));
    assert_eq!(record.bases, vec!["Base".to_owned()]);
}

#[test]
fn materialization_carries_argument_text_into_dependent_bases() {
    let model = model(vec![rec("S", TemplateForm::Primary, &["N"], &["S<N + 1>"], true)]);

    let id = model.materialize_instantiation("S", &["0".to_owned()]).expect("instantiation");
    assert_eq!(model.record(id).bases, vec!["S<0 + 1>".to_owned()]);
}

#[test]
fn materialization_stops_at_the_depth_budget() {
    let records = vec![rec("Parent", TemplateForm::Primary, &["T"], &[], true)];
    let model = SemanticModel::new(records, Vec::new(), HashMap::new(), 1);

    assert!(model.materialize_instantiation("Parent", &["int".to_owned()]).is_some());
    assert_eq!(model.materialize_instantiation("Parent", &["char".to_owned()]), None);
    // The cached first instantiation is still reachable.
    assert!(model.materialize_instantiation("Parent", &["int".to_owned()]).is_some());
}

#[test]
fn resolves_written_type_through_alias_chain() {
    let mut aliases = HashMap::new();
    aliases.insert("Alias".to_owned(), "Inner".to_owned());
    aliases.insert("Inner".to_owned(), "Child".to_owned());
    let model = SemanticModel::new(
        vec![rec("Child", TemplateForm::None, &[], &[], true)],
        Vec::new(),
        aliases,
        DEFAULT_TEMPLATE_DEPTH,
    );

    let id = model.resolve_written_type("const Alias &").expect("record");
    assert_eq!(model.record(id).name, "Child");
}

#[test]
fn written_template_id_materializes_when_no_specialization_exists() {
    let model = model(vec![rec("Parent", TemplateForm::Primary, &["T"], &[], true)]);

    let id = model.resolve_written_type("Parent<int>").expect("record");
    assert!(model.record(id).template.is_implicit_instantiation_of("Parent"));
}

#[test]
fn dependent_member_suffix_never_resolves() {
    let model = model(vec![rec("Parent", TemplateForm::Primary, &["T"], &[], true)]);
    assert_eq!(model.resolve_written_type("Parent<int>::Type"), None);
}

#[test]
fn display_name_lookup_covers_materialized_records() {
    let model = model(vec![rec("Parent", TemplateForm::Primary, &["T"], &[], true)]);
    let id = model.materialize_instantiation("Parent", &["int".to_owned()]).expect("instantiation");

    assert_eq!(model.record_by_display_name("Parent<int>"), Some(id));
    assert_eq!(model.record_by_display_name("Parent< int >"), Some(id));
    assert_eq!(model.record_by_display_name("Parent<char>"), None);
}

#[test]
fn display_name_resume_prefers_the_definition_over_a_forward_declaration() {
    let model = model(vec![
        rec("Parent", TemplateForm::None, &[], &[], true),
        rec("Child", TemplateForm::None, &[], &[], false),
        rec("Child", TemplateForm::None, &[], &["Parent"], true),
    ]);

    let id = model.record_by_display_name("Child").expect("record");
    let record = model.record(id);
    assert!(record.is_definition);
    assert_eq!(record.bases, vec!["Parent".to_owned()]);
}

#[test]
fn forward_declaration_is_still_reachable_when_nothing_else_matches() {
    let model = model(vec![rec("Child", TemplateForm::None, &[], &[], false)]);

    let id = model.record_by_display_name("Child").expect("record");
    assert!(!model.record(id).is_definition);
}

#[test]
fn header_anchors_never_shadow_positions_in_the_primary_file() {
    let header_anchor = PositionAnchor {
        file: "/usr/include/widgets.h".to_owned(),
        line: 0,
        col: 0,
        len: 10,
        target: AnchorTarget::Type("HeaderThing".to_owned()),
    };
    let document_anchor = PositionAnchor {
        file: "/tmp/test.cpp".to_owned(),
        line: 0,
        col: 0,
        len: 5,
        target: AnchorTarget::Type("Local".to_owned()),
    };

    let mut model = SemanticModel::new(
        Vec::new(),
        vec![header_anchor.clone(), document_anchor],
        HashMap::new(),
        DEFAULT_TEMPLATE_DEPTH,
    );
    model.primary_file = Some("/tmp/test.cpp".to_owned());

    let anchor = model.anchor_at(Position::new(0, 2)).expect("anchor");
    assert_eq!(anchor.target, AnchorTarget::Type("Local".to_owned()));

    // Position covered only by the header anchor: no match at all.
    assert!(model.anchor_at(Position::new(0, 7)).is_none());

    // Without a primary file the lookup stays permissive.
    let model = SemanticModel::new(Vec::new(), vec![header_anchor], HashMap::new(), DEFAULT_TEMPLATE_DEPTH);
    assert!(model.anchor_at(Position::new(0, 2)).is_some());
}

#[test]
fn anchor_lookup_picks_the_narrowest_containing_token() {
    let anchors = vec![
        PositionAnchor {
            file: "/tmp/test.cpp".to_owned(),
            line: 3,
            col: 0,
            len: 20,
            target: AnchorTarget::Type("Outer".to_owned()),
        },
        PositionAnchor {
            file: "/tmp/test.cpp".to_owned(),
            line: 3,
            col: 4,
            len: 5,
            target: AnchorTarget::Type("Inner".to_owned()),
        },
    ];
    let model = SemanticModel::new(Vec::new(), anchors, HashMap::new(), DEFAULT_TEMPLATE_DEPTH);

    let anchor = model.anchor_at(Position::new(3, 6)).expect("anchor");
    assert_eq!(anchor.target, AnchorTarget::Type("Inner".to_owned()));

    let anchor = model.anchor_at(Position::new(3, 15)).expect("anchor");
    assert_eq!(anchor.target, AnchorTarget::Type("Outer".to_owned()));

    assert!(model.anchor_at(Position::new(4, 0)).is_none());
}

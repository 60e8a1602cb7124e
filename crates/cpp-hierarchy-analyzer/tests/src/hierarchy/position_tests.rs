use std::collections::HashMap;

use tower_lsp::lsp_types::Range;

use super::*;
use crate::semantic::{PositionAnchor, RecordInfo, RecordKind, TemplateForm};

fn record(name: &str) -> RecordInfo {
    RecordInfo {
        id: String::new(),
        name: name.to_owned(),
        kind: RecordKind::Struct,
        template: TemplateForm::None,
        template_params: Vec::new(),
        bases: Vec::new(),
        is_definition: true,
        file: "/tmp/test.cpp".to_owned(),
        declaration_range: Range::default(),
        selection_range: Range::default(),
    }
}

fn anchor(
    line: u32,
    col: u32,
    len: u32,
    target: AnchorTarget,
) -> PositionAnchor {
    PositionAnchor {
        file: "/tmp/test.cpp".to_owned(),
        line,
        col,
        len,
        target,
    }
}

fn model_with(anchors: Vec<PositionAnchor>) -> SemanticModel {
    SemanticModel::new(vec![record("Child"), record("Parent")], anchors, HashMap::new(), 256)
}

#[test]
fn resolves_on_a_type_name_token() {
    let model = model_with(Vec::new());
    let child = model.lookup_record("Child").expect("record");
    let model = model_with(vec![anchor(0, 7, 5, AnchorTarget::Record(child))]);

    assert_eq!(find_record_type_at(&model, Position::new(0, 8)), Some(child));
}

#[test]
fn resolves_through_a_variable_written_type() {
    let model = model_with(vec![anchor(2, 2, 3, AnchorTarget::Type("const Parent &".to_owned()))]);
    let parent = model.lookup_record("Parent").expect("record");

    assert_eq!(find_record_type_at(&model, Position::new(2, 2)), Some(parent));
}

#[test]
fn field_positions_are_ambiguous_and_refuse_to_resolve() {
    let model = model_with(vec![anchor(5, 10, 6, AnchorTarget::AmbiguousMember)]);
    assert_eq!(find_record_type_at(&model, Position::new(5, 12)), None);
}

#[test]
fn unknown_written_types_and_bare_positions_yield_nothing() {
    let model = model_with(vec![anchor(1, 0, 7, AnchorTarget::Type("Missing".to_owned()))]);
    assert_eq!(find_record_type_at(&model, Position::new(1, 3)), None);
    assert_eq!(find_record_type_at(&model, Position::new(9, 0)), None);
}

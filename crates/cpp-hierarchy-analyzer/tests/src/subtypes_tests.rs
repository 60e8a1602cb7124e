use std::collections::HashMap;

use tower_lsp::lsp_types::Range;

use super::*;
use crate::semantic::{RecordInfo, RecordKind, TemplateForm};

fn rec(
    name: &str,
    bases: &[&str],
) -> RecordInfo {
    RecordInfo {
        id: String::new(),
        name: name.to_owned(),
        kind: RecordKind::Struct,
        template: TemplateForm::None,
        template_params: Vec::new(),
        bases: bases.iter().map(|b| (*b).to_owned()).collect(),
        is_definition: true,
        file: "/tmp/test.cpp".to_owned(),
        declaration_range: Range::default(),
        selection_range: Range::default(),
    }
}

#[test]
fn reverses_base_edges_in_declaration_order() {
    let model = SemanticModel::new(
        vec![
            rec("Parent", &[]),
            rec("Child2", &["Parent"]),
            rec("Child1", &["Parent"]),
            rec("Grandchild", &["Child1"]),
        ],
        Vec::new(),
        HashMap::new(),
        256,
    );
    let index = SubtypeIndex::build(&model);

    let parent = model.lookup_record("Parent").expect("record");
    let subs: Vec<String> =
        index.direct_subtypes(&model, parent).into_iter().map(|id| model.record(id).name).collect();
    assert_eq!(subs, vec!["Child2", "Child1"]);

    let child1 = model.lookup_record("Child1").expect("record");
    let subs: Vec<String> =
        index.direct_subtypes(&model, child1).into_iter().map(|id| model.record(id).name).collect();
    assert_eq!(subs, vec!["Grandchild"]);
}

#[test]
fn leaves_and_unknown_records_have_no_subtypes() {
    let model = SemanticModel::new(
        vec![rec("Parent", &[]), rec("Child", &["Parent"])],
        Vec::new(),
        HashMap::new(),
        256,
    );
    let index = SubtypeIndex::build(&model);

    let child = model.lookup_record("Child").expect("record");
    assert!(index.direct_subtypes(&model, child).is_empty());
}

use std::collections::HashMap;

use tower_lsp::lsp_types::Range;

use super::*;
use crate::semantic::{RecordKind, TemplateForm};

fn rec(
    name: &str,
    template: TemplateForm,
    params: &[&str],
    bases: &[&str],
    is_definition: bool,
) -> RecordInfo {
    RecordInfo {
        id: String::new(),
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
    SemanticModel::new(records, Vec::new(), HashMap::new(), 256)
}

fn names(
    model: &SemanticModel,
    ids: &[RecordId],
) -> Vec<String> {
    ids.iter().map(|&id| model.record(id).display_name()).collect()
}

#[test]
fn single_base_resolves_to_its_definition() {
    let model = model(vec![
        rec("Parent", TemplateForm::None, &[], &[], true),
        rec("Child", TemplateForm::None, &[], &["Parent"], true),
    ]);
    let child = model.lookup_record("Child").expect("record");

    assert_eq!(names(&model, &type_parents(&model, child)), vec!["Parent"]);
}

#[test]
fn multiple_bases_keep_declaration_order() {
    let model = model(vec![
        rec("Parent1", TemplateForm::None, &[], &[], true),
        rec("Parent2", TemplateForm::None, &[], &[], true),
        rec("Parent3", TemplateForm::None, &[], &["Parent2"], true),
        rec("Child", TemplateForm::None, &[], &["Parent3", "Parent1"], true),
    ]);
    let child = model.lookup_record("Child").expect("record");

    assert_eq!(names(&model, &type_parents(&model, child)), vec!["Parent3", "Parent1"]);
}

#[test]
fn incomplete_records_enumerate_no_bases() {
    let model = model(vec![
        rec("Parent", TemplateForm::None, &[], &[], true),
        rec("Child", TemplateForm::None, &[], &["Parent"], false),
    ]);
    let child = model.records_named("Child")[0];

    assert!(type_parents(&model, child).is_empty());
}

#[test]
fn written_arguments_matching_an_explicit_specialization_resolve_to_it() {
    let spec = TemplateForm::ExplicitSpecialization {
        template: "Parent".to_owned(),
        args: vec!["int".to_owned()],
    };
    let model = model(vec![
        rec("Parent", TemplateForm::Primary, &["T"], &[], true),
        rec("Parent", spec, &[], &[], true),
        rec("Child", TemplateForm::None, &[], &["Parent<int>"], true),
    ]);
    let child = model.lookup_record("Child").expect("record");

    let base = resolve_base(&model, &model.record(child), "Parent<int>");
    assert!(matches!(base, ResolvedBase::ExplicitSpecialization(_)));
    assert_eq!(names(&model, &type_parents(&model, child)), vec!["Parent<int>"]);
}

#[test]
fn concrete_arguments_without_a_specialization_materialize_an_instantiation() {
    let model = model(vec![
        rec("Parent", TemplateForm::Primary, &["T"], &[], true),
        rec("Child", TemplateForm::None, &[], &["Parent<float>"], true),
    ]);
    let child = model.lookup_record("Child").expect("record");

    let base = resolve_base(&model, &model.record(child), "Parent<float>");
    let ResolvedBase::ImplicitInstantiation(id) = base else {
        panic!("expected implicit instantiation, got {base:?}");
    };
    assert_eq!(model.record(id).display_name(), "Parent<float>");
}

#[test]
fn dependent_arguments_fall_back_to_the_primary_template() {
    let model = model(vec![
        rec("Parent", TemplateForm::Primary, &["T"], &[], true),
        rec("Child", TemplateForm::Primary, &["T"], &["Parent<T>"], true),
    ]);
    let child = model.primary_pattern("Child").expect("pattern");
    let parent = model.primary_pattern("Parent").expect("pattern");

    let base = resolve_base(&model, &model.record(child), "Parent<T>");
    assert_eq!(base, ResolvedBase::Concrete(parent));
}

#[test]
fn dependent_member_types_and_bare_parameters_are_omitted() {
    let model = model(vec![
        rec("Parent", TemplateForm::Primary, &["T"], &[], true),
        rec("Child1", TemplateForm::Primary, &["T"], &["typename Parent<T>::Type"], true),
        rec("Child2", TemplateForm::Primary, &["T"], &["T"], true),
    ]);
    let child1 = model.primary_pattern("Child1").expect("pattern");
    let child2 = model.primary_pattern("Child2").expect("pattern");

    assert!(type_parents(&model, child1).is_empty());
    assert!(type_parents(&model, child2).is_empty());
}

#[test]
fn unknown_base_names_are_omitted_not_guessed() {
    let model = model(vec![rec("Child", TemplateForm::None, &[], &["Nowhere"], true)]);
    let child = model.lookup_record("Child").expect("record");

    assert_eq!(resolve_base(&model, &model.record(child), "Nowhere"), ResolvedBase::Unresolved);
    assert!(type_parents(&model, child).is_empty());
}

use serde_json::json;

use super::*;

#[test]
fn defaults_are_sensible() {
    let settings = ServerSettings::default();
    assert_eq!(settings.compiler.path, "clang++");
    assert!(settings.compiler.include_paths.is_empty());
    assert!(settings.compiler.extra_flags.is_empty());
    assert_eq!(settings.compiler.template_depth, 256);
}

#[test]
fn merges_a_sectioned_configuration_payload() {
    let payload = json!({
        "cpp-hierarchy-analyzer": {
            "compiler": {
                "path": "/opt/llvm/bin/clang++",
                "includePaths": ["/usr/local/include"],
                "templateDepth": 64
            }
        }
    });

    let settings = ServerSettings::default().merged_with_payload(&payload);
    assert_eq!(settings.compiler.path, "/opt/llvm/bin/clang++");
    assert_eq!(settings.compiler.include_paths, vec!["/usr/local/include".to_owned()]);
    assert_eq!(settings.compiler.template_depth, 64);
}

#[test]
fn accepts_a_bare_settings_object() {
    let payload = json!({ "compiler": { "extraFlags": ["-std=c++20"] } });

    let settings = ServerSettings::default().merged_with_payload(&payload);
    assert_eq!(settings.compiler.extra_flags, vec!["-std=c++20".to_owned()]);
    // Untouched fields keep their defaults.
    assert_eq!(settings.compiler.path, "clang++");
}

#[test]
fn invalid_payloads_keep_the_current_settings() {
    let mut current = ServerSettings::default();
    current.compiler.path = "/custom/clang++".to_owned();

    let merged = current.merged_with_payload(&json!({ "compiler": { "templateDepth": "not a number" } }));
    assert_eq!(merged, current);
}

#[test]
fn initialization_options_feed_the_initial_settings() {
    let payload = json!({ "compiler": { "path": "clang++-18" } });
    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert_eq!(settings.compiler.path, "clang++-18");

    assert_eq!(ServerSettings::from_lsp_payload(None), ServerSettings::default());
}

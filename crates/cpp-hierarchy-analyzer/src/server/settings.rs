use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

const SETTINGS_SECTION: &str = "cpp-hierarchy-analyzer";

/// Runtime server settings, updated from LSP configuration payloads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerSettings {
    pub compiler: CompilerSettings,
}

/// How the external Clang front end is invoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerSettings {
    /// Compiler executable used for AST dumps.
    pub path: String,
    pub include_paths: Vec<String>,
    pub extra_flags: Vec<String>,
    /// On-demand template instantiation budget of the semantic model.
    pub template_depth: usize,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            path: "clang++".to_owned(),
            include_paths: Vec::new(),
            extra_flags: Vec::new(),
            template_depth: 256,
        }
    }
}

impl ServerSettings {
    /// Settings from `initialize`'s `initialization_options`, if any.
    pub fn from_lsp_payload(value: Option<&Value>) -> Self {
        match value {
            Some(v) => Self::default().merged_with_payload(v),
            None => Self::default(),
        }
    }

    /// Apply a `workspace/didChangeConfiguration` payload.
    ///
    /// Accepts either the bare settings object or one nested under the
    /// server's section name. An unparsable payload keeps the current
    /// settings.
    pub fn merged_with_payload(
        &self,
        value: &Value,
    ) -> Self {
        let section = value.get(SETTINGS_SECTION).unwrap_or(value);
        match serde_json::from_value::<ServerSettings>(section.clone()) {
            Ok(settings) => settings,
            Err(error) => {
                warn!("Ignoring invalid settings payload: {error}");
                self.clone()
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/server/settings_tests.rs"]
mod tests;

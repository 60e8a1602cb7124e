use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tower_lsp::{Client, lsp_types::Url};
use tracing::{debug, warn};

use crate::{
    document::DocumentStore,
    semantic::{Node, SemanticModel, ast_dump::run_ast_dump, build_model},
    server::settings::ServerSettings,
    vfs::FileId,
};

/// The cpp-hierarchy-analyzer backend that implements the Language Server
/// Protocol.
pub struct HierarchyLanguageServer {
    /// The LSP client handle, used to send notifications back.
    pub(crate) client: Client,

    /// Thread-safe store of all open documents.
    pub(crate) document_store: Arc<DocumentStore>,

    /// Per-document semantic model cache: `(content hash, model)`.
    ///
    /// A model is an immutable snapshot of one AST dump; repeated hierarchy
    /// requests against unchanged content reuse it.
    pub(crate) models: DashMap<FileId, (String, Arc<SemanticModel>)>,

    /// Runtime server settings updated from LSP configuration.
    pub(crate) settings: Arc<RwLock<ServerSettings>>,
}

impl HierarchyLanguageServer {
    /// Create a new server wired to the given LSP client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            document_store: Arc::new(DocumentStore::new()),
            models: DashMap::new(),
            settings: Arc::new(RwLock::new(ServerSettings::default())),
        }
    }

    pub(crate) async fn settings_snapshot(&self) -> ServerSettings {
        self.settings.read().await.clone()
    }

    pub(crate) async fn apply_settings(
        &self,
        settings: ServerSettings,
    ) {
        // Compiler knobs feed the AST dump, so cached models are stale.
        self.models.clear();
        *self.settings.write().await = settings;
    }

    pub(crate) fn evict(
        &self,
        uri: &Url,
    ) {
        self.models.remove(&FileId::from_url(uri));
    }

    /// Load the cached semantic model for a document, or build one by
    /// running the AST dump.
    pub(crate) async fn model_for(
        &self,
        uri: &Url,
        source: &str,
    ) -> Option<Arc<SemanticModel>> {
        let file_id = FileId::from_url(uri);
        let hash = content_hash(source);
        if let Some(entry) = self.models.get(&file_id).filter(|e| e.0 == hash) {
            debug!("[hierarchy] using cached semantic model for {uri} ({} records)", entry.1.records.len());
            return Some(Arc::clone(&entry.1));
        }

        let settings = self.settings_snapshot().await;
        let (ast_json, tmp_files) = run_ast_dump(
            source,
            uri,
            &settings.compiler.path,
            &settings.compiler.include_paths,
            &settings.compiler.extra_flags,
        )
        .await?;

        let root: Node = match serde_json::from_str(&ast_json) {
            Ok(v) => v,
            Err(error) => {
                warn!("Failed to parse AST JSON: {error}");
                return None;
            },
        };

        let source_path = uri.to_file_path().ok().map(|p| p.display().to_string());
        let model = Arc::new(build_model(
            &root,
            &tmp_files,
            source_path.as_deref(),
            Some(settings.compiler.template_depth),
        ));
        self.models.insert(file_id, (hash, Arc::clone(&model)));
        Some(model)
    }
}

pub(crate) fn content_hash(source: &str) -> String {
    use std::hash::{DefaultHasher, Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

use serde_json::Value;
use tower_lsp::{LanguageServer, jsonrpc::Result, lsp_types::*};
use tracing::{debug, info};

use crate::{
    hierarchy::{find_record_type_at, type_parents},
    semantic::{RecordId, RecordKind, SemanticModel},
    server::{settings::ServerSettings, state::HierarchyLanguageServer},
    subtypes::{SubtypeIndex, SubtypeSource},
};

#[tower_lsp::async_trait]
impl LanguageServer for HierarchyLanguageServer {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> Result<InitializeResult> {
        info!("Initializing cpp-hierarchy-analyzer...");

        let initial_settings = ServerSettings::from_lsp_payload(params.initialization_options.as_ref());
        self.apply_settings(initial_settings).await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                // This lsp-types has no typed field for the type hierarchy
                // capability, so it is advertised through `experimental`.
                experimental: Some(serde_json::json!({ "typeHierarchyProvider": true })),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "cpp-hierarchy-analyzer".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(
        &self,
        _: InitializedParams,
    ) {
        info!("cpp-hierarchy-analyzer initialized");
        self.client.log_message(MessageType::INFO, "cpp-hierarchy-analyzer ready").await;
    }

    async fn did_change_configuration(
        &self,
        params: DidChangeConfigurationParams,
    ) {
        let current = self.settings_snapshot().await;
        let merged = current.merged_with_payload(&params.settings);
        if merged == current {
            return;
        }
        self.apply_settings(merged).await;
        info!("Applied updated cpp-hierarchy-analyzer settings");
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down cpp-hierarchy-analyzer");
        Ok(())
    }

    async fn did_open(
        &self,
        params: DidOpenTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        let version = params.text_document.version;
        info!("Opened {} (v{version}, {} bytes)", short_name(&uri), text.len());
        self.document_store.open(uri, text, version);
    }

    async fn did_change(
        &self,
        params: DidChangeTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        // FULL sync: the last change carries the complete new content.
        if let Some(change) = params.content_changes.into_iter().next_back() {
            self.document_store.update(uri.clone(), change.text, params.text_document.version);
        }
        self.evict(&uri);
    }

    async fn did_close(
        &self,
        params: DidCloseTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        info!("Closed {}", short_name(&uri));
        self.document_store.close(&uri);
        self.evict(&uri);
    }

    async fn prepare_type_hierarchy(
        &self,
        params: TypeHierarchyPrepareParams,
    ) -> Result<Option<Vec<TypeHierarchyItem>>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        debug!("[type-hierarchy] prepare at {}:{}:{}", short_name(&uri), position.line, position.character);

        let Some(source) = self.document_store.get_content(&uri) else {
            return Ok(None);
        };
        let Some(model) = self.model_for(&uri, &source).await else {
            return Ok(None);
        };
        let Some(root) = find_record_type_at(&model, position) else {
            debug!("[type-hierarchy] no record type at position");
            return Ok(None);
        };

        Ok(Some(vec![lsp_item(&model, root, &uri)]))
    }

    async fn supertypes(
        &self,
        params: TypeHierarchySupertypesParams,
    ) -> Result<Option<Vec<TypeHierarchyItem>>> {
        let item = params.item;
        let Some((model, record)) = self.resume_item(&item).await else {
            return Ok(None);
        };

        let supertypes: Vec<TypeHierarchyItem> =
            type_parents(&model, record).into_iter().map(|id| lsp_item(&model, id, &item.uri)).collect();
        Ok(Some(supertypes))
    }

    async fn subtypes(
        &self,
        params: TypeHierarchySubtypesParams,
    ) -> Result<Option<Vec<TypeHierarchyItem>>> {
        let item = params.item;
        let Some((model, record)) = self.resume_item(&item).await else {
            return Ok(None);
        };

        let index = SubtypeIndex::build(&model);
        let subtypes: Vec<TypeHierarchyItem> =
            index.direct_subtypes(&model, record).into_iter().map(|id| lsp_item(&model, id, &item.uri)).collect();
        Ok(Some(subtypes))
    }
}

impl HierarchyLanguageServer {
    /// Re-resolve the record behind a previously returned hierarchy item.
    ///
    /// The item's `data` carries the record's display name; the model is
    /// rebuilt (or fetched from cache) from the current document content.
    async fn resume_item(
        &self,
        item: &TypeHierarchyItem,
    ) -> Option<(std::sync::Arc<SemanticModel>, RecordId)> {
        let source = self.document_store.get_content(&item.uri)?;
        let model = self.model_for(&item.uri, &source).await?;
        let display = match &item.data {
            Some(Value::String(s)) => s.clone(),
            _ => item.name.clone(),
        };
        let record = model.record_by_display_name(&display)?;
        Some((model, record))
    }
}

fn lsp_item(
    model: &SemanticModel,
    id: RecordId,
    uri: &Url,
) -> TypeHierarchyItem {
    let record = model.record(id);
    let display = record.display_name();
    TypeHierarchyItem {
        name: record.name,
        kind: symbol_kind(record.kind),
        tags: None,
        // Template arguments show up as detail, not in the name itself.
        detail: display.contains('<').then(|| display.clone()),
        uri: uri.clone(),
        range: record.declaration_range,
        selection_range: record.selection_range,
        data: Some(Value::String(display)),
    }
}

fn symbol_kind(kind: RecordKind) -> SymbolKind {
    match kind {
        RecordKind::Class => SymbolKind::CLASS,
        // LSP has no union kind; structs are the closest fit.
        RecordKind::Struct | RecordKind::Union => SymbolKind::STRUCT,
    }
}

fn short_name(uri: &Url) -> String {
    uri.path_segments().and_then(|mut s| s.next_back()).unwrap_or("<unknown>").to_string()
}

//! Open-document tracking for the LSP layer.

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

/// One open text document.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    pub text: String,
    pub version: i32,
}

/// Thread-safe store of all open documents.
///
/// Uses `DashMap` internally so that all operations are safe to call
/// concurrently from any async task without external synchronisation.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (register) a new document.
    pub fn open(
        &self,
        uri: Url,
        text: String,
        version: i32,
    ) {
        self.documents.insert(uri.clone(), Document {
            uri,
            text,
            version,
        });
    }

    /// Replace the full content of an already-open document.
    ///
    /// This is the API used by `did_change` with `TextDocumentSyncKind::FULL`.
    pub fn update(
        &self,
        uri: Url,
        text: String,
        version: i32,
    ) {
        self.documents.insert(uri.clone(), Document {
            uri,
            text,
            version,
        });
    }

    /// Close (unregister) a document.
    pub fn close(
        &self,
        uri: &Url,
    ) {
        self.documents.remove(uri);
    }

    /// Return a clone of the full document text, if the URI is tracked.
    pub fn get_content(
        &self,
        uri: &Url,
    ) -> Option<String> {
        self.documents.get(uri).map(|r| r.value().text.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/src/document_store_tests.rs"]
mod tests;

//! Tower-lsp backend for the flux language service.
//!
//! The backend is a thin adapter: document events become overlay updates on
//! the program host, requests delegate to the provider modules, and the
//! host's anomaly log drains to the client's log channel. All shared state
//! lives behind mutexes because tower-lsp runs handlers concurrently.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use flux_analysis::cancel::CancelToken;
use flux_analysis::models::ModelService;
use flux_analysis::vfs::OsVfs;
use flux_analysis::watcher::SourceWatcher;
use flux_analysis::{ProgramHost, WorkspaceConfig};

/// The flux LSP server backend.
pub struct FluxBackend {
    client: Client,
    host: Arc<Mutex<ProgramHost>>,
    models: Mutex<Option<Arc<ModelService>>>,
    watcher: Mutex<Option<SourceWatcher>>,
    /// Open document texts keyed by URI.
    documents: Mutex<FxHashMap<String, String>>,
}

impl FluxBackend {
    /// Create a new backend. The workspace root is not known until
    /// `initialize`, so the host starts with the default configuration.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            host: Arc::new(Mutex::new(ProgramHost::new(
                WorkspaceConfig::default(),
                Box::new(OsVfs),
            ))),
            models: Mutex::new(None),
            watcher: Mutex::new(None),
            documents: Mutex::new(FxHashMap::default()),
        }
    }

    /// Update the overlay for a document and publish fresh diagnostics.
    async fn analyze_and_publish(&self, uri: Url, source: String) {
        self.documents
            .lock()
            .unwrap()
            .insert(uri.to_string(), source.clone());

        if let Ok(path) = uri.to_file_path() {
            self.host.lock().unwrap().update_overlay(&path, &source);
        }

        let diagnostics = match self.models.lock().unwrap().as_ref() {
            Some(service) => {
                let catalog = service.catalog();
                crate::diagnostics::dispatch_diagnostics(
                    &source,
                    &catalog.actions,
                    &CancelToken::new(),
                )
            }
            None => Vec::new(),
        };

        self.client
            .publish_diagnostics(uri, diagnostics, None)
            .await;

        self.drain_host_log().await;
    }

    /// Forward accumulated host anomalies to the client log.
    async fn drain_host_log(&self) {
        let entries = self.host.lock().unwrap().take_log();
        for entry in entries {
            self.client
                .log_message(
                    MessageType::WARNING,
                    format!("{}: {}", entry.path.display(), entry.message),
                )
                .await;
        }
    }

    fn document_text(&self, uri: &Url) -> Option<String> {
        self.documents.lock().unwrap().get(uri.as_str()).cloned()
    }

    fn model_service(&self) -> Option<Arc<ModelService>> {
        self.models.lock().unwrap().clone()
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for FluxBackend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Resolve the workspace root and point the host at its src tree.
        #[allow(deprecated)]
        let root: Option<PathBuf> = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|folder| folder.uri.to_file_path().ok())
            .or_else(|| params.root_uri.as_ref().and_then(|u| u.to_file_path().ok()));

        if let Some(root) = root {
            let config = WorkspaceConfig {
                src_root: root.join("src"),
                ..WorkspaceConfig::default()
            };
            let service = {
                let mut host = self.host.lock().unwrap();
                host.set_config(config.clone());
                ModelService::new(&mut host)
            };
            *self.models.lock().unwrap() = Some(service);

            if config.src_root.is_dir() {
                match SourceWatcher::spawn(&config.src_root, Arc::clone(&self.host)) {
                    Ok(watcher) => *self.watcher.lock().unwrap() = Some(watcher),
                    Err(err) => {
                        // Watcher failure degrades to save-driven updates.
                        self.client
                            .log_message(
                                MessageType::WARNING,
                                format!("filesystem watcher unavailable: {err}"),
                            )
                            .await;
                    }
                }
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                definition_provider: Some(OneOf::Left(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![
                        "{".to_string(),
                        "'".to_string(),
                        "\"".to_string(),
                    ]),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
                    retrigger_characters: None,
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "flux LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let source = params.text_document.text;
        self.analyze_and_publish(uri, source).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        // TextDocumentSyncKind::FULL: the first change carries the whole
        // document.
        if let Some(change) = params.content_changes.into_iter().next() {
            self.analyze_and_publish(uri, change.text).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri_str = params.text_document.uri.to_string();
        self.documents.lock().unwrap().remove(&uri_str);

        // Clear diagnostics for the closed document.
        self.client
            .publish_diagnostics(params.text_document.uri, vec![], None)
            .await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let (Some(source), Some(service)) = (self.document_text(&uri), self.model_service())
        else {
            return Ok(None);
        };

        let items = crate::completion::compute_completions(&source, &position, &service);
        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(CompletionResponse::Array(items)))
        }
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let (Some(source), Some(service)) = (self.document_text(&uri), self.model_service())
        else {
            return Ok(None);
        };

        let program = self.host.lock().unwrap().program();
        let links = crate::definition::find_definition(&source, &position, &service, &program);
        Ok(links.map(GotoDefinitionResponse::Link))
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let (Some(source), Some(service)) = (self.document_text(&uri), self.model_service())
        else {
            return Ok(None);
        };

        Ok(crate::signature_help::compute_signature_help(
            &source, &position, &service,
        ))
    }
}

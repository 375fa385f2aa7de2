use std::path::{Path, PathBuf};
use std::sync::Arc;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, error, info, warn};

use crate::compiler::{CompilerOptions, FrontEnd, FrontEndError, ProcessFrontEnd, Symbol};
use crate::config::ServerOptions;
use crate::lsp::capabilities::ClientFlags;
use crate::lsp::documents::Snapshot;
use crate::lsp::error::LspError;
use crate::lsp::navigation;
use crate::lsp::pool::RequestPool;
use crate::lsp::position::to_native;
use crate::lsp::session::Session;
use crate::lsp::settings::{ConfigurationSource, Settings};
use crate::lsp::symbols;
use crate::lsp::validation::{DiagnosticsPublisher, ValidationPool, Validator};

/// Compiler entry point behind a feature request
#[derive(Debug, Clone, Copy)]
enum Query {
    LookupName,
    AllOccurrences,
    Symbols,
}

impl Query {
    fn run(
        self,
        frontend: &dyn FrontEnd,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> std::result::Result<Vec<Symbol>, FrontEndError> {
        match self {
            Query::LookupName => frontend.lookup_name(path, text, options),
            Query::AllOccurrences => frontend.get_all_occurrences(path, text, options),
            Query::Symbols => frontend.get_symbols(path, text, options),
        }
    }
}

/// What a feature request needs after the compiler call
struct Answer {
    snapshot: Snapshot,
    options: Arc<CompilerOptions>,
    symbols: Vec<Symbol>,
}

pub struct Backend {
    client: Client,
    session: Arc<Session>,
    validation: ValidationPool,
    requests: RequestPool,
}

impl Backend {
    /// Backend driving the compiler executable at `compiler`.
    pub fn new(client: Client, compiler: PathBuf, options: ServerOptions) -> Self {
        Self::build(client, Arc::new(ProcessFrontEnd::new(compiler)), options)
    }

    pub fn build(client: Client, frontend: Arc<dyn FrontEnd>, options: ServerOptions) -> Self {
        let source: Arc<dyn ConfigurationSource> = Arc::new(client.clone());
        let settings = Settings::new(options.config_section, options.defaults, Some(source));
        let session = Arc::new(Session::new(frontend, settings));

        let publisher: Arc<dyn DiagnosticsPublisher> = Arc::new(client.clone());
        let validator = Arc::new(Validator::new(Arc::clone(&session), publisher));
        let validation = ValidationPool::spawn(options.num_worker_threads, validator);
        let requests = RequestPool::new(options.num_request_threads);

        info!(
            workers = options.num_worker_threads,
            request_threads = options.num_request_threads,
            "Backend created"
        );

        Self {
            client,
            session,
            validation,
            requests,
        }
    }

    async fn revalidate_all(&self) {
        let documents = self.session.documents().all().await;
        debug!(count = documents.len(), "Revalidating open documents");
        self.validation.validate_all(documents);
    }

    /// Runs `query` against the current contents of `uri` on the request pool.
    /// A cursor position is applied to a copy of the cached options.
    async fn ask(
        &self,
        uri: &Url,
        cursor: Option<Position>,
        query: Query,
    ) -> std::result::Result<Answer, LspError> {
        let document = self.session.documents().get(uri).await?;
        let snapshot = document.snapshot().await;
        let cached = self.session.compiler_options(uri, &snapshot.path).await?;

        let options = match cursor {
            Some(position) => {
                let (line, column) = to_native(position);
                Arc::new(cached.at_cursor(line, column))
            }
            None => cached,
        };

        let frontend = self.session.frontend();
        let path = snapshot.path.clone();
        let text = snapshot.text.clone();
        let call_options = Arc::clone(&options);
        let symbols = self
            .requests
            .run(move || query.run(&*frontend, &path, &text, &call_options))
            .await??;

        debug!(%uri, ?query, count = symbols.len(), "Compiler query finished");
        Ok(Answer {
            snapshot,
            options,
            symbols,
        })
    }

    /// `$/setTrace`, which tower-lsp leaves to the server
    pub async fn set_trace(&self, params: SetTraceParams) {
        debug!(trace = ?params.value, "Trace level changed");
        self.session.set_trace(params.value);
    }

    fn fail(method: &str, uri: &Url, err: LspError) -> tower_lsp::jsonrpc::Error {
        error!(%uri, "{} failed: {}", method, err);
        err.into()
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.client
            .log_message(MessageType::INFO, "LSP server initializing")
            .await;

        if !self
            .session
            .initialize(ClientFlags::from_capabilities(&params.capabilities))
        {
            warn!("Client capabilities already negotiated, keeping the first set");
        }
        let flags = self.session.flags();
        info!(?flags, "Negotiated client capabilities");

        if flags.configuration {
            self.session.settings().enable_pull();
        }
        if let Some(trace) = params.trace {
            self.session.set_trace(trace);
        }
        if let Some(options) = &params.initialization_options {
            self.session.settings().apply(options).await;
        }

        Ok(InitializeResult {
            capabilities: flags.server_capabilities(),
            server_info: Some(ServerInfo {
                name: "compiler-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.client
            .log_message(MessageType::INFO, "LSP server shutting down")
            .await;
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let TextDocumentItem {
            uri, text, version, ..
        } = params.text_document;

        match self.session.documents().open(uri.clone(), text, version).await {
            Ok(document) => self.validation.validate(document),
            Err(e) => warn!(%uri, "Ignoring opened document: {}", e),
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        match self
            .session
            .documents()
            .change(&uri, version, params.content_changes)
            .await
        {
            Ok(document) => self.validation.validate(document),
            Err(e) => warn!(%uri, version, "Ignoring document change: {}", e),
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        if self.session.documents().close(&uri).await.is_none() {
            debug!(%uri, "Closed a document that was not open");
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        info!("Workspace configuration changed");
        self.session.settings().apply(&params.settings).await;
        self.session.invalidate_config_caches().await;
        self.revalidate_all().await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        debug!(count = params.changes.len(), "Watched files changed");
        self.revalidate_all().await;
    }

    async fn did_delete_files(&self, params: DeleteFilesParams) {
        debug!(count = params.files.len(), "Files deleted");
        self.revalidate_all().await;
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let TextDocumentPositionParams {
            text_document,
            position,
        } = params.text_document_position_params;
        let uri = text_document.uri;
        let shape = self.session.flags().definition_shape();

        let answer = self
            .ask(&uri, Some(position), Query::LookupName)
            .await
            .map_err(|e| Self::fail("textDocument/definition", &uri, e))?;

        navigation::definition(&answer.symbols, &answer.options, shape)
            .map_err(|e| Self::fail("textDocument/definition", &uri, e))
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let TextDocumentPositionParams {
            text_document,
            position,
        } = params.text_document_position;
        let uri = text_document.uri;

        let answer = self
            .ask(&uri, Some(position), Query::AllOccurrences)
            .await
            .map_err(|e| Self::fail("textDocument/rename", &uri, e))?;

        Ok(navigation::rename(
            &uri,
            &answer.snapshot.path,
            &answer.symbols,
            &answer.options,
            &params.new_name,
        ))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;
        let shape = self.session.flags().symbol_shape();

        let answer = self
            .ask(&uri, None, Query::Symbols)
            .await
            .map_err(|e| Self::fail("textDocument/documentSymbol", &uri, e))?;

        symbols::build(
            &answer.symbols,
            &answer.snapshot.path,
            &answer.options,
            shape,
        )
        .map(Some)
        .map_err(|e| Self::fail("textDocument/documentSymbol", &uri, e))
    }
}

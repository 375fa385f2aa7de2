//! Shared fixtures for the end-to-end tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower_lsp::jsonrpc::{Request, Response};
use tower_lsp::lsp_types::Url;
use tower_lsp::{ClientSocket, LspService};

use compiler_lsp::compiler::{
    CompilerOptions, FrontEnd, FrontEndError, Issue, Severity, Span, Symbol, SymbolType,
};
use compiler_lsp::config::ServerOptions;
use compiler_lsp::lsp::backend::Backend;

/// One recorded call into the front-end
#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub path: PathBuf,
    pub text: String,
    pub options: CompilerOptions,
}

/// Front-end returning canned results and recording every call.
///
/// `show_errors` fails for any path listed in `failing`.
#[derive(Default)]
pub struct FakeFrontEnd {
    issues: Mutex<Vec<Issue>>,
    definitions: Mutex<Vec<Symbol>>,
    occurrences: Mutex<Vec<Symbol>>,
    symbols: Mutex<Vec<Symbol>>,
    failing: Mutex<Vec<PathBuf>>,
    calls: Mutex<Vec<Call>>,
    argv: Mutex<Vec<Vec<String>>>,
}

impl FakeFrontEnd {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_issues(&self, issues: Vec<Issue>) {
        *self.issues.lock().unwrap() = issues;
    }

    pub fn set_definitions(&self, symbols: Vec<Symbol>) {
        *self.definitions.lock().unwrap() = symbols;
    }

    pub fn set_occurrences(&self, symbols: Vec<Symbol>) {
        *self.occurrences.lock().unwrap() = symbols;
    }

    pub fn set_symbols(&self, symbols: Vec<Symbol>) {
        *self.symbols.lock().unwrap() = symbols;
    }

    pub fn fail_on(&self, path: &Path) {
        self.failing.lock().unwrap().push(path.to_path_buf());
    }

    pub fn calls(&self, method: &str) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    /// Every argument list passed to `parse_compiler_arguments`
    pub fn parsed_arguments(&self) -> Vec<Vec<String>> {
        self.argv.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, path: &Path, text: &str, options: &CompilerOptions) {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_path_buf(),
            text: text.to_string(),
            options: options.clone(),
        });
    }
}

impl FrontEnd for FakeFrontEnd {
    fn show_errors(
        &self,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> Result<Vec<Issue>, FrontEndError> {
        self.record("show_errors", path, text, options);
        if self.failing.lock().unwrap().iter().any(|p| p == path) {
            return Err(FrontEndError::Failed {
                status: "exit status: 139".to_string(),
                stderr: "internal compiler error".to_string(),
            });
        }
        Ok(self.issues.lock().unwrap().clone())
    }

    fn lookup_name(
        &self,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> Result<Vec<Symbol>, FrontEndError> {
        self.record("lookup_name", path, text, options);
        Ok(self.definitions.lock().unwrap().clone())
    }

    fn get_all_occurrences(
        &self,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> Result<Vec<Symbol>, FrontEndError> {
        self.record("get_all_occurrences", path, text, options);
        Ok(self.occurrences.lock().unwrap().clone())
    }

    fn get_symbols(
        &self,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> Result<Vec<Symbol>, FrontEndError> {
        self.record("get_symbols", path, text, options);
        Ok(self.symbols.lock().unwrap().clone())
    }

    fn parse_compiler_arguments(&self, argv: &[String]) -> Result<CompilerOptions, FrontEndError> {
        self.argv.lock().unwrap().push(argv.to_vec());
        CompilerOptions::from_args(argv)
    }
}

pub fn create_service(
    frontend: &Arc<FakeFrontEnd>,
    options: ServerOptions,
) -> (LspService<Backend>, ClientSocket) {
    let frontend: Arc<dyn FrontEnd> = frontend.clone();
    LspService::build(move |client| Backend::build(client, frontend, options))
        .custom_method("$/setTrace", Backend::set_trace)
        .finish()
}

/// Real files on disk, so that reported filenames resolve
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn uri(&self, name: &str) -> Url {
        Url::from_file_path(self.dir.path().join(name)).unwrap()
    }

    pub fn path_str(&self, name: &str) -> String {
        self.dir.path().join(name).to_str().unwrap().to_string()
    }
}

pub fn issue(line: u32, severity: Severity, message: &str) -> Issue {
    Issue {
        span: Span::new(line, 1, line, 5),
        severity,
        message: message.to_string(),
    }
}

pub fn symbol(
    name: &str,
    kind: SymbolType,
    filename: &str,
    span: Span,
    parent_index: Option<usize>,
) -> Symbol {
    Symbol {
        name: name.to_string(),
        kind,
        filename: filename.to_string(),
        span,
        parent_index,
    }
}

/// Client capabilities declaring every optional feature the server looks at
pub fn full_capabilities() -> Value {
    json!({
        "textDocument": {
            "definition": { "linkSupport": true },
            "documentSymbol": { "hierarchicalDocumentSymbolSupport": true }
        }
    })
}

pub fn create_initialize_request(id: i64) -> Request {
    create_initialize_request_with(id, json!({}), None)
}

pub fn create_initialize_request_with(
    id: i64,
    capabilities: Value,
    initialization_options: Option<Value>,
) -> Request {
    let mut params = json!({
        "processId": null,
        "rootUri": null,
        "capabilities": capabilities
    });
    if let Some(options) = initialization_options {
        params["initializationOptions"] = options;
    }
    Request::build("initialize").id(id).params(params).finish()
}

pub fn create_initialize_request_traced(id: i64, trace: &str) -> Request {
    Request::build("initialize")
        .id(id)
        .params(json!({
            "processId": null,
            "rootUri": null,
            "capabilities": {},
            "trace": trace
        }))
        .finish()
}

pub fn create_set_trace_notification(value: &str) -> Request {
    Request::build("$/setTrace")
        .params(json!({ "value": value }))
        .finish()
}

pub fn create_initialized_notification() -> Request {
    Request::build("initialized").params(json!({})).finish()
}

pub fn create_did_open_notification(uri: &Url, text: &str, version: i32) -> Request {
    Request::build("textDocument/didOpen")
        .params(json!({
            "textDocument": {
                "uri": uri,
                "languageId": "fortran",
                "version": version,
                "text": text
            }
        }))
        .finish()
}

pub fn create_did_change_notification(uri: &Url, text: &str, version: i32) -> Request {
    Request::build("textDocument/didChange")
        .params(json!({
            "textDocument": { "uri": uri, "version": version },
            "contentChanges": [{ "text": text }]
        }))
        .finish()
}

pub fn create_did_close_notification(uri: &Url) -> Request {
    Request::build("textDocument/didClose")
        .params(json!({ "textDocument": { "uri": uri } }))
        .finish()
}

pub fn create_did_change_configuration_notification(settings: Value) -> Request {
    Request::build("workspace/didChangeConfiguration")
        .params(json!({ "settings": settings }))
        .finish()
}

pub fn create_did_delete_files_notification(uri: &Url) -> Request {
    Request::build("workspace/didDeleteFiles")
        .params(json!({ "files": [{ "uri": uri }] }))
        .finish()
}

pub fn create_did_change_watched_files_notification(uri: &Url) -> Request {
    Request::build("workspace/didChangeWatchedFiles")
        .params(json!({ "changes": [{ "uri": uri, "type": 2 }] }))
        .finish()
}

pub fn create_definition_request(id: i64, uri: &Url, line: u32, character: u32) -> Request {
    Request::build("textDocument/definition")
        .id(id)
        .params(json!({
            "textDocument": { "uri": uri },
            "position": { "line": line, "character": character }
        }))
        .finish()
}

pub fn create_rename_request(
    id: i64,
    uri: &Url,
    line: u32,
    character: u32,
    new_name: &str,
) -> Request {
    Request::build("textDocument/rename")
        .id(id)
        .params(json!({
            "textDocument": { "uri": uri },
            "position": { "line": line, "character": character },
            "newName": new_name
        }))
        .finish()
}

pub fn create_document_symbol_request(id: i64, uri: &Url) -> Request {
    Request::build("textDocument/documentSymbol")
        .id(id)
        .params(json!({ "textDocument": { "uri": uri } }))
        .finish()
}

/// Forwards everything the server sends to the client into a channel.
pub fn spawn_notification_collector(socket: ClientSocket) -> mpsc::UnboundedReceiver<Request> {
    spawn_client(socket, Value::Null)
}

/// Like `spawn_notification_collector`, and also answers every
/// `workspace/configuration` item with `configuration`.
pub fn spawn_client(socket: ClientSocket, configuration: Value) -> mpsc::UnboundedReceiver<Request> {
    let (tx, rx) = mpsc::unbounded_channel();
    let (mut requests, mut responses) = socket.split();

    tokio::spawn(async move {
        while let Some(request) = requests.next().await {
            if request.method() == "workspace/configuration" {
                if let Some(id) = request.id().cloned() {
                    let items = request
                        .params()
                        .and_then(|p| p["items"].as_array())
                        .map_or(1, Vec::len);
                    let result = Value::Array(vec![configuration.clone(); items]);
                    if responses.send(Response::from_ok(id, result)).await.is_err() {
                        break;
                    }
                }
            }
            if tx.send(request).is_err() {
                break;
            }
        }
    });

    rx
}

pub async fn wait_for_notification(
    rx: &mut mpsc::UnboundedReceiver<Request>,
    method: &str,
) -> Option<Request> {
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(request) = rx.recv().await {
            if request.method() == method {
                return Some(request);
            }
        }
        None
    })
    .await
    .ok()
    .flatten()
}

/// Asserts that no `method` message arrives within a short grace period.
pub async fn assert_no_notification(rx: &mut mpsc::UnboundedReceiver<Request>, method: &str) {
    let arrived = tokio::time::timeout(Duration::from_millis(300), async {
        while let Some(request) = rx.recv().await {
            if request.method() == method {
                return Some(request);
            }
        }
        None
    })
    .await
    .ok()
    .flatten();

    assert!(arrived.is_none(), "unexpected {}: {:?}", method, arrived);
}

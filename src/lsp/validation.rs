//! Background validation.
//!
//! `ValidationPool::validate` only enqueues; a fixed set of worker loops pulls
//! documents off the queue and runs the compiler on them. Each run validates
//! whatever `(text, version)` the document holds when the run starts and
//! tags the published diagnostics with that version, so clients can discard
//! results that arrive out of order. A failing run is logged and publishes
//! nothing; it never takes its worker down.
//!
//! When the client asked for tracing, each publish is preceded by a
//! `$/logTrace` with the time the run took, and with the diagnostics
//! themselves at `verbose`.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tower_lsp::Client;
use tower_lsp::lsp_types::notification::LogTrace;
use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticSeverity, LogTraceParams, PublishDiagnosticsParams, TraceValue, Url,
};
use tracing::{debug, error, warn};

use crate::compiler::{Issue, Severity};
use crate::lsp::documents::{Document, Snapshot};
use crate::lsp::error::LspError;
use crate::lsp::position::diagnostic_range;
use crate::lsp::session::Session;

/// Source tag on every published diagnostic
pub const DIAGNOSTIC_SOURCE: &str = "compiler-lsp";

/// Outbound `textDocument/publishDiagnostics` and `$/logTrace`
#[async_trait]
pub trait DiagnosticsPublisher: Send + Sync {
    async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: i32);

    async fn log_trace(&self, message: String, verbose: Option<String>);
}

#[async_trait]
impl DiagnosticsPublisher for Client {
    async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: i32) {
        self.publish_diagnostics(uri, diagnostics, Some(version))
            .await;
    }

    async fn log_trace(&self, message: String, verbose: Option<String>) {
        self.send_notification::<LogTrace>(LogTraceParams { message, verbose })
            .await;
    }
}

pub fn severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Note => DiagnosticSeverity::INFORMATION,
        Severity::Help => DiagnosticSeverity::HINT,
        Severity::Unknown => DiagnosticSeverity::WARNING,
    }
}

/// Converts the first `max_problems` issues, in reported order.
pub fn to_diagnostics(issues: &[Issue], max_problems: usize) -> Vec<Diagnostic> {
    issues
        .iter()
        .take(max_problems)
        .map(|issue| Diagnostic {
            range: diagnostic_range(&issue.span),
            severity: Some(severity(issue.severity)),
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message: issue.message.clone(),
            ..Default::default()
        })
        .collect()
}

pub struct Validator {
    session: Arc<Session>,
    publisher: Arc<dyn DiagnosticsPublisher>,
}

impl Validator {
    pub fn new(session: Arc<Session>, publisher: Arc<dyn DiagnosticsPublisher>) -> Self {
        Self { session, publisher }
    }

    /// Validates the current contents of `document` and publishes the
    /// result. Returns the number of diagnostics published.
    pub async fn validate(&self, document: &Document) -> Result<usize, LspError> {
        let start = Instant::now();
        let Snapshot {
            uri,
            path,
            text,
            version,
        } = document.snapshot().await;

        let options = self.session.compiler_options(&uri, &path).await?;
        let config = self.session.settings().for_uri(&uri).await?;

        let frontend = self.session.frontend();
        let issues = tokio::task::spawn_blocking(move || frontend.show_errors(&path, &text, &options))
            .await
            .map_err(|e| LspError::Worker(e.to_string()))??;

        let diagnostics = to_diagnostics(&issues, config.max_number_of_problems);
        let count = diagnostics.len();
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match self.session.trace() {
            TraceValue::Off => {}
            trace => {
                let verbose = (trace == TraceValue::Verbose).then(|| {
                    let params =
                        PublishDiagnosticsParams::new(uri.clone(), diagnostics.clone(), Some(version));
                    format!("Result: {}", serde_json::to_string(&params).unwrap_or_default())
                });
                self.publisher
                    .log_trace(publish_trace_message(elapsed_ms), verbose)
                    .await;
            }
        }
        self.publisher.publish(uri.clone(), diagnostics, version).await;

        debug!(
            %uri,
            version,
            count,
            elapsed_ms,
            "Sent textDocument/publishDiagnostics"
        );
        Ok(count)
    }
}

fn publish_trace_message(elapsed_ms: u64) -> String {
    format!(
        "Sending response 'textDocument/publishDiagnostics'. Processing request took {}ms",
        elapsed_ms
    )
}

type Queue = Arc<Mutex<mpsc::UnboundedReceiver<Arc<Document>>>>;

pub struct ValidationPool {
    queue: mpsc::UnboundedSender<Arc<Document>>,
}

impl ValidationPool {
    /// Starts `size` worker loops. They stop once the pool is dropped and the
    /// queue drains.
    pub fn spawn(size: usize, validator: Arc<Validator>) -> Self {
        let (queue, receiver) = mpsc::unbounded_channel();
        let receiver: Queue = Arc::new(Mutex::new(receiver));

        for id in 0..size.max(1) {
            tokio::spawn(work(id, Arc::clone(&receiver), Arc::clone(&validator)));
        }

        Self { queue }
    }

    pub fn validate(&self, document: Arc<Document>) {
        if let Err(e) = self.queue.send(document) {
            warn!(uri = %e.0.uri(), "Validation queue closed, dropping request");
        }
    }

    pub fn validate_all(&self, documents: impl IntoIterator<Item = Arc<Document>>) {
        for document in documents {
            self.validate(document);
        }
    }
}

async fn work(id: usize, queue: Queue, validator: Arc<Validator>) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(document) = next else {
            break;
        };

        let uri = document.uri().clone();
        let validator = Arc::clone(&validator);
        match tokio::spawn(async move { validator.validate(&document).await }).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                error!(worker = id, %uri, "Failed to validate document: {}", e);
            }
            Err(e) => {
                error!(worker = id, %uri, "Validation task aborted: {}", e);
            }
        }
    }
    debug!(worker = id, "Validation worker stopped");
}

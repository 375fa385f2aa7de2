//! State owned by one server session and shared by every handler.

use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use tower_lsp::lsp_types::{TraceValue, Url};
use tracing::{debug, error};

use crate::compiler::{CompilerOptions, FrontEnd};
use crate::lsp::cache::LazyCache;
use crate::lsp::capabilities::ClientFlags;
use crate::lsp::documents::DocumentStore;
use crate::lsp::error::LspError;
use crate::lsp::settings::Settings;

pub struct Session {
    frontend: Arc<dyn FrontEnd>,
    settings: Settings,
    options: LazyCache<Url, CompilerOptions>,
    documents: DocumentStore,
    flags: OnceLock<ClientFlags>,
    trace: AtomicU8,
}

impl Session {
    pub fn new(frontend: Arc<dyn FrontEnd>, settings: Settings) -> Self {
        Self {
            frontend,
            settings,
            options: LazyCache::new(),
            documents: DocumentStore::new(),
            flags: OnceLock::new(),
            trace: AtomicU8::new(trace_level(TraceValue::Off)),
        }
    }

    pub fn frontend(&self) -> Arc<dyn FrontEnd> {
        Arc::clone(&self.frontend)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn options_cache(&self) -> &LazyCache<Url, CompilerOptions> {
        &self.options
    }

    /// Records the negotiated client flags. Only the first call takes effect.
    pub fn initialize(&self, flags: ClientFlags) -> bool {
        self.flags.set(flags).is_ok()
    }

    /// Negotiated flags; all unset before initialize.
    pub fn flags(&self) -> ClientFlags {
        self.flags.get().copied().unwrap_or_default()
    }

    /// `$/logTrace` verbosity requested by the client
    pub fn trace(&self) -> TraceValue {
        match self.trace.load(Ordering::Relaxed) {
            1 => TraceValue::Messages,
            2 => TraceValue::Verbose,
            _ => TraceValue::Off,
        }
    }

    pub fn set_trace(&self, value: TraceValue) {
        self.trace.store(trace_level(value), Ordering::Relaxed);
    }

    /// Compiler options for the document at `uri`, built on first use from
    /// the configured flags followed by the document path.
    pub async fn compiler_options(
        &self,
        uri: &Url,
        path: &Path,
    ) -> Result<Arc<CompilerOptions>, LspError> {
        self.options
            .get_or_try_build(uri, || async {
                let config = self.settings.for_uri(uri).await?;
                let mut argv = config.compiler.flags.clone();
                argv.push(path.to_string_lossy().into_owned());

                let mut options = self.frontend.parse_compiler_arguments(&argv).map_err(|e| {
                    error!(
                        "Failed to initialize compiler options for document with uri=\"{}\": {}",
                        uri, e
                    );
                    LspError::Configuration {
                        uri: uri.clone(),
                        message: e.to_string(),
                    }
                })?;
                options.continue_compilation = true;

                debug!(%uri, ?argv, "Built compiler options");
                Ok(options)
            })
            .await
    }

    /// Drops every cached per-document configuration.
    pub async fn invalidate_config_caches(&self) {
        self.settings.invalidate().await;
        self.options.clear().await;
        debug!("Invalidated compiler options cache");
    }
}

fn trace_level(value: TraceValue) -> u8 {
    match value {
        TraceValue::Off => 0,
        TraceValue::Messages => 1,
        TraceValue::Verbose => 2,
    }
}

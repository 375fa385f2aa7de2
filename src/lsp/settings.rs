//! Workspace configuration.
//!
//! Pushed settings (`initializationOptions`, `didChangeConfiguration`) replace
//! the workspace-wide value. When the client supports
//! `workspace/configuration`, settings are pulled per document URI instead
//! and cached until the next configuration change. Concurrent lookups of
//! one URI share a single pull.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tower_lsp::Client;
use tower_lsp::lsp_types::{ConfigurationItem, Url};
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::lsp::cache::LazyCache;
use crate::lsp::error::LspError;

/// Where per-document settings are pulled from
#[async_trait]
pub trait ConfigurationSource: Send + Sync {
    async fn fetch(&self, uri: &Url, section: &str) -> Result<Value, LspError>;
}

#[async_trait]
impl ConfigurationSource for Client {
    async fn fetch(&self, uri: &Url, section: &str) -> Result<Value, LspError> {
        let values = self
            .configuration(vec![ConfigurationItem {
                scope_uri: Some(uri.clone()),
                section: Some(section.to_string()),
            }])
            .await
            .map_err(|e| LspError::Configuration {
                uri: uri.clone(),
                message: format!("workspace/configuration failed: {}", e),
            })?;
        Ok(values.into_iter().next().unwrap_or(Value::Null))
    }
}

pub struct Settings {
    section: String,
    workspace: RwLock<Arc<ServerConfig>>,
    by_uri: LazyCache<Url, ServerConfig>,
    pulls: Mutex<HashMap<Url, Arc<Mutex<()>>>>,
    source: Option<Arc<dyn ConfigurationSource>>,
    pull: AtomicBool,
}

impl Settings {
    pub fn new(
        section: impl Into<String>,
        defaults: ServerConfig,
        source: Option<Arc<dyn ConfigurationSource>>,
    ) -> Self {
        Self {
            section: section.into(),
            workspace: RwLock::new(Arc::new(defaults)),
            by_uri: LazyCache::new(),
            pulls: Mutex::default(),
            source,
            pull: AtomicBool::new(false),
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// Switches to per-URI pulls; called once the client has declared
    /// `workspace/configuration` support.
    pub fn enable_pull(&self) {
        if self.source.is_some() {
            self.pull.store(true, Ordering::Release);
        }
    }

    /// Settings that apply to `uri`.
    pub async fn for_uri(&self, uri: &Url) -> Result<Arc<ServerConfig>, LspError> {
        let source = match &self.source {
            Some(source) if self.pull.load(Ordering::Acquire) => source,
            _ => return Ok(Arc::clone(&*self.workspace.read().await)),
        };

        if let Some(config) = self.by_uri.get(uri).await {
            return Ok(config);
        }

        // Later callers wait here and find the pulled value in the cache
        let gate = Arc::clone(self.pulls.lock().await.entry(uri.clone()).or_default());
        let _pulling = gate.lock().await;

        self.by_uri
            .get_or_try_build(uri, || async {
                let value = source.fetch(uri, &self.section).await?;
                if value.is_null() {
                    debug!(%uri, "Client returned no settings, using workspace settings");
                    return Ok(ServerConfig::clone(&*self.workspace.read().await));
                }
                serde_json::from_value(value).map_err(|e| LspError::Configuration {
                    uri: uri.clone(),
                    message: e.to_string(),
                })
            })
            .await
    }

    /// Replaces workspace-wide settings from a pushed payload. Payloads that
    /// carry nothing usable keep the current settings.
    pub async fn apply(&self, settings: &Value) {
        match ServerConfig::from_settings(settings, &self.section) {
            Ok(Some(config)) => {
                debug!(?config, "Applying workspace settings");
                *self.workspace.write().await = Arc::new(config);
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring malformed workspace settings: {}", e),
        }
    }

    /// Forgets every pulled per-URI value.
    pub async fn invalidate(&self) {
        self.pulls.lock().await.clear();
        self.by_uri.clear().await;
    }
}

//! Bounded pool for feature requests that call into the compiler.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::lsp::error::LspError;

/// Runs blocking compiler calls for requests, at most `size` at a time.
///
/// Sized independently from the validation workers so that slow requests
/// and slow validations cannot starve each other.
pub struct RequestPool {
    permits: Arc<Semaphore>,
}

impl RequestPool {
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size.max(1))),
        }
    }

    pub async fn run<T, F>(&self, job: F) -> Result<T, LspError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| LspError::Worker(e.to_string()))?;

        tokio::task::spawn_blocking(job)
            .await
            .map_err(|e| LspError::Worker(e.to_string()))
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

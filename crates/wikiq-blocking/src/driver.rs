//! Runs futures to completion for the blocking surface.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};
use wikiq_core::{Error, Result};

/// A dedicated current-thread runtime shared by every clone.
///
/// Each [`run`](Self::run) drives exactly one future to completion. When the
/// last clone goes away inside another async context the runtime is shut
/// down in the background instead of blocking on its teardown.
#[derive(Debug, Clone)]
pub struct Driver {
    runtime: Arc<OwnedRuntime>,
}

#[derive(Debug)]
struct OwnedRuntime(Option<Runtime>);

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            if Handle::try_current().is_ok() {
                runtime.shutdown_background();
            }
        }
    }
}

impl Driver {
    /// Start a new driver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] if the runtime cannot be built.
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Runtime(format!("failed to start runtime: {e}")))?;
        Ok(Self {
            runtime: Arc::new(OwnedRuntime(Some(runtime))),
        })
    }

    /// Block the current thread until `future` finishes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called from inside a running tokio
    /// runtime, otherwise whatever `future` resolves to.
    pub fn run<T, F>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if Handle::try_current().is_ok() {
            return Err(Error::Runtime(
                "blocking call made from inside an async runtime; use wikiq-core directly"
                    .to_string(),
            ));
        }
        match &self.runtime.0 {
            Some(runtime) => runtime.block_on(future),
            None => Err(Error::Runtime("runtime already shut down".to_string())),
        }
    }
}

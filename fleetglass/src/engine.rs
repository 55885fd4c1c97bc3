use crate::element::PageElement;
use crate::errors::AutomationError;
use crate::locator::Locator;
use crate::selector::Selector;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Interface for backend-specific page engines.
///
/// Lookups are immediate (no internal polling); bounded waiting lives in
/// [`Locator`]. `root` scopes the search to descendants of an element.
#[async_trait]
pub trait WebEngine: Send + Sync {
    async fn find_element(
        &self,
        selector: &Selector,
        root: Option<&PageElement>,
    ) -> Result<PageElement, AutomationError>;

    async fn find_elements(
        &self,
        selector: &Selector,
        root: Option<&PageElement>,
    ) -> Result<Vec<PageElement>, AutomationError>;

    /// Raw page markup, used for best-effort diagnostics capture.
    async fn page_source(&self) -> Result<String, AutomationError>;

    /// Release the underlying browser session.
    async fn close(&self) -> Result<(), AutomationError>;
}

/// The single explicitly-owned browser session for a batch run.
///
/// Created once at the start of a run, passed by reference to every component
/// that needs it, and released exactly once via [`Session::close`].
pub struct Session {
    engine: Arc<dyn WebEngine>,
    closed: std::sync::atomic::AtomicBool,
}

impl Session {
    pub fn new(engine: Arc<dyn WebEngine>) -> Self {
        Self {
            engine,
            closed: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn engine(&self) -> &Arc<dyn WebEngine> {
        &self.engine
    }

    pub fn locator(&self, selector: impl Into<Selector>) -> Locator {
        Locator::new(self.engine.clone(), selector.into())
    }

    pub async fn page_source(&self) -> Result<String, AutomationError> {
        self.engine.page_source().await
    }

    /// Tear down the browser session. Idempotent; later calls are no-ops.
    pub async fn close(&self) -> Result<(), AutomationError> {
        if self.closed.swap(true, std::sync::atomic::Ordering::SeqCst) {
            return Ok(());
        }
        self.engine.close().await?;
        info!("[SESSION] Browser closed.");
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("closed", &self.closed)
            .finish()
    }
}

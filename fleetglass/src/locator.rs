use crate::element::PageElement;
use crate::engine::WebEngine;
use crate::errors::AutomationError;
use crate::selector::Selector;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

// Default timeout if none is specified on the locator itself
const DEFAULT_LOCATOR_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A high-level API for finding and interacting with page elements.
///
/// Every wait is a bounded condition poll: the engine lookup itself is
/// immediate and the locator re-polls until the deadline, so a flaky render
/// never turns into an unbounded hang.
#[derive(Clone)]
pub struct Locator {
    engine: Arc<dyn WebEngine>,
    selector: Selector,
    timeout: Duration,
    poll: Duration,
    root: Option<PageElement>,
}

impl Locator {
    pub(crate) fn new(engine: Arc<dyn WebEngine>, selector: Selector) -> Self {
        Self {
            engine,
            selector,
            timeout: DEFAULT_LOCATOR_TIMEOUT,
            poll: DEFAULT_POLL_INTERVAL,
            root: None,
        }
    }

    /// Set a default timeout for waiting operations on this locator instance.
    pub fn set_default_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the polling interval for waiting operations on this locator instance.
    pub fn set_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    /// Scope this locator to descendants of the given element.
    pub fn within(mut self, element: PageElement) -> Self {
        self.root = Some(element);
        self
    }

    pub fn selector_string(&self) -> String {
        format!("{:?}", self.selector)
    }

    /// Wait for an element matching the locator to appear, up to the timeout.
    pub async fn wait(&self, timeout: Option<Duration>) -> Result<PageElement, AutomationError> {
        debug!("Waiting for element matching selector: {:?}", self.selector);
        self.poll_until(timeout, |el| async move { Ok(Some(el)) })
            .await
    }

    /// Wait until the element is enabled and visible, then return it.
    pub async fn wait_clickable(
        &self,
        timeout: Option<Duration>,
    ) -> Result<PageElement, AutomationError> {
        self.poll_until(timeout, |el| async move {
            if el.is_clickable().await? {
                Ok(Some(el))
            } else {
                Ok(None)
            }
        })
        .await
    }

    /// Wait for the element to become clickable, then click it.
    pub async fn click(&self, timeout: Option<Duration>) -> Result<(), AutomationError> {
        let element = self.wait_clickable(timeout).await?;
        element.click().await
    }

    /// Click the element if it becomes clickable within the timeout.
    /// Returns `true` on success; failures are logged, never raised.
    pub async fn try_click(&self, timeout: Option<Duration>) -> bool {
        match self.click(timeout).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Timeout or failure clicking {:?}: {e}", self.selector);
                false
            }
        }
    }

    /// Whether an element matching this locator appears within the timeout.
    pub async fn exists(&self, timeout: Option<Duration>) -> bool {
        self.wait(timeout).await.is_ok()
    }

    /// Get all elements currently matching this locator, waiting up to the
    /// timeout for at least one to appear. An empty vec means none appeared.
    pub async fn all(&self, timeout: Option<Duration>) -> Result<Vec<PageElement>, AutomationError> {
        let deadline = tokio::time::Instant::now() + timeout.unwrap_or(self.timeout);
        loop {
            let found = self
                .engine
                .find_elements(&self.selector, self.root.as_ref())
                .await?;
            if !found.is_empty() {
                return Ok(found);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(found);
            }
            tokio::time::sleep(self.poll).await;
        }
    }

    /// Read the visible text of the first matching element.
    pub async fn text(&self, timeout: Option<Duration>) -> Result<String, AutomationError> {
        let element = self.wait(timeout).await?;
        element.text().await
    }

    async fn poll_until<F, Fut>(
        &self,
        timeout: Option<Duration>,
        check: F,
    ) -> Result<PageElement, AutomationError>
    where
        F: Fn(PageElement) -> Fut,
        Fut: std::future::Future<Output = Result<Option<PageElement>, AutomationError>>,
    {
        let effective_timeout = timeout.unwrap_or(self.timeout);
        let deadline = tokio::time::Instant::now() + effective_timeout;
        let mut last_err: Option<AutomationError> = None;
        loop {
            match self
                .engine
                .find_element(&self.selector, self.root.as_ref())
                .await
            {
                Ok(element) => {
                    if let Some(element) = check(element).await? {
                        return Ok(element);
                    }
                }
                Err(e @ AutomationError::ElementNotFound(_)) => last_err = Some(e),
                Err(e) => return Err(e),
            }
            if tokio::time::Instant::now() >= deadline {
                let detail = last_err
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "element never became clickable".to_string());
                return Err(AutomationError::Timeout(format!(
                    "Timed out after {effective_timeout:?} waiting for element {:?}. {detail}",
                    self.selector
                )));
            }
            tokio::time::sleep(self.poll).await;
        }
    }
}

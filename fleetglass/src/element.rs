use crate::errors::AutomationError;
use crate::selector::Selector;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Represents a live element on the page
#[derive(Clone, Debug)]
pub struct PageElement {
    inner: Arc<dyn PageElementImpl>,
}

impl PageElement {
    pub fn new(inner: Arc<dyn PageElementImpl>) -> Self {
        Self { inner }
    }

    /// Visible text content, leading/trailing whitespace trimmed.
    pub async fn text(&self) -> Result<String, AutomationError> {
        Ok(self.inner.text().await?.trim().to_string())
    }

    pub async fn attr(&self, name: &str) -> Result<Option<String>, AutomationError> {
        self.inner.attr(name).await
    }

    /// Current value of an input field ("" when empty).
    pub async fn value(&self) -> Result<String, AutomationError> {
        Ok(self.inner.value().await?.unwrap_or_default())
    }

    pub async fn click(&self) -> Result<(), AutomationError> {
        self.inner.click().await
    }

    pub async fn clear(&self) -> Result<(), AutomationError> {
        self.inner.clear().await
    }

    pub async fn send_keys(&self, keys: &str) -> Result<(), AutomationError> {
        self.inner.send_keys(keys).await
    }

    /// Press a named key chord ("ctrl+a", "delete").
    pub async fn press_key(&self, key: &str) -> Result<(), AutomationError> {
        self.inner.press_key(key).await
    }

    pub async fn is_enabled(&self) -> Result<bool, AutomationError> {
        self.inner.is_enabled().await
    }

    pub async fn is_visible(&self) -> Result<bool, AutomationError> {
        self.inner.is_visible().await
    }

    /// Enabled and visible, the precondition for a click.
    pub async fn is_clickable(&self) -> Result<bool, AutomationError> {
        Ok(self.inner.is_enabled().await? && self.inner.is_visible().await?)
    }

    /// Find a single descendant of this element.
    pub async fn find(&self, selector: &Selector) -> Result<PageElement, AutomationError> {
        self.inner.find(selector).await
    }

    /// Find all descendants of this element matching the selector.
    pub async fn find_all(&self, selector: &Selector) -> Result<Vec<PageElement>, AutomationError> {
        self.inner.find_all(selector).await
    }

    pub fn as_any(&self) -> &dyn std::any::Any {
        self.inner.as_any()
    }
}

/// Interface for backend-specific element implementations
#[async_trait]
pub trait PageElementImpl: Send + Sync + Debug {
    async fn text(&self) -> Result<String, AutomationError>;
    async fn attr(&self, name: &str) -> Result<Option<String>, AutomationError>;
    async fn value(&self) -> Result<Option<String>, AutomationError>;
    async fn click(&self) -> Result<(), AutomationError>;
    async fn clear(&self) -> Result<(), AutomationError>;
    async fn send_keys(&self, keys: &str) -> Result<(), AutomationError>;
    async fn press_key(&self, key: &str) -> Result<(), AutomationError>;
    async fn is_enabled(&self) -> Result<bool, AutomationError>;
    async fn is_visible(&self) -> Result<bool, AutomationError>;
    async fn find(&self, selector: &Selector) -> Result<PageElement, AutomationError>;
    async fn find_all(&self, selector: &Selector) -> Result<Vec<PageElement>, AutomationError>;
    fn as_any(&self) -> &dyn std::any::Any;
}

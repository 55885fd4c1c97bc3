//! Selenium WebDriver backend for the [`WebEngine`] seam.
//!
//! Talks to a remote WebDriver server (chromedriver, selenium-server) through
//! `thirtyfour`. Lookups are immediate; all bounded waiting lives in
//! [`crate::locator::Locator`].

use crate::element::{PageElement, PageElementImpl};
use crate::engine::{Session, WebEngine};
use crate::errors::AutomationError;
use crate::selector::Selector;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use thirtyfour::{Key, TypingData};
use tracing::{info, warn};

const CONNECT_RETRIES: u32 = 10;
const CONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Connection settings for the WebDriver server.
#[derive(Debug, Clone)]
pub struct WebDriverSettings {
    /// WebDriver server URL, e.g. `http://localhost:9515`.
    pub server_url: String,
    /// URL of the fleet-operations application to open after connecting.
    pub app_url: String,
    pub headless: bool,
}

/// Connect to the WebDriver server, open the application, and wrap the
/// session as the run's single owned [`Session`].
pub async fn connect(settings: &WebDriverSettings) -> Result<Session, AutomationError> {
    let mut caps = DesiredCapabilities::chrome();
    if settings.headless {
        caps.add_arg("--headless=new")
            .map_err(map_webdriver_err)?;
    }
    caps.add_arg("--disable-gpu").map_err(map_webdriver_err)?;
    caps.add_arg("--window-size=1400,1000")
        .map_err(map_webdriver_err)?;

    let mut attempts = 0;
    let driver = loop {
        match WebDriver::new(&settings.server_url, caps.clone()).await {
            Ok(d) => break d,
            Err(err) if attempts < CONNECT_RETRIES => {
                attempts += 1;
                warn!(
                    "[SESSION] WebDriver connection failed (attempt {attempts}/{CONNECT_RETRIES}): {err}"
                );
                tokio::time::sleep(CONNECT_BACKOFF).await;
            }
            Err(err) => return Err(map_webdriver_err(err)),
        }
    };

    driver
        .goto(&settings.app_url)
        .await
        .map_err(map_webdriver_err)?;
    info!("[SESSION] Connected, application opened at {}", settings.app_url);

    Ok(Session::new(Arc::new(WebDriverEngine { driver })))
}

/// [`WebEngine`] implementation over a live `thirtyfour` session.
pub struct WebDriverEngine {
    driver: WebDriver,
}

#[async_trait]
impl WebEngine for WebDriverEngine {
    async fn find_element(
        &self,
        selector: &Selector,
        root: Option<&PageElement>,
    ) -> Result<PageElement, AutomationError> {
        let mut current = root.cloned();
        for by in selector_steps(selector, root.is_some())? {
            let found = match &current {
                Some(el) => raw_element(el)?.find(by).await,
                None => self.driver.find(by).await,
            }
            .map_err(map_webdriver_err)?;
            current = Some(wrap(found));
        }
        current.ok_or_else(|| {
            AutomationError::InvalidSelector(format!("empty selector chain: {selector:?}"))
        })
    }

    async fn find_elements(
        &self,
        selector: &Selector,
        root: Option<&PageElement>,
    ) -> Result<Vec<PageElement>, AutomationError> {
        let steps = selector_steps(selector, root.is_some())?;
        let Some((last_by, prefix)) = steps.split_last() else {
            return Err(AutomationError::InvalidSelector(format!(
                "empty selector chain: {selector:?}"
            )));
        };

        // Resolve the chain prefix to a single scope element, then fan out.
        let mut scope = root.cloned();
        for by in prefix {
            let found = match &scope {
                Some(el) => raw_element(el)?.find(by.clone()).await,
                None => self.driver.find(by.clone()).await,
            }
            .map_err(map_webdriver_err)?;
            scope = Some(wrap(found));
        }

        let found = match &scope {
            Some(el) => raw_element(el)?.find_all(last_by.clone()).await,
            None => self.driver.find_all(last_by.clone()).await,
        }
        .map_err(map_webdriver_err)?;
        Ok(found.into_iter().map(wrap).collect())
    }

    async fn page_source(&self) -> Result<String, AutomationError> {
        self.driver.source().await.map_err(map_webdriver_err)
    }

    async fn close(&self) -> Result<(), AutomationError> {
        self.driver.clone().quit().await.map_err(map_webdriver_err)
    }
}

fn wrap(element: WebElement) -> PageElement {
    PageElement::new(Arc::new(WdElement { element }))
}

fn raw_element(el: &PageElement) -> Result<&WebElement, AutomationError> {
    el.as_any()
        .downcast_ref::<WdElement>()
        .map(|w| &w.element)
        .ok_or_else(|| {
            AutomationError::Internal("root element does not belong to this engine".to_string())
        })
}

/// Flatten a selector into sequential `By` lookup steps. `relative` controls
/// whether XPath steps anchor at the scope element or the document root.
fn selector_steps(selector: &Selector, relative: bool) -> Result<Vec<By>, AutomationError> {
    fn single(selector: &Selector, relative: bool) -> Result<By, AutomationError> {
        let axis = if relative { ".//" } else { "//" };
        Ok(match selector {
            Selector::Role { role, name: Some(name) } => {
                By::XPath(format!("{axis}{role}[normalize-space()='{name}']"))
            }
            Selector::Role { role, name: None } => By::Tag(role.clone()),
            Selector::ClassPrefix(prefix) => By::Css(format!("[class*='{prefix}']")),
            Selector::Text(text) => By::XPath(format!("{axis}*[normalize-space()='{text}']")),
            Selector::Attr { name, contains } => By::Css(format!("[{name}*='{contains}']")),
            Selector::Chain(_) => {
                return Err(AutomationError::InvalidSelector(
                    "nested selector chains are not supported".to_string(),
                ))
            }
            Selector::Invalid(reason) => {
                return Err(AutomationError::InvalidSelector(reason.clone()))
            }
        })
    }

    match selector {
        Selector::Chain(parts) => parts
            .iter()
            .enumerate()
            .map(|(i, part)| single(part, relative || i > 0))
            .collect(),
        _ => Ok(vec![single(selector, relative)?]),
    }
}

#[derive(Debug)]
struct WdElement {
    element: WebElement,
}

#[async_trait]
impl PageElementImpl for WdElement {
    async fn text(&self) -> Result<String, AutomationError> {
        self.element.text().await.map_err(map_webdriver_err)
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, AutomationError> {
        self.element.attr(name).await.map_err(map_webdriver_err)
    }

    async fn value(&self) -> Result<Option<String>, AutomationError> {
        self.element.value().await.map_err(map_webdriver_err)
    }

    async fn click(&self) -> Result<(), AutomationError> {
        self.element.click().await.map_err(map_webdriver_err)
    }

    async fn clear(&self) -> Result<(), AutomationError> {
        self.element.clear().await.map_err(map_webdriver_err)
    }

    async fn send_keys(&self, keys: &str) -> Result<(), AutomationError> {
        self.element
            .send_keys(keys)
            .await
            .map_err(map_webdriver_err)
    }

    async fn press_key(&self, key: &str) -> Result<(), AutomationError> {
        self.element
            .send_keys(key_sequence(key))
            .await
            .map_err(map_webdriver_err)
    }

    async fn is_enabled(&self) -> Result<bool, AutomationError> {
        self.element.is_enabled().await.map_err(map_webdriver_err)
    }

    async fn is_visible(&self) -> Result<bool, AutomationError> {
        self.element
            .is_displayed()
            .await
            .map_err(map_webdriver_err)
    }

    async fn find(&self, selector: &Selector) -> Result<PageElement, AutomationError> {
        let mut current: Option<PageElement> = None;
        for by in selector_steps(selector, true)? {
            let found = match &current {
                Some(el) => raw_element(el)?.find(by).await,
                None => self.element.find(by).await,
            }
            .map_err(map_webdriver_err)?;
            current = Some(wrap(found));
        }
        current.ok_or_else(|| {
            AutomationError::InvalidSelector(format!("empty selector chain: {selector:?}"))
        })
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<PageElement>, AutomationError> {
        match selector {
            Selector::Chain(_) => Err(AutomationError::UnsupportedOperation(
                "chained find_all from an element is not supported".to_string(),
            )),
            _ => {
                let steps = selector_steps(selector, true)?;
                let by = steps.into_iter().next().ok_or_else(|| {
                    AutomationError::InvalidSelector(format!("empty selector: {selector:?}"))
                })?;
                let found = self.element.find_all(by).await.map_err(map_webdriver_err)?;
                Ok(found.into_iter().map(wrap).collect())
            }
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Translate a named key chord into the WebDriver key codepoint sequence.
fn key_sequence(key: &str) -> TypingData {
    match key {
        "ctrl+a" => Key::Control + "a",
        "delete" => Key::Delete + "",
        "enter" => Key::Enter + "",
        other => other.into(),
    }
}

fn map_webdriver_err(e: WebDriverError) -> AutomationError {
    let message = e.to_string();
    let folded = message.to_ascii_lowercase();
    if folded.contains("no such element") || folded.contains("stale element") {
        AutomationError::ElementNotFound(message)
    } else if folded.contains("timeout") || folded.contains("timed out") {
        AutomationError::Timeout(message)
    } else {
        AutomationError::PlatformError(message)
    }
}

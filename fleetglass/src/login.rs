//! Session bootstrap against the portal login form.
//!
//! A non-ok login status aborts the entire batch run before any MVA is
//! processed; there is no per-MVA recovery from a failed login.

use crate::config::Credentials;
use crate::engine::Session;
use crate::errors::AutomationError;
use crate::selector::Selector;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, info};

const FIELD_TIMEOUT: Duration = Duration::from_secs(20);
const LANDING_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStatus {
    Ok,
    Rejected(String),
}

#[async_trait]
pub trait LoginFlow {
    async fn login(&self, credentials: &Credentials) -> Result<LoginStatus, AutomationError>;
}

/// Drives the portal's login form through the shared session.
pub struct PortalLogin<'s> {
    session: &'s Session,
}

impl<'s> PortalLogin<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self { session }
    }

    async fn fill(&self, selector: Selector, value: &str) -> Result<(), AutomationError> {
        let field = self
            .session
            .locator(selector)
            .wait(Some(FIELD_TIMEOUT))
            .await?;
        field.clear().await?;
        field.send_keys(value).await
    }
}

#[async_trait]
impl LoginFlow for PortalLogin<'_> {
    async fn login(&self, credentials: &Credentials) -> Result<LoginStatus, AutomationError> {
        info!("[LOGIN] Signing in as {}", credentials.username);

        self.fill(
            Selector::Attr {
                name: "name".to_string(),
                contains: "username".to_string(),
            },
            &credentials.username,
        )
        .await?;
        self.fill(
            Selector::Attr {
                name: "name".to_string(),
                contains: "password".to_string(),
            },
            &credentials.password,
        )
        .await?;
        self.fill(
            Selector::Attr {
                name: "name".to_string(),
                contains: "loginId".to_string(),
            },
            &credentials.login_id,
        )
        .await?;

        if !self
            .session
            .locator(Selector::button("Log In"))
            .try_click(Some(FIELD_TIMEOUT))
            .await
        {
            return Ok(LoginStatus::Rejected("login button not found".to_string()));
        }

        // The MVA search field marks the landing screen.
        let landed = self
            .session
            .locator(Selector::Attr {
                name: "placeholder".to_string(),
                contains: "MVA".to_string(),
            })
            .exists(Some(LANDING_TIMEOUT))
            .await;

        if landed {
            info!("[LOGIN] Session initialized");
            Ok(LoginStatus::Ok)
        } else {
            error!("[LOGIN] Landing screen did not appear after sign-in");
            Ok(LoginStatus::Rejected(
                "landing screen did not appear".to_string(),
            ))
        }
    }
}

//! Browser automation for fleet glass-damage work items
//!
//! This crate drives the fleet operations web application through a WebDriver
//! session, inspired by Playwright's locator model: vehicles are looked up by
//! MVA, their work item inventory is read, and missing glass-damage work items
//! are created through the application's multi-screen complaint dialog.

pub mod batch;
pub mod classify;
pub mod complaint;
pub mod config;
pub mod element;
pub mod engine;
pub mod errors;
pub mod inventory;
pub mod locator;
pub mod login;
pub mod manifest;
pub mod navigator;
pub mod selector;
#[cfg(test)]
mod tests;
pub mod types;
pub mod webdriver;
pub mod workflow;

pub use batch::BatchRunner;
pub use config::Credentials;
pub use element::PageElement;
pub use engine::{Session, WebEngine};
pub use errors::{AutomationError, NavigateError};
pub use locator::Locator;
pub use login::{LoginFlow, LoginStatus, PortalLogin};
pub use selector::Selector;
pub use types::{
    ComplaintCandidate, ComplaintTag, ComplaintType, FailReason, GlassDamageType, OutcomeStatus,
    WorkItemRequest, WorkflowOutcome,
};
pub use workflow::{handler_for, GlassWorkItemHandler, WorkItemCreator, WorkItemHandler};

//! Work item creation: the multi-screen dialog state machine and the
//! per-work-item-type handler capability set.

use crate::classify;
use crate::complaint::{self, ComplaintResolver};
use crate::engine::Session;
use crate::errors::AutomationError;
use crate::selector::Selector;
use crate::types::{ComplaintCandidate, FailReason, OutcomeStatus, WorkItemRequest, WorkflowOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

// The add-work-item screen renders client-side with noticeable latency and
// exposes no readiness signal, hence the settle on both sides of the click.
const ADD_WORK_ITEM_SETTLE: Duration = Duration::from_secs(5);
const ADD_WORK_ITEM_TIMEOUT: Duration = Duration::from_secs(30);
const CREATE_BUTTONS_TIMEOUT: Duration = Duration::from_secs(10);
const DONE_TIMEOUT: Duration = Duration::from_secs(15);

const GLASS_OPCODE_LABEL: &str = "Glass Repair/Replace";
const CREATE_ACTIONS: &str = "class:fleet-operations-pwa__create-item-actions";

/// Capability contract for one work item type. Dispatched through
/// [`handler_for`]; each variant supplies the type-specific complaint logic
/// while the state machine owns the screen ordering.
#[async_trait]
pub trait WorkItemHandler: Send + Sync {
    /// Type identifier, e.g. "GLASS".
    fn kind(&self) -> &'static str;

    /// Whether an existing complaint's display text belongs to this type.
    fn matches_existing_complaint(&self, text: &str) -> bool;

    /// Create and submit a new complaint of this type.
    async fn create_new_complaint(
        &self,
        session: &Session,
        request: &WorkItemRequest,
    ) -> WorkflowOutcome;

    /// Consume an existing matching complaint tile.
    async fn handle_existing_complaint(
        &self,
        session: &Session,
        request: &WorkItemRequest,
        candidate: &ComplaintCandidate,
    ) -> WorkflowOutcome;
}

/// Handler for glass-damage work items.
pub struct GlassWorkItemHandler;

#[async_trait]
impl WorkItemHandler for GlassWorkItemHandler {
    fn kind(&self) -> &'static str {
        "GLASS"
    }

    fn matches_existing_complaint(&self, text: &str) -> bool {
        classify::contains_glass(text)
    }

    async fn create_new_complaint(
        &self,
        session: &Session,
        request: &WorkItemRequest,
    ) -> WorkflowOutcome {
        complaint::create_new_glass(session, request).await
    }

    async fn handle_existing_complaint(
        &self,
        session: &Session,
        request: &WorkItemRequest,
        candidate: &ComplaintCandidate,
    ) -> WorkflowOutcome {
        complaint::associate_existing(session, request, candidate).await
    }
}

/// Look up the handler for a work item type tag.
///
/// "PM" is a recognized type with no handler yet; anything else is a caller
/// error.
pub fn handler_for(kind: &str) -> Result<Arc<dyn WorkItemHandler>, AutomationError> {
    match kind.to_uppercase().as_str() {
        "GLASS" => Ok(Arc::new(GlassWorkItemHandler)),
        "PM" => Err(AutomationError::UnsupportedOperation(
            "PM work items are not implemented".to_string(),
        )),
        other => Err(AutomationError::InvalidArgument(format!(
            "unsupported work item type: {other}"
        ))),
    }
}

/// Screens of the creation dialog, in strict forward order. There are no
/// backward transitions; the only permitted skip is MileageConfirm and
/// OpcodeSelection when the resolver's associate path already consumed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreationState {
    AddWorkItem,
    ComplaintResolution,
    MileageConfirm,
    OpcodeSelection,
    CreateWorkItem,
    FinalDone,
}

/// Drives the creation dialog end-to-end for one resolved request.
///
/// Failures are not retried here; a failing state yields `Failed` with that
/// state's reason tag and retry, if any, happens at the batch level by
/// restarting the whole per-MVA attempt.
pub struct WorkItemCreator<'s> {
    session: &'s Session,
    handler: Arc<dyn WorkItemHandler>,
}

impl<'s> WorkItemCreator<'s> {
    pub fn new(session: &'s Session, handler: Arc<dyn WorkItemHandler>) -> Self {
        Self { session, handler }
    }

    pub async fn run(&self, request: &WorkItemRequest) -> WorkflowOutcome {
        let mva = request.mva();
        info!(
            "[WORKITEM] {mva} - Creating {} work item",
            self.handler.kind()
        );

        let mut resolution = OutcomeStatus::Created;
        let mut state = CreationState::AddWorkItem;
        loop {
            state = match state {
                CreationState::AddWorkItem => {
                    if !self.click_add_work_item(mva).await {
                        return WorkflowOutcome::failed(mva, FailReason::AddWorkItem);
                    }
                    CreationState::ComplaintResolution
                }
                CreationState::ComplaintResolution => {
                    let outcome = ComplaintResolver::new(self.session)
                        .resolve(request, self.handler.as_ref())
                        .await;
                    match outcome.status {
                        // Associate path already consumed mileage and opcode.
                        OutcomeStatus::Associated => {
                            resolution = OutcomeStatus::Associated;
                            CreationState::CreateWorkItem
                        }
                        OutcomeStatus::Created => CreationState::MileageConfirm,
                        _ => return outcome,
                    }
                }
                CreationState::MileageConfirm => {
                    if !complaint::complete_mileage_dialog(self.session, mva).await {
                        return WorkflowOutcome::failed(mva, FailReason::Mileage);
                    }
                    CreationState::OpcodeSelection
                }
                CreationState::OpcodeSelection => {
                    if !complaint::select_opcode(self.session, mva, GLASS_OPCODE_LABEL).await {
                        return WorkflowOutcome::failed(mva, FailReason::Opcode);
                    }
                    CreationState::CreateWorkItem
                }
                CreationState::CreateWorkItem => {
                    if !self.click_create_work_item(mva).await {
                        return WorkflowOutcome::failed(mva, FailReason::CreateWorkItem);
                    }
                    CreationState::FinalDone
                }
                CreationState::FinalDone => {
                    if !self
                        .session
                        .locator(Selector::button("Done"))
                        .try_click(Some(DONE_TIMEOUT))
                        .await
                    {
                        warn!("[WORKITEM][WARN] {mva} - Done button not found");
                        return WorkflowOutcome::failed(mva, FailReason::FinalDone);
                    }
                    info!("[WORKITEM] {mva} - work item confirmed");
                    return WorkflowOutcome::new(mva, resolution);
                }
            };
        }
    }

    async fn click_add_work_item(&self, mva: &str) -> bool {
        tokio::time::sleep(ADD_WORK_ITEM_SETTLE).await;
        if !self
            .session
            .locator(Selector::button("Add Work Item"))
            .try_click(Some(ADD_WORK_ITEM_TIMEOUT))
            .await
        {
            warn!("[WORKITEM][WARN] {mva} - Add Work Item button not found");
            return false;
        }
        info!("[WORKITEM] {mva} - Add Work Item clicked");
        tokio::time::sleep(ADD_WORK_ITEM_SETTLE).await;
        true
    }

    /// The action container renders exactly one enabled button at this point;
    /// it is selected by exclusion rather than by label.
    async fn click_create_work_item(&self, mva: &str) -> bool {
        let container = match self
            .session
            .locator(CREATE_ACTIONS)
            .wait(Some(CREATE_BUTTONS_TIMEOUT))
            .await
        {
            Ok(container) => container,
            Err(e) => {
                warn!("[WORKITEM][WARN] {mva} - create-action container not found: {e}");
                return false;
            }
        };

        let buttons = match container.find_all(&Selector::from("button")).await {
            Ok(buttons) => buttons,
            Err(e) => {
                warn!("[WORKITEM][WARN] {mva} - could not list action buttons: {e}");
                return false;
            }
        };

        for button in buttons {
            let disabled_attr = button.attr("disabled").await.ok().flatten().is_some();
            let enabled = button.is_enabled().await.unwrap_or(false);
            if !disabled_attr && enabled {
                if let Err(e) = button.click().await {
                    warn!("[WORKITEM][WARN] {mva} - create click failed: {e}");
                    return false;
                }
                info!("[WORKITEM] {mva} - Create Work Item clicked");
                return true;
            }
        }
        warn!("[WORKITEM][WARN] {mva} - no enabled create button found");
        false
    }
}

//! Sequential batch driver: one owned session, one vehicle at a time.

use crate::engine::Session;
use crate::errors::NavigateError;
use crate::inventory;
use crate::navigator::VehicleNavigator;
use crate::types::{FailReason, WorkItemRequest, WorkflowOutcome};
use crate::workflow::{WorkItemCreator, WorkItemHandler};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const MAX_ATTEMPTS: u32 = 2;
const RETRY_BACKOFF: Duration = Duration::from_secs(2);
// Pacing between vehicles keeps the app's client-side router from dropping
// the first interaction after a home navigation.
const VEHICLE_PACING: Duration = Duration::from_secs(2);

/// Runs a manifest of work item requests against one browser session,
/// yielding exactly one outcome per request, in manifest order.
pub struct BatchRunner<'s> {
    session: &'s Session,
    handler: Arc<dyn WorkItemHandler>,
}

impl<'s> BatchRunner<'s> {
    pub fn new(session: &'s Session, handler: Arc<dyn WorkItemHandler>) -> Self {
        Self { session, handler }
    }

    pub async fn run(&self, requests: &[WorkItemRequest]) -> Vec<WorkflowOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for (idx, request) in requests.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(VEHICLE_PACING).await;
            }
            let outcome = self.process(request).await;
            info!(
                "[MVA] {} - finished with status {:?}",
                outcome.mva, outcome.status
            );

            // Every terminal outcome, success or not, is followed by a
            // best-effort return to the home screen so the next MVA starts
            // from a known state.
            let navigator = VehicleNavigator::new(self.session);
            if let Err(e) = navigator.return_home().await {
                warn!("[NAV][WARN] {} - could not return home: {e}", request.mva());
            }

            outcomes.push(outcome);
        }
        outcomes
    }

    async fn process(&self, request: &WorkItemRequest) -> WorkflowOutcome {
        let mva = request.mva();
        let banner = "*".repeat(32);
        info!("{banner}");
        info!("[MVA] Processing vehicle {mva}");
        info!("{banner}");

        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(request).await {
                Ok(outcome) => return outcome,
                // An invalid MVA will not become valid on retry.
                Err(NavigateError::NotFound) => {
                    warn!("[MVA][WARN] {mva} - vehicle not found, skipping");
                    return WorkflowOutcome::failed(mva, FailReason::VehicleNotFound);
                }
                Err(e) => {
                    warn!("[MVA][WARN] {mva} - attempt {attempt}/{MAX_ATTEMPTS} failed: {e}");
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(RETRY_BACKOFF).await;
                    }
                }
            }
        }

        error!("[MVA][FATAL] {mva} - all attempts failed, skipping vehicle");
        WorkflowOutcome::failed(mva, FailReason::Exception)
    }

    /// One end-to-end pass for a vehicle: load it, check the existing work
    /// item inventory, and only invoke the creation machine when no glass
    /// work item is present.
    async fn attempt(&self, request: &WorkItemRequest) -> Result<WorkflowOutcome, NavigateError> {
        let mva = request.mva();
        VehicleNavigator::new(self.session).load(mva).await?;

        let labels = inventory::list_work_items(self.session, mva).await?;
        if let Some(existing) = inventory::find_glass(&labels) {
            info!(
                "[GLASS] {mva} - Glass damage work item already exists: '{}'",
                existing.text
            );
            return Ok(WorkflowOutcome::ok(mva));
        }
        info!("[GLASS] {mva} - No existing glass damage work item found");

        Ok(WorkItemCreator::new(self.session, self.handler.clone())
            .run(request)
            .await)
    }
}

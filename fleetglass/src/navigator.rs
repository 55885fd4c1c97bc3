//! Vehicle session navigation: robust MVA entry and vehicle-load detection.

use crate::element::PageElement;
use crate::engine::Session;
use crate::errors::{AutomationError, NavigateError};
use std::time::Duration;
use tracing::{info, warn};

const INPUT_WAIT: Duration = Duration::from_secs(5);
const INPUT_POLL: Duration = Duration::from_millis(250);
const CLEAR_ROUNDS: usize = 3;
const VEHICLE_PROPERTIES_WAIT: Duration = Duration::from_secs(15);
const HOME_VERIFY_WAIT: Duration = Duration::from_secs(5);

const MVA_INPUT: &str = "attr:placeholder*=MVA";
const VEHICLE_PROPERTIES: &str = "class:fleet-operations-pwa__vehicle-properties-container";
const BACK_BUTTON: &str = "class:fleet-operations-pwa__back-button";

/// Enters MVAs into the search field and waits for the application to load
/// the vehicle's data.
pub struct VehicleNavigator<'s> {
    session: &'s Session,
}

impl<'s> VehicleNavigator<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self { session }
    }

    /// Load the given MVA into the active session.
    ///
    /// The host application auto-searches once enough digits are present, so
    /// the MVA is typed without an explicit submit. A missing input field is
    /// `InputUnavailable`; an absent vehicle-properties signal within the
    /// timeout means the MVA is invalid (`NotFound`), not a transient error.
    pub async fn load(&self, mva: &str) -> Result<(), NavigateError> {
        let input = self.find_input().await?;

        self.clear_input(&input).await?;
        input.send_keys(mva).await.map_err(NavigateError::from)?;
        info!("[MVA_INPUT] Entered MVA: {mva}");

        info!("[MVA_VALIDATION] Waiting for vehicle properties to load for {mva}...");
        let loaded = self
            .session
            .locator(VEHICLE_PROPERTIES)
            .exists(Some(VEHICLE_PROPERTIES_WAIT))
            .await;
        if !loaded {
            warn!("[MVA_VALIDATION] Vehicle properties not found for {mva} - MVA may be invalid or non-existent");
            return Err(NavigateError::NotFound);
        }
        info!("[MVA_VALIDATION] Vehicle properties loaded successfully for {mva}");
        Ok(())
    }

    /// Best-effort return to the home screen, verified by the MVA input
    /// becoming present again.
    pub async fn return_home(&self) -> Result<(), AutomationError> {
        info!("[NAV] Attempting to navigate back to home page...");
        self.session
            .locator(BACK_BUTTON)
            .click(Some(HOME_VERIFY_WAIT))
            .await?;
        let verified = self
            .session
            .locator(MVA_INPUT)
            .exists(Some(HOME_VERIFY_WAIT))
            .await;
        if verified {
            info!("[NAV] Successfully verified return to main page");
            Ok(())
        } else {
            Err(AutomationError::ElementNotFound(
                "back button clicked but home page verification failed".to_string(),
            ))
        }
    }

    async fn find_input(&self) -> Result<PageElement, NavigateError> {
        let locator = self
            .session
            .locator(MVA_INPUT)
            .set_poll_interval(INPUT_POLL);
        match locator.wait_clickable(Some(INPUT_WAIT)).await {
            Ok(input) => Ok(input),
            Err(AutomationError::Timeout(_)) | Err(AutomationError::ElementNotFound(_)) => {
                Err(NavigateError::InputUnavailable)
            }
            Err(e) => Err(NavigateError::Automation(e)),
        }
    }

    /// Layered clearing: repeated select-all+delete+clear, then two bounded
    /// polls for the field to actually read empty. A field that never reads
    /// empty is logged and tolerated; the host app usually recovers.
    async fn clear_input(&self, input: &PageElement) -> Result<(), AutomationError> {
        for _ in 0..CLEAR_ROUNDS {
            input.press_key("ctrl+a").await?;
            input.press_key("delete").await?;
            input.clear().await?;
            tokio::time::sleep(Duration::from_millis(200)).await;
        }

        // Up to 1s (4 x 250ms) for the field to read empty
        if !self.poll_empty(input, 4, Duration::from_millis(250)).await? {
            warn!("[MVA_INPUT] Field not empty after clearing attempts!");
        }
        // A further 3s (15 x 200ms) grace for slow re-renders
        if self.poll_empty(input, 15, Duration::from_millis(200)).await? {
            info!("[MVA_INPUT] Field cleared before entering new MVA.");
        } else {
            warn!("[MVA_INPUT] Field not fully cleared before entering new MVA!");
        }
        Ok(())
    }

    async fn poll_empty(
        &self,
        input: &PageElement,
        rounds: usize,
        interval: Duration,
    ) -> Result<bool, AutomationError> {
        for _ in 0..rounds {
            if input.value().await?.is_empty() {
                return Ok(true);
            }
            tokio::time::sleep(interval).await;
        }
        Ok(input.value().await?.is_empty())
    }
}

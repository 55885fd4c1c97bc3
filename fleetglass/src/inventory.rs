//! Work item inventory for the active vehicle.

use crate::classify;
use crate::engine::Session;
use crate::errors::AutomationError;
use crate::types::WorkItemLabel;
use std::time::Duration;
use tracing::{debug, info};

const WORK_ITEMS_WAIT: Duration = Duration::from_secs(10);

const WORK_ITEM_ROW: &str = "class:fleet-operations-pwa__work-item-row";

/// List the current work items for the active vehicle.
///
/// Waits for the work item rows to render after the vehicle loads; a vehicle
/// with no work items simply yields an empty list once the wait elapses.
/// Counts are small, so the list is always materialized.
pub async fn list_work_items(
    session: &Session,
    mva: &str,
) -> Result<Vec<WorkItemLabel>, AutomationError> {
    let rows = session
        .locator(WORK_ITEM_ROW)
        .all(Some(WORK_ITEMS_WAIT))
        .await?;

    let mut labels = Vec::with_capacity(rows.len());
    for row in rows {
        let text = row.text().await?;
        debug!("[WORKITEM] {mva} - work item row: '{text}'");
        labels.push(WorkItemLabel { text });
    }
    info!("[WORKITEM] {mva} - {} work item(s) listed", labels.len());
    Ok(labels)
}

/// First glass-classified work item, if any. Scanning stops at the first hit.
pub fn find_glass(labels: &[WorkItemLabel]) -> Option<&WorkItemLabel> {
    labels
        .iter()
        .find(|label| classify::is_glass_work_item(&label.text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str) -> WorkItemLabel {
        WorkItemLabel {
            text: text.to_string(),
        }
    }

    #[test]
    fn finds_first_glass_item_only() {
        let labels = vec![
            label("PM - PM"),
            label("GLASS Damage - Windshield"),
            label("Glass Damage - Rear"),
        ];
        let found = find_glass(&labels).unwrap();
        assert_eq!(found.text, "GLASS Damage - Windshield");
    }

    #[test]
    fn no_glass_items_yields_none() {
        let labels = vec![label("PM - PM"), label("Brakes - Front")];
        assert!(find_glass(&labels).is_none());
    }

    #[test]
    fn empty_inventory_yields_none() {
        assert!(find_glass(&[]).is_none());
    }
}

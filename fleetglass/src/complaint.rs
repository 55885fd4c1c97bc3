//! Complaint detection, association, and creation flows.
//!
//! A work item is built on top of a complaint. The resolver inspects the
//! complaint screen for an existing tile that matches the work item type and
//! either associates it or walks the new-complaint dialog sequence.

use crate::classify;
use crate::element::PageElement;
use crate::engine::Session;
use crate::errors::AutomationError;
use crate::selector::Selector;
use crate::types::{
    ComplaintCandidate, ComplaintTag, ComplaintType, FailReason, GlassDamageType, WorkItemRequest,
    WorkflowOutcome,
};
use crate::workflow::WorkItemHandler;
use std::time::Duration;
use tracing::{debug, info, warn};

// The complaint screen exposes no readiness signal; tiles render in place.
const TILE_SETTLE: Duration = Duration::from_secs(3);
const DIALOG_NEXT_TIMEOUT: Duration = Duration::from_secs(8);
const ADD_COMPLAINT_TIMEOUT: Duration = Duration::from_secs(8);
const ADD_COMPLAINT_FALLBACK_TIMEOUT: Duration = Duration::from_secs(4);
const DRIVABILITY_TIMEOUT: Duration = Duration::from_secs(10);
const COMPLAINT_TYPE_TIMEOUT: Duration = Duration::from_secs(10);
const DAMAGE_OPTION_TIMEOUT: Duration = Duration::from_secs(20);
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);
const MILEAGE_NEXT_TIMEOUT: Duration = Duration::from_secs(10);
const OPCODE_LIST_TIMEOUT: Duration = Duration::from_secs(10);

const COMPLAINT_TILE: &str = "class:fleet-operations-pwa__complaintItem";
const TILE_IMAGE: &str = "class:fleet-operations-pwa__tileImage";
const DAMAGE_OPTION_BUTTON: &str = "class:fleet-operations-pwa__damage-option-button";
const OPCODE_LIST_ITEM: &str = "class:fleet-operations-pwa__opcode-list-item";

const DIAGNOSTICS_DIR: &str = "diagnostics";

/// Decides between associating an existing complaint tile and creating a new
/// complaint for the requested work item type.
pub struct ComplaintResolver<'s> {
    session: &'s Session,
}

impl<'s> ComplaintResolver<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self { session }
    }

    /// Resolve the complaint for this request, delegating the chosen path to
    /// the handler. Returns `Associated` when an existing tile was consumed
    /// (mileage and opcode included), `Created` when a new complaint was
    /// submitted, or a tagged failure.
    pub async fn resolve(
        &self,
        request: &WorkItemRequest,
        handler: &dyn WorkItemHandler,
    ) -> WorkflowOutcome {
        let mva = request.mva();
        tokio::time::sleep(TILE_SETTLE).await;

        let candidates = match self.detect_candidates(mva).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("[COMPLAINT][ERROR] {mva} - complaint detection failed: {e}");
                Vec::new()
            }
        };

        for candidate in &candidates {
            if handler.matches_existing_complaint(&candidate.text)
                || candidate.tag == ComplaintTag::Glass
            {
                info!(
                    "[{}] {mva} - Found matching existing complaint: '{}'",
                    handler.kind(),
                    candidate.text
                );
                return handler
                    .handle_existing_complaint(self.session, request, candidate)
                    .await;
            }
        }

        info!(
            "[{}] {mva} - No matching complaint found, creating new one",
            handler.kind()
        );
        handler.create_new_complaint(self.session, request).await
    }

    /// Enumerate complaint tiles and classify each by display text, falling
    /// back to the tile image's alt attribute.
    pub async fn detect_candidates(
        &self,
        mva: &str,
    ) -> Result<Vec<ComplaintCandidate>, AutomationError> {
        let tiles = self
            .session
            .locator(COMPLAINT_TILE)
            .all(Some(Duration::from_secs(2)))
            .await?;
        debug!("[COMPLAINT] {mva} - found {} complaint tile(s)", tiles.len());

        let mut candidates = Vec::with_capacity(tiles.len());
        for tile in tiles {
            let text = tile.text().await.unwrap_or_default();
            let mut tag = classify::classify_complaint(&text);
            if tag != ComplaintTag::Glass {
                if let Some(alt) = tile_image_alt(&tile).await {
                    if classify::contains_glass(&alt) {
                        tag = ComplaintTag::Glass;
                    }
                }
            }
            debug!("[COMPLAINT] {mva} - tile '{text}' classified as {tag:?}");
            candidates.push(ComplaintCandidate { element: tile, text, tag });
        }
        Ok(candidates)
    }
}

async fn tile_image_alt(tile: &PageElement) -> Option<String> {
    let image = tile.find(&Selector::from(TILE_IMAGE)).await.ok()?;
    image.attr("alt").await.ok().flatten()
}

/// Associate an existing glass complaint tile.
///
/// Flow: tile click -> Next (complaint dialog) -> mileage dialog -> opcode.
/// Any missing step aborts the whole resolution with the step's reason tag.
pub async fn associate_existing(
    session: &Session,
    request: &WorkItemRequest,
    candidate: &ComplaintCandidate,
) -> WorkflowOutcome {
    let mva = request.mva();

    if let Err(e) = candidate.element.click().await {
        warn!("[GLASS][COMPLAINT][WARN] {mva} - failed to click glass complaint tile: {e}");
        return WorkflowOutcome::failed(mva, FailReason::TileClick);
    }
    info!("[GLASS][COMPLAINT][ASSOCIATED] {mva} - glass complaint selected");

    if !click_next_in_dialog(session, DIALOG_NEXT_TIMEOUT).await {
        return WorkflowOutcome::failed(mva, FailReason::ComplaintNext);
    }

    if !complete_mileage_dialog(session, mva).await {
        return WorkflowOutcome::failed(mva, FailReason::Mileage);
    }

    if !select_opcode(session, mva, "Glass").await {
        return WorkflowOutcome::failed(mva, FailReason::Opcode);
    }

    WorkflowOutcome::associated(mva)
}

/// Walk the new-complaint dialog sequence for a glass damage complaint.
pub async fn create_new_glass(session: &Session, request: &WorkItemRequest) -> WorkflowOutcome {
    let mva = request.mva();
    info!("[GLASS][COMPLAINT][NEW] {mva} - creating new glass complaint");

    let add = session.locator(Selector::button("Add New Complaint"));
    let create = session.locator(Selector::button("Create New Complaint"));
    if !(add.try_click(Some(ADD_COMPLAINT_TIMEOUT)).await
        || create.try_click(Some(ADD_COMPLAINT_FALLBACK_TIMEOUT)).await)
    {
        warn!("[GLASS][COMPLAINT][NEW][WARN] {mva} - could not click Add/Create New Complaint");
        return WorkflowOutcome::failed(mva, FailReason::AddBtn);
    }
    info!("[GLASS][COMPLAINT][NEW] {mva} - Add/Create New Complaint clicked");
    tokio::time::sleep(Duration::from_secs(2)).await;

    // Drivability is always answered Yes; the run never marks a vehicle
    // undrivable over glass damage.
    info!("[DRIVABLE] {mva} - answering drivability question: Yes");
    if !session
        .locator(Selector::button("Yes"))
        .try_click(Some(DRIVABILITY_TIMEOUT))
        .await
    {
        warn!("[GLASS][COMPLAINT][NEW][WARN] {mva} - could not click Yes in Drivability step");
        return WorkflowOutcome::failed(mva, FailReason::Drivability);
    }
    info!("[COMPLAINT] {mva} - Drivable=Yes");
    tokio::time::sleep(Duration::from_secs(1)).await;

    // Complaint type auto-advances to the subtype screen, no Next here.
    if !session
        .locator(Selector::button(ComplaintType::GlassDamage.label()))
        .try_click(Some(COMPLAINT_TYPE_TIMEOUT))
        .await
    {
        warn!("[GLASS][COMPLAINT][WARN] {mva} - Complaint type 'Glass Damage' not found");
        return WorkflowOutcome::failed(mva, FailReason::ComplaintType);
    }
    info!("[COMPLAINT] {mva} - Complaint type 'Glass Damage' selected");
    tokio::time::sleep(Duration::from_secs(2)).await;

    let subtype = match GlassDamageType::from_request(request) {
        Ok(subtype) => subtype,
        Err(e) => {
            warn!("[GLASS][COMPLAINT][WARN] {mva} - {e}");
            capture_snapshot(session, mva, "glass_damage_type").await;
            return WorkflowOutcome::failed(mva, FailReason::GlassDamageType);
        }
    };
    if !select_damage_option(session, mva, subtype.label()).await {
        capture_snapshot(session, mva, "glass_damage_type").await;
        return WorkflowOutcome::failed(mva, FailReason::GlassDamageType);
    }

    if !session
        .locator(Selector::button("Submit Complaint"))
        .try_click(Some(SUBMIT_TIMEOUT))
        .await
    {
        warn!("[GLASS][COMPLAINT][WARN] {mva} - could not submit Additional Info");
        capture_snapshot(session, mva, "submit_info").await;
        return WorkflowOutcome::failed(mva, FailReason::SubmitInfo);
    }
    info!("[COMPLAINT] {mva} - Additional Info submitted");
    tokio::time::sleep(Duration::from_secs(2)).await;

    WorkflowOutcome::created(mva)
}

/// Click the 'Next' button inside the active dialog.
pub async fn click_next_in_dialog(session: &Session, timeout: Duration) -> bool {
    let clicked = session
        .locator(Selector::button("Next"))
        .try_click(Some(timeout))
        .await;
    if clicked {
        info!("[DIALOG] Next button clicked");
    } else {
        warn!("[DIALOG][WARN] could not click Next button");
    }
    clicked
}

/// Advance through the mileage screen. The recorded mileage is accepted
/// as-is; the dialog only needs its Next.
pub async fn complete_mileage_dialog(session: &Session, mva: &str) -> bool {
    let advanced = click_next_in_dialog(session, MILEAGE_NEXT_TIMEOUT).await;
    if advanced {
        info!("[COMPLAINT] {mva} - mileage dialog completed");
    } else {
        warn!("[WORKITEM][WARN] {mva} - could not advance mileage dialog");
    }
    advanced
}

/// Scan the opcode list for an item whose visible label equals `label`
/// exactly (after trimming) and click the first match.
pub async fn select_opcode(session: &Session, mva: &str, label: &str) -> bool {
    let items = match session
        .locator(OPCODE_LIST_ITEM)
        .all(Some(OPCODE_LIST_TIMEOUT))
        .await
    {
        Ok(items) => items,
        Err(e) => {
            warn!("[OPCODE][WARN] {mva} - could not list opcodes: {e}");
            return false;
        }
    };

    for item in items {
        match item.text().await {
            Ok(text) if text.trim() == label => {
                if let Err(e) = item.click().await {
                    warn!("[OPCODE][WARN] {mva} - failed to click opcode '{label}': {e}");
                    return false;
                }
                info!("[OPCODE] {mva} - opcode '{label}' selected");
                return true;
            }
            Ok(_) => continue,
            Err(e) => {
                debug!("[OPCODE] {mva} - unreadable opcode item skipped: {e}");
                continue;
            }
        }
    }
    warn!("[OPCODE][WARN] {mva} - opcode '{label}' not found");
    false
}

/// Scan the damage option buttons for one whose heading matches the label.
async fn select_damage_option(session: &Session, mva: &str, label: &str) -> bool {
    info!("[GLASS] {mva} - selecting glass damage option: '{label}'");
    let buttons = match session
        .locator(DAMAGE_OPTION_BUTTON)
        .all(Some(DAMAGE_OPTION_TIMEOUT))
        .await
    {
        Ok(buttons) => buttons,
        Err(e) => {
            warn!("[GLASS][WARN] {mva} - could not list damage options: {e}");
            return false;
        }
    };

    for button in buttons {
        // The visible label sits in an <h1> inside the button.
        let heading = match button.find(&Selector::from("h1")).await {
            Ok(heading) => heading,
            Err(_) => continue,
        };
        match heading.text().await {
            Ok(text) if text.trim() == label => {
                if let Err(e) = button.click().await {
                    warn!("[GLASS][WARN] {mva} - failed to click '{label}' option: {e}");
                    return false;
                }
                info!("[GLASS] {mva} - '{label}' option clicked");
                return true;
            }
            _ => continue,
        }
    }
    warn!("[GLASS][WARN] {mva} - damage option '{label}' not found");
    false
}

/// Best-effort page snapshot for post-mortem debugging. Capture failures are
/// logged and never escalate the original failure.
pub async fn capture_snapshot(session: &Session, mva: &str, stage: &str) {
    let source = match session.page_source().await {
        Ok(source) => source,
        Err(e) => {
            warn!("[DIAG] {mva} - snapshot capture failed at {stage}: {e}");
            return;
        }
    };
    let dir = std::path::Path::new(DIAGNOSTICS_DIR);
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("[DIAG] {mva} - could not create {DIAGNOSTICS_DIR}/: {e}");
        return;
    }
    let path = dir.join(format!("{mva}_{stage}.html"));
    match std::fs::write(&path, source) {
        Ok(()) => info!("[DIAG] {mva} - page snapshot written to {}", path.display()),
        Err(e) => warn!("[DIAG] {mva} - could not write snapshot: {e}"),
    }
}

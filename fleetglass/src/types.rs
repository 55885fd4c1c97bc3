use crate::element::PageElement;
use crate::errors::AutomationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the input manifest: the vehicle to review and, optionally, the
/// kind of glass damage to record. Normalized on construction and immutable
/// afterwards; exactly one instance per MVA per batch pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemRequest {
    mva: String,
    damage_type: Option<String>,
    location: Option<String>,
}

impl WorkItemRequest {
    pub fn new(mva: &str, damage_type: Option<&str>, location: Option<&str>) -> Self {
        let normalize = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_uppercase)
        };
        Self {
            mva: mva.trim().to_string(),
            damage_type: normalize(damage_type),
            location: normalize(location),
        }
    }

    pub fn mva(&self) -> &str {
        &self.mva
    }

    pub fn damage_type(&self) -> Option<&str> {
        self.damage_type.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

/// Complaint categories offered by the target application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintType {
    GlassDamage,
    Pm,
}

impl ComplaintType {
    /// The option label as rendered by the complaint-type screen.
    pub fn label(&self) -> &'static str {
        match self {
            ComplaintType::GlassDamage => "Glass Damage",
            ComplaintType::Pm => "PM",
        }
    }
}

/// Glass damage subtypes offered after selecting the Glass Damage complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlassDamageType {
    WindshieldCrack,
    WindshieldChip,
    SideRearWindowDamage,
    Unknown,
}

impl GlassDamageType {
    /// The option label as rendered by the subtype screen.
    pub fn label(&self) -> &'static str {
        match self {
            GlassDamageType::WindshieldCrack => "Windshield Crack",
            GlassDamageType::WindshieldChip => "Windshield Chip",
            GlassDamageType::SideRearWindowDamage => "Side/Rear Window Damage",
            GlassDamageType::Unknown => "I don't know",
        }
    }

    /// Map a request's normalized damage type and location onto a UI subtype.
    ///
    /// A side or rear location always wins. `REPLACEMENT` and an absent
    /// damage type both land on "I don't know" since the subtype screen has
    /// no replacement entry. Unrecognized strings fail; there is no silent
    /// default for values the UI cannot express.
    pub fn from_request(req: &WorkItemRequest) -> Result<Self, AutomationError> {
        if matches!(req.location(), Some("SIDE") | Some("REAR")) {
            return Ok(GlassDamageType::SideRearWindowDamage);
        }
        match req.damage_type() {
            Some("CRACK") => Ok(GlassDamageType::WindshieldCrack),
            Some("CHIP") => Ok(GlassDamageType::WindshieldChip),
            Some("REPLACEMENT") | None => Ok(GlassDamageType::Unknown),
            Some(other) => Err(AutomationError::InvalidArgument(format!(
                "unknown glass damage type '{other}' for MVA {}",
                req.mva()
            ))),
        }
    }
}

/// Classification of a complaint tile found on the complaint screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintTag {
    Glass,
    Pm,
    Unknown,
}

/// A complaint tile with its extracted display text and classification.
/// Ephemeral; lives only within one resolution attempt.
#[derive(Debug, Clone)]
pub struct ComplaintCandidate {
    pub element: PageElement,
    pub text: String,
    pub tag: ComplaintTag,
}

/// Terminal status of one stage or of an MVA's whole pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Nothing to do; a matching work item already exists.
    Ok,
    /// A new work item was created end-to-end.
    Created,
    /// An existing complaint was associated and the work item completed.
    Associated,
    /// No matching complaint was found and no new one was opened.
    SkippedNoComplaint,
    Failed,
}

/// Identifies the step a stage failed at. Rendered as the original run-log
/// reason tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    TileClick,
    ComplaintNext,
    Mileage,
    Opcode,
    AddBtn,
    Drivability,
    ComplaintType,
    GlassDamageType,
    SubmitInfo,
    AddWorkItem,
    CreateWorkItem,
    FinalDone,
    VehicleNotFound,
    InputUnavailable,
    UnsupportedType,
    Exception,
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            FailReason::TileClick => "tile_click",
            FailReason::ComplaintNext => "complaint_next",
            FailReason::Mileage => "mileage",
            FailReason::Opcode => "opcode",
            FailReason::AddBtn => "add_btn",
            FailReason::Drivability => "drivability",
            FailReason::ComplaintType => "complaint_type",
            FailReason::GlassDamageType => "glass_damage_type",
            FailReason::SubmitInfo => "submit_info",
            FailReason::AddWorkItem => "add_work_item",
            FailReason::CreateWorkItem => "create_work_item",
            FailReason::FinalDone => "final_done",
            FailReason::VehicleNotFound => "vehicle_not_found",
            FailReason::InputUnavailable => "input_unavailable",
            FailReason::UnsupportedType => "unsupported_type",
            FailReason::Exception => "exception",
        };
        f.write_str(tag)
    }
}

/// The terminal result of a stage or batch item. Exactly one of these is
/// produced per MVA per batch pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    pub mva: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailReason>,
}

impl WorkflowOutcome {
    pub fn new(mva: &str, status: OutcomeStatus) -> Self {
        Self {
            mva: mva.to_string(),
            status,
            reason: None,
        }
    }

    pub fn ok(mva: &str) -> Self {
        Self::new(mva, OutcomeStatus::Ok)
    }

    pub fn created(mva: &str) -> Self {
        Self::new(mva, OutcomeStatus::Created)
    }

    pub fn associated(mva: &str) -> Self {
        Self::new(mva, OutcomeStatus::Associated)
    }

    pub fn skipped_no_complaint(mva: &str) -> Self {
        Self::new(mva, OutcomeStatus::SkippedNoComplaint)
    }

    pub fn failed(mva: &str, reason: FailReason) -> Self {
        Self {
            mva: mva.to_string(),
            status: OutcomeStatus::Failed,
            reason: Some(reason),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == OutcomeStatus::Failed
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            OutcomeStatus::Ok | OutcomeStatus::Created | OutcomeStatus::Associated
        )
    }
}

/// The display text of one work item row for the active vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItemLabel {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_normalizes_fields() {
        let req = WorkItemRequest::new("  12345678 ", Some(" crack "), Some("windshield"));
        assert_eq!(req.mva(), "12345678");
        assert_eq!(req.damage_type(), Some("CRACK"));
        assert_eq!(req.location(), Some("WINDSHIELD"));
    }

    #[test]
    fn empty_optionals_become_none() {
        let req = WorkItemRequest::new("12345678", Some("  "), None);
        assert_eq!(req.damage_type(), None);
        assert_eq!(req.location(), None);
    }

    #[test]
    fn subtype_mapping_prefers_side_rear_location() {
        let req = WorkItemRequest::new("12345678", Some("CRACK"), Some("REAR"));
        assert_eq!(
            GlassDamageType::from_request(&req).unwrap(),
            GlassDamageType::SideRearWindowDamage
        );
    }

    #[test]
    fn subtype_mapping_by_damage_type() {
        let crack = WorkItemRequest::new("12345678", Some("CRACK"), Some("WINDSHIELD"));
        let chip = WorkItemRequest::new("12345678", Some("CHIP"), None);
        let none = WorkItemRequest::new("12345678", None, None);
        assert_eq!(
            GlassDamageType::from_request(&crack).unwrap(),
            GlassDamageType::WindshieldCrack
        );
        assert_eq!(
            GlassDamageType::from_request(&chip).unwrap(),
            GlassDamageType::WindshieldChip
        );
        assert_eq!(
            GlassDamageType::from_request(&none).unwrap(),
            GlassDamageType::Unknown
        );
    }

    #[test]
    fn unrecognized_damage_type_fails_instead_of_defaulting() {
        let req = WorkItemRequest::new("12345678", Some("SANDBLAST"), None);
        assert!(matches!(
            GlassDamageType::from_request(&req),
            Err(AutomationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn fail_reason_tags_are_stable() {
        assert_eq!(FailReason::GlassDamageType.to_string(), "glass_damage_type");
        assert_eq!(FailReason::TileClick.to_string(), "tile_click");
    }

    #[test]
    fn outcome_serializes_without_empty_reason() {
        let json = serde_json::to_string(&WorkflowOutcome::created("12345678")).unwrap();
        assert_eq!(json, r#"{"mva":"12345678","status":"created"}"#);
    }
}

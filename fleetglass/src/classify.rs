//! Keyword classification for work items and complaint tiles.
//!
//! The target application exposes no structured type field, so classification
//! is by display text. All keyword sets live here; call sites never match
//! strings themselves.

use crate::types::ComplaintTag;

/// Substrings (case-folded) that mark a work item or complaint as glass.
const GLASS_KEYWORDS: &[&str] = &["glass"];

/// Substrings (case-sensitive, the app renders them upper-case) that mark a
/// complaint tile as a PM complaint.
const PM_KEYWORDS: &[&str] = &["PM"];

/// A work item is a glass-damage item iff its case-folded display text
/// contains a glass keyword.
pub fn is_glass_work_item(text: &str) -> bool {
    contains_glass(text)
}

/// Classify a complaint tile by its display text.
pub fn classify_complaint(text: &str) -> ComplaintTag {
    if contains_glass(text) {
        ComplaintTag::Glass
    } else if PM_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        ComplaintTag::Pm
    } else {
        ComplaintTag::Unknown
    }
}

/// Glass check for auxiliary sources, e.g. a tile image's alt attribute.
pub fn contains_glass(text: &str) -> bool {
    let folded = text.to_lowercase();
    GLASS_KEYWORDS.iter().any(|kw| folded.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glass_iff_case_folded_substring() {
        assert!(is_glass_work_item("GLASS Damage - Windshield"));
        assert!(is_glass_work_item("glass"));
        assert!(is_glass_work_item("Auto Glass / Windshield"));
        assert!(!is_glass_work_item("PM - PM"));
        assert!(!is_glass_work_item(""));
        assert!(!is_glass_work_item("Brakes - Front"));
    }

    #[test]
    fn complaint_classification() {
        assert_eq!(classify_complaint("Glass Damage"), ComplaintTag::Glass);
        assert_eq!(classify_complaint("PM - PM"), ComplaintTag::Pm);
        assert_eq!(classify_complaint("PM Hard Hold - PM"), ComplaintTag::Pm);
        assert_eq!(classify_complaint("Tires - Rear"), ComplaintTag::Unknown);
    }

    #[test]
    fn glass_wins_over_pm_when_both_present() {
        assert_eq!(classify_complaint("PM Glass Check"), ComplaintTag::Glass);
    }
}

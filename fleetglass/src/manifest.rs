//! Input manifest ingestion.
//!
//! The manifest is a comma-separated file with an `MVA,DamageType,Location`
//! header. Rows with an empty MVA, or whose MVA begins with `#`, are silently
//! skipped; everything else is preserved in input order.

use crate::errors::AutomationError;
use crate::types::WorkItemRequest;
use regex::Regex;
use std::path::Path;
use tracing::info;

/// Load and filter work item requests from a manifest file.
pub fn load_requests(path: &Path) -> Result<Vec<WorkItemRequest>, AutomationError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AutomationError::Io(format!("cannot read manifest {}: {e}", path.display())))?;
    let requests = parse_requests(&content)?;
    info!("[CSV] Loaded {} work item request(s) from {}", requests.len(), path.display());
    Ok(requests)
}

/// Parse manifest content. The first row is the header; column positions are
/// taken from it so the file may carry the columns in any order.
pub fn parse_requests(content: &str) -> Result<Vec<WorkItemRequest>, AutomationError> {
    let mut lines = content.lines();
    let header = lines
        .next()
        .ok_or_else(|| AutomationError::InvalidArgument("manifest is empty".to_string()))?;

    let columns: Vec<String> = header
        .split(',')
        .map(|c| c.trim().to_ascii_lowercase())
        .collect();
    let mva_col = columns.iter().position(|c| c == "mva").ok_or_else(|| {
        AutomationError::InvalidArgument("manifest header has no MVA column".to_string())
    })?;
    let damage_col = columns.iter().position(|c| c == "damagetype");
    let location_col = columns.iter().position(|c| c == "location");

    let mva_pattern =
        Regex::new(r"^(\d{8})").map_err(|e| AutomationError::Internal(e.to_string()))?;

    let mut requests = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let raw_mva = fields.get(mva_col).copied().unwrap_or("");
        if raw_mva.is_empty() || raw_mva.starts_with('#') {
            continue;
        }
        let mva = normalize_mva(raw_mva, &mva_pattern);
        let damage_type = damage_col.and_then(|i| fields.get(i).copied());
        let location = location_col.and_then(|i| fields.get(i).copied());

        let request = WorkItemRequest::new(&mva, damage_type, location);
        info!(
            "[CSV] Loading work item: {} (DamageType: {:?}, Location: {:?})",
            request.mva(),
            request.damage_type(),
            request.location()
        );
        requests.push(request);
    }
    Ok(requests)
}

/// Prefer the leading 8-digit run; fall back to the first 8 characters.
fn normalize_mva(raw: &str, pattern: &Regex) -> String {
    let trimmed = raw.trim();
    if let Some(captures) = pattern.captures(trimmed) {
        return captures[1].to_string();
    }
    trimmed.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comment_and_blank_rows() {
        let content = "MVA,DamageType,Location\n12345678,CRACK,WINDSHIELD\n#99999999,,\n,,\n23456789,,\n";
        let requests = parse_requests(content).unwrap();
        let mvas: Vec<&str> = requests.iter().map(|r| r.mva()).collect();
        assert_eq!(mvas, vec!["12345678", "23456789"]);
    }

    #[test]
    fn filtering_preserves_order() {
        let content = "MVA,DamageType,Location\n#11111111,,\n22222222,,\n33333333,,\n#44444444,,\n55555555,,\n";
        let requests = parse_requests(content).unwrap();
        let mvas: Vec<&str> = requests.iter().map(|r| r.mva()).collect();
        assert_eq!(mvas, vec!["22222222", "33333333", "55555555"]);
    }

    #[test]
    fn normalizes_suffixed_mva_values() {
        let content = "MVA,DamageType,Location\n50227203-XYZ,,\n";
        let requests = parse_requests(content).unwrap();
        assert_eq!(requests[0].mva(), "50227203");
    }

    #[test]
    fn columns_may_be_reordered() {
        let content = "DamageType,MVA,Location\nCHIP,12345678,REAR\n";
        let requests = parse_requests(content).unwrap();
        assert_eq!(requests[0].mva(), "12345678");
        assert_eq!(requests[0].damage_type(), Some("CHIP"));
        assert_eq!(requests[0].location(), Some("REAR"));
    }

    #[test]
    fn missing_mva_column_is_an_error() {
        assert!(parse_requests("DamageType,Location\nCRACK,\n").is_err());
    }

    #[test]
    fn requests_carry_normalized_fields() {
        let content = "MVA,DamageType,Location\n 12345678 , crack , windshield \n";
        let requests = parse_requests(content).unwrap();
        assert_eq!(requests[0].damage_type(), Some("CRACK"));
        assert_eq!(requests[0].location(), Some("WINDSHIELD"));
    }
}

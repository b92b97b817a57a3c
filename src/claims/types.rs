//! Claim data model
//!
//! Read model (`Claim`) as returned by the remote API, write model
//! (`CreateClaimRequest`) as submitted by the form, and the shared
//! status classification used by both the list and detail views.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Server-assigned claim identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(pub i64);

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClaimId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ClaimId)
    }
}

/// A claim snapshot as returned by the list and detail endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "claimID")]
    pub claim_id: ClaimId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_amount: Option<Decimal>,
    /// Absent until a decision has been rendered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_holder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_status: Option<String>,
    /// Server-authored rich-text narrative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
}

impl Claim {
    /// Create a bare claim with only an id set
    pub fn new(claim_id: ClaimId) -> Self {
        Self {
            claim_id,
            policy_plan: None,
            incident_type: None,
            agent_name: None,
            claimed_amount: None,
            approved_amount: None,
            documentation_complete: None,
            claim_type: None,
            policy_holder_name: None,
            status: None,
            claim_status: None,
            decision: None,
        }
    }

    /// Status label to display: `status`, falling back to `claim_status`
    pub fn status_label(&self) -> Option<&str> {
        self.status
            .as_deref()
            .or(self.claim_status.as_deref())
    }

    /// Visual category of this claim's status
    pub fn status_category(&self) -> StatusCategory {
        StatusCategory::classify(self.status_label())
    }

    /// Whether a decision has been rendered (an approved amount exists)
    pub fn is_decided(&self) -> bool {
        self.approved_amount.is_some()
    }
}

/// Closed set of status categories used for badges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    Approved,
    Pending,
    Rejected,
    Other,
}

impl StatusCategory {
    /// Classify a free-text status label, case-insensitively.
    ///
    /// Anything that is not approved, pending or rejected (including an
    /// empty or missing label) falls into `Other`.
    pub fn classify(status: Option<&str>) -> Self {
        match status.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("approved") => StatusCategory::Approved,
            Some("pending") => StatusCategory::Pending,
            Some("rejected") => StatusCategory::Rejected,
            _ => StatusCategory::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::Approved => "approved",
            StatusCategory::Pending => "pending",
            StatusCategory::Rejected => "rejected",
            StatusCategory::Other => "other",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of claim that can be filed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimType {
    Auto,
    Home,
    Commercial,
}

impl ClaimType {
    pub const ALL: [ClaimType; 3] = [ClaimType::Auto, ClaimType::Home, ClaimType::Commercial];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Auto => "Auto",
            ClaimType::Home => "Home",
            ClaimType::Commercial => "Commercial",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(ClaimType::Auto),
            "home" => Ok(ClaimType::Home),
            "commercial" => Ok(ClaimType::Commercial),
            other => Err(format!(
                "unknown claim type '{}' (expected Auto, Home or Commercial)",
                other
            )),
        }
    }
}

/// Where an attachment's bytes come from
#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentSource {
    /// Read from disk at submission time
    Path(PathBuf),
    /// Already in memory
    Bytes(Vec<u8>),
}

/// A file selected for upload
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub source: AttachmentSource,
}

impl Attachment {
    /// Build an in-memory attachment; size is taken from the buffer
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            source: AttachmentSource::Bytes(bytes),
        }
    }

    /// Describe a file on disk without reading its contents.
    ///
    /// The declared MIME type is inferred from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Ok(Self {
            name,
            size: metadata.len(),
            mime_type: mime_type_for_path(path).to_string(),
            source: AttachmentSource::Path(path.to_path_buf()),
        })
    }

    /// Size in megabytes with two decimals, e.g. `1.50 MB`
    pub fn display_size(&self) -> String {
        format!("{:.2} MB", self.size as f64 / 1024.0 / 1024.0)
    }

    /// Load the attachment's contents
    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            AttachmentSource::Path(path) => tokio::fs::read(path).await,
            AttachmentSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Declared MIME type for a file extension
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Input for filing a new claim
#[derive(Debug, Clone, PartialEq)]
pub struct CreateClaimRequest {
    pub claim_type: ClaimType,
    pub agent_name: String,
    pub files: Vec<Attachment>,
}

impl CreateClaimRequest {
    pub fn new(claim_type: ClaimType, agent_name: impl Into<String>) -> Self {
        Self {
            claim_type,
            agent_name: agent_name.into(),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: Attachment) -> Self {
        self.files.push(file);
        self
    }
}

/// Record returned by the create endpoint.
///
/// Its shape is not guaranteed to match `Claim`, so it is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatedClaim(pub serde_json::Value);

impl CreatedClaim {
    /// Best-effort id lookup, at the top level or under `data`
    pub fn claim_id(&self) -> Option<ClaimId> {
        let lookup = |v: &serde_json::Value| v.get("claimID").and_then(|id| id.as_i64());
        lookup(&self.0)
            .or_else(|| self.0.get("data").and_then(lookup))
            .map(ClaimId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_claim_deserialize_full() {
        let json = r#"{
            "claimID": 42,
            "agent_name": "Jane Smith",
            "claim_type": "Home",
            "claimed_amount": 5000.5,
            "approved_amount": "4200.00",
            "documentation_complete": true,
            "status": "Approved",
            "decision": "<p>Covered</p>"
        }"#;

        let claim: Claim = serde_json::from_str(json).unwrap();
        assert_eq!(claim.claim_id, ClaimId(42));
        assert_eq!(claim.agent_name.as_deref(), Some("Jane Smith"));
        assert_eq!(claim.claimed_amount, Some(dec("5000.5")));
        assert_eq!(claim.approved_amount, Some(dec("4200.00")));
        assert_eq!(claim.documentation_complete, Some(true));
        assert!(claim.is_decided());
    }

    #[test]
    fn test_claim_deserialize_minimal() {
        let claim: Claim = serde_json::from_str(r#"{"claimID": 7}"#).unwrap();
        assert_eq!(claim, Claim::new(ClaimId(7)));
        assert!(!claim.is_decided());
        assert_eq!(claim.status_category(), StatusCategory::Other);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(StatusCategory::classify(Some("APPROVED")), StatusCategory::Approved);
        assert_eq!(StatusCategory::classify(Some("Pending")), StatusCategory::Pending);
        assert_eq!(StatusCategory::classify(Some("rejected")), StatusCategory::Rejected);
        assert_eq!(StatusCategory::classify(Some("In Review")), StatusCategory::Other);
        assert_eq!(StatusCategory::classify(Some("")), StatusCategory::Other);
        assert_eq!(StatusCategory::classify(None), StatusCategory::Other);
    }

    #[test]
    fn test_status_label_falls_back_to_claim_status() {
        let mut claim = Claim::new(ClaimId(1));
        claim.claim_status = Some("pending".to_string());
        assert_eq!(claim.status_label(), Some("pending"));
        assert_eq!(claim.status_category(), StatusCategory::Pending);

        claim.status = Some("Rejected".to_string());
        assert_eq!(claim.status_label(), Some("Rejected"));
        // classification leaves the record untouched
        assert_eq!(claim.status.as_deref(), Some("Rejected"));
    }

    #[test]
    fn test_claim_type_parse() {
        assert_eq!("auto".parse::<ClaimType>().unwrap(), ClaimType::Auto);
        assert_eq!("Commercial".parse::<ClaimType>().unwrap(), ClaimType::Commercial);
        assert!("Health".parse::<ClaimType>().is_err());
        assert!("".parse::<ClaimType>().is_err());
    }

    #[test]
    fn test_mime_type_for_path() {
        assert_eq!(mime_type_for_path(Path::new("a/report.PDF")), "application/pdf");
        assert_eq!(mime_type_for_path(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(mime_type_for_path(Path::new("photo.jpg")), "image/jpeg");
        assert_eq!(mime_type_for_path(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(mime_type_for_path(Path::new("README")), "application/octet-stream");
    }

    #[test]
    fn test_attachment_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let attachment = Attachment::from_path(&path).unwrap();
        assert_eq!(attachment.name, "scan.png");
        assert_eq!(attachment.size, 2048);
        assert_eq!(attachment.mime_type, "image/png");
        assert_eq!(attachment.display_size(), "0.00 MB");
    }

    #[test]
    fn test_display_size() {
        let attachment = Attachment::from_bytes("a.pdf", "application/pdf", vec![0u8; 1024 * 1024 * 3 / 2]);
        assert_eq!(attachment.display_size(), "1.50 MB");
    }

    #[test]
    fn test_created_claim_id() {
        let created = CreatedClaim(serde_json::json!({"claimID": 9, "message": "ok"}));
        assert_eq!(created.claim_id(), Some(ClaimId(9)));

        let nested = CreatedClaim(serde_json::json!({"data": {"claimID": 10}}));
        assert_eq!(nested.claim_id(), Some(ClaimId(10)));

        let opaque = CreatedClaim(serde_json::json!("created"));
        assert_eq!(opaque.claim_id(), None);
    }
}

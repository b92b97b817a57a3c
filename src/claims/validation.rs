//! Attachment Validation
//!
//! Size and MIME-type policy for claim attachments. The same `FilePolicy`
//! is applied when files are selected in the form and again right before a
//! create request is sent.

use serde::Serialize;
use std::fmt;

use super::types::Attachment;

/// Maximum attachment size (10 MB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// MIME types accepted for upload
pub const ALLOWED_FILE_TYPES: [&str; 5] = [
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
];

/// Why a file was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    TooLarge,
    InvalidType,
}

impl RejectReason {
    /// Stable reason code
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::TooLarge => "too-large",
            RejectReason::InvalidType => "invalid-type",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A refused file and the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRejection {
    pub file_name: String,
    pub mime_type: String,
    pub reason: RejectReason,
}

impl FileRejection {
    /// Human-readable message for this rejection
    pub fn message(&self) -> String {
        match self.reason {
            RejectReason::TooLarge => format!("{} is too large (max 10MB)", self.file_name),
            RejectReason::InvalidType => format!(
                "{} has invalid type {} (allowed: PDF, PNG, JPG, JPEG, GIF)",
                self.file_name, self.mime_type
            ),
        }
    }
}

impl fmt::Display for FileRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Upload policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePolicy {
    pub max_size: u64,
    pub allowed_types: Vec<String>,
}

impl Default for FilePolicy {
    fn default() -> Self {
        Self {
            max_size: MAX_FILE_SIZE,
            allowed_types: ALLOWED_FILE_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl FilePolicy {
    /// Check one file's metadata against the policy.
    ///
    /// Size is checked before type.
    pub fn check(&self, name: &str, size: u64, mime_type: &str) -> Result<(), FileRejection> {
        let reason = if size > self.max_size {
            Some(RejectReason::TooLarge)
        } else if !self.allows_type(mime_type) {
            Some(RejectReason::InvalidType)
        } else {
            None
        };

        match reason {
            Some(reason) => Err(FileRejection {
                file_name: name.to_string(),
                mime_type: mime_type.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Check an attachment against the policy
    pub fn validate(&self, file: &Attachment) -> Result<(), FileRejection> {
        self.check(&file.name, file.size, &file.mime_type)
    }

    /// Split a batch into accepted files and rejections, preserving order
    pub fn partition(&self, files: Vec<Attachment>) -> (Vec<Attachment>, Vec<FileRejection>) {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for file in files {
            match self.validate(&file) {
                Ok(()) => accepted.push(file),
                Err(rejection) => rejected.push(rejection),
            }
        }

        (accepted, rejected)
    }

    fn allows_type(&self, mime_type: &str) -> bool {
        let mime_type = mime_type.trim().to_lowercase();
        self.allowed_types.iter().any(|t| *t == mime_type)
    }
}

/// Join rejections into one summary message, or `None` if there are none
pub fn summarize_rejections(rejections: &[FileRejection]) -> Option<String> {
    if rejections.is_empty() {
        return None;
    }

    let reasons: Vec<String> = rejections.iter().map(FileRejection::message).collect();
    Some(format!("Some files were rejected: {}", reasons.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn file(name: &str, size: usize, mime: &str) -> Attachment {
        Attachment::from_bytes(name, mime, vec![0u8; size])
    }

    #[test]
    fn test_accepts_allowed_types() {
        let policy = FilePolicy::default();
        for mime in ALLOWED_FILE_TYPES {
            assert!(policy.check("doc", MB, mime).is_ok(), "{} should be allowed", mime);
        }
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let policy = FilePolicy::default();
        assert!(policy.check("edge.pdf", MAX_FILE_SIZE, "application/pdf").is_ok());

        let err = policy
            .check("over.pdf", MAX_FILE_SIZE + 1, "application/pdf")
            .unwrap_err();
        assert_eq!(err.reason, RejectReason::TooLarge);
    }

    #[test]
    fn test_oversized_rejected_regardless_of_type() {
        let policy = FilePolicy::default();
        for mime in ["application/pdf", "image/png", "text/plain", ""] {
            let err = policy.check("big", 12 * MB, mime).unwrap_err();
            assert_eq!(err.reason, RejectReason::TooLarge);
            assert_eq!(err.reason.code(), "too-large");
        }
    }

    #[test]
    fn test_foreign_type_rejected_regardless_of_size() {
        let policy = FilePolicy::default();
        for size in [0, 1, MB, MAX_FILE_SIZE] {
            let err = policy.check("notes.txt", size, "text/plain").unwrap_err();
            assert_eq!(err.reason, RejectReason::InvalidType);
            assert_eq!(err.reason.code(), "invalid-type");
        }
    }

    #[test]
    fn test_type_match_ignores_case() {
        let policy = FilePolicy::default();
        assert!(policy.check("a.PNG", 10, "IMAGE/PNG").is_ok());
    }

    #[test]
    fn test_partition_keeps_order() {
        let policy = FilePolicy::default();
        let (accepted, rejected) = policy.partition(vec![
            file("a.png", 10, "image/png"),
            file("b.exe", 10, "application/x-msdownload"),
            file("c.pdf", 10, "application/pdf"),
        ]);

        let names: Vec<&str> = accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "c.pdf"]);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].file_name, "b.exe");
    }

    #[test]
    fn test_summary_names_each_file() {
        let rejections = vec![
            FileRejection {
                file_name: "big.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
                reason: RejectReason::TooLarge,
            },
            FileRejection {
                file_name: "virus.exe".to_string(),
                mime_type: "application/x-msdownload".to_string(),
                reason: RejectReason::InvalidType,
            },
        ];

        let summary = summarize_rejections(&rejections).unwrap();
        assert_eq!(
            summary,
            "Some files were rejected: big.pdf is too large (max 10MB), \
             virus.exe has invalid type application/x-msdownload (allowed: PDF, PNG, JPG, JPEG, GIF)"
        );
        assert!(summarize_rejections(&[]).is_none());
    }
}

//! Claim Form View
//!
//! Collects a new claim (agent name, claim type, attachments) and drives
//! its submission.

use std::io::{self, Write};
use thiserror::Error;

use super::Route;
use crate::claims::{
    summarize_rejections, Attachment, ClaimStore, ClaimType, ClaimsError, ClaimsResult,
    CreateClaimRequest, CreatedClaim, FilePolicy, FileRejection, ValidationError,
};

/// Errors surfaced by form submission
#[derive(Error, Debug)]
pub enum FormError {
    #[error("A claim submission is already in progress")]
    SubmitInFlight,

    #[error(transparent)]
    Claims(#[from] ClaimsError),
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq)]
pub struct Submitted {
    pub created: CreatedClaim,
    /// Where the user goes next
    pub route: Route,
}

/// New-claim form state
#[derive(Debug, Default)]
pub struct ClaimFormView {
    agent_name: String,
    claim_type: Option<ClaimType>,
    files: Vec<Attachment>,
    error: Option<String>,
    submitting: bool,
}

impl ClaimFormView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_agent_name(&mut self, name: impl Into<String>) {
        self.agent_name = name.into();
    }

    pub fn set_claim_type(&mut self, claim_type: Option<ClaimType>) {
        self.claim_type = claim_type;
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn claim_type(&self) -> Option<ClaimType> {
        self.claim_type
    }

    /// Pending attachments, in selection order
    pub fn files(&self) -> &[Attachment] {
        &self.files
    }

    /// Message shown near the submit control
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Add a batch of selected files.
    ///
    /// Accepted files are appended to the current selection. Rejected files
    /// are left out and reported together in the form error.
    pub fn add_files(&mut self, policy: &FilePolicy, batch: Vec<Attachment>) -> Vec<FileRejection> {
        self.error = None;

        let (accepted, rejected) = policy.partition(batch);
        tracing::debug!(
            accepted = accepted.len(),
            rejected = rejected.len(),
            "Files selected"
        );

        self.files.extend(accepted);
        self.error = summarize_rejections(&rejected);
        rejected
    }

    /// Remove a pending file by index
    pub fn remove_file(&mut self, index: usize) -> Option<Attachment> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    /// Build the create request from the current field values
    pub fn build_request(&self) -> Result<CreateClaimRequest, ValidationError> {
        let agent_name = self.agent_name.trim();
        if agent_name.is_empty() {
            return Err(ValidationError::MissingAgentName);
        }
        let claim_type = self.claim_type.ok_or(ValidationError::MissingClaimType)?;

        Ok(CreateClaimRequest {
            claim_type,
            agent_name: agent_name.to_string(),
            files: self.files.clone(),
        })
    }

    /// Start a submission: mark the form in flight and return the request.
    ///
    /// Refused while another submission is in flight.
    pub fn begin_submit(&mut self) -> Result<CreateClaimRequest, FormError> {
        if self.submitting {
            return Err(FormError::SubmitInFlight);
        }

        let request = self.build_request().map_err(|e| {
            self.error = Some(e.to_string());
            FormError::Claims(e.into())
        })?;

        self.error = None;
        self.submitting = true;
        Ok(request)
    }

    /// Finish a submission with the create result.
    ///
    /// On failure the error message is kept verbatim and every field,
    /// including the file selection, is left as it was.
    pub fn finish_submit(&mut self, result: ClaimsResult<CreatedClaim>) -> Result<Submitted, FormError> {
        self.submitting = false;

        match result {
            Ok(created) => Ok(Submitted {
                created,
                route: Route::Claims,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Claim submission failed");
                self.error = Some(e.to_string());
                Err(FormError::Claims(e))
            }
        }
    }

    /// Validate, submit through the store and report where to navigate
    pub async fn submit(&mut self, store: &ClaimStore) -> Result<Submitted, FormError> {
        let request = self.begin_submit()?;
        let result = store.create(&request).await;
        self.finish_submit(result)
    }

    /// Write the pending selection and any error to `out`
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Agent name: {}", self.agent_name)?;
        writeln!(
            out,
            "Claim type: {}",
            self.claim_type.map(|t| t.as_str()).unwrap_or("(select a claim type)")
        )?;

        if !self.files.is_empty() {
            writeln!(out, "Selected files:")?;
            for (i, file) in self.files.iter().enumerate() {
                writeln!(out, "  [{}] {} ({})", i, file.name, file.display_size())?;
            }
        }

        if let Some(error) = &self.error {
            writeln!(out, "Error! {}", error)?;
        }

        if self.submitting {
            writeln!(out, "Submitting...")?;
        }

        Ok(())
    }
}

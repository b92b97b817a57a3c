//! Dashboard
//!
//! Headline claim counts computed from the cached claim list.

use serde::Serialize;
use std::io::{self, Write};

use crate::claims::{Claim, ClaimStore, ClaimsResult, StatusCategory};

/// Claim totals per status category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub other: usize,
}

impl DashboardSummary {
    pub fn from_claims(claims: &[Claim]) -> Self {
        let mut summary = Self {
            total: claims.len(),
            ..Self::default()
        };

        for claim in claims {
            match claim.status_category() {
                StatusCategory::Pending => summary.pending += 1,
                StatusCategory::Approved => summary.approved += 1,
                StatusCategory::Rejected => summary.rejected += 1,
                StatusCategory::Other => summary.other += 1,
            }
        }

        summary
    }

    pub async fn load(store: &ClaimStore) -> ClaimsResult<Self> {
        let claims = store.claims().await?;
        Ok(Self::from_claims(&claims))
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Insurance Claim Dashboard")?;
        writeln!(out, "  Total claims:    {}", self.total)?;
        writeln!(out, "  Pending claims:  {}", self.pending)?;
        writeln!(out, "  Approved claims: {}", self.approved)?;
        writeln!(out, "  Rejected claims: {}", self.rejected)?;
        Ok(())
    }
}

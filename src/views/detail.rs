//! Claim Detail View
//!
//! Full detail for one claim, fetched on open.

use rust_decimal::Decimal;
use std::io::{self, Write};

use super::status_badge;
use crate::claims::{Claim, ClaimId, ClaimStore, ClaimsError, ClaimsResult, StatusCategory};
use crate::narrative::{strip_controls, Narrative};

/// One detail record, reshaped for display
#[derive(Debug, Clone, PartialEq)]
pub struct DetailEntry {
    pub claim_id: ClaimId,
    pub agent_name: Option<String>,
    pub claim_type: Option<String>,
    pub policy_holder_name: Option<String>,
    pub policy_plan: Option<String>,
    pub incident_type: Option<String>,
    pub status_label: Option<String>,
    pub category: StatusCategory,
    pub claimed_amount: Option<Decimal>,
    /// `None` means no decision yet
    pub approved_amount: Option<Decimal>,
    pub documentation_complete: Option<bool>,
    pub narrative: Option<Narrative>,
}

impl DetailEntry {
    /// Reshape a claim; `summary` fills in fields the detail record lacks
    pub fn from_claim(claim: &Claim, summary: Option<&Claim>) -> Self {
        let narrative = claim
            .decision
            .as_deref()
            .map(Narrative::parse)
            .filter(|n| !n.is_empty());

        let clean = |field: Option<&String>| field.map(|s| strip_controls(s));

        Self {
            claim_id: claim.claim_id,
            agent_name: clean(
                claim
                    .agent_name
                    .as_ref()
                    .or_else(|| summary.and_then(|s| s.agent_name.as_ref())),
            ),
            claim_type: clean(
                claim
                    .claim_type
                    .as_ref()
                    .or_else(|| summary.and_then(|s| s.claim_type.as_ref())),
            ),
            policy_holder_name: clean(claim.policy_holder_name.as_ref()),
            policy_plan: clean(claim.policy_plan.as_ref()),
            incident_type: clean(claim.incident_type.as_ref()),
            status_label: claim.status_label().map(strip_controls),
            category: claim.status_category(),
            claimed_amount: claim.claimed_amount,
            approved_amount: claim.approved_amount,
            documentation_complete: claim.documentation_complete,
            narrative,
        }
    }

    /// "complete" / "incomplete", if the backend reported it
    pub fn documentation_label(&self) -> Option<&'static str> {
        self.documentation_complete
            .map(|complete| if complete { "complete" } else { "incomplete" })
    }
}

/// Detail view for a single claim
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimDetailView {
    claim_id: ClaimId,
    records: Vec<Claim>,
    entries: Vec<DetailEntry>,
}

impl ClaimDetailView {
    /// Fetch and open the detail for `id`.
    ///
    /// Fails with `MissingId` when no id is given; the view is not created.
    pub async fn open(
        store: &ClaimStore,
        id: Option<ClaimId>,
        summary: Option<&Claim>,
    ) -> ClaimsResult<Self> {
        let records = store.claim(id).await?;
        let claim_id = records
            .first()
            .map(|c| c.claim_id)
            .or(id)
            .ok_or(ClaimsError::MissingId)?;

        tracing::debug!(claim_id = %claim_id, records = records.len(), "Opened claim detail");

        Ok(Self::from_records(claim_id, &records, summary))
    }

    /// Build the view from already-fetched records
    pub fn from_records(claim_id: ClaimId, records: &[Claim], summary: Option<&Claim>) -> Self {
        Self {
            claim_id,
            records: records.to_vec(),
            entries: records
                .iter()
                .map(|c| DetailEntry::from_claim(c, summary))
                .collect(),
        }
    }

    pub fn claim_id(&self) -> ClaimId {
        self.claim_id
    }

    /// The records as fetched, before reshaping
    pub fn records(&self) -> &[Claim] {
        &self.records
    }

    pub fn entries(&self) -> &[DetailEntry] {
        &self.entries
    }

    /// Write the detail to `out`
    pub fn render<W: Write>(&self, out: &mut W, ansi: bool) -> io::Result<()> {
        if self.entries.is_empty() {
            writeln!(out, "No detail available for claim #{}.", self.claim_id)?;
            return Ok(());
        }

        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }

            writeln!(out, "Claim #{}", entry.claim_id)?;
            writeln!(out, "Agent: {}", entry.agent_name.as_deref().unwrap_or("-"))?;

            if let Some(claim_type) = &entry.claim_type {
                writeln!(out, "Type: {}", claim_type)?;
            }
            if let Some(holder) = &entry.policy_holder_name {
                writeln!(out, "Policy holder: {}", holder)?;
            }
            if let Some(plan) = &entry.policy_plan {
                writeln!(out, "Policy plan: {}", plan)?;
            }
            if let Some(incident) = &entry.incident_type {
                writeln!(out, "Incident: {}", incident)?;
            }

            writeln!(
                out,
                "Status: {} ({})",
                status_badge(entry.status_label.as_deref(), ansi),
                entry.category
            )?;

            if let Some(claimed) = entry.claimed_amount {
                writeln!(out, "Claimed amount: {}", format_amount(claimed))?;
            }
            match entry.approved_amount {
                Some(approved) => writeln!(out, "Approved amount: {}", format_amount(approved))?,
                None => writeln!(out, "Approved amount: not yet decided")?,
            }

            if let Some(label) = entry.documentation_label() {
                writeln!(out, "Documentation: {}", label)?;
            }

            if let Some(narrative) = &entry.narrative {
                writeln!(out)?;
                writeln!(out, "Decision:")?;
                for line in narrative.to_terminal(ansi).lines() {
                    writeln!(out, "  {}", line)?;
                }
            }
        }

        Ok(())
    }

    /// Render to a string
    pub fn render_to_string(&self, ansi: bool) -> String {
        let mut buf = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.render(&mut buf, ansi);
        String::from_utf8_lossy(&buf).to_string()
    }
}

/// Currency amount with two decimals
pub fn format_amount(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::testing::FakeTransport;
    use std::sync::Arc;
    use std::time::Duration;

    fn decided_claim() -> Claim {
        let mut claim = Claim::new(ClaimId(3));
        claim.agent_name = Some("Cid".to_string());
        claim.claim_type = Some("Home".to_string());
        claim.status = Some("Approved".to_string());
        claim.claimed_amount = Some(Decimal::new(500000, 2));
        claim.approved_amount = Some(Decimal::new(4200, 0));
        claim.documentation_complete = Some(true);
        claim.decision = Some("<p>Covered under <b>section 4</b>.</p>".to_string());
        claim
    }

    fn store(claims: Vec<Claim>) -> (Arc<FakeTransport>, ClaimStore) {
        let transport = Arc::new(FakeTransport::with_claims(claims));
        let store = ClaimStore::new(Arc::clone(&transport) as _, Duration::ZERO);
        (transport, store)
    }

    #[tokio::test]
    async fn test_open_without_id_fails() {
        let (transport, store) = store(vec![decided_claim()]);
        let result = ClaimDetailView::open(&store, None, None).await;
        assert!(matches!(result, Err(ClaimsError::MissingId)));
        assert_eq!(transport.detail_calls(), 0);
    }

    #[tokio::test]
    async fn test_render_decided_claim() {
        let (_, store) = store(vec![decided_claim()]);
        let view = ClaimDetailView::open(&store, Some(ClaimId(3)), None).await.unwrap();

        assert_eq!(view.records(), &[decided_claim()]);

        let text = view.render_to_string(false);
        assert!(text.contains("Claim #3"));
        assert!(text.contains("Agent: Cid"));
        assert!(text.contains("Status: Approved (approved)"));
        assert!(text.contains("Claimed amount: $5000.00"));
        assert!(text.contains("Approved amount: $4200.00"));
        assert!(text.contains("Documentation: complete"));
        assert!(text.contains("Decision:\n  Covered under section 4."));
    }

    #[tokio::test]
    async fn test_undecided_claim_is_not_zero() {
        let mut claim = Claim::new(ClaimId(8));
        claim.documentation_complete = Some(false);
        let (_, store) = store(vec![claim]);

        let view = ClaimDetailView::open(&store, Some(ClaimId(8)), None).await.unwrap();
        let text = view.render_to_string(false);
        assert!(text.contains("Approved amount: not yet decided"));
        assert!(!text.contains("$0"));
        assert!(text.contains("Documentation: incomplete"));
        assert!(!text.contains("Decision:"));
    }

    #[tokio::test]
    async fn test_nonexistent_id_renders_empty() {
        let (_, store) = store(vec![decided_claim()]);
        let view = ClaimDetailView::open(&store, Some(ClaimId(999)), None).await.unwrap();

        assert!(view.entries().is_empty());
        let text = view.render_to_string(false);
        assert_eq!(text, "No detail available for claim #999.\n");
        assert!(!text.contains("amount"));
        assert!(!text.contains("Decision"));
    }

    #[tokio::test]
    async fn test_detail_render_is_idempotent() {
        let (transport, store) = store(vec![decided_claim()]);

        let first = ClaimDetailView::open(&store, Some(ClaimId(3)), None).await.unwrap();
        let second = ClaimDetailView::open(&store, Some(ClaimId(3)), None).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.render_to_string(true), second.render_to_string(true));
        assert_eq!(transport.detail_calls(), 2);
    }

    #[test]
    fn test_summary_fills_missing_agent() {
        let mut summary = Claim::new(ClaimId(4));
        summary.agent_name = Some("From list".to_string());

        let entry = DetailEntry::from_claim(&Claim::new(ClaimId(4)), Some(&summary));
        assert_eq!(entry.agent_name.as_deref(), Some("From list"));
        assert_eq!(entry.documentation_label(), None);
    }

    #[test]
    fn test_fields_lose_control_characters() {
        let mut claim = Claim::new(ClaimId(5));
        claim.agent_name = Some("Eve\u{1b}]0;owned\u{7}".to_string());
        claim.policy_holder_name = Some("Holder\u{1b}[2J".to_string());
        claim.incident_type = Some("Theft\u{9b}".to_string());

        let view = ClaimDetailView::from_records(ClaimId(5), &[claim], None);
        let text = view.render_to_string(false);
        assert!(!text.chars().any(|c| c.is_control() && c != '\n'));
        assert!(text.contains("Agent: Eve]0;owned"));
        assert!(text.contains("Policy holder: Holder[2J"));
        assert!(text.contains("Incident: Theft\n"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(12345, 1)), "$1234.50");
        assert_eq!(format_amount(Decimal::new(7, 0)), "$7.00");
    }
}

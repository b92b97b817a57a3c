//! Claim List View
//!
//! Claim table in the order the transport returned it (newest first), with
//! at most one active claim whose detail is open.

use std::io::{self, Write};

use super::{status_badge, ClaimDetailView, LoadState};
use crate::claims::{Claim, ClaimId, ClaimStore, ClaimsResult, StatusCategory};
use crate::narrative::strip_controls;

/// One table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub claim_id: ClaimId,
    pub claim_type: String,
    pub agent_name: String,
    pub status: String,
    pub category: StatusCategory,
}

impl From<&Claim> for ListRow {
    fn from(claim: &Claim) -> Self {
        Self {
            claim_id: claim.claim_id,
            claim_type: strip_controls(claim.claim_type.as_deref().unwrap_or_default()),
            agent_name: strip_controls(claim.agent_name.as_deref().unwrap_or_default()),
            status: strip_controls(claim.status_label().unwrap_or_default()),
            category: claim.status_category(),
        }
    }
}

/// The claims page: table plus the currently open detail
#[derive(Debug, Default)]
pub struct ClaimListView {
    claims: Vec<Claim>,
    state: LoadState,
    active: Option<ClaimId>,
    detail: Option<ClaimDetailView>,
}

impl ClaimListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or reload) the claim collection through the store's cache
    pub async fn load(&mut self, store: &ClaimStore) -> ClaimsResult<()> {
        self.state = LoadState::Loading;

        match store.claims().await {
            Ok(claims) => {
                self.claims = claims;
                self.state = LoadState::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Claim list unavailable");
                self.state = LoadState::Failed(e.user_message());
                Err(e)
            }
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Clear a load error without touching the loaded claims
    pub fn dismiss_error(&mut self) {
        if self.state.error().is_some() {
            self.state = LoadState::Idle;
        }
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Table rows in transport order
    pub fn rows(&self) -> Vec<ListRow> {
        self.claims.iter().map(ListRow::from).collect()
    }

    /// The active claim, if any
    pub fn active(&self) -> Option<ClaimId> {
        self.active
    }

    /// The open detail view, if any
    pub fn detail(&self) -> Option<&ClaimDetailView> {
        self.detail.as_ref()
    }

    /// Make `id` the active claim and open its detail.
    ///
    /// Replaces any previous selection. Returns `Ok(false)` if `id` is not a
    /// row of this view. A failed fetch leaves nothing selected and puts the
    /// view in a dismissible error state.
    pub async fn select(&mut self, store: &ClaimStore, id: ClaimId) -> ClaimsResult<bool> {
        let Some(summary) = self.claims.iter().find(|c| c.claim_id == id).cloned() else {
            tracing::debug!(claim_id = %id, "Selected claim is not in the list");
            return Ok(false);
        };

        self.active = Some(id);
        self.detail = None;

        match ClaimDetailView::open(store, self.active, Some(&summary)).await {
            Ok(detail) => {
                self.detail = Some(detail);
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(claim_id = %id, error = %e, "Claim detail unavailable");
                self.active = None;
                self.state = LoadState::Failed(e.user_message());
                Err(e)
            }
        }
    }

    /// Close the detail and clear the active selection
    pub fn close_detail(&mut self) {
        self.active = None;
        self.detail = None;
    }

    /// Write the claim table to `out`
    pub fn render<W: Write>(&self, out: &mut W, ansi: bool) -> io::Result<()> {
        if let Some(message) = self.state.error() {
            writeln!(out, "Error! {}", message)?;
            return Ok(());
        }

        if self.claims.is_empty() {
            writeln!(out, "No claims found.")?;
            return Ok(());
        }

        writeln!(
            out,
            "{:<10} {:<12} {:<24} {}",
            "CLAIM ID", "CLAIM TYPE", "AGENT NAME", "STATUS"
        )?;

        for row in self.rows() {
            let marker = if self.active == Some(row.claim_id) { ">" } else { " " };
            writeln!(
                out,
                "{}{:<9} {:<12} {:<24} {}",
                marker,
                row.claim_id,
                truncate(&row.claim_type, 12),
                truncate(&row.agent_name, 24),
                status_badge(Some(row.status.as_str()).filter(|s| !s.is_empty()), ansi)
            )?;
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

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::testing::FakeTransport;
    use std::sync::Arc;
    use std::time::Duration;

    fn store_with(transport: &Arc<FakeTransport>) -> ClaimStore {
        ClaimStore::new(Arc::clone(transport) as _, Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_renders_newest_first() {
        let transport = Arc::new(FakeTransport::with_ids(&[1, 2, 3]));
        let store = store_with(&transport);
        let mut view = ClaimListView::new();

        view.load(&store).await.unwrap();
        let ids: Vec<i64> = view.rows().iter().map(|r| r.claim_id.0).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let text = view.render_to_string(false);
        let pos = |needle: &str| text.find(needle).unwrap();
        assert!(pos("Agent 3") < pos("Agent 2"));
        assert!(pos("Agent 2") < pos("Agent 1"));
    }

    #[tokio::test]
    async fn test_order_is_strictly_descending_for_shuffled_input() {
        let transport = Arc::new(FakeTransport::with_ids(&[5, 17, 2, 9, 11, 1]));
        let store = store_with(&transport);
        let mut view = ClaimListView::new();

        view.load(&store).await.unwrap();
        let rows = view.rows();
        assert!(rows.windows(2).all(|w| w[0].claim_id > w[1].claim_id));
    }

    #[tokio::test]
    async fn test_view_does_not_resort() {
        // transport order is kept as-is, even if it were not sorted
        let mut view = ClaimListView::new();
        view.claims = vec![Claim::new(ClaimId(1)), Claim::new(ClaimId(2))];
        let ids: Vec<i64> = view.rows().iter().map(|r| r.claim_id.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_selection_replaces_previous() {
        let transport = Arc::new(FakeTransport::with_ids(&[1, 2, 3]));
        let store = store_with(&transport);
        let mut view = ClaimListView::new();
        view.load(&store).await.unwrap();

        assert!(view.select(&store, ClaimId(2)).await.unwrap());
        assert_eq!(view.active(), Some(ClaimId(2)));
        assert_eq!(view.detail().unwrap().claim_id(), ClaimId(2));

        assert!(view.select(&store, ClaimId(3)).await.unwrap());
        assert_eq!(view.active(), Some(ClaimId(3)));
        assert_eq!(view.detail().unwrap().claim_id(), ClaimId(3));

        let text = view.render_to_string(false);
        assert!(text.contains(">3"));
        assert!(!text.contains(">2"));
    }

    #[tokio::test]
    async fn test_select_unknown_row() {
        let transport = Arc::new(FakeTransport::with_ids(&[1]));
        let store = store_with(&transport);
        let mut view = ClaimListView::new();
        view.load(&store).await.unwrap();

        assert!(!view.select(&store, ClaimId(42)).await.unwrap());
        assert_eq!(view.active(), None);
        assert_eq!(transport.detail_calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_detail_shows_error_and_clears_selection() {
        let transport = Arc::new(FakeTransport::with_ids(&[1, 2]));
        let store = store_with(&transport);
        let mut view = ClaimListView::new();
        view.load(&store).await.unwrap();
        view.select(&store, ClaimId(2)).await.unwrap();

        transport.fail_details(true);
        assert!(view.select(&store, ClaimId(1)).await.is_err());

        assert_eq!(view.active(), None);
        assert!(view.detail().is_none());
        let text = view.render_to_string(false);
        assert!(text.starts_with("Error! Something went wrong"));
        assert!(!text.contains(">1"));

        view.dismiss_error();
        assert_eq!(view.state(), &LoadState::Idle);
        assert_eq!(view.rows().len(), 2);
        assert!(!view.render_to_string(false).contains('>'));
    }

    #[tokio::test]
    async fn test_close_detail_clears_selection() {
        let transport = Arc::new(FakeTransport::with_ids(&[1, 2]));
        let store = store_with(&transport);
        let mut view = ClaimListView::new();
        view.load(&store).await.unwrap();

        view.select(&store, ClaimId(1)).await.unwrap();
        let before = view.claims().to_vec();
        view.close_detail();

        assert_eq!(view.active(), None);
        assert!(view.detail().is_none());
        assert_eq!(view.claims(), before.as_slice());
    }

    #[tokio::test]
    async fn test_load_failure_is_dismissible() {
        let transport = Arc::new(FakeTransport::with_ids(&[1]));
        transport.fail_lists(true);
        let store = store_with(&transport);
        let mut view = ClaimListView::new();

        assert!(view.load(&store).await.is_err());
        let text = view.render_to_string(false);
        assert!(text.starts_with("Error! Something went wrong"));

        view.dismiss_error();
        assert_eq!(view.state(), &LoadState::Idle);
    }

    #[tokio::test]
    async fn test_classification_leaves_records_untouched() {
        let mut claim = Claim::new(ClaimId(1));
        claim.status = Some("APPROVED".to_string());
        let transport = Arc::new(FakeTransport::with_claims(vec![claim.clone()]));
        let store = store_with(&transport);
        let mut view = ClaimListView::new();
        view.load(&store).await.unwrap();

        assert_eq!(view.rows()[0].category, StatusCategory::Approved);
        assert_eq!(view.rows()[0].status, "APPROVED");
        assert_eq!(view.claims()[0], claim);
    }

    #[tokio::test]
    async fn test_rows_lose_control_characters() {
        let mut claim = Claim::new(ClaimId(1));
        claim.agent_name = Some("Mallory\u{1b}[2J".to_string());
        claim.status = Some("\u{1b}]0;x\u{7}Approved".to_string());
        let transport = Arc::new(FakeTransport::with_claims(vec![claim]));
        let store = store_with(&transport);
        let mut view = ClaimListView::new();
        view.load(&store).await.unwrap();

        let row = &view.rows()[0];
        assert_eq!(row.agent_name, "Mallory[2J");
        assert_eq!(row.status, "]0;xApproved");

        let text = view.render_to_string(false);
        assert!(!text.chars().any(|c| c.is_control() && c != '\n'));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long agent name", 8), "a very …");
    }
}

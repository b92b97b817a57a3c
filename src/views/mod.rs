//! Views
//!
//! Terminal renditions of the dashboard screens. Each view owns its
//! presentation state (loading flags, selection, pending form input) and
//! talks to the remote API only through the `ClaimStore`.
//!
//! - [`ClaimListView`]: claim table with single-row selection
//! - [`ClaimDetailView`]: one claim with its decision narrative
//! - [`ClaimFormView`]: new-claim input and submission
//! - [`DashboardSummary`]: headline counts

mod dashboard;
mod detail;
mod form;
mod list;

pub use dashboard::DashboardSummary;
pub use detail::{ClaimDetailView, DetailEntry};
pub use form::{ClaimFormView, FormError, Submitted};
pub use list::{ClaimListView, ListRow};

use crate::claims::StatusCategory;
use crate::narrative::strip_controls;

/// Screens the user can navigate between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Claims,
    NewClaim,
}

/// Fetch state of a view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Dismissible error message
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Status badge text, colored by category when `ansi` is set
pub fn status_badge(label: Option<&str>, ansi: bool) -> String {
    let category = StatusCategory::classify(label);
    let text = strip_controls(label.unwrap_or(""));

    if !ansi {
        return text;
    }

    let color = match category {
        StatusCategory::Approved => "32",
        StatusCategory::Pending => "33",
        StatusCategory::Rejected => "31",
        StatusCategory::Other => "90",
    };
    format!("\x1b[{}m{}\x1b[0m", color, text)
}

//! # Claim Desk
//!
//! Terminal client for an insurance-claims API: a dashboard of claim counts,
//! a newest-first claim list with per-claim detail, and a form for filing
//! new claims with attachments.
//!
//! ## Modules
//!
//! - [`claims`]: Claim model, upload policy, HTTP transport and cached store
//! - [`cache`]: Keyed query cache with staleness and invalidation
//! - [`narrative`]: Sanitizer for the HTML decision narrative
//! - [`views`]: Dashboard, list, detail and form views
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use claimdesk::claims::{ClaimStore, HttpClaimTransport, TransportConfig};
//! use claimdesk::views::ClaimListView;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpClaimTransport::new(TransportConfig::default())?;
//!     let store = ClaimStore::new(Arc::new(transport), Duration::from_secs(300));
//!
//!     let mut list = ClaimListView::new();
//!     list.load(&store).await?;
//!     print!("{}", list.render_to_string(false));
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod claims;
pub mod config;
pub mod narrative;
pub mod views;

// Re-export top-level types for convenience
pub use claims::{
    Attachment, Claim, ClaimId, ClaimStore, ClaimTransport, ClaimType, ClaimsError,
    ClaimsResult, CreateClaimRequest, CreatedClaim, FilePolicy, FileRejection,
    HttpClaimTransport, StatusCategory, TransportConfig, TransportError, ValidationError,
};

pub use cache::{QueryCache, QueryKey};

pub use narrative::Narrative;

pub use views::{
    ClaimDetailView, ClaimFormView, ClaimListView, DashboardSummary, FormError, LoadState,
    Route, Submitted,
};

pub use config::{ApiConfig, CacheConfig, Config, ConfigError, LoggingConfig};

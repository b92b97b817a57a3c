//! Claims
//!
//! Everything between the views and the remote claims API.
//!
//! ## Architecture
//!
//! - **Transport**: REST client for the claims API (list, detail, create)
//! - **Validation**: upload policy for attachments
//! - **Store**: cached reads and cache invalidation after creates
//!
//! ## Data Flow
//!
//! 1. Views ask the `ClaimStore` for claims
//! 2. The store serves fresh cache entries or calls the transport
//! 3. Creates are validated against the `FilePolicy` before any request
//! 4. A successful create invalidates the cached claim list

mod error;
mod store;
mod transport;
mod types;
mod validation;

pub use error::{ClaimsError, ClaimsResult, TransportError, ValidationError};
pub use store::ClaimStore;
pub use transport::{
    sort_newest_first, validate_request, ClaimTransport, HttpClaimTransport, TransportConfig,
};
pub use types::{
    mime_type_for_path, Attachment, AttachmentSource, Claim, ClaimId, ClaimType,
    CreateClaimRequest, CreatedClaim, StatusCategory,
};
pub use validation::{
    summarize_rejections, FilePolicy, FileRejection, RejectReason, ALLOWED_FILE_TYPES,
    MAX_FILE_SIZE,
};

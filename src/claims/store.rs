//! Claim Store
//!
//! Cached access to the claims transport. List and detail reads go through
//! the query cache; a successful create invalidates the claim list so the
//! next list view refetches.

use std::sync::Arc;

use super::error::{ClaimsError, ClaimsResult};
use super::transport::{validate_request, ClaimTransport};
use super::types::{Claim, ClaimId, CreateClaimRequest, CreatedClaim};
use super::validation::FilePolicy;
use crate::cache::{QueryCache, QueryKey};

/// Cached claims access shared by all views
pub struct ClaimStore {
    transport: Arc<dyn ClaimTransport>,
    cache: QueryCache<Vec<Claim>>,
    policy: FilePolicy,
}

impl ClaimStore {
    /// Create a store over a transport; cached results expire after `stale_after`
    pub fn new(transport: Arc<dyn ClaimTransport>, stale_after: std::time::Duration) -> Self {
        Self {
            transport,
            cache: QueryCache::new(stale_after),
            policy: FilePolicy::default(),
        }
    }

    /// Upload policy applied at selection time and before submission
    pub fn policy(&self) -> &FilePolicy {
        &self.policy
    }

    /// The underlying cache
    pub fn cache(&self) -> &QueryCache<Vec<Claim>> {
        &self.cache
    }

    /// All claims, newest first
    pub async fn claims(&self) -> ClaimsResult<Vec<Claim>> {
        if let Some(claims) = self.cache.get_fresh(&QueryKey::Claims).await {
            tracing::debug!(key = %QueryKey::Claims, "Cache hit");
            return Ok(claims);
        }

        let claims = self.transport.list_claims().await?;
        self.cache.put(QueryKey::Claims, claims.clone()).await;
        Ok(claims)
    }

    /// Detail records for one claim
    pub async fn claim(&self, id: Option<ClaimId>) -> ClaimsResult<Vec<Claim>> {
        let id = id.ok_or(ClaimsError::MissingId)?;
        let key = QueryKey::Claim(id);

        if let Some(claims) = self.cache.get_fresh(&key).await {
            tracing::debug!(key = %key, "Cache hit");
            return Ok(claims);
        }

        let claims = self.transport.get_claim(Some(id)).await?;
        self.cache.put(key, claims.clone()).await;
        Ok(claims)
    }

    /// File a claim and invalidate the cached list on success
    pub async fn create(&self, request: &CreateClaimRequest) -> ClaimsResult<CreatedClaim> {
        validate_request(&self.policy, request)?;

        let created = self.transport.create_claim(request).await?;
        self.cache.invalidate(&QueryKey::Claims).await;
        Ok(created)
    }
}

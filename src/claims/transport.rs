//! Claims REST API Client
//!
//! HTTP transport for the remote claims API: list, fetch-by-id and create.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::Instrument;
use uuid::Uuid;

use super::error::{ClaimsError, ClaimsResult, TransportError, ValidationError};
use super::types::{Claim, ClaimId, CreateClaimRequest, CreatedClaim};
use super::validation::FilePolicy;

/// Operations the views need from the claims backend
#[async_trait]
pub trait ClaimTransport: Send + Sync {
    /// All claims, newest first by `claimID`
    async fn list_claims(&self) -> ClaimsResult<Vec<Claim>>;

    /// Detail records for one claim. Fails with `MissingId` when `id` is
    /// `None`; no request is sent in that case.
    async fn get_claim(&self, id: Option<ClaimId>) -> ClaimsResult<Vec<Claim>>;

    /// File a new claim. Attachments are validated before anything is sent.
    async fn create_claim(&self, request: &CreateClaimRequest) -> ClaimsResult<CreatedClaim>;
}

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL of the API (e.g., "https://example.execute-api.us-west-2.amazonaws.com")
    pub base_url: String,
    /// Resource path segment shared by all endpoints
    pub resource: String,
    /// Endpoint under the resource that accepts new claims
    pub create_endpoint: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "https://0t6kyenjua.execute-api.us-west-2.amazonaws.com".to_string(),
            resource: "team5".to_string(),
            create_endpoint: "team5-resource".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl From<&crate::config::ApiConfig> for TransportConfig {
    fn from(api: &crate::config::ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            resource: api.resource.clone(),
            create_endpoint: api.create_endpoint.clone(),
            request_timeout_ms: api.request_timeout_secs * 1000,
        }
    }
}

/// reqwest-backed transport
pub struct HttpClaimTransport {
    client: Client,
    config: TransportConfig,
    policy: FilePolicy,
}

impl HttpClaimTransport {
    /// Create a new transport with the given configuration
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            config,
            policy: FilePolicy::default(),
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn list_url(&self) -> String {
        format!(
            "{}/{}/getallclaim",
            self.config.base_url.trim_end_matches('/'),
            self.config.resource
        )
    }

    fn create_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.resource,
            self.config.create_endpoint
        )
    }

    /// GET the list endpoint, optionally filtered to one id
    async fn fetch_claims(&self, id: Option<ClaimId>) -> Result<Vec<Claim>, TransportError> {
        let mut request = self.client.get(self.list_url());
        if let Some(id) = id {
            request = request.query(&[("claimID", id.0)]);
        }

        let response = request.send().await.map_err(TransportError::from_send)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let envelope: ClaimEnvelope = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        Ok(envelope.data)
    }

    /// Build the multipart body for a create request.
    ///
    /// Each file is checked again against the policy using the bytes
    /// actually read, since a file on disk may have changed since selection.
    async fn build_form(&self, request: &CreateClaimRequest) -> ClaimsResult<Form> {
        let mut form = Form::new()
            .text("agent_name", request.agent_name.clone())
            .text("claim_type", request.claim_type.as_str().to_string());

        for file in &request.files {
            let bytes = file
                .read_bytes()
                .await
                .map_err(|e| TransportError::Attachment {
                    name: file.name.clone(),
                    error: e.to_string(),
                })?;

            self.policy
                .check(&file.name, bytes.len() as u64, &file.mime_type)
                .map_err(|rejection| ValidationError::Files(vec![rejection]))?;

            let part = Part::bytes(bytes)
                .file_name(file.name.clone())
                .mime_str(&file.mime_type)
                .map_err(TransportError::from)?;
            form = form.part("files", part);
        }

        Ok(form)
    }

    async fn send_create(&self, request: &CreateClaimRequest) -> ClaimsResult<CreatedClaim> {
        let form = self.build_form(request).await?;

        let response = self
            .client
            .post(self.create_url())
            .multipart(form)
            .send()
            .await
            .map_err(TransportError::from_send)?;

        let status = response.status();
        let text = response.text().await.map_err(TransportError::Request)?;

        if !status.is_success() {
            return Err(TransportError::ApiError {
                status: status.as_u16(),
                message: text,
            }
            .into());
        }

        // The create response is not guaranteed to be JSON; keep it either way
        let body: serde_json::Value =
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
        Ok(CreatedClaim(body))
    }
}

/// Check a create request before it is sent
pub fn validate_request(policy: &FilePolicy, request: &CreateClaimRequest) -> Result<(), ValidationError> {
    if request.agent_name.trim().is_empty() {
        return Err(ValidationError::MissingAgentName);
    }

    let rejections: Vec<_> = request
        .files
        .iter()
        .filter_map(|f| policy.validate(f).err())
        .collect();

    if rejections.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Files(rejections))
    }
}

/// Sort claims newest first by `claimID`
pub fn sort_newest_first(claims: &mut [Claim]) {
    claims.sort_by(|a, b| b.claim_id.cmp(&a.claim_id));
}

#[async_trait]
impl ClaimTransport for HttpClaimTransport {
    async fn list_claims(&self) -> ClaimsResult<Vec<Claim>> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("list_claims", %request_id, url = %self.list_url());

        async {
            let mut claims = self.fetch_claims(None).await.map_err(|e| {
                tracing::error!(error = %e, "Error getting claims");
                e
            })?;
            sort_newest_first(&mut claims);
            tracing::debug!(count = claims.len(), "Fetched claims");
            Ok::<_, ClaimsError>(claims)
        }
        .instrument(span)
        .await
    }

    async fn get_claim(&self, id: Option<ClaimId>) -> ClaimsResult<Vec<Claim>> {
        let id = id.ok_or_else(|| {
            tracing::error!("Claim detail requested without an id");
            ClaimsError::MissingId
        })?;

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("get_claim", %request_id, claim_id = %id);

        async {
            let claims = self.fetch_claims(Some(id)).await.map_err(|e| {
                tracing::error!(error = %e, "Error getting claim");
                e
            })?;
            tracing::debug!(count = claims.len(), "Fetched claim detail");
            Ok::<_, ClaimsError>(claims)
        }
        .instrument(span)
        .await
    }

    async fn create_claim(&self, request: &CreateClaimRequest) -> ClaimsResult<CreatedClaim> {
        validate_request(&self.policy, request).map_err(|e| {
            tracing::warn!(error = %e, "Claim rejected before submission");
            e
        })?;

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "create_claim",
            %request_id,
            claim_type = %request.claim_type,
            files = request.files.len()
        );

        async {
            let created = self.send_create(request).await.map_err(|e| {
                tracing::error!(error = %e, "Error creating claim");
                e
            })?;
            tracing::info!(claim_id = ?created.claim_id(), "Claim created");
            Ok::<_, ClaimsError>(created)
        }
        .instrument(span)
        .await
    }
}

// ============================================
// Response DTOs
// ============================================

#[derive(Debug, Deserialize)]
struct ClaimEnvelope {
    #[serde(default)]
    data: Vec<Claim>,
}

//! Client API trait for Marketo integrations
//!
//! Downstream code depends on this trait rather than on the concrete REST
//! client, so tests can swap in the in-memory mock.

use async_trait::async_trait;
use marketo_api_contract::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientApiError {
    #[error("server error: {0}")]
    Server(String),
    #[error("unexpected: {0}")]
    Unexpected(String),
}

pub type ClientApiResult<T> = Result<T, ClientApiError>;

#[async_trait]
pub trait MarketoApi: Send + Sync {
    /// Look up the vendor-assigned id for the lead matching `email`.
    async fn lookup_lead_id(&self, email: &str) -> ClientApiResult<LeadId>;

    /// Run the add/update/remove lead workflow, including list membership.
    async fn sync_lead(&self, request: &SyncLead) -> ClientApiResult<SyncOutcome>;

    /// Trigger the configured email campaign for the lead matching the
    /// request's email, returning a human-readable confirmation.
    async fn send_email(&self, request: &SendEmail) -> ClientApiResult<String>;

    /// Associate a lead with a Munchkin tracking cookie.
    async fn associate_lead_with_cookie(
        &self,
        lead_id: LeadId,
        cookie: &str,
    ) -> ClientApiResult<()>;
}

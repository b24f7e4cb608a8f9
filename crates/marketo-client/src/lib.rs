//! REST API client for the Marketo marketing-automation service
//!
//! This crate wraps the vendor's OAuth and REST endpoints: lead
//! create/update/delete, static list membership, email-campaign
//! triggering, and cookie association. Authentication uses the
//! client-credentials grant with an in-memory cached bearer token that is
//! refreshed implicitly before authenticated calls.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod workflows;

pub use auth::*;
pub use client::*;
pub use config::*;
pub use error::*;

use async_trait::async_trait;
use marketo_api_contract::*;
use marketo_client_api::{ClientApiError, ClientApiResult, MarketoApi};

/// Failures raised before a request is sent are the caller's problem, not
/// the server's.
fn client_api_error(err: error::MarketoError) -> ClientApiError {
    match &err {
        error::MarketoError::Invalid(_) | error::MarketoError::UnknownCampaign { .. } => {
            ClientApiError::Unexpected(err.to_string())
        }
        _ => ClientApiError::Server(err.to_string()),
    }
}

#[async_trait]
impl MarketoApi for client::MarketoClient {
    async fn lookup_lead_id(&self, email: &str) -> ClientApiResult<LeadId> {
        self.get_lead_id_by_email(email).await.map_err(client_api_error)
    }

    async fn sync_lead(&self, request: &SyncLead) -> ClientApiResult<SyncOutcome> {
        self.sync_lead(request).await.map_err(client_api_error)
    }

    async fn send_email(&self, request: &SendEmail) -> ClientApiResult<String> {
        self.send_email(request).await.map_err(client_api_error)
    }

    async fn associate_lead_with_cookie(
        &self,
        lead_id: LeadId,
        cookie: &str,
    ) -> ClientApiResult<()> {
        self.associate_lead_with_cookie(lead_id, cookie)
            .await
            .map_err(client_api_error)
    }
}

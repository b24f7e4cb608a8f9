//! Main Marketo REST client implementation

use std::sync::Arc;

use marketo_api_contract::*;
use reqwest::{Client as HttpClient, Method, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use validator::Validate;

use crate::auth::TokenSource;
use crate::config::MarketoConfig;
use crate::error::{MarketoError, MarketoResult};

/// REST API client for the Marketo marketing-automation service
///
/// Every operation is a single authenticated HTTP request; the bearer
/// token is fetched and cached by the shared [`TokenSource`]. Cloning the
/// client is cheap and clones share the token.
#[derive(Debug, Clone)]
pub struct MarketoClient {
    http_client: HttpClient,
    base_url: Url,
    config: Arc<MarketoConfig>,
    tokens: Arc<TokenSource>,
}

impl MarketoClient {
    /// Create a new client from configuration.
    pub fn new(config: MarketoConfig) -> MarketoResult<Self> {
        let http_client = HttpClient::builder().user_agent("marketo-client/0.1").build()?;
        let base_url = config.base_url()?;
        let tokens = TokenSource::new(
            http_client.clone(),
            &base_url,
            config.client_id.clone(),
            config.client_secret.clone(),
        )?;

        Ok(Self {
            http_client,
            base_url,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
        })
    }

    /// Create a client and verify the credentials with an eager token
    /// fetch, so bad credentials surface at startup rather than on the
    /// first operation.
    pub async fn connect(config: MarketoConfig) -> MarketoResult<Self> {
        let client = Self::new(config)?;
        client.tokens.bearer_token().await?;
        Ok(client)
    }

    /// Get the client configuration
    pub fn config(&self) -> &MarketoConfig {
        &self.config
    }

    /// Get the instance base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Look up a lead id by email address.
    ///
    /// A query that matches no lead is an error; list removal and campaign
    /// triggering both require an existing lead.
    pub async fn get_lead_id_by_email(&self, email: &str) -> MarketoResult<LeadId> {
        const OP: &str = "get lead id by email";

        let mut url = self.endpoint("rest/v1/leads.json")?;
        url.query_pairs_mut()
            .append_pair("filterType", "email")
            .append_pair("filterValues", email);

        let envelope: ApiResponse<Lead> = self.get(url, OP).await?;
        let lead = envelope.into_first(OP).map_err(|err| match err {
            ApiContractError::EmptyResult { .. } => MarketoError::LeadNotFound {
                email: email.to_string(),
            },
            other => other.into(),
        })?;
        Ok(lead.id)
    }

    /// Create a new lead or update the existing one matched by email.
    pub async fn create_or_update_lead(&self, input: LeadInput) -> MarketoResult<LeadSyncResult> {
        const OP: &str = "create or update lead";

        let request = SyncLeadsRequest::create_or_update(input);
        request.validate()?;

        let url = self.endpoint("rest/v1/leads.json")?;
        let envelope: ApiResponse<LeadSyncResult> = self.post(url, &request, OP).await?;
        Ok(envelope.into_first(OP)?)
    }

    /// Delete a lead from the lead database.
    pub async fn delete_lead(&self, lead_id: LeadId) -> MarketoResult<LeadSyncResult> {
        const OP: &str = "delete lead";

        let url = self.endpoint("rest/v1/leads.json")?;
        let body = LeadIdBatch::single(lead_id);
        let envelope: ApiResponse<LeadSyncResult> =
            self.request(Method::DELETE, url, Some(&body), OP).await?;
        Ok(envelope.into_first(OP)?)
    }

    /// Add a lead to a static list.
    pub async fn add_lead_to_list(
        &self,
        lead_id: LeadId,
        list_id: ListId,
    ) -> MarketoResult<ListOpResult> {
        const OP: &str = "add lead to list";

        let url = self.endpoint(&format!("rest/v1/lists/{list_id}/leads.json"))?;
        let body = LeadIdBatch::single(lead_id);
        let envelope: ApiResponse<ListOpResult> = self.post(url, &body, OP).await?;
        Ok(envelope.into_first(OP)?)
    }

    /// Remove a lead from a static list.
    ///
    /// The vendor tunnels the delete through POST with `_method=DELETE`.
    pub async fn remove_lead_from_list(
        &self,
        lead_id: LeadId,
        list_id: ListId,
    ) -> MarketoResult<ListOpResult> {
        const OP: &str = "remove lead from list";

        let mut url = self.endpoint(&format!("rest/v1/lists/{list_id}/leads.json"))?;
        url.query_pairs_mut().append_pair("_method", "DELETE");
        let body = LeadIdBatch::single(lead_id);
        let envelope: ApiResponse<ListOpResult> = self.post(url, &body, OP).await?;
        Ok(envelope.into_first(OP)?)
    }

    /// Trigger a campaign for a single lead, with optional token overrides.
    pub async fn request_campaign(
        &self,
        campaign_id: CampaignId,
        lead_id: LeadId,
        tokens: Vec<CampaignToken>,
    ) -> MarketoResult<CampaignTriggerResult> {
        const OP: &str = "request campaign";

        let request = TriggerCampaignRequest::new(lead_id, tokens);
        request
            .input
            .tokens
            .iter()
            .try_for_each(Validate::validate)?;

        let url = self.endpoint(&format!("rest/v1/campaigns/{campaign_id}/trigger.json"))?;
        let envelope: ApiResponse<CampaignTriggerResult> = self.post(url, &request, OP).await?;
        Ok(envelope.into_first(OP)?)
    }

    /// Associate a lead with a Munchkin tracking cookie.
    pub async fn associate_lead_with_cookie(
        &self,
        lead_id: LeadId,
        cookie: &str,
    ) -> MarketoResult<()> {
        const OP: &str = "associate lead";

        let mut url = self.endpoint(&format!("rest/v1/leads/{lead_id}/associate.json"))?;
        url.query_pairs_mut().append_pair("cookie", cookie);

        // Empty request body; the endpoint reports success with an empty
        // result array.
        let envelope: ApiResponse<serde_json::Value> =
            self.request(Method::POST, url, None::<&()>, OP).await?;
        envelope.into_result(OP)?;
        Ok(())
    }

    // Private helper methods

    fn endpoint(&self, path: &str) -> MarketoResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        operation: &'static str,
    ) -> MarketoResult<ApiResponse<T>> {
        self.request(Method::GET, url, None::<&()>, operation).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        url: Url,
        body: &B,
        operation: &'static str,
    ) -> MarketoResult<ApiResponse<T>> {
        self.request(Method::POST, url, Some(body), operation).await
    }

    async fn request<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        operation: &'static str,
    ) -> MarketoResult<ApiResponse<T>> {
        let token = self.tokens.bearer_token().await?;

        debug!(%method, %url, operation, "sending Marketo request");
        let mut request = self.http_client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response, operation).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        operation: &'static str,
    ) -> MarketoResult<ApiResponse<T>> {
        let status = response.status();
        debug!(%status, operation, "received Marketo response");

        if !status.is_success() {
            // Error bodies still carry the envelope when the request made
            // it past the gateway; fall back to an empty error list.
            let errors = response
                .json::<ApiResponse<serde_json::Value>>()
                .await
                .map(|envelope| envelope.errors)
                .unwrap_or_default();
            return Err(MarketoError::Api {
                operation,
                status,
                errors,
            });
        }

        let envelope: ApiResponse<T> = response.json().await?;
        if !envelope.success {
            return Err(MarketoError::Api {
                operation,
                status,
                errors: envelope.errors,
            });
        }
        Ok(envelope)
    }
}

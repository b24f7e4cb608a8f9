//! Client configuration
//!
//! The original integration kept its credentials and alias tables in
//! module-level globals; here they live in an explicit config object owned
//! by the client.

use std::collections::HashMap;

use serde::Deserialize;
use url::Url;

use marketo_api_contract::{CampaignId, ListId};
use crate::error::MarketoResult;

/// Configuration for a [`MarketoClient`](crate::MarketoClient)
///
/// `lists` and `campaigns` map caller-chosen names to the vendor ids they
/// alias, so workflow requests can refer to "newsletter" instead of a raw
/// list id.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketoConfig {
    /// OAuth client id from the Marketo LaunchPoint service
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Base URL of the Marketo instance, e.g.
    /// `https://123-ABC-456.mktorest.example.com/`
    pub rest_endpoint: Url,
    #[serde(default)]
    pub lists: HashMap<String, ListId>,
    #[serde(default)]
    pub campaigns: HashMap<String, CampaignId>,
}

impl MarketoConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        rest_endpoint: Url,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            rest_endpoint,
            lists: HashMap::new(),
            campaigns: HashMap::new(),
        }
    }

    /// Register a named alias for a vendor list id.
    pub fn with_list(mut self, name: impl Into<String>, id: ListId) -> Self {
        self.lists.insert(name.into(), id);
        self
    }

    /// Register a named alias for a vendor campaign id.
    pub fn with_campaign(mut self, name: impl Into<String>, id: CampaignId) -> Self {
        self.campaigns.insert(name.into(), id);
        self
    }

    pub fn list_id(&self, name: &str) -> Option<ListId> {
        self.lists.get(name).copied()
    }

    pub fn campaign_id(&self, name: &str) -> Option<CampaignId> {
        self.campaigns.get(name).copied()
    }

    /// The instance base URL, normalized to end with a slash so endpoint
    /// paths join underneath it rather than replacing the last segment.
    pub fn base_url(&self) -> MarketoResult<Url> {
        if self.rest_endpoint.path().ends_with('/') {
            Ok(self.rest_endpoint.clone())
        } else {
            Ok(Url::parse(&format!("{}/", self.rest_endpoint))?)
        }
    }
}

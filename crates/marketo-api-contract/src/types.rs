//! Wire types for the Marketo REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::error::ApiContractError;

/// Vendor-assigned lead identifier
pub type LeadId = i64;
/// Vendor-assigned static list identifier
pub type ListId = i64;
/// Vendor-assigned campaign identifier
pub type CampaignId = i64;

/// Response from the identity/oauth/token client-credentials grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Remaining token lifetime in seconds (one hour by default)
    pub expires_in: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Error entry in a Marketo response envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// The uniform Marketo response envelope
///
/// Every REST endpoint wraps its payload the same way: a `success` flag, a
/// `result` array of operation-specific records, and an `errors` array when
/// the call failed at the application level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default)]
    pub success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default = "Vec::new")]
    pub result: Vec<T>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<ApiError>,
}

impl<T> ApiResponse<T> {
    /// Extract the result records, enforcing the vendor success flag.
    pub fn into_result(self, operation: &'static str) -> Result<Vec<T>, ApiContractError> {
        if !self.success {
            return Err(ApiContractError::Vendor {
                operation,
                errors: self.errors,
            });
        }
        Ok(self.result)
    }

    /// Extract the first result record.
    ///
    /// Success for single-record operations means the success flag is set
    /// and the result array is non-empty.
    pub fn into_first(self, operation: &'static str) -> Result<T, ApiContractError> {
        self.into_result(operation)?
            .into_iter()
            .next()
            .ok_or(ApiContractError::EmptyResult { operation })
    }
}

/// A lead record as returned by the leads endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: LeadId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Any remaining standard or custom fields
    #[serde(flatten)]
    pub fields: HashMap<String, serde_json::Value>,
}

/// Lead fields submitted on create-or-update
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeadInput {
    #[validate(email(message = "lead email must be a valid address"))]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Custom fields, serialized inline next to the standard ones
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl LeadInput {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }
}

/// Sync action for the leads endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeadAction {
    CreateOnly,
    UpdateOnly,
    CreateOrUpdate,
    CreateDuplicate,
}

/// Field used to match existing leads during a sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LookupField {
    Id,
    Email,
    Cookie,
}

/// Body for `POST rest/v1/leads.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SyncLeadsRequest {
    pub action: LeadAction,
    pub lookup_field: LookupField,
    #[validate(nested, length(min = 1, message = "at least one lead is required"))]
    pub input: Vec<LeadInput>,
}

impl SyncLeadsRequest {
    /// The request shape used by the sync workflows: create-or-update a
    /// single lead matched by email.
    pub fn create_or_update(input: LeadInput) -> Self {
        Self {
            action: LeadAction::CreateOrUpdate,
            lookup_field: LookupField::Email,
            input: vec![input],
        }
    }
}

/// Per-record status for lead sync and delete operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadSyncStatus {
    Created,
    Updated,
    Deleted,
    Skipped,
}

/// Per-record outcome for lead sync and delete operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadSyncResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<LeadId>,
    pub status: LeadSyncStatus,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub reasons: Vec<ApiError>,
}

impl LeadSyncResult {
    /// Lead id for this record; skipped records carry none.
    pub fn require_id(&self, operation: &'static str) -> Result<LeadId, ApiContractError> {
        self.id.ok_or(ApiContractError::MissingId { operation })
    }
}

/// A lead referenced by id only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadIdentifier {
    pub id: LeadId,
}

/// Body for lead delete and list membership calls: `{ "input": [{ "id": .. }] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadIdBatch {
    pub input: Vec<LeadIdentifier>,
}

impl LeadIdBatch {
    pub fn single(id: LeadId) -> Self {
        Self {
            input: vec![LeadIdentifier { id }],
        }
    }
}

/// Per-record status for list membership operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOpStatus {
    Added,
    Removed,
    Skipped,
}

/// Per-record outcome for list membership operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListOpResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<LeadId>,
    pub status: ListOpStatus,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub reasons: Vec<ApiError>,
}

/// A `{{my.token}}`-style campaign token override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CampaignToken {
    #[validate(length(min = 1, message = "token name cannot be empty"))]
    pub name: String,
    pub value: String,
}

/// Body for `POST rest/v1/campaigns/{id}/trigger.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerCampaignRequest {
    pub input: TriggerCampaignInput,
}

/// Leads and token overrides for a campaign trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerCampaignInput {
    pub leads: Vec<LeadIdentifier>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tokens: Vec<CampaignToken>,
}

impl TriggerCampaignRequest {
    pub fn new(lead_id: LeadId, tokens: Vec<CampaignToken>) -> Self {
        Self {
            input: TriggerCampaignInput {
                leads: vec![LeadIdentifier { id: lead_id }],
                tokens,
            },
        }
    }
}

/// Result record for a campaign trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignTriggerResult {
    pub id: CampaignId,
}

/// Which sync workflow to run for a lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncProcess {
    Add,
    Update,
    Remove,
}

/// Request for the lead sync workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SyncLead {
    pub process: SyncProcess,
    /// Named alias into the configured lists; unknown or absent aliases
    /// skip the list membership step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[validate(nested)]
    pub input: LeadInput,
}

/// Outcome of the lead sync workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub lead_id: LeadId,
    pub message: String,
}

/// Request for the campaign email workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SendEmail {
    #[validate(email(message = "recipient email must be a valid address"))]
    pub email: String,
    /// Named alias into the configured campaigns
    #[validate(length(min = 1, message = "campaign name cannot be empty"))]
    pub campaign: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[validate(nested)]
    pub tokens: Vec<CampaignToken>,
}

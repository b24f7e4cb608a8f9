//! Multi-step lead and campaign workflows
//!
//! Each workflow is a straight-line sequence of at most three REST calls,
//! with no retry and no partial-failure recovery: the first failing step
//! aborts the workflow and surfaces its error.

use marketo_api_contract::{SendEmail, SyncLead, SyncOutcome, SyncProcess};
use tracing::debug;
use validator::Validate;

use crate::client::MarketoClient;
use crate::error::{MarketoError, MarketoResult};

impl MarketoClient {
    /// Sync a lead with the lead database and adjust list membership.
    ///
    /// For [`SyncProcess::Add`] and [`SyncProcess::Update`]: create or
    /// update the lead, then add it to the named list when one is
    /// configured. For [`SyncProcess::Remove`]: look up the lead id by
    /// email, delete the lead, then remove it from the named list.
    ///
    /// A list alias that is absent or not configured skips the membership
    /// step rather than failing the sync.
    pub async fn sync_lead(&self, request: &SyncLead) -> MarketoResult<SyncOutcome> {
        request.validate()?;

        let list_id = request
            .list
            .as_deref()
            .and_then(|name| self.config().list_id(name));

        match request.process {
            SyncProcess::Add | SyncProcess::Update => {
                let result = self.create_or_update_lead(request.input.clone()).await?;
                let lead_id = result.require_id("create or update lead")?;
                debug!(lead_id, status = ?result.status, "lead synced");

                if let Some(list_id) = list_id {
                    self.add_lead_to_list(lead_id, list_id).await?;
                    debug!(lead_id, list_id, "lead added to list");
                }

                let verb = match request.process {
                    SyncProcess::Add => "added to",
                    _ => "updated in",
                };
                Ok(SyncOutcome {
                    lead_id,
                    message: format!("Lead Id {lead_id} is successfully {verb} Marketo."),
                })
            }
            SyncProcess::Remove => {
                let lead_id = self.get_lead_id_by_email(&request.input.email).await?;
                self.delete_lead(lead_id).await?;
                debug!(lead_id, "lead deleted");

                if let Some(list_id) = list_id {
                    self.remove_lead_from_list(lead_id, list_id).await?;
                    debug!(lead_id, list_id, "lead removed from list");
                }

                Ok(SyncOutcome {
                    lead_id,
                    message: format!("Lead Id {lead_id} is successfully removed from Marketo."),
                })
            }
        }
    }

    /// Trigger the configured email campaign for the lead matching the
    /// request's email address.
    ///
    /// The campaign name must resolve through the configured aliases; the
    /// lead must already exist in the lead database.
    pub async fn send_email(&self, request: &SendEmail) -> MarketoResult<String> {
        request.validate()?;

        let campaign_id =
            self.config()
                .campaign_id(&request.campaign)
                .ok_or_else(|| MarketoError::UnknownCampaign {
                    name: request.campaign.clone(),
                })?;

        let lead_id = self.get_lead_id_by_email(&request.email).await?;
        self.request_campaign(campaign_id, lead_id, request.tokens.clone()).await?;
        debug!(lead_id, campaign_id, "campaign triggered");

        Ok(format!(
            "\"{}\" email has been sent to {}.",
            request.campaign, request.email
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketo_api_contract::LeadInput;
    use url::Url;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::MarketoConfig;

    async fn test_client(server: &MockServer) -> MarketoClient {
        Mock::given(method("GET"))
            .and(path("/identity/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-1",
                "token_type": "bearer",
                "expires_in": 3599
            })))
            .mount(server)
            .await;

        let config = MarketoConfig::new("id", "secret", Url::parse(&server.uri()).unwrap())
            .with_list("newsletter", 1001)
            .with_campaign("confirm", 2002);
        MarketoClient::new(config).unwrap()
    }

    fn envelope(result: serde_json::Value) -> serde_json::Value {
        serde_json::json!({"requestId": "1a2b#c3", "success": true, "result": result})
    }

    #[tokio::test]
    async fn add_syncs_lead_and_list_membership() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/leads.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                serde_json::json!([{"id": 50, "status": "created"}]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/lists/1001/leads.json"))
            .and(body_json(serde_json::json!({"input": [{"id": 50}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                serde_json::json!([{"id": 50, "status": "added"}]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let request = SyncLead {
            process: SyncProcess::Add,
            list: Some("newsletter".into()),
            input: LeadInput::new("user@example.com"),
        };

        let outcome = client.sync_lead(&request).await.unwrap();
        assert_eq!(outcome.lead_id, 50);
        assert_eq!(outcome.message, "Lead Id 50 is successfully added to Marketo.");
    }

    #[tokio::test]
    async fn update_skips_unknown_list_alias() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/leads.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                serde_json::json!([{"id": 50, "status": "updated"}]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let request = SyncLead {
            process: SyncProcess::Update,
            list: Some("no-such-list".into()),
            input: LeadInput::new("user@example.com"),
        };

        let outcome = client.sync_lead(&request).await.unwrap();
        assert_eq!(outcome.message, "Lead Id 50 is successfully updated in Marketo.");
    }

    #[tokio::test]
    async fn remove_deletes_lead_and_list_membership() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/leads.json"))
            .and(query_param("filterType", "email"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                serde_json::json!([{"id": 50, "email": "user@example.com"}]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/leads.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                serde_json::json!([{"id": 50, "status": "deleted"}]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/lists/1001/leads.json"))
            .and(query_param("_method", "DELETE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                serde_json::json!([{"id": 50, "status": "removed"}]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let request = SyncLead {
            process: SyncProcess::Remove,
            list: Some("newsletter".into()),
            input: LeadInput::new("user@example.com"),
        };

        let outcome = client.sync_lead(&request).await.unwrap();
        assert_eq!(outcome.message, "Lead Id 50 is successfully removed from Marketo.");
    }

    #[tokio::test]
    async fn remove_fails_when_lead_is_missing() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/leads.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([]))))
            .mount(&server)
            .await;

        let request = SyncLead {
            process: SyncProcess::Remove,
            list: None,
            input: LeadInput::new("ghost@example.com"),
        };

        let err = client.sync_lead(&request).await.unwrap_err();
        assert!(matches!(err, MarketoError::LeadNotFound { .. }));
    }

    #[tokio::test]
    async fn send_email_looks_up_lead_and_triggers_campaign() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/leads.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                serde_json::json!([{"id": 50, "email": "user@example.com"}]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/campaigns/2002/trigger.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                serde_json::json!([{"id": 2002}]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let request = SendEmail {
            email: "user@example.com".into(),
            campaign: "confirm".into(),
            tokens: vec![],
        };

        let message = client.send_email(&request).await.unwrap();
        assert_eq!(message, "\"confirm\" email has been sent to user@example.com.");
    }

    #[tokio::test]
    async fn send_email_rejects_unknown_campaign() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        let request = SendEmail {
            email: "user@example.com".into(),
            campaign: "no-such-campaign".into(),
            tokens: vec![],
        };

        let err = client.send_email(&request).await.unwrap_err();
        assert!(matches!(err, MarketoError::UnknownCampaign { name } if name == "no-such-campaign"));
    }
}

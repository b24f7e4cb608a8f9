//! In-memory mock of the Marketo API
//!
//! Backs the [`MarketoApi`] trait with a lead table in a mutex, so
//! downstream consumers can test their integration without a live
//! Marketo account.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use marketo_api_contract::*;
use marketo_client_api::{ClientApiError, ClientApiResult, MarketoApi};

#[derive(Default)]
struct MockState {
    /// email -> lead id
    leads: HashMap<String, LeadId>,
    next_id: LeadId,
    /// (campaign alias, lead id) pairs, in trigger order
    triggered: Vec<(String, LeadId)>,
}

/// Mock client with an in-memory lead database
pub struct MockMarketo {
    state: Mutex<MockState>,
    campaigns: Vec<String>,
}

impl MockMarketo {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 1,
                ..MockState::default()
            }),
            campaigns: Vec::new(),
        }
    }

    /// Register a campaign alias the mock will accept.
    pub fn with_campaign(mut self, name: impl Into<String>) -> Self {
        self.campaigns.push(name.into());
        self
    }

    /// Seed a lead and return its assigned id.
    pub fn seed_lead(&self, email: impl Into<String>) -> LeadId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.leads.insert(email.into(), id);
        id
    }

    /// Campaign triggers recorded so far, as (alias, lead id) pairs.
    pub fn triggered(&self) -> Vec<(String, LeadId)> {
        self.state.lock().unwrap().triggered.clone()
    }
}

impl Default for MockMarketo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketoApi for MockMarketo {
    async fn lookup_lead_id(&self, email: &str) -> ClientApiResult<LeadId> {
        self.state
            .lock()
            .unwrap()
            .leads
            .get(email)
            .copied()
            .ok_or_else(|| ClientApiError::Server(format!("no lead found for email {email}")))
    }

    async fn sync_lead(&self, request: &SyncLead) -> ClientApiResult<SyncOutcome> {
        let mut state = self.state.lock().unwrap();
        let email = request.input.email.clone();

        match request.process {
            SyncProcess::Add | SyncProcess::Update => {
                let lead_id = match state.leads.get(&email).copied() {
                    Some(id) => id,
                    None => {
                        let id = state.next_id;
                        state.next_id += 1;
                        state.leads.insert(email, id);
                        id
                    }
                };
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
                let lead_id = state.leads.remove(&email).ok_or_else(|| {
                    ClientApiError::Server(format!("no lead found for email {email}"))
                })?;
                Ok(SyncOutcome {
                    lead_id,
                    message: format!("Lead Id {lead_id} is successfully removed from Marketo."),
                })
            }
        }
    }

    async fn send_email(&self, request: &SendEmail) -> ClientApiResult<String> {
        if !self.campaigns.contains(&request.campaign) {
            return Err(ClientApiError::Server(format!(
                "campaign {:?} is not configured",
                request.campaign
            )));
        }

        let mut state = self.state.lock().unwrap();
        let lead_id = state.leads.get(&request.email).copied().ok_or_else(|| {
            ClientApiError::Server(format!("no lead found for email {}", request.email))
        })?;
        let campaign = request.campaign.clone();
        state.triggered.push((campaign, lead_id));

        Ok(format!(
            "\"{}\" email has been sent to {}.",
            request.campaign, request.email
        ))
    }

    async fn associate_lead_with_cookie(
        &self,
        lead_id: LeadId,
        _cookie: &str,
    ) -> ClientApiResult<()> {
        let state = self.state.lock().unwrap();
        if state.leads.values().any(|id| *id == lead_id) {
            Ok(())
        } else {
            Err(ClientApiError::Server(format!(
                "no lead found with id {lead_id}"
            )))
        }
    }
}

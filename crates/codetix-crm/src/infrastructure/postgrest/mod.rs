//! PostgREST store adapter
//!
//! Talks to the hosted Supabase REST dialect over HTTP. Tables are addressed
//! as `{url}/{table}`; filters use the `col=op.value` query syntax.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::domain::aggregates::{Agent, HistoryAction, HistoryEntry, Lead, UserProfile};
use crate::domain::value_objects::{EntityId, LeadStatus};
use crate::ports::outbound::{LeadStore, RepositoryError};

const LEAD_COLUMNS: &str = "id,zone,created_at,assigned_to,status,assigned_at";
const USER_COLUMNS: &str = "id,name,role,zone,status";

/// Connection settings for [`PostgrestLeadStore`]
#[derive(Clone, Debug)]
pub struct PostgrestConfig {
    /// REST root, e.g. `https://<project>.supabase.co/rest/v1`
    pub url: String,
    pub service_key: String,
    pub timeout: Duration,
}

/// `LeadStore` backed by PostgREST
pub struct PostgrestLeadStore {
    client: reqwest::Client,
    base_url: String,
}

impl PostgrestLeadStore {
    pub fn new(config: &PostgrestConfig) -> Result<Self, RepositoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.service_key).map_err(|e| RepositoryError::ConnectionError(e.to_string()))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.service_key))
                .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn table(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    // =========================================================================
    // HTTP helpers
    // =========================================================================

    async fn get<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>, RepositoryError> {
        debug!("PostgREST GET {}", table);
        let response = checked(self.client.get(self.table(table)).query(query)).await?;
        response
            .json()
            .await
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }

    async fn patch<T: Serialize>(&self, table: &str, query: &[(&str, String)], body: &T) -> Result<(), RepositoryError> {
        debug!("PostgREST PATCH {}", table);
        let request = self
            .client
            .patch(self.table(table))
            .query(query)
            .header("Prefer", "return=minimal")
            .json(body);
        checked(request).await?;
        Ok(())
    }

    async fn post<T: Serialize>(&self, table: &str, body: &T) -> Result<(), RepositoryError> {
        debug!("PostgREST POST {}", table);
        let request = self
            .client
            .post(self.table(table))
            .header("Prefer", "return=minimal")
            .json(body);
        checked(request).await?;
        Ok(())
    }

    async fn count(&self, table: &str, query: &[(&str, String)]) -> Result<u32, RepositoryError> {
        debug!("PostgREST HEAD {}", table);
        let request = self
            .client
            .head(self.table(table))
            .query(query)
            .header("Prefer", "count=exact");
        let response = checked(request).await?;

        let range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| RepositoryError::QueryError("missing Content-Range header".into()))?;
        parse_content_range(range)
    }
}

async fn checked(request: RequestBuilder) -> Result<Response, RepositoryError> {
    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(RepositoryError::QueryError(format!("{}: {}", status, text)));
    }

    Ok(response)
}

/// Total from a `Content-Range` value such as `0-14/15` or `*/0`
fn parse_content_range(value: &str) -> Result<u32, RepositoryError> {
    value
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
        .ok_or_else(|| RepositoryError::QueryError(format!("unexpected Content-Range '{}'", value)))
}

/// `in.(a,b)` filter; values with reserved characters are double-quoted
fn in_list<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<String> = values
        .into_iter()
        .map(|v| {
            let v = v.as_ref();
            if v.contains(|c: char| matches!(c, ',' | '(' | ')' | '"' | '\\') || c.is_whitespace()) {
                format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\""))
            } else {
                v.to_string()
            }
        })
        .collect();
    format!("in.({})", items.join(","))
}

/// Every stored form of `statuses`: each spelling lower-cased, capitalized
/// and upper-cased. `in.()` compares case-sensitively.
fn spellings_of(statuses: &[LeadStatus]) -> Vec<String> {
    let mut values = Vec::new();
    for spelling in statuses.iter().flat_map(|s| s.spellings().iter().copied()) {
        let mut chars = spelling.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        for value in [spelling.to_string(), capitalized, spelling.to_uppercase()] {
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }
    values
}

/// Group leads by the status they held, keeping first-seen order
fn by_status(leads: &[Lead]) -> Vec<(LeadStatus, Vec<EntityId>)> {
    let mut groups: Vec<(LeadStatus, Vec<EntityId>)> = Vec::new();
    for lead in leads {
        match groups.iter_mut().find(|(status, _)| *status == lead.status()) {
            Some((_, ids)) => ids.push(lead.id().clone()),
            None => groups.push((lead.status(), vec![lead.id().clone()])),
        }
    }
    groups
}

#[async_trait]
impl LeadStore for PostgrestLeadStore {
    async fn list_active_agents(&self) -> Result<Vec<Agent>, RepositoryError> {
        let users: Vec<UserProfile> = self
            .get(
                "users",
                &[
                    ("select", USER_COLUMNS.to_string()),
                    ("role", "eq.agent".to_string()),
                    ("status", "eq.active".to_string()),
                ],
            )
            .await?;
        Ok(users.into_iter().map(Agent::from).collect())
    }

    async fn list_unassigned_leads(&self) -> Result<Vec<Lead>, RepositoryError> {
        self.get(
            "leads",
            &[
                ("select", LEAD_COLUMNS.to_string()),
                ("assigned_to", "is.null".to_string()),
                ("order", "created_at.asc".to_string()),
            ],
        )
        .await
    }

    async fn count_active_leads(&self, agent_id: &EntityId) -> Result<u32, RepositoryError> {
        self.count(
            "leads",
            &[
                ("select", "id".to_string()),
                ("assigned_to", format!("eq.{}", agent_id)),
                ("status", in_list(spellings_of(&LeadStatus::ACTIVE))),
            ],
        )
        .await
    }

    async fn assign_leads(
        &self,
        lead_ids: &[EntityId],
        agent_id: &EntityId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if lead_ids.is_empty() {
            return Ok(());
        }
        self.patch(
            "leads",
            &[("id", in_list(lead_ids))],
            &json!({
                "assigned_to": agent_id,
                "status": LeadStatus::Assigned,
                "assigned_at": at,
            }),
        )
        .await
    }

    async fn release_leads(&self, leads: &[Lead]) -> Result<(), RepositoryError> {
        for (status, ids) in by_status(leads) {
            self.patch(
                "leads",
                &[("id", in_list(&ids))],
                &json!({
                    "assigned_to": null,
                    "status": status,
                    "assigned_at": null,
                }),
            )
            .await?;
        }
        Ok(())
    }

    async fn insert_history(&self, entries: &[HistoryEntry]) -> Result<(), RepositoryError> {
        if entries.is_empty() {
            return Ok(());
        }
        self.post("lead_history", &entries).await
    }

    async fn find_user(&self, id: &EntityId) -> Result<Option<UserProfile>, RepositoryError> {
        let users: Vec<UserProfile> = self
            .get(
                "users",
                &[
                    ("select", USER_COLUMNS.to_string()),
                    ("id", format!("eq.{}", id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(users.into_iter().next())
    }

    async fn find_agent_by_name(&self, name: &str) -> Result<Option<Agent>, RepositoryError> {
        // `ilike` treats `*`, `%` and `_` as wildcards; match exactly client-side
        let wanted = name.trim().to_lowercase();
        Ok(self
            .list_active_agents()
            .await?
            .into_iter()
            .find(|agent| agent.name().to_lowercase() == wanted))
    }

    async fn list_new_unassigned(&self, limit: usize) -> Result<Vec<Lead>, RepositoryError> {
        self.get(
            "leads",
            &[
                ("select", LEAD_COLUMNS.to_string()),
                ("status", in_list(spellings_of(&[LeadStatus::New]))),
                ("assigned_to", "is.null".to_string()),
                ("order", "created_at.asc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn find_lead(&self, id: &EntityId) -> Result<Option<Lead>, RepositoryError> {
        let leads: Vec<Lead> = self
            .get(
                "leads",
                &[
                    ("select", LEAD_COLUMNS.to_string()),
                    ("id", format!("eq.{}", id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(leads.into_iter().next())
    }

    async fn update_status(&self, id: &EntityId, status: LeadStatus) -> Result<(), RepositoryError> {
        debug!("PostgREST PATCH leads status");
        let request = self
            .client
            .patch(self.table("leads"))
            .query(&[("id", format!("eq.{}", id)), ("select", "id".to_string())])
            .header("Prefer", "return=representation")
            .json(&json!({ "status": status }));
        let updated: Vec<serde_json::Value> = checked(request)
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        if updated.is_empty() {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_history(
        &self,
        action: Option<HistoryAction>,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(action) = action {
            query.push(("action", format!("eq.{}", action.as_str())));
        }
        self.get("lead_history", &query).await
    }
}

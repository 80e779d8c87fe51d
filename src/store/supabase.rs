//! PostgREST (Supabase) store adapter
//!
//! Speaks the hosted backend's REST dialect: filters become query parameters
//! (`eq.`, `in.(...)`, `not.is.null`), writes request
//! `Prefer: return=representation` so affected rows come back in the body,
//! and uniqueness violations are recognized by HTTP 409 or the PostgreSQL
//! error code 23505 in the response body.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use tracing::debug;
use uuid::Uuid;

use super::error::{StoreError, StoreResult};
use super::{
    ApplicationStatus, ApplicationStore, FundingMember, Group, GroupFilter, GroupStore,
    NewApplication, NewFundingMember, NewGroup, NewRegistrant, ProjectApplication, Registrant,
    RegistrantFilter, RegistrantPatch, RegistrantStore,
};
use crate::config::StoreConfig;

/// Unique-violation error code reported by the backend.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    tables: Tables,
}

#[derive(Debug, Clone)]
struct Tables {
    registrations: String,
    groups: String,
    applications: String,
    team_members: String,
}

impl SupabaseStore {
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key).map_err(|_| StoreError::Api {
            status: 0,
            message: "API key contains invalid header characters".into(),
        })?;
        let bearer =
            HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|_| {
                StoreError::Api {
                    status: 0,
                    message: "API key contains invalid header characters".into(),
                }
            })?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            tables: Tables {
                registrations: config.registrations_table.clone(),
                groups: config.groups_table.clone(),
                applications: config.applications_table.clone(),
                team_members: config.team_members_table.clone(),
            },
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn registrant_params(filter: &RegistrantFilter) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(id) = filter.id {
            params.push(("id".into(), format!("eq.{id}")));
        }
        if let Some(ids) = &filter.ids {
            let list = ids
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("id".into(), format!("in.({list})")));
        }
        if let Some(phone) = &filter.phone {
            params.push(("phone".into(), format!("eq.{phone}")));
        }
        if let Some(assigned) = filter.assigned {
            params.push(("assigned".into(), format!("eq.{assigned}")));
        }
        if let Some(group_id) = filter.group_id {
            params.push(("group_id".into(), format!("eq.{group_id}")));
        }
        if let Some(null) = filter.group_id_null {
            let op = if null { "is.null" } else { "not.is.null" };
            params.push(("group_id".into(), op.into()));
        }
        if params.is_empty() {
            // PostgREST refuses unfiltered bulk writes; match every row explicitly.
            params.push(("id".into(), "not.is.null".into()));
        }
        params
    }

    fn group_params(filter: &GroupFilter) -> Vec<(String, String)> {
        match filter.id {
            Some(id) => vec![("id".into(), format!("eq.{id}"))],
            None => vec![("id".into(), "not.is.null".into())],
        }
    }

    /// Map a non-success response to a store error, recognizing uniqueness
    /// conflicts so callers can branch on them.
    async fn check(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT || message.contains(UNIQUE_VIOLATION) {
            return Err(StoreError::Conflict(message));
        }
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn insert_row<T, R>(&self, table: &str, fields: &T) -> StoreResult<R>
    where
        T: serde::Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&[fields])
            .send()
            .await?;
        let mut rows: Vec<R> = Self::check(response).await?.json().await?;
        rows.pop().ok_or_else(|| StoreError::Api {
            status: 200,
            message: format!("insert into {table} returned no rows"),
        })
    }

    /// Number of rows a write touched, from the representation body.
    async fn affected_rows(response: Response) -> StoreResult<u64> {
        let rows: Vec<serde_json::Value> = Self::check(response).await?.json().await?;
        Ok(rows.len() as u64)
    }
}

#[async_trait]
impl RegistrantStore for SupabaseStore {
    async fn query_registrants(&self, filter: &RegistrantFilter) -> StoreResult<Vec<Registrant>> {
        let mut params = Self::registrant_params(filter);
        params.push(("select".into(), "*".into()));
        params.push(("order".into(), "created_at.desc".into()));
        let response = self
            .client
            .get(self.table_url(&self.tables.registrations))
            .query(&params)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn insert_registrant(&self, fields: NewRegistrant) -> StoreResult<Registrant> {
        debug!(phone = %fields.phone, "inserting registrant");
        self.insert_row(&self.tables.registrations, &fields).await
    }

    async fn update_registrants(
        &self,
        filter: &RegistrantFilter,
        patch: &RegistrantPatch,
    ) -> StoreResult<u64> {
        let response = self
            .client
            .patch(self.table_url(&self.tables.registrations))
            .query(&Self::registrant_params(filter))
            .header("Prefer", "return=representation")
            .json(&patch.to_json())
            .send()
            .await?;
        Self::affected_rows(response).await
    }

    async fn delete_registrants(&self, filter: &RegistrantFilter) -> StoreResult<u64> {
        let response = self
            .client
            .delete(self.table_url(&self.tables.registrations))
            .query(&Self::registrant_params(filter))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        Self::affected_rows(response).await
    }

    async fn count_registrants(&self) -> StoreResult<u64> {
        let response = self
            .client
            .head(self.table_url(&self.tables.registrations))
            .query(&[("select", "id")])
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = Self::check(response).await?;
        let count = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|range| range.rsplit('/').next())
            .and_then(|total| total.parse::<u64>().ok())
            .unwrap_or(0);
        Ok(count)
    }
}

#[async_trait]
impl GroupStore for SupabaseStore {
    async fn query_groups(&self, filter: &GroupFilter) -> StoreResult<Vec<Group>> {
        let mut params = Self::group_params(filter);
        params.push(("select".into(), "*".into()));
        params.push(("order".into(), "created_at.desc".into()));
        let response = self
            .client
            .get(self.table_url(&self.tables.groups))
            .query(&params)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn insert_group(&self, fields: NewGroup) -> StoreResult<Group> {
        debug!(name = %fields.name, members = fields.member_count, "inserting group");
        self.insert_row(&self.tables.groups, &fields).await
    }

    async fn delete_groups(&self, filter: &GroupFilter) -> StoreResult<u64> {
        let response = self
            .client
            .delete(self.table_url(&self.tables.groups))
            .query(&Self::group_params(filter))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        Self::affected_rows(response).await
    }
}

#[async_trait]
impl ApplicationStore for SupabaseStore {
    async fn query_applications(&self) -> StoreResult<Vec<ProjectApplication>> {
        let response = self
            .client
            .get(self.table_url(&self.tables.applications))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_application(&self, id: Uuid) -> StoreResult<ProjectApplication> {
        let response = self
            .client
            .get(self.table_url(&self.tables.applications))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))])
            .send()
            .await?;
        let mut rows: Vec<ProjectApplication> = Self::check(response).await?.json().await?;
        rows.pop()
            .ok_or_else(|| StoreError::NotFound(format!("application {id}")))
    }

    async fn insert_application(&self, fields: NewApplication) -> StoreResult<ProjectApplication> {
        self.insert_row(&self.tables.applications, &fields).await
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> StoreResult<ProjectApplication> {
        let response = self
            .client
            .patch(self.table_url(&self.tables.applications))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await?;
        let mut rows: Vec<ProjectApplication> = Self::check(response).await?.json().await?;
        rows.pop()
            .ok_or_else(|| StoreError::NotFound(format!("application {id}")))
    }

    async fn delete_application(&self, id: Uuid) -> StoreResult<u64> {
        let response = self
            .client
            .delete(self.table_url(&self.tables.applications))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .send()
            .await?;
        Self::affected_rows(response).await
    }

    async fn insert_funding_members(
        &self,
        rows: Vec<NewFundingMember>,
    ) -> StoreResult<Vec<FundingMember>> {
        let response = self
            .client
            .post(self.table_url(&self.tables.team_members))
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn query_funding_members(
        &self,
        application_id: Uuid,
    ) -> StoreResult<Vec<FundingMember>> {
        let response = self
            .client
            .get(self.table_url(&self.tables.team_members))
            .query(&[
                ("select", "*".to_string()),
                ("application_id", format!("eq.{application_id}")),
            ])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

//! Store abstraction layer
//!
//! All persistence is delegated to a hosted backend. This module defines the
//! row types, filters and patches the orchestrators speak, trait interfaces
//! for the three tables we touch, a PostgREST-backed implementation
//! ([`SupabaseStore`]) and an in-memory implementation ([`MemoryStore`]) with
//! the same uniqueness semantics for tests and offline use.

pub mod error;
pub mod memory;
pub mod supabase;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Interest category a registrant signed up under. Round-robin balancing
/// visits categories in [`Interest::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interest {
    Marketing,
    Software,
    Other,
}

impl Interest {
    /// Fixed enumeration order used by the balancer's interleave.
    pub const ALL: [Interest; 3] = [Interest::Marketing, Interest::Software, Interest::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interest::Marketing => "marketing",
            Interest::Software => "software",
            Interest::Other => "other",
        }
    }
}

impl std::fmt::Display for Interest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Interest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marketing" => Ok(Interest::Marketing),
            "software" => Ok(Interest::Software),
            "other" => Ok(Interest::Other),
            other => Err(format!("unknown interest: {other}")),
        }
    }
}

/// A registrant row.
///
/// Invariant maintained by the orchestrators: `assigned` is true if and only
/// if `group_id` is set, on every exit path they control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registrant {
    pub id: Uuid,
    pub name: String,
    pub college: Option<String>,
    pub phone: String,
    pub interest: Interest,
    pub assigned: bool,
    pub group_id: Option<Uuid>,
    /// Synthetic entrant created by the admin seeder, never mixed into real groups.
    #[serde(default)]
    pub is_dummy: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a registrant; the store assigns the id.
#[derive(Debug, Clone, Serialize)]
pub struct NewRegistrant {
    pub name: String,
    pub college: Option<String>,
    pub phone: String,
    pub interest: Interest,
    pub assigned: bool,
    pub group_id: Option<Uuid>,
    pub is_dummy: bool,
    pub created_at: DateTime<Utc>,
}

/// A group row. `members` is the creation-time snapshot of membership;
/// current membership is always derived by querying registrants by `group_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<Uuid>,
    pub member_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGroup {
    pub name: String,
    pub members: Vec<Uuid>,
    pub member_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Partial update of registrant rows. `group_id` distinguishes "leave
/// untouched" (`None`) from "set to null" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct RegistrantPatch {
    pub assigned: Option<bool>,
    pub group_id: Option<Option<Uuid>>,
}

impl RegistrantPatch {
    /// Clear assignment flag and group reference together.
    pub fn unassign() -> Self {
        Self {
            assigned: Some(false),
            group_id: Some(None),
        }
    }

    /// Set assignment flag and group reference together.
    pub fn assign_to(group_id: Uuid) -> Self {
        Self {
            assigned: Some(true),
            group_id: Some(Some(group_id)),
        }
    }

    /// Backfill the group reference only (rows already marked assigned).
    pub fn set_group(group_id: Uuid) -> Self {
        Self {
            assigned: None,
            group_id: Some(Some(group_id)),
        }
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        if let Some(assigned) = self.assigned {
            body.insert("assigned".into(), serde_json::Value::Bool(assigned));
        }
        if let Some(group_id) = &self.group_id {
            body.insert(
                "group_id".into(),
                match group_id {
                    Some(id) => serde_json::Value::String(id.to_string()),
                    None => serde_json::Value::Null,
                },
            );
        }
        serde_json::Value::Object(body)
    }
}

/// Registrant row filter. All set fields must match; an empty filter matches
/// every row.
#[derive(Debug, Clone, Default)]
pub struct RegistrantFilter {
    pub id: Option<Uuid>,
    pub ids: Option<Vec<Uuid>>,
    pub phone: Option<String>,
    pub assigned: Option<bool>,
    pub group_id: Option<Uuid>,
    /// `Some(true)` matches rows without a group, `Some(false)` rows with one.
    pub group_id_null: Option<bool>,
}

impl RegistrantFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_ids(ids: Vec<Uuid>) -> Self {
        Self {
            ids: Some(ids),
            ..Self::default()
        }
    }

    pub fn by_phone(phone: impl Into<String>) -> Self {
        Self {
            phone: Some(phone.into()),
            ..Self::default()
        }
    }

    pub fn by_group(group_id: Uuid) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    pub fn unassigned() -> Self {
        Self {
            assigned: Some(false),
            ..Self::default()
        }
    }

    pub(crate) fn matches(&self, row: &Registrant) -> bool {
        if let Some(id) = self.id {
            if row.id != id {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&row.id) {
                return false;
            }
        }
        if let Some(phone) = &self.phone {
            if &row.phone != phone {
                return false;
            }
        }
        if let Some(assigned) = self.assigned {
            if row.assigned != assigned {
                return false;
            }
        }
        if let Some(group_id) = self.group_id {
            if row.group_id != Some(group_id) {
                return false;
            }
        }
        if let Some(null) = self.group_id_null {
            if row.group_id.is_none() != null {
                return false;
            }
        }
        true
    }
}

/// Group row filter; `None` matches every group.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupFilter {
    pub id: Option<Uuid>,
}

impl GroupFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: Uuid) -> Self {
        Self { id: Some(id) }
    }
}

/// Status of a project-funding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown application status: {other}")),
        }
    }
}

/// A project-funding application row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectApplication {
    pub id: Uuid,
    pub team_name: String,
    pub project_name: String,
    pub project_description: String,
    pub problem_statement: String,
    #[serde(default)]
    pub traction_mvp: bool,
    #[serde(default)]
    pub traction_pilot: bool,
    #[serde(default)]
    pub traction_sales: bool,
    #[serde(default)]
    pub traction_links: String,
    #[serde(default)]
    pub traction_details: String,
    #[serde(default)]
    pub video_pitch: String,
    #[serde(default)]
    pub demo_link: String,
    #[serde(default)]
    pub support_needs: String,
    #[serde(default)]
    pub expected_growth: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewApplication {
    pub team_name: String,
    pub project_name: String,
    pub project_description: String,
    pub problem_statement: String,
    pub traction_mvp: bool,
    pub traction_pilot: bool,
    pub traction_sales: bool,
    pub traction_links: String,
    pub traction_details: String,
    pub video_pitch: String,
    pub demo_link: String,
    pub support_needs: String,
    pub expected_growth: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

/// A funding-application team member row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingMember {
    pub id: Uuid,
    pub application_id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewFundingMember {
    pub application_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub role: String,
}

/// Registrant table operations.
#[async_trait]
pub trait RegistrantStore: Send + Sync {
    /// Fetch registrants matching the filter, newest first.
    async fn query_registrants(&self, filter: &RegistrantFilter) -> StoreResult<Vec<Registrant>>;

    /// Insert one registrant. A duplicate phone surfaces as
    /// [`StoreError::Conflict`].
    async fn insert_registrant(&self, fields: NewRegistrant) -> StoreResult<Registrant>;

    /// Patch all registrants matching the filter; returns the number of rows
    /// actually updated.
    async fn update_registrants(
        &self,
        filter: &RegistrantFilter,
        patch: &RegistrantPatch,
    ) -> StoreResult<u64>;

    /// Delete all registrants matching the filter; returns the number deleted.
    async fn delete_registrants(&self, filter: &RegistrantFilter) -> StoreResult<u64>;

    /// Total registrant count (real and synthetic).
    async fn count_registrants(&self) -> StoreResult<u64>;
}

/// Group table operations.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Fetch groups matching the filter, newest first.
    async fn query_groups(&self, filter: &GroupFilter) -> StoreResult<Vec<Group>>;

    async fn insert_group(&self, fields: NewGroup) -> StoreResult<Group>;

    /// Delete all groups matching the filter; returns the number deleted.
    async fn delete_groups(&self, filter: &GroupFilter) -> StoreResult<u64>;
}

/// Project-funding application operations.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// All applications, newest first.
    async fn query_applications(&self) -> StoreResult<Vec<ProjectApplication>>;

    async fn get_application(&self, id: Uuid) -> StoreResult<ProjectApplication>;

    async fn insert_application(&self, fields: NewApplication) -> StoreResult<ProjectApplication>;

    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> StoreResult<ProjectApplication>;

    async fn delete_application(&self, id: Uuid) -> StoreResult<u64>;

    async fn insert_funding_members(
        &self,
        rows: Vec<NewFundingMember>,
    ) -> StoreResult<Vec<FundingMember>>;

    async fn query_funding_members(&self, application_id: Uuid) -> StoreResult<Vec<FundingMember>>;
}

//! In-memory store implementation
//!
//! Behaves like the hosted backend at the contract level: assigns ids on
//! insert, enforces phone uniqueness with a [`StoreError::Conflict`], and
//! returns reads newest-first. Used by tests and as an offline double; knobs
//! for injecting insert failures let tests exercise the rollback paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::error::{StoreError, StoreResult};
use super::{
    ApplicationStatus, ApplicationStore, FundingMember, Group, GroupFilter, GroupStore,
    NewApplication, NewFundingMember, NewGroup, NewRegistrant, ProjectApplication, Registrant,
    RegistrantFilter, RegistrantPatch, RegistrantStore,
};

#[derive(Default)]
pub struct MemoryStore {
    registrants: Mutex<Vec<Registrant>>,
    groups: Mutex<Vec<Group>>,
    applications: Mutex<Vec<ProjectApplication>>,
    funding_members: Mutex<Vec<FundingMember>>,
    fail_group_inserts: AtomicBool,
    fail_funding_member_inserts: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent group insert fail, for exercising the
    /// skip/rollback paths.
    pub fn fail_group_inserts(&self, fail: bool) {
        self.fail_group_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent funding-member insert fail.
    pub fn fail_funding_member_inserts(&self, fail: bool) {
        self.fail_funding_member_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn registrant_snapshot(&self) -> Vec<Registrant> {
        lock(&self.registrants).clone()
    }

    pub fn group_snapshot(&self) -> Vec<Group> {
        lock(&self.groups).clone()
    }
}

#[async_trait]
impl RegistrantStore for MemoryStore {
    async fn query_registrants(&self, filter: &RegistrantFilter) -> StoreResult<Vec<Registrant>> {
        let rows = lock(&self.registrants);
        let mut matched: Vec<Registrant> =
            rows.iter().filter(|r| filter.matches(r)).cloned().collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn insert_registrant(&self, fields: NewRegistrant) -> StoreResult<Registrant> {
        let mut rows = lock(&self.registrants);
        if rows.iter().any(|r| r.phone == fields.phone) {
            return Err(StoreError::Conflict(format!(
                "duplicate key value violates unique constraint (23505): phone {}",
                fields.phone
            )));
        }
        let row = Registrant {
            id: Uuid::new_v4(),
            name: fields.name,
            college: fields.college,
            phone: fields.phone,
            interest: fields.interest,
            assigned: fields.assigned,
            group_id: fields.group_id,
            is_dummy: fields.is_dummy,
            created_at: fields.created_at,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn update_registrants(
        &self,
        filter: &RegistrantFilter,
        patch: &RegistrantPatch,
    ) -> StoreResult<u64> {
        let mut rows = lock(&self.registrants);
        let mut updated = 0u64;
        for row in rows.iter_mut().filter(|r| filter.matches(r)) {
            if let Some(assigned) = patch.assigned {
                row.assigned = assigned;
            }
            if let Some(group_id) = patch.group_id {
                row.group_id = group_id;
            }
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_registrants(&self, filter: &RegistrantFilter) -> StoreResult<u64> {
        let mut rows = lock(&self.registrants);
        let before = rows.len();
        rows.retain(|r| !filter.matches(r));
        Ok((before - rows.len()) as u64)
    }

    async fn count_registrants(&self) -> StoreResult<u64> {
        Ok(lock(&self.registrants).len() as u64)
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn query_groups(&self, filter: &GroupFilter) -> StoreResult<Vec<Group>> {
        let rows = lock(&self.groups);
        let mut matched: Vec<Group> = rows
            .iter()
            .filter(|g| filter.id.is_none_or(|id| g.id == id))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn insert_group(&self, fields: NewGroup) -> StoreResult<Group> {
        if self.fail_group_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 500,
                message: "injected group insert failure".into(),
            });
        }
        let row = Group {
            id: Uuid::new_v4(),
            name: fields.name,
            members: fields.members,
            member_count: fields.member_count,
            created_at: fields.created_at,
        };
        lock(&self.groups).push(row.clone());
        Ok(row)
    }

    async fn delete_groups(&self, filter: &GroupFilter) -> StoreResult<u64> {
        let mut rows = lock(&self.groups);
        let before = rows.len();
        rows.retain(|g| !filter.id.is_none_or(|id| g.id == id));
        Ok((before - rows.len()) as u64)
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn query_applications(&self) -> StoreResult<Vec<ProjectApplication>> {
        let rows = lock(&self.applications);
        let mut all: Vec<ProjectApplication> = rows.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn get_application(&self, id: Uuid) -> StoreResult<ProjectApplication> {
        lock(&self.applications)
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("application {id}")))
    }

    async fn insert_application(&self, fields: NewApplication) -> StoreResult<ProjectApplication> {
        let row = ProjectApplication {
            id: Uuid::new_v4(),
            team_name: fields.team_name,
            project_name: fields.project_name,
            project_description: fields.project_description,
            problem_statement: fields.problem_statement,
            traction_mvp: fields.traction_mvp,
            traction_pilot: fields.traction_pilot,
            traction_sales: fields.traction_sales,
            traction_links: fields.traction_links,
            traction_details: fields.traction_details,
            video_pitch: fields.video_pitch,
            demo_link: fields.demo_link,
            support_needs: fields.support_needs,
            expected_growth: fields.expected_growth,
            status: fields.status,
            created_at: fields.created_at,
        };
        lock(&self.applications).push(row.clone());
        Ok(row)
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> StoreResult<ProjectApplication> {
        let mut rows = lock(&self.applications);
        let row = rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("application {id}")))?;
        row.status = status;
        Ok(row.clone())
    }

    async fn delete_application(&self, id: Uuid) -> StoreResult<u64> {
        let mut rows = lock(&self.applications);
        let before = rows.len();
        rows.retain(|a| a.id != id);
        lock(&self.funding_members).retain(|m| m.application_id != id);
        Ok((before - rows.len()) as u64)
    }

    async fn insert_funding_members(
        &self,
        rows: Vec<NewFundingMember>,
    ) -> StoreResult<Vec<FundingMember>> {
        if self.fail_funding_member_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 500,
                message: "injected team member insert failure".into(),
            });
        }
        let mut inserted = Vec::with_capacity(rows.len());
        let mut table = lock(&self.funding_members);
        for fields in rows {
            let row = FundingMember {
                id: Uuid::new_v4(),
                application_id: fields.application_id,
                name: fields.name,
                phone: fields.phone,
                email: fields.email,
                role: fields.role,
            };
            table.push(row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn query_funding_members(
        &self,
        application_id: Uuid,
    ) -> StoreResult<Vec<FundingMember>> {
        Ok(lock(&self.funding_members)
            .iter()
            .filter(|m| m.application_id == application_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_registrant(phone: &str) -> NewRegistrant {
        NewRegistrant {
            name: "Test".into(),
            college: None,
            phone: phone.into(),
            interest: super::super::Interest::Software,
            assigned: false,
            group_id: None,
            is_dummy: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_phone_is_a_conflict() {
        let store = MemoryStore::new();
        store.insert_registrant(new_registrant("01012345678")).await.unwrap();
        let err = store
            .insert_registrant(new_registrant("01012345678"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn update_respects_assigned_filter() {
        let store = MemoryStore::new();
        let a = store.insert_registrant(new_registrant("01012345678")).await.unwrap();
        let b = store.insert_registrant(new_registrant("01112345678")).await.unwrap();
        let gid = Uuid::new_v4();
        store
            .update_registrants(
                &RegistrantFilter::by_ids(vec![a.id]),
                &RegistrantPatch::assign_to(gid),
            )
            .await
            .unwrap();

        // Only b is still unassigned, so a guarded patch must touch one row.
        let mut filter = RegistrantFilter::by_ids(vec![a.id, b.id]);
        filter.assigned = Some(false);
        let updated = store
            .update_registrants(&filter, &RegistrantPatch::assign_to(Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(updated, 1);
    }

    #[tokio::test]
    async fn null_group_filter_distinguishes_detached_rows() {
        let store = MemoryStore::new();
        let a = store.insert_registrant(new_registrant("01012345678")).await.unwrap();
        store.insert_registrant(new_registrant("01112345678")).await.unwrap();
        store
            .update_registrants(
                &RegistrantFilter::by_id(a.id),
                &RegistrantPatch::assign_to(Uuid::new_v4()),
            )
            .await
            .unwrap();

        let mut detached = RegistrantFilter::all();
        detached.group_id_null = Some(true);
        let rows = store.query_registrants(&detached).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].group_id.is_none());

        let mut attached = RegistrantFilter::all();
        attached.group_id_null = Some(false);
        let rows = store.query_registrants(&attached).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, a.id);
    }

    #[tokio::test]
    async fn delete_by_filter_returns_count() {
        let store = MemoryStore::new();
        store.insert_registrant(new_registrant("01012345678")).await.unwrap();
        store.insert_registrant(new_registrant("01112345678")).await.unwrap();
        let deleted = store
            .delete_registrants(&RegistrantFilter::all())
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.count_registrants().await.unwrap(), 0);
    }
}

//! Pre-formed group self-registration
//!
//! A leader and their teammates are registered in one submission, already
//! marked assigned. Inserts run strictly sequentially so that a failure on
//! entry N can compensate by deleting exactly entries 1..N-1.

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::balance::random_theme;
use crate::error::{Error, Result};
use crate::store::{
    Group, GroupStore, Interest, NewGroup, NewRegistrant, Registrant, RegistrantFilter,
    RegistrantPatch, RegistrantStore,
};

/// One teammate in a group submission. A missing college falls back to the
/// leader's.
#[derive(Debug, Clone)]
pub struct TeamMemberInput {
    pub name: String,
    pub phone: String,
    pub college: Option<String>,
}

/// A complete group submission: leader plus zero or more teammates.
#[derive(Debug, Clone)]
pub struct GroupRegistration {
    pub leader_name: String,
    pub leader_phone: String,
    pub college: Option<String>,
    pub interest: Interest,
    pub members: Vec<TeamMemberInput>,
}

/// The created group record plus the registrant records created with it.
#[derive(Debug, Clone)]
pub struct RegisteredGroup {
    pub group: Group,
    pub members: Vec<Registrant>,
}

/// Register a pre-formed group.
///
/// Any insert failure rolls back every registrant inserted so far in this
/// call (best-effort, sequential) and reports the triggering error: a
/// uniqueness violation becomes `AlreadyRegistered` carrying the offending
/// phone, anything else a generic registration failure.
pub async fn register_group<S>(store: &S, input: GroupRegistration) -> Result<RegisteredGroup>
where
    S: RegistrantStore + GroupStore + ?Sized,
{
    let mut rows = Vec::with_capacity(input.members.len() + 1);
    rows.push(NewRegistrant {
        name: input.leader_name.clone(),
        college: input.college.clone(),
        phone: input.leader_phone.clone(),
        interest: input.interest,
        assigned: true,
        group_id: None,
        is_dummy: false,
        created_at: Utc::now(),
    });
    for member in &input.members {
        rows.push(NewRegistrant {
            name: member.name.clone(),
            college: member.college.clone().or_else(|| input.college.clone()),
            phone: member.phone.clone(),
            interest: input.interest,
            assigned: true,
            group_id: None,
            is_dummy: false,
            created_at: Utc::now(),
        });
    }

    let mut created: Vec<Registrant> = Vec::with_capacity(rows.len());
    for row in rows {
        let phone = row.phone.clone();
        match store.insert_registrant(row).await {
            Ok(registrant) => created.push(registrant),
            Err(err) => {
                rollback_registrants(store, &created).await;
                return Err(if err.is_conflict() {
                    Error::AlreadyRegistered { phone }
                } else {
                    error!(%phone, %err, "group member insert failed");
                    Error::Registration("فشل التسجيل. حاول مرة أخرى.".into())
                });
            }
        }
    }

    let name = generate_group_name();
    let member_ids: Vec<Uuid> = created.iter().map(|r| r.id).collect();
    let group = match store
        .insert_group(NewGroup {
            name,
            members: member_ids.clone(),
            member_count: member_ids.len(),
            created_at: Utc::now(),
        })
        .await
    {
        Ok(group) => group,
        Err(err) => {
            error!(%err, "group insert failed after member registration");
            rollback_registrants(store, &created).await;
            return Err(Error::GroupCreation);
        }
    };

    // Backfill the group reference; the rows are already marked assigned.
    if let Err(err) = store
        .update_registrants(
            &RegistrantFilter::by_ids(member_ids),
            &RegistrantPatch::set_group(group.id),
        )
        .await
    {
        error!(group = %group.name, %err, "failed to backfill group reference");
    }

    info!(group = %group.name, members = created.len(), "group registered");
    Ok(RegisteredGroup {
        group,
        members: created,
    })
}

/// Group name for a self-registered team: a random theme plus the low four
/// digits of the current timestamp.
fn generate_group_name() -> String {
    let theme = random_theme(&mut rand::rng());
    let suffix = Utc::now().timestamp_millis().unsigned_abs() % 10_000;
    format!("{theme} #{suffix:04}")
}

/// Compensating deletes for a partially completed registration. Every delete
/// is attempted even if an earlier one fails; failures are logged, and the
/// caller reports the error that triggered the rollback, not ours.
async fn rollback_registrants<S>(store: &S, created: &[Registrant])
where
    S: RegistrantStore + ?Sized,
{
    for registrant in created {
        if let Err(err) = store
            .delete_registrants(&RegistrantFilter::by_id(registrant.id))
            .await
        {
            error!(id = %registrant.id, %err, "compensating delete failed during rollback");
        }
    }
}

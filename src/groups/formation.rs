//! Group formation and reshuffle orchestrators

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::balance::{build_balanced_groups, ProposedGroup};
use crate::error::{Error, Result};
use crate::store::{
    Group, GroupStore, NewGroup, RegistrantFilter, RegistrantPatch, RegistrantStore,
};

/// Visual marker for groups of real registrants.
pub const REAL_GROUP_PREFIX: &str = "🎯";
/// Marker distinguishing groups built from synthetic test entrants.
pub const TEST_GROUP_PREFIX: &str = "🤖 Test";

/// Result of a formation run. Groups whose insert failed are skipped rather
/// than aborting the run, but the caller gets to see how many were lost.
#[derive(Debug, Default)]
pub struct FormationOutcome {
    pub created: Vec<Group>,
    pub skipped: usize,
}

/// Form groups from every currently unassigned registrant.
///
/// Real and synthetic registrants are balanced as independent cohorts so a
/// test entrant never lands in a real group. Fails with `NothingToGroup` when
/// the unassigned pool is empty, before any write is issued.
pub async fn form_groups<S>(store: &S, group_size: usize) -> Result<FormationOutcome>
where
    S: RegistrantStore + GroupStore + ?Sized,
{
    let unassigned = store
        .query_registrants(&RegistrantFilter::unassigned())
        .await?;
    if unassigned.is_empty() {
        return Err(Error::NothingToGroup);
    }

    let (real, synthetic): (Vec<_>, Vec<_>) =
        unassigned.into_iter().partition(|r| !r.is_dummy);
    info!(
        real = real.len(),
        synthetic = synthetic.len(),
        group_size,
        "forming groups"
    );

    let mut rng = rand::rng();
    let mut proposed = build_balanced_groups(&real, group_size, REAL_GROUP_PREFIX, &mut rng)?;
    proposed.extend(build_balanced_groups(
        &synthetic,
        group_size,
        TEST_GROUP_PREFIX,
        &mut rng,
    )?);

    persist_groups(store, proposed).await
}

/// Delete all groups, unassign everyone, then run a fresh formation with the
/// same group size. Destructive; prior group identities are not preserved.
pub async fn reshuffle_groups<S>(store: &S, group_size: usize) -> Result<FormationOutcome>
where
    S: RegistrantStore + GroupStore + ?Sized,
{
    super::maintenance::reset_groups(store).await?;
    form_groups(store, group_size).await
}

async fn persist_groups<S>(store: &S, proposed: Vec<ProposedGroup>) -> Result<FormationOutcome>
where
    S: RegistrantStore + GroupStore + ?Sized,
{
    let mut outcome = FormationOutcome::default();

    for group in proposed {
        let member_ids: Vec<Uuid> = group.members.iter().map(|m| m.id).collect();
        let inserted = match store
            .insert_group(NewGroup {
                name: group.name.clone(),
                members: member_ids.clone(),
                member_count: member_ids.len(),
                created_at: Utc::now(),
            })
            .await
        {
            Ok(inserted) => inserted,
            Err(err) => {
                warn!(group = %group.name, %err, "group insert failed, skipping group");
                outcome.skipped += 1;
                continue;
            }
        };

        // Only flip rows that are still unassigned; a concurrent formation run
        // must not double-assign the same registrant.
        let mut filter = RegistrantFilter::by_ids(member_ids.clone());
        filter.assigned = Some(false);
        match store
            .update_registrants(&filter, &RegistrantPatch::assign_to(inserted.id))
            .await
        {
            Ok(updated) if updated as usize != member_ids.len() => {
                warn!(
                    group = %inserted.name,
                    expected = member_ids.len(),
                    updated,
                    "some members were already assigned elsewhere"
                );
            }
            Ok(_) => {}
            Err(err) => {
                error!(group = %inserted.name, %err, "failed to mark group members assigned");
            }
        }

        outcome.created.push(inserted);
    }

    Ok(outcome)
}

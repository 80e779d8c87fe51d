//! Group and registrant maintenance operations

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::{
    Group, GroupFilter, GroupStore, Registrant, RegistrantFilter, RegistrantPatch, RegistrantStore,
};

/// A group with its current membership, derived by querying registrants by
/// group reference rather than trusting the creation-time snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct GroupWithMembers {
    #[serde(flatten)]
    pub group: Group,
    pub members: Vec<Registrant>,
}

/// All groups, newest first, each with its current members. A failed member
/// read degrades to an empty member list rather than failing the whole view.
pub async fn groups_with_members<S>(store: &S) -> Result<Vec<GroupWithMembers>>
where
    S: RegistrantStore + GroupStore + ?Sized,
{
    let groups = store.query_groups(&GroupFilter::all()).await?;
    let mut view = Vec::with_capacity(groups.len());
    for group in groups {
        let members = match store
            .query_registrants(&RegistrantFilter::by_group(group.id))
            .await
        {
            Ok(members) => members,
            Err(err) => {
                error!(group = %group.name, %err, "failed to fetch group members");
                Vec::new()
            }
        };
        view.push(GroupWithMembers { group, members });
    }
    Ok(view)
}

/// Delete every group and clear every registrant's assignment. Individual
/// unassign failures are logged; a failed group delete is fatal.
pub async fn reset_groups<S>(store: &S) -> Result<()>
where
    S: RegistrantStore + GroupStore + ?Sized,
{
    if let Err(err) = store
        .update_registrants(&RegistrantFilter::all(), &RegistrantPatch::unassign())
        .await
    {
        error!(%err, "failed to unassign registrants during reset");
    }
    let deleted = store.delete_groups(&GroupFilter::all()).await?;
    info!(deleted, "all groups deleted");
    Ok(())
}

/// Delete a single group, unassigning its members first.
pub async fn delete_group<S>(store: &S, group_id: Uuid) -> Result<()>
where
    S: RegistrantStore + GroupStore + ?Sized,
{
    let members = store
        .query_registrants(&RegistrantFilter::by_group(group_id))
        .await?;
    if !members.is_empty() {
        if let Err(err) = store
            .update_registrants(
                &RegistrantFilter::by_group(group_id),
                &RegistrantPatch::unassign(),
            )
            .await
        {
            warn!(%group_id, %err, "failed to unassign members before group delete");
        }
    }
    let deleted = store.delete_groups(&GroupFilter::by_id(group_id)).await?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("group {group_id}")));
    }
    Ok(())
}

/// Delete a single registrant record.
pub async fn delete_registrant<S>(store: &S, registrant_id: Uuid) -> Result<()>
where
    S: RegistrantStore + ?Sized,
{
    let deleted = store
        .delete_registrants(&RegistrantFilter::by_id(registrant_id))
        .await?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("registrant {registrant_id}")));
    }
    Ok(())
}

/// Delete every registrant and every group. Unassign and group-delete
/// failures are logged; a failed registrant delete is fatal.
pub async fn delete_all_registrants<S>(store: &S) -> Result<u64>
where
    S: RegistrantStore + GroupStore + ?Sized,
{
    if let Err(err) = store
        .update_registrants(&RegistrantFilter::all(), &RegistrantPatch::unassign())
        .await
    {
        error!(%err, "failed to unassign registrants before bulk delete");
    }
    if let Err(err) = store.delete_groups(&GroupFilter::all()).await {
        error!(%err, "failed to delete groups before bulk delete");
    }
    let deleted = store.delete_registrants(&RegistrantFilter::all()).await?;
    info!(deleted, "all registrants deleted");
    Ok(deleted)
}

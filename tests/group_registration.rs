//! Pre-formed group registration and its rollback discipline

use chrono::Utc;
use teamup::error::Error;
use teamup::groups::{register_group, GroupRegistration, TeamMemberInput};
use teamup::store::{Interest, MemoryStore, NewRegistrant, RegistrantStore};

fn member(name: &str, phone: &str) -> TeamMemberInput {
    TeamMemberInput {
        name: name.into(),
        phone: phone.into(),
        college: None,
    }
}

fn submission(members: Vec<TeamMemberInput>) -> GroupRegistration {
    GroupRegistration {
        leader_name: "Sara".into(),
        leader_phone: "01000000001".into(),
        college: Some("كلية الهندسة".into()),
        interest: Interest::Software,
        members,
    }
}

#[tokio::test]
async fn registers_leader_and_teammates_as_one_assigned_group() {
    let store = MemoryStore::new();
    let registered = register_group(
        &store,
        submission(vec![
            member("Ali", "01010000002"),
            member("Lina", "01030000004"),
        ]),
    )
    .await
    .unwrap();

    assert_eq!(registered.members.len(), 3);
    assert_eq!(registered.group.member_count, 3);
    // Leader comes first in the membership list.
    assert_eq!(registered.members[0].name, "Sara");
    assert_eq!(registered.group.members[0], registered.members[0].id);

    // All rows end up assigned with the group reference backfilled.
    let rows = store.registrant_snapshot();
    assert_eq!(rows.len(), 3);
    assert!(rows
        .iter()
        .all(|r| r.assigned && r.group_id == Some(registered.group.id)));

    // Teammates without their own college inherit the leader's.
    assert!(rows.iter().all(|r| r.college.as_deref() == Some("كلية الهندسة")));
}

#[tokio::test]
async fn conflict_mid_sequence_rolls_back_exactly_the_prior_inserts() {
    let store = MemoryStore::new();
    // Omar's phone is already taken.
    store
        .insert_registrant(NewRegistrant {
            name: "Existing".into(),
            college: None,
            phone: "01020000003".into(),
            interest: Interest::Other,
            assigned: false,
            group_id: None,
            is_dummy: false,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let err = register_group(
        &store,
        submission(vec![
            member("Ali", "01010000002"),
            member("Omar", "01020000003"),
            member("Lina", "01030000004"),
        ]),
    )
    .await
    .unwrap_err();

    match err {
        Error::AlreadyRegistered { phone } => assert_eq!(phone, "01020000003"),
        other => panic!("expected AlreadyRegistered, got {other:?}"),
    }

    // Sara and Ali were rolled back, Lina never inserted, no group created,
    // and the pre-existing row is untouched.
    let rows = store.registrant_snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Existing");
    assert!(store.group_snapshot().is_empty());
}

#[tokio::test]
async fn group_insert_failure_rolls_back_all_members() {
    let store = MemoryStore::new();
    store.fail_group_inserts(true);

    let err = register_group(&store, submission(vec![member("Ali", "01010000002")]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::GroupCreation));
    assert!(store.registrant_snapshot().is_empty());
    assert!(store.group_snapshot().is_empty());
}

#[tokio::test]
async fn a_leader_alone_is_a_valid_group() {
    let store = MemoryStore::new();
    let registered = register_group(&store, submission(Vec::new())).await.unwrap();
    assert_eq!(registered.group.member_count, 1);
    // "Theme #1234" style name.
    assert!(registered.group.name.contains('#'));
}

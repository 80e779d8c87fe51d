//! Group orchestration
//!
//! Persistence choreography around the balancer: forming groups from the
//! unassigned pool, reshuffling, self-registering pre-formed groups, and
//! group/registrant maintenance. All multi-step writes here are sequential
//! with explicit compensation; the store offers no client-visible
//! transactions, so rollback is best-effort and never masks the error that
//! triggered it.

pub mod formation;
pub mod maintenance;
pub mod registration;

pub use formation::{form_groups, reshuffle_groups, FormationOutcome};
pub use maintenance::{
    delete_all_registrants, delete_group, delete_registrant, groups_with_members, reset_groups,
    GroupWithMembers,
};
pub use registration::{register_group, GroupRegistration, RegisteredGroup, TeamMemberInput};

//! # TeamUp
//!
//! Registration and group-formation core for a bilingual (Arabic-first)
//! student competition platform. Persistence is delegated to a hosted
//! backend; this crate holds the balancing algorithm, the orchestration and
//! rollback choreography around it, and a CLI for the admin operations.
//!
//! ## Modules
//!
//! - `balance` - the group balancing algorithm (shuffle, interleave, chunk, name)
//! - `groups` - formation, reshuffle, self-registration and maintenance orchestrators
//! - `registration` - self-service registration, counts and the synthetic seeder
//! - `funding` - project-support applications and triage
//! - `store` - trait-based store layer with hosted (PostgREST) and in-memory backends
//! - `export` - CSV snapshot of groups with members
//! - `ratelimit` / `phone` - registration guards
//! - `session` - shared-PIN admin gate
//! - `watch` - best-effort registration counter polling
//! - `config` - TOML + environment configuration
//! - `cli` - clap command definitions and dispatch

pub mod balance;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod funding;
pub mod groups;
pub mod phone;
pub mod ratelimit;
pub mod registration;
pub mod session;
pub mod store;
pub mod watch;

pub use error::{Error, Result};

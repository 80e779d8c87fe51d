//! Command dispatch

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;

use super::args::{ApplicationCommands, Cli, Commands};
use crate::config::Config;
use crate::groups::{self, GroupRegistration, TeamMemberInput};
use crate::ratelimit::RateLimiter;
use crate::registration::{self, RegistrationRequest};
use crate::session::AdminGate;
use crate::store::SupabaseStore;
use crate::{export, funding, watch};

pub async fn execute_command(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let store = SupabaseStore::new(config.require_store()?)?;
    let limiter = RateLimiter::new(
        config.rate_limit.max_requests,
        Duration::from_secs(config.rate_limit.window_secs),
    );

    match cli.command {
        Commands::Register {
            name,
            phone,
            college,
            interest,
        } => {
            let registrant = registration::register_student(
                &store,
                &limiter,
                RegistrationRequest {
                    name,
                    college,
                    phone,
                    interest,
                },
            )
            .await?;
            println!("Registered {} ({})", registrant.name, registrant.phone);
        }
        Commands::RegisterGroup {
            leader_name,
            leader_phone,
            college,
            interest,
            members,
        } => {
            let members = members
                .iter()
                .map(|spec| parse_member_spec(spec))
                .collect::<Result<Vec<_>>>()?;
            let registered = groups::register_group(
                &store,
                GroupRegistration {
                    leader_name,
                    leader_phone,
                    college,
                    interest,
                    members,
                },
            )
            .await?;
            println!(
                "Created group \"{}\" with {} members",
                registered.group.name,
                registered.members.len()
            );
        }
        Commands::Seed { count, pin } => {
            require_admin(&config, &pin)?;
            for _ in 0..count {
                let registrant = registration::add_synthetic_registrant(&store).await?;
                println!("Seeded {} ({})", registrant.name, registrant.phone);
            }
        }
        Commands::List { pin } => {
            require_admin(&config, &pin)?;
            let registrants = registration::list_registrants(&store).await?;
            for r in &registrants {
                let marker = if r.is_dummy { " [test]" } else { "" };
                let assigned = if r.assigned { "assigned" } else { "unassigned" };
                println!(
                    "{}  {}  {}  {}  {}{marker}",
                    r.id, r.name, r.phone, r.interest, assigned
                );
            }
            println!("{} registrants", registrants.len());
        }
        Commands::Count => {
            println!("{}", registration::registration_count(&store).await);
        }
        Commands::Groups { pin } => {
            require_admin(&config, &pin)?;
            let view = groups::groups_with_members(&store).await?;
            for entry in &view {
                println!("{} ({} members)", entry.group.name, entry.members.len());
                for member in &entry.members {
                    println!("  - {} ({})", member.name, member.phone);
                }
            }
            println!("{} groups", view.len());
        }
        Commands::FormGroups { size, pin } => {
            require_admin(&config, &pin)?;
            let outcome = groups::form_groups(&store, size).await?;
            report_formation(&outcome);
        }
        Commands::Reshuffle { size, pin } => {
            require_admin(&config, &pin)?;
            let outcome = groups::reshuffle_groups(&store, size).await?;
            report_formation(&outcome);
        }
        Commands::Reset { pin } => {
            require_admin(&config, &pin)?;
            groups::reset_groups(&store).await?;
            println!("All groups deleted, everyone unassigned");
        }
        Commands::DeleteGroup { id, pin } => {
            require_admin(&config, &pin)?;
            groups::delete_group(&store, id).await?;
            println!("Deleted group {id}");
        }
        Commands::DeleteStudent { id, pin } => {
            require_admin(&config, &pin)?;
            groups::delete_registrant(&store, id).await?;
            println!("Deleted registrant {id}");
        }
        Commands::DeleteAll { pin } => {
            require_admin(&config, &pin)?;
            let deleted = groups::delete_all_registrants(&store).await?;
            println!("Deleted {deleted} registrants");
        }
        Commands::Export { output, pin } => {
            require_admin(&config, &pin)?;
            let view = groups::groups_with_members(&store).await?;
            export::write_csv_file(&output, &view)?;
            let rows: usize = view.iter().map(|g| g.members.len()).sum();
            println!("Wrote {} rows to {}", rows, output.display());
        }
        Commands::Applications { command } => match command {
            ApplicationCommands::List { pin } => {
                require_admin(&config, &pin)?;
                let applications = funding::list_applications(&store).await?;
                for app in &applications {
                    println!(
                        "{}  {}  {}  {}",
                        app.id, app.project_name, app.team_name, app.status
                    );
                }
                println!("{} applications", applications.len());
            }
            ApplicationCommands::Show { id, pin } => {
                require_admin(&config, &pin)?;
                let full = funding::application_with_members(&store, id).await?;
                println!("{}", serde_json::to_string_pretty(&full)?);
            }
            ApplicationCommands::SetStatus { id, status, pin } => {
                require_admin(&config, &pin)?;
                let updated = funding::set_application_status(&store, id, status).await?;
                println!("Application {} is now {}", updated.id, updated.status);
            }
        },
        Commands::Watch { interval } => {
            info!(interval, "watching registration count, Ctrl-C to stop");
            let store = Arc::new(store);
            let watcher = watch::watch_registration_count(
                store,
                Duration::from_secs(interval.max(1)),
                |count| println!("{count} registrations"),
            );
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for Ctrl-C")?;
            watcher.stop();
        }
    }

    Ok(())
}

fn require_admin(config: &Config, pin: &str) -> Result<()> {
    let Some(expected) = config.admin_pin.as_deref() else {
        bail!("no admin PIN configured; set admin_pin in teamup.toml or TEAMUP_ADMIN_PIN");
    };
    AdminGate::new(expected).authenticate(pin)?;
    Ok(())
}

fn report_formation(outcome: &groups::FormationOutcome) {
    for group in &outcome.created {
        println!("{} ({} members)", group.name, group.member_count);
    }
    println!("Created {} groups", outcome.created.len());
    if outcome.skipped > 0 {
        println!("Skipped {} groups that failed to insert", outcome.skipped);
    }
}

/// Parse a teammate spec of the form `name:phone` or `name:phone:college`.
fn parse_member_spec(spec: &str) -> Result<TeamMemberInput> {
    let mut parts = spec.splitn(3, ':');
    let name = parts.next().unwrap_or_default().trim();
    let phone = parts.next().unwrap_or_default().trim();
    if name.is_empty() || phone.is_empty() {
        bail!("invalid member spec {spec:?}, expected name:phone[:college]");
    }
    Ok(TeamMemberInput {
        name: name.to_string(),
        phone: phone.to_string(),
        college: parts.next().map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_spec_with_college() {
        let member = parse_member_spec("Ali:01010000002:كلية التجارة").unwrap();
        assert_eq!(member.name, "Ali");
        assert_eq!(member.phone, "01010000002");
        assert_eq!(member.college.as_deref(), Some("كلية التجارة"));
    }

    #[test]
    fn member_spec_without_college() {
        let member = parse_member_spec("Ali:01010000002").unwrap();
        assert!(member.college.is_none());
    }

    #[test]
    fn malformed_member_spec_is_rejected() {
        assert!(parse_member_spec("Ali").is_err());
        assert!(parse_member_spec(":01010000002").is_err());
    }
}

//! Argument parsing structures

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::store::{ApplicationStatus, Interest};

/// TeamUp registration and group management
#[derive(Parser, Debug)]
#[command(name = "teamup")]
#[command(about = "Student registration and balanced group formation", long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file (default: teamup.toml)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a single student
    Register {
        #[arg(long)]
        name: String,
        /// Egyptian mobile number (e.g. 01012345678)
        #[arg(long)]
        phone: String,
        #[arg(long)]
        college: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(Interest))]
        interest: Interest,
    },
    /// Register a pre-formed group (leader plus teammates)
    RegisterGroup {
        #[arg(long)]
        leader_name: String,
        #[arg(long)]
        leader_phone: String,
        #[arg(long)]
        college: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(Interest))]
        interest: Interest,
        /// Teammate as "name:phone" or "name:phone:college"; repeatable
        #[arg(long = "member")]
        members: Vec<String>,
    },
    /// Seed synthetic test registrants
    Seed {
        /// How many to create
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,
        #[arg(long)]
        pin: String,
    },
    /// List all registrants, newest first
    List {
        #[arg(long)]
        pin: String,
    },
    /// Show the total registration count
    Count,
    /// Show all groups with their members
    Groups {
        #[arg(long)]
        pin: String,
    },
    /// Form balanced groups from all unassigned registrants
    FormGroups {
        /// Members per group
        #[arg(short = 's', long, default_value = "5")]
        size: usize,
        #[arg(long)]
        pin: String,
    },
    /// Delete all groups and re-form from scratch
    Reshuffle {
        #[arg(short = 's', long, default_value = "5")]
        size: usize,
        #[arg(long)]
        pin: String,
    },
    /// Delete all groups and unassign everyone
    Reset {
        #[arg(long)]
        pin: String,
    },
    /// Delete one group, unassigning its members
    DeleteGroup {
        id: Uuid,
        #[arg(long)]
        pin: String,
    },
    /// Delete one registrant
    DeleteStudent {
        id: Uuid,
        #[arg(long)]
        pin: String,
    },
    /// Delete every registrant and every group
    DeleteAll {
        #[arg(long)]
        pin: String,
    },
    /// Export groups with members to CSV
    Export {
        /// Output file path
        #[arg(short = 'o', long, default_value = "teamup-export.csv")]
        output: PathBuf,
        #[arg(long)]
        pin: String,
    },
    /// Project-funding application triage
    Applications {
        #[command(subcommand)]
        command: ApplicationCommands,
    },
    /// Watch the registration count and print changes
    Watch {
        /// Poll interval in seconds
        #[arg(long, default_value = "10")]
        interval: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ApplicationCommands {
    /// List all applications
    List {
        #[arg(long)]
        pin: String,
    },
    /// Show one application with its team members
    Show {
        id: Uuid,
        #[arg(long)]
        pin: String,
    },
    /// Update an application's status
    SetStatus {
        id: Uuid,
        #[arg(value_parser = clap::value_parser!(ApplicationStatus))]
        status: ApplicationStatus,
        #[arg(long)]
        pin: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_register_command() {
        let cli = Cli::parse_from([
            "teamup", "register", "--name", "Sara", "--phone", "01012345678", "--interest",
            "software",
        ]);
        match cli.command {
            Commands::Register {
                name,
                phone,
                interest,
                college,
            } => {
                assert_eq!(name, "Sara");
                assert_eq!(phone, "01012345678");
                assert_eq!(interest, Interest::Software);
                assert!(college.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_form_groups_with_default_size() {
        let cli = Cli::parse_from(["teamup", "form-groups", "--pin", "4921"]);
        match cli.command {
            Commands::FormGroups { size, pin } => {
                assert_eq!(size, 5);
                assert_eq!(pin, "4921");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_repeated_group_members() {
        let cli = Cli::parse_from([
            "teamup",
            "register-group",
            "--leader-name",
            "Sara",
            "--leader-phone",
            "01000000001",
            "--interest",
            "marketing",
            "--member",
            "Ali:01010000002",
            "--member",
            "Omar:01020000003:كلية التجارة",
        ]);
        match cli.command {
            Commands::RegisterGroup { members, .. } => assert_eq!(members.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_application_status() {
        let id = uuid::Uuid::new_v4().to_string();
        let cli = Cli::parse_from([
            "teamup",
            "applications",
            "set-status",
            id.as_str(),
            "accepted",
            "--pin",
            "4921",
        ]);
        match cli.command {
            Commands::Applications {
                command: ApplicationCommands::SetStatus { status, .. },
            } => assert_eq!(status, ApplicationStatus::Accepted),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

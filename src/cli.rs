use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::{Outcome, RequestStatus, Role};

/// Gate pass service: exit requests, moderator decisions and gate verification
#[derive(Parser)]
#[command(name = "gatepass", version, about)]
pub struct Cli {
    /// Path of the JSON document
    #[arg(long, global = true, env = "GATEPASS_DB_FILE")]
    pub db_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind
        #[arg(short, long, env = "GATEPASS_PORT")]
        port: Option<u16>,
    },

    /// Inspect and decide pass requests
    Request {
        #[command(subcommand)]
        command: RequestCommands,
    },

    /// Manage login accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum RequestCommands {
    /// List requests, newest first
    List {
        #[arg(long, conflicts_with = "requester", default_value = "pending")]
        status: RequestStatus,
        /// Show every request submitted by this requester instead
        #[arg(long)]
        requester: Option<String>,
    },
    /// Approve a pending request
    Approve {
        id: String,
        #[arg(long)]
        reviewer: String,
        #[arg(long)]
        remarks: Option<String>,
    },
    /// Reject a pending request
    Reject {
        id: String,
        #[arg(long)]
        reviewer: String,
        #[arg(long)]
        remarks: Option<String>,
    },
    /// Check whether a pass id is currently valid
    Verify { id: String },
}

impl RequestCommands {
    /// The outcome carried by an approve/reject command.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            RequestCommands::Approve { .. } => Some(Outcome::Approved),
            RequestCommands::Reject { .. } => Some(Outcome::Rejected),
            _ => None,
        }
    }
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a login account
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// requester, moderator or gatekeeper
        #[arg(long)]
        role: Role,
    },
    /// List login accounts
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_flags_fall_back_to_env() {
        let cmd = Cli::command();
        let env_of = |cmd: &clap::Command, id: &str| {
            cmd.get_arguments()
                .find(|a| a.get_id() == id)
                .and_then(|a| a.get_env())
                .map(|e| e.to_string_lossy().into_owned())
        };

        assert_eq!(env_of(&cmd, "db_file").as_deref(), Some("GATEPASS_DB_FILE"));
        let serve = cmd.find_subcommand("serve").unwrap();
        assert_eq!(env_of(serve, "port").as_deref(), Some("GATEPASS_PORT"));
    }

    #[test]
    fn test_no_subcommand_serves() {
        let cli = Cli::try_parse_from(["gatepass"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.db_file.is_none());
    }

    #[test]
    fn test_parse_approve() {
        let cli = Cli::try_parse_from([
            "gatepass",
            "--db-file",
            "/tmp/db.json",
            "request",
            "approve",
            "GP1",
            "--reviewer",
            "mod1",
        ])
        .unwrap();
        assert_eq!(cli.db_file, Some(PathBuf::from("/tmp/db.json")));
        match cli.command {
            Some(Commands::Request { command }) => {
                assert_eq!(command.outcome(), Some(Outcome::Approved));
                match command {
                    RequestCommands::Approve { id, reviewer, remarks } => {
                        assert_eq!(id, "GP1");
                        assert_eq!(reviewer, "mod1");
                        assert!(remarks.is_none());
                    }
                    _ => panic!("expected approve"),
                }
            }
            _ => panic!("expected request command"),
        }
    }

    #[test]
    fn test_parse_list_status_and_role() {
        let cli = Cli::try_parse_from(["gatepass", "request", "list", "--status", "approved"])
            .unwrap();
        match cli.command {
            Some(Commands::Request {
                command: RequestCommands::List { status, requester },
            }) => {
                assert_eq!(status, RequestStatus::Approved);
                assert!(requester.is_none());
            }
            _ => panic!("expected list"),
        }

        assert!(Cli::try_parse_from([
            "gatepass", "user", "add", "--username", "g", "--password", "p", "--role", "janitor",
        ])
        .is_err());
    }
}

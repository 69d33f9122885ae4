use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "roster")]
#[command(about = "Admin console for the user roster", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the user service
    #[arg(long, global = true, env = "ROSTER_API_BASE_URL")]
    pub api_url: Option<String>,

    /// Show timing/latency information
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List every user
    List,
    /// Create a user; missing fields are prompted for
    Create {
        #[arg(long)]
        name: Option<String>,

        #[arg(long, short = 'u')]
        username: Option<String>,

        #[arg(long, short = 'e')]
        email: Option<String>,

        #[arg(long, short = 'p')]
        phone: Option<String>,

        /// One of: cashier, admin, manager, superadmin
        #[arg(long, short = 'r')]
        role: Option<String>,
    },
    /// Delete a user after retyping their username
    Delete {
        username: String,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_delete_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "roster",
            "users",
            "delete",
            "bob",
            "--api-url",
            "http://10.0.0.2:4000",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.api_url.as_deref(), Some("http://10.0.0.2:4000"));
        assert!(matches!(
            cli.command,
            Commands::Users {
                command: UsersCommand::Delete { ref username }
            } if username == "bob"
        ));
    }

    #[test]
    fn create_flags_are_optional() {
        let cli = Cli::try_parse_from(["roster", "users", "create", "-u", "ada", "-r", "admin"])
            .unwrap();
        let Commands::Users {
            command:
                UsersCommand::Create {
                    name,
                    username,
                    role,
                    ..
                },
        } = cli.command
        else {
            panic!("expected users create");
        };
        assert_eq!(name, None);
        assert_eq!(username.as_deref(), Some("ada"));
        assert_eq!(role.as_deref(), Some("admin"));
    }

    #[test]
    fn delete_requires_a_username() {
        assert!(Cli::try_parse_from(["roster", "users", "delete"]).is_err());
    }

    #[test]
    fn a_subcommand_is_required() {
        assert!(Cli::try_parse_from(["roster"]).is_err());
    }
}

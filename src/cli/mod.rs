// ABOUTME: CLI argument parsing and command routing for cardiocheck
//
// Provides command-line interface for:
// - Account management (login, register, logout, whoami, profile)
// - Running an assessment non-interactively (predict)
// - Listing the assessment fields (fields)
// - Launching TUI (tui, default)

pub mod auth;
pub mod fields;
pub mod predict;
pub mod util;

use clap::{Parser, Subcommand, ValueEnum};

use crate::api::EditUserDetailsRequest;

/// Heart disease risk assessment from the terminal
#[derive(Parser)]
#[command(name = "cardiocheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Launch the TUI (default if no command given)
    Tui(LocationArgs),

    /// Sign in and remember the session
    Login(LoginArgs),

    /// Create an account and sign in
    Register(RegisterArgs),

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Update the signed-in user's profile
    Profile(ProfileArgs),

    /// Run an assessment without the TUI
    Predict(PredictArgs),

    /// List assessment fields grouped by step
    Fields,
}

/// Location used for nearby hospital lookup; overrides `[location]` in config
#[derive(clap::Args, Default)]
pub struct LocationArgs {
    /// Latitude for nearby hospital lookup
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude for nearby hospital lookup
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,
}

/// Arguments for the login command
#[derive(clap::Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

/// Arguments for the register command
#[derive(clap::Args)]
pub struct RegisterArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

/// Arguments for the profile command; only the given fields change
#[derive(clap::Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,
}

impl ProfileArgs {
    /// Blank values are dropped; the service ignores them anyway
    pub fn into_request(self) -> EditUserDetailsRequest {
        let keep = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        EditUserDetailsRequest {
            first_name: keep(self.first_name),
            last_name: keep(self.last_name),
            username: keep(self.username),
            phone_number: keep(self.phone),
        }
    }
}

/// Arguments for the predict command
#[derive(clap::Args)]
pub struct PredictArgs {
    /// Field value as name=value, repeatable (e.g. --set age=54 --set cp=2)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub values: Vec<String>,

    #[command(flatten)]
    pub location: LocationArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_args_drop_blank_values() {
        let cli = Cli::parse_from(["cardiocheck", "profile", "--first-name", " Ada ", "--phone", "  "]);
        let Some(Commands::Profile(args)) = cli.command else {
            panic!("expected profile command");
        };

        let request = args.into_request();
        assert_eq!(request.first_name.as_deref(), Some("Ada"));
        assert_eq!(request.phone_number, None);
        assert!(!request.is_empty());
    }
}

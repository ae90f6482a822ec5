//! Command-line surface.

use clap::{Args, Parser, Subcommand};
use labdash_core::Period;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "labdash", about = "labdash: lab-register users and pGina access logs", version)]
pub struct Cli {
    /// Write debug logs to the configured debug file (tail -f to inspect).
    #[arg(long, global = true)]
    pub debug: bool,

    /// Override `[api] base_url` from config.toml.
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Override where the session token is kept.
    #[arg(long, global = true, value_name = "PATH")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authenticate and store the session.
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show who is logged in.
    Whoami,
    /// Manage user accounts (administrators only).
    #[command(subcommand)]
    Users(UsersCommand),
    /// List the pGina access log.
    Logs {
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Access statistics for a period and a yearly breakdown.
    Dashboard(DashboardArgs),
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    List {
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Case-insensitive filter over user name, email, name and surnames.
        #[arg(long)]
        search: Option<String>,
    },
    Create(CreateUserArgs),
    Activate {
        id: i64,
    },
    Deactivate {
        id: i64,
    },
    /// Bulk-create users from a .csv, .xlsx, .xls or .ods file.
    Import {
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct CreateUserArgs {
    #[arg(long)]
    pub user_name: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub apellido_paterno: String,
    #[arg(long)]
    pub apellido_materno: String,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// 7days, 30days, week or month. Defaults to `[dashboard] default_period`.
    #[arg(long)]
    pub period: Option<Period>,
    /// Year of the monthly breakdown. Defaults to the newest year with data.
    #[arg(long)]
    pub year: Option<i32>,
    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

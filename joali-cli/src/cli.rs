//! Command-line definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command-line client for the Joali booking API
#[derive(Debug, Parser)]
#[command(name = "joali")]
#[command(about = "Sign in to the Joali booking backend and manage bookings", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Session file, overrides the config file
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        email: String,

        #[arg(long, env = "JOALI_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// End the session on the backend and locally
    Logout,

    /// Show the signed-in identity
    Whoami,

    /// Register a customer account
    Register(RegisterArgs),

    /// Replace a temporary password
    ResetPassword {
        email: String,

        #[arg(long)]
        temporary_key: String,

        #[arg(long, env = "JOALI_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },

    /// Manage user accounts
    #[command(subcommand)]
    Users(UserCommands),

    /// Manage organizations
    #[command(subcommand)]
    #[command(alias = "organizations")]
    Orgs(OrgCommands),

    /// Manage bookable services
    #[command(subcommand)]
    Services(ServiceCommands),

    /// Place and manage bookings
    #[command(subcommand)]
    Orders(OrderCommands),
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long, env = "JOALI_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Subcommand)]
pub enum UserCommands {
    /// List all users
    #[command(alias = "ls")]
    List,

    /// Activate or deactivate a user
    Toggle { email: String },

    /// Create a staff account
    NewStaff {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        org_id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum OrgCommands {
    /// List organizations
    #[command(alias = "ls")]
    List {
        /// Only organizations of this type
        #[arg(long = "type")]
        org_type: Option<i32>,
    },

    /// Show one organization
    Get { id: i64 },

    /// Create an organization
    Create(NewOrgArgs),

    /// Activate or deactivate an organization
    Toggle { id: i64 },
}

#[derive(Debug, Args)]
pub struct NewOrgArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub registration_number: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub address: String,

    #[arg(long)]
    pub country: String,

    #[arg(long)]
    pub website: Option<String>,

    #[arg(long = "type")]
    pub org_type: i32,
}

#[derive(Debug, Subcommand)]
pub enum ServiceCommands {
    /// List services
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        org_id: Option<i64>,

        #[arg(long)]
        type_id: Option<i64>,
    },

    /// Create a service
    Create(NewServiceArgs),

    /// Create a service type
    CreateType { name: String },
}

#[derive(Debug, Args)]
pub struct NewServiceArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long)]
    pub price: f64,

    #[arg(long)]
    pub org_id: i64,

    #[arg(long)]
    pub type_id: i64,

    #[arg(long, default_value = "1")]
    pub capacity: i32,

    #[arg(long, default_value = "60")]
    pub duration: i32,
}

#[derive(Debug, Subcommand)]
pub enum OrderCommands {
    /// Book a service now
    Place {
        service_id: i64,

        #[arg(long, default_value = "1")]
        quantity: u32,
    },

    /// List my bookings
    #[command(alias = "ls")]
    List,

    /// Show one booking
    Get { id: i64 },

    /// Cancel a booking
    Cancel { id: i64 },
}

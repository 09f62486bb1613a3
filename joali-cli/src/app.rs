//! Application state and command handlers

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use serde_json::json;

use joali_core::models::{
    CustomerRegistration, NewOrganization, NewService, NewServiceOrder, NewStaff, ServiceFilter,
};
use joali_core::{Config, FileStorage, JoaliClient, Session, TokenClaims};

use crate::cli::{
    Commands, GlobalArgs, NewOrgArgs, NewServiceArgs, OrderCommands, OrgCommands, RegisterArgs,
    ServiceCommands, UserCommands,
};

/// Main application struct
pub struct App {
    /// Backend client bound to the persisted session
    client: JoaliClient,
}

impl App {
    /// Load configuration and open the persisted session
    pub fn new(global: &GlobalArgs) -> anyhow::Result<Self> {
        let mut config = load_config(global)?;
        if let Some(base_url) = &global.base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(path) = &global.session_file {
            config.session.path = Some(path.clone());
        }
        if config.api.api_key.is_empty() {
            tracing::warn!("No API key configured; set api.api_key or JOALI_API_KEY");
        }

        let session_path = config.session_path()?;
        let storage = FileStorage::open(&session_path)
            .with_context(|| format!("Failed to open session file {}", session_path.display()))?;
        tracing::debug!(path = %storage.path().display(), "Session storage opened");

        let session = Session::new(Arc::new(storage));
        let client = JoaliClient::new(&config, session)?;

        Ok(Self { client })
    }

    pub async fn run(&self, command: Commands) -> anyhow::Result<()> {
        match command {
            Commands::Login { email, password } => {
                let identity = self.client.login(&email, &password).await?;
                tracing::info!(role = ?identity.role, "Signed in");
                print_json(&json!({
                    "userId": identity.user_id,
                    "userName": identity.user_name,
                    "role": identity.role,
                }))
            }
            Commands::Logout => print_json(&self.client.logout().await?),
            Commands::Whoami => self.whoami(),
            Commands::Register(args) => self.register(args).await,
            Commands::ResetPassword {
                email,
                temporary_key,
                new_password,
            } => print_json(
                &self
                    .client
                    .reset_initial_password(&email, &temporary_key, &new_password)
                    .await?,
            ),
            Commands::Users(command) => self.users(command).await,
            Commands::Orgs(command) => self.orgs(command).await,
            Commands::Services(command) => self.services(command).await,
            Commands::Orders(command) => self.orders(command).await,
        }
    }

    fn whoami(&self) -> anyhow::Result<()> {
        let session = self.client.session();
        let identity = session.identity();
        let expires_at = session
            .access_token()
            .and_then(|token| TokenClaims::peek(&token).ok())
            .and_then(|claims| claims.expires_at);

        print_json(&json!({
            "authenticated": session.is_authenticated(),
            "baseUrl": self.client.base_url(),
            "userId": identity.user_id,
            "userName": identity.user_name,
            "role": identity.role,
            "expiresAt": expires_at.map(|at| at.to_rfc3339()),
        }))
    }

    async fn register(&self, args: RegisterArgs) -> anyhow::Result<()> {
        let params = CustomerRegistration {
            name: args.name,
            email: args.email,
            phone: args.phone,
            password_confirm: args.password.clone(),
            password: args.password,
        };
        print_json(&self.client.customer_register(&params).await?)
    }

    async fn users(&self, command: UserCommands) -> anyhow::Result<()> {
        match command {
            UserCommands::List => print_json(&self.client.get_all_users().await?),
            UserCommands::Toggle { email } => print_json(&self.client.toggle_user(&email).await?),
            UserCommands::NewStaff {
                name,
                email,
                phone,
                org_id,
            } => {
                let staff = NewStaff {
                    name,
                    email,
                    phone_number: phone,
                    org_id,
                };
                print_json(&self.client.create_staff(&staff).await?)
            }
        }
    }

    async fn orgs(&self, command: OrgCommands) -> anyhow::Result<()> {
        match command {
            OrgCommands::List { org_type } => {
                print_json(&self.client.get_all_organizations(org_type).await?)
            }
            OrgCommands::Get { id } => {
                print_json(&self.client.get_organization_by_id(id).await?)
            }
            OrgCommands::Create(args) => {
                let org = new_organization(args);
                print_json(&self.client.create_organization(&org).await?)
            }
            OrgCommands::Toggle { id } => print_json(&self.client.toggle_organization(id).await?),
        }
    }

    async fn services(&self, command: ServiceCommands) -> anyhow::Result<()> {
        match command {
            ServiceCommands::List { org_id, type_id } => {
                let filter = service_filter(org_id, type_id);
                print_json(&self.client.get_all_services(&filter).await?)
            }
            ServiceCommands::Create(args) => {
                let service = new_service(args);
                print_json(&self.client.create_service(&service).await?)
            }
            ServiceCommands::CreateType { name } => {
                print_json(&self.client.create_service_type(&name).await?)
            }
        }
    }

    async fn orders(&self, command: OrderCommands) -> anyhow::Result<()> {
        match command {
            OrderCommands::Place {
                service_id,
                quantity,
            } => {
                anyhow::ensure!(quantity > 0, "Quantity must be at least 1");
                let order = NewServiceOrder::now(service_id, quantity);
                print_json(&self.client.place_service_order(&order).await?)
            }
            OrderCommands::List => print_json(&self.client.get_my_orders().await?),
            OrderCommands::Get { id } => print_json(&self.client.get_service_order(id).await?),
            OrderCommands::Cancel { id } => {
                print_json(&self.client.cancel_service_order(id).await?)
            }
        }
    }
}

fn load_config(global: &GlobalArgs) -> anyhow::Result<Config> {
    let config = match &global.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        }),
    };
    Ok(config.with_env_overrides())
}

fn service_filter(org_id: Option<i64>, type_id: Option<i64>) -> ServiceFilter {
    let filter = org_id.map(ServiceFilter::for_organization).unwrap_or_default();
    match type_id {
        Some(type_id) => filter.with_type(type_id),
        None => filter,
    }
}

fn new_organization(args: NewOrgArgs) -> NewOrganization {
    NewOrganization {
        name: args.name,
        registration_number: args.registration_number,
        email: args.email,
        phone: args.phone,
        address: args.address,
        country: args.country,
        website: args.website,
        logo_url: None,
        org_type: args.org_type,
    }
}

fn new_service(args: NewServiceArgs) -> NewService {
    NewService {
        name: args.name,
        description: args.description,
        price: args.price,
        org_id: args.org_id,
        service_type_id: args.type_id,
        capacity: args.capacity,
        duration_in_minutes: args.duration,
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! joali: command-line client for the Joali booking backend
//!
//! Signs in against the REST API, keeps the session in a file between
//! invocations and prints every result as JSON on stdout. Logs go to stderr.

mod app;
mod cli;

use clap::Parser;
use joali_core::ApiError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing on stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "joali_cli=info,joali_core=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let app = App::new(&cli.global)?;
    let result = app.run(cli.command).await;

    if let Err(e) = &result
        && e.downcast_ref::<ApiError>().is_some_and(ApiError::is_unauthorized)
    {
        tracing::warn!("Session is no longer valid, run `joali login` to sign in again");
    }
    result
}

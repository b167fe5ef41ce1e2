//! Register the linked-role metadata schema with Discord.
//!
//! Run once per application, and again whenever the schema changes:
//!
//! ```text
//! DISCORD_TOKEN=... DISCORD_CLIENT_ID=... cargo run --bin register-metadata
//! ```

use linked_roles_discord::config::required_var;
use linked_roles_discord::metadata::default_schema;
use linked_roles_discord::{DiscordConfig, SchemaRegistrar};
use linked_roles_server::telemetry::init_tracing;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(accepted) => {
            println!("{accepted}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Metadata schema registration failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<String> {
    let bot_token = required_var("DISCORD_TOKEN")?;
    let config = DiscordConfig::from_env()?;

    let schema = default_schema();
    info!(
        application_id = %config.client_id,
        fields = schema.len(),
        "Registering metadata schema"
    );

    let registrar = SchemaRegistrar::new(config)?;
    let accepted = registrar.register(&bot_token, &schema).await?;

    Ok(serde_json::to_string_pretty(&accepted)?)
}

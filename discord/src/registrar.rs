//! Application role-connection schema registration.

use crate::config::DiscordConfig;
use crate::error::{Operation, Result};
use crate::metadata::MetadataField;
use crate::request;
use reqwest::Client;

/// Declares the metadata fields that server admins can gate roles on.
///
/// Registration replaces the whole schema, so `register` is normally called
/// once per deployment with the complete field list.
#[derive(Debug, Clone)]
pub struct SchemaRegistrar {
    config: DiscordConfig,
    http_client: Client,
}

impl SchemaRegistrar {
    /// Create a registrar for the configured application.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Configuration`](crate::LinkedRoleError::Configuration)
    /// if the HTTP client cannot be built.
    pub fn new(config: DiscordConfig) -> Result<Self> {
        let http_client = request::build_client(config.request_timeout)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Replace the application's schema with `fields`, authenticating as the bot.
    ///
    /// Returns the schema as accepted by Discord.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkedRoleError::Provider`](crate::LinkedRoleError::Provider)
    /// tagged `schema-registration`; the response body is logged.
    pub async fn register(
        &self,
        bot_token: &str,
        fields: &[MetadataField],
    ) -> Result<Vec<MetadataField>> {
        let request = self
            .http_client
            .put(self.config.schema_url())
            .header(reqwest::header::AUTHORIZATION, format!("Bot {bot_token}"))
            .json(fields);

        let response = request::execute(Operation::SchemaRegistration, request).await?;
        let accepted: Vec<MetadataField> =
            request::read_json(Operation::SchemaRegistration, response).await?;

        tracing::info!(
            application_id = %self.config.client_id,
            fields = accepted.len(),
            "Registered role-connection metadata schema"
        );

        Ok(accepted)
    }
}

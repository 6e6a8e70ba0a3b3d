
use std::sync::Arc;

use anyhow::Result;

use crate::config::GatewayConfig;
use crate::discord_client::{DiscordApi, DiscordClient};
use crate::store_client::{KeyValueStore, StoreClient};

/// Collaborators and settings handed to every interaction handler.
pub struct HandlerContext {
    discord: Arc<dyn DiscordApi>,
    store: Arc<dyn KeyValueStore>,
    log_channel_id: String,
    quiz_category_id: Option<String>,
}

impl HandlerContext {
    pub fn new(
        discord: Arc<dyn DiscordApi>,
        store: Arc<dyn KeyValueStore>,
        log_channel_id: impl Into<String>,
        quiz_category_id: Option<String>,
    ) -> Arc<Self> {
        let context = Self {
            discord,
            store,
            log_channel_id: log_channel_id.into(),
            quiz_category_id,
        };
        Arc::new(context)
    }

    pub async fn from_config(config: &GatewayConfig) -> Result<Arc<Self>> {
        let discord = DiscordClient::new(&config.api_base_url, &config.bot_token, config.http_timeout)?;
        let store = StoreClient::connect(&config.store_function_name).await;
        Ok(Self::new(discord, store, &config.log_channel_id, config.quiz_category_id.clone()))
    }

    pub fn discord(&self) -> &Arc<dyn DiscordApi> {
        &self.discord
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn log_channel_id(&self) -> &str {
        &self.log_channel_id
    }

    pub fn quiz_category_id(&self) -> Option<&str> {
        self.quiz_category_id.as_deref()
    }
}

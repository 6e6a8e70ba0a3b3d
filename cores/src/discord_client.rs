
use std::{sync::Arc, time::Duration};

use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::{self, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::response::MessageData;

// https://discord.com/developers/docs/topics/permissions#permissions-bitwise-permission-flags
pub const VIEW_CHANNEL: u64 = 1 << 10;

// https://discord.com/developers/docs/resources/channel#channel-object-channel-types
pub const GUILD_FORUM: u8 = 15;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Channel {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionOverwrite {
    pub allow: u64,
    pub deny: u64,
}

impl PermissionOverwrite {
    pub fn deny(deny: u64) -> Self {
        Self { allow: 0, deny }
    }

    pub fn neutral() -> Self {
        Self { allow: 0, deny: 0 }
    }
}

#[derive(Serialize)]
struct OverwriteRequestBody {
    r#type: u8,
    allow: String,
    deny: String,
}

#[derive(Serialize)]
struct CreateDmRequestBody<'a> {
    recipient_id: &'a str,
}

/// The slice of the Discord REST API the interaction handlers use.
#[async_trait]
pub trait DiscordApi: Send + Sync {
    async fn create_message(&self, channel_id: &str, message: &MessageData) -> Result<()>;

    async fn get_channel(&self, channel_id: &str) -> Result<Channel>;

    async fn list_guild_channels(&self, guild_id: &str) -> Result<Vec<Channel>>;

    async fn edit_member_overwrite(&self, channel_id: &str, user_id: &str, overwrite: PermissionOverwrite) -> Result<()>;

    async fn create_dm(&self, user_id: &str) -> Result<Channel>;

    async fn edit_original_response(&self, application_id: &str, token: &str, message: &MessageData) -> Result<()>;

    async fn original_response_exists(&self, application_id: &str, token: &str) -> Result<bool>;
}

pub struct DiscordClient {
    client: Client,
    base_url: String,
    bot_token: String,
}

impl DiscordClient {
    pub fn new(base_url: impl Into<String>, bot_token: impl Into<String>, timeout: Duration) -> Result<Arc<Self>> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;
        let this = Self {
            client,
            base_url: base_url.into(),
            bot_token: bot_token.into(),
        };
        Ok(Arc::new(this))
    }

    fn api_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/{path}")
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.api_url(path))
            .header("Authorization", ["Bot", &self.bot_token].join(" "))
    }

    async fn ensure_success(response: Response, operation: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        bail!("discord {operation} failed with {status}: {text}")
    }
}

#[async_trait]
impl DiscordApi for DiscordClient {
    // https://discord.com/developers/docs/resources/message#create-message
    async fn create_message(&self, channel_id: &str, message: &MessageData) -> Result<()> {
        let response = self.request(Method::POST, &format!("channels/{channel_id}/messages"))
            .json(message)
            .send()
            .await?;
        Self::ensure_success(response, "create message").await?;
        Ok(())
    }

    // https://discord.com/developers/docs/resources/channel#get-channel
    async fn get_channel(&self, channel_id: &str) -> Result<Channel> {
        let response = self.request(Method::GET, &format!("channels/{channel_id}"))
            .send()
            .await?;
        let response = Self::ensure_success(response, "get channel").await?;
        Ok(response.json().await?)
    }

    // https://discord.com/developers/docs/resources/guild#get-guild-channels
    async fn list_guild_channels(&self, guild_id: &str) -> Result<Vec<Channel>> {
        let response = self.request(Method::GET, &format!("guilds/{guild_id}/channels"))
            .send()
            .await?;
        let response = Self::ensure_success(response, "list guild channels").await?;
        Ok(response.json().await?)
    }

    // https://discord.com/developers/docs/resources/channel#edit-channel-permissions
    async fn edit_member_overwrite(&self, channel_id: &str, user_id: &str, overwrite: PermissionOverwrite) -> Result<()> {
        let request_body = OverwriteRequestBody {
            // member overwrite
            r#type: 1,
            allow: overwrite.allow.to_string(),
            deny: overwrite.deny.to_string(),
        };
        let response = self.request(Method::PUT, &format!("channels/{channel_id}/permissions/{user_id}"))
            .json(&request_body)
            .send()
            .await?;
        Self::ensure_success(response, "edit channel permissions").await?;
        info!(channel_id, user_id, allow = overwrite.allow, deny = overwrite.deny, "permission overwrite updated");
        Ok(())
    }

    // https://discord.com/developers/docs/resources/user#create-dm
    async fn create_dm(&self, user_id: &str) -> Result<Channel> {
        let response = self.request(Method::POST, "users/@me/channels")
            .json(&CreateDmRequestBody { recipient_id: user_id })
            .send()
            .await?;
        let response = Self::ensure_success(response, "create dm").await?;
        Ok(response.json().await?)
    }

    // https://discord.com/developers/docs/interactions/receiving-and-responding#edit-original-interaction-response
    async fn edit_original_response(&self, application_id: &str, token: &str, message: &MessageData) -> Result<()> {
        let response = self.request(Method::PATCH, &format!("webhooks/{application_id}/{token}/messages/@original"))
            .json(message)
            .send()
            .await?;
        Self::ensure_success(response, "edit original response").await?;
        Ok(())
    }

    // https://discord.com/developers/docs/interactions/receiving-and-responding#get-original-interaction-response
    async fn original_response_exists(&self, application_id: &str, token: &str) -> Result<bool> {
        let response = self.request(Method::GET, &format!("webhooks/{application_id}/{token}/messages/@original"))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::ensure_success(response, "get original response").await?;
        Ok(true)
    }
}

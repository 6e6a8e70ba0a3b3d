//! Recording stand-ins for the Discord and store collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use async_trait::async_trait;

use crate::discord_client::{Channel, DiscordApi, PermissionOverwrite};
use crate::response::MessageData;
use crate::store_client::{KeyValueStore, StoreRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum DiscordCall {
    CreateMessage { channel_id: String, message: MessageData },
    GetChannel { channel_id: String },
    ListGuildChannels { guild_id: String },
    EditOverwrite { channel_id: String, user_id: String, overwrite: PermissionOverwrite },
    CreateDm { user_id: String },
    EditOriginal { application_id: String, token: String, message: MessageData },
    OriginalExists { application_id: String, token: String },
}

#[derive(Default)]
pub struct RecordingDiscord {
    calls: Mutex<Vec<DiscordCall>>,
    fail: AtomicBool,
    channels: Mutex<HashMap<String, Channel>>,
    guild_channels: Mutex<Vec<Channel>>,
    // number of `original_response_exists` probes answered with `false`
    placeholder_misses: AtomicUsize,
}

impl RecordingDiscord {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn add_channel(&self, id: &str, kind: u8, name: &str, parent_id: Option<&str>) {
        let channel = Channel {
            id: id.into(),
            kind,
            name: Some(name.into()),
            parent_id: parent_id.map(Into::into),
        };
        self.guild_channels.lock().unwrap().push(channel.clone());
        self.channels.lock().unwrap().insert(id.into(), channel);
    }

    pub fn hide_placeholder_for(&self, probes: usize) {
        self.placeholder_misses.store(probes, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<DiscordCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn created_messages(&self) -> Vec<(String, MessageData)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DiscordCall::CreateMessage { channel_id, message } => Some((channel_id, message)),
                _ => None,
            })
            .collect()
    }

    pub fn original_edits(&self) -> Vec<MessageData> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DiscordCall::EditOriginal { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn overwrites(&self) -> Vec<(String, String, PermissionOverwrite)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DiscordCall::EditOverwrite { channel_id, user_id, overwrite } => Some((channel_id, user_id, overwrite)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DiscordCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail.load(Ordering::SeqCst) {
            bail!("discord unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl DiscordApi for RecordingDiscord {
    async fn create_message(&self, channel_id: &str, message: &MessageData) -> Result<()> {
        self.record(DiscordCall::CreateMessage {
            channel_id: channel_id.into(),
            message: message.clone(),
        })
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Channel> {
        self.record(DiscordCall::GetChannel { channel_id: channel_id.into() })?;
        match self.channels.lock().unwrap().get(channel_id) {
            Some(channel) => Ok(channel.clone()),
            None => bail!("unknown channel {channel_id}"),
        }
    }

    async fn list_guild_channels(&self, guild_id: &str) -> Result<Vec<Channel>> {
        self.record(DiscordCall::ListGuildChannels { guild_id: guild_id.into() })?;
        Ok(self.guild_channels.lock().unwrap().clone())
    }

    async fn edit_member_overwrite(&self, channel_id: &str, user_id: &str, overwrite: PermissionOverwrite) -> Result<()> {
        self.record(DiscordCall::EditOverwrite {
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            overwrite,
        })
    }

    async fn create_dm(&self, user_id: &str) -> Result<Channel> {
        self.record(DiscordCall::CreateDm { user_id: user_id.into() })?;
        Ok(Channel {
            id: format!("dm-{user_id}"),
            kind: 1,
            name: None,
            parent_id: None,
        })
    }

    async fn edit_original_response(&self, application_id: &str, token: &str, message: &MessageData) -> Result<()> {
        self.record(DiscordCall::EditOriginal {
            application_id: application_id.into(),
            token: token.into(),
            message: message.clone(),
        })
    }

    async fn original_response_exists(&self, application_id: &str, token: &str) -> Result<bool> {
        self.record(DiscordCall::OriginalExists {
            application_id: application_id.into(),
            token: token.into(),
        })?;
        let missed = self.placeholder_misses
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        Ok(!missed)
    }
}

#[derive(Default)]
pub struct RecordingStore {
    writes: Mutex<Vec<StoreRecord>>,
    fail: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<StoreRecord> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn write(&self, record: &StoreRecord) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("store unavailable");
        }
        self.writes.lock().unwrap().push(record.clone());
        Ok(())
    }
}


use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-object-interaction-type
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(from = "u8", into = "u8")]
pub enum InteractionKind {
    Ping,
    Command,
    Component,
    Autocomplete,
    Modal,
    Other(u8),
}

impl From<u8> for InteractionKind {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Ping,
            2 => Self::Command,
            3 => Self::Component,
            4 => Self::Autocomplete,
            5 => Self::Modal,
            other => Self::Other(other),
        }
    }
}

impl From<InteractionKind> for u8 {
    fn from(kind: InteractionKind) -> Self {
        match kind {
            InteractionKind::Ping => 1,
            InteractionKind::Command => 2,
            InteractionKind::Component => 3,
            InteractionKind::Autocomplete => 4,
            InteractionKind::Modal => 5,
            InteractionKind::Other(other) => other,
        }
    }
}

// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-object
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<MessageRef>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct InteractionData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub components: Vec<SubmittedRow>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SubmittedRow {
    #[serde(default)]
    pub components: Vec<SubmittedField>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SubmittedField {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Member {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub discriminator: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MessageRef {
    pub id: String,
}

const TEXT_INPUT: u8 = 4;

impl Interaction {
    pub fn parse(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    /// The invoking user. Guild interactions carry it inside `member`, DMs in `user`.
    pub fn actor(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|member| member.user.as_ref())
            .or(self.user.as_ref())
    }

    pub fn command_name(&self) -> Option<&str> {
        self.data.as_ref()?.name.as_deref()
    }

    pub fn custom_id(&self) -> Option<&str> {
        self.data.as_ref()?.custom_id.as_deref()
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.data
            .as_ref()?
            .options
            .iter()
            .find(|option| option.name == name)
            .map(|option| &option.value)
    }

    pub fn string_option(&self, name: &str) -> Option<&str> {
        self.option(name)?.as_str().filter(|value| !value.is_empty())
    }

    pub fn selected_values(&self) -> &[String] {
        self.data
            .as_ref()
            .map(|data| data.values.as_slice())
            .unwrap_or_default()
    }

    /// Text inputs of a submitted modal keyed by their custom id.
    pub fn modal_fields(&self) -> HashMap<&str, &str> {
        let Some(data) = &self.data else { return HashMap::new() };
        data.components
            .iter()
            .flat_map(|row| row.components.iter())
            .filter(|field| field.kind == TEXT_INPUT)
            .filter_map(|field| {
                let custom_id = field.custom_id.as_deref()?;
                Some((custom_id, field.value.as_deref().unwrap_or_default()))
            })
            .collect()
    }
}

impl User {
    pub fn display_name(&self) -> &str {
        self.global_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("UnknownUser")
    }

    /// `username#discriminator`, the form used by the activity log.
    pub fn tag(&self) -> String {
        let username = self.username.as_deref().unwrap_or("UnknownUser");
        let discriminator = self.discriminator.as_deref().unwrap_or("0000");
        format!("{username}#{discriminator}")
    }
}


use serde::{Serialize, Serializer};

// https://discord.com/developers/docs/resources/channel#message-object-message-flags
const EPHEMERAL: u32 = 1 << 6;

const FAILURE_CONTENT: &str = "Something went wrong while processing your request. Please try again later.";

// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-response-object-interaction-callback-type
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionResponse {
    Pong,
    Message(MessageData),
    DeferredMessage { ephemeral: bool },
    /// Acknowledges a component or modal without changing anything visible.
    Acknowledge,
    UpdateMessage(MessageData),
    Modal(ModalData),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageData {
    pub content: String,
    pub ephemeral: bool,
    /// `None` leaves existing components untouched, `Some(vec![])` clears them.
    pub components: Option<Vec<ActionRow>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ModalData {
    pub custom_id: String,
    pub title: String,
    pub components: Vec<ActionRow>,
}

impl InteractionResponse {
    pub fn message(content: impl Into<String>) -> Self {
        Self::Message(MessageData::new(content))
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self::Message(MessageData::new(content).ephemeral())
    }

    /// The generic answer used whenever a handler fails.
    pub fn failure() -> Self {
        Self::ephemeral(FAILURE_CONTENT)
    }

    fn callback_type(&self) -> u8 {
        match self {
            Self::Pong => 1,
            Self::Message(_) => 4,
            Self::DeferredMessage { .. } => 5,
            Self::Acknowledge => 6,
            Self::UpdateMessage(_) => 7,
            Self::Modal(_) => 9,
        }
    }

    /// Message content usable for editing a deferred placeholder.
    pub fn into_followup(self) -> Option<MessageData> {
        match self {
            Self::Message(data) | Self::UpdateMessage(data) => Some(data),
            _ => None,
        }
    }
}

impl MessageData {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
            components: None,
        }
    }

    pub fn failure() -> Self {
        Self::new(FAILURE_CONTENT).ephemeral()
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    pub fn with_components(mut self, components: Vec<ActionRow>) -> Self {
        self.components = Some(components);
        self
    }
}

impl Serialize for MessageData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            content: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            flags: Option<u32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            components: Option<&'a Vec<ActionRow>>,
        }
        Wire {
            content: &self.content,
            flags: self.ephemeral.then_some(EPHEMERAL),
            components: self.components.as_ref(),
        }
        .serialize(serializer)
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum CallbackData<'a> {
    Message(&'a MessageData),
    Flags { flags: u32 },
    Modal(&'a ModalData),
}

impl Serialize for InteractionResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            r#type: u8,
            #[serde(skip_serializing_if = "Option::is_none")]
            data: Option<CallbackData<'a>>,
        }
        let data = match self {
            Self::Pong | Self::Acknowledge => None,
            Self::DeferredMessage { ephemeral: false } => None,
            Self::DeferredMessage { ephemeral: true } => Some(CallbackData::Flags { flags: EPHEMERAL }),
            Self::Message(data) | Self::UpdateMessage(data) => Some(CallbackData::Message(data)),
            Self::Modal(data) => Some(CallbackData::Modal(data)),
        };
        Wire {
            r#type: self.callback_type(),
            data,
        }
        .serialize(serializer)
    }
}

// https://discord.com/developers/docs/interactions/message-components
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ActionRow {
    r#type: u8,
    pub components: Vec<Component>,
}

impl ActionRow {
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            r#type: 1,
            components,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Component {
    Button(Button),
    StringSelect(StringSelect),
    TextInput(TextInput),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Button {
    r#type: u8,
    pub style: u8,
    pub label: String,
    pub custom_id: String,
}

impl Button {
    const PRIMARY: u8 = 1;

    pub fn primary(label: impl Into<String>, custom_id: impl Into<String>) -> Component {
        Component::Button(Self {
            r#type: 2,
            style: Self::PRIMARY,
            label: label.into(),
            custom_id: custom_id.into(),
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StringSelect {
    r#type: u8,
    pub custom_id: String,
    pub options: Vec<SelectOption>,
    pub placeholder: String,
    pub min_values: u8,
    pub max_values: u8,
}

impl StringSelect {
    pub fn single(custom_id: impl Into<String>, placeholder: impl Into<String>, options: Vec<SelectOption>) -> Component {
        Component::StringSelect(Self {
            r#type: 3,
            custom_id: custom_id.into(),
            options,
            placeholder: placeholder.into(),
            min_values: 1,
            max_values: 1,
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub default: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TextInput {
    r#type: u8,
    pub custom_id: String,
    pub label: String,
    pub style: u8,
    pub min_length: u16,
    pub max_length: u16,
    pub placeholder: String,
    pub required: bool,
}

impl TextInput {
    pub const SHORT: u8 = 1;
    pub const PARAGRAPH: u8 = 2;

    pub fn new(custom_id: impl Into<String>, label: impl Into<String>, style: u8, max_length: u16) -> Self {
        Self {
            r#type: 4,
            custom_id: custom_id.into(),
            label: label.into(),
            style,
            min_length: 1,
            max_length,
            placeholder: String::new(),
            required: true,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn into_row(self) -> ActionRow {
        ActionRow::new(vec![Component::TextInput(self)])
    }
}

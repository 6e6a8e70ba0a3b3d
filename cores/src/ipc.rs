

use serde::{Serialize, Deserialize};

use crate::response::InteractionResponse;

/// The placeholder the gateway answered with before handing work to the worker.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeferredAck {
    /// "thinking..." message (callback type 5), created by Discord on receipt.
    Message { ephemeral: bool },
    /// Silent acknowledgement of a component or modal (callback type 6).
    Update,
}

impl DeferredAck {
    pub fn placeholder(self) -> InteractionResponse {
        match self {
            Self::Message { ephemeral } => InteractionResponse::DeferredMessage { ephemeral },
            Self::Update => InteractionResponse::Acknowledge,
        }
    }
}

/// Payload of the asynchronous worker invocation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeferredInvocation {
    pub ack: DeferredAck,
    /// The verified interaction body, exactly as received.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invocation_wire_format() {
        let invocation = DeferredInvocation {
            ack: DeferredAck::Message { ephemeral: true },
            body: r#"{"type":2}"#.into(),
        };
        let value = serde_json::to_value(&invocation).unwrap();
        assert_eq!(value, json!({"ack": {"message": {"ephemeral": true}}, "body": "{\"type\":2}"}));
        let decoded: DeferredInvocation = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, invocation);
    }

    #[test]
    fn placeholders_match_ack_kind() {
        assert_eq!(DeferredAck::Update.placeholder(), InteractionResponse::Acknowledge);
        assert_eq!(
            DeferredAck::Message { ephemeral: false }.placeholder(),
            InteractionResponse::DeferredMessage { ephemeral: false }
        );
    }
}

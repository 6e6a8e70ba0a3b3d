
use serde_json::Value;
use tracing::warn;

use crate::context::HandlerContext;
use crate::interaction::Interaction;
use crate::response::MessageData;

/// Posts a "command used" entry for the interaction to the bot log channel.
///
/// The log channel is an audit trail, not part of the reply: a failed post is
/// reported through tracing and otherwise ignored.
pub async fn record(context: &HandlerContext, interaction: &Interaction) {
    let label = interaction.command_name().unwrap_or("(unknown)");
    record_as(context, interaction, label).await
}

/// Like [`record`], but under an explicit label (used for component presses,
/// which carry no command name).
pub async fn record_as(context: &HandlerContext, interaction: &Interaction, label: &str) {
    let content = format_entry(interaction, label);
    post(context, content).await
}

/// Posts free-form content to the bot log channel.
pub async fn post(context: &HandlerContext, content: String) {
    let message = MessageData::new(content);
    let result = context.discord()
        .create_message(context.log_channel_id(), &message)
        .await;
    if let Err(error) = result {
        warn!("activity log post failed {:?}", error);
    }
}

fn format_entry(interaction: &Interaction, label: &str) -> String {
    let user = interaction.actor()
        .map(|user| user.tag())
        .unwrap_or_else(|| "UnknownUser#0000".into());
    let parameters = interaction.data
        .as_ref()
        .map(|data| {
            data.options.iter()
                .map(|option| format!("{}:{}", option.name, display_value(&option.value)))
                .collect::<Vec<_>>()
        })
        .filter(|parameters| !parameters.is_empty())
        .map(|parameters| parameters.join(", "))
        .unwrap_or_else(|| "none".into());
    format!("**Command Used**\nUser: `{user}`\nCommand: `/{label}`\nParameters: `{parameters}`")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

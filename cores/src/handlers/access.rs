
use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::activity_log;
use crate::context::HandlerContext;
use crate::custom_id::CustomId;
use crate::discord_client::{PermissionOverwrite, VIEW_CHANNEL};
use crate::interaction::Interaction;
use crate::registry::{InteractionHandler, ResponseMode};
use crate::response::{ActionRow, Button, InteractionResponse, MessageData};

/// `/remove_access` hides the current channel from the invoker and DMs them a
/// button that undoes it.
pub struct RemoveAccess;

#[async_trait]
impl InteractionHandler for RemoveAccess {
    fn mode(&self) -> ResponseMode {
        ResponseMode::Deferred { ephemeral: true }
    }

    async fn handle(&self, interaction: &Interaction, context: &HandlerContext) -> Result<InteractionResponse> {
        let channel_id = interaction.channel_id.as_deref();
        let user = interaction.member.as_ref().and_then(|member| member.user.as_ref());
        let (Some(channel_id), Some(user)) = (channel_id, user) else {
            return Ok(InteractionResponse::ephemeral("This command can only be used in a server channel."));
        };
        let channel_label = match describe_channel(context, channel_id).await {
            Ok(label) => label,
            Err(error) => {
                warn!("channel lookup failed {:?}", error);
                return Ok(InteractionResponse::ephemeral(
                    "Could not read the channel information, so nothing was changed.",
                ));
            }
        };
        let result = context.discord()
            .edit_member_overwrite(channel_id, &user.id, PermissionOverwrite::deny(VIEW_CHANNEL))
            .await;
        activity_log::record(context, interaction).await;
        if let Err(error) = result {
            warn!("removing access failed {:?}", error);
            return Ok(InteractionResponse::ephemeral("Failed to remove access. Check the bot's permissions."));
        }
        let revert = CustomId::RevertAccess {
            channel_id: channel_id.into(),
            user_id: user.id.clone(),
        };
        if let Err(error) = send_revert_button(context, &user.id, &channel_label, &revert).await {
            warn!("revert button delivery failed {:?}", error);
        }
        Ok(InteractionResponse::ephemeral(format!(
            "Removed your access to {channel_label}. Check your DMs to restore it."
        )))
    }
}

/// The "Revert" button from the `/remove_access` DM.
pub struct RevertAccess;

#[async_trait]
impl InteractionHandler for RevertAccess {
    fn mode(&self) -> ResponseMode {
        ResponseMode::Deferred { ephemeral: true }
    }

    async fn handle(&self, interaction: &Interaction, context: &HandlerContext) -> Result<InteractionResponse> {
        let Some(CustomId::RevertAccess { channel_id, user_id }) = interaction.custom_id().and_then(CustomId::parse) else {
            return Ok(InteractionResponse::UpdateMessage(
                MessageData::new("This button is no longer valid.").with_components(vec![]),
            ));
        };
        let result = context.discord()
            .edit_member_overwrite(&channel_id, &user_id, PermissionOverwrite::neutral())
            .await;
        activity_log::record_as(context, interaction, "revert_access").await;
        let message = match result {
            Ok(()) => MessageData::new("Your access has been restored.").with_components(vec![]),
            Err(error) => {
                warn!("restoring access failed {:?}", error);
                // keep the button so the user can retry
                MessageData::new("Failed to restore access. Check the bot's permissions.")
            }
        };
        Ok(InteractionResponse::UpdateMessage(message))
    }
}

// "<category>:<channel>"
async fn describe_channel(context: &HandlerContext, channel_id: &str) -> Result<String> {
    let channel = context.discord().get_channel(channel_id).await?;
    let category = match channel.parent_id.as_deref() {
        Some(parent_id) => match context.discord().get_channel(parent_id).await {
            Ok(parent) => parent.name.unwrap_or_else(|| "Unknown category".into()),
            Err(error) => {
                warn!("category lookup failed {:?}", error);
                "Unknown category".into()
            }
        },
        None => "Uncategorized".into(),
    };
    let name = channel.name.unwrap_or_else(|| "unknown-channel".into());
    Ok(format!("{category}:{name}"))
}

async fn send_revert_button(context: &HandlerContext, user_id: &str, channel_label: &str, revert: &CustomId) -> Result<()> {
    let dm = context.discord().create_dm(user_id).await?;
    let message = MessageData::new(format!(
        "Your access was removed: **{channel_label}**\nPress \"Revert\" to restore it."
    ))
    .with_components(vec![ActionRow::new(vec![Button::primary("Revert", revert.to_string())])]);
    context.discord().create_message(&dm.id, &message).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord_client::GUILD_FORUM;
    use crate::response::Component;
    use crate::testing::{DiscordCall, RecordingDiscord, RecordingStore};

    fn remove_access_interaction() -> Interaction {
        Interaction::parse(r#"{
            "type": 2,
            "data": {"name": "remove_access"},
            "channel_id": "123",
            "member": {"user": {"id": "456", "username": "jiro"}}
        }"#).unwrap()
    }

    #[tokio::test]
    async fn remove_access_denies_view_and_sends_revert_button() {
        let discord = RecordingDiscord::new();
        discord.add_channel("10", 4, "Science", None);
        discord.add_channel("123", GUILD_FORUM, "physics", Some("10"));
        let context = HandlerContext::new(discord.clone(), RecordingStore::new(), "log", None);

        let response = RemoveAccess.handle(&remove_access_interaction(), &context).await.unwrap();

        assert_eq!(
            response,
            InteractionResponse::ephemeral("Removed your access to Science:physics. Check your DMs to restore it.")
        );
        assert_eq!(
            discord.overwrites(),
            vec![("123".to_string(), "456".to_string(), PermissionOverwrite::deny(1024))]
        );
        let messages = discord.created_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].0, "log");
        let (dm_channel, dm) = &messages[1];
        assert_eq!(dm_channel, "dm-456");
        let components = dm.components.as_ref().unwrap();
        let Component::Button(button) = &components[0].components[0] else {
            panic!("expected a button");
        };
        assert_eq!(button.custom_id, "revert_access-123-456");
    }

    #[tokio::test]
    async fn remove_access_stops_when_channel_is_unknown() {
        let discord = RecordingDiscord::new();
        let context = HandlerContext::new(discord.clone(), RecordingStore::new(), "log", None);
        let response = RemoveAccess.handle(&remove_access_interaction(), &context).await.unwrap();
        assert_eq!(
            response,
            InteractionResponse::ephemeral("Could not read the channel information, so nothing was changed.")
        );
        assert!(discord.overwrites().is_empty());
    }

    #[tokio::test]
    async fn remove_access_requires_a_guild_member() {
        let discord = RecordingDiscord::new();
        let context = HandlerContext::new(discord.clone(), RecordingStore::new(), "log", None);
        let interaction = Interaction::parse(r#"{"type": 2, "data": {"name": "remove_access"}, "user": {"id": "1"}}"#).unwrap();
        let response = RemoveAccess.handle(&interaction, &context).await.unwrap();
        assert_eq!(response, InteractionResponse::ephemeral("This command can only be used in a server channel."));
        assert_eq!(discord.call_count(), 0);
    }

    #[tokio::test]
    async fn revert_access_clears_the_overwrite() {
        let discord = RecordingDiscord::new();
        let context = HandlerContext::new(discord.clone(), RecordingStore::new(), "log", None);
        let interaction = Interaction::parse(r#"{
            "type": 3,
            "data": {"custom_id": "revert_access-123-456"},
            "user": {"id": "456", "username": "jiro"}
        }"#).unwrap();

        let response = RevertAccess.handle(&interaction, &context).await.unwrap();

        assert_eq!(
            response,
            InteractionResponse::UpdateMessage(MessageData::new("Your access has been restored.").with_components(vec![]))
        );
        assert_eq!(
            discord.overwrites(),
            vec![("123".to_string(), "456".to_string(), PermissionOverwrite::neutral())]
        );
        assert!(matches!(
            &discord.calls()[1],
            DiscordCall::CreateMessage { message, .. } if message.content.contains("/revert_access")
        ));
    }

    #[tokio::test]
    async fn revert_access_rejects_malformed_ids() {
        let discord = RecordingDiscord::new();
        let context = HandlerContext::new(discord.clone(), RecordingStore::new(), "log", None);
        let interaction = Interaction::parse(r#"{"type": 3, "data": {"custom_id": "revert_access-oops"}}"#).unwrap();
        let response = RevertAccess.handle(&interaction, &context).await.unwrap();
        assert_eq!(
            response,
            InteractionResponse::UpdateMessage(MessageData::new("This button is no longer valid.").with_components(vec![]))
        );
        assert_eq!(discord.call_count(), 0);
    }
}


use anyhow::Result;
use async_trait::async_trait;

use crate::activity_log;
use crate::context::HandlerContext;
use crate::interaction::Interaction;
use crate::registry::InteractionHandler;
use crate::response::InteractionResponse;

pub struct Hello;

#[async_trait]
impl InteractionHandler for Hello {
    async fn handle(&self, interaction: &Interaction, context: &HandlerContext) -> Result<InteractionResponse> {
        let name = interaction.actor()
            .map(|user| user.display_name())
            .unwrap_or("UnknownUser");
        activity_log::record(context, interaction).await;
        Ok(InteractionResponse::ephemeral(format!("Hello, {name}!")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingDiscord, RecordingStore};

    #[tokio::test]
    async fn greets_the_invoker_and_logs() {
        let discord = RecordingDiscord::new();
        let context = HandlerContext::new(discord.clone(), RecordingStore::new(), "log", None);
        let interaction = Interaction::parse(r#"{
            "type": 2,
            "data": {"name": "hello"},
            "member": {"user": {"id": "1", "username": "taro", "global_name": "Taro"}}
        }"#).unwrap();
        let response = Hello.handle(&interaction, &context).await.unwrap();
        assert_eq!(response, InteractionResponse::ephemeral("Hello, Taro!"));
        assert_eq!(discord.created_messages().len(), 1);
    }
}

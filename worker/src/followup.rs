
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use cores::dispatch::Dispatcher;
use cores::interaction::Interaction;
use cores::ipc::{DeferredAck, DeferredInvocation};
use cores::response::MessageData;
use tracing::{info, warn};

/// How long to wait for the gateway's placeholder before editing it.
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderWait {
    pub attempts: u32,
    pub interval: Duration,
    /// Update placeholders cannot be probed, so they only get this delay.
    pub settle: Duration,
}

impl Default for PlaceholderWait {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_millis(300),
            settle: Duration::from_millis(500),
        }
    }
}

/// Completes deferred interactions: one handler run, one edit of `@original`.
pub struct FollowupRunner {
    dispatcher: Arc<Dispatcher>,
    wait: PlaceholderWait,
}

impl FollowupRunner {
    pub fn new(dispatcher: &Arc<Dispatcher>, wait: PlaceholderWait) -> Arc<Self> {
        let dispatcher = Arc::clone(dispatcher);
        let runner = Self {
            dispatcher,
            wait,
        };
        Arc::new(runner)
    }

    pub async fn complete(&self, invocation: DeferredInvocation) -> Result<()> {
        let interaction = Interaction::parse(&invocation.body).context("deferred body is not an interaction")?;
        let application_id = interaction.application_id.clone().context("interaction has no application_id")?;
        let token = interaction.token.clone().context("interaction has no token")?;
        info!(id = ?interaction.id, ack = ?invocation.ack, "deferred interaction in progress");

        if !self.wait_for_placeholder(invocation.ack, &application_id, &token).await {
            warn!(attempts = self.wait.attempts, "placeholder never became visible, dropping interaction");
            return Ok(());
        }
        // the edit endpoint ignores flags; visibility was fixed by the placeholder
        let message = MessageData {
            ephemeral: false,
            ..self.dispatcher.run_deferred(interaction).await
        };

        let discord = self.dispatcher.context().discord();
        discord
            .edit_original_response(&application_id, &token, &message)
            .await
            .context("follow-up edit failed")?;
        info!("deferred interaction complete");
        Ok(())
    }

    /// `false` when a message placeholder could not be observed in time.
    async fn wait_for_placeholder(&self, ack: DeferredAck, application_id: &str, token: &str) -> bool {
        if let DeferredAck::Update = ack {
            // update placeholders have no readable message of their own
            tokio::time::sleep(self.wait.settle).await;
            return true;
        }
        let discord = self.dispatcher.context().discord();
        for attempt in 1..=self.wait.attempts {
            match discord.original_response_exists(application_id, token).await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(error) => warn!(attempt, "placeholder probe failed {:?}", error),
            }
            tokio::time::sleep(self.wait.interval).await;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use async_trait::async_trait;
    use cores::config::DeferralMode;
    use cores::context::HandlerContext;
    use cores::dispatch::DispatchSettings;
    use cores::discord_client::{PermissionOverwrite, VIEW_CHANNEL};
    use cores::registry::{HandlerRegistry, InteractionHandler, Matcher, ResponseMode};
    use cores::response::InteractionResponse;
    use cores::testing::{DiscordCall, RecordingDiscord, RecordingStore};

    struct Later;

    #[async_trait]
    impl InteractionHandler for Later {
        fn mode(&self) -> ResponseMode {
            ResponseMode::Deferred { ephemeral: true }
        }

        async fn handle(&self, _interaction: &Interaction, _context: &HandlerContext) -> Result<InteractionResponse> {
            Ok(InteractionResponse::ephemeral("done"))
        }
    }

    struct Broken;

    #[async_trait]
    impl InteractionHandler for Broken {
        fn mode(&self) -> ResponseMode {
            ResponseMode::Deferred { ephemeral: true }
        }

        async fn handle(&self, _interaction: &Interaction, _context: &HandlerContext) -> Result<InteractionResponse> {
            bail!("boom")
        }
    }

    struct HideChannel;

    #[async_trait]
    impl InteractionHandler for HideChannel {
        fn mode(&self) -> ResponseMode {
            ResponseMode::Deferred { ephemeral: true }
        }

        async fn handle(&self, _interaction: &Interaction, context: &HandlerContext) -> Result<InteractionResponse> {
            context.discord()
                .edit_member_overwrite("123", "456", PermissionOverwrite::deny(VIEW_CHANNEL))
                .await?;
            Ok(InteractionResponse::ephemeral("hidden"))
        }
    }

    fn runner(discord: &Arc<RecordingDiscord>) -> Arc<FollowupRunner> {
        let context = HandlerContext::new(discord.clone(), RecordingStore::new(), "log", None);
        let registry = HandlerRegistry::builder()
            .command("later", Later)
            .command("broken", Broken)
            .command("hide", HideChannel)
            .component(Matcher::exact("later"), Later)
            .build()
            .unwrap();
        let settings = DispatchSettings {
            deferral_mode: DeferralMode::Worker,
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(registry, &context, settings);
        FollowupRunner::new(&dispatcher, PlaceholderWait::default())
    }

    fn invocation(ack: DeferredAck, body: &str) -> DeferredInvocation {
        DeferredInvocation {
            ack,
            body: body.into(),
        }
    }

    const COMMAND: &str = r#"{"type":2,"data":{"name":"later"},"application_id":"app","token":"tok"}"#;

    #[tokio::test(start_paused = true)]
    async fn edits_original_exactly_once() {
        let discord = RecordingDiscord::new();
        runner(&discord)
            .complete(invocation(DeferredAck::Message { ephemeral: true }, COMMAND))
            .await
            .unwrap();
        assert_eq!(discord.original_edits(), vec![MessageData::new("done")]);
        let calls = discord.calls();
        assert!(matches!(calls.first(), Some(DiscordCall::OriginalExists { .. })));
        assert!(matches!(
            calls.last(),
            Some(DiscordCall::EditOriginal { application_id, token, .. }) if application_id == "app" && token == "tok"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn handler_failure_still_edits_once_with_failure_content() {
        let discord = RecordingDiscord::new();
        let body = r#"{"type":2,"data":{"name":"broken"},"application_id":"app","token":"tok"}"#;
        runner(&discord)
            .complete(invocation(DeferredAck::Message { ephemeral: true }, body))
            .await
            .unwrap();
        let edits = discord.original_edits();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].content, MessageData::failure().content);
        let body = serde_json::to_value(&edits[0]).unwrap();
        assert!(body.get("flags").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_placeholder_is_visible() {
        let discord = RecordingDiscord::new();
        discord.hide_placeholder_for(3);
        runner(&discord)
            .complete(invocation(DeferredAck::Message { ephemeral: true }, COMMAND))
            .await
            .unwrap();
        let probes = discord
            .calls()
            .into_iter()
            .filter(|call| matches!(call, DiscordCall::OriginalExists { .. }))
            .count();
        assert_eq!(probes, 4);
        assert_eq!(discord.original_edits().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn lost_placeholder_skips_the_handler_and_the_edit() {
        let discord = RecordingDiscord::new();
        discord.hide_placeholder_for(1000);
        let body = r#"{"type":2,"data":{"name":"hide"},"application_id":"app","token":"tok"}"#;
        runner(&discord)
            .complete(invocation(DeferredAck::Message { ephemeral: true }, body))
            .await
            .unwrap();
        let probes = discord
            .calls()
            .into_iter()
            .filter(|call| matches!(call, DiscordCall::OriginalExists { .. }))
            .count();
        assert_eq!(probes, PlaceholderWait::default().attempts as usize);
        assert_eq!(discord.call_count(), probes);
        assert!(discord.overwrites().is_empty());
        assert!(discord.original_edits().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn visible_placeholder_lets_side_effects_run() {
        let discord = RecordingDiscord::new();
        let body = r#"{"type":2,"data":{"name":"hide"},"application_id":"app","token":"tok"}"#;
        runner(&discord)
            .complete(invocation(DeferredAck::Message { ephemeral: true }, body))
            .await
            .unwrap();
        assert_eq!(discord.overwrites().len(), 1);
        assert_eq!(discord.original_edits(), vec![MessageData::new("hidden")]);
    }

    #[tokio::test(start_paused = true)]
    async fn update_acks_are_not_probed() {
        let discord = RecordingDiscord::new();
        let body = r#"{"type":3,"data":{"custom_id":"later"},"application_id":"app","token":"tok"}"#;
        runner(&discord).complete(invocation(DeferredAck::Update, body)).await.unwrap();
        assert_eq!(discord.call_count(), 1);
        assert_eq!(discord.original_edits().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_token_is_an_error_without_calls() {
        let discord = RecordingDiscord::new();
        let body = r#"{"type":2,"data":{"name":"later"},"application_id":"app"}"#;
        let result = runner(&discord).complete(invocation(DeferredAck::Update, body)).await;
        assert!(result.is_err());
        assert_eq!(discord.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_edit_is_reported() {
        let discord = RecordingDiscord::new();
        discord.fail_all();
        let result = runner(&discord)
            .complete(invocation(DeferredAck::Update, COMMAND))
            .await;
        assert!(result.is_err());
        assert_eq!(discord.original_edits().len(), 1);
    }
}

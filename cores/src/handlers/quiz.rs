
use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::activity_log;
use crate::context::HandlerContext;
use crate::custom_id::CustomId;
use crate::discord_client::GUILD_FORUM;
use crate::interaction::Interaction;
use crate::registry::InteractionHandler;
use crate::response::{ActionRow, InteractionResponse, MessageData, ModalData, SelectOption, StringSelect, TextInput};

// Discord caps select menus at 25 options.
const MAX_SELECT_OPTIONS: usize = 25;

const QUIZ_NUMBER: &str = "quizNumber";
const QUIZ_TEXT: &str = "quizText";

/// `/make_quiz` offers the forum channels of the quiz category to post into.
pub struct MakeQuiz;

#[async_trait]
impl InteractionHandler for MakeQuiz {
    async fn handle(&self, interaction: &Interaction, context: &HandlerContext) -> Result<InteractionResponse> {
        let Some(guild_id) = interaction.guild_id.as_deref() else {
            return Ok(InteractionResponse::ephemeral("This command can only be used in a server."));
        };
        let Some(category_id) = context.quiz_category_id() else {
            return Ok(InteractionResponse::ephemeral("Quiz channels are not configured."));
        };
        let channels = context.discord().list_guild_channels(guild_id).await?;
        let current = interaction.channel_id.as_deref();
        let options: Vec<SelectOption> = channels.into_iter()
            .filter(|channel| channel.kind == GUILD_FORUM && channel.parent_id.as_deref() == Some(category_id))
            .take(MAX_SELECT_OPTIONS)
            .map(|channel| SelectOption {
                default: Some(channel.id.as_str()) == current,
                label: channel.name.unwrap_or_else(|| channel.id.clone()),
                value: channel.id,
            })
            .collect();
        if options.is_empty() {
            return Ok(InteractionResponse::ephemeral("There are no forum channels to choose from."));
        }
        activity_log::record(context, interaction).await;
        let select = StringSelect::single(CustomId::QuizSelectMenu.to_string(), "Forum channel to post the quiz in", options);
        let message = MessageData::new("Choose the forum channel to post the quiz in.")
            .ephemeral()
            .with_components(vec![ActionRow::new(vec![select])]);
        Ok(InteractionResponse::Message(message))
    }
}

/// Channel chosen from the `/make_quiz` menu; asks for the quiz itself.
pub struct QuizSelectMenu;

#[async_trait]
impl InteractionHandler for QuizSelectMenu {
    async fn handle(&self, interaction: &Interaction, _context: &HandlerContext) -> Result<InteractionResponse> {
        let Some(channel_id) = interaction.selected_values().first() else {
            return Ok(InteractionResponse::ephemeral("No channel was selected."));
        };
        let custom_id = CustomId::MakeQuizModal {
            channel_id: channel_id.clone(),
        };
        let modal = ModalData {
            custom_id: custom_id.to_string(),
            title: "Quiz details".into(),
            components: vec![
                TextInput::new(QUIZ_NUMBER, "Question number", TextInput::SHORT, 20)
                    .placeholder("e.g. Q1, 1, 001")
                    .into_row(),
                TextInput::new(QUIZ_TEXT, "Question", TextInput::PARAGRAPH, 2000)
                    .placeholder("Write the question here")
                    .into_row(),
            ],
        };
        Ok(InteractionResponse::Modal(modal))
    }
}

/// Submission of the quiz modal.
pub struct QuizModalSubmit;

#[async_trait]
impl InteractionHandler for QuizModalSubmit {
    async fn handle(&self, interaction: &Interaction, context: &HandlerContext) -> Result<InteractionResponse> {
        let Some(CustomId::MakeQuizModal { channel_id }) = interaction.custom_id().and_then(CustomId::parse) else {
            warn!(custom_id = interaction.custom_id(), "quiz modal without a channel");
            return Ok(InteractionResponse::ephemeral("This form has expired. Run /make_quiz again."));
        };
        let fields = interaction.modal_fields();
        let number = fields.get(QUIZ_NUMBER).copied().unwrap_or_default();
        let text = fields.get(QUIZ_TEXT).copied().unwrap_or_default();
        activity_log::record_as(context, interaction, "make_quiz").await;
        activity_log::post(
            context,
            format!("**[make_quiz]**\n- Channel: <#{channel_id}>\n- Number: {number}\n- Question:\n{text}"),
        )
        .await;
        Ok(InteractionResponse::ephemeral(format!(
            "Quiz received.\n**Channel**: <#{channel_id}>\n**Number**: {number}\n**Question**:\n{text}"
        )))
    }
}

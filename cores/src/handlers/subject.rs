
use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::activity_log;
use crate::context::HandlerContext;
use crate::interaction::Interaction;
use crate::registry::InteractionHandler;
use crate::response::InteractionResponse;
use crate::store_client::StoreRecord;

const SUBJECT_TABLE: &str = "sub";

/// `/make_subject name:<text>` registers a subject in the store.
pub struct MakeSubject;

#[async_trait]
impl InteractionHandler for MakeSubject {
    async fn handle(&self, interaction: &Interaction, context: &HandlerContext) -> Result<InteractionResponse> {
        let Some(name) = interaction.string_option("name") else {
            return Ok(InteractionResponse::message("No name was specified."));
        };
        let record = StoreRecord::new(SUBJECT_TABLE, "new").field("name", name);
        if let Err(error) = context.store().write(&record).await {
            warn!("subject write failed {:?}", error);
            return Ok(InteractionResponse::message("An error occurred while registering the data."));
        }
        activity_log::record(context, interaction).await;
        Ok(InteractionResponse::message(format!("Registered \"{name}\" in the subject table.")))
    }
}

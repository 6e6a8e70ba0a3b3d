
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::activity_log;
use crate::config::{DeferralMode, GatewayConfig};
use crate::context::HandlerContext;
use crate::interaction::{Interaction, InteractionKind};
use crate::ipc::DeferredAck;
use crate::registry::{HandlerRegistry, InteractionHandler, ResponseMode};
use crate::response::{InteractionResponse, MessageData};

const UNRECOGNIZED_COMMAND: &str = "Command not recognized";

/// What the gateway should answer for one interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Respond(InteractionResponse),
    /// Answer with the ack's placeholder and hand the body to the worker.
    Defer(DeferredAck),
    /// Interaction kind the gateway does not serve.
    Unsupported,
}

#[derive(Debug, Clone, Copy)]
pub struct DispatchSettings {
    pub deferral_mode: DeferralMode,
    pub sync_budget: Duration,
    pub deferred_budget: Duration,
}

impl DispatchSettings {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            deferral_mode: config.deferral_mode,
            sync_budget: config.sync_budget,
            deferred_budget: config.deferred_budget,
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            deferral_mode: DeferralMode::Worker,
            sync_budget: Duration::from_millis(2_500),
            deferred_budget: Duration::from_secs(60),
        }
    }
}

enum Route {
    Pong,
    Handler(Arc<dyn InteractionHandler>),
    UnrecognizedCommand,
    Acknowledge,
    Unsupported,
}

pub struct Dispatcher {
    registry: HandlerRegistry,
    context: Arc<HandlerContext>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(registry: HandlerRegistry, context: &Arc<HandlerContext>, settings: DispatchSettings) -> Arc<Self> {
        let context = Arc::clone(context);
        let dispatcher = Self {
            registry,
            context,
            settings,
        };
        Arc::new(dispatcher)
    }

    pub fn context(&self) -> &Arc<HandlerContext> {
        &self.context
    }

    pub async fn dispatch(&self, interaction: Interaction) -> Dispatch {
        match self.route(&interaction) {
            Route::Pong => Dispatch::Respond(InteractionResponse::Pong),
            Route::Unsupported => {
                info!(kind = ?interaction.kind, "unsupported interaction");
                Dispatch::Unsupported
            }
            Route::Acknowledge => {
                info!(kind = ?interaction.kind, custom_id = interaction.custom_id(), "no route, acknowledging");
                Dispatch::Respond(InteractionResponse::Acknowledge)
            }
            Route::UnrecognizedCommand => {
                info!(command = interaction.command_name(), "unrecognized command");
                activity_log::record(&self.context, &interaction).await;
                Dispatch::Respond(InteractionResponse::message(UNRECOGNIZED_COMMAND))
            }
            Route::Handler(handler) => match (handler.mode(), self.settings.deferral_mode) {
                (ResponseMode::Deferred { ephemeral }, DeferralMode::Worker) => {
                    Dispatch::Defer(Self::ack_for(interaction.kind, ephemeral))
                }
                _ => {
                    let response = self.run(handler, interaction, self.settings.sync_budget).await;
                    Dispatch::Respond(response)
                }
            },
        }
    }

    /// Runs the out-of-band half of a deferred interaction.
    ///
    /// Always yields exactly one message to put in place of the placeholder.
    pub async fn run_deferred(&self, interaction: Interaction) -> MessageData {
        let Route::Handler(handler) = self.route(&interaction) else {
            warn!(kind = ?interaction.kind, "deferred interaction has no handler");
            return MessageData::failure();
        };
        let response = self.run(handler, interaction, self.settings.deferred_budget).await;
        match response.into_followup() {
            Some(message) => message,
            None => {
                warn!("deferred handler produced a response that cannot be sent as a follow-up");
                MessageData::failure()
            }
        }
    }

    fn ack_for(kind: InteractionKind, ephemeral: bool) -> DeferredAck {
        match kind {
            InteractionKind::Command => DeferredAck::Message { ephemeral },
            _ => DeferredAck::Update,
        }
    }

    fn route(&self, interaction: &Interaction) -> Route {
        let handler = match interaction.kind {
            InteractionKind::Ping => return Route::Pong,
            InteractionKind::Command => {
                let name = interaction.command_name().unwrap_or_default();
                match self.registry.command(name) {
                    Some(handler) => handler,
                    None => return Route::UnrecognizedCommand,
                }
            }
            InteractionKind::Component => {
                let custom_id = interaction.custom_id().unwrap_or_default();
                match self.registry.component(custom_id) {
                    Some(handler) => handler,
                    None => return Route::Acknowledge,
                }
            }
            InteractionKind::Modal => {
                let custom_id = interaction.custom_id().unwrap_or_default();
                match self.registry.modal(custom_id) {
                    Some(handler) => handler,
                    None => return Route::Acknowledge,
                }
            }
            InteractionKind::Autocomplete | InteractionKind::Other(_) => return Route::Unsupported,
        };
        Route::Handler(Arc::clone(handler))
    }

    // Handlers run on their own task so a panic is contained like an error.
    async fn run(&self, handler: Arc<dyn InteractionHandler>, interaction: Interaction, budget: Duration) -> InteractionResponse {
        let context = Arc::clone(&self.context);
        let mut task = tokio::spawn(async move {
            handler.handle(&interaction, &context).await
        });
        match timeout(budget, &mut task).await {
            Ok(Ok(Ok(response))) => response,
            Ok(Ok(Err(error))) => {
                warn!("handler failed {:?}", error);
                InteractionResponse::failure()
            }
            Ok(Err(error)) => {
                error!("handler task aborted {:?}", error);
                InteractionResponse::failure()
            }
            Err(_) => {
                task.abort();
                warn!(budget_ms = budget.as_millis() as u64, "handler exceeded its budget");
                InteractionResponse::failure()
            }
        }
    }
}


use std::sync::Arc;

use lambda_http::Error;
use lambda_http::{Body, Request, Response};

use cores::dispatch::Dispatch;
use cores::interaction::Interaction;
use cores::ipc::DeferredInvocation;
use cores::response::InteractionResponse;

use crate::discord_verification::{SignatureContext, raw_body};
use crate::runtime_context::RuntimeContext;

pub struct DiscordRequestHandler {
    runtime_context: Arc<RuntimeContext>,
}

impl DiscordRequestHandler {
    pub fn new(runtime_context: &Arc<RuntimeContext>) -> Arc<Self> {
        let runtime_context = Arc::clone(runtime_context);
        let handler = Self {
            runtime_context,
        };
        Arc::new(handler)
    }

    // https://discord.com/developers/docs/interactions/receiving-and-responding#receiving-an-interaction
    pub async fn handle_interaction_request(&self, event: Request) -> Result<Response<Body>, Error> {
        let public_key = self.runtime_context.public_key();
        if !SignatureContext::from_request(&event, public_key).verify() {
            tracing::info!("/interactions verification failed");
            return self.text_response(401, "invalid request signature");
        }
        let Some(body) = raw_body(event.body()).and_then(|bytes| std::str::from_utf8(bytes).ok()) else {
            tracing::info!("/interactions body is not text");
            return self.text_response(400, "bad request");
        };
        let interaction = match Interaction::parse(body) {
            Ok(interaction) => interaction,
            Err(error) => {
                tracing::info!("/interactions malformed envelope {:?}", error);
                return self.text_response(400, "bad request");
            }
        };
        match self.runtime_context.dispatcher().dispatch(interaction).await {
            Dispatch::Respond(response) => self.json_response(&response),
            Dispatch::Unsupported => self.text_response(404, "not found"),
            Dispatch::Defer(ack) => {
                // the worker must have accepted the job before the placeholder goes out
                let invocation = DeferredInvocation {
                    ack,
                    body: body.to_string(),
                };
                match self.runtime_context.channel_client().enqueue(invocation).await {
                    Ok(()) => self.json_response(&ack.placeholder()),
                    Err(error) => {
                        tracing::warn!("/interactions deferral failed {:?}", error);
                        self.json_response(&InteractionResponse::failure())
                    }
                }
            }
        }
    }

    fn json_response(&self, response: &InteractionResponse) -> Result<Response<Body>, Error> {
        let body = serde_json::to_string(response)?;
        let response = Response::builder()
            .status(200)
            .header("content-type", "application/json")
            .body(body.into())
            .map_err(Box::new)?;
        Ok(response)
    }

    fn text_response(&self, status: u16, text: &str) -> Result<Response<Body>, Error> {
        let response = Response::builder()
            .status(status)
            .header("content-type", "text/plain")
            .body(text.into())
            .map_err(Box::new)?;
        Ok(response)
    }
}

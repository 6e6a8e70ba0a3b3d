use std::sync::Arc;

use cores::config::GatewayConfig;
use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response, http::Method};

mod runtime_context;
mod channel_client;
mod discord_requests;
mod discord_verification;

use discord_requests::DiscordRequestHandler;
use runtime_context::RuntimeContext;

// https://github.com/awslabs/aws-lambda-rust-runtime/tree/main/examples
async fn function_handler(event: Request, context: &Arc<RuntimeContext>) -> Result<Response<Body>, Error> {
    match (event.method(), event.raw_http_path()) {
        (&Method::POST, "/interactions") => {
            let request_handler = DiscordRequestHandler::new(context);
            request_handler.handle_interaction_request(event).await
        },
        (&Method::GET, "/") | (&Method::GET, "/interactions") => {
            handle_liveness(event).await
        },
        _ => {
            handle_not_found(event).await
        }
    }
}

async fn handle_liveness(_event: Request) -> Result<Response<Body>, Error> {
    let response = Response::builder()
        .status(200)
        .header("content-type", "text/plain")
        .body("ok".into())
        .map_err(Box::new)?;
    Ok(response)
}

async fn handle_not_found(_event: Request) -> Result<Response<Body>, Error> {
    let response = Response::builder()
        .status(404)
        .header("content-type", "text/plain")
        .body("not found".into())
        .map_err(Box::new)?;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .init();
    let config = GatewayConfig::from_env()?;
    if config.public_key.is_none() {
        tracing::warn!("DISCORD_PUBLIC_KEY is empty, every interaction will be rejected");
    }
    let runtime_context = RuntimeContext::from_config(&config).await?;
    let func = |event| async {
        function_handler(event, &runtime_context).await
    };
    run(service_fn(func)).await
}

use std::sync::Arc;

use cores::config::GatewayConfig;
use cores::context::HandlerContext;
use cores::dispatch::{DispatchSettings, Dispatcher};
use cores::handlers;
use cores::ipc::DeferredInvocation;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

mod followup;

use followup::{FollowupRunner, PlaceholderWait};

// Errors are logged rather than returned: a failed async invocation is retried
// by Lambda, which would run the handler and edit the message a second time.
async fn function_handler(event: LambdaEvent<DeferredInvocation>, runner: &Arc<FollowupRunner>) -> Result<(), Error> {
    let request_id = event.context.request_id;
    if let Err(error) = runner.complete(event.payload).await {
        tracing::error!(request_id = %request_id, "deferred interaction failed {:?}", error);
    }
    Ok(())
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
    let context = HandlerContext::from_config(&config).await?;
    let dispatcher = Dispatcher::new(handlers::registry()?, &context, DispatchSettings::from_config(&config));
    let runner = FollowupRunner::new(&dispatcher, PlaceholderWait::default());
    let func = |event| async {
        function_handler(event, &runner).await
    };
    run(service_fn(func)).await
}

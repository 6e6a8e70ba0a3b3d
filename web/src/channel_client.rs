
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use cores::ipc::DeferredInvocation;
use tracing::info;

use aws_sdk_lambda::Client;

/// Hands a deferred interaction to the out-of-band worker.
#[async_trait]
pub trait DeferredChannel: Send + Sync {
    /// Resolves once the worker has durably accepted the invocation.
    async fn enqueue(&self, invocation: DeferredInvocation) -> Result<()>;
}

pub struct ChannelClient {
    client: Client,
    function_name: String,
}

impl ChannelClient {
    pub async fn connect(function_name: impl Into<String>) -> Arc<Self> {
        let config = aws_config::load_defaults(BehaviorVersion::v2023_11_09()).await;
        let client = Self {
            client: Client::new(&config),
            function_name: function_name.into(),
        };
        Arc::new(client)
    }
}

#[async_trait]
impl DeferredChannel for ChannelClient {
    async fn enqueue(&self, invocation: DeferredInvocation) -> Result<()> {
        info!(function = %self.function_name, "invoke in progress");
        let payload = serde_json::to_string(&invocation)?;
        self.client.invoke()
            .function_name(&self.function_name)
            .payload(Blob::new(payload))
            .invocation_type(InvocationType::Event)
            .send()
            .await?;
        info!("invoke complete");
        Ok(())
    }
}

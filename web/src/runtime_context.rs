
use std::sync::Arc;

use anyhow::Result;
use cores::config::GatewayConfig;
use cores::context::HandlerContext;
use cores::dispatch::{DispatchSettings, Dispatcher};
use cores::handlers;

use crate::channel_client::{ChannelClient, DeferredChannel};

pub struct RuntimeContext {
    public_key: Option<String>,
    dispatcher: Arc<Dispatcher>,
    channel_client: Arc<dyn DeferredChannel>,
}

impl RuntimeContext {
    pub async fn from_config(config: &GatewayConfig) -> Result<Arc<Self>> {
        let handler_context = HandlerContext::from_config(config).await?;
        let dispatcher = Dispatcher::new(
            handlers::registry()?,
            &handler_context,
            DispatchSettings::from_config(config),
        );
        let channel_client = ChannelClient::connect(&config.worker_function_name).await;
        Ok(Self::new(config.public_key.clone(), dispatcher, channel_client))
    }

    pub fn new(
        public_key: Option<String>,
        dispatcher: Arc<Dispatcher>,
        channel_client: Arc<dyn DeferredChannel>,
    ) -> Arc<Self> {
        let context = Self {
            public_key,
            dispatcher,
            channel_client,
        };
        Arc::new(context)
    }

    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn channel_client(&self) -> &Arc<dyn DeferredChannel> {
        &self.channel_client
    }
}

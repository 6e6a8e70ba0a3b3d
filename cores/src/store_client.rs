
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use aws_sdk_lambda::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

/// One write request for the key-value store writer function.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StoreRecord {
    pub table: String,
    pub track: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StoreRecord {
    pub fn new(table: impl Into<String>, track: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            track: track.into(),
            fields: Map::new(),
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn write(&self, record: &StoreRecord) -> Result<()>;
}

/// Writes records by asynchronously invoking the store writer Lambda function.
pub struct StoreClient {
    client: Client,
    function_name: String,
}

impl StoreClient {
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
impl KeyValueStore for StoreClient {
    async fn write(&self, record: &StoreRecord) -> Result<()> {
        info!(table = %record.table, track = %record.track, "store write in progress");
        let payload = serde_json::to_string(record)?;
        self.client.invoke()
            .function_name(&self.function_name)
            .payload(Blob::new(payload))
            .invocation_type(InvocationType::Event)
            .send()
            .await?;
        info!("store write queued");
        Ok(())
    }
}

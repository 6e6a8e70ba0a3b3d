//! Shared pieces of the interaction gateway and its deferred worker.

pub mod activity_log;
pub mod config;
pub mod context;
pub mod custom_id;
pub mod discord_client;
pub mod dispatch;
pub mod handlers;
pub mod interaction;
pub mod ipc;
pub mod registry;
pub mod response;
pub mod store_client;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

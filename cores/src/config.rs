
use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};

pub const DISCORD_DEFAULT_API_BASE_URL: &str = "https://discord.com/api/v10";
pub const DEFAULT_WORKER_FUNCTION_NAME: &str = "terakoya-gateway-worker";
pub const DEFAULT_STORE_FUNCTION_NAME: &str = "Terakoya_DynamoDB_Write";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferralMode {
    /// Hand deferred work to the worker function and answer with a placeholder.
    Worker,
    /// Run deferred work before answering.
    Inline,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub public_key: Option<String>,
    pub bot_token: String,
    pub log_channel_id: String,
    pub api_base_url: String,
    pub deferral_mode: DeferralMode,
    pub worker_function_name: String,
    pub store_function_name: String,
    pub quiz_category_id: Option<String>,
    pub http_timeout: Duration,
    pub sync_budget: Duration,
    pub deferred_budget: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let deferral_mode = match var("DEFERRAL_MODE").as_deref() {
            None | Some("worker") => DeferralMode::Worker,
            Some("inline") => DeferralMode::Inline,
            Some(other) => bail!("DEFERRAL_MODE must be `worker` or `inline`, got `{other}`"),
        };
        let millis = |key: &str, default: u64| -> Result<Duration> {
            let value = match var(key) {
                Some(value) => value.parse().with_context(|| format!("{key} is not a number"))?,
                None => default,
            };
            Ok(Duration::from_millis(value))
        };
        let config = Self {
            public_key: var("DISCORD_PUBLIC_KEY"),
            bot_token: var("DISCORD_BOT_TOKEN").context("DISCORD_BOT_TOKEN is empty")?,
            log_channel_id: var("BOT_LOG_CHANNEL_ID").context("BOT_LOG_CHANNEL_ID is empty")?,
            api_base_url: var("DISCORD_API_BASE_URL").unwrap_or_else(|| DISCORD_DEFAULT_API_BASE_URL.into()),
            deferral_mode,
            worker_function_name: var("WORKER_FUNCTION_NAME").unwrap_or_else(|| DEFAULT_WORKER_FUNCTION_NAME.into()),
            store_function_name: var("STORE_FUNCTION_NAME").unwrap_or_else(|| DEFAULT_STORE_FUNCTION_NAME.into()),
            quiz_category_id: var("QUIZ_CATEGORY_ID"),
            http_timeout: millis("HTTP_TIMEOUT_MS", 2_000)?,
            // Discord drops interactions that are not answered within 3 seconds
            sync_budget: millis("SYNC_BUDGET_MS", 2_500)?,
            deferred_budget: millis("DEFERRED_BUDGET_MS", 60_000)?,
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("BOT_LOG_CHANNEL_ID", "100"),
        ]))
        .unwrap();
        assert_eq!(config.public_key, None);
        assert_eq!(config.api_base_url, DISCORD_DEFAULT_API_BASE_URL);
        assert_eq!(config.deferral_mode, DeferralMode::Worker);
        assert_eq!(config.worker_function_name, DEFAULT_WORKER_FUNCTION_NAME);
        assert_eq!(config.sync_budget, Duration::from_millis(2_500));
        assert_eq!(config.quiz_category_id, None);
    }

    #[test]
    fn reads_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("DISCORD_PUBLIC_KEY", "abcd"),
            ("DISCORD_BOT_TOKEN", "token"),
            ("BOT_LOG_CHANNEL_ID", "100"),
            ("DEFERRAL_MODE", "inline"),
            ("QUIZ_CATEGORY_ID", "200"),
            ("HTTP_TIMEOUT_MS", "750"),
        ]))
        .unwrap();
        assert_eq!(config.public_key.as_deref(), Some("abcd"));
        assert_eq!(config.deferral_mode, DeferralMode::Inline);
        assert_eq!(config.quiz_category_id.as_deref(), Some("200"));
        assert_eq!(config.http_timeout, Duration::from_millis(750));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(GatewayConfig::from_lookup(lookup(&[("BOT_LOG_CHANNEL_ID", "100")])).is_err());
        assert!(GatewayConfig::from_lookup(lookup(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("BOT_LOG_CHANNEL_ID", "100"),
            ("DEFERRAL_MODE", "later"),
        ]))
        .is_err());
        assert!(GatewayConfig::from_lookup(lookup(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("BOT_LOG_CHANNEL_ID", "100"),
            ("SYNC_BUDGET_MS", "soon"),
        ]))
        .is_err());
    }
}

//! OpenAI-compatible client configuration.

use crate::config::ModelSettings;
use crate::error::{ReelError, Result};
use async_openai::{config::OpenAIConfig, Client};
use backoff::ExponentialBackoffBuilder;
use std::time::Duration;

/// Create a client for the configured provider, with the configured timeout.
///
/// Any OpenAI-compatible endpoint works through `model.api_base`.
pub fn create_client(settings: &ModelSettings) -> Result<Client<OpenAIConfig>> {
    let api_key = settings.api_key().ok_or_else(|| {
        ReelError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            settings.api_key_env, settings.api_key_env
        ))
    })?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = &settings.api_base {
        config = config.with_api_base(base.trim_end_matches('/'));
    }

    create_client_with_timeout(config, Duration::from_secs(settings.timeout_secs))
}

/// Create a client with a custom config and timeout.
///
/// Rate-limited requests fail at once instead of being retried, so a model
/// call never outlives `timeout` in backoff sleeps.
pub fn create_client_with_timeout(
    config: OpenAIConfig,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;
    let no_retry = ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build();

    Ok(Client::with_config(config)
        .with_http_client(http_client)
        .with_backoff(no_retry))
}

/// List model IDs offered by the configured provider.
pub async fn list_models(client: &Client<OpenAIConfig>) -> Result<Vec<String>> {
    let response = client
        .models()
        .list()
        .await
        .map_err(|e| ReelError::Upstream(format!("Model listing failed: {}", e)))?;

    let mut ids: Vec<String> = response.data.into_iter().map(|m| m.id).collect();
    ids.sort();
    Ok(ids)
}

use crate::config::Config;
use crate::core::error::GemtermError;
use crate::providers::{Content, LLMProvider, Response};
use async_trait::async_trait;
use tracing::info;

mod client;
mod types;

pub use client::GeminiClient;

#[derive(Clone)]
pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    /// Builds a client bound to the configured key, model, generation
    /// parameters, system instruction and safety thresholds.
    pub fn from_config(config: &Config) -> Result<Self, GemtermError> {
        let client = GeminiClient::new(
            config.base_url().to_string(),
            config.api_key.clone(),
            config.model.clone(),
        )?
        .with_system_instruction(config.system_instruction())
        .with_generation_settings(&config.generation)
        .with_safety_thresholds(config.thresholds());

        info!(model = %client.model, "Gemini client ready");
        Ok(Self { client })
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate_content(&self, contents: &[Content]) -> Result<Response, GemtermError> {
        self.client.generate_content(contents).await
    }

    fn model(&self) -> &str {
        &self.client.model
    }
}

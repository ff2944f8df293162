use crate::config::{GenerationSettings, HarmCategory, SafetyThreshold};
use crate::core::error::GemtermError;
use crate::providers::base_client::HttpClient;
use crate::providers::gemini::types::*;
use crate::providers::{Candidate, Content, Part, Response, Role};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, error};

#[derive(Clone)]
pub struct GeminiClient {
    pub model: String,
    client: HttpClient,
    system_instruction: Option<GeminiContent>,
    generation_config: Option<GenerationConfig>,
    safety_settings: Vec<SafetySetting>,
}

impl GeminiClient {
    /// `model` may be given bare (`gemini-1.5-flash`) or `models/`-prefixed.
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self, GemtermError> {
        let mut client = HttpClient::new(base_url)?;

        // Add API key to query params
        client.add_query_param("key", api_key);

        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Ok(Self {
            model,
            client,
            system_instruction: None,
            generation_config: None,
            safety_settings: Vec::new(),
        })
    }

    pub fn with_system_instruction(mut self, instruction: Option<&str>) -> Self {
        self.system_instruction = instruction.map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart::Text {
                text: text.to_string(),
            }],
        });
        self
    }

    pub fn with_generation_settings(mut self, settings: &GenerationSettings) -> Self {
        let config = GenerationConfig {
            temperature: settings.temperature,
            top_p: settings.top_p,
            top_k: settings.top_k,
            max_output_tokens: settings.max_output_tokens,
            response_mime_type: settings
                .response_mime_type
                .clone()
                .filter(|mime| !mime.trim().is_empty()),
        };
        self.generation_config = if config.is_empty() { None } else { Some(config) };
        self
    }

    pub fn with_safety_thresholds(mut self, thresholds: [SafetyThreshold; 4]) -> Self {
        self.safety_settings = HarmCategory::ALL
            .iter()
            .zip(thresholds)
            .map(|(category, threshold)| SafetySetting {
                category: category.api_name(),
                threshold: threshold.api_name(),
            })
            .collect();
        self
    }

    pub async fn generate_content(&self, contents: &[Content]) -> Result<Response, GemtermError> {
        let payload = self.build_payload(contents);
        debug!(
            model = %self.model,
            endpoint = %self.client.endpoint(),
            turns = payload.contents.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(
                &format!("v1beta/models/{}:generateContent", self.model),
                &payload,
            )
            .await?;

        let status = response.status();
        let response_body = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<GeminiErrorEnvelope>(&response_body) {
                Ok(envelope) => format!(
                    "{} {}: {}",
                    envelope.error.code, envelope.error.status, envelope.error.message
                ),
                Err(_) => format!("{}: {}", status, response_body.trim()),
            };
            error!(%status, "Gemini API returned an error: {}", message);
            return Err(GemtermError::Api(message));
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_body).map_err(|e| {
            error!("Failed to parse Gemini response: {}\nBody: {}", e, response_body);
            GemtermError::Serialization(format!("Failed to parse Gemini response: {}", e))
        })?;

        into_response(parsed)
    }

    fn build_payload(&self, contents: &[Content]) -> GeminiRequest {
        GeminiRequest {
            contents: contents.iter().map(to_wire).collect(),
            system_instruction: self.system_instruction.clone(),
            generation_config: self.generation_config.clone(),
            safety_settings: self.safety_settings.clone(),
        }
    }
}

fn to_wire(content: &Content) -> GeminiContent {
    GeminiContent {
        role: content.role.map(|role| role.as_str().to_string()),
        parts: content
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => GeminiPart::Text { text: text.clone() },
                Part::Blob { mime_type, data } => GeminiPart::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.clone(),
                        data: BASE64.encode(data),
                    },
                },
            })
            .collect(),
    }
}

fn from_wire(content: GeminiContent) -> Result<Content, GemtermError> {
    let role = match content.role.as_deref() {
        Some("user") => Some(Role::User),
        Some("model") => Some(Role::Model),
        _ => None,
    };

    let mut parts = Vec::with_capacity(content.parts.len());
    for part in content.parts {
        match part {
            GeminiPart::Text { text } => parts.push(Part::Text(text)),
            GeminiPart::InlineData { inline_data } => parts.push(Part::Blob {
                data: BASE64.decode(inline_data.data.as_bytes())?,
                mime_type: inline_data.mime_type,
            }),
            GeminiPart::Other(value) => debug!(?value, "Skipping unsupported response part"),
        }
    }

    Ok(Content { role, parts })
}

/// Converts the wire response, turning safety blocks into errors.
fn into_response(parsed: GeminiResponse) -> Result<Response, GemtermError> {
    if let Some(reason) = parsed
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
        .filter(|reason| *reason != "BLOCK_REASON_UNSPECIFIED")
    {
        return Err(GemtermError::Blocked(format!("prompt: {}", reason)));
    }

    if let Some(reason) = parsed
        .candidates
        .first()
        .and_then(|candidate| candidate.finish_reason.as_deref())
        .filter(|reason| matches!(*reason, "SAFETY" | "RECITATION"))
    {
        return Err(GemtermError::Blocked(format!("candidate: {}", reason)));
    }

    let mut candidates = Vec::with_capacity(parsed.candidates.len());
    for candidate in parsed.candidates {
        candidates.push(Candidate {
            content: candidate.content.map(from_wire).transpose()?,
            finish_reason: candidate.finish_reason,
        });
    }

    Ok(Response { candidates })
}

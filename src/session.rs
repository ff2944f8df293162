use crate::core::error::GemtermError;
use crate::providers::{Content, LLMProvider, Part, Response, Role};
use std::path::Path;
use tracing::{debug, warn};

/// Every image upload is tagged with this type, whatever the file really is.
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// A single user request.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Text(String),
    Image { text: String, bytes: Vec<u8> },
}

impl Prompt {
    pub fn into_content(self) -> Content {
        match self {
            Prompt::Text(text) => Content::user(vec![Part::Text(text)]),
            Prompt::Image { text, bytes } => {
                let mut parts = vec![Part::Blob {
                    mime_type: IMAGE_MIME_TYPE.to_string(),
                    data: bytes,
                }];
                if !text.is_empty() {
                    parts.push(Part::Text(text));
                }
                Content::user(parts)
            }
        }
    }
}

/// Chat history for text mode. Each successful exchange appends the user
/// turn followed by the model turn.
#[derive(Debug, Default)]
pub struct ChatSession {
    history: Vec<Content>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Sends `prompt` with the running history. History is left untouched
    /// when the request fails.
    pub async fn send_text(
        &mut self,
        provider: &dyn LLMProvider,
        prompt: &str,
    ) -> Result<Response, GemtermError> {
        let user_turn = Prompt::Text(prompt.to_string()).into_content();

        let mut contents = Vec::with_capacity(self.history.len() + 1);
        contents.extend_from_slice(&self.history);
        contents.push(user_turn.clone());

        let response = provider.generate_content(&contents).await?;

        self.history.push(user_turn);
        if let Some(reply) = response.first_content() {
            // The API may leave the role out; the next request needs it
            self.history.push(Content {
                role: Some(Role::Model),
                ..reply.clone()
            });
        }
        debug!(turns = self.history.len(), "Chat history updated");

        Ok(response)
    }
}

/// One-shot image request; nothing is remembered afterwards.
pub async fn send_image(
    provider: &dyn LLMProvider,
    prompt: &str,
    image: Vec<u8>,
) -> Result<Response, GemtermError> {
    let content = Prompt::Image {
        text: prompt.to_string(),
        bytes: image,
    }
    .into_content();
    provider.generate_content(&[content]).await
}

/// Logs when a file is about to be uploaded under the wrong MIME type.
pub fn warn_if_not_jpeg(path: &Path) {
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false);
    if !is_jpeg {
        warn!(
            path = %path.display(),
            "Image will be sent as {} regardless of its format",
            IMAGE_MIME_TYPE
        );
    }
}

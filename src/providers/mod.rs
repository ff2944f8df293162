use crate::core::error::GemtermError;
use async_trait::async_trait;

pub mod base_client;
pub mod gemini;
#[cfg(test)]
pub mod mock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One unit of request or response content.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    Blob { mime_type: String, data: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub role: Option<Role>,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some(Role::User),
            parts,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

/// A decoded `generateContent` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub candidates: Vec<Candidate>,
}

impl Response {
    /// Builds a response holding a single text part, as the model would reply.
    #[cfg(test)]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some(Role::Model),
                    parts: vec![Part::Text(text.into())],
                }),
                finish_reason: Some("STOP".to_string()),
            }],
        }
    }

    /// Content of the first candidate, which is what a chat keeps as the reply.
    pub fn first_content(&self) -> Option<&Content> {
        self.candidates.first().and_then(|c| c.content.as_ref())
    }
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Sends the full list of turns and returns the model's answer.
    async fn generate_content(&self, contents: &[Content]) -> Result<Response, GemtermError>;

    fn model(&self) -> &str;
}

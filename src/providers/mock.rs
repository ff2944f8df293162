use super::{Content, LLMProvider, Response};
use crate::core::error::GemtermError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Provider double that replays queued replies and records every request.
#[derive(Clone, Default)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<Result<Response, GemtermError>>>>,
    requests: Arc<Mutex<Vec<Vec<Content>>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_reply(self, text: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(Response::from_text(text)));
        self
    }

    pub fn with_response(self, response: Response) -> Self {
        self.replies.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn with_error(self, error: GemtermError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<Vec<Content>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMProvider for MockProvider {
    async fn generate_content(&self, contents: &[Content]) -> Result<Response, GemtermError> {
        self.requests.lock().unwrap().push(contents.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Response::from_text("mock reply")))
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

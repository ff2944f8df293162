use crate::core::error::GemtermError;
use reqwest::{Client, Response};
use serde::Serialize;

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    endpoint: String,
    query_params: Vec<(String, String)>,
}

impl HttpClient {
    pub fn new(endpoint: String) -> Result<Self, GemtermError> {
        let client = Client::builder()
            .user_agent(concat!("gemterm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GemtermError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            query_params: Vec::new(),
        })
    }

    pub fn add_query_param(&mut self, key: &str, value: String) {
        self.query_params.push((key.to_string(), value));
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, GemtermError> {
        let url = format!("{}/{}", self.endpoint, path.trim_start_matches('/'));

        let response = self
            .client
            .post(&url)
            .query(&self.query_params)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;
        Ok(response)
    }
}

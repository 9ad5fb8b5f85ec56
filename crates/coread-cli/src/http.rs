//! [`ReaderApi`] over the backend's JSON HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use coread_engine::{
    Document, DocumentId, Message, ReaderApi, RemoteError, SendRequest, SendResponse, Thread,
    ThreadId, ThreadSummary,
};
use serde::de::DeserializeOwned;

const TIMEOUT: Duration = Duration::from_secs(120);

pub struct HttpApi {
    client: reqwest::Client,
    base: String,
}

impl HttpApi {
    /// Client for the service at `api_base` (e.g. `http://localhost:8000`)
    pub fn new(api_base: &str) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(transport)?;
        Ok(Self {
            client,
            base: format!("{}/api", api_base.trim_end_matches('/')),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        log::debug!("GET {path}");
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, RemoteError> {
        log::debug!("POST {path}");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }
}

fn transport(err: reqwest::Error) -> RemoteError {
    RemoteError::Transport(err.to_string())
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
    let status = response.status();
    let body = response.text().await.map_err(transport)?;
    if !status.is_success() {
        return Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
}

#[async_trait(?Send)]
impl ReaderApi for HttpApi {
    async fn fetch_document(&self, document_id: &DocumentId) -> Result<Document, RemoteError> {
        self.get(&format!("/documents/{document_id}")).await
    }

    async fn list_threads(
        &self,
        document_id: &DocumentId,
    ) -> Result<Vec<ThreadSummary>, RemoteError> {
        self.get(&format!("/threads/document/{document_id}")).await
    }

    async fn fetch_thread(&self, thread_id: &ThreadId) -> Result<Thread, RemoteError> {
        self.get(&format!("/threads/{thread_id}")).await
    }

    async fn send_message(&self, request: &SendRequest) -> Result<Vec<Message>, RemoteError> {
        let body = serde_json::to_value(request).map_err(|e| RemoteError::Decode(e.to_string()))?;
        let response: SendResponse = self
            .post(&format!("/threads/{}/messages", request.thread_id), &body)
            .await?;
        Ok(response.into_messages())
    }

    async fn generate_more(&self, thread_id: &ThreadId) -> Result<Vec<Message>, RemoteError> {
        self.post(
            &format!("/threads/{thread_id}/generate-more"),
            &serde_json::json!({}),
        )
        .await
    }
}

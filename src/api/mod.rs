// Versa backend client

pub mod sse;

use anyhow::{Context, Result};
use futures::stream::{Stream, StreamExt};
use reqwest::Client;
use std::pin::Pin;
use std::time::Duration;

use crate::models::{GenerateRequest, HistoryEntry};
use sse::{FrameDecoder, StreamEvent};

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

#[derive(Debug, Clone)]
pub struct VersaClient {
    base_url: String,
    client: Client,
}

impl VersaClient {
    pub fn new(base_url: String, request_timeout: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { base_url, client })
    }

    #[allow(dead_code)]
    pub fn with_default_url() -> Result<Self> {
        Self::new("http://localhost:8000".to_string(), 600)
    }

    /// Open the generation stream and decode it frame by frame.
    ///
    /// The returned stream yields events in wire order. An `Err` item is a
    /// transport failure; the stream ends after it.
    pub async fn generate_stream(&self, request: &GenerateRequest) -> Result<EventStream> {
        let url = format!("{}/api/generate_stream", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to send generate request")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Generate request failed with status {status}: {text}");
        }

        // Decode chunks into frames; queued events from one chunk are drained
        // before the next read, so wire order is preserved.
        let stream = futures::stream::unfold(
            (
                response.bytes_stream(),
                FrameDecoder::new(),
                Vec::new(),
                false,
            ),
            |(mut bytes, mut decoder, mut queued, mut ended)| async move {
                loop {
                    if !queued.is_empty() {
                        let event: StreamEvent = queued.remove(0);
                        return Some((Ok(event), (bytes, decoder, queued, ended)));
                    }
                    if ended {
                        return None;
                    }

                    match bytes.next().await {
                        Some(Ok(chunk)) => {
                            queued = decoder.feed(&chunk);
                        }
                        Some(Err(e)) => {
                            ended = true;
                            return Some((
                                Err(anyhow::anyhow!("Stream error: {e}")),
                                (bytes, decoder, queued, ended),
                            ));
                        }
                        None => {
                            ended = true;
                            queued = decoder.finish();
                        }
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }

    /// Fetch the full generation history, newest first. Replaces any prior
    /// list wholesale; the caller keeps its old list on failure.
    pub async fn fetch_history(&self) -> Result<Vec<HistoryEntry>> {
        let url = format!("{}/api/history", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send history request")?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("History request failed with status {status}");
        }

        let entries = response
            .json::<Vec<HistoryEntry>>()
            .await
            .context("Failed to parse history response")?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskKind;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerateRequest {
        GenerateRequest::new(TaskKind::EmailPolish, "draft".to_string(), None)
    }

    #[test]
    fn test_client_creation() {
        let client = VersaClient::new("http://localhost:8000".to_string(), 300);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_generate_stream_decodes_frames() {
        let server = MockServer::start().await;
        let body = "data: {\"content\":\"Hello\"}\ndata: {\"content\":\" World\"}\ndata: [DONE]\n";
        Mock::given(method("POST"))
            .and(path("/api/generate_stream"))
            .and(body_partial_json(serde_json::json!({
                "taskType": "EMAIL_POLISH",
                "rawContent": "draft"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let client = VersaClient::new(server.uri(), 30).unwrap();
        let mut stream = client.generate_stream(&request()).await.unwrap();

        let mut events = Vec::new();
        while let Some(item) = stream.next().await {
            events.push(item.unwrap());
        }
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("Hello".to_string()),
                StreamEvent::Delta(" World".to_string()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_generate_stream_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate_stream"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid taskType"))
            .mount(&server)
            .await;

        let client = VersaClient::new(server.uri(), 30).unwrap();
        let result = client.generate_stream(&request()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_generate_stream_without_trailing_newline() {
        let server = MockServer::start().await;
        let body = "data: {\"content\":\"tail\"}";
        Mock::given(method("POST"))
            .and(path("/api/generate_stream"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let client = VersaClient::new(server.uri(), 30).unwrap();
        let mut stream = client.generate_stream(&request()).await.unwrap();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, StreamEvent::Delta("tail".to_string()));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_history() {
        let server = MockServer::start().await;
        let body = serde_json::json!([
            {
                "id": 2,
                "task_type": "WEEKLY_REPORT",
                "generated_result": "【本周核心进展】\n1. 完成登录重构",
                "created_at": "2026-02-10T08:30:00"
            },
            {
                "id": 1,
                "task_type": "MEETING_MINUTES",
                "generated_result": {"要点": ["完成登录重构"]},
                "created_at": "2026-02-09T17:00:00"
            }
        ]);
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = VersaClient::new(server.uri(), 30).unwrap();
        let entries = client.fetch_history().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 2);
        assert_eq!(entries[0].task_type, TaskKind::WeeklyReport);
        assert!(entries[1].generated_result.is_object());
    }

    #[tokio::test]
    async fn test_fetch_history_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = VersaClient::new(server.uri(), 30).unwrap();
        assert!(client.fetch_history().await.is_err());
    }
}

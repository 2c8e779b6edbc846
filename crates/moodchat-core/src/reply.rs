use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize)]
struct ReplyRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ReplyResponse {
    reply: Option<String>,
    emotion: Option<String>,
}

/// A reply from the endpoint, with the mood it detected in the user's message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub reply: String,
    pub emotion: Option<String>,
}

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("{0}")]
    Transport(String),
    #[error("Reply endpoint returned status {0}")]
    Status(u16),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Invalid response")]
    MissingReply,
}

/// Anything that can answer a user message
#[async_trait]
pub trait ReplySource: Send + Sync {
    async fn send(&self, message: &str) -> Result<Reply, ReplyError>;
}

#[derive(Clone)]
pub struct ReplyClient {
    client: Client,
    endpoint: String,
}

impl ReplyClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl ReplySource for ReplyClient {
    async fn send(&self, message: &str) -> Result<Reply, ReplyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ReplyRequest { message })
            .send()
            .await
            .map_err(|e| ReplyError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ReplyError::Status(response.status().as_u16()));
        }

        let body: ReplyResponse = response
            .json()
            .await
            .map_err(|e| ReplyError::Malformed(e.to_string()))?;

        match body.reply {
            Some(reply) if !reply.trim().is_empty() => Ok(Reply {
                reply,
                emotion: body.emotion.filter(|e| !e.is_empty()),
            }),
            _ => Err(ReplyError::MissingReply),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_send_returns_reply_and_emotion() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/chat")
            .match_body(Matcher::Json(serde_json::json!({ "message": "I got the job!" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"reply": "That is wonderful news!", "emotion": "happy"}"#)
            .create_async()
            .await;

        let client = ReplyClient::new(&format!("{}/chat", server.url()));
        let reply = client.send("I got the job!").await.unwrap();

        assert_eq!(reply.reply, "That is wonderful news!");
        assert_eq!(reply.emotion.as_deref(), Some("happy"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_emotion_is_optional() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"reply": "Hello"}"#)
            .create_async()
            .await;

        let client = ReplyClient::new(&format!("{}/chat", server.url()));
        let reply = client.send("hi").await.unwrap();
        assert_eq!(reply.emotion, None);
    }

    #[tokio::test]
    async fn test_missing_reply_is_an_error() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"emotion": "sad"}"#)
            .create_async()
            .await;

        let client = ReplyClient::new(&format!("{}/chat", server.url()));
        let err = client.send("hi").await.unwrap_err();

        assert!(matches!(err, ReplyError::MissingReply));
        assert_eq!(err.to_string(), "Invalid response");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/chat")
            .with_status(500)
            .with_body(r#"{"reply": "ignored"}"#)
            .create_async()
            .await;

        let client = ReplyClient::new(&format!("{}/chat", server.url()));
        let err = client.send("hi").await.unwrap_err();
        assert!(matches!(err, ReplyError::Status(500)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let client = ReplyClient::new(&format!("{}/chat", server.url()));
        let err = client.send("hi").await.unwrap_err();
        assert!(matches!(err, ReplyError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        // Nothing listens on the discard port
        let client = ReplyClient::new("http://127.0.0.1:9/chat");
        let err = client.send("hi").await.unwrap_err();
        assert!(matches!(err, ReplyError::Transport(_)));
    }
}

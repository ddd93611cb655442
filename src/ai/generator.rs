use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AiConfig;

/// One chat-style generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// External text generation capability. Injected into the annotator so that
/// tests can substitute a scripted double.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, req: &CompletionRequest) -> anyhow::Result<String>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(cfg: &AiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn first_content(resp: ChatResponse) -> anyhow::Result<String> {
    let text = resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if text.is_empty() {
        bail!("completion had no content");
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn complete(&self, req: &CompletionRequest) -> anyhow::Result<String> {
        let Some(key) = self.api_key.as_deref() else {
            bail!("OPENAI_API_KEY not configured");
        };
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &req.system,
                },
                ChatMessage {
                    role: "user",
                    content: &req.user,
                },
            ],
            max_tokens: req.max_tokens,
            temperature: req.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .context("send chat completion")?;

        let status = res.status();
        if !status.is_success() {
            bail!("chat completion failed with status {status}");
        }
        let parsed: ChatResponse = res.json().await.context("decode chat completion")?;
        debug!(model = %self.model, "chat completion received");
        first_content(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::annotator::{Annotator, FALLBACK};
    use std::sync::Arc;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
    };
    use serde_json::json;

    fn parse(v: serde_json::Value) -> anyhow::Result<String> {
        first_content(serde_json::from_value(v)?)
    }

    #[test]
    fn takes_first_choice_trimmed() {
        let out = parse(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  That sounds like a full day.\n" } },
                { "message": { "role": "assistant", "content": "second" } }
            ]
        }))
        .unwrap();
        assert_eq!(out, "That sounds like a full day.");
    }

    #[test]
    fn empty_or_missing_content_is_an_error() {
        assert!(parse(json!({ "choices": [] })).is_err());
        assert!(parse(json!({})).is_err());
        assert!(parse(json!({ "choices": [ { "message": { "content": null } } ] })).is_err());
        assert!(parse(json!({ "choices": [ { "message": { "content": "   " } } ] })).is_err());
    }

    #[test]
    fn request_body_shape() {
        let body = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: [
                ChatMessage { role: "system", content: "sys" },
                ChatMessage { role: "user", content: "note" },
            ],
            max_tokens: 60,
            temperature: 0.7,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["model"], "gpt-3.5-turbo");
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["content"], "note");
        assert_eq!(v["max_tokens"], 60);
    }


    const NOTE: &str = "Long day at work, but the train ride home with a book was lovely.";

    fn keyed(base_url: String) -> OpenAiGenerator {
        OpenAiGenerator::new(&AiConfig {
            api_key: Some("sk-test".into()),
            base_url,
            model: "gpt-3.5-turbo".into(),
            timeout_secs: 2,
        })
        .unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "s".into(),
            user: NOTE.into(),
            max_tokens: 60,
            temperature: 0.7,
        }
    }

    /// Reads one HTTP request (headers plus a `content-length` body).
    async fn read_request(sock: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serves exactly one response and returns the base url to point at it.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let req = read_request(&mut sock).await;
            assert!(req.starts_with("POST /v1/chat/completions"));
            assert!(req.contains("Bearer sk-test"));
            let resp = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
        });
        format!("http://{addr}/v1")
    }

    #[tokio::test]
    async fn successful_completion_over_http() {
        let url = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":" Books make commutes kinder. "}}]}"#,
        )
        .await;
        let out = keyed(url).complete(&request()).await.unwrap();
        assert_eq!(out, "Books make commutes kinder.");
    }

    #[tokio::test]
    async fn server_error_status_is_an_error() {
        let url = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let err = keyed(url).complete(&request()).await.unwrap_err();
        assert!(err.to_string().contains("500"), "{err}");
    }

    #[tokio::test]
    async fn undecodable_body_is_an_error() {
        let url = serve_once("200 OK", "not json at all").await;
        assert!(keyed(url).complete(&request()).await.is_err());
    }

    #[tokio::test]
    async fn annotator_falls_back_on_server_error() {
        let url = serve_once("500 Internal Server Error", "").await;
        let annotator = Annotator::new(Arc::new(keyed(url)), Duration::from_secs(2));
        assert_eq!(annotator.annotate(NOTE).await.as_deref(), Some(FALLBACK));
    }

    #[tokio::test]
    async fn annotator_falls_back_when_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let annotator = Annotator::new(
            Arc::new(keyed(format!("http://{addr}/v1"))),
            Duration::from_secs(2),
        );
        assert_eq!(annotator.annotate(NOTE).await.as_deref(), Some(FALLBACK));
    }

    #[tokio::test]
    async fn missing_api_key_fails_without_network() {
        let gen = OpenAiGenerator::new(&AiConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9/v1/".into(),
            model: "m".into(),
            timeout_secs: 1,
        })
        .unwrap();
        let req = CompletionRequest {
            system: "s".into(),
            user: "u".into(),
            max_tokens: 10,
            temperature: 0.5,
        };
        let err = gen.complete(&req).await.unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}

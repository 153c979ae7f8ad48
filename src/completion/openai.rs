use super::TextCompletion;
use crate::error::EngageError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Pull the first choice's message text out of a chat-completions response.
fn extract_completion(json: &str) -> Result<String, EngageError> {
    let resp: ChatResponse = serde_json::from_str(json)
        .map_err(|e| EngageError::Service(format!("malformed completion response: {}", e)))?;
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| EngageError::Service("completion response had no choices".to_string()))
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl TextCompletion for OpenAiClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, EngageError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            max_tokens,
            temperature,
            top_p: 1.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(EngageError::Service(format!(
                "completion request failed ({}): {}",
                status, body
            )));
        }

        extract_completion(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_completion() {
        let json = r#"{
            "choices": [
                {
                    "message": {
                        "role": "assistant",
                        "content": "true"
                    },
                    "finish_reason": "stop"
                }
            ]
        }"#;
        assert_eq!(extract_completion(json).unwrap(), "true");
    }

    #[test]
    fn test_extract_completion_no_choices() {
        let json = r#"{"choices": []}"#;
        assert!(matches!(
            extract_completion(json),
            Err(EngageError::Service(_))
        ));
    }

    #[test]
    fn test_extract_completion_null_content() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        assert!(matches!(
            extract_completion(json),
            Err(EngageError::Service(_))
        ));
    }

    #[test]
    fn test_extract_completion_malformed() {
        assert!(matches!(
            extract_completion("not json"),
            Err(EngageError::Service(_))
        ));
    }

    #[test]
    fn test_request_serializes_messages_in_order() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            max_tokens: 70,
            temperature: 0.5,
            top_p: 1.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a sneaker enthusiast.",
                },
                ChatMessage {
                    role: "user",
                    content: "Analyze post: hello",
                },
            ],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 70);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
    }
}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::base::{LlmMetadata, LlmProvider, LlmProviderError};


#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    stream: bool,
    options: Options,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct Options {
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatReply {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}


/// Local Ollama server, `/api/chat` with streaming off.
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    temperature: f64,
    client: Client,
}

impl OllamaProvider {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, temperature: f64) -> Self {
        let endpoint = format!("{}/api/chat", base_url.into().trim_end_matches('/'));
        let model = model.into();
        info!("Ollama provider ready: {} at {}", model, endpoint);
        Self {
            endpoint,
            model,
            temperature,
            client: Client::new(),
        }
    }

    pub fn localhost(model: impl Into<String>, temperature: f64) -> Self {
        Self::new(crate::DEFAULT_OLLAMA_URL, model, temperature)
    }

    fn body<'a>(&'a self, system_prompt: &'a str, user_prompt: &'a str, json: bool) -> ChatBody<'a> {
        ChatBody {
            model: &self.model,
            messages: [
                Message { role: "system", content: system_prompt },
                Message { role: "user", content: user_prompt },
            ],
            stream: false,
            options: Options { temperature: self.temperature },
            format: json.then_some("json"),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        response_format: Option<&str>,
    ) -> Result<(String, LlmMetadata), LlmProviderError> {
        let body = self.body(system_prompt, user_prompt, response_format == Some("json_object"));

        let reply: ChatReply = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let content = reply.message.content;
        if content.trim().is_empty() {
            return Err(LlmProviderError::EmptyCompletion("ollama".to_string()));
        }
        Ok((content, LlmMetadata::new("ollama", &self.model)))
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = OllamaProvider::new("http://gpu-box:11434/", "llama3.2", 0.0);
        assert_eq!(provider.endpoint, "http://gpu-box:11434/api/chat");
    }

    #[test]
    fn test_json_format_only_for_json_object() {
        let provider = OllamaProvider::localhost("llama3.2", 0.2);
        let plain = serde_json::to_value(provider.body("sys", "hi", false)).unwrap();
        assert!(plain.get("format").is_none());
        assert_eq!(plain["messages"][0]["role"], "system");
        assert_eq!(plain["stream"], false);

        let json = serde_json::to_value(provider.body("sys", "hi", true)).unwrap();
        assert_eq!(json["format"], "json");
    }
}

//! OpenAI chat completions backend
//!
//! Works with api.openai.com and any server implementing the
//! `/v1/chat/completions` API (vLLM, LocalAI, llama-server, ...).
//!
//! No request is made unless a real credential is configured: the
//! placeholder key shipped in sample configs is treated as absent.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compose::PromptPayload;
use crate::config::{usable_credential, NarrativeConfig};
use crate::error::GenerationUnavailable;
use crate::prompts::{PromptId, PromptLibrary};

use super::{GenerationResult, NarrativeBackend};

/// Remote narrative generator backed by a chat completion API
#[derive(Clone)]
pub struct OpenAIBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl OpenAIBackend {
    pub fn new(config: &NarrativeConfig) -> Self {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            base_url: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: config.timeout,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    /// Use a specific prompt library instead of the default one
    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    /// The bearer token, or why there is none
    fn credential(&self) -> Result<&str, GenerationUnavailable> {
        usable_credential(self.api_key.as_deref())
    }

    /// Render (system, user) messages for the payload
    fn render_messages(
        &self,
        payload: &PromptPayload,
    ) -> Result<Vec<ChatMessage>, GenerationUnavailable> {
        let vars = payload.template_vars();
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| GenerationUnavailable::Prompt("prompt library lock poisoned".into()))?;
        let prompt = prompts
            .get(PromptId::ExpenseAnalysis)
            .map_err(|e| GenerationUnavailable::Prompt(e.to_string()))?;

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = prompt.render_system(&vars) {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.render_user(&vars),
        });
        Ok(messages)
    }

    async fn chat_completion(
        &self,
        api_key: &str,
        messages: Vec<ChatMessage>,
    ) -> GenerationResult {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationUnavailable::Api { status, body });
        }

        let chat_response: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerationUnavailable::Timeout(self.timeout)
            } else {
                GenerationUnavailable::MalformedResponse(e.to_string())
            }
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GenerationUnavailable::MalformedResponse("no content in response".into()))
    }

    fn classify_error(&self, e: reqwest::Error) -> GenerationUnavailable {
        if e.is_timeout() {
            GenerationUnavailable::Timeout(self.timeout)
        } else {
            GenerationUnavailable::Http(e)
        }
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl NarrativeBackend for OpenAIBackend {
    async fn generate(&self, payload: &PromptPayload) -> GenerationResult {
        let api_key = self.credential()?;
        let messages = self.render_messages(payload)?;

        debug!(model = %self.model, host = %self.base_url, "Requesting narrative");
        let text = self.chat_completion(api_key, messages).await?;
        debug!(chars = text.len(), "Narrative received");

        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::compose::compose_prompt;
    use crate::config::PLACEHOLDER_API_KEY;
    use crate::models::{Category, ExpenseDataset, ExpenseRecord, PaymentMethod};
    use crate::test_utils::{MockOpenAIServer, MockReply};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn payload() -> PromptPayload {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let records = vec![
            ExpenseRecord {
                id: 1,
                title: "Groceries".into(),
                description: None,
                amount: dec!(120.00),
                category: Category::Food,
                date: end,
                payment_method: PaymentMethod::DebitCard,
                vendor: Some("Market".into()),
            },
            ExpenseRecord {
                id: 2,
                title: "Bus".into(),
                description: None,
                amount: dec!(50.00),
                category: Category::Transportation,
                date: start,
                payment_method: PaymentMethod::Cash,
                vendor: None,
            },
        ];
        let dataset = ExpenseDataset::new(start, end, records).unwrap();
        compose_prompt(&dataset, &aggregate(&dataset))
    }

    fn backend(host: &str, api_key: Option<&str>) -> OpenAIBackend {
        let config = NarrativeConfig {
            api_key: api_key.map(str::to_string),
            host: host.to_string(),
            timeout: Duration::from_secs(2),
            ..NarrativeConfig::default()
        };
        OpenAIBackend::new(&config).with_prompts(PromptLibrary::embedded_only())
    }

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let b = backend("http://localhost:8080/", None);
        assert_eq!(b.host(), "http://localhost:8080");
        assert_eq!(b.model(), "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_placeholder_key_makes_no_request() {
        let server = MockOpenAIServer::start(MockReply::Text("never".into())).await;
        let b = backend(&server.url(), Some(PLACEHOLDER_API_KEY));

        let result = b.generate(&payload()).await;

        assert!(matches!(
            result,
            Err(GenerationUnavailable::PlaceholderCredential)
        ));
        assert_eq!(server.hits(), 0);
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let server = MockOpenAIServer::start(MockReply::Text("never".into())).await;

        let result = backend(&server.url(), None).generate(&payload()).await;
        assert!(matches!(result, Err(GenerationUnavailable::MissingCredential)));

        let result = backend(&server.url(), Some("  ")).generate(&payload()).await;
        assert!(matches!(result, Err(GenerationUnavailable::MissingCredential)));

        assert_eq!(server.hits(), 0);
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server =
            MockOpenAIServer::start(MockReply::Text("  Spend less on food.  ".into())).await;
        let b = backend(&server.url(), Some("sk-test"));

        let text = b.generate(&payload()).await.unwrap();

        assert_eq!(text, "Spend less on food.");
        assert_eq!(server.hits(), 1);
        assert_eq!(server.last_authorization().as_deref(), Some("Bearer sk-test"));

        let request = server.last_request().unwrap();
        assert_eq!(request["model"], "gpt-3.5-turbo");
        assert_eq!(request["max_tokens"], 500);
        assert_eq!(request["stream"], false);
        assert_eq!(request["messages"][0]["role"], "system");
        let user = request["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("Period: 2024-01-01 to 2024-01-31"));
        assert!(user.contains("Total Expenses: ₹170.00"));
        assert!(user.contains("- FOOD: ₹120.00"));
        assert!(user.contains("- TRANSPORTATION: ₹50.00"));
    }

    #[tokio::test]
    async fn test_generate_api_error() {
        let server = MockOpenAIServer::start(MockReply::Status(429)).await;
        let result = backend(&server.url(), Some("sk-test"))
            .generate(&payload())
            .await;

        match result {
            Err(GenerationUnavailable::Api { status, .. }) => assert_eq!(status, 429),
            other => panic!("expected API error, got {:?}", other),
        }
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_generate_malformed_body() {
        let server = MockOpenAIServer::start(MockReply::Malformed).await;
        let result = backend(&server.url(), Some("sk-test"))
            .generate(&payload())
            .await;
        assert!(matches!(
            result,
            Err(GenerationUnavailable::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_empty_choices() {
        let server = MockOpenAIServer::start(MockReply::Empty).await;
        let result = backend(&server.url(), Some("sk-test"))
            .generate(&payload())
            .await;
        assert!(matches!(
            result,
            Err(GenerationUnavailable::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_times_out() {
        let server = MockOpenAIServer::start(MockReply::Delayed(
            Duration::from_secs(5),
            "too late".into(),
        ))
        .await;
        let config = NarrativeConfig {
            api_key: Some("sk-test".into()),
            host: server.url(),
            timeout: Duration::from_millis(200),
            ..NarrativeConfig::default()
        };
        let b = OpenAIBackend::new(&config).with_prompts(PromptLibrary::embedded_only());

        let result = b.generate(&payload()).await;
        assert!(matches!(result, Err(GenerationUnavailable::Timeout(_))));
    }

    #[tokio::test]
    async fn test_generate_unreachable_host() {
        let result = backend("http://127.0.0.1:9", Some("sk-test"))
            .generate(&payload())
            .await;
        assert!(result.is_err());
    }
}

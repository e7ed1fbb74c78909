//! OpenAI-compatible vision adapter for receipt extraction.
//!
//! Supports OpenAI API, Azure OpenAI, OpenRouter and local Ollama instances, as long as
//! the model accepts `image_url` content parts.
//! Returns the reply text untouched; fence stripping and JSON parsing live in the domain.

use crate::domain::{DomainError, ReceiptImage};
use crate::ports::ExtractionPort;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// OpenAI-compatible extraction adapter.
///
/// Can be configured to work with:
/// - OpenAI API (api.openai.com)
/// - Azure OpenAI
/// - Ollama (localhost) with a vision model
/// - Any OpenAI-compatible API
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiAdapter {
    /// Create a new OpenAI adapter.
    ///
    /// # Arguments
    /// * `api_url` - API endpoint (e.g., "https://api.openai.com/v1/chat/completions")
    /// * `api_key` - API key (can be empty for local Ollama)
    /// * `model` - Vision-capable model name (e.g., "gpt-4o-mini", "llava")
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    /// Instruction sent alongside the image.
    fn extraction_prompt() -> &'static str {
        r#"Please analyze this bill/receipt image and extract all items with their prices. Return the data in a structured JSON format like this:
{
  "items": [
    {"name": "Item Name", "price": "0.00"},
    {"name": "Another Item", "price": "0.00"}
  ],
  "total": "0.00",
  "currency": "USD"
}

Only return the JSON data, no additional text."#
    }

    fn build_request(&self, image: &ReceiptImage) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.to_data_url(),
                        },
                    },
                    ContentPart::Text {
                        text: Self::extraction_prompt().to_string(),
                    },
                ],
            }],
            temperature: 0.0,
        }
    }
}

/// OpenAI API request structure.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

/// Multimodal content part.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

/// OpenAI API response structure.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait::async_trait]
impl ExtractionPort for OpenAiAdapter {
    async fn extract_text(&self, image: &ReceiptImage) -> Result<String, DomainError> {
        info!(
            model = %self.model,
            mime = %image.mime_type,
            bytes = image.bytes.len(),
            "sending receipt image to AI for extraction"
        );

        let request = self.build_request(image);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Ai(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "AI API returned error");
            return Err(DomainError::Ai(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Ai(format!("Failed to parse API response: {}", e)))?;

        let raw_content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| DomainError::Ai("No response choices returned".to_string()))?;

        debug!(raw_len = raw_content.len(), "received AI response");

        Ok(raw_content)
    }
}

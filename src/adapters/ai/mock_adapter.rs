//! Mock extraction adapter for running without API calls.
//!
//! Returns a canned, fenced JSON receipt, the way real models tend to reply.

use crate::domain::{DomainError, ReceiptImage};
use crate::ports::ExtractionPort;
use std::time::Duration;
use tracing::info;

const SAMPLE_RECEIPT: &str = r#"```json
{
  "items": [
    {"name": "[MOCK] Margherita Pizza", "price": "14.00"},
    {"name": "[MOCK] Caesar Salad", "price": "9.50"},
    {"name": "[MOCK] Sparkling Water", "price": "3.25"}
  ],
  "total": "26.75",
  "currency": "USD"
}
```"#;

/// Mock extraction adapter.
///
/// Returns predetermined text without making API calls.
/// Simulates network latency with configurable delay.
pub struct MockAiAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
    reply: String,
}

impl MockAiAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self::with_delay(100)
    }

    /// Create a mock adapter with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            reply: SAMPLE_RECEIPT.to_string(),
        }
    }

    /// Reply with `text` instead of the sample receipt.
    pub fn with_reply(mut self, text: impl Into<String>) -> Self {
        self.reply = text.into();
        self
    }
}

impl Default for MockAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ExtractionPort for MockAiAdapter {
    async fn extract_text(&self, image: &ReceiptImage) -> Result<String, DomainError> {
        info!(
            mime = %image.mime_type,
            bytes = image.bytes.len(),
            "[MOCK] Simulating receipt extraction"
        );

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        Ok(self.reply.clone())
    }
}

//! Turns model output into structured bill data.
//!
//! Models often wrap JSON in markdown fences; those are stripped before parsing.
//! A parse failure is a value ([`Extraction::Unparsed`]), never an error.

use crate::domain::{Bill, LineItem};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

/// Message carried by [`Extraction::Unparsed`].
pub const PARSE_FAILURE: &str = "Could not parse response";

/// Bill as returned by the model: `{ items: [{name, price}], total, currency }`.
///
/// Every field is optional; prices and the total may arrive as JSON strings or numbers
/// and are kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedBill {
    #[serde(default, deserialize_with = "items_lenient")]
    pub items: Vec<LineItem>,
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<String>,
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub currency: Option<String>,
}

/// Outcome of normalizing model text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Extraction {
    Parsed(ExtractedBill),
    /// Serializes as `{ "error": "Could not parse response", "rawText": "..." }`.
    Unparsed {
        error: String,
        #[serde(rename = "rawText")]
        raw_text: String,
    },
}

impl Extraction {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Extraction::Parsed(_))
    }

    /// Editable bill for a parsed extraction; `None` when the text could not be parsed.
    pub fn into_bill(self) -> Option<Bill> {
        match self {
            Extraction::Parsed(extracted) => Some(Bill::new(extracted.items)),
            Extraction::Unparsed { .. } => None,
        }
    }
}

/// Strip fences, parse JSON, fall back to the raw text.
pub fn normalize(text: &str) -> Extraction {
    let cleaned = strip_code_fences(text);
    match serde_json::from_str::<ExtractedBill>(&cleaned) {
        Ok(bill) => {
            debug!(
                items = bill.items.len(),
                currency = bill.currency.as_deref().unwrap_or(""),
                "normalized model output"
            );
            Extraction::Parsed(bill)
        }
        Err(e) => {
            warn!(
                error = %e,
                text = %text.chars().take(200).collect::<String>(),
                "model output is not bill JSON"
            );
            Extraction::Unparsed {
                error: PARSE_FAILURE.to_string(),
                raw_text: text.to_string(),
            }
        }
    }
}

/// Removes every "```json" / "```" marker together with its adjacent newline, then trims.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json\n", "")
        .replace("```json", "")
        .replace("\n```", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Wire form of a price or total before it becomes text.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
    Other(serde_json::Value),
}

impl TextOrNumber {
    fn into_text(self) -> Option<String> {
        match self {
            TextOrNumber::Text(s) => Some(s),
            TextOrNumber::Number(n) => Some(n.to_string()),
            TextOrNumber::Other(_) => None,
        }
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(TextOrNumber::deserialize(deserializer)?.into_text())
}

#[derive(Deserialize)]
struct WireItem {
    #[serde(default, deserialize_with = "text_or_number")]
    name: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    price: Option<String>,
}

fn items_lenient<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let wire: Option<Vec<WireItem>> = Option::deserialize(deserializer)?;
    Ok(wire
        .unwrap_or_default()
        .into_iter()
        .map(|item| LineItem {
            name: item.name.unwrap_or_default(),
            price: item.price.unwrap_or_default(),
        })
        .collect())
}

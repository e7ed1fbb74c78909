//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/IO types here; adapters map into these.

use crate::domain::money;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One priced entry on a bill.
///
/// `price` keeps the text as typed or extracted; use [`LineItem::amount`] for its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
        }
    }

    /// Blank item as added from the editor.
    pub fn blank() -> Self {
        Self::new("", "0.00")
    }

    /// Monetary value. Missing or non-numeric prices count as zero.
    pub fn amount(&self) -> Decimal {
        money::parse_lenient(&self.price)
    }
}

/// Ordered line items. The total is always derived from the items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bill {
    items: Vec<LineItem>,
}

impl Bill {
    pub fn new(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `round(sum(prices), 2)`.
    pub fn total(&self) -> Decimal {
        money::round_cents(money::sum(self.items.iter().map(LineItem::amount)))
    }

    /// Appends a blank item and returns its index.
    pub fn add_item(&mut self) -> usize {
        self.items.push(LineItem::blank());
        self.items.len() - 1
    }

    /// Returns false when `index` is out of range.
    pub fn update_name(&mut self, index: usize, name: impl Into<String>) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Returns false when `index` is out of range. The price text is stored as given.
    pub fn update_price(&mut self, index: usize, price: impl Into<String>) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.price = price.into();
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, index: usize) -> Option<LineItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Indices whose price text fails strict validation (these count as zero).
    pub fn invalid_prices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| money::parse_strict(&item.price).is_err())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn to_stored(&self) -> StoredBill {
        StoredBill {
            items: self.items.clone(),
            total: money::format_cents(self.total()),
        }
    }
}

impl From<Vec<LineItem>> for Bill {
    fn from(items: Vec<LineItem>) -> Self {
        Self::new(items)
    }
}

/// Hand-off record between the parse and split steps: `{ "items": [...], "total": "0.00" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBill {
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub total: String,
}

impl StoredBill {
    /// Rebuilds the bill; the stored total is not trusted.
    pub fn into_bill(self) -> Bill {
        Bill::new(self.items)
    }
}

/// Receipt photo as sent to the extraction model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptImage {
    /// `image/*` MIME type.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ReceiptImage {
    /// `data:` URL with the base64 payload, as accepted by vision chat APIs.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.bytes))
    }
}

/// Stable participant identity inside a split session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable line item identity inside a split session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A person sharing the bill. The name may be blank while being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
}

impl Participant {
    pub fn blank() -> Self {
        Self {
            id: ParticipantId::new(),
            name: String::new(),
        }
    }

    /// Blank (after trim) participants are left out of the allocation.
    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

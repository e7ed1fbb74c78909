//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, ReceiptImage, StoredBill};

/// Vision model that reads a receipt photo.
#[async_trait::async_trait]
pub trait ExtractionPort: Send + Sync {
    /// Send the image and return the model's reply text as-is (possibly fenced JSON,
    /// possibly prose). Normalization happens in the domain.
    async fn extract_text(&self, image: &ReceiptImage) -> Result<String, DomainError>;
}

/// Hand-off storage between the parse and split steps.
///
/// Holds at most one bill under a well-known key. It is read once when the split
/// step opens and never synchronized afterwards.
#[async_trait::async_trait]
pub trait BillStorePort: Send + Sync {
    async fn save_bill(&self, bill: &StoredBill) -> Result<(), DomainError>;

    /// `None` when nothing has been staged.
    async fn load_bill(&self) -> Result<Option<StoredBill>, DomainError>;

    async fn clear_bill(&self) -> Result<(), DomainError>;
}

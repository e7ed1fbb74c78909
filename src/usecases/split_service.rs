//! Split service. Hands a bill from the parse step to the split step.
//!
//! The bill is staged in the store once, then read back when a session opens.

use crate::domain::{Bill, DomainError, SplitSession, money};
use crate::ports::BillStorePort;
use std::sync::Arc;
use tracing::{info, warn};

pub struct SplitService {
    store: Arc<dyn BillStorePort>,
}

impl SplitService {
    pub fn new(store: Arc<dyn BillStorePort>) -> Self {
        Self { store }
    }

    /// Persist the edited bill for the split step.
    pub async fn stage_bill(&self, bill: &Bill) -> Result<(), DomainError> {
        let stored = bill.to_stored();
        self.store.save_bill(&stored).await?;
        info!(items = stored.items.len(), total = %stored.total, "bill staged for splitting");
        Ok(())
    }

    /// Open a session from the staged bill. `MissingBill` means "start over".
    pub async fn open_session(&self) -> Result<SplitSession, DomainError> {
        let stored = self.store.load_bill().await?.ok_or(DomainError::MissingBill)?;
        let stored_total = stored.total.clone();
        let bill = stored.into_bill();
        let total = money::format_cents(bill.total());
        if !stored_total.is_empty() && stored_total != total {
            warn!(stored = %stored_total, computed = %total, "stored total disagrees with items, using computed");
        }
        let session = SplitSession::new(bill);
        info!(items = session.items().len(), total = %total, "split session opened");
        Ok(session)
    }

    /// Drop the staged bill.
    pub async fn reset(&self) -> Result<(), DomainError> {
        self.store.clear_bill().await?;
        info!("staged bill cleared");
        Ok(())
    }
}

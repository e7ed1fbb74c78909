//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod allocation;
pub mod assignment;
pub mod entities;
pub mod errors;
pub mod money;
pub mod normalizer;
pub mod session;

pub use allocation::{Allocation, Share, allocate};
pub use assignment::{Assignment, ParticipantRegistry};
pub use entities::{
    Bill, ItemId, LineItem, Participant, ParticipantId, ReceiptImage, StoredBill,
};
pub use errors::DomainError;
pub use normalizer::{ExtractedBill, Extraction, normalize};
pub use session::{SessionItem, SplitSession};

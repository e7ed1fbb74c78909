//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("AI extraction failed: {0}")]
    Ai(String),

    #[error("Storage error: {0}")]
    Store(String),

    #[error("No file uploaded")]
    NoFile,

    #[error("{0}")]
    InvalidImage(String),

    /// Only produced by strict validation; allocation coerces bad prices to zero instead.
    #[error("Invalid price: {0:?}")]
    InvalidPrice(String),

    /// Nothing staged for splitting. The UI should send the user back to the start.
    #[error("No bill data found, parse a receipt first")]
    MissingBill,

    #[error("Add at least one named person before calculating")]
    NoParticipants,

    #[error("Cannot remove the only person")]
    LastParticipant,

    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Prompt failed: {0}")]
    Ui(String),
}

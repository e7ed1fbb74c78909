//! Persistence adapters.

pub mod local_storage;

pub use local_storage::{BILL_KEY, LocalStorageJson};

//! Infrastructure adapters. Implement ports.
//!
//! AI model, local storage file, terminal UI. Map errors to DomainError.

pub mod ai;
pub mod persistence;
pub mod ui;

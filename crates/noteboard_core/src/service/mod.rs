//! Board use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the board's user actions.
//! - Keep the view layer decoupled from ledger/storage details.

pub mod board_service;
pub mod seed_service;

//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate entity store calls into use-case level APIs.
//! - Keep callers decoupled from storage details.

pub mod transaction_service;
pub mod trash_service;

pub use transaction_service::TransactionService;
pub use trash_service::TrashService;

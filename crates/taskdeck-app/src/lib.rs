//! Application layer for taskdeck: entity lifecycle, reminders, report
//! export, and role-token verification, all behind the [`store::EntityStore`]
//! persistence seam.

/// Signed role tokens.
pub mod auth;
/// Spreadsheet and PDF report rendering.
pub mod export;
/// In-process store backend.
pub mod memory;
/// Periodic deadline reminder scan.
pub mod reminder;
/// Lifecycle service with the capability gate.
pub mod service;
/// Persistence seam and backend adapters.
pub mod store;

pub use auth::TokenSigner;
pub use memory::MemoryStore;
pub use reminder::ReminderScanner;
pub use service::{LifecycleService, ServiceError};
pub use store::{EntityStore, StoreError};

//! Workbook Publisher
//!
//! State store for a print workbook editor: an ordered sequence of typed
//! content blocks, page layout settings with a derived gutter width, preview
//! overlays, and UI preferences, persisted as a JSON snapshot after every
//! change.

pub mod config;
pub mod error;
pub mod export;
pub mod i18n;
pub mod message;
pub mod notification;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;

pub use message::WorkspaceMessage;
pub use store::{SubscriptionId, WorkbookStore, WorkspaceSubscriber};

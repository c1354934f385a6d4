//! State management module for Workbook Publisher
//!
//! This module contains all workspace state types organized by concern:
//! - `block`: Workbook blocks, id allocation, and per-kind field patches
//! - `settings`: Page layout settings and preview overlays
//! - `workspace`: Root workspace state and UI preferences
//! - `snapshot`: Merging stored snapshots over defaults
//! - `transition`: Applying workspace messages

mod block;
mod settings;
mod snapshot;
mod transition;
mod workspace;

pub use block::*;
pub use settings::*;
pub use snapshot::*;
pub use transition::*;
pub use workspace::*;

//! Compute credit card cashback per category from a bank transaction export.
//!
//! ```rust,ignore
//! use cashback_tracker::CashbackBuilder;
//!
//! let summary = CashbackBuilder::new()
//!     .card("cardA")
//!     .content(&file_content)
//!     .run()?;
//! ```
//!
//! Rows decoded elsewhere can go straight to [`classify`] together with a
//! profile from [`CardRegistry`].

mod builder;
mod types;

pub mod classifier;
pub mod errors;
pub mod registry;
pub mod sources;

pub use builder::{CashbackBuilder, SourceFormat};
pub use classifier::classify;
pub use errors::{CashbackError, CashbackResult};
pub use registry::{CardProfile, CardRegistry, CategoryRule, ColumnMapping, LogicalField};
pub use sources::prelude::*;
pub use types::{
    CellValue, CategorySpendResult, ClassificationSummary, ContributingTransaction, RawRow,
};

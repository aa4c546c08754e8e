//! Recommendation engine: turns scored results into ranked picks.
//!
//! - **Best overall**: highest mean computed score across all records
//! - **Best per category**: highest mean within each scenario category
//! - **Summaries**: per-model totals for result tables

mod engine;
mod summary;
mod types;

pub use engine::recommend;
pub use summary::summarize;
pub use types::*;

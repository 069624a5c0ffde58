//! The health log: an in-memory, append-only store of observations
//!
//! - `store`: the ordered log itself
//! - `query`: last-non-null lookups, headline metrics, trend series
//! - `codec`: CSV seed/import and export

pub mod codec;
mod query;
mod store;

pub use query::*;
pub use store::HealthLog;

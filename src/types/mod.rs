//! Type definitions for the Metabolic Tracker
//!
//! The observation record, its metabolic state and the named numeric
//! metrics that queries and reports select by.

mod observation;

pub use observation::*;

//! Analysis modules.
//!
//! The aggregation engine lives in [`aggregator`]; it is re-exported here
//! so callers can use `analysis::aggregate` directly.

pub mod aggregator;

pub use aggregator::*;

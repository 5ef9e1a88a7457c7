//! Sequential and parallel handler composition.
//!
//! - [`Chain`] runs handlers one after another, feeding each the previous output
//! - [`ParallelChain`] fans handlers out to a bounded worker set and merges
//!   their outputs

mod parallel;
mod sequential;

pub use parallel::ParallelChain;
pub use sequential::Chain;

//! Execution context passed to every handler call.
//!
//! A [`CallContext`] carries the cancellation token and optional deadline
//! for one call tree, plus a run identifier for log correlation.

mod call;

pub use call::CallContext;

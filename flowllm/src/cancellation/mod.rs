//! Cooperative cancellation and bounded task execution.
//!
//! This module provides:
//! - CancellationToken for cooperative, hierarchical cancellation
//! - BoundedTaskGroup for running a batch of jobs on a fixed worker set

mod task_group;
mod token;

pub use task_group::BoundedTaskGroup;
pub use token::{CancelOnDrop, CancellationToken};

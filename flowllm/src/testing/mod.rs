//! Testing utilities for flowllm pipelines.
//!
//! This module provides:
//! - Mock and failing handlers
//! - A slow handler that does or does not observe its context
//! - A concurrency probe for parallel chains
//! - An in-memory fake of the `Memory` trait

mod fakes;
mod mocks;

pub use fakes::FakeMemory;
pub use mocks::{ConcurrencyProbe, FailingHandler, MockHandler, ProbeHandler, SlowHandler};

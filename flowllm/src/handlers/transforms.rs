//! Small leaf handlers that reshape a `Values` bag.

use super::Handler;
use crate::context::CallContext;
use crate::errors::Result;
use crate::values::{Values, DEFAULT_KEY};
use async_trait::async_trait;

/// Renames the primary text output to another key.
///
/// The primary key is removed, so a following handler sees only the new
/// name. If the primary key is absent the bag passes through unchanged.
#[derive(Debug, Clone)]
pub struct MapOutputTo {
    key: String,
}

impl MapOutputTo {
    /// Creates a renaming handler targeting `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[async_trait]
impl Handler for MapOutputTo {
    async fn call(&self, _ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        let mut vals = Values::merged(inputs);
        if let Some(value) = vals.remove(DEFAULT_KEY) {
            vals.insert(self.key.clone(), value);
        }
        Ok(vals)
    }
}

/// Trims surrounding whitespace from the text form of each listed key.
///
/// Listed keys always come out as text; absent keys become empty text.
#[derive(Debug, Clone)]
pub struct TrimSpace {
    keys: Vec<String>,
}

impl TrimSpace {
    /// Creates a trimming handler for `keys`.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Handler for TrimSpace {
    async fn call(&self, _ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        let mut vals = Values::merged(inputs);
        for key in &self.keys {
            let trimmed = vals.get(key).trim().to_string();
            vals.insert(key.clone(), trimmed);
        }
        Ok(vals)
    }
}

/// Removes one trailing occurrence of `suffix` from each listed key.
#[derive(Debug, Clone)]
pub struct TrimSuffix {
    suffix: String,
    keys: Vec<String>,
}

impl TrimSuffix {
    /// Creates a suffix-trimming handler.
    pub fn new<I, S>(suffix: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffix: suffix.into(),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Handler for TrimSuffix {
    async fn call(&self, _ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        let mut vals = Values::merged(inputs);
        for key in &self.keys {
            let text = vals.get(key);
            let trimmed = text.strip_suffix(self.suffix.as_str()).unwrap_or(text.as_str()).to_string();
            vals.insert(key.clone(), trimmed);
        }
        Ok(vals)
    }
}

//! Single-string prompt template.

use crate::context::CallContext;
use crate::errors::Result;
use crate::handlers::Handler;
use crate::values::{Values, DEFAULT_KEY};
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

/// A prompt with `{name}` placeholders.
///
/// Each placeholder is replaced by the text form of the input value with that
/// name. Placeholders with no matching value are left as written. The result
/// is stored under [`DEFAULT_KEY`] alongside the inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
}

impl Template {
    /// Creates a template from its source text.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Returns the source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the placeholder names in order of appearance.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        PLACEHOLDER
            .captures_iter(&self.source)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect()
    }

    /// Renders the template against `vals`.
    #[must_use]
    pub fn render(&self, vals: &Values) -> String {
        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures<'_>| match vals.value(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<String> for Template {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

#[async_trait]
impl Handler for Template {
    async fn call(&self, _ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        let vals = Values::merged(inputs);
        let rendered = self.render(&vals);
        Ok(vals.with(DEFAULT_KEY, rendered))
    }
}

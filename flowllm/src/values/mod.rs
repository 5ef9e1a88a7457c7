//! The `Values` data bag passed between handlers.
//!
//! A `Values` maps string keys to tagged [`Value`]s. Handlers never mutate
//! the bag they receive: [`Values::merge`] always produces a fresh map.

mod messages;
#[cfg(test)]
mod values_tests;

pub use messages::{ChatMessage, ChatMessages, Role};

use crate::errors::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Key carrying a handler's primary text input and output.
pub const DEFAULT_KEY: &str = "text";

/// Key carrying the conversation history.
pub const DEFAULT_CHAT_KEY: &str = "_chat_messages";

/// A single value held in a [`Values`] bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Plain text.
    Text(String),
    /// An ordered chat history.
    Messages(ChatMessages),
    /// Any other structured payload.
    Record(serde_json::Value),
}

impl Value {
    /// Returns the text if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the messages if this is a chat history.
    #[must_use]
    pub const fn as_messages(&self) -> Option<&ChatMessages> {
        match self {
            Self::Messages(m) => Some(m),
            _ => None,
        }
    }

    /// Returns a short description of the variant, used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Text(_) => "text".to_string(),
            Self::Messages(m) => format!("{} chat messages", m.len()),
            Self::Record(v) => format!("record {v}"),
        }
    }
}

/// Renders the value's text form. JSON strings print without quotes.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Record(serde_json::Value::String(s)) => f.write_str(s),
            Self::Messages(m) => write!(f, "{m}"),
            Self::Record(v) => write!(f, "{v}"),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<ChatMessages> for Value {
    fn from(m: ChatMessages) -> Self {
        Self::Messages(m)
    }
}

impl From<Vec<ChatMessage>> for Value {
    fn from(m: Vec<ChatMessage>) -> Self {
        Self::Messages(m.into())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Record(v)
    }
}

/// The data bag every handler accepts and returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(HashMap<String, Value>);

impl Values {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a slice of inputs into one fresh bag, later inputs winning.
    #[must_use]
    pub fn merged(inputs: &[Self]) -> Self {
        Self::new().merge(inputs)
    }

    /// Returns a copy of `self` overlaid, in order, by each of `others`.
    ///
    /// Neither `self` nor `others` is modified.
    #[must_use]
    pub fn merge<'a, I>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let mut res = self.0.clone();
        for other in others {
            res.extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Self(res)
    }

    /// Returns `self` with one more entry. Consumes the bag.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the text form of the value for `key`, or an empty string if absent.
    #[must_use]
    pub fn get(&self, key: &str) -> String {
        self.0.get(key).map(ToString::to_string).unwrap_or_default()
    }

    /// Returns the raw value for `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value for `key` if it is text.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::TypeMismatch` if the key is absent or not text.
    pub fn text(&self, key: &str) -> Result<&str> {
        match self.0.get(key) {
            Some(Value::Text(s)) => Ok(s),
            Some(other) => Err(FlowError::not_text(key, other.describe())),
            None => Err(FlowError::not_text(key, "nothing")),
        }
    }

    /// Returns the value for `key` if it is a chat history.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::TypeMismatch` if the key is absent or holds something else.
    pub fn messages(&self, key: &str) -> Result<&ChatMessages> {
        let found = match self.0.get(key) {
            Some(Value::Messages(m)) => return Ok(m),
            Some(other) => other.describe(),
            None => "nothing".to_string(),
        };
        Err(FlowError::TypeMismatch {
            key: key.to_string(),
            expected: "chat messages",
            found,
        })
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes a value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns all keys, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Iterates over entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Display convenience, not a wire format.
///
/// Empty bags print nothing, the primary text key or a lone key prints its
/// value, anything else prints as pretty JSON with sorted keys.
impl fmt::Display for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(v) = self.0.get(DEFAULT_KEY) {
            return write!(f, "{v}");
        }
        let mut entries = self.0.values();
        match (entries.next(), entries.next()) {
            (None, _) => Ok(()),
            (Some(v), None) => write!(f, "{v}"),
            _ => {
                let sorted: BTreeMap<_, _> = self.0.iter().collect();
                let json = serde_json::to_string_pretty(&sorted).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Values
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V> Extend<(K, V)> for Values
where
    K: Into<String>,
    V: Into<Value>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Values
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl IntoIterator for Values {
    type Item = (String, Value);
    type IntoIter = std::collections::hash_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

//! Construction input and delivery output maps.

use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Final attribute map handed to the delivery transport, in insertion order.
pub type DeliveryAttributes = Map<String, Value>;

/// Loosely-typed construction input.
///
/// Keys are plain text: `&str`, `String` and JSON object keys all address the
/// same entry. Entries keep insertion order, which is the order optional
/// setters run in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: Map<String, Value>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds input from a JSON object.
    pub fn from_json(value: Value) -> Result<Self, AttributesError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Err(AttributesError::NotAnObject("null")),
            Value::Bool(_) => Err(AttributesError::NotAnObject("bool")),
            Value::Number(_) => Err(AttributesError::NotAnObject("number")),
            Value::String(_) => Err(AttributesError::NotAnObject("string")),
            Value::Array(_) => Err(AttributesError::NotAnObject("array")),
        }
    }

    /// Inserts one entry, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder form of [`Attributes::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Attributes
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for Attributes {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Input conversion errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributesError {
    NotAnObject(&'static str),
}

impl Display for AttributesError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject(kind) => {
                write!(f, "email attributes must be a JSON object, got {kind}")
            }
        }
    }
}

impl Error for AttributesError {}

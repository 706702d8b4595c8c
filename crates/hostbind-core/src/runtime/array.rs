//! Ordered host arrays.

use crate::error::ConversionError;

use super::Value;

/// Key of a host array entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayKey {
    Int(i64),
    Str(String),
}

impl ArrayKey {
    /// Derive an array key from an offset value.
    ///
    /// Integral strings become integer keys, doubles truncate, booleans map
    /// to 0/1 and null maps to the empty string.
    pub fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Int(v) => Ok(ArrayKey::Int(*v)),
            Value::Bool(b) => Ok(ArrayKey::Int(*b as i64)),
            Value::Double(_) => value.as_int().map(ArrayKey::Int),
            Value::Null => Ok(ArrayKey::Str(String::new())),
            Value::String(s) => Ok(match s.parse::<i64>() {
                Ok(v) if v.to_string() == *s => ArrayKey::Int(v),
                _ => ArrayKey::Str(s.clone()),
            }),
            Value::Undefined => Err(ConversionError::Undefined {
                target_type: "array key",
            }),
            other => Err(ConversionError::TypeMismatch {
                expected: "array key",
                actual: other.type_name(),
            }),
        }
    }
}

/// Insertion-ordered map from keys to value boxes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostArray {
    entries: Vec<(ArrayKey, Value)>,
    next_index: i64,
}

impl HostArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &ArrayKey) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &ArrayKey) -> bool {
        self.position(key).is_some()
    }

    /// Insert or overwrite; an existing key keeps its position.
    pub fn insert(&mut self, key: ArrayKey, value: Value) -> Option<Value> {
        if let ArrayKey::Int(i) = key
            && i >= self.next_index
        {
            self.next_index = i.saturating_add(1);
        }
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Append with the next free integer key.
    pub fn push(&mut self, value: Value) -> ArrayKey {
        let key = ArrayKey::Int(self.next_index);
        self.insert(key.clone(), value);
        key
    }

    pub fn remove(&mut self, key: &ArrayKey) -> Option<Value> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use super::Value;
use crate::errors::{unhashable, EvalResult};

/// Hashable identity of a dictionary key.
///
/// `True`, `1` and `1.0` are the same key, as are `0`, `0.0` and `-0.0`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    None,
    Int(i64),
    /// Non-integral float, by bit pattern.
    Float(u64),
    Str(Rc<str>),
    Tuple(Vec<HashKey>),
}

impl HashKey {
    pub fn from_value(value: &Value) -> EvalResult<HashKey> {
        let key = match value {
            Value::None => HashKey::None,
            Value::Bool(b) => HashKey::Int(i64::from(*b)),
            Value::Int(n) => HashKey::Int(*n),
            Value::Float(f) => {
                if super::int_float_eq(*f as i64, *f) {
                    HashKey::Int(*f as i64)
                } else {
                    HashKey::Float(f.to_bits())
                }
            }
            Value::Str(s) => HashKey::Str(Rc::clone(s)),
            Value::Tuple(items) => HashKey::Tuple(
                items
                    .iter()
                    .map(HashKey::from_value)
                    .collect::<EvalResult<_>>()?,
            ),
            _ => return Err(unhashable(value)),
        };
        Ok(key)
    }
}

/// Insertion-ordered mapping. Each entry keeps the key as first inserted.
#[derive(Clone, Default)]
pub struct Dict {
    entries: IndexMap<HashKey, (Value, Value), FxBuildHasher>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> EvalResult<Option<Value>> {
        let key = key.hash_key()?;
        Ok(self.entries.get(&key).map(|(_, value)| value.clone()))
    }

    pub fn contains(&self, key: &Value) -> EvalResult<bool> {
        Ok(self.entries.contains_key(&key.hash_key()?))
    }

    pub fn insert(&mut self, key: Value, value: Value) -> EvalResult<()> {
        let hash = key.hash_key()?;
        match self.entries.get_mut(&hash) {
            Some(entry) => entry.1 = value,
            None => {
                self.entries.insert(hash, (key, value));
            }
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &Value) -> EvalResult<Option<Value>> {
        let key = key.hash_key()?;
        Ok(self.entries.shift_remove(&key).map(|(_, value)| value))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries.values().map(|(key, _)| key.clone()).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.values().map(|(_, value)| value.clone()).collect()
    }

    pub fn items(&self) -> Vec<Value> {
        self.entries
            .values()
            .map(|(key, value)| Value::tuple(vec![key.clone(), value.clone()]))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.values().map(|(key, value)| (key, value))
    }

    pub(super) fn py_eq(&self, other: &Dict) -> bool {
        self.len() == other.len()
            && self.entries.iter().all(|(hash, (_, value))| {
                other
                    .entries
                    .get(hash)
                    .is_some_and(|(_, theirs)| value.py_eq(theirs))
            })
    }
}

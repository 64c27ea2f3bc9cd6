//! The name → value mapping produced by an extraction call.

use crate::decode::{decode_expression, DecodeKind, Decoded};
use crate::scan::Declaration;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Decoded script variables, keyed by declaration name.
///
/// Inserting an existing name replaces its value (last write wins). The
/// names whose value fell back to raw text are tracked alongside so callers
/// can decide whether a raw field is acceptable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptVars {
    values: Map<String, Value>,
    raw_fallbacks: Vec<String>,
}

impl ScriptVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and collect declarations in order.
    pub fn from_declarations<I>(declarations: I) -> Self
    where
        I: IntoIterator<Item = Declaration>,
    {
        let mut vars = Self::new();
        for decl in declarations {
            let decoded = decode_expression(&decl.expression);
            vars.insert_decoded(decl.name, decoded);
        }
        vars
    }

    /// Insert a decoded value, recording whether it fell back to raw text.
    pub fn insert_decoded(&mut self, name: String, decoded: Decoded) {
        self.raw_fallbacks.retain(|n| *n != name);
        if decoded.kind == DecodeKind::Raw {
            self.raw_fallbacks.push(name.clone());
        }
        self.values.insert(name, decoded.value);
    }

    /// Insert an already structured value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.raw_fallbacks.retain(|n| *n != name);
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.raw_fallbacks.retain(|n| n != name);
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Names whose expression could not be decoded and were kept raw.
    pub fn raw_fallbacks(&self) -> &[String] {
        &self.raw_fallbacks
    }

    /// Merge `other` into `self`; names in `other` win.
    pub fn merge(&mut self, other: ScriptVars) {
        for (name, value) in other.values {
            let raw = other.raw_fallbacks.contains(&name);
            self.raw_fallbacks.retain(|n| *n != name);
            if raw {
                self.raw_fallbacks.push(name.clone());
            }
            self.values.insert(name, value);
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }

    /// The mapping as a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

impl Serialize for ScriptVars {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

impl From<Map<String, Value>> for ScriptVars {
    fn from(values: Map<String, Value>) -> Self {
        Self {
            values,
            raw_fallbacks: Vec::new(),
        }
    }
}

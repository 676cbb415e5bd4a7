//! The flat storage unit of the backend.
//!
//! A stored entity is a list of [`Property`] values, each one a dotted path name,
//! a scalar [`PropertyValue`] and a flag saying whether the name is repeated.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::cmp::Ordering;

use crate::error::{ProplayerError, ProplayerResult};

/// Scalar kinds the property store accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// Converts a JSON scalar into a property value.
    ///
    /// # Errors
    ///
    /// Returns [`ProplayerError::Encoding`] for arrays and objects (which have no scalar
    /// representation) and for unsigned integers that do not fit into an `i64`.
    pub fn from_json(value: &Value) -> ProplayerResult<Self> {
        match value {
            Value::Null => Ok(PropertyValue::Null),
            Value::Bool(b) => Ok(PropertyValue::Bool(*b)),
            Value::String(s) => Ok(PropertyValue::String(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(PropertyValue::Int(i))
                } else if n.is_u64() {
                    Err(ProplayerError::Encoding(format!("integer {n} is out of range")))
                } else {
                    n.as_f64()
                        .map(PropertyValue::Float)
                        .ok_or_else(|| ProplayerError::Encoding(format!("unsupported number {n}")))
                }
            }
            Value::Array(_) => Err(ProplayerError::Encoding(
                "nested arrays cannot be stored as properties".to_string(),
            )),
            Value::Object(_) => Err(ProplayerError::Encoding(
                "objects inside arrays cannot be stored as properties".to_string(),
            )),
        }
    }

    /// Converts this property value back into JSON.
    ///
    /// Non-finite floats have no JSON form and come back as `null`.
    pub fn to_json(&self) -> Value {
        match self {
            PropertyValue::Null => Value::Null,
            PropertyValue::Bool(b) => Value::Bool(*b),
            PropertyValue::Int(i) => Value::Number((*i).into()),
            PropertyValue::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PropertyValue::String(s) => Value::String(s.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            PropertyValue::Null => 0,
            PropertyValue::Bool(_) => 1,
            PropertyValue::Int(_) | PropertyValue::Float(_) => 2,
            PropertyValue::String(_) => 3,
        }
    }

    /// Total order used for sorting query results.
    ///
    /// Values of different types order as Null < Bool < Number < String; integers and
    /// floats compare numerically with each other.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PropertyValue::Bool(a), PropertyValue::Bool(b)) => a.cmp(b),
            (PropertyValue::Int(a), PropertyValue::Int(b)) => a.cmp(b),
            (PropertyValue::Int(a), PropertyValue::Float(b)) => (*a as f64).total_cmp(b),
            (PropertyValue::Float(a), PropertyValue::Int(b)) => a.total_cmp(&(*b as f64)),
            (PropertyValue::Float(a), PropertyValue::Float(b)) => a.total_cmp(b),
            (PropertyValue::String(a), PropertyValue::String(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// A single named value as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Dot-joined path of the value inside the original document, e.g. `address.city`.
    pub name: String,
    pub value: PropertyValue,
    /// Set for every element of an array; all elements share the same name.
    pub multiple: bool,
}

impl Property {
    pub fn single(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self { name: name.into(), value: value.into(), multiple: false }
    }

    pub fn multiple(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self { name: name.into(), value: value.into(), multiple: true }
    }
}

/// A stored row: the backend-assigned identifier and its property set.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: i64,
    pub properties: Vec<Property>,
}

impl Entity {
    pub fn new(id: i64, properties: Vec<Property>) -> Self {
        Self { id, properties }
    }

    /// Returns the first value stored under `name`, if any.
    pub fn first_value(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}

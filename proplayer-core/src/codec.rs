//! Bidirectional mapping between nested JSON documents and flat property lists.
//!
//! Nested objects flatten into dot-joined property names (`address.city`) and arrays
//! flatten into repeated properties sharing one name, each flagged `multiple`.
//!
//! The mapping is lossy in two documented ways:
//!
//! - an empty array (or an empty object) produces no properties, so it reads back as
//!   an absent field;
//! - a single-element array reads back as a bare scalar, because repetition is only
//!   visible once a name occurs twice.
//!
//! ```ignore
//! use proplayer_core::codec::{decode, encode};
//! use serde_json::json;
//!
//! let doc = json!({"name": "Alice", "address": {"city": "X"}});
//! let properties = encode(doc.as_object().unwrap())?;
//! let restored = decode(&properties, 7);
//! assert_eq!(restored["address"]["city"], "X");
//! assert_eq!(restored["_id"], 7);
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::ProplayerResult,
    property::{Property, PropertyValue},
};

/// A JSON object, the unit exchanged with callers.
pub type Document = Map<String, Value>;

/// Backend-assigned identifier.
pub const ID_KEY: &str = "_id";
/// Epoch seconds of the insert.
pub const CREATED_KEY: &str = "_created";
/// Epoch seconds of the latest update.
pub const UPDATED_KEY: &str = "_updated";
/// Logical (not tenant-qualified) resource kind.
pub const KIND_KEY: &str = "_kind";

const PATH_SEPARATOR: char = '.';

/// Flattens a document into properties.
///
/// # Errors
///
/// Returns [`ProplayerError::Encoding`](crate::error::ProplayerError::Encoding) if any
/// array element is not a scalar, or any number falls outside the supported range. No
/// partial result is produced.
pub fn encode(document: &Document) -> ProplayerResult<Vec<Property>> {
    let mut properties = Vec::with_capacity(document.len());
    encode_into("", document, &mut properties)?;
    Ok(properties)
}

fn encode_into(prefix: &str, document: &Document, out: &mut Vec<Property>) -> ProplayerResult<()> {
    for (key, value) in document {
        let name = format!("{prefix}{key}");

        match value {
            Value::Object(nested) => {
                encode_into(&format!("{name}{PATH_SEPARATOR}"), nested, out)?;
            }
            Value::Array(items) => {
                for item in items {
                    out.push(Property {
                        name: name.clone(),
                        value: PropertyValue::from_json(item)?,
                        multiple: true,
                    });
                }
            }
            scalar => out.push(Property {
                name,
                value: PropertyValue::from_json(scalar)?,
                multiple: false,
            }),
        }
    }

    Ok(())
}

/// Rebuilds a document from properties and stamps `_id` with `id`.
///
/// Repeated names become arrays in the order the properties are given. Properties whose
/// path runs through a value that is not an object are dropped.
pub fn decode(properties: &[Property], id: i64) -> Document {
    let mut root = Document::new();

    for property in properties {
        decode_into(&mut root, property);
    }

    root.insert(ID_KEY.to_string(), Value::from(id));
    root
}

fn decode_into(root: &mut Document, property: &Property) {
    let mut segments: Vec<&str> = property.name.split(PATH_SEPARATOR).collect();
    // `split` always yields at least one segment
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut node = root;
    for segment in segments {
        node = match node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Document::new()))
        {
            Value::Object(child) => child,
            // Path conflict: an earlier property already put a non-object here. The
            // stored value wins and this property is dropped without failing the read.
            _ => {
                debug!(property = %property.name, segment, "dropping property under non-object path");
                return;
            }
        };
    }

    let value = property.value.to_json();
    match node.get_mut(leaf) {
        None => {
            node.insert(leaf.to_string(), value);
        }
        Some(Value::Array(items)) => items.push(value),
        // The intermediate-segment conflict policy, deliberately extended to the leaf: a
        // stored object wins and the colliding scalar is dropped, never wrapped with the
        // object into an array.
        Some(Value::Object(_)) => {
            debug!(property = %property.name, "dropping property that collides with an object");
        }
        Some(existing) => {
            let previous = std::mem::take(existing);
            *existing = Value::Array(vec![previous, value]);
        }
    }
}

//! Document identity and the stored document record

use docpath_core::{Error, Object, Result, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;
use uuid::Uuid;

/// Field name carrying the identifier when a document is written out as JSON
pub const ID_FIELD: &str = "_id";

/// Namespace for identifiers derived from foreign `_id` values
const FOREIGN_ID_NAMESPACE: Uuid = Uuid::from_bytes([
    0x3c, 0x51, 0x8e, 0x02, 0x6f, 0x1d, 0x4b, 0x7a,
    0x9e, 0x20, 0x5d, 0xc4, 0x81, 0x37, 0xa6, 0x0f,
]);

/// Opaque identifier assigned by the store
///
/// A wrapper around a UUID: v4 when freshly assigned, v5 when derived from a
/// foreign `_id`. Parsing happens before any store call, so a malformed
/// identifier never reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a new random DocumentId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic DocumentId for a record carrying someone else's `_id`
    ///
    /// The same foreign value always maps to the same identifier.
    pub fn derive(foreign: &Value) -> Self {
        Self(Uuid::new_v5(&FOREIGN_ID_NAMESPACE, foreign.to_string().as_bytes()))
    }

    /// Create a DocumentId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse a DocumentId, returning None if the string is not a UUID
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }

    /// Get the raw bytes of this DocumentId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s).ok_or_else(|| Error::IdentifierInvalid(s.to_string()))
    }
}

fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or_default()
}

/// A persisted, identifier-bearing Object value
///
/// # Design
///
/// - **Document-level versioning**: one version for the entire document,
///   incremented on every mutation
/// - **Timestamps**: creation and modification times in microseconds
/// - **Root is always an Object**: enforced by every store on write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identifier
    pub id: DocumentId,
    /// Document body
    pub value: Value,
    /// Version, starting at 1
    pub version: u64,
    /// Creation timestamp (microseconds since epoch)
    pub created_at: u64,
    /// Last modification timestamp (microseconds since epoch)
    pub updated_at: u64,
}

impl Document {
    /// Create a new document at version 1
    pub fn new(id: DocumentId, value: Value) -> Self {
        let now = now_micros();
        Document {
            id,
            value,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Increment version and update timestamp
    pub fn touch(&mut self) {
        self.version += 1;
        self.updated_at = now_micros();
    }

    /// Body with the identifier embedded as the first field
    ///
    /// This is the shape written to JSON files and structured exports. A body
    /// that already carries its own `_id` is user data and is returned as is.
    pub fn to_value_with_id(&self) -> Value {
        match &self.value {
            Value::Object(body) if body.contains_key(ID_FIELD) => self.value.clone(),
            Value::Object(body) => {
                let mut out = Object::new();
                out.insert(ID_FIELD.to_string(), Value::String(self.id.to_string()));
                out.extend(body.iter().map(|(k, v)| (k.clone(), v.clone())));
                Value::Object(out)
            }
            other => other.clone(),
        }
    }

    /// Split an embedded `_id` off a stored record
    ///
    /// Only an `_id` that parses as a [`DocumentId`] is removed and returned.
    /// Any other `_id` belongs to the record and stays in the body.
    pub fn split_id(mut value: Value) -> (Option<DocumentId>, Value) {
        let id = match &mut value {
            Value::Object(obj) => {
                let parsed = obj
                    .get(ID_FIELD)
                    .and_then(Value::as_str)
                    .and_then(DocumentId::from_string);
                if parsed.is_some() {
                    obj.shift_remove(ID_FIELD);
                }
                parsed
            }
            _ => None,
        };
        (id, value)
    }
}

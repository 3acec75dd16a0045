use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, Kind};

/// Attribute key carrying the kind discriminator in rendered mappings.
pub const CLASS_KEY: &str = "__class__";

/// Attributes owned by the instance itself. They are never plain fields.
pub const RESERVED_KEYS: &[&str] = &[CLASS_KEY, "id", "created_at", "updated_at"];

/// Plain attribute mapping, as stored in the backing file.
pub type Attributes = Map<String, Value>;

/// Errors raised while reconstructing or assigning to an instance.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown kind `{0}`")]
    UnknownKind(String),

    #[error("missing attribute `{0}`")]
    MissingAttribute(&'static str),

    #[error("attribute `{0}` must be a string")]
    NotAString(&'static str),

    #[error("attribute `{field}` is not an ISO-8601 date-time: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("updated_at {updated_at} is earlier than created_at {created_at}")]
    UpdatedBeforeCreated {
        created_at: String,
        updated_at: String,
    },

    #[error("attribute `{0}` can't be assigned")]
    ReservedAttribute(String),
}

/// A live record of some kind.
///
/// # Invariants
/// - `id` is assigned once, at fresh construction or from persisted attributes.
/// - `updated_at >= created_at`; [`Instance::touch`] only ever moves it forward.
/// - `fields` never contains a [`RESERVED_KEYS`] entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    kind: Kind,
    id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    fields: Attributes,
}

impl Instance {
    /// Construct a fresh instance: new id, equal timestamps, kind defaults.
    ///
    /// The instance is not registered anywhere; use
    /// [`FileStorage::new_instance`](crate::storage::FileStorage::new_instance)
    /// to construct and register in one step.
    pub fn new(kind: Kind) -> Self {
        let now = super::now();
        Self {
            kind,
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            fields: kind.defaults(),
        }
    }

    /// Reconstruct an instance from a rendered attribute mapping.
    ///
    /// `__class__` picks the kind and is then dropped. `id` and both timestamps
    /// are reused verbatim. Every other key is copied over the kind defaults.
    /// A mapping whose `updated_at` precedes its `created_at` is rejected.
    pub fn from_attributes(attributes: Attributes) -> Result<Self, ModelError> {
        let mut class = None;
        let mut id = None;
        let mut created_at = None;
        let mut updated_at = None;
        let mut rest = Vec::with_capacity(attributes.len());

        for (name, value) in attributes {
            match name.as_str() {
                CLASS_KEY => class = Some(value),
                "id" => id = Some(value),
                "created_at" => created_at = Some(value),
                "updated_at" => updated_at = Some(value),
                _ => rest.push((name, value)),
            }
        }

        let kind: Kind = required_string(class, CLASS_KEY)?.parse()?;
        let id = required_string(id, "id")?;
        let created_at = required_timestamp(created_at, "created_at")?;
        let updated_at = required_timestamp(updated_at, "updated_at")?;
        if updated_at < created_at {
            return Err(ModelError::UpdatedBeforeCreated {
                created_at: format_timestamp(&created_at),
                updated_at: format_timestamp(&updated_at),
            });
        }

        let mut fields = kind.defaults();
        for (name, value) in rest {
            fields.insert(name, value);
        }

        Ok(Self {
            kind,
            id,
            created_at,
            updated_at,
            fields,
        })
    }

    /// Render to a plain attribute mapping.
    ///
    /// Order: `__class__`, `id`, `created_at`, `updated_at`, then fields.
    pub fn to_attributes(&self) -> Attributes {
        let mut attributes = Map::with_capacity(self.fields.len() + 4);
        attributes.insert(CLASS_KEY.to_string(), Value::from(self.kind.as_str()));
        attributes.extend(self.identity());
        attributes.extend(self.fields.clone());
        attributes
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Composite store key, `"<Kind>.<id>"`.
    pub fn key(&self) -> String {
        storage_key(self.kind, &self.id)
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    pub fn fields(&self) -> &Attributes {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Assign a field. Existing fields keep their position; new ones append.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<(), ModelError> {
        let name = name.into();
        if RESERVED_KEYS.contains(&name.as_str()) {
            return Err(ModelError::ReservedAttribute(name));
        }
        self.fields.insert(name, value.into());
        Ok(())
    }

    /// Refresh `updated_at` to now.
    ///
    /// The new value is strictly later than the old one, even when the clock
    /// has not advanced by a full microsecond or has stepped backwards.
    pub fn touch(&mut self) {
        let now = super::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }

    fn identity(&self) -> [(String, Value); 3] {
        [
            ("id".to_string(), Value::from(self.id.as_str())),
            (
                "created_at".to_string(),
                Value::from(format_timestamp(&self.created_at)),
            ),
            (
                "updated_at".to_string(),
                Value::from(format_timestamp(&self.updated_at)),
            ),
        ]
    }
}

impl fmt::Display for Instance {
    /// `[<Kind>] (<id>) <attributes>` where attributes is the in-memory field
    /// mapping (no discriminator).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut attributes: Attributes = self.identity().into_iter().collect();
        attributes.extend(self.fields.clone());
        let rendered = serde_json::to_string(&attributes).map_err(|_| fmt::Error)?;
        write!(f, "[{}] ({}) {}", self.kind, self.id, rendered)
    }
}

/// Composite store key for a kind and id.
pub fn storage_key(kind: Kind, id: &str) -> String {
    format!("{}.{}", kind, id)
}

fn required_string(value: Option<Value>, field: &'static str) -> Result<String, ModelError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ModelError::NotAString(field)),
        None => Err(ModelError::MissingAttribute(field)),
    }
}

fn required_timestamp(
    value: Option<Value>,
    field: &'static str,
) -> Result<NaiveDateTime, ModelError> {
    let raw = required_string(value, field)?;
    parse_timestamp(&raw).ok_or(ModelError::InvalidTimestamp { field, value: raw })
}

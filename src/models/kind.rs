use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{Amenity, BaseModel, City, ModelError, Place, Review, State, User};

/// The declared type of a record.
///
/// The kind is the discriminator written under `__class__` in the backing
/// file and the prefix of every composite key (`"<Kind>.<id>"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    BaseModel,
    User,
    State,
    City,
    Amenity,
    Place,
    Review,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BaseModel => "BaseModel",
            Self::User => "User",
            Self::State => "State",
            Self::City => "City",
            Self::Amenity => "Amenity",
            Self::Place => "Place",
            Self::Review => "Review",
        }
    }

    /// Kind-specific fields with their default values, in declaration order.
    pub fn defaults(&self) -> Map<String, Value> {
        KINDS
            .iter()
            .find(|spec| spec.kind == *self)
            .map(|spec| (spec.defaults)())
            .unwrap_or_default()
    }

    /// Iterate over every supported kind in registry order.
    pub fn all() -> impl Iterator<Item = Kind> + Clone {
        KINDS.iter().map(|spec| spec.kind)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(s)
            .map(|spec| spec.kind)
            .ok_or_else(|| ModelError::UnknownKind(s.to_string()))
    }
}

/// Registry entry tying a kind name to the constructor of its default fields.
pub struct KindSpec {
    pub name: &'static str,
    pub kind: Kind,
    pub defaults: fn() -> Map<String, Value>,
}

/// Every kind the store knows how to reconstruct.
pub const KINDS: &[KindSpec] = &[
    KindSpec {
        name: "BaseModel",
        kind: Kind::BaseModel,
        defaults: defaults_of::<BaseModel>,
    },
    KindSpec {
        name: "User",
        kind: Kind::User,
        defaults: defaults_of::<User>,
    },
    KindSpec {
        name: "State",
        kind: Kind::State,
        defaults: defaults_of::<State>,
    },
    KindSpec {
        name: "City",
        kind: Kind::City,
        defaults: defaults_of::<City>,
    },
    KindSpec {
        name: "Amenity",
        kind: Kind::Amenity,
        defaults: defaults_of::<Amenity>,
    },
    KindSpec {
        name: "Place",
        kind: Kind::Place,
        defaults: defaults_of::<Place>,
    },
    KindSpec {
        name: "Review",
        kind: Kind::Review,
        defaults: defaults_of::<Review>,
    },
];

/// Find the registry entry for a discriminator. Names are case-sensitive.
pub fn lookup(name: &str) -> Option<&'static KindSpec> {
    KINDS.iter().find(|spec| spec.name == name)
}

/// Serialize a kind's default struct into its field mapping.
fn defaults_of<T: Serialize + Default>() -> Map<String, Value> {
    match serde_json::to_value(T::default()) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    }
}

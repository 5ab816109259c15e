//! Raw store documents and the identity mapper.
//!
//! A stored document carries its storage-assigned identity under `_id`. The
//! mapper renames that field to `id` and hands every other field through
//! untouched; shape checking is left to the entity's `Deserialize` impl.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::entities::{Achievement, BioSection, JourneyEntry, Project, TechCategory};
use super::error::DomainError;

/// Field under which the document store keeps a document's identity.
pub const IDENTITY_FIELD: &str = "_id";
/// Field under which mapped entities expose their identity.
pub const ID_FIELD: &str = "id";

/// Semi-structured document as read from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    id: String,
    fields: Map<String, Value>,
}

impl RawDocument {
    /// Build a document from its identity and remaining fields. A stray `_id`
    /// inside `fields` is dropped in favour of `id`.
    pub fn new(id: impl Into<String>, mut fields: Map<String, Value>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidIdentity);
        }
        fields.remove(IDENTITY_FIELD);
        Ok(Self { id, fields })
    }

    /// Parse a document that embeds its identity under `_id`.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        let Value::Object(mut fields) = value else {
            return Err(DomainError::NotAnObject);
        };

        let id = match fields.remove(IDENTITY_FIELD) {
            Some(Value::String(id)) => id,
            Some(_) => return Err(DomainError::InvalidIdentity),
            None => {
                return Err(DomainError::MissingIdentity {
                    field: IDENTITY_FIELD,
                });
            }
        };

        Self::new(id, fields)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_parts(self) -> (String, Map<String, Value>) {
        (self.id, self.fields)
    }
}

/// Entities that can be produced from a [`RawDocument`].
pub trait Document: DeserializeOwned {
    const ENTITY: &'static str;
}

impl Document for BioSection {
    const ENTITY: &'static str = "BioSection";
}

impl Document for JourneyEntry {
    const ENTITY: &'static str = "JourneyEntry";
}

impl Document for TechCategory {
    const ENTITY: &'static str = "TechCategory";
}

impl Document for Achievement {
    const ENTITY: &'static str = "Achievement";
}

impl Document for Project {
    const ENTITY: &'static str = "Project";
}

/// Rename the storage identity to `id`; all other fields pass through as-is.
pub fn rename_identity(document: RawDocument) -> Map<String, Value> {
    let (id, mut fields) = document.into_parts();
    fields.insert(ID_FIELD.to_string(), Value::String(id));
    fields
}

/// Map a stored document into its entity type.
pub fn map_document<T: Document>(document: RawDocument) -> Result<T, DomainError> {
    serde_json::from_value(Value::Object(rename_identity(document)))
        .map_err(|err| DomainError::shape(T::ENTITY, err.to_string()))
}

//! Declarative descriptions of the documents stored in the database, and the
//! validation that is applied before a document is persisted.
use crate::{
    Error, Result,
    core::model::Model,
    task::Task,
    user::User,
};
use serde::Serialize;

/// The semantic type of a single document field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    /// Free-form text. Required text fields must not be empty.
    Text,
    /// A point in time, maintained by the database layer
    Timestamp,
    /// An ordered list of references to documents in another collection
    References(&'static str),
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Timestamp => write!(f, "timestamp"),
            FieldKind::References(collection) => write!(f, "references({collection})"),
        }
    }
}

/// The description of a single field of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// The shape of a document type and the collection it is stored in
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// The name of the document type
    pub name: &'static str,
    /// The collection in which documents of this type are stored
    pub collection: &'static str,
    /// The user-provided fields of the document
    pub fields: &'static [FieldSpec],
    /// Whether `created_at` and `updated_at` are maintained for this document
    pub timestamps: bool,
}

/// The outcome of validating a document against its [Schema]
#[derive(Debug, PartialEq, Eq)]
pub enum Validation {
    Valid,
    /// The names of all required fields that were absent or empty
    Missing(Vec<&'static str>),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    /// Convert this validation into an [Error::Validation] if any fields were missing
    pub fn into_result(self, collection: &'static str) -> Result<()> {
        match self {
            Validation::Valid => Ok(()),
            Validation::Missing(missing) => Err(Error::Validation {
                collection,
                missing,
            }),
        }
    }
}

/// A value that can be checked against a [Schema]
pub trait Document {
    /// Look up the value of a text field by name. Returns `None` for unknown
    /// fields.
    fn text_field(&self, name: &str) -> Option<&str>;
}

impl Schema {
    /// Check that every required text field of `doc` is present and not empty
    pub fn validate<D: Document + ?Sized>(&self, doc: &D) -> Validation {
        let missing: Vec<&'static str> = self
            .fields
            .iter()
            .filter(|f| f.required && f.kind == FieldKind::Text)
            .filter(|f| doc.text_field(f.name).is_none_or(str::is_empty))
            .map(|f| f.name)
            .collect();
        match missing.is_empty() {
            true => Validation::Valid,
            false => Validation::Missing(missing),
        }
    }

    /// Validate `doc` and return an error naming this schema's collection if
    /// it is not valid
    pub fn check<D: Document + ?Sized>(&self, doc: &D) -> Result<()> {
        self.validate(doc).into_result(self.collection)
    }
}

/// The set of schemas known to this library
pub struct Registry {
    schemas: Vec<&'static Schema>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            schemas: vec![&Task::SCHEMA, &User::SCHEMA],
        }
    }
}

impl Registry {
    pub fn schemas(&self) -> &[&'static Schema] {
        &self.schemas
    }

    /// Find the schema that is bound to the given collection
    pub fn by_collection(&self, collection: &str) -> Option<&'static Schema> {
        self.schemas
            .iter()
            .find(|s| s.collection == collection)
            .copied()
    }
}

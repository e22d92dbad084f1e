//! Field accessor registry.
//!
//! Every record type that criteria can be compiled against registers its
//! fields once in a [`Schema`]. Dotted paths are resolved against these
//! registrations, and collection fields carry their element type so that
//! `Any` criteria can be compiled for it.

mod resolve;

pub use resolve::{CollectionPath, ResolvedField, ScalarPath};

use crate::{
    error::{CompileError, Result},
    lambda::CollectionLink,
};
use indexmap::IndexMap;
use model::core::{data_type::DataType, value::Value};
use resolve::{CollectionAccessor, CollectionField, NestedAccessor, NestedField};
use std::fmt;

/// A record type with a registered schema.
pub trait Record: Sized + Send + Sync + 'static {
    fn schema() -> &'static Schema<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Record,
    Collection,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar => write!(f, "scalar field"),
            FieldKind::Record => write!(f, "nested record"),
            FieldKind::Collection => write!(f, "collection"),
        }
    }
}

enum Field<T> {
    Scalar {
        data_type: DataType,
        get: fn(&T) -> Value,
    },
    Nested(Box<dyn NestedField<T>>),
    Collection(Box<dyn CollectionField<T>>),
}

impl<T> Field<T> {
    fn kind(&self) -> FieldKind {
        match self {
            Field::Scalar { .. } => FieldKind::Scalar,
            Field::Nested(_) => FieldKind::Record,
            Field::Collection(_) => FieldKind::Collection,
        }
    }
}

pub struct Schema<T> {
    name: &'static str,
    fields: IndexMap<&'static str, Field<T>>,
}

impl<T: Record> Schema<T> {
    pub fn new(name: &'static str) -> Self {
        Schema {
            name,
            fields: IndexMap::new(),
        }
    }

    pub fn scalar(mut self, name: &'static str, data_type: DataType, get: fn(&T) -> Value) -> Self {
        self.fields.insert(name, Field::Scalar { data_type, get });
        self
    }

    /// An optional nested record, navigable with a dotted path.
    pub fn nested<A: Record>(mut self, name: &'static str, get: fn(&T) -> Option<&A>) -> Self {
        self.fields
            .insert(name, Field::Nested(Box::new(NestedAccessor { get })));
        self
    }

    /// A collection of records, usable as the target of `Any` criteria.
    ///
    /// Unlinked collections evaluate in memory only; see [`Self::linked_collection`].
    pub fn collection<E: Record>(mut self, name: &'static str, get: fn(&T) -> &[E]) -> Self {
        self.fields
            .insert(name, Field::Collection(Box::new(CollectionAccessor { get, link: None })));
        self
    }

    /// A collection whose rows reference their owner through
    /// `foreign_key = parent_key`, so `Any` criteria lower to a correlated
    /// subquery.
    pub fn linked_collection<E: Record>(
        mut self,
        name: &'static str,
        get: fn(&T) -> &[E],
        foreign_key: &'static str,
        parent_key: &'static str,
    ) -> Self {
        let link = CollectionLink {
            foreign_key,
            parent_key,
        };
        self.fields.insert(
            name,
            Field::Collection(Box::new(CollectionAccessor {
                get,
                link: Some(link),
            })),
        );
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).map(Field::kind)
    }

    /// Resolve a dotted field path into an accessor.
    pub fn resolve(&self, path: &str) -> Result<ResolvedField<T>> {
        let segments: Vec<&str> = path.split('.').collect();
        self.resolve_segments(path, &segments)
    }

    pub(crate) fn resolve_segments(&self, path: &str, segments: &[&str]) -> Result<ResolvedField<T>> {
        let unknown = || CompileError::UnknownField {
            record: self.name,
            field: path.to_string(),
        };
        let (head, rest) = segments.split_first().ok_or_else(unknown)?;
        let field = self.fields.get(*head).ok_or_else(unknown)?;

        match (field, rest.is_empty()) {
            (Field::Scalar { data_type, get }, true) => Ok(ResolvedField::Scalar(ScalarPath::direct(
                path, *data_type, *get,
            ))),
            (Field::Scalar { .. }, false) => Err(unknown()),
            (Field::Nested(nested), false) => nested.resolve(path, rest),
            (Field::Collection(collection), true) => {
                Ok(ResolvedField::Collection(collection.path(path)))
            }
            (Field::Nested(_), true) | (Field::Collection(_), false) => {
                Err(CompileError::FieldKindMismatch {
                    field: path.to_string(),
                    expected: if rest.is_empty() {
                        FieldKind::Scalar
                    } else {
                        FieldKind::Record
                    },
                    actual: field.kind(),
                })
            }
        }
    }
}

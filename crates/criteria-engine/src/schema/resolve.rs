use super::{Record, Schema};
use crate::{
    compile::Compiler,
    error::Result,
    lambda::{CollectionLink, FieldRef, Lambda},
    predicate::{EvalFn, eval_fn},
};
use criteria_syntax::Node;
use model::core::{data_type::DataType, value::Value};
use std::sync::Arc;

type Getter<T> = Arc<dyn Fn(&T) -> Option<Value> + Send + Sync>;
type AnyCompiler<T> = Arc<dyn Fn(&Node, &Compiler<'_>) -> Result<CompiledAny<T>> + Send + Sync>;

fn getter<T, F>(f: F) -> Getter<T>
where
    F: Fn(&T) -> Option<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn any_compiler<T, F>(f: F) -> AnyCompiler<T>
where
    F: Fn(&Node, &Compiler<'_>) -> Result<CompiledAny<T>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Outcome of a resolved field path.
pub enum ResolvedField<T> {
    Scalar(ScalarPath<T>),
    Collection(CollectionPath<T>),
}

impl<A: 'static> ResolvedField<A> {
    /// Re-root a path resolved on a nested record `A` onto its parent `T`.
    fn through<T: 'static>(self, get: fn(&T) -> Option<&A>) -> ResolvedField<T> {
        match self {
            ResolvedField::Scalar(scalar) => {
                let inner = scalar.get;
                ResolvedField::Scalar(ScalarPath {
                    path: scalar.path,
                    data_type: scalar.data_type,
                    get: getter(move |record: &T| get(record).and_then(|nested| inner(nested))),
                })
            }
            ResolvedField::Collection(collection) => {
                let inner = collection.compile_any;
                // The link names columns of the nested record, which has no
                // table of its own once re-rooted.
                ResolvedField::Collection(CollectionPath {
                    path: collection.path,
                    element: collection.element,
                    link: None,
                    compile_any: any_compiler(move |criteria: &Node, compiler: &Compiler<'_>| {
                        let CompiledAny { lambda, eval } = inner(criteria, compiler)?;
                        let eval = eval.map(|eval| {
                            eval_fn(move |record: &T| get(record).is_some_and(|nested| eval(nested)))
                        });
                        Ok(CompiledAny { lambda, eval })
                    }),
                })
            }
        }
    }
}

/// Accessor for a scalar at the end of a (possibly dotted) path.
///
/// `get` yields `None` when an intermediate nested record is absent.
pub struct ScalarPath<T> {
    path: String,
    data_type: DataType,
    get: Getter<T>,
}

impl<T> Clone for ScalarPath<T> {
    fn clone(&self) -> Self {
        ScalarPath {
            path: self.path.clone(),
            data_type: self.data_type,
            get: Arc::clone(&self.get),
        }
    }
}

impl<T: 'static> ScalarPath<T> {
    pub(super) fn direct(path: &str, data_type: DataType, get: fn(&T) -> Value) -> Self {
        ScalarPath {
            path: path.to_string(),
            data_type,
            get: getter(move |record: &T| Some(get(record))),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn get(&self, record: &T) -> Option<Value> {
        (self.get)(record)
    }

    pub fn field_ref(&self) -> FieldRef {
        FieldRef {
            path: self.path.clone(),
            data_type: self.data_type,
        }
    }
}

/// Inner criteria of an `Any`, compiled for the collection's element type
/// and lifted to a test over the owning record.
pub(crate) struct CompiledAny<T> {
    pub lambda: Lambda,
    pub eval: Option<EvalFn<T>>,
}

/// Accessor for a collection of records at the end of a path.
pub struct CollectionPath<T> {
    path: String,
    element: &'static str,
    link: Option<CollectionLink>,
    compile_any: AnyCompiler<T>,
}

impl<T> CollectionPath<T> {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name of the element record type.
    pub fn element(&self) -> &'static str {
        self.element
    }

    pub fn link(&self) -> Option<CollectionLink> {
        self.link
    }

    pub(crate) fn compile_any(&self, criteria: &Node, compiler: &Compiler<'_>) -> Result<CompiledAny<T>> {
        (self.compile_any)(criteria, compiler)
    }
}

pub(super) trait NestedField<T>: Send + Sync {
    fn resolve(&self, path: &str, rest: &[&str]) -> Result<ResolvedField<T>>;
}

pub(super) struct NestedAccessor<T, A> {
    pub get: fn(&T) -> Option<&A>,
}

impl<T: Record, A: Record> NestedField<T> for NestedAccessor<T, A> {
    fn resolve(&self, path: &str, rest: &[&str]) -> Result<ResolvedField<T>> {
        let schema: &Schema<A> = A::schema();
        Ok(schema.resolve_segments(path, rest)?.through(self.get))
    }
}

pub(super) trait CollectionField<T>: Send + Sync {
    fn path(&self, path: &str) -> CollectionPath<T>;
}

pub(super) struct CollectionAccessor<T, E> {
    pub get: fn(&T) -> &[E],
    pub link: Option<CollectionLink>,
}

impl<T: Record, E: Record> CollectionField<T> for CollectionAccessor<T, E> {
    fn path(&self, path: &str) -> CollectionPath<T> {
        let get = self.get;
        CollectionPath {
            path: path.to_string(),
            element: E::schema().name(),
            link: self.link,
            compile_any: any_compiler(move |criteria: &Node, compiler: &Compiler<'_>| {
                let (lambda, eval) = compiler.compile::<E>(criteria)?.into_parts();
                let eval = eval.map(|eval| {
                    eval_fn(move |record: &T| get(record).iter().any(|element| eval(element)))
                });
                Ok(CompiledAny { lambda, eval })
            }),
        }
    }
}

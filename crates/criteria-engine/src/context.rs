use crate::error::{CompileError, Result};
use indexmap::IndexMap;
use model::core::value::Value;
use std::{fmt, sync::Arc};

/// An object that can be navigated by key from a sigil path.
pub trait Navigable: Send + Sync + fmt::Debug {
    fn lookup(&self, key: &str) -> Option<ContextValue>;
}

/// Caller-supplied data that `{path}` sigils are resolved against.
#[derive(Debug, Clone)]
pub enum ContextValue {
    Value(Value),
    Map(IndexMap<String, ContextValue>),
    Object(Arc<dyn Navigable>),
}

impl ContextValue {
    pub fn object(object: impl Navigable + 'static) -> Self {
        ContextValue::Object(Arc::new(object))
    }

    pub fn lookup(&self, key: &str) -> Option<ContextValue> {
        match self {
            ContextValue::Value(_) => None,
            ContextValue::Map(map) => map.get(key).cloned(),
            ContextValue::Object(object) => object.lookup(key),
        }
    }

    /// Walk a dotted path and return the scalar at its end.
    ///
    /// Every segment must resolve, and the walk may not continue through
    /// a null or scalar value.
    pub fn resolve_path(&self, path: &str) -> Result<Value> {
        let mut current = self.clone();
        for segment in path.split('.') {
            current = current
                .lookup(segment)
                .ok_or_else(|| CompileError::ContextLookupFailure {
                    path: path.to_string(),
                    segment: segment.to_string(),
                })?;
        }

        match current {
            ContextValue::Value(value) => Ok(value),
            ContextValue::Map(_) | ContextValue::Object(_) => Err(CompileError::ContextLookupFailure {
                path: path.to_string(),
                segment: path.rsplit('.').next().unwrap_or(path).to_string(),
            }),
        }
    }
}

impl From<Value> for ContextValue {
    fn from(value: Value) -> Self {
        ContextValue::Value(value)
    }
}

impl FromIterator<(String, ContextValue)> for ContextValue {
    fn from_iter<I: IntoIterator<Item = (String, ContextValue)>>(iter: I) -> Self {
        ContextValue::Map(iter.into_iter().collect())
    }
}

/// Objects become maps; arrays become maps keyed by position (`"0"`, `"1"`, ...).
impl From<serde_json::Value> for ContextValue {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(object) => object
                .into_iter()
                .map(|(key, value)| (key, ContextValue::from(value)))
                .collect(),
            serde_json::Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), ContextValue::from(value)))
                .collect(),
            scalar => ContextValue::Value(Value::from_json(&scalar).unwrap_or(Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Session {
        user_id: i64,
    }

    impl Navigable for Session {
        fn lookup(&self, key: &str) -> Option<ContextValue> {
            match key {
                "userId" => Some(Value::Int(self.user_id).into()),
                _ => None,
            }
        }
    }

    #[test]
    fn test_resolve_nested_map_path() {
        let context = ContextValue::from(json!({
            "tenant": { "region": "eu", "limits": [10, 20] }
        }));

        assert_eq!(
            context.resolve_path("tenant.region").unwrap(),
            Value::String("eu".into())
        );
        assert_eq!(context.resolve_path("tenant.limits.1").unwrap(), Value::Int(20));
    }

    #[test]
    fn test_resolve_through_navigable_object() {
        let context: ContextValue = [(
            "session".to_string(),
            ContextValue::object(Session { user_id: 7 }),
        )]
        .into_iter()
        .collect();

        assert_eq!(context.resolve_path("session.userId").unwrap(), Value::Int(7));
    }

    #[test]
    fn test_missing_segment_fails() {
        let context = ContextValue::from(json!({ "tenant": { "region": "eu" } }));

        let err = context.resolve_path("tenant.zone").unwrap_err();
        assert!(matches!(
            err,
            CompileError::ContextLookupFailure { ref segment, .. } if segment == "zone"
        ));
    }

    #[test]
    fn test_walk_through_null_fails() {
        let context = ContextValue::from(json!({ "tenant": null }));

        let err = context.resolve_path("tenant.region").unwrap_err();
        assert!(matches!(
            err,
            CompileError::ContextLookupFailure { ref segment, .. } if segment == "region"
        ));
    }

    #[test]
    fn test_path_ending_on_map_fails() {
        let context = ContextValue::from(json!({ "tenant": { "region": "eu" } }));
        assert!(context.resolve_path("tenant").is_err());
    }
}

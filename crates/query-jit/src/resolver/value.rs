use std::{fmt, sync::Mutex};

use futures::{future::BoxFuture, stream::FuturesOrdered, StreamExt};
use indexmap::IndexMap;

use crate::GraphqlError;

type DeferredFuture = BoxFuture<'static, Result<FieldValue, GraphqlError>>;

/// The value model resolvers produce and receive as parent. Deliberately
/// wider than JSON: an error can stand in for a value anywhere (a failed list
/// element, a returned-instead-of-thrown error) and a list element may be a
/// future that hasn't resolved yet.
#[derive(Default)]
pub enum FieldValue {
    #[default]
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<FieldValue>),
    Object(IndexMap<String, FieldValue>),
    /// An error travelling in value position.
    Error(GraphqlError),
    /// A not-yet-resolved value. Normalized away before any plan shape sees
    /// it. The mutex is never contended, it only makes shared parents Sync.
    Deferred(Mutex<DeferredFuture>),
}

impl FieldValue {
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, FieldValue)>) -> Self {
        FieldValue::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    pub fn deferred(future: impl std::future::Future<Output = Result<FieldValue, GraphqlError>> + Send + 'static) -> Self {
        FieldValue::Deferred(Mutex::new(Box::pin(future)))
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        match self {
            FieldValue::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    /// The `__typename` property, when the value carries one.
    pub fn typename(&self) -> Option<&str> {
        match self.get("__typename")? {
            FieldValue::String(name) if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::String(_) => "string",
            FieldValue::List(_) => "list",
            FieldValue::Object(_) => "object",
            FieldValue::Error(_) => "error",
            FieldValue::Deferred(_) => "deferred",
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("Null"),
            FieldValue::Boolean(value) => f.debug_tuple("Boolean").field(value).finish(),
            FieldValue::Int(value) => f.debug_tuple("Int").field(value).finish(),
            FieldValue::Float(value) => f.debug_tuple("Float").field(value).finish(),
            FieldValue::String(value) => f.debug_tuple("String").field(value).finish(),
            FieldValue::List(items) => f.debug_tuple("List").field(items).finish(),
            FieldValue::Object(fields) => f.debug_tuple("Object").field(fields).finish(),
            FieldValue::Error(error) => f.debug_tuple("Error").field(error).finish(),
            FieldValue::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.into())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<GraphqlError> for FieldValue {
    fn from(error: GraphqlError) -> Self {
        FieldValue::Error(error)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => FieldValue::Null,
        }
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(value) => FieldValue::Boolean(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => FieldValue::Int(value),
                None => FieldValue::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(value) => FieldValue::String(value),
            serde_json::Value::Array(items) => FieldValue::List(items.into_iter().map(Into::into).collect()),
            serde_json::Value::Object(fields) => FieldValue::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, FieldValue::from(value)))
                    .collect(),
            ),
        }
    }
}

/// The value-or-future adapter: awaits every deferred value in the tree,
/// materializing rejections as in-band errors so a failed list element never
/// takes the whole list down. Element order is preserved, pending elements
/// resolve concurrently.
pub(crate) fn normalize(value: FieldValue) -> BoxFuture<'static, FieldValue> {
    Box::pin(async move {
        match value {
            FieldValue::Deferred(future) => {
                let future = match future.into_inner() {
                    Ok(future) => future,
                    Err(poisoned) => poisoned.into_inner(),
                };
                match future.await {
                    Ok(value) => normalize(value).await,
                    Err(error) => FieldValue::Error(error),
                }
            }
            FieldValue::List(items) => {
                let items = items
                    .into_iter()
                    .map(normalize)
                    .collect::<FuturesOrdered<_>>()
                    .collect::<Vec<_>>()
                    .await;
                FieldValue::List(items)
            }
            FieldValue::Object(fields) => {
                let (keys, values): (Vec<_>, Vec<_>) = fields.into_iter().unzip();
                let values = futures::future::join_all(values.into_iter().map(normalize)).await;
                FieldValue::Object(keys.into_iter().zip(values).collect())
            }
            other => other,
        }
    })
}

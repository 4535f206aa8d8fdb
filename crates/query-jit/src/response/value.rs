use crate::operation::ResponseKey;

use super::{ResponseListId, ResponseMapId, ResponseObjectId};

#[derive(Debug, Default)]
pub(crate) struct ResponseObject {
    /// Fields in the order they appear in the selection set.
    pub(super) fields: Vec<ResponseObjectField>,
}

#[derive(Debug, Clone)]
pub(crate) struct ResponseObjectField {
    pub key: ResponseKey,
    pub value: ResponseValue,
}

impl ResponseObject {
    pub fn new(fields: Vec<ResponseObjectField>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> impl Iterator<Item = &ResponseObjectField> {
        self.fields.iter()
    }
}

/// A value slot in the response arena. Lists, objects and free-form maps are
/// stored out of line so error propagation can null a slot without touching
/// its subtree.
#[derive(Default, Debug, Clone)]
pub(crate) enum ResponseValue {
    #[default]
    Null,
    Boolean {
        value: bool,
    },
    // Defined as i32
    // https://spec.graphql.org/October2021/#sec-Int
    Int {
        value: i32,
    },
    Float {
        value: f64,
    },
    String {
        value: Box<str>,
    },
    List {
        id: ResponseListId,
    },
    Object {
        id: ResponseObjectId,
    },
    // For pass-through leaves, anything serde_json::Value would support
    I64 {
        value: i64,
    },
    U64 {
        value: u64,
    },
    Map {
        id: ResponseMapId,
    },
}

impl From<bool> for ResponseValue {
    fn from(value: bool) -> Self {
        Self::Boolean { value }
    }
}

impl From<i32> for ResponseValue {
    fn from(value: i32) -> Self {
        Self::Int { value }
    }
}

impl From<i64> for ResponseValue {
    fn from(value: i64) -> Self {
        Self::I64 { value }
    }
}

impl From<u64> for ResponseValue {
    fn from(value: u64) -> Self {
        Self::U64 { value }
    }
}

impl From<f64> for ResponseValue {
    fn from(value: f64) -> Self {
        Self::Float { value }
    }
}

impl From<String> for ResponseValue {
    fn from(value: String) -> Self {
        Self::String {
            value: value.into_boxed_str(),
        }
    }
}

impl From<&str> for ResponseValue {
    fn from(value: &str) -> Self {
        Self::String { value: value.into() }
    }
}

impl From<ResponseListId> for ResponseValue {
    fn from(id: ResponseListId) -> Self {
        Self::List { id }
    }
}

impl From<ResponseObjectId> for ResponseValue {
    fn from(id: ResponseObjectId) -> Self {
        Self::Object { id }
    }
}

impl From<ResponseMapId> for ResponseValue {
    fn from(id: ResponseMapId) -> Self {
        Self::Map { id }
    }
}

#[cfg(test)]
#[test]
fn check_response_value_size() {
    assert_eq!(std::mem::size_of::<ResponseValue>(), 24);
}

mod data;
mod path;
mod read;
mod value;
mod write;

use std::sync::Arc;

pub(crate) use data::*;
pub(crate) use path::*;
pub(crate) use value::*;
pub(crate) use write::*;

use crate::{operation::ResponseKeys, GraphqlError};

/// The outcome of one execution: the data tree plus the structured error
/// list. Serializes straight off the arena, no intermediate value tree.
pub struct Response {
    pub(crate) keys: Arc<ResponseKeys>,
    /// `None` when execution never started (variable or compile errors): the
    /// `data` key is omitted entirely rather than set to null.
    pub(crate) data: Option<ResponseData>,
    pub(crate) errors: Vec<GraphqlError>,
    pub(crate) extensions: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Response {
    pub(crate) fn request_error(errors: impl IntoIterator<Item: Into<GraphqlError>>) -> Self {
        Response {
            keys: Arc::new(ResponseKeys::default()),
            data: None,
            errors: errors.into_iter().map(Into::into).collect(),
            extensions: None,
        }
    }

    pub fn errors(&self) -> &[GraphqlError] {
        &self.errors
    }

    /// Whether the response carries a `data` key at all, null or not.
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Whether `data` is present and non-null.
    pub fn data_is_non_null(&self) -> bool {
        self.data.as_ref().is_some_and(|data| data.root().is_some())
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extensions
            .get_or_insert_with(Default::default)
            .insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("data", &self.data_is_non_null())
            .field("errors", &self.errors)
            .finish()
    }
}

use std::sync::Arc;

use crate::{operation::ResponseKeys, GraphqlError};

use super::{
    Response, ResponseData, ResponseObjectField, ResponseObjectId, ResponseValue, ResponseValueId,
};

/// Identifies a reserved deferred-resolver slot: the field was pushed with a
/// `Null` placeholder during the synchronous pass and is filled in when its
/// resolver completes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResponseSlot {
    pub object_id: ResponseObjectId,
    pub field_index: usize,
}

pub(crate) struct ResponseBuilder {
    pub keys: Arc<ResponseKeys>,
    pub data: ResponseData,
    pub errors: Vec<GraphqlError>,
}

impl ResponseBuilder {
    pub fn new(keys: Arc<ResponseKeys>) -> Self {
        Self {
            keys,
            data: ResponseData::default(),
            errors: Vec::new(),
        }
    }

    pub fn push_error(&mut self, error: impl Into<GraphqlError>) {
        self.errors.push(error.into());
    }

    pub fn set_slot(&mut self, slot: ResponseSlot, value: ResponseValue) {
        // A slot under a discarded object no longer exists; the write is
        // dropped with its subtree.
        if let Some(field) = self.data[slot.object_id].fields.get_mut(slot.field_index) {
            field.value = value;
        }
    }

    /// Nulls out the nearest nullable ancestor along the path. Without one the
    /// failure reaches the root and `data` becomes null. Only ever called on
    /// completed parts of the tree: synchronous construction bubbles nulls
    /// through return values instead.
    pub fn propagate_null(&mut self, path: &[ResponseValueId]) {
        let Some(value_id) = path.iter().rev().find(|value| value.is_nullable()) else {
            self.data.clear_root();
            return;
        };
        match *value_id {
            ResponseValueId::Field { object_id, key, .. } => {
                let object = &mut self.data[object_id];
                match object.fields.iter_mut().find(|field| field.key == key) {
                    Some(field) => field.value = ResponseValue::Null,
                    // The slot may not exist yet if the owning object is still
                    // being assembled elsewhere.
                    None => object.fields.push(ResponseObjectField {
                        key,
                        value: ResponseValue::Null,
                    }),
                }
            }
            ResponseValueId::Index { list_id, index, .. } => {
                self.data[list_id][index as usize] = ResponseValue::Null;
            }
        }
    }

    pub fn build(self) -> Response {
        Response {
            keys: self.keys,
            data: Some(self.data),
            errors: self.errors,
            extensions: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{operation::ResponseKeys, response::ResponseObject};

    fn builder_with_chain() -> (ResponseBuilder, Vec<ResponseValueId>, ResponseObjectId) {
        // { a: { b: <leaf> } } with "a" nullable and "b" required.
        let mut keys = ResponseKeys::default();
        let a = keys.get_or_intern("a");
        let b = keys.get_or_intern("b");
        let mut builder = ResponseBuilder::new(Arc::new(keys));

        let inner_id = builder.data.push_object(ResponseObject::new(vec![ResponseObjectField {
            key: b,
            value: ResponseValue::from("leaf"),
        }]));
        let root_id = builder.data.push_object(ResponseObject::new(vec![ResponseObjectField {
            key: a,
            value: inner_id.into(),
        }]));
        builder.data.set_root(root_id);

        let path = vec![
            ResponseValueId::Field {
                object_id: root_id,
                key: a,
                nullable: true,
            },
            ResponseValueId::Field {
                object_id: inner_id,
                key: b,
                nullable: false,
            },
        ];
        (builder, path, root_id)
    }

    #[test]
    fn nulls_nearest_nullable_ancestor() {
        let (mut builder, path, root_id) = builder_with_chain();
        builder.propagate_null(&path);
        let root = &builder.data[root_id];
        assert!(matches!(root.fields().next().unwrap().value, ResponseValue::Null));
        assert!(builder.data.root().is_some());
    }

    #[test]
    fn reaches_the_root_without_nullable_ancestor() {
        let (mut builder, mut path, _) = builder_with_chain();
        if let ResponseValueId::Field { nullable, .. } = &mut path[0] {
            *nullable = false;
        }
        builder.propagate_null(&path);
        assert!(builder.data.root().is_none());
    }
}

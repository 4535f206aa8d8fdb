use crate::{
    error::{ErrorPath, InsertIntoErrorPath},
    operation::ResponseKey,
};

use super::{ResponseListId, ResponseObjectId};

/// Unique identifier of a value within the response. Used to propagate null
/// at the right place and to generate the appropriate error path for errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResponseValueId {
    Field {
        object_id: ResponseObjectId,
        key: ResponseKey,
        nullable: bool,
    },
    Index {
        list_id: ResponseListId,
        index: u32,
        nullable: bool,
    },
}

impl ResponseValueId {
    pub fn is_nullable(&self) -> bool {
        match self {
            ResponseValueId::Field { nullable, .. } => *nullable,
            ResponseValueId::Index { nullable, .. } => *nullable,
        }
    }
}

impl InsertIntoErrorPath for &ResponseValueId {
    fn insert_into(self, path: &mut ErrorPath) {
        match self {
            ResponseValueId::Field { key, .. } => key.insert_into(path),
            ResponseValueId::Index { index, .. } => index.insert_into(path),
        }
    }
}

#[cfg(test)]
#[test]
fn response_value_id_size() {
    assert_eq!(std::mem::size_of::<ResponseValueId>(), 12);
}

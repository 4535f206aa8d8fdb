use super::{ResponseObject, ResponseValue};

/// Arena holding the response tree. Objects, lists and free-form maps are
/// addressed by id so a slot can be rewritten (error propagation) without
/// walking its subtree.
#[derive(Default)]
pub(crate) struct ResponseData {
    /// None once an error propagated all the way up: `"data": null`.
    pub(super) root: Option<ResponseObjectId>,
    objects: Vec<ResponseObject>,
    lists: Vec<Vec<ResponseValue>>,
    maps: Vec<Vec<(String, ResponseValue)>>,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub(crate) struct ResponseObjectId(u32);

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub(crate) struct ResponseListId(u32);

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub(crate) struct ResponseMapId(u32);

impl ResponseData {
    pub fn root(&self) -> Option<ResponseObjectId> {
        self.root
    }

    pub fn set_root(&mut self, id: ResponseObjectId) {
        self.root = Some(id);
    }

    pub fn clear_root(&mut self) {
        self.root = None;
    }

    pub fn push_object(&mut self, object: ResponseObject) -> ResponseObjectId {
        let id = ResponseObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    /// Reserves the id before the fields exist so nested values and deferred
    /// slots can reference their parent.
    pub fn reserve_object_id(&mut self) -> ResponseObjectId {
        self.push_object(ResponseObject::default())
    }

    pub fn put_object(&mut self, id: ResponseObjectId, object: ResponseObject) {
        debug_assert!(self[id].fields.is_empty(), "object written twice");
        self[id] = object;
    }

    pub fn push_list(&mut self, list: Vec<ResponseValue>) -> ResponseListId {
        let id = ResponseListId(self.lists.len() as u32);
        self.lists.push(list);
        id
    }

    pub fn reserve_list_id(&mut self) -> ResponseListId {
        self.push_list(Vec::new())
    }

    pub fn put_list(&mut self, id: ResponseListId, list: Vec<ResponseValue>) {
        debug_assert!(self[id].is_empty(), "list written twice");
        self[id] = list;
    }

    pub fn push_map(&mut self, map: Vec<(String, ResponseValue)>) -> ResponseMapId {
        let id = ResponseMapId(self.maps.len() as u32);
        self.maps.push(map);
        id
    }
}

impl std::ops::Index<ResponseObjectId> for ResponseData {
    type Output = ResponseObject;
    fn index(&self, id: ResponseObjectId) -> &Self::Output {
        &self.objects[id.0 as usize]
    }
}

impl std::ops::IndexMut<ResponseObjectId> for ResponseData {
    fn index_mut(&mut self, id: ResponseObjectId) -> &mut Self::Output {
        &mut self.objects[id.0 as usize]
    }
}

impl std::ops::Index<ResponseListId> for ResponseData {
    type Output = Vec<ResponseValue>;
    fn index(&self, id: ResponseListId) -> &Self::Output {
        &self.lists[id.0 as usize]
    }
}

impl std::ops::IndexMut<ResponseListId> for ResponseData {
    fn index_mut(&mut self, id: ResponseListId) -> &mut Self::Output {
        &mut self.lists[id.0 as usize]
    }
}

impl std::ops::Index<ResponseMapId> for ResponseData {
    type Output = Vec<(String, ResponseValue)>;
    fn index(&self, id: ResponseMapId) -> &Self::Output {
        &self.maps[id.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{operation::ResponseKeys, response::ResponseObjectField};

    #[test]
    fn reserve_then_put() {
        let mut data = ResponseData::default();
        let id = data.reserve_object_id();
        let mut keys = ResponseKeys::default();
        let key = keys.get_or_intern("a");
        data.put_object(
            id,
            ResponseObject::new(vec![ResponseObjectField {
                key,
                value: ResponseValue::from(1i32),
            }]),
        );
        assert!(matches!(
            data[id].fields().next().unwrap().value,
            ResponseValue::Int { value: 1 }
        ));
    }
}

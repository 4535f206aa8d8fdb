use indexmap::IndexSet;

/// Interned response keys (field aliases or names). The compiled plan and the
/// response reference keys by id, the strings are resolved at serialization
/// time only.
#[derive(Debug, Default, Clone)]
pub(crate) struct ResponseKeys(IndexSet<Box<str>>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResponseKey(u32);

impl ResponseKeys {
    pub fn get_or_intern(&mut self, key: &str) -> ResponseKey {
        let (index, _) = self.0.insert_full(key.into());
        ResponseKey(index as u32)
    }

    pub fn get(&self, key: &str) -> Option<ResponseKey> {
        self.0.get_index_of(key).map(|index| ResponseKey(index as u32))
    }
}

impl std::ops::Index<ResponseKey> for ResponseKeys {
    type Output = str;

    fn index(&self, key: ResponseKey) -> &Self::Output {
        self.0.get_index(key.0 as usize).expect("key was interned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut keys = ResponseKeys::default();
        let a = keys.get_or_intern("hello");
        let b = keys.get_or_intern("world");
        let c = keys.get_or_intern("hello");
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(&keys[a], "hello");
        assert_eq!(&keys[b], "world");
        assert_eq!(keys.get("world"), Some(b));
        assert_eq!(keys.get("missing"), None);
    }
}

use serde::ser::{SerializeMap, SerializeSeq};

use crate::{
    error::{ErrorPathSegment, GraphqlError},
    operation::ResponseKeys,
};

use super::{Response, ResponseData, ResponseObjectId, ResponseValue};

impl serde::Serialize for Response {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        if let Some(data) = &self.data {
            map.serialize_entry(
                "data",
                &SerializableData {
                    keys: &self.keys,
                    data,
                },
            )?;
        }
        if !self.errors.is_empty() {
            map.serialize_entry(
                "errors",
                &SerializableErrors {
                    keys: &self.keys,
                    errors: &self.errors,
                },
            )?;
        }
        if let Some(extensions) = &self.extensions {
            map.serialize_entry("extensions", extensions)?;
        }
        map.end()
    }
}

struct SerializableData<'a> {
    keys: &'a ResponseKeys,
    data: &'a ResponseData,
}

impl serde::Serialize for SerializableData<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.data.root() {
            Some(root) => SerializableObject {
                keys: self.keys,
                data: self.data,
                id: root,
            }
            .serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

struct SerializableObject<'a> {
    keys: &'a ResponseKeys,
    data: &'a ResponseData,
    id: ResponseObjectId,
}

impl serde::Serialize for SerializableObject<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let fields = &self.data[self.id];
        let mut map = serializer.serialize_map(None)?;
        for field in fields.fields() {
            map.serialize_key(&self.keys[field.key])?;
            map.serialize_value(&SerializableValue {
                keys: self.keys,
                data: self.data,
                value: &field.value,
            })?;
        }
        map.end()
    }
}

struct SerializableValue<'a> {
    keys: &'a ResponseKeys,
    data: &'a ResponseData,
    value: &'a ResponseValue,
}

impl serde::Serialize for SerializableValue<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.value {
            ResponseValue::Null => serializer.serialize_none(),
            ResponseValue::Boolean { value } => value.serialize(serializer),
            ResponseValue::Int { value } => value.serialize(serializer),
            ResponseValue::Float { value } => value.serialize(serializer),
            ResponseValue::String { value } => value.serialize(serializer),
            ResponseValue::I64 { value } => value.serialize(serializer),
            ResponseValue::U64 { value } => value.serialize(serializer),
            ResponseValue::List { id } => {
                let list = &self.data[*id];
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for value in list {
                    seq.serialize_element(&SerializableValue {
                        keys: self.keys,
                        data: self.data,
                        value,
                    })?;
                }
                seq.end()
            }
            ResponseValue::Object { id } => SerializableObject {
                keys: self.keys,
                data: self.data,
                id: *id,
            }
            .serialize(serializer),
            ResponseValue::Map { id } => serializer.collect_map(self.data[*id].iter().map(|(key, value)| {
                (
                    key.as_str(),
                    SerializableValue {
                        keys: self.keys,
                        data: self.data,
                        value,
                    },
                )
            })),
        }
    }
}

struct SerializableErrors<'a> {
    keys: &'a ResponseKeys,
    errors: &'a [GraphqlError],
}

impl serde::Serialize for SerializableErrors<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.errors.len()))?;
        for error in self.errors {
            seq.serialize_element(&SerializableError {
                keys: self.keys,
                error,
            })?;
        }
        seq.end()
    }
}

struct SerializableError<'a> {
    keys: &'a ResponseKeys,
    error: &'a GraphqlError,
}

impl serde::Serialize for SerializableError<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("message", &self.error.message)?;
        if !self.error.locations.is_empty() {
            map.serialize_entry("locations", &self.error.locations)?;
        }
        if let Some(path) = &self.error.path {
            map.serialize_entry(
                "path",
                &SerializableErrorPath {
                    keys: self.keys,
                    path,
                },
            )?;
        }
        map.serialize_entry(
            "extensions",
            &SerializableExtensions {
                code: self.error.code,
                extensions: &self.error.extensions,
            },
        )?;
        map.end()
    }
}

struct SerializableErrorPath<'a> {
    keys: &'a ResponseKeys,
    path: &'a [ErrorPathSegment],
}

impl serde::Serialize for SerializableErrorPath<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.path.len()))?;
        for segment in self.path {
            match segment {
                ErrorPathSegment::Field(key) => seq.serialize_element(&self.keys[*key])?,
                ErrorPathSegment::Index(index) => seq.serialize_element(index)?,
            }
        }
        seq.end()
    }
}

struct SerializableExtensions<'a> {
    code: crate::ErrorCode,
    extensions: &'a [(std::borrow::Cow<'static, str>, serde_json::Value)],
}

impl serde::Serialize for SerializableExtensions<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut has_code = false;
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.extensions {
            has_code |= key == "code";
            map.serialize_entry(key, value)?;
        }
        if !has_code {
            map.serialize_entry("code", &self.code)?;
        }
        map.end()
    }
}

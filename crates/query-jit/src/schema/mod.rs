mod builder;
mod wrapping;

use std::{fmt, sync::Arc};

use indexmap::{IndexMap, IndexSet};

pub use builder::{SchemaBuilder, SchemaError};
pub use wrapping::{ListWrapping, Wrapping};
pub(crate) use wrapping::MutableWrapping;

use crate::{
    operation::OperationType,
    resolver::{BoxResolver, FieldValue, RequestContext},
};

/// Serializes a custom scalar value into wire form, or explains why it can't.
pub type LeafSerializer = Arc<dyn Fn(&FieldValue) -> Result<serde_json::Value, String> + Send + Sync>;

/// Resolves the concrete object type name for a value of an abstract type.
/// Must be synchronous; returning `None` is a type resolution failure.
pub type TypeResolver = Arc<dyn Fn(&FieldValue, &RequestContext) -> Option<String> + Send + Sync>;

/// Per-object fallback used when neither a type resolver nor a `__typename`
/// property identifies the concrete type.
pub type IsTypeOf = Arc<dyn Fn(&FieldValue) -> bool + Send + Sync>;

/// Read-only view of the type system the compiler works against. The schema
/// is consumed, not owned: construction happens through [`SchemaBuilder`] and
/// the compiler never mutates it.
pub struct Schema {
    types: IndexMap<String, TypeDefinition>,
    query_type_name: String,
    mutation_type_name: Option<String>,
}

impl Schema {
    pub fn builder(sdl: &str) -> SchemaBuilder {
        SchemaBuilder::new(sdl)
    }

    pub fn query_type_name(&self) -> &str {
        &self.query_type_name
    }

    pub fn mutation_type_name(&self) -> Option<&str> {
        self.mutation_type_name.as_deref()
    }

    pub fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub(crate) fn object_definition(&self, name: &str) -> Option<&ObjectDefinition> {
        match self.types.get(name)? {
            TypeDefinition::Object(object) => Some(object),
            _ => None,
        }
    }

    pub(crate) fn root_object_name(&self, ty: OperationType) -> Option<&str> {
        match ty {
            OperationType::Query => Some(self.query_type_name.as_str()),
            OperationType::Mutation => self.mutation_type_name.as_deref(),
        }
    }

    /// Whether a fragment with the given type condition selects into the
    /// given concrete object type.
    pub(crate) fn type_condition_applies(&self, condition: &str, object: &ObjectDefinition) -> bool {
        if condition == object.name || object.implements.iter().any(|interface| interface == condition) {
            return true;
        }
        match self.types.get(condition) {
            Some(TypeDefinition::Union(union)) => union.possible_types.iter().any(|name| *name == object.name),
            _ => false,
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("query_type_name", &self.query_type_name)
            .field("mutation_type_name", &self.mutation_type_name)
            .finish()
    }
}

pub enum TypeDefinition {
    Scalar(ScalarDefinition),
    Object(ObjectDefinition),
    Interface(InterfaceDefinition),
    Union(UnionDefinition),
    Enum(EnumDefinition),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Scalar(scalar) => &scalar.name,
            TypeDefinition::Object(object) => &object.name,
            TypeDefinition::Interface(interface) => &interface.name,
            TypeDefinition::Union(union) => &union.name,
            TypeDefinition::Enum(r#enum) => &r#enum.name,
        }
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, TypeDefinition::Interface(_) | TypeDefinition::Union(_))
    }
}

pub struct ObjectDefinition {
    pub name: String,
    pub implements: Vec<String>,
    pub fields: IndexMap<String, FieldDefinition>,
    pub(crate) is_type_of: Option<IsTypeOf>,
}

pub struct FieldDefinition {
    pub name: String,
    pub ty: TypeRecord,
    pub arguments: Vec<ArgumentDefinition>,
    pub(crate) resolver: Option<BoxResolver>,
}

pub struct ArgumentDefinition {
    pub name: String,
    pub ty: TypeRecord,
    pub default_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinScalar {
    String,
    Int,
    Float,
    Boolean,
    Id,
}

pub struct ScalarDefinition {
    pub name: String,
    pub builtin: Option<BuiltinScalar>,
    pub(crate) serializer: Option<LeafSerializer>,
}

pub struct EnumDefinition {
    pub name: String,
    pub values: Arc<IndexSet<String>>,
}

pub struct UnionDefinition {
    pub name: String,
    pub possible_types: Vec<String>,
    pub(crate) type_resolver: Option<TypeResolver>,
}

pub struct InterfaceDefinition {
    pub name: String,
    pub fields: IndexMap<String, FieldDefinition>,
    pub possible_types: Vec<String>,
    pub(crate) type_resolver: Option<TypeResolver>,
}

impl TypeDefinition {
    pub(crate) fn possible_types(&self) -> Option<&[String]> {
        match self {
            TypeDefinition::Union(union) => Some(&union.possible_types),
            TypeDefinition::Interface(interface) => Some(&interface.possible_types),
            _ => None,
        }
    }

    pub(crate) fn type_resolver(&self) -> Option<&TypeResolver> {
        match self {
            TypeDefinition::Union(union) => union.type_resolver.as_ref(),
            TypeDefinition::Interface(interface) => interface.type_resolver.as_ref(),
            _ => None,
        }
    }
}

/// A named output type together with its list/non-null wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRecord {
    pub definition_name: String,
    pub wrapping: Wrapping,
}

impl fmt::Display for TypeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.wrapping.type_display(&self.definition_name).fmt(f)
    }
}

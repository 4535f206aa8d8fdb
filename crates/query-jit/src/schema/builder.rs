use std::{collections::HashMap, sync::Arc};

use async_graphql_parser::types as ast;
use indexmap::{IndexMap, IndexSet};

use super::{
    ArgumentDefinition, BuiltinScalar, EnumDefinition, FieldDefinition, InterfaceDefinition, IsTypeOf,
    LeafSerializer, ObjectDefinition, ScalarDefinition, Schema, TypeDefinition, TypeRecord, TypeResolver,
    UnionDefinition, Wrapping,
};
use crate::resolver::{BoxResolver, FieldValue, RequestContext, Resolve};

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("invalid schema document: {0}")]
    Parse(#[from] async_graphql_parser::Error),
    #[error("query root type '{0}' is not defined as an object type")]
    MissingQueryRoot(String),
    #[error("mutation root type '{0}' is not defined as an object type")]
    MissingMutationRoot(String),
    #[error("no field '{type_name}.{field_name}' to attach a resolver to")]
    UnknownResolverTarget { type_name: String, field_name: String },
    #[error("no abstract type '{0}' to attach a type resolver to")]
    UnknownTypeResolverTarget(String),
    #[error("no object type '{0}' to attach an is_type_of check to")]
    UnknownIsTypeOfTarget(String),
    #[error("no custom scalar '{0}' to attach a serializer to")]
    UnknownSerializerTarget(String),
}

/// Builds the schema view out of SDL plus programmatically attached
/// callables. The SDL is trusted: this is construction, not validation.
pub struct SchemaBuilder {
    sdl: String,
    field_resolvers: HashMap<(String, String), BoxResolver>,
    type_resolvers: HashMap<String, TypeResolver>,
    is_type_of: HashMap<String, IsTypeOf>,
    serializers: HashMap<String, LeafSerializer>,
}

impl SchemaBuilder {
    pub fn new(sdl: &str) -> Self {
        SchemaBuilder {
            sdl: sdl.into(),
            field_resolvers: Default::default(),
            type_resolvers: Default::default(),
            is_type_of: Default::default(),
            serializers: Default::default(),
        }
    }

    pub fn with_resolver(mut self, ty: &str, field: &str, resolver: impl Resolve) -> Self {
        self.field_resolvers.insert((ty.into(), field.into()), Arc::new(resolver));
        self
    }

    pub fn with_type_resolver(
        mut self,
        ty: &str,
        resolver: impl Fn(&FieldValue, &RequestContext) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.type_resolvers.insert(ty.into(), Arc::new(resolver));
        self
    }

    pub fn with_is_type_of(mut self, ty: &str, check: impl Fn(&FieldValue) -> bool + Send + Sync + 'static) -> Self {
        self.is_type_of.insert(ty.into(), Arc::new(check));
        self
    }

    pub fn with_serializer(
        mut self,
        scalar: &str,
        serializer: impl Fn(&FieldValue) -> Result<serde_json::Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.serializers.insert(scalar.into(), Arc::new(serializer));
        self
    }

    pub fn finish(self) -> Result<Schema, SchemaError> {
        let Self {
            sdl,
            mut field_resolvers,
            mut type_resolvers,
            mut is_type_of,
            mut serializers,
        } = self;

        let document = async_graphql_parser::parse_schema(&sdl)?;

        let (query_type_name, mutation_type_name) = root_types(&document);

        let mut types = IndexMap::new();
        for name in ["String", "Int", "Float", "Boolean", "ID"] {
            types.insert(
                name.to_string(),
                TypeDefinition::Scalar(ScalarDefinition {
                    name: name.to_string(),
                    builtin: Some(builtin_scalar(name).expect("known builtin")),
                    serializer: None,
                }),
            );
        }

        for definition in &document.definitions {
            let ast::TypeSystemDefinition::Type(definition) = definition else {
                continue;
            };
            let definition = &definition.node;
            let name = definition.name.node.to_string();
            let converted = match &definition.kind {
                ast::TypeKind::Scalar => {
                    if builtin_scalar(&name).is_some() {
                        continue;
                    }
                    TypeDefinition::Scalar(ScalarDefinition {
                        serializer: serializers.remove(&name),
                        builtin: None,
                        name,
                    })
                }
                ast::TypeKind::Object(object) => TypeDefinition::Object(ObjectDefinition {
                    implements: object.implements.iter().map(|name| name.node.to_string()).collect(),
                    fields: convert_fields(&name, &object.fields, &mut field_resolvers),
                    is_type_of: is_type_of.remove(&name),
                    name,
                }),
                ast::TypeKind::Interface(interface) => TypeDefinition::Interface(InterfaceDefinition {
                    fields: convert_fields(&name, &interface.fields, &mut field_resolvers),
                    possible_types: Vec::new(),
                    type_resolver: type_resolvers.remove(&name),
                    name,
                }),
                ast::TypeKind::Union(union) => TypeDefinition::Union(UnionDefinition {
                    possible_types: union.members.iter().map(|member| member.node.to_string()).collect(),
                    type_resolver: type_resolvers.remove(&name),
                    name,
                }),
                ast::TypeKind::Enum(r#enum) => TypeDefinition::Enum(EnumDefinition {
                    values: Arc::new(
                        r#enum
                            .values
                            .iter()
                            .map(|value| value.node.value.node.to_string())
                            .collect::<IndexSet<_>>(),
                    ),
                    name,
                }),
                // Input objects only ever appear inside argument values, which
                // stay structural JSON all the way to the resolver.
                ast::TypeKind::InputObject(_) => continue,
            };
            types.insert(definition.name.node.to_string(), converted);
        }

        // Interfaces learn their possible types from the objects implementing them.
        let implementations: Vec<(String, String)> = types
            .values()
            .filter_map(|definition| match definition {
                TypeDefinition::Object(object) => Some(
                    object
                        .implements
                        .iter()
                        .map(|interface| (interface.clone(), object.name.clone()))
                        .collect::<Vec<_>>(),
                ),
                _ => None,
            })
            .flatten()
            .collect();
        for (interface_name, object_name) in implementations {
            if let Some(TypeDefinition::Interface(interface)) = types.get_mut(&interface_name) {
                interface.possible_types.push(object_name);
            }
        }

        if let Some(((type_name, field_name), _)) = field_resolvers.into_iter().next() {
            return Err(SchemaError::UnknownResolverTarget { type_name, field_name });
        }
        if let Some((name, _)) = type_resolvers.into_iter().next() {
            return Err(SchemaError::UnknownTypeResolverTarget(name));
        }
        if let Some((name, _)) = is_type_of.into_iter().next() {
            return Err(SchemaError::UnknownIsTypeOfTarget(name));
        }
        if let Some((name, _)) = serializers.into_iter().next() {
            return Err(SchemaError::UnknownSerializerTarget(name));
        }

        let schema = Schema {
            query_type_name,
            mutation_type_name,
            types,
        };

        if schema.object_definition(&schema.query_type_name).is_none() {
            return Err(SchemaError::MissingQueryRoot(schema.query_type_name.clone()));
        }
        if let Some(mutation) = &schema.mutation_type_name {
            if schema.object_definition(mutation).is_none() {
                return Err(SchemaError::MissingMutationRoot(mutation.clone()));
            }
        }

        Ok(schema)
    }
}

fn convert_fields(
    type_name: &str,
    fields: &[async_graphql_parser::Positioned<ast::FieldDefinition>],
    resolvers: &mut HashMap<(String, String), BoxResolver>,
) -> IndexMap<String, FieldDefinition> {
    fields
        .iter()
        .map(|field| {
            let field = &field.node;
            let name = field.name.node.to_string();
            let resolver = resolvers.remove(&(type_name.to_string(), name.clone()));
            (
                name.clone(),
                FieldDefinition {
                    ty: convert_type_ref(&field.ty.node),
                    arguments: field
                        .arguments
                        .iter()
                        .map(|argument| {
                            let argument = &argument.node;
                            ArgumentDefinition {
                                name: argument.name.node.to_string(),
                                ty: convert_type_ref(&argument.ty.node),
                                default_value: argument
                                    .default_value
                                    .as_ref()
                                    .and_then(|value| value.node.clone().into_json().ok()),
                            }
                        })
                        .collect(),
                    resolver,
                    name,
                },
            )
        })
        .collect()
}

fn convert_type_ref(ty: &ast::Type) -> TypeRecord {
    match &ty.base {
        ast::BaseType::Named(name) => TypeRecord {
            definition_name: name.to_string(),
            wrapping: if ty.nullable {
                Wrapping::nullable()
            } else {
                Wrapping::required()
            },
        },
        ast::BaseType::List(inner) => {
            let mut record = convert_type_ref(inner);
            record.wrapping = if ty.nullable {
                record.wrapping.wrap_list()
            } else {
                record.wrapping.wrap_list_non_null()
            };
            record
        }
    }
}

fn builtin_scalar(name: &str) -> Option<BuiltinScalar> {
    match name {
        "String" => Some(BuiltinScalar::String),
        "Int" => Some(BuiltinScalar::Int),
        "Float" => Some(BuiltinScalar::Float),
        "Boolean" => Some(BuiltinScalar::Boolean),
        "ID" => Some(BuiltinScalar::Id),
        _ => None,
    }
}

fn root_types(document: &ast::ServiceDocument) -> (String, Option<String>) {
    let mut query_name = "Query".to_string();
    let mut mutation_name = None;
    let mut found_schema_definition = false;
    let mut mutation_present = false;

    for definition in &document.definitions {
        match definition {
            ast::TypeSystemDefinition::Schema(schema) => {
                found_schema_definition = true;
                if let Some(query) = &schema.node.query {
                    query_name = query.node.to_string();
                }
                if let Some(mutation) = &schema.node.mutation {
                    mutation_name = Some(mutation.node.to_string());
                }
            }
            ast::TypeSystemDefinition::Type(definition) if definition.node.name.node.as_str() == "Mutation" => {
                mutation_present = true;
            }
            _ => {}
        }
    }
    if !found_schema_definition && mutation_present {
        mutation_name = Some("Mutation".to_string());
    }

    (query_name, mutation_name)
}

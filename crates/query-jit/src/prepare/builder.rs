use std::collections::HashMap;

use async_graphql_parser::{
    types::{Field, FragmentDefinition, Selection},
    Positioned,
};
use async_graphql_value::Name;
use indexmap::IndexMap;

use crate::{
    operation::ResponseKeys,
    schema::{ObjectDefinition, ScalarDefinition, Schema, TypeDefinition},
    CompileOptions,
};

use super::{
    ArgumentsShape, ConcreteShapeRecord, ConcreteShapeId, FieldShapeRecord, LeafShape, PolymorphicShapeRecord,
    PrepareError, ResolverShapeRecord, Shape, Shapes,
};

pub(super) struct ShapesBuilder<'a> {
    pub schema: &'a Schema,
    pub fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    pub response_keys: ResponseKeys,
    pub shapes: Shapes,
    pub disable_leaf_serialization: bool,
    spread_stack: Vec<&'a str>,
}

impl<'a> ShapesBuilder<'a> {
    pub fn new(
        schema: &'a Schema,
        fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
        options: &CompileOptions,
    ) -> Self {
        ShapesBuilder {
            schema,
            fragments,
            response_keys: ResponseKeys::default(),
            shapes: Shapes::default(),
            disable_leaf_serialization: options.disable_leaf_serialization,
            spread_stack: Vec::new(),
        }
    }

    /// Compiles one object shape: CollectFields then MergeSelectionSets over
    /// the selections, honoring fragment type conditions against `object`.
    /// At the root every field becomes a deferred call site, resolver or not.
    pub fn build_concrete(
        &mut self,
        object: &'a ObjectDefinition,
        selections: &[&'a Positioned<Selection>],
        root_level: bool,
    ) -> Result<ConcreteShapeId, PrepareError> {
        let mut grouped: IndexMap<&'a str, Vec<&'a Positioned<Field>>> = IndexMap::new();
        self.collect_fields(&mut grouped, selections, object)?;

        let mut field_ids = Vec::with_capacity(grouped.len());
        for (response_key, nodes) in grouped {
            let first = nodes[0];
            let field_name = first.node.name.node.as_str();
            let key = self.response_keys.get_or_intern(response_key);
            let locations = nodes.iter().filter_map(|node| node.pos.try_into().ok()).collect();

            if field_name == "__typename" {
                field_ids.push(self.shapes.push_field(FieldShapeRecord {
                    key,
                    field_name: field_name.into(),
                    parent_type_name: object.name.as_str().into(),
                    locations,
                    wrapping: crate::schema::Wrapping::required(),
                    shape: Shape::Leaf(LeafShape::Typename),
                    resolver: None,
                }));
                continue;
            }

            // Unknown fields are silently skipped: validation is presumed to
            // have run already, this keeps historic behavior for those who
            // skip it.
            let Some(field_definition) = object.fields.get(field_name) else {
                continue;
            };

            let merged: Vec<&'a Positioned<Selection>> = nodes
                .iter()
                .flat_map(|node| node.node.selection_set.node.items.iter())
                .collect();
            let shape = self.build_output_shape(&field_definition.ty.definition_name, &merged)?;

            let resolver = if field_definition.resolver.is_some() || root_level {
                Some(self.shapes.push_resolver(ResolverShapeRecord {
                    resolver: field_definition.resolver.clone(),
                    field_name: field_name.into(),
                    parent_type_name: object.name.as_str().into(),
                    return_type: field_definition.ty.clone(),
                    arguments: ArgumentsShape::compile(&first.node.arguments, &field_definition.arguments),
                    field_nodes: nodes.iter().map(|node| (*node).clone()).collect(),
                }))
            } else {
                None
            };

            field_ids.push(self.shapes.push_field(FieldShapeRecord {
                key,
                field_name: field_name.into(),
                parent_type_name: object.name.as_str().into(),
                locations,
                wrapping: field_definition.ty.wrapping.clone(),
                shape,
                resolver,
            }));
        }

        Ok(self.shapes.push_concrete(ConcreteShapeRecord {
            type_name: object.name.as_str().into(),
            fields: field_ids,
        }))
    }

    fn build_output_shape(
        &mut self,
        type_name: &str,
        selections: &[&'a Positioned<Selection>],
    ) -> Result<Shape, PrepareError> {
        let schema = self.schema;
        let definition = schema
            .type_definition(type_name)
            .ok_or_else(|| PrepareError::UnknownType(type_name.to_string()))?;

        Ok(match definition {
            TypeDefinition::Scalar(scalar) => Shape::Leaf(self.bind_scalar(scalar)),
            TypeDefinition::Enum(r#enum) => Shape::Leaf(if self.disable_leaf_serialization {
                LeafShape::Passthrough
            } else {
                LeafShape::Enum {
                    name: r#enum.name.as_str().into(),
                    values: r#enum.values.clone(),
                }
            }),
            TypeDefinition::Object(_) => {
                let object = schema.object_definition(type_name).expect("just matched");
                Shape::Concrete(self.build_concrete(object, selections, false)?)
            }
            TypeDefinition::Interface(_) | TypeDefinition::Union(_) => {
                let possible_types: Vec<&'a ObjectDefinition> = definition
                    .possible_types()
                    .expect("interface or union")
                    .iter()
                    .map(|name| {
                        schema
                            .object_definition(name)
                            .ok_or_else(|| PrepareError::UnknownType(name.to_string()))
                    })
                    .collect::<Result<_, _>>()?;

                // Each branch is compiled independently so resolver sites
                // below one branch stay isolated from the others.
                let mut possibilities = Vec::with_capacity(possible_types.len());
                for object in possible_types {
                    let branch = self.build_concrete(object, selections, false)?;
                    possibilities.push((object.name.as_str().into(), branch));
                }
                Shape::Polymorphic(self.shapes.push_polymorphic(PolymorphicShapeRecord {
                    abstract_type_name: type_name.into(),
                    possibilities,
                }))
            }
        })
    }

    fn bind_scalar(&self, scalar: &ScalarDefinition) -> LeafShape {
        use crate::schema::BuiltinScalar;
        if self.disable_leaf_serialization && scalar.builtin.is_some() {
            return LeafShape::Passthrough;
        }
        match scalar.builtin {
            Some(BuiltinScalar::String) => LeafShape::String,
            Some(BuiltinScalar::Int) => LeafShape::Int,
            Some(BuiltinScalar::Float) => LeafShape::Float,
            Some(BuiltinScalar::Boolean) => LeafShape::Boolean,
            Some(BuiltinScalar::Id) => LeafShape::Id,
            // Custom scalar serializers run regardless of
            // disable_leaf_serialization.
            None => match &scalar.serializer {
                Some(serializer) => LeafShape::Custom {
                    name: scalar.name.as_str().into(),
                    serializer: serializer.clone(),
                },
                None => LeafShape::Passthrough,
            },
        }
    }

    /// CollectFields from the GraphQL spec: fragment spreads and inline
    /// fragments expand in place, same-response-key fields merge into one
    /// entry whose nodes keep source order.
    fn collect_fields(
        &mut self,
        grouped: &mut IndexMap<&'a str, Vec<&'a Positioned<Field>>>,
        selections: &[&'a Positioned<Selection>],
        object: &'a ObjectDefinition,
    ) -> Result<(), PrepareError> {
        for selection in selections {
            match &selection.node {
                Selection::Field(field) => {
                    grouped
                        .entry(field.node.response_key().node.as_str())
                        .or_default()
                        .push(field);
                }
                Selection::InlineFragment(fragment) => {
                    if let Some(condition) = &fragment.node.type_condition {
                        if !self
                            .schema
                            .type_condition_applies(condition.node.on.node.as_str(), object)
                        {
                            continue;
                        }
                    }
                    let nested: Vec<_> = fragment.node.selection_set.node.items.iter().collect();
                    self.collect_fields(grouped, &nested, object)?;
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    let fragment = self
                        .fragments
                        .get(name)
                        .ok_or_else(|| PrepareError::UnknownFragment(name.to_string()))?;
                    if self.spread_stack.contains(&name) {
                        return Err(PrepareError::FragmentCycle(name.to_string()));
                    }
                    if !self
                        .schema
                        .type_condition_applies(fragment.node.type_condition.node.on.node.as_str(), object)
                    {
                        continue;
                    }
                    self.spread_stack.push(name);
                    let nested: Vec<_> = fragment.node.selection_set.node.items.iter().collect();
                    self.collect_fields(grouped, &nested, object)?;
                    self.spread_stack.pop();
                }
            }
        }
        Ok(())
    }
}

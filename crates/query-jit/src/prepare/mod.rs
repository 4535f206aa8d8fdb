mod arguments;
mod builder;
mod shape;
mod view;

use std::{collections::HashMap, sync::Arc};

use async_graphql_parser::{types::FragmentDefinition, Positioned};
use async_graphql_value::Name;

pub(crate) use arguments::ArgumentsShape;
pub(crate) use shape::*;
pub use view::{FieldShapeKind, FieldShapeView, ShapeView};

use builder::ShapesBuilder;

use crate::{
    operation::{OperationType, ParsedOperation, ResponseKeys, VariableDefinitionRecord},
    schema::Schema,
    CompileOptions, ErrorCode, GraphqlError,
};

#[derive(thiserror::Error, Debug)]
pub(crate) enum PrepareError {
    #[error("Unknown fragment named '{0}'.")]
    UnknownFragment(String),
    #[error("Fragment cycle detected through '{0}'.")]
    FragmentCycle(String),
    #[error("Schema has no type named '{0}'.")]
    UnknownType(String),
    #[error("Schema is not configured for {0} operations.")]
    UndefinedRoot(OperationType),
}

impl From<PrepareError> for GraphqlError {
    fn from(err: PrepareError) -> Self {
        GraphqlError::new(err.to_string(), ErrorCode::OperationValidationError)
    }
}

/// The compiled form of one operation: a shape arena plus everything needed
/// to run it. Immutable once built, shareable across concurrent executions.
pub(crate) struct Plan {
    pub schema: Arc<Schema>,
    pub operation_type: OperationType,
    pub operation_name: Option<String>,
    pub response_keys: Arc<ResponseKeys>,
    pub shapes: Shapes,
    pub root_shape: ConcreteShapeId,
    pub variable_definitions: Vec<VariableDefinitionRecord>,
    /// The document's fragments by name, exposed through resolve-info.
    pub fragments: HashMap<Name, Positioned<FragmentDefinition>>,
}

pub(crate) fn build_plan(
    schema: &Arc<Schema>,
    operation: ParsedOperation,
    options: &CompileOptions,
) -> Result<Plan, PrepareError> {
    let root_name = schema
        .root_object_name(operation.ty)
        .ok_or(PrepareError::UndefinedRoot(operation.ty))?;
    let root_object = schema
        .object_definition(root_name)
        .ok_or_else(|| PrepareError::UnknownType(root_name.to_string()))?;

    let mut builder = ShapesBuilder::new(schema, &operation.fragments, options);
    let selections: Vec<_> = operation.definition.selection_set.node.items.iter().collect();
    let root_shape = builder.build_concrete(root_object, &selections, true)?;

    Ok(Plan {
        schema: schema.clone(),
        operation_type: operation.ty,
        operation_name: operation.name,
        response_keys: Arc::new(builder.response_keys),
        shapes: builder.shapes,
        root_shape,
        variable_definitions: operation
            .definition
            .variable_definitions
            .iter()
            .map(VariableDefinitionRecord::from_ast)
            .collect(),
        fragments: operation.fragments,
    })
}

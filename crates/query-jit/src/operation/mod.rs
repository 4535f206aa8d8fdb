mod location;
mod response_keys;
mod variables;

use std::collections::HashMap;

use async_graphql_parser::{
    types::{DocumentOperations, ExecutableDocument, FragmentDefinition, OperationDefinition},
    Positioned,
};
use async_graphql_value::Name;

pub use location::Location;
pub use response_keys::ResponseKey;
pub(crate) use response_keys::ResponseKeys;
pub use variables::Variables;
pub(crate) use variables::{bind_variables, VariableDefinitionRecord};

use crate::{ErrorCode, GraphqlError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Query,
    Mutation,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Query => f.write_str("query"),
            OperationType::Mutation => f.write_str("mutation"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum OperationError {
    #[error("Unknown operation named '{0}'.")]
    UnknownOperation(String),
    #[error("Missing operation name: the document defines more than one operation.")]
    AmbiguousOperation,
    #[error("The document does not contain any operations.")]
    NoOperation,
    #[error("Subscription operations are not supported.")]
    SubscriptionUnsupported,
}

impl From<OperationError> for GraphqlError {
    fn from(err: OperationError) -> Self {
        GraphqlError::new(err.to_string(), ErrorCode::OperationValidationError)
    }
}

/// The operation the compiler works on: a single definition picked out of the
/// document, plus the document's fragments by name.
#[derive(Debug)]
pub(crate) struct ParsedOperation {
    pub name: Option<String>,
    pub ty: OperationType,
    pub definition: OperationDefinition,
    pub fragments: HashMap<Name, Positioned<FragmentDefinition>>,
}

/// Picks the requested operation out of an already-parsed document. With an
/// explicit name the matching definition is required; without one the
/// document must contain exactly one operation.
pub(crate) fn select_operation(
    document: ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<ParsedOperation, OperationError> {
    let (name, operation) = if let Some(operation_name) = operation_name {
        match document.operations {
            DocumentOperations::Single(_) => None,
            DocumentOperations::Multiple(mut operations) => operations
                .remove(operation_name)
                .map(|operation| (Some(operation_name.to_string()), operation)),
        }
        .ok_or_else(|| OperationError::UnknownOperation(operation_name.to_string()))?
    } else {
        match document.operations {
            DocumentOperations::Single(operation) => (None, operation),
            DocumentOperations::Multiple(operations) => {
                let mut operations = operations.into_iter();
                let single = operations
                    .next()
                    .map(|(name, operation)| (Some(name.to_string()), operation))
                    .ok_or(OperationError::NoOperation)?;
                if operations.next().is_some() {
                    return Err(OperationError::AmbiguousOperation);
                }
                single
            }
        }
    };

    let ty = match operation.node.ty {
        async_graphql_parser::types::OperationType::Query => OperationType::Query,
        async_graphql_parser::types::OperationType::Mutation => OperationType::Mutation,
        async_graphql_parser::types::OperationType::Subscription => {
            return Err(OperationError::SubscriptionUnsupported)
        }
    };

    Ok(ParsedOperation {
        name,
        ty,
        definition: operation.node,
        fragments: document.fragments,
    })
}

//! A just-in-time compiler for GraphQL operations: compiles a parsed,
//! validated document against a schema into a reusable plan which executes
//! without re-walking the query AST, dispatching user resolvers and applying
//! all type-directed semantics (non-null propagation, list iteration,
//! abstract-type dispatch, leaf serialization) from precompiled shapes.

#![deny(clippy::future_not_send)]

mod error;
mod execution;
mod operation;
mod prepare;
mod resolver;
mod response;
mod schema;

use std::sync::Arc;

use async_graphql_parser::types::ExecutableDocument;

pub use error::{ErrorCode, ErrorPath, ErrorPathSegment, GraphqlError, GraphqlResult};
pub use operation::{Location, OperationType, Variables};
pub use prepare::{FieldShapeKind, FieldShapeView, ShapeView};
pub use resolver::{FieldValue, PathSegment, RequestContext, Resolve, Resolved, ResolveInfo, ResolverContext};
pub use response::Response;
pub use schema::{
    ArgumentDefinition, BuiltinScalar, EnumDefinition, FieldDefinition, InterfaceDefinition, IsTypeOf,
    LeafSerializer, ListWrapping, ObjectDefinition, ScalarDefinition, Schema, SchemaBuilder, SchemaError,
    TypeDefinition, TypeRecord, TypeResolver, UnionDefinition, Wrapping,
};

use operation::select_operation;
use prepare::{build_plan, Plan};

/// Builds the JSON serializer for one compiled query out of its plan
/// structure. Registering a factory is the opt-in for schema-directed
/// serialization; without one `stringify` is plain serde_json.
pub trait JsonSerializerFactory: Send + Sync {
    fn build(&self, shape: ShapeView<'_>) -> BoxJsonSerializer;
}

pub type BoxJsonSerializer = Box<dyn Fn(&Response) -> String + Send + Sync>;

#[derive(Default, Clone)]
pub struct CompileOptions {
    /// Pass built-in scalar and enum values through untouched: the caller
    /// guarantees they are already in wire form. Custom scalar serializers
    /// still run.
    pub disable_leaf_serialization: bool,
    /// The `customJSONSerializer` hook.
    pub json_serializer_factory: Option<Arc<dyn JsonSerializerFactory>>,
}

/// Compiles one operation of an already-parsed document into a reusable
/// executor. Compile-time failures (operation selection, unknown fragments)
/// come back as an error-only response rather than a panic.
pub fn compile(
    schema: &Arc<Schema>,
    document: ExecutableDocument,
    operation_name: Option<&str>,
    options: CompileOptions,
) -> Result<CompiledQuery, Response> {
    let operation = select_operation(document, operation_name)
        .map_err(|err| Response::request_error([GraphqlError::from(err)]))?;
    let plan = build_plan(schema, operation, &options)
        .map_err(|err| Response::request_error([GraphqlError::from(err)]))?;

    let stringify = options.json_serializer_factory.map(|factory| {
        factory.build(ShapeView {
            plan: &plan,
            id: plan.root_shape,
        })
    });

    Ok(CompiledQuery { plan, stringify })
}

/// Parses the document first, then [`compile`]s it.
pub fn compile_source(
    schema: &Arc<Schema>,
    source: &str,
    operation_name: Option<&str>,
    options: CompileOptions,
) -> Result<CompiledQuery, Response> {
    let document = async_graphql_parser::parse_query(source).map_err(|err| {
        Response::request_error([GraphqlError::new(err.to_string(), ErrorCode::OperationParsingError)
            .with_locations(err.positions().into_iter().filter_map(|pos| pos.try_into().ok()))])
    })?;
    compile(schema, document, operation_name, options)
}

/// A compiled operation. Immutable and cheap to share: concurrent `execute`
/// calls each own their response, the plan itself is never written to.
pub struct CompiledQuery {
    plan: Plan,
    stringify: Option<BoxJsonSerializer>,
}

impl std::fmt::Debug for CompiledQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledQuery").finish_non_exhaustive()
    }
}

impl CompiledQuery {
    pub fn operation_name(&self) -> Option<&str> {
        self.plan.operation_name.as_deref()
    }

    pub fn operation_type(&self) -> OperationType {
        self.plan.operation_type
    }

    /// Read-only view of the root object shape, the input an external
    /// serializer builder works from.
    pub fn shape(&self) -> ShapeView<'_> {
        ShapeView {
            plan: &self.plan,
            id: self.plan.root_shape,
        }
    }

    pub async fn execute(
        &self,
        root: impl Into<FieldValue>,
        ctx: RequestContext,
        variables: impl Into<Variables>,
    ) -> Response {
        self.plan.execute(root.into(), ctx, variables.into()).await
    }

    pub fn stringify(&self, response: &Response) -> String {
        match &self.stringify {
            Some(stringify) => stringify(response),
            None => serde_json::to_string(response).expect("response serialization is infallible"),
        }
    }
}

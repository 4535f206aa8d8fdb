mod value;

use std::{any::Any, collections::HashMap, future::Future, sync::Arc};

use async_graphql_parser::{
    types::{Field, FragmentDefinition},
    Positioned,
};
use async_graphql_value::Name;
use futures::future::BoxFuture;

pub use value::FieldValue;
pub(crate) use value::normalize;

use crate::{
    operation::{OperationType, Variables},
    schema::{Schema, TypeRecord},
    GraphqlError, GraphqlResult,
};

pub(crate) type BoxResolver = Arc<dyn Resolve>;

/// A field resolver. Implemented for any `Fn(ResolverContext<'_>) -> Resolved`
/// closure; implement the trait directly when the resolver carries state.
pub trait Resolve: Send + Sync + 'static {
    fn resolve(&self, ctx: ResolverContext<'_>) -> Resolved;
}

impl<F> Resolve for F
where
    F: Fn(ResolverContext<'_>) -> Resolved + Send + Sync + 'static,
{
    fn resolve(&self, ctx: ResolverContext<'_>) -> Resolved {
        self(ctx)
    }
}

/// What a resolver hands back: a value right away, or a future of one. An
/// error is a value too: `Resolved::error(..)` and a future resolving to
/// `Err` converge on the same structured error.
pub enum Resolved {
    Value(FieldValue),
    Future(BoxFuture<'static, GraphqlResult<FieldValue>>),
}

impl Resolved {
    pub fn value(value: impl Into<FieldValue>) -> Self {
        Resolved::Value(value.into())
    }

    pub fn error(error: impl Into<GraphqlError>) -> Self {
        Resolved::Value(FieldValue::Error(error.into()))
    }

    pub fn future(future: impl Future<Output = GraphqlResult<FieldValue>> + Send + 'static) -> Self {
        Resolved::Future(Box::pin(future))
    }
}

impl<T: Into<FieldValue>> From<T> for Resolved {
    fn from(value: T) -> Self {
        Resolved::Value(value.into())
    }
}

/// Opaque per-invocation context threaded through every resolver call.
#[derive(Clone, Default)]
pub struct RequestContext(Option<Arc<dyn Any + Send + Sync>>);

impl RequestContext {
    pub fn new(data: impl Any + Send + Sync) -> Self {
        RequestContext(Some(Arc::new(data)))
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.as_ref()?.downcast_ref()
    }
}

/// Everything a resolver receives for one call.
pub struct ResolverContext<'a> {
    pub parent: &'a FieldValue,
    pub args: &'a serde_json::Map<String, serde_json::Value>,
    pub ctx: &'a RequestContext,
    pub info: ResolveInfo<'a>,
}

impl ResolverContext<'_> {
    pub fn arg(&self, name: &str) -> Option<&serde_json::Value> {
        self.args.get(name)
    }
}

/// Descriptor of the call site, built fresh per call. The path reflects
/// runtime list indices.
pub struct ResolveInfo<'a> {
    pub field_name: &'a str,
    /// Every field node merged into this response entry, sub-selections
    /// included.
    pub field_nodes: &'a [Positioned<Field>],
    pub parent_type_name: &'a str,
    pub return_type: &'a TypeRecord,
    pub path: Vec<PathSegment<'a>>,
    pub schema: &'a Schema,
    pub fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    pub operation_type: OperationType,
    pub operation_name: Option<&'a str>,
    pub variables: &'a Variables,
    pub root: &'a FieldValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Field(&'a str),
    Index(usize),
}

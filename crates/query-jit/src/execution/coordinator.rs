use std::sync::Arc;

use futures::{future::BoxFuture, stream::FuturesUnordered, StreamExt};

use crate::{
    prepare::FieldShapeId,
    resolver::{normalize, FieldValue, PathSegment, Resolved, ResolveInfo, ResolverContext},
    response::{ResponseSlot, ResponseValueId},
    GraphqlError,
};

use super::{ExecutionContext, OperationExecution};

/// A deferred call site reached by the synchronous pass: its slot is
/// reserved, the resolver hasn't run yet.
pub(crate) struct ResolverTask {
    pub field_shape_id: FieldShapeId,
    pub slot: ResponseSlot,
    /// Response path up to and including this field.
    pub path: Vec<ResponseValueId>,
    pub parent: ValueSource,
}

/// A position inside a resolver output (or the root value): the shared value
/// plus the steps leading to it. Keeps parents addressable without cloning
/// value trees into every task.
pub(crate) struct ValueSource {
    pub value: Arc<FieldValue>,
    pub at: Vec<ValueStep>,
}

#[derive(Debug, Clone)]
pub(crate) enum ValueStep {
    Key(Box<str>),
    Index(usize),
}

impl ValueSource {
    pub fn resolved(&self) -> Option<&FieldValue> {
        let mut value = self.value.as_ref();
        for step in &self.at {
            value = match step {
                ValueStep::Key(key) => value.get(key)?,
                ValueStep::Index(index) => match value {
                    FieldValue::List(items) => items.get(*index)?,
                    _ => return None,
                },
            };
        }
        Some(value)
    }
}

pub(crate) struct CompletedResolver {
    pub field_shape_id: FieldShapeId,
    pub slot: ResponseSlot,
    pub path: Vec<ResponseValueId>,
    pub result: Result<ValueSource, GraphqlError>,
}

impl<'ctx> OperationExecution<'ctx> {
    /// The parallel runtime: one stream of in-flight resolver calls, drained
    /// until no work remains. Completions ingest synchronously and may push
    /// further tasks into the same stream. Returning from here is the single
    /// "all work done" signal.
    pub(crate) async fn drain(&mut self, seeds: Vec<ResolverTask>) {
        let ctx = self.ctx;
        let mut in_flight: FuturesUnordered<BoxFuture<'ctx, CompletedResolver>> =
            seeds.into_iter().map(|task| spawn_task(ctx, task)).collect();
        while let Some(completed) = in_flight.next().await {
            for task in self.ingest_completed(completed) {
                in_flight.push(spawn_task(ctx, task));
            }
        }
    }
}

/// Turns a reached call site into a future: resolver invocation, the
/// value-or-future bridge, and normalization of the result. All response
/// writes stay with the coordinator; the future owns no shared state.
fn spawn_task<'ctx>(ctx: ExecutionContext<'ctx>, task: ResolverTask) -> BoxFuture<'ctx, CompletedResolver> {
    let plan = ctx.plan;
    let field = &plan.shapes[task.field_shape_id];
    let site = &plan.shapes[field.resolver.expect("task spawned for a non-resolver field")];

    let ResolverTask {
        field_shape_id,
        slot,
        path,
        parent,
    } = task;

    let Some(resolver) = site.resolver.clone() else {
        // Forced deferral without a user resolver: read the property of the
        // same name off the parent value.
        return Box::pin(async move {
            let ValueSource { value, mut at } = parent;
            at.push(ValueStep::Key(site.field_name.clone()));
            CompletedResolver {
                field_shape_id,
                slot,
                path,
                result: Ok(ValueSource { value, at }),
            }
        });
    };

    let args = site.arguments.bind(ctx.variables);
    let info_path: Vec<PathSegment<'ctx>> = path
        .iter()
        .map(|segment| match segment {
            ResponseValueId::Field { key, .. } => PathSegment::Field(&plan.response_keys[*key]),
            ResponseValueId::Index { index, .. } => PathSegment::Index(*index as usize),
        })
        .collect();

    Box::pin(async move {
        let null = FieldValue::Null;
        let parent_value = parent.resolved().unwrap_or(&null);
        let info = ResolveInfo {
            field_name: &site.field_name,
            field_nodes: &site.field_nodes,
            parent_type_name: &site.parent_type_name,
            return_type: &site.return_type,
            path: info_path,
            schema: plan.schema.as_ref(),
            fragments: &plan.fragments,
            operation_type: plan.operation_type,
            operation_name: plan.operation_name.as_deref(),
            variables: ctx.variables,
            root: ctx.root.as_ref(),
        };

        let resolved = resolver.resolve(ResolverContext {
            parent: parent_value,
            args: &args,
            ctx: ctx.request_context,
            info,
        });
        let result = match resolved {
            Resolved::Value(value) => Ok(value),
            Resolved::Future(future) => future.await,
        };
        let result = match result {
            Ok(value) => match normalize(value).await {
                // A returned error converges with a thrown one.
                FieldValue::Error(error) => Err(error),
                value => Ok(ValueSource {
                    value: Arc::new(value),
                    at: Vec::new(),
                }),
            },
            Err(error) => Err(error),
        };

        CompletedResolver {
            field_shape_id,
            slot,
            path,
            result,
        }
    })
}

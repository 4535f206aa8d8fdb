mod coordinator;
mod ingest;

pub(crate) use coordinator::*;

use std::sync::Arc;

use crate::{
    operation::{bind_variables, OperationType, Variables},
    prepare::Plan,
    resolver::{normalize, FieldValue, RequestContext},
    response::{Response, ResponseBuilder, ResponseValue},
};

/// Per-invocation borrows threaded through task spawning. Copy, so futures
/// capture the references rather than the execution state.
#[derive(Clone, Copy)]
pub(crate) struct ExecutionContext<'ctx> {
    pub plan: &'ctx Plan,
    pub variables: &'ctx Variables,
    pub request_context: &'ctx RequestContext,
    pub root: &'ctx Arc<FieldValue>,
}

pub(crate) struct OperationExecution<'ctx> {
    pub ctx: ExecutionContext<'ctx>,
    pub response: ResponseBuilder,
}

impl Plan {
    pub(crate) async fn execute(&self, root: FieldValue, request_context: RequestContext, variables: Variables) -> Response {
        let variables = match bind_variables(&self.variable_definitions, variables) {
            Ok(variables) => variables,
            Err(errors) => return Response::request_error(errors),
        };
        let root = Arc::new(normalize(root).await);

        tracing::trace!("Starting execution...");
        let mut execution = OperationExecution {
            ctx: ExecutionContext {
                plan: self,
                variables: &variables,
                request_context: &request_context,
                root: &root,
            },
            response: ResponseBuilder::new(self.response_keys.clone()),
        };

        // Synchronous phase: assemble the response skeleton. Every top-level
        // field reserves a slot and queues a task; nothing resolves yet.
        let mut tasks = Vec::new();
        let mut path = Vec::new();
        let mut value_path = Vec::new();
        match execution.ingest_concrete(
            self.root_shape,
            root.as_ref(),
            true,
            &root,
            &mut value_path,
            &mut path,
            &mut tasks,
        ) {
            Ok(ResponseValue::Object { id }) => execution.response.data.set_root(id),
            _ => execution.response.data.clear_root(),
        }

        match self.operation_type {
            OperationType::Query => execution.drain(tasks).await,
            OperationType::Mutation => {
                // Top-level mutation fields are linearized: each subtree
                // drains completely before the next resolver is scheduled.
                for task in tasks {
                    execution.drain(vec![task]).await;
                }
            }
        }

        execution.response.build()
    }
}

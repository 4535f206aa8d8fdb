use std::sync::Arc;

use itertools::Itertools;

use crate::{
    prepare::{ConcreteShapeId, FieldShapeId, LeafShape, PolymorphicShapeId, Shape},
    resolver::FieldValue,
    response::{ResponseObject, ResponseObjectField, ResponseSlot, ResponseValue, ResponseValueId},
    schema::MutableWrapping,
    ErrorCode, GraphqlError,
};

use super::{CompletedResolver, OperationExecution, ResolverTask, ValueSource, ValueStep};

/// A failure at a non-null position: the null keeps moving up through return
/// values until a nullable position absorbs it. The error itself was already
/// recorded where the failure happened.
pub(crate) struct PropagateNull;

impl<'ctx> OperationExecution<'ctx> {
    /// Splices a completed resolver call into its reserved slot, compiling
    /// the resolver's subtree and collecting the next round of deferred
    /// sites. Past the synchronous phase, bubbling switches from return
    /// values to arena edits.
    pub(super) fn ingest_completed(&mut self, completed: CompletedResolver) -> Vec<ResolverTask> {
        let plan = self.ctx.plan;
        let field = &plan.shapes[completed.field_shape_id];
        let mut tasks = Vec::new();
        match completed.result {
            Err(error) => {
                self.response.push_error(
                    error
                        .with_locations(field.locations.iter().copied())
                        .with_path(completed.path.as_slice()),
                );
                if field.wrapping.is_required() {
                    self.response.propagate_null(&completed.path);
                }
            }
            Ok(source) => {
                let null = FieldValue::Null;
                let value = source.resolved().unwrap_or(&null);
                let mut path = completed.path;
                let mut value_path = source.at.clone();
                match self.ingest_field(
                    value,
                    completed.field_shape_id,
                    field.wrapping.to_mutable(),
                    &source.value,
                    &mut value_path,
                    &mut path,
                    &mut tasks,
                ) {
                    Ok(value) => self.response.set_slot(completed.slot, value),
                    Err(PropagateNull) => self.response.propagate_null(&path),
                }
            }
        }
        tasks
    }

    /// The type-directed part of execution: peels list wrappings, applies
    /// non-null policy, then hands off to the leaf / object / abstract shape.
    #[allow(clippy::too_many_arguments)]
    fn ingest_field(
        &mut self,
        value: &FieldValue,
        field_shape_id: FieldShapeId,
        mut wrapping: MutableWrapping,
        origin: &Arc<FieldValue>,
        value_path: &mut Vec<ValueStep>,
        path: &mut Vec<ResponseValueId>,
        tasks: &mut Vec<ResolverTask>,
    ) -> Result<ResponseValue, PropagateNull> {
        let plan = self.ctx.plan;
        let field = &plan.shapes[field_shape_id];
        let required = wrapping.is_required();

        match value {
            FieldValue::Error(error) => {
                self.response.push_error(
                    error
                        .clone()
                        .with_locations(field.locations.iter().copied())
                        .with_path(path.as_slice()),
                );
                self.null_or_propagate(required)
            }
            FieldValue::Deferred(_) => {
                tracing::error!("Unresolved deferred value reached the response writer");
                self.response
                    .push_error(GraphqlError::internal_server_error().with_path(path.as_slice()));
                self.null_or_propagate(required)
            }
            FieldValue::Null => {
                if required {
                    self.response.push_error(
                        GraphqlError::new(
                            format!(
                                "Cannot return null for non-nullable field {}.{}.",
                                field.parent_type_name, field.field_name
                            ),
                            ErrorCode::NonNullViolation,
                        )
                        .with_locations(field.locations.iter().copied())
                        .with_path(path.as_slice()),
                    );
                    Err(PropagateNull)
                } else {
                    Ok(ResponseValue::Null)
                }
            }
            value => {
                if wrapping.pop_outermost_list_wrapping().is_some() {
                    self.ingest_list(value, field_shape_id, wrapping, required, origin, value_path, path, tasks)
                } else {
                    match &field.shape {
                        Shape::Leaf(leaf) => {
                            let result = self.serialize_leaf(leaf, value);
                            self.ingest_leaf_result(result, field_shape_id, required, path)
                        }
                        Shape::Concrete(shape_id) => {
                            self.ingest_concrete(*shape_id, value, required, origin, value_path, path, tasks)
                        }
                        Shape::Polymorphic(shape_id) => {
                            self.ingest_polymorphic(*shape_id, value, required, origin, value_path, path, tasks)
                        }
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn ingest_list(
        &mut self,
        value: &FieldValue,
        field_shape_id: FieldShapeId,
        element_wrapping: MutableWrapping,
        required: bool,
        origin: &Arc<FieldValue>,
        value_path: &mut Vec<ValueStep>,
        path: &mut Vec<ResponseValueId>,
        tasks: &mut Vec<ResolverTask>,
    ) -> Result<ResponseValue, PropagateNull> {
        let plan = self.ctx.plan;
        let field = &plan.shapes[field_shape_id];

        let FieldValue::List(items) = value else {
            self.response.push_error(
                GraphqlError::new(
                    format!(
                        "Expected Iterable, but did not find one for field {}.{}.",
                        field.parent_type_name, field.field_name
                    ),
                    ErrorCode::ExpectedIterable,
                )
                .with_locations(field.locations.iter().copied())
                .with_path(path.as_slice()),
            );
            return self.null_or_propagate(required);
        };

        let list_id = self.response.data.reserve_list_id();
        let element_nullable = element_wrapping.is_nullable();
        let mut values = Vec::with_capacity(items.len());
        let mut failed = false;
        for (index, item) in items.iter().enumerate() {
            path.push(ResponseValueId::Index {
                list_id,
                index: index as u32,
                nullable: element_nullable,
            });
            value_path.push(ValueStep::Index(index));
            let result = self.ingest_field(
                item,
                field_shape_id,
                element_wrapping.clone(),
                origin,
                value_path,
                path,
                tasks,
            );
            value_path.pop();
            path.pop();
            match result {
                Ok(value) => values.push(value),
                Err(PropagateNull) => {
                    // Keep evaluating the remaining elements so their errors
                    // are reported too, the list itself is already lost.
                    values.push(ResponseValue::Null);
                    failed = true;
                }
            }
        }
        if failed {
            return self.null_or_propagate(required);
        }
        self.response.data.put_list(list_id, values);
        Ok(list_id.into())
    }

    /// Assembles one response object: inline fields compile in place,
    /// resolver fields reserve a null slot and queue a task pointing back at
    /// the parent value.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn ingest_concrete(
        &mut self,
        shape_id: ConcreteShapeId,
        value: &FieldValue,
        required: bool,
        origin: &Arc<FieldValue>,
        value_path: &mut Vec<ValueStep>,
        path: &mut Vec<ResponseValueId>,
        tasks: &mut Vec<ResolverTask>,
    ) -> Result<ResponseValue, PropagateNull> {
        let plan = self.ctx.plan;
        let shape = &plan.shapes[shape_id];
        let object_id = self.response.data.reserve_object_id();
        let null = FieldValue::Null;

        let mut fields = Vec::with_capacity(shape.fields.len());
        let mut failed = false;
        for &field_id in &shape.fields {
            let field = &plan.shapes[field_id];

            if matches!(field.shape, Shape::Leaf(LeafShape::Typename)) {
                fields.push(ResponseObjectField {
                    key: field.key,
                    value: shape.type_name.as_ref().into(),
                });
                continue;
            }

            if field.resolver.is_some() {
                let field_index = fields.len();
                fields.push(ResponseObjectField {
                    key: field.key,
                    value: ResponseValue::Null,
                });
                let mut task_path = path.clone();
                task_path.push(ResponseValueId::Field {
                    object_id,
                    key: field.key,
                    nullable: field.wrapping.is_nullable(),
                });
                tasks.push(ResolverTask {
                    field_shape_id: field_id,
                    slot: ResponseSlot { object_id, field_index },
                    path: task_path,
                    parent: ValueSource {
                        value: origin.clone(),
                        at: value_path.clone(),
                    },
                });
                continue;
            }

            // Plain field: the value is the property of the same name.
            // Anything but an object simply has no properties.
            let sub_value = value.get(&field.field_name).unwrap_or(&null);
            path.push(ResponseValueId::Field {
                object_id,
                key: field.key,
                nullable: field.wrapping.is_nullable(),
            });
            value_path.push(ValueStep::Key(field.field_name.clone()));
            let result = self.ingest_field(
                sub_value,
                field_id,
                field.wrapping.to_mutable(),
                origin,
                value_path,
                path,
                tasks,
            );
            value_path.pop();
            path.pop();
            match result {
                Ok(value) => fields.push(ResponseObjectField { key: field.key, value }),
                Err(PropagateNull) => {
                    fields.push(ResponseObjectField {
                        key: field.key,
                        value: ResponseValue::Null,
                    });
                    failed = true;
                }
            }
        }
        if failed {
            // The object is discarded; reached resolver slots below it write
            // into unreachable arena nodes.
            return self.null_or_propagate(required);
        }
        self.response.data.put_object(object_id, ResponseObject::new(fields));
        Ok(object_id.into())
    }

    /// Abstract-type dispatch: user type resolver, else `__typename`, else
    /// the possible types' `is_type_of` checks, then the precompiled branch.
    #[allow(clippy::too_many_arguments)]
    fn ingest_polymorphic(
        &mut self,
        shape_id: PolymorphicShapeId,
        value: &FieldValue,
        required: bool,
        origin: &Arc<FieldValue>,
        value_path: &mut Vec<ValueStep>,
        path: &mut Vec<ResponseValueId>,
        tasks: &mut Vec<ResolverTask>,
    ) -> Result<ResponseValue, PropagateNull> {
        let plan = self.ctx.plan;
        let shape = &plan.shapes[shape_id];

        let definition = plan.schema.type_definition(&shape.abstract_type_name);
        let type_name = match definition.and_then(|definition| definition.type_resolver()) {
            Some(resolver) => resolver(value, self.ctx.request_context),
            None => value.typename().map(str::to_string).or_else(|| {
                shape.possibilities.iter().find_map(|(name, _)| {
                    let object = plan.schema.object_definition(name)?;
                    let is_type_of = object.is_type_of.as_ref()?;
                    is_type_of(value).then(|| name.to_string())
                })
            }),
        };

        let Some(type_name) = type_name else {
            self.response.push_error(
                GraphqlError::new(
                    format!(
                        "Could not resolve the concrete type for abstract type '{}'.",
                        shape.abstract_type_name
                    ),
                    ErrorCode::TypeResolutionError,
                )
                .with_path(path.as_slice()),
            );
            return self.null_or_propagate(required);
        };

        let Some(branch) = shape.branch(&type_name) else {
            self.response.push_error(
                GraphqlError::new(
                    format!(
                        "Runtime object type '{}' is not a possible type for '{}', expected one of: {}.",
                        type_name,
                        shape.abstract_type_name,
                        shape.possibilities.iter().map(|(name, _)| name.as_ref()).join(", "),
                    ),
                    ErrorCode::TypeResolutionError,
                )
                .with_path(path.as_slice()),
            );
            return self.null_or_propagate(required);
        };

        self.ingest_concrete(branch, value, required, origin, value_path, path, tasks)
    }

    fn ingest_leaf_result(
        &mut self,
        result: Result<ResponseValue, String>,
        field_shape_id: FieldShapeId,
        required: bool,
        path: &[ResponseValueId],
    ) -> Result<ResponseValue, PropagateNull> {
        let field = &self.ctx.plan.shapes[field_shape_id];
        match result {
            Ok(value) => Ok(value),
            Err(message) => {
                self.response.push_error(
                    GraphqlError::new(message, ErrorCode::LeafSerializationError)
                        .with_locations(field.locations.iter().copied())
                        .with_path(path),
                );
                self.null_or_propagate(required)
            }
        }
    }

    fn null_or_propagate(&mut self, required: bool) -> Result<ResponseValue, PropagateNull> {
        if required {
            Err(PropagateNull)
        } else {
            Ok(ResponseValue::Null)
        }
    }

    fn serialize_leaf(&mut self, leaf: &LeafShape, value: &FieldValue) -> Result<ResponseValue, String> {
        match leaf {
            LeafShape::String => match value {
                FieldValue::String(value) => Ok(value.as_str().into()),
                FieldValue::Boolean(value) => Ok(value.to_string().into()),
                FieldValue::Int(value) => Ok(value.to_string().into()),
                FieldValue::Float(value) => Ok(value.to_string().into()),
                other => Err(format!("String cannot represent a {} value.", other.kind())),
            },
            LeafShape::Int => match value {
                FieldValue::Int(value) => i32::try_from(*value)
                    .map(ResponseValue::from)
                    .map_err(|_| format!("Int cannot represent non 32-bit signed integer value: {value}")),
                FieldValue::Float(value) if value.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(value) => {
                    Ok(ResponseValue::from(*value as i32))
                }
                FieldValue::Boolean(value) => Ok(ResponseValue::from(*value as i32)),
                FieldValue::String(value) => value
                    .parse::<i32>()
                    .map(ResponseValue::from)
                    .map_err(|_| format!("Int cannot represent non-integer value: \"{value}\"")),
                other => Err(format!("Int cannot represent non-integer value of kind {}.", other.kind())),
            },
            LeafShape::Float => match value {
                FieldValue::Int(value) => Ok(ResponseValue::from(*value as f64)),
                FieldValue::Float(value) if value.is_finite() => Ok(ResponseValue::from(*value)),
                FieldValue::Boolean(value) => Ok(ResponseValue::from(*value as i32 as f64)),
                FieldValue::String(value) => value
                    .parse::<f64>()
                    .map(ResponseValue::from)
                    .map_err(|_| format!("Float cannot represent non numeric value: \"{value}\"")),
                other => Err(format!("Float cannot represent non numeric value of kind {}.", other.kind())),
            },
            LeafShape::Boolean => match value {
                FieldValue::Boolean(value) => Ok(ResponseValue::from(*value)),
                FieldValue::Int(value) => Ok(ResponseValue::from(*value != 0)),
                other => Err(format!("Boolean cannot represent a {} value.", other.kind())),
            },
            LeafShape::Id => match value {
                FieldValue::String(value) => Ok(value.as_str().into()),
                FieldValue::Int(value) => Ok(value.to_string().into()),
                other => Err(format!("ID cannot represent a {} value.", other.kind())),
            },
            LeafShape::Enum { name, values } => match value {
                FieldValue::String(value) if values.contains(value.as_str()) => Ok(value.as_str().into()),
                FieldValue::String(value) => Err(format!("Enum '{name}' cannot represent value: \"{value}\"")),
                other => Err(format!("Enum '{name}' cannot represent a {} value.", other.kind())),
            },
            LeafShape::Typename => unreachable!("handled by the enclosing object shape"),
            LeafShape::Passthrough => self.passthrough_value(value),
            LeafShape::Custom { name, serializer } => match serializer(value) {
                Ok(json) => Ok(self.json_value(json)),
                Err(message) => Err(format!("Cannot serialize value for custom scalar '{name}': {message}")),
            },
        }
    }

    /// Structural conversion used when leaf serialization is disabled or a
    /// custom serializer already produced wire-shape JSON.
    fn passthrough_value(&mut self, value: &FieldValue) -> Result<ResponseValue, String> {
        Ok(match value {
            FieldValue::Null => ResponseValue::Null,
            FieldValue::Boolean(value) => ResponseValue::from(*value),
            FieldValue::Int(value) => ResponseValue::from(*value),
            FieldValue::Float(value) => ResponseValue::from(*value),
            FieldValue::String(value) => value.as_str().into(),
            FieldValue::List(items) => {
                let values = items
                    .iter()
                    .map(|item| self.passthrough_value(item))
                    .collect::<Result<Vec<_>, _>>()?;
                self.response.data.push_list(values).into()
            }
            FieldValue::Object(fields) => {
                let entries = fields
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), self.passthrough_value(value)?)))
                    .collect::<Result<Vec<_>, String>>()?;
                self.response.data.push_map(entries).into()
            }
            FieldValue::Error(_) | FieldValue::Deferred(_) => {
                return Err("Cannot serialize an unresolved value.".to_string())
            }
        })
    }

    fn json_value(&mut self, json: serde_json::Value) -> ResponseValue {
        match json {
            serde_json::Value::Null => ResponseValue::Null,
            serde_json::Value::Bool(value) => ResponseValue::from(value),
            serde_json::Value::Number(number) => {
                if let Some(value) = number.as_i64() {
                    ResponseValue::from(value)
                } else if let Some(value) = number.as_u64() {
                    ResponseValue::from(value)
                } else {
                    ResponseValue::from(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(value) => ResponseValue::from(value),
            serde_json::Value::Array(items) => {
                let values = items.into_iter().map(|item| self.json_value(item)).collect();
                self.response.data.push_list(values).into()
            }
            serde_json::Value::Object(fields) => {
                let entries = fields
                    .into_iter()
                    .map(|(key, value)| {
                        let value = self.json_value(value);
                        (key, value)
                    })
                    .collect();
                self.response.data.push_map(entries).into()
            }
        }
    }
}

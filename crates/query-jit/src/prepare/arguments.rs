use async_graphql_parser::Positioned;
use async_graphql_value::{Name, Value};

use crate::{operation::Variables, schema::ArgumentDefinition};

/// Compiled argument binding for one resolver site. Literal arguments are
/// evaluated once at compile time; variable-carrying arguments are re-bound
/// per invocation, and schema defaults fill whatever ends up absent.
#[derive(Default)]
pub(crate) struct ArgumentsShape {
    static_part: serde_json::Map<String, serde_json::Value>,
    dynamic: Vec<(String, Value)>,
    defaults: Vec<(String, serde_json::Value)>,
}

impl ArgumentsShape {
    pub fn compile(
        arguments: &[(Positioned<Name>, Positioned<Value>)],
        definitions: &[ArgumentDefinition],
    ) -> Self {
        let mut shape = ArgumentsShape::default();
        for (name, value) in arguments {
            let value = &value.node;
            if depends_on_variables(value) {
                shape.dynamic.push((name.node.to_string(), value.clone()));
            } else if let Some(json) = value.clone().into_const().and_then(|value| value.into_json().ok()) {
                shape.static_part.insert(name.node.to_string(), json);
            }
        }
        for definition in definitions {
            if let Some(default_value) = &definition.default_value {
                shape.defaults.push((definition.name.clone(), default_value.clone()));
            }
        }
        shape
    }

    /// Merges the static part with per-invocation variable lookups. A
    /// variable-valued argument is bound only when the variables map actually
    /// contains the key, so schema defaults still apply to absent variables.
    pub fn bind(&self, variables: &Variables) -> serde_json::Map<String, serde_json::Value> {
        let mut arguments = self.static_part.clone();
        for (name, value) in &self.dynamic {
            if let Some(json) = resolve_value(value, variables) {
                arguments.insert(name.clone(), json);
            }
        }
        for (name, default_value) in &self.defaults {
            if !arguments.contains_key(name) {
                arguments.insert(name.clone(), default_value.clone());
            }
        }
        arguments
    }
}

fn depends_on_variables(value: &Value) -> bool {
    match value {
        Value::Variable(_) => true,
        Value::List(items) => items.iter().any(depends_on_variables),
        Value::Object(fields) => fields.values().any(depends_on_variables),
        _ => false,
    }
}

/// `None` means the value vanishes: an unbound variable at argument position
/// drops the argument, at object-field position drops the field. At list
/// element position it degrades to null instead, matching standard list
/// coercion.
fn resolve_value(value: &Value, variables: &Variables) -> Option<serde_json::Value> {
    match value {
        Value::Variable(name) => variables.get(name.as_str()).cloned(),
        Value::Null => Some(serde_json::Value::Null),
        Value::Number(number) => Some(serde_json::Value::Number(number.clone())),
        Value::String(value) => Some(serde_json::Value::String(value.clone())),
        Value::Boolean(value) => Some(serde_json::Value::Bool(*value)),
        Value::Enum(name) => Some(serde_json::Value::String(name.to_string())),
        Value::List(items) => Some(serde_json::Value::Array(
            items
                .iter()
                .map(|item| resolve_value(item, variables).unwrap_or(serde_json::Value::Null))
                .collect(),
        )),
        Value::Object(fields) => Some(serde_json::Value::Object(
            fields
                .iter()
                .filter_map(|(name, value)| resolve_value(value, variables).map(|json| (name.to_string(), json)))
                .collect(),
        )),
        Value::Binary(_) => None,
    }
}

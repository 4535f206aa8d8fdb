use async_graphql_parser::{types::VariableDefinition, Positioned};

use super::Location;
use crate::{ErrorCode, GraphqlError};

/// Variable values for one invocation. Keys absent from the map stay absent:
/// argument binding distinguishes "not provided" from "provided as null".
#[derive(Debug, Default, Clone)]
pub struct Variables(serde_json::Map<String, serde_json::Value>);

impl Variables {
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Variables {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

/// Accepts `json!({...})` directly. Anything but an object is treated as no
/// variables at all.
impl From<serde_json::Value> for Variables {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// What the plan retains of a variable definition: enough to triage provided
/// / defaulted / missing without the AST.
#[derive(Debug, Clone)]
pub(crate) struct VariableDefinitionRecord {
    pub name: String,
    pub ty_display: String,
    pub is_required: bool,
    pub default_value: Option<serde_json::Value>,
    pub location: Option<Location>,
}

impl VariableDefinitionRecord {
    pub(crate) fn from_ast(definition: &Positioned<VariableDefinition>) -> Self {
        let node = &definition.node;
        VariableDefinitionRecord {
            name: node.name.node.to_string(),
            ty_display: node.var_type.node.to_string(),
            is_required: !node.var_type.node.nullable && node.default_value.is_none(),
            default_value: node
                .default_value
                .as_ref()
                .and_then(|value| value.node.clone().into_json().ok()),
            location: definition.pos.try_into().ok(),
        }
    }
}

/// The pre-execution variable pass. Values are taken as-is (coercion against
/// the schema's input types is the caller's concern), definition defaults
/// fill the gaps, and a missing non-null variable fails the whole request.
pub(crate) fn bind_variables(
    definitions: &[VariableDefinitionRecord],
    variables: Variables,
) -> Result<Variables, Vec<GraphqlError>> {
    let mut errors = Vec::new();
    let mut bound = serde_json::Map::with_capacity(definitions.len());

    for definition in definitions {
        match variables.get(&definition.name) {
            Some(value) => {
                bound.insert(definition.name.clone(), value.clone());
            }
            None => {
                if let Some(default_value) = &definition.default_value {
                    bound.insert(definition.name.clone(), default_value.clone());
                } else if definition.is_required {
                    let mut error = GraphqlError::new(
                        format!(
                            "Variable '${}' of required type '{}' was not provided.",
                            definition.name, definition.ty_display
                        ),
                        ErrorCode::VariableError,
                    );
                    if let Some(location) = definition.location {
                        error = error.with_location(location);
                    }
                    errors.push(error);
                }
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(Variables(bound))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definitions(query: &str) -> Vec<VariableDefinitionRecord> {
        let document = async_graphql_parser::parse_query(query).unwrap();
        let operation = match document.operations {
            async_graphql_parser::types::DocumentOperations::Single(operation) => operation,
            _ => unreachable!(),
        };
        operation
            .node
            .variable_definitions
            .iter()
            .map(VariableDefinitionRecord::from_ast)
            .collect()
    }

    #[test]
    fn provided_values_pass_through() {
        let defs = definitions("query($a: Int) { f }");
        let bound = bind_variables(&defs, Variables::from(json!({"a": 7}))).unwrap();
        assert_eq!(bound.get("a"), Some(&json!(7)));
    }

    #[test]
    fn definition_default_applies_when_absent() {
        let defs = definitions(r#"query($a: String = "fallback") { f }"#);
        let bound = bind_variables(&defs, Variables::default()).unwrap();
        assert_eq!(bound.get("a"), Some(&json!("fallback")));
    }

    #[test]
    fn absent_optional_variable_stays_absent() {
        let defs = definitions("query($a: String) { f }");
        let bound = bind_variables(&defs, Variables::default()).unwrap();
        assert!(!bound.contains_key("a"));
    }

    #[test]
    fn missing_required_variable_fails() {
        let defs = definitions("query($a: Int!) { f }");
        let errors = bind_variables(&defs, Variables::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::VariableError);
        assert!(errors[0].message.contains("'$a'"));
        assert!(errors[0].message.contains("Int!"));
    }

    #[test]
    fn undeclared_variables_are_dropped() {
        let defs = definitions("query($a: Int) { f }");
        let bound = bind_variables(&defs, Variables::from(json!({"a": 1, "b": 2}))).unwrap();
        assert!(bound.contains_key("a"));
        assert!(!bound.contains_key("b"));
    }
}

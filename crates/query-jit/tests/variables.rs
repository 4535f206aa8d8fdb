use std::sync::Arc;

use query_jit::{
    compile_source, CompileOptions, ErrorCode, FieldValue, RequestContext, Resolved, ResolverContext, Schema,
    Variables,
};
use serde_json::json;

fn greeter_schema() -> Arc<Schema> {
    Arc::new(
        Schema::builder(
            r#"
            type Query { greet(name: String = "anon"): String }
            "#,
        )
        .with_resolver("Query", "greet", |ctx: ResolverContext<'_>| {
            Resolved::value(
                ctx.arg("name")
                    .and_then(|name| name.as_str())
                    .unwrap_or("<missing>")
                    .to_string(),
            )
        })
        .finish()
        .unwrap(),
    )
}

#[tokio::test]
async fn absent_optional_variable_falls_back_to_the_argument_default() {
    let schema = greeter_schema();
    let compiled = compile_source(
        &schema,
        "query($n: String) { greet(name: $n) }",
        None,
        CompileOptions::default(),
    )
    .unwrap();

    let response = compiled
        .execute(FieldValue::Null, RequestContext::default(), Variables::default())
        .await;
    assert_eq!(serde_json::to_value(&response).unwrap(), json!({"data": {"greet": "anon"}}));

    let response = compiled
        .execute(FieldValue::Null, RequestContext::default(), json!({"n": "hi"}))
        .await;
    assert_eq!(serde_json::to_value(&response).unwrap(), json!({"data": {"greet": "hi"}}));
}

#[tokio::test]
async fn variable_definition_defaults_apply_before_argument_defaults() {
    let schema = greeter_schema();
    let compiled = compile_source(
        &schema,
        r#"query($n: String = "from-variable") { greet(name: $n) }"#,
        None,
        CompileOptions::default(),
    )
    .unwrap();

    let response = compiled
        .execute(FieldValue::Null, RequestContext::default(), Variables::default())
        .await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"data": {"greet": "from-variable"}})
    );
}

#[tokio::test]
async fn missing_required_variables_fail_before_execution() {
    let schema = greeter_schema();
    let compiled = compile_source(
        &schema,
        "query($n: String!) { greet(name: $n) }",
        None,
        CompileOptions::default(),
    )
    .unwrap();

    let response = compiled
        .execute(FieldValue::Null, RequestContext::default(), Variables::default())
        .await;
    assert!(!response.has_data());
    assert_eq!(response.errors().len(), 1);
    assert_eq!(response.errors()[0].code, ErrorCode::VariableError);

    // No `data` key at all, null or otherwise.
    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("data").is_none());
    assert!(json.get("errors").is_some());
}

#[tokio::test]
async fn static_and_variable_arguments_mix() {
    let schema = Arc::new(
        Schema::builder("type Query { add(a: Int, b: Int): Int }")
            .with_resolver("Query", "add", |ctx: ResolverContext<'_>| {
                let a = ctx.arg("a").and_then(|v| v.as_i64()).unwrap_or(0);
                let b = ctx.arg("b").and_then(|v| v.as_i64()).unwrap_or(0);
                Resolved::value(a + b)
            })
            .finish()
            .unwrap(),
    );

    let compiled = compile_source(
        &schema,
        "query($b: Int) { add(a: 40, b: $b) }",
        None,
        CompileOptions::default(),
    )
    .unwrap();
    let response = compiled
        .execute(FieldValue::Null, RequestContext::default(), json!({"b": 2}))
        .await;
    assert_eq!(serde_json::to_value(&response).unwrap(), json!({"data": {"add": 42}}));
}

#[tokio::test]
async fn variables_nested_inside_input_objects() {
    let schema = Arc::new(
        Schema::builder("type Query { find(filter: Filter): String } input Filter { name: String, limit: Int }")
            .with_resolver("Query", "find", |ctx: ResolverContext<'_>| {
                Resolved::value(ctx.arg("filter").map(|v| v.to_string()).unwrap_or_default())
            })
            .finish()
            .unwrap(),
    );

    let compiled = compile_source(
        &schema,
        "query($name: String) { find(filter: { name: $name, limit: 3 }) }",
        None,
        CompileOptions::default(),
    )
    .unwrap();
    let response = compiled
        .execute(FieldValue::Null, RequestContext::default(), json!({"name": "ada"}))
        .await;
    let json = serde_json::to_value(&response).unwrap();
    let reflected: serde_json::Value = json["data"]["find"].as_str().unwrap().parse::<serde_json::Value>().unwrap();
    assert_eq!(reflected, json!({"limit": 3, "name": "ada"}));
}

#[tokio::test]
async fn operation_selection_errors() {
    let schema = greeter_schema();

    let err = compile_source(&schema, "query A { greet } query B { greet }", None, CompileOptions::default())
        .unwrap_err();
    assert!(err.errors()[0].message.contains("more than one operation"));

    let err = compile_source(&schema, "query A { greet }", Some("C"), CompileOptions::default()).unwrap_err();
    assert!(err.errors()[0].message.contains("Unknown operation"));

    let compiled = compile_source(
        &schema,
        "query A { greet } query B { x: greet }",
        Some("B"),
        CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(compiled.operation_name(), Some("B"));
}

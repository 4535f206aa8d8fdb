use std::sync::Arc;

use query_jit::{
    compile_source, CompileOptions, ErrorCode, FieldValue, GraphqlError, RequestContext, Resolved, ResolverContext,
    Schema, Variables,
};
use serde_json::json;

async fn run(schema: &Arc<Schema>, query: &str) -> query_jit::Response {
    let compiled = compile_source(schema, query, None, CompileOptions::default()).unwrap();
    compiled
        .execute(FieldValue::Null, RequestContext::default(), Variables::default())
        .await
}

#[tokio::test]
async fn non_null_violations_bubble_to_the_root() {
    let schema = Arc::new(
        Schema::builder(
            r#"
            type Query { a: A! }
            type A { b: String! }
            "#,
        )
        .with_resolver("Query", "a", |_: ResolverContext<'_>| {
            Resolved::value(FieldValue::from(json!({})))
        })
        .with_resolver("A", "b", |_: ResolverContext<'_>| Resolved::value(FieldValue::Null))
        .finish()
        .unwrap(),
    );

    let response = run(&schema, "{ a { b } }").await;
    insta::assert_json_snapshot!(response, @r#"
    {
      "data": null,
      "errors": [
        {
          "message": "Cannot return null for non-nullable field A.b.",
          "locations": [
            {
              "line": 1,
              "column": 7
            }
          ],
          "path": [
            "a",
            "b"
          ],
          "extensions": {
            "code": "NON_NULL_VIOLATION"
          }
        }
      ]
    }
    "#);
}

#[tokio::test]
async fn nulls_stop_at_the_nearest_nullable_ancestor() {
    let schema = Arc::new(
        Schema::builder(
            r#"
            type Query { outer: Outer }
            type Outer { inner: Inner! }
            type Inner { leaf: String! }
            "#,
        )
        .with_resolver("Query", "outer", |_: ResolverContext<'_>| {
            Resolved::value(FieldValue::from(json!({"inner": {"leaf": null}})))
        })
        .finish()
        .unwrap(),
    );

    let response = run(&schema, "{ outer { inner { leaf } } }").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["data"], json!({"outer": null}));
    assert_eq!(json["errors"][0]["path"], json!(["outer", "inner", "leaf"]));
}

#[tokio::test]
async fn list_element_errors_stay_in_band() {
    let schema = Arc::new(
        Schema::builder("type Query { xs: [Int] }")
            .with_resolver("Query", "xs", |_: ResolverContext<'_>| {
                Resolved::value(FieldValue::List(vec![
                    FieldValue::Int(1),
                    FieldValue::Error(GraphqlError::new("boom", ErrorCode::FieldError)),
                    FieldValue::Int(3),
                ]))
            })
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ xs }").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["data"], json!({"xs": [1, null, 3]}));
    assert_eq!(json["errors"][0]["path"], json!(["xs", 1]));
    assert!(json["errors"][0]["message"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn rejected_deferred_elements_match_thrown_errors() {
    let schema = Arc::new(
        Schema::builder("type Query { xs: [Int] }")
            .with_resolver("Query", "xs", |_: ResolverContext<'_>| {
                Resolved::value(FieldValue::List(vec![
                    FieldValue::Int(1),
                    FieldValue::deferred(async { Err(GraphqlError::new("late boom", ErrorCode::FieldError)) }),
                ]))
            })
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ xs }").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["data"], json!({"xs": [1, null]}));
    assert_eq!(json["errors"][0]["path"], json!(["xs", 1]));
}

#[tokio::test]
async fn required_list_elements_null_the_list() {
    let schema = Arc::new(
        Schema::builder("type Query { ys: [Int!] }")
            .with_resolver("Query", "ys", |_: ResolverContext<'_>| {
                Resolved::value(FieldValue::List(vec![
                    FieldValue::Int(1),
                    FieldValue::Null,
                    FieldValue::Int(3),
                ]))
            })
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ ys }").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["data"], json!({"ys": null}));
    assert_eq!(json["errors"][0]["path"], json!(["ys", 1]));
}

#[tokio::test]
async fn nested_lists_carry_indexed_paths() {
    let schema = Arc::new(
        Schema::builder("type Query { xss: [[Int]] }")
            .with_resolver("Query", "xss", |_: ResolverContext<'_>| {
                Resolved::value(FieldValue::List(vec![
                    FieldValue::List(vec![
                        FieldValue::Int(1),
                        FieldValue::Error(GraphqlError::new("deep", ErrorCode::FieldError)),
                    ]),
                    FieldValue::List(vec![FieldValue::Int(2)]),
                ]))
            })
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ xss }").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["data"], json!({"xss": [[1, null], [2]]}));
    assert_eq!(json["errors"][0]["path"], json!(["xss", 0, 1]));
}

#[tokio::test]
async fn non_iterable_where_a_list_is_expected() {
    let schema = Arc::new(
        Schema::builder("type Query { xs: [Int] }")
            .with_resolver("Query", "xs", |_: ResolverContext<'_>| Resolved::value(42))
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ xs }").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["data"], json!({"xs": null}));
    assert_eq!(json["errors"][0]["extensions"]["code"], json!("EXPECTED_ITERABLE"));
    assert!(json["errors"][0]["message"].as_str().unwrap().contains("Expected Iterable"));
}

#[tokio::test]
async fn strings_do_not_count_as_iterables() {
    let schema = Arc::new(
        Schema::builder("type Query { xs: [Int] }")
            .with_resolver("Query", "xs", |_: ResolverContext<'_>| Resolved::value("123"))
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ xs }").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["data"], json!({"xs": null}));
    assert_eq!(json["errors"][0]["extensions"]["code"], json!("EXPECTED_ITERABLE"));
}

#[tokio::test]
async fn resolver_errors_are_contained_on_nullable_fields() {
    let schema = Arc::new(
        Schema::builder("type Query { a: Int, b: Int }")
            .with_resolver("Query", "a", |_: ResolverContext<'_>| {
                Resolved::error(GraphqlError::new("a failed", ErrorCode::FieldError))
            })
            .with_resolver("Query", "b", |_: ResolverContext<'_>| Resolved::value(2))
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ a b }").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["data"], json!({"a": null, "b": 2}));
    assert_eq!(json["errors"][0]["path"], json!(["a"]));
    assert_eq!(json["errors"][0]["extensions"]["code"], json!("FIELD_ERROR"));
}

#[tokio::test]
async fn rejected_futures_converge_with_returned_errors() {
    let schema = Arc::new(
        Schema::builder("type Query { a: Int }")
            .with_resolver("Query", "a", |_: ResolverContext<'_>| {
                Resolved::future(async { Err(GraphqlError::new("async failure", ErrorCode::FieldError)) })
            })
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ a }").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["data"], json!({"a": null}));
    assert!(json["errors"][0]["message"].as_str().unwrap().contains("async failure"));
}

#[tokio::test]
async fn leaf_serialization_failures_null_the_field() {
    let schema = Arc::new(
        Schema::builder("type Query { n: Int }")
            .with_resolver("Query", "n", |_: ResolverContext<'_>| Resolved::value("not a number"))
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ n }").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["data"], json!({"n": null}));
    assert_eq!(
        json["errors"][0]["extensions"]["code"],
        json!("LEAF_SERIALIZATION_ERROR")
    );
}

#[tokio::test]
async fn errors_carry_source_locations() {
    let schema = Arc::new(
        Schema::builder("type Query { fails: Int }")
            .with_resolver("Query", "fails", |_: ResolverContext<'_>| {
                Resolved::error(GraphqlError::new("nope", ErrorCode::FieldError))
            })
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{\n  fails\n}").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["errors"][0]["locations"], json!([{"line": 2, "column": 3}]));
}

#[tokio::test]
async fn every_violation_reports_its_own_error() {
    let schema = Arc::new(
        Schema::builder("type Query { xs: [Int!] }")
            .with_resolver("Query", "xs", |_: ResolverContext<'_>| {
                Resolved::value(FieldValue::List(vec![
                    FieldValue::Null,
                    FieldValue::Int(2),
                    FieldValue::Null,
                ]))
            })
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ xs }").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["data"], json!({"xs": null}));
    assert_eq!(json["errors"].as_array().unwrap().len(), 2);
    assert_eq!(json["errors"][0]["path"], json!(["xs", 0]));
    assert_eq!(json["errors"][1]["path"], json!(["xs", 2]));
}

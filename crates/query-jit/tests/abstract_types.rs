use std::sync::Arc;

use query_jit::{
    compile_source, CompileOptions, FieldValue, RequestContext, Resolved, ResolverContext, Schema, Variables,
};
use serde_json::json;

async fn run(schema: &Arc<Schema>, query: &str) -> query_jit::Response {
    let compiled = compile_source(schema, query, None, CompileOptions::default()).unwrap();
    compiled
        .execute(FieldValue::Null, RequestContext::default(), Variables::default())
        .await
}

const PET_SDL: &str = r#"
    union Pet = Cat | Dog
    type Cat { meow: String }
    type Dog { bark: String }
    type Query { pet: Pet }
"#;

#[tokio::test]
async fn unions_dispatch_on_typename() {
    let schema = Arc::new(
        Schema::builder(PET_SDL)
            .with_resolver("Query", "pet", |_: ResolverContext<'_>| {
                Resolved::value(FieldValue::from(json!({
                    "__typename": "Dog",
                    "bark": "woof",
                    "meow": "ignored",
                })))
            })
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ pet { ... on Cat { meow } ... on Dog { bark } } }").await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"data": {"pet": {"bark": "woof"}}})
    );
}

#[tokio::test]
async fn user_type_resolvers_win_over_typename() {
    let schema = Arc::new(
        Schema::builder(PET_SDL)
            .with_resolver("Query", "pet", |_: ResolverContext<'_>| {
                Resolved::value(FieldValue::from(json!({"__typename": "Cat", "bark": "grr"})))
            })
            .with_type_resolver("Pet", |_value, _ctx| Some("Dog".to_string()))
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ pet { ... on Dog { bark } } }").await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"data": {"pet": {"bark": "grr"}}})
    );
}

#[tokio::test]
async fn is_type_of_is_the_last_resort() {
    let schema = Arc::new(
        Schema::builder(PET_SDL)
            .with_resolver("Query", "pet", |_: ResolverContext<'_>| {
                Resolved::value(FieldValue::from(json!({"meow": "prr"})))
            })
            .with_is_type_of("Cat", |value| value.get("meow").is_some())
            .with_is_type_of("Dog", |value| value.get("bark").is_some())
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ pet { ... on Cat { meow } } }").await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"data": {"pet": {"meow": "prr"}}})
    );
}

#[tokio::test]
async fn unresolvable_type_yields_an_error() {
    let schema = Arc::new(
        Schema::builder(PET_SDL)
            .with_resolver("Query", "pet", |_: ResolverContext<'_>| {
                Resolved::value(FieldValue::from(json!({"legs": 4})))
            })
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ pet { ... on Dog { bark } } }").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["data"], json!({"pet": null}));
    assert_eq!(json["errors"][0]["extensions"]["code"], json!("TYPE_RESOLUTION_ERROR"));
}

#[tokio::test]
async fn foreign_typename_is_not_a_possible_type() {
    let schema = Arc::new(
        Schema::builder(PET_SDL)
            .with_resolver("Query", "pet", |_: ResolverContext<'_>| {
                Resolved::value(FieldValue::from(json!({"__typename": "Fish"})))
            })
            .finish()
            .unwrap(),
    );

    let response = run(&schema, "{ pet { ... on Dog { bark } } }").await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["data"], json!({"pet": null}));
    let message = json["errors"][0]["message"].as_str().unwrap();
    assert!(message.contains("'Fish' is not a possible type for 'Pet'"));
    assert!(message.contains("Cat, Dog"));
}

#[tokio::test]
async fn interfaces_dispatch_like_unions() {
    let schema = Arc::new(
        Schema::builder(
            r#"
            interface Node { id: ID! }
            type User implements Node { id: ID!, name: String }
            type Post implements Node { id: ID!, title: String }
            type Query { node: Node }
            "#,
        )
        .with_resolver("Query", "node", |_: ResolverContext<'_>| {
            Resolved::value(FieldValue::from(json!({
                "__typename": "User",
                "id": "u1",
                "name": "Ada",
            })))
        })
        .finish()
        .unwrap(),
    );

    let response = run(&schema, "{ node { id ... on User { name } ... on Post { title } } }").await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"data": {"node": {"id": "u1", "name": "Ada"}}})
    );
}

#[tokio::test]
async fn typename_meta_field_everywhere() {
    let schema = Arc::new(
        Schema::builder(PET_SDL)
            .with_resolver("Query", "pet", |_: ResolverContext<'_>| {
                Resolved::value(FieldValue::from(json!({"__typename": "Cat", "meow": "hi"})))
            })
            .finish()
            .unwrap(),
    );

    let compiled = compile_source(
        &schema,
        "{ __typename pet { __typename ... on Cat { meow } } }",
        None,
        CompileOptions::default(),
    )
    .unwrap();
    let response = compiled
        .execute(FieldValue::Null, RequestContext::default(), Variables::default())
        .await;
    assert_eq!(
        compiled.stringify(&response),
        r#"{"data":{"__typename":"Query","pet":{"__typename":"Cat","meow":"hi"}}}"#
    );
}

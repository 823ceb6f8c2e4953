mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{app_state, provisioned_db, TestDb};
use edtechbackend::routes::create_app;

fn app(db: &TestDb, pairs: &[(&str, &str)]) -> Router {
    create_app(app_state(db, pairs)).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn graphql_post(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_environment() {
    let db = provisioned_db();
    let app = app(&db, &[("APP_ENV", "staging"), ("GRAPHQL_PATH", "/api/graphql")]);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "EdTech API is running!");
    assert_eq!(body["environment"], "staging");
    assert_eq!(body["graphqlEndpoint"], "/api/graphql");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_graphql_post_on_configured_path() {
    let db = provisioned_db();
    let app = app(&db, &[("GRAPHQL_PATH", "/api/graphql")]);

    let response = app
        .clone()
        .oneshot(graphql_post("/api/graphql", json!({ "query": "{ courses { title } }" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["courses"].as_array().unwrap().len(), 3);

    let response = app
        .oneshot(graphql_post("/graphql", json!({ "query": "{ courses { title } }" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_graphql_accepts_batched_operations() {
    let db = provisioned_db();
    let app = app(&db, &[]);

    let response = app
        .oneshot(graphql_post(
            "/graphql",
            json!([
                { "query": "{ courses { id } }" },
                { "query": "{ users { id } }" }
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["data"]["courses"].as_array().unwrap().len(), 3);
    assert_eq!(results[1]["data"]["users"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_graphql_post_without_content_type() {
    let db = provisioned_db();
    let app = app(&db, &[]);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .body(Body::from(json!({ "query": "{ users { name } }" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["users"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_graphql_errors_use_graphql_envelope() {
    let db = provisioned_db();
    let app = app(&db, &[]);

    let response = app
        .oneshot(graphql_post(
            "/graphql",
            json!({
                "query": "mutation($id: ID!) { updateCourse(id: $id, title: \"X\") { id } }",
                "variables": { "id": "nonexistent-id" }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_explorer_follows_playground_flag() {
    let db = provisioned_db();

    let response = app(&db, &[])
        .oneshot(Request::builder().uri("/graphql").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let html = hyper::body::to_bytes(response.into_body()).await.unwrap();
    assert!(String::from_utf8_lossy(&html).contains("GraphQL Playground"));

    let response = app(&db, &[("APP_ENV", "production")])
        .oneshot(Request::builder().uri("/graphql").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let db = provisioned_db();
    let app = app(&db, &[("CORS_ORIGIN", "https://courses.example.com")]);

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/graphql")
        .header(header::ORIGIN, "https://courses.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(preflight).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://courses.example.com");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn test_cors_can_be_disabled() {
    let db = provisioned_db();
    let app = app(&db, &[("ENABLE_CORS", "false")]);

    let request = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn test_invalid_cors_origin_is_rejected() {
    let db = provisioned_db();
    let state = app_state(&db, &[("CORS_ORIGIN", "bad\norigin")]);
    assert!(create_app(state).is_err());
}

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::Service;

// Helper to create test app
fn create_test_app() -> axum::Router {
    use query_adapter::{api, model::ResourceRegistry, query::QueryDefaults};
    use std::sync::Arc;

    let registry = ResourceRegistry::from_dataset(json!({
        "books": {
            "searchable_fields": ["title", "author"],
            "records": [
                {"id": 1, "title": "The Rust Book", "author": "Steve Klabnik", "price": 39.5, "status": "published", "createdAt": "2024-03-01"},
                {"id": 2, "title": "Dune", "author": "Frank Herbert", "price": 9.99, "status": "published", "createdAt": "2024-01-15"},
                {"id": 3, "title": "Rust in Action", "author": "Tim McNamara", "price": 45, "status": "draft", "createdAt": "2024-02-10"},
                {"id": 4, "title": "Neuromancer", "author": "William Gibson", "price": 12, "status": "published", "createdAt": "2023-12-01"},
                {"id": 5, "title": "Programming Rust", "author": "Jim Blandy", "price": 55, "status": "published", "createdAt": "2024-04-20"}
            ]
        },
        "authors": {
            "fields": ["id", "name", "createdAt"],
            "searchable_fields": ["name"],
            "records": [
                {"id": 1, "name": "Frank Herbert", "createdAt": "2024-01-01"}
            ]
        }
    }))
    .expect("Failed to build registry from test dataset");

    let state = Arc::new(api::handlers::AppStateInner {
        registry,
        query_defaults: QueryDefaults::default(),
        instance_id: "test-instance".to_string(),
    });

    api::routes::create_router(state)
}

// Helper to send request and parse JSON response
async fn send_json_request(app: &mut axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));

    (status, json)
}

fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_endpoint() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "query-adapter");
    assert_eq!(body["instance_id"], "test-instance");
    assert_eq!(body["resources"], 2);
}

#[tokio::test]
async fn test_resource_index() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let resources = body["data"].as_array().unwrap();
    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0]["name"], "authors");
    assert_eq!(resources[0]["fields"], json!(["id", "name", "createdAt"]));
    assert_eq!(resources[1]["name"], "books");
    assert_eq!(resources[1]["searchable_fields"], json!(["title", "author"]));
}

#[tokio::test]
async fn test_list_defaults() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/books").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "books retrieved successfully");
    assert_eq!(
        body["meta"],
        json!({"page": 1, "limit": 10, "total": 5, "totalPage": 1})
    );
    // Newest first by createdAt
    assert_eq!(ids(&body), vec![5, 1, 3, 2, 4]);
}

#[tokio::test]
async fn test_list_search_is_case_insensitive() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/books?searchTerm=RUST").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(ids(&body), vec![5, 1, 3]);
}

#[tokio::test]
async fn test_list_search_matches_any_searchable_field() {
    let mut app = create_test_app();
    let (status, body) =
        send_json_request(&mut app, "GET", "/api/books?searchTerm=frank%20herb").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![2]);
}

#[tokio::test]
async fn test_list_range_filter() {
    let mut app = create_test_app();
    let (status, body) =
        send_json_request(&mut app, "GET", "/api/books?price%5Bgte%5D=10&price%5Blte%5D=50").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(ids(&body), vec![1, 3, 4]);
}

#[tokio::test]
async fn test_list_equality_filter() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/books?status=draft").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(ids(&body), vec![3]);
}

#[tokio::test]
async fn test_list_invalid_filter_value() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/books?price%5Bgte%5D=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["error"]["message"],
        "The value field in the gte should be a number"
    );
    assert_eq!(body["error"]["details"]["operator"], "gte");
    assert!(body["error"]["request_id"].is_string());
}

#[tokio::test]
async fn test_list_unknown_operator_is_model_error() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/books?price%5Bbetween%5D=5").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "MODEL_ERROR");
}

#[tokio::test]
async fn test_list_sort() {
    let mut app = create_test_app();

    let (status, body) = send_json_request(&mut app, "GET", "/api/books?sort=price").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![2, 4, 1, 3, 5]);

    let (status, body) = send_json_request(&mut app, "GET", "/api/books?sort=-price").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![5, 3, 1, 4, 2]);
}

#[tokio::test]
async fn test_list_pagination() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/books?page=2&limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["meta"],
        json!({"page": 2, "limit": 2, "total": 5, "totalPage": 3})
    );
    assert_eq!(ids(&body), vec![3, 2]);
}

#[tokio::test]
async fn test_list_invalid_pagination_falls_back_to_defaults() {
    let mut app = create_test_app();
    let (status, body) =
        send_json_request(&mut app, "GET", "/api/books?page=zero&limit=-4").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["limit"], 10);
}

#[tokio::test]
async fn test_list_fields_strips_primary_key() {
    let mut app = create_test_app();
    let (status, body) =
        send_json_request(&mut app, "GET", "/api/books?fields=title,price&sort=price").await;

    assert_eq!(status, StatusCode::OK);
    let first = &body["data"][0];
    assert_eq!(first, &json!({"title": "Dune", "price": 9.99}));
}

#[tokio::test]
async fn test_list_fields_keeps_requested_primary_key() {
    let mut app = create_test_app();
    let (status, body) =
        send_json_request(&mut app, "GET", "/api/books?fields=id,title&sort=price").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0], json!({"id": 2, "title": "Dune"}));
}

#[tokio::test]
async fn test_list_exclude() {
    let mut app = create_test_app();
    let (status, body) =
        send_json_request(&mut app, "GET", "/api/books?exclude=author,status&sort=price").await;

    assert_eq!(status, StatusCode::OK);
    let first = body["data"][0].as_object().unwrap();
    assert_eq!(first["id"], 2);
    assert!(first.contains_key("title"));
    assert!(!first.contains_key("author"));
    assert!(!first.contains_key("status"));
}

#[tokio::test]
async fn test_list_blank_fields_strips_primary_key() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/books?fields=,").await;

    assert_eq!(status, StatusCode::OK);
    let records = body["data"].as_array().unwrap();
    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|r| r.get("id").is_none()));
    assert!(records.iter().all(|r| r.get("title").is_some()));
}

#[tokio::test]
async fn test_list_decodes_plus_and_encoded_keys() {
    let mut app = create_test_app();

    let (status, body) =
        send_json_request(&mut app, "GET", "/api/books?searchTerm=frank+herb").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![2]);

    let (status, body) = send_json_request(&mut app, "GET", "/api/books?%73tatus=draft").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![3]);
}

#[tokio::test]
async fn test_list_repeated_key_keeps_last_value() {
    let mut app = create_test_app();
    let (status, body) =
        send_json_request(&mut app, "GET", "/api/books?status=published&status=draft").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![3]);
}

#[tokio::test]
async fn test_list_unknown_resource() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/widgets").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let mut app = create_test_app();
    let _ = send_json_request(&mut app, "GET", "/api/books").await;

    let request = Request::builder()
        .method("GET")
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("model_calls_total"));
}

#[tokio::test]
async fn test_openapi_document() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/{resource}"].is_object());

    let names: Vec<&str> = body["paths"]["/api/{resource}"]["get"]["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert!(names.contains(&"resource"));
    assert!(names.contains(&"searchTerm"));
    assert!(names.contains(&"exclude"));
}

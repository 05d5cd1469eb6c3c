use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with, Config, Todo};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<String> {
    json_request(method, uri, Some(token), "")
}

async fn sign_in(app: &Router, username: &str) -> String {
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/register",
            None,
            &serde_json::json!({"username": username, "password": "pw"}).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/token")
                .header(
                    http::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(format!("username={username}&password=pw"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

async fn create(app: &Router, token: &str, title: &str) -> Todo {
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/todos",
            Some(token),
            &serde_json::json!({"title": title}).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

// --- health ---

#[tokio::test]
async fn health_reports_ok() {
    let resp = app()
        .oneshot(Request::builder().uri("/health").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

// --- accounts ---

#[tokio::test]
async fn register_twice_returns_400_detail() {
    let app = app();
    sign_in(&app, "alice").await;

    let resp = app
        .oneshot(json_request(
            "POST",
            "/register",
            None,
            r#"{"username":"alice","password":"other"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["detail"], "Username already registered");
}

#[tokio::test]
async fn token_with_wrong_password_returns_401() {
    let app = app();
    sign_in(&app, "alice").await;

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/token")
                .header(
                    http::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body("username=alice&password=nope".to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()[http::header::WWW_AUTHENTICATE], "Bearer");
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["detail"], "Incorrect username or password");
}

// --- bearer auth ---

#[tokio::test]
async fn todos_without_token_return_401() {
    let resp = app()
        .oneshot(Request::builder().uri("/todos").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn todos_with_forged_token_return_401() {
    let resp = app().oneshot(authed("GET", "/todos", "a.b.c")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn expired_token_returns_401() {
    let app = app_with(Config {
        token_ttl: chrono::Duration::minutes(-10),
        ..Default::default()
    });
    let token = sign_in(&app, "alice").await;

    let resp = app.oneshot(authed("GET", "/todos", &token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- crud ---

#[tokio::test]
async fn list_todos_empty() {
    let app = app();
    let token = sign_in(&app, "alice").await;

    let resp = app.oneshot(authed("GET", "/todos", &token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn create_todo_returns_201() {
    let app = app();
    let token = sign_in(&app, "alice").await;

    let todo = create(&app, &token, "Buy milk").await;
    assert_eq!(todo.title, "Buy milk");
    assert!(todo.description.is_none());
    assert!(!todo.completed);
    assert_eq!(todo.created_at, todo.updated_at);
}

#[tokio::test]
async fn create_todo_blank_title_returns_422_detail() {
    let app = app();
    let token = sign_in(&app, "alice").await;

    let resp = app
        .oneshot(json_request("POST", "/todos", Some(&token), r#"{"title":"  "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["detail"], "title must not be empty");
}

#[tokio::test]
async fn create_todo_malformed_json_returns_422() {
    let app = app();
    let token = sign_in(&app, "alice").await;

    let resp = app
        .oneshot(json_request("POST", "/todos", Some(&token), r#"{"not_title":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_todo_not_found() {
    let app = app();
    let token = sign_in(&app, "alice").await;

    let resp = app
        .oneshot(authed("GET", "/todos/missing-id", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["detail"], "Todo not found");
}

#[tokio::test]
async fn update_todo_applies_partial_patch() {
    let app = app();
    let token = sign_in(&app, "alice").await;
    let todo = create(&app, &token, "Buy milk").await;

    let resp = app
        .oneshot(json_request(
            "PUT",
            &format!("/todos/{}", todo.id),
            Some(&token),
            r#"{"description":"2 litres","completed":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Buy milk");
    assert_eq!(updated.description.as_deref(), Some("2 litres"));
    assert!(updated.completed);
    assert_eq!(updated.created_at, todo.created_at);
}

#[tokio::test]
async fn update_todo_not_found() {
    let app = app();
    let token = sign_in(&app, "alice").await;

    let resp = app
        .oneshot(json_request(
            "PUT",
            "/todos/missing-id",
            Some(&token),
            r#"{"completed":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_todo_returns_204_then_404() {
    let app = app();
    let token = sign_in(&app, "alice").await;
    let todo = create(&app, &token, "Buy milk").await;
    let uri = format!("/todos/{}", todo.id);

    let resp = app.clone().oneshot(authed("DELETE", &uri, &token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = app.oneshot(authed("DELETE", &uri, &token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn todos_are_scoped_to_their_owner() {
    let app = app();
    let alice = sign_in(&app, "alice").await;
    let bob = sign_in(&app, "bob").await;
    let todo = create(&app, &alice, "Alice's").await;

    let resp = app.clone().oneshot(authed("GET", "/todos", &bob)).await.unwrap();
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());

    let resp = app
        .clone()
        .oneshot(authed("GET", &format!("/todos/{}", todo.id), &bob))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.oneshot(authed("GET", "/todos", &alice)).await.unwrap();
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos, vec![todo]);
}

//! End-to-end tests driving the full router over the in-memory store.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use blog_store::{
    AppState,
    auth::{AuthConfig, issue_token},
    services::{blog_service::BlogService, keyspace::Keyspace, memory_store::MemoryObjectStore},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

fn test_state() -> AppState {
    let blog = BlogService::new(Arc::new(MemoryObjectStore::new()), Keyspace::new("blog"));
    let auth = AuthConfig {
        username: "admin".into(),
        password: "correct horse".into(),
        jwt_secret: SECRET.into(),
    };
    AppState::new(blog, auth)
}

fn test_app() -> Router {
    blog_store::app(test_state())
}

fn bearer() -> String {
    format!("Bearer {}", issue_token("admin", SECRET).unwrap())
}

fn admin(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn admin_empty(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer())
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

async fn read_file(app: &Router, path: &str) -> (StatusCode, Value) {
    send_json(app, get(&format!("/api/public/file?path={path}"))).await
}

async fn initialized_app() -> Router {
    let app = test_app();
    let (status, _) = send(&app, admin_empty(Method::PUT, "/api/admin/init")).await;
    assert_eq!(status, StatusCode::OK);
    app
}

fn article(uuid: &str, title: &str, content: &str) -> Value {
    json!({
        "uuid": uuid,
        "title": title,
        "created_time": 1700000000.0,
        "content": content,
        "updated_time": 1700000100.5,
    })
}

#[tokio::test]
async fn admin_routes_require_a_valid_bearer_token() {
    let app = initialized_app().await;
    let routes = [
        (Method::PUT, "/api/admin/avatar"),
        (Method::PUT, "/api/admin/site"),
        (Method::POST, "/api/admin/article"),
        (Method::PUT, "/api/admin/article"),
        (Method::DELETE, "/api/admin/article"),
        (Method::PUT, "/api/admin/article/stage"),
        (Method::POST, "/api/admin/attachment?filename=a.txt"),
        (Method::PUT, "/api/admin/attachment"),
        (Method::DELETE, "/api/admin/attachment"),
        (Method::PUT, "/api/admin/init"),
        (Method::PUT, "/api/admin/recover"),
        (Method::GET, "/api/admin/nope"),
        (Method::POST, "/api/admin/article/unknown/deeper"),
        (Method::GET, "/api/admin/avatar"),
    ];
    let forged = issue_token("admin", "some-other-secret").unwrap();
    let headers = [
        None,
        Some("Basic YWRtaW46cGFzcw==".to_string()),
        Some(format!("Bearer {forged}")),
        Some("Bearer ".to_string()),
    ];

    for (method, uri) in routes {
        for auth in &headers {
            let mut builder = Request::builder().method(method.clone()).uri(uri);
            if let Some(value) = auth {
                builder = builder.header(header::AUTHORIZATION, value);
            }
            let request = builder
                .body(Body::from(article("u1", "t", "c").to_string()))
                .unwrap();
            let (status, body) = send_json(&app, request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri} with {auth:?}");
            assert_eq!(body["status"], 401);
        }
    }

    // nothing was written by the rejected requests
    let (_, metadata) = read_file(&app, "metadata").await;
    assert_eq!(metadata["articles"], json!([]));
}

#[tokio::test]
async fn login_issues_a_usable_token() {
    let app = initialized_app().await;

    let login = |body: String| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/public/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    };

    let (status, _) = send_json(
        &app,
        login(json!({"username": "admin", "password": "wrong"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(&app, login("{not json".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // well-formed JSON that lacks usable credentials is a failed login
    for body in [
        json!({"username": "admin"}),
        json!({}),
        json!({"username": "admin", "password": 42}),
    ] {
        let (status, body) = send_json(&app, login(body.to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);
    }

    let (status, body) = send_json(
        &app,
        login(json!({"username": "admin", "password": "correct horse"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/admin/init")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn init_writes_default_indexes() {
    let app = initialized_app().await;

    let (status, metadata) = read_file(&app, "metadata").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        metadata,
        json!({
            "site": {
                "title": "My Blog",
                "description": "This is my blog.",
                "github": "",
                "email": "",
                "footer": "",
            },
            "articles": [],
        })
    );
    let (_, list) = read_file(&app, "attachment-list").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn create_then_read_round_trips_and_duplicates_conflict() {
    let app = initialized_app().await;
    let a = article("u1", "Hello", "# hi");

    let (status, _) = send(&app, admin(Method::POST, "/api/admin/article", a.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, current) = read_file(&app, "articles/u1/current").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current, a);

    let (status, body) = send_json(&app, admin(Method::POST, "/api/admin/article", a)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);

    let (_, metadata) = read_file(&app, "metadata").await;
    assert_eq!(
        metadata["articles"],
        json!([{"uuid": "u1", "title": "Hello", "created_time": 1700000000.0}])
    );
}

#[tokio::test]
async fn malformed_article_bodies_are_rejected() {
    let app = initialized_app().await;
    let bodies = [
        json!({"uuid": "u1", "title": "t"}),
        json!({"uuid": "", "title": "t", "created_time": 1, "content": "", "updated_time": 1}),
        json!({"uuid": "a/b", "title": "t", "created_time": 1, "content": "", "updated_time": 1}),
        json!({"uuid": "u1", "title": "t", "created_time": "now", "content": "", "updated_time": 1}),
        json!(["not", "an", "object"]),
    ];
    for body in bodies {
        let (status, _) = send(&app, admin(Method::POST, "/api/admin/article", body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }
    let (_, metadata) = read_file(&app, "metadata").await;
    assert_eq!(metadata["articles"], json!([]));
}

#[tokio::test]
async fn create_on_uninitialized_deployment_is_internal_error() {
    let app = test_app();
    let (status, body) = send_json(
        &app,
        admin(Method::POST, "/api/admin/article", article("u1", "t", "c")),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("blog/metadata"));
}

#[tokio::test]
async fn update_keeps_previous_version_as_backup() {
    let app = initialized_app().await;
    let original = article("u1", "First", "v1");
    let edited = article("u1", "Second", "v2");

    send(&app, admin(Method::POST, "/api/admin/article", original.clone())).await;
    let (status, _) = send(&app, admin(Method::PUT, "/api/admin/article", edited.clone())).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(read_file(&app, "articles/u1/backup").await.1, original);
    assert_eq!(read_file(&app, "articles/u1/current").await.1, edited);
    let (_, metadata) = read_file(&app, "metadata").await;
    assert_eq!(metadata["articles"][0]["title"], "Second");
    assert_eq!(metadata["articles"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        admin(Method::PUT, "/api/admin/article", article("ghost", "t", "c")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stage_leaves_current_and_index_alone() {
    let app = initialized_app().await;
    let a = article("u1", "Live", "published");
    send(&app, admin(Method::POST, "/api/admin/article", a.clone())).await;
    let (_, metadata_before) = read_file(&app, "metadata").await;

    let draft = article("u1", "Draft title", "work in progress");
    let (status, _) = send(&app, admin(Method::PUT, "/api/admin/article/stage", draft.clone())).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(read_file(&app, "articles/u1/stage").await.1, draft);
    assert_eq!(read_file(&app, "articles/u1/current").await.1, a);
    assert_eq!(read_file(&app, "metadata").await.1, metadata_before);

    // an update afterwards does not depend on the staged draft
    let (status, _) = send(
        &app,
        admin(Method::PUT, "/api/admin/article", article("u1", "Live 2", "x")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = read_file(&app, "articles/u1/stage").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        admin(Method::PUT, "/api/admin/article/stage", article("ghost", "t", "c")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_every_slot_and_the_brief() {
    let app = initialized_app().await;
    send(&app, admin(Method::POST, "/api/admin/article", article("u1", "a", "1"))).await;
    send(&app, admin(Method::PUT, "/api/admin/article", article("u1", "a", "2"))).await;
    send(&app, admin(Method::PUT, "/api/admin/article/stage", article("u1", "a", "3"))).await;

    let (status, _) = send(&app, admin(Method::DELETE, "/api/admin/article", json!({"uuid": "u1"}))).await;
    assert_eq!(status, StatusCode::OK);

    for slot in ["current", "stage", "backup"] {
        let (status, _) = read_file(&app, &format!("articles/u1/{slot}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{slot}");
    }
    let (_, metadata) = read_file(&app, "metadata").await;
    assert_eq!(metadata["articles"], json!([]));

    let again = [
        admin(Method::DELETE, "/api/admin/article", json!({"uuid": "u1"})),
        admin(Method::PUT, "/api/admin/article", article("u1", "a", "4")),
        admin(Method::PUT, "/api/admin/article/stage", article("u1", "a", "5")),
    ];
    for request in again {
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (status, _) = send(&app, admin(Method::DELETE, "/api/admin/article", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn attachment_lifecycle() {
    let app = initialized_app().await;

    let upload = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/attachment?filename=x.png")
        .header(header::AUTHORIZATION, bearer())
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from(vec![1u8, 2, 3]))
        .unwrap();
    let (status, _) = send(&app, upload).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = read_file(&app, "attachment-list").await;
    let entries = list.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["filename"], "x.png");
    assert_eq!(entries[0]["size"], 3);
    assert_eq!(entries[0]["article_uuid"], "");

    let response = app
        .clone()
        .oneshot(get("/api/public/file?path=attachments/x.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"x.png\""
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.as_ref(), &[1u8, 2, 3]);

    let (status, _) = send(
        &app,
        admin(
            Method::PUT,
            "/api/admin/attachment",
            json!({"filename": "x.png", "article_uuid": "u1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = read_file(&app, "attachment-list").await;
    assert_eq!(list[0]["article_uuid"], "u1");
    assert_eq!(list[0]["filename"], "x.png");
    assert_eq!(list[0]["size"], 3);

    let (status, _) = send(
        &app,
        admin(Method::DELETE, "/api/admin/attachment", json!({"filename": "x.png"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = read_file(&app, "attachments/x.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(read_file(&app, "attachment-list").await.1, json!([]));
}

#[tokio::test]
async fn uploads_larger_than_two_mib_are_accepted() {
    let app = initialized_app().await;
    let payload = vec![7u8; 3 * 1024 * 1024];

    let upload = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/attachment?filename=big.png")
        .header(header::AUTHORIZATION, bearer())
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from(payload.clone()))
        .unwrap();
    assert_eq!(send(&app, upload).await.0, StatusCode::OK);

    let avatar = Request::builder()
        .method(Method::PUT)
        .uri("/api/admin/avatar")
        .header(header::AUTHORIZATION, bearer())
        .body(Body::from(payload.clone()))
        .unwrap();
    assert_eq!(send(&app, avatar).await.0, StatusCode::OK);

    let (_, list) = read_file(&app, "attachment-list").await;
    assert_eq!(list[0]["size"], 3 * 1024 * 1024);
    let (status, body) = send(&app, get("/api/public/file?path=attachments/big.png")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.len(), payload.len());
}

#[tokio::test]
async fn uploads_over_the_configured_limit_are_rejected() {
    let app = blog_store::app(test_state().with_max_upload_bytes(1024));
    send(&app, admin_empty(Method::PUT, "/api/admin/init")).await;

    let upload = |size: usize| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/admin/attachment?filename=a.bin")
            .header(header::AUTHORIZATION, bearer())
            .body(Body::from(vec![1u8; size]))
            .unwrap()
    };
    assert_eq!(send(&app, upload(1024)).await.0, StatusCode::OK);
    assert_eq!(send(&app, upload(1025)).await.0, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn attachment_requests_with_missing_fields_are_bad_requests() {
    let app = initialized_app().await;

    let no_name = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/attachment")
        .header(header::AUTHORIZATION, bearer())
        .body(Body::from("data"))
        .unwrap();
    assert_eq!(send(&app, no_name).await.0, StatusCode::BAD_REQUEST);

    let empty = admin_empty(Method::POST, "/api/admin/attachment?filename=a.txt");
    assert_eq!(send(&app, empty).await.0, StatusCode::BAD_REQUEST);

    let relink = admin(Method::PUT, "/api/admin/attachment", json!({"filename": "a.txt"}));
    assert_eq!(send(&app, relink).await.0, StatusCode::BAD_REQUEST);

    let delete = admin(Method::DELETE, "/api/admin/attachment", json!({}));
    assert_eq!(send(&app, delete).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recover_restores_the_indexes_before_the_last_write() {
    let app = initialized_app().await;
    send(&app, admin(Method::POST, "/api/admin/article", article("u1", "one", "1"))).await;
    let upload = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/attachment?filename=a.txt&uuid=u1")
        .header(header::AUTHORIZATION, bearer())
        .body(Body::from("aaa"))
        .unwrap();
    send(&app, upload).await;

    let (_, metadata_before) = read_file(&app, "metadata").await;
    let (_, list_before) = read_file(&app, "attachment-list").await;

    send(&app, admin(Method::POST, "/api/admin/article", article("u2", "two", "2"))).await;
    send(
        &app,
        admin(Method::DELETE, "/api/admin/attachment", json!({"filename": "a.txt"})),
    )
    .await;

    let (status, body) = send_json(&app, admin_empty(Method::PUT, "/api/admin/recover")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["restored"], json!({"metadata": true, "attachment_list": true}));

    assert_eq!(read_file(&app, "metadata").await.1, metadata_before);
    assert_eq!(read_file(&app, "attachment-list").await.1, list_before);
}

#[tokio::test]
async fn recover_without_backups_is_not_found() {
    let app = initialized_app().await;
    let (status, body) = send_json(&app, admin_empty(Method::PUT, "/api/admin/recover")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("metadata-bak"));
}

#[tokio::test]
async fn site_update_goes_through_the_metadata_index() {
    let app = initialized_app().await;
    let site = json!({
        "title": "Notes",
        "description": "things",
        "github": "octocat",
        "email": "me@example.com",
        "footer": "bye",
    });
    let (status, _) = send(&app, admin(Method::PUT, "/api/admin/site", site.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read_file(&app, "metadata").await.1["site"], site);
    assert_eq!(read_file(&app, "metadata-bak").await.1["site"]["title"], "My Blog");

    let (status, _) = send(&app, admin(Method::PUT, "/api/admin/site", json!({"title": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn avatar_is_stored_as_png() {
    let app = initialized_app().await;
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/admin/avatar")
        .header(header::AUTHORIZATION, bearer())
        .body(Body::from(&b"\x89PNG\r\n"[..]))
        .unwrap();
    assert_eq!(send(&app, request).await.0, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/public/file?path=avatar.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

    let empty = admin_empty(Method::PUT, "/api/admin/avatar");
    assert_eq!(send(&app, empty).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn public_file_errors_and_unknown_routes() {
    let app = initialized_app().await;
    assert_eq!(read_file(&app, "nothing/here").await.0, StatusCode::NOT_FOUND);
    assert_eq!(
        send(&app, get("/api/public/file")).await.0,
        StatusCode::BAD_REQUEST
    );

    let (status, body) = send_json(&app, get("/no/such/route")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Route Not Found", "status": 404}));
}

#[tokio::test]
async fn health_probes_answer() {
    let app = test_app();
    let (status, body) = send_json(&app, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let (status, _) = send_json(&app, get("/readyz")).await;
    assert_eq!(status, StatusCode::OK);
}

//! HTTP 层集成测试
//!
//! 基于内存存储构建完整应用，通过 `oneshot` 驱动请求，覆盖认证、管理接口与横幅解析。

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use banner_service::{
    auth::JwtConfig,
    bootstrap::seed_admin,
    repository::MemoryStore,
    routes::build_app,
    state::AppState,
};
use banner_shared::config::AuthConfig;
use serde_json::{Value, json};
use tower::ServiceExt;

const ADMIN_PASSWORD: &str = "admin-pw";

struct TestApp {
    router: Router,
    admin_token: String,
}

impl TestApp {
    async fn new() -> Self {
        let auth = AuthConfig {
            admin_password: Some(ADMIN_PASSWORD.to_string()),
            ..Default::default()
        };
        let store = Arc::new(MemoryStore::new());
        seed_admin(store.as_ref(), &auth).await.unwrap();

        let state = AppState::in_memory(store, JwtConfig::from(&auth));
        let mut app = Self {
            router: build_app(state),
            admin_token: String::new(),
        };
        app.admin_token = app.login(&auth.admin_username, ADMIN_PASSWORD).await;
        app
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(method, uri, Some(&self.admin_token), body).await
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({"username": username, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    async fn register_user(&self, username: &str) -> String {
        let (status, _) = self
            .send(
                Method::POST,
                "/users",
                None,
                Some(json!({"username": username, "password": "user-pw"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.login(username, "user-pw").await
    }

    async fn create_feature(&self, name: &str) -> i64 {
        let (status, body) = self
            .admin(Method::POST, "/features", Some(json!({"name": name})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["feature_id"].as_i64().unwrap()
    }

    async fn create_tag(&self, name: &str) -> i64 {
        let (status, body) = self
            .admin(Method::POST, "/tags", Some(json!({"name": name})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["tag_id"].as_i64().unwrap()
    }

    async fn create_banner(&self, feature_id: i64, tag_ids: &[i64], content: Value, active: bool) -> i64 {
        let (status, body) = self
            .admin(
                Method::POST,
                "/banners",
                Some(json!({
                    "feature_id": feature_id,
                    "tag_ids": tag_ids,
                    "content": content,
                    "is_active": active,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create banner failed: {}", body);
        body["banner_id"].as_i64().unwrap()
    }

    async fn patch_banner(&self, id: i64, feature_id: i64, tag_ids: &[i64], content: Value, active: bool) -> (StatusCode, Value) {
        self.admin(
            Method::PATCH,
            &format!("/banner/{}", id),
            Some(json!({
                "feature_id": feature_id,
                "tag_ids": tag_ids,
                "content": content,
                "is_active": active,
            })),
        )
        .await
    }

    async fn resolve(&self, token: &str, feature_id: i64, tag_id: i64) -> (StatusCode, Value) {
        self.send(
            Method::GET,
            &format!("/user_banner?feature_id={}&tag_id={}", feature_id, tag_id),
            Some(token),
            None,
        )
        .await
    }

    async fn list(&self, query: &str) -> Vec<Value> {
        let (status, body) = self.admin(Method::GET, &format!("/banner{}", query), None).await;
        assert_eq!(status, StatusCode::OK, "list failed: {}", body);
        body.as_array().unwrap().clone()
    }
}

fn ids(banners: &[Value]) -> Vec<i64> {
    banners.iter().map(|b| b["banner_id"].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn test_banner_lifecycle_scenario() {
    let app = TestApp::new().await;
    let user = app.register_user("alice").await;

    let feature = app.create_feature("checkout").await;
    let tag = app.create_tag("new-users").await;
    let content = json!({"title": "Welcome", "url": "https://example.com"});
    let banner = app.create_banner(feature, &[tag], content.clone(), true).await;

    let (status, body) = app.resolve(&user, feature, tag).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, content);

    // 清空标签后横幅不再可达
    let (status, body) = app.patch_banner(banner, feature, &[], content.clone(), true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tag_ids"], json!([]));

    let (status, body) = app.resolve(&user, feature, tag).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_tag_replacement_is_idempotent() {
    let app = TestApp::new().await;
    let feature = app.create_feature("f").await;
    let t1 = app.create_tag("t1").await;
    let t2 = app.create_tag("t2").await;
    let banner = app.create_banner(feature, &[t1], json!({"v": 1}), true).await;

    for _ in 0..2 {
        let (status, body) = app
            .patch_banner(banner, feature, &[t2, t1, t2], json!({"v": 2}), true)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tag_ids"], json!([t1, t2]));
    }

    let (status, body) = app.admin(Method::GET, &format!("/banner/{}", banner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tag_ids"], json!([t1, t2]));
    assert_eq!(body["content"], json!({"v": 2}));
}

#[tokio::test]
async fn test_unknown_tag_leaves_no_partial_state() {
    let app = TestApp::new().await;
    let feature = app.create_feature("f").await;
    let tag = app.create_tag("t").await;

    let (status, body) = app
        .admin(
            Method::POST,
            "/banners",
            Some(json!({
                "feature_id": feature,
                "tag_ids": [tag, 9999],
                "content": {"a": 1},
                "is_active": true,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REFERENCE");
    assert!(app.list(&format!("?feature_id={}", feature)).await.is_empty());

    // 更新失败时横幅保持原样
    let banner = app.create_banner(feature, &[tag], json!({"a": 1}), true).await;
    let (status, _) = app
        .patch_banner(banner, feature, &[tag, 9999], json!({"a": 2}), false)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.admin(Method::GET, &format!("/banner/{}", banner), None).await;
    assert_eq!(body["tag_ids"], json!([tag]));
    assert_eq!(body["content"], json!({"a": 1}));
    assert_eq!(body["is_active"], true);
}

#[tokio::test]
async fn test_unknown_feature_rejected() {
    let app = TestApp::new().await;
    let tag = app.create_tag("t").await;

    let (status, body) = app
        .admin(
            Method::POST,
            "/banners",
            Some(json!({"feature_id": 4242, "tag_ids": [tag], "content": {}, "is_active": true})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REFERENCE");
}

#[tokio::test]
async fn test_most_recently_updated_banner_wins() {
    let app = TestApp::new().await;
    let user = app.register_user("bob").await;
    let feature = app.create_feature("f").await;
    let tag = app.create_tag("t").await;

    let first = app.create_banner(feature, &[tag], json!({"n": "first"}), true).await;
    app.create_banner(feature, &[tag], json!({"n": "second"}), true).await;

    let (_, body) = app.resolve(&user, feature, tag).await;
    assert_eq!(body, json!({"n": "second"}));

    let (status, _) = app
        .patch_banner(first, feature, &[tag], json!({"n": "first-edited"}), true)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.resolve(&user, feature, tag).await;
    assert_eq!(body, json!({"n": "first-edited"}));
}

#[tokio::test]
async fn test_inactive_banner_never_resolved() {
    let app = TestApp::new().await;
    let user = app.register_user("carol").await;
    let feature = app.create_feature("f").await;
    let tag = app.create_tag("t").await;

    app.create_banner(feature, &[tag], json!({"n": "hidden"}), false).await;
    let (status, _) = app.resolve(&user, feature, tag).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 较新的停用横幅不会遮挡较旧的启用横幅
    let active = app.create_banner(feature, &[tag], json!({"n": "shown"}), true).await;
    let newer = app.create_banner(feature, &[tag], json!({"n": "newer"}), false).await;
    assert!(newer > active);

    let (status, body) = app.resolve(&user, feature, tag).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"n": "shown"}));
}

#[tokio::test]
async fn test_list_filters_compose() {
    let app = TestApp::new().await;
    let f1 = app.create_feature("f1").await;
    let f2 = app.create_feature("f2").await;
    let t1 = app.create_tag("t1").await;
    let t2 = app.create_tag("t2").await;

    let a = app.create_banner(f1, &[t1, t2], json!({"n": "a"}), true).await;
    let b = app.create_banner(f1, &[t2], json!({"n": "b"}), false).await;
    let c = app.create_banner(f2, &[t1], json!({"n": "c"}), true).await;

    let by_tag = app.list(&format!("?tag_id={}", t1)).await;
    assert_eq!(ids(&by_tag), vec![a, c]);
    // 按标签过滤时仍返回横幅的完整标签集合
    assert_eq!(by_tag[0]["tag_ids"], json!([t1, t2]));

    let both = app.list(&format!("?feature_id={}&tag_id={}", f1, t2)).await;
    assert_eq!(ids(&both), vec![a, b]);

    assert_eq!(ids(&app.list("").await), vec![a, b, c]);
    assert_eq!(ids(&app.list("?limit=1&offset=1").await), vec![b]);
    assert!(app.list("?limit=0").await.is_empty());
}

#[tokio::test]
async fn test_list_without_limit_returns_everything() {
    let app = TestApp::new().await;
    let feature = app.create_feature("f").await;
    let tag = app.create_tag("t").await;
    for n in 0..25 {
        app.create_banner(feature, &[tag], json!({"n": n}), n % 2 == 0).await;
    }

    assert_eq!(app.list("").await.len(), 25);
}

#[tokio::test]
async fn test_empty_list_is_empty_array() {
    let app = TestApp::new().await;

    let (status, body) = app.admin(Method::GET, "/banner?feature_id=999", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_negative_paging_rejected() {
    let app = TestApp::new().await;

    for query in ["?limit=-1", "?offset=-5", "?limit=abc"] {
        let (status, body) = app.admin(Method::GET, &format!("/banner{}", query), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {}", query);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_authentication_and_roles() {
    let app = TestApp::new().await;
    let user = app.register_user("dave").await;

    let (status, body) = app.send(Method::GET, "/banner", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.send(Method::GET, "/banner", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::GET, "/user_banner?feature_id=1&tag_id=1", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 普通用户不能访问管理端路由
    for (method, uri, body) in [
        (Method::GET, "/banner", None),
        (Method::POST, "/features", Some(json!({"name": "x"}))),
        (Method::POST, "/tags", Some(json!({"name": "x"}))),
        (Method::DELETE, "/banner/1", None),
    ] {
        let (status, body) = app.send(method, uri, Some(&user), body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", uri, body);
    }

    // 管理员同样可以查询用户横幅
    let (status, _) = app.resolve(&app.admin_token, 1, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_validation() {
    let app = TestApp::new().await;
    let user = app.register_user("erin").await;
    let feature = app.create_feature("f").await;
    let tag = app.create_tag("t").await;

    let invalid_bodies = [
        json!({"tag_ids": [tag], "content": {}, "is_active": true}),
        json!({"feature_id": feature, "content": {}, "is_active": true}),
        json!({"feature_id": feature, "tag_ids": [], "content": {}, "is_active": true}),
        json!({"feature_id": feature, "tag_ids": [tag], "is_active": true}),
        json!({"feature_id": feature, "tag_ids": [tag], "content": "plain", "is_active": true}),
        json!({"feature_id": feature, "tag_ids": [tag], "content": {}}),
    ];
    for body in invalid_bodies {
        let (status, resp) = app.admin(Method::POST, "/banners", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(resp["code"], "VALIDATION_ERROR");
    }

    // 请求体不是合法 JSON
    let request = Request::builder()
        .method(Method::POST)
        .uri("/banners")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.admin_token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"feature_id\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for query in ["?feature_id=1", "?tag_id=1", "?feature_id=abc&tag_id=1"] {
        let (status, _) = app
            .send(Method::GET, &format!("/user_banner{}", query), Some(&user), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {}", query);
    }

    let (status, _) = app.admin(Method::POST, "/features", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_use_last_revision_accepted() {
    let app = TestApp::new().await;
    let user = app.register_user("frank").await;
    let feature = app.create_feature("f").await;
    let tag = app.create_tag("t").await;
    app.create_banner(feature, &[tag], json!({"v": 1}), true).await;

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/user_banner?feature_id={}&tag_id={}&use_last_revision=true", feature, tag),
            Some(&user),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"v": 1}));
}

#[tokio::test]
async fn test_registration_and_login_errors() {
    let app = TestApp::new().await;
    app.register_user("grace").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/users",
            None,
            Some(json!({"username": "grace", "password": "other"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "USERNAME_TAKEN");

    // 字符数合法但超过 bcrypt 的 72 字节上限
    let (status, body) = app
        .send(
            Method::POST,
            "/users",
            None,
            Some(json!({"username": "ivan", "password": "横".repeat(30)})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    for (username, password) in [("grace", "wrong"), ("nobody", "user-pw")] {
        let (status, body) = app
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({"username": username, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
    }

    let (status, body) = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({"username": "grace", "password": "user-pw"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
    assert!(body["expires_at"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_delete_banner() {
    let app = TestApp::new().await;
    let user = app.register_user("heidi").await;
    let feature = app.create_feature("f").await;
    let tag = app.create_tag("t").await;
    let banner = app.create_banner(feature, &[tag], json!({"x": 1}), true).await;

    let uri = format!("/banner/{}", banner);
    let (status, body) = app.admin(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = app.admin(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BANNER_NOT_FOUND");

    let (status, _) = app.admin(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.resolve(&user, feature, tag).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.patch_banner(banner, feature, &[tag], json!({}), true).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feature_and_tag_lookup() {
    let app = TestApp::new().await;
    let feature = app.create_feature("search").await;
    let tag = app.create_tag("vip").await;

    let (status, body) = app.admin(Method::GET, &format!("/features/{}", feature), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"feature_id": feature, "name": "search"}));

    let (status, body) = app.admin(Method::GET, &format!("/tags/{}", tag), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"tag_id": tag, "name": "vip"}));

    let (status, body) = app.admin(Method::GET, "/features/777", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "FEATURE_NOT_FOUND");

    let (status, body) = app.admin(Method::GET, "/tags/777", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "TAG_NOT_FOUND");
}

#[tokio::test]
async fn test_health_endpoints_are_public() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.send(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["store"], "ok");
}

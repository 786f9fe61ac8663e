// tests/api_tests.rs
//
// Drives the real router over HTTP, backed by the in-memory store.

use blog_backend::{
    config::{Config, StorageBackend},
    repository::Repositories,
    routes,
    services::Services,
    state::AppState,
};
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};

const ADMIN_USERNAME: &str = "site_admin";
const ADMIN_PASSWORD: &str = "admin-password";

struct TestApp {
    address: String,
    client: Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    async fn register(&self, username: &str) -> Response {
        self.client
            .post(self.url("/auth/register"))
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "password123"
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Registers a fresh user and returns their token.
    async fn user_token(&self, username: &str) -> String {
        assert_eq!(self.register(username).await.status(), StatusCode::CREATED);
        self.login(username, "password123").await
    }

    async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Response {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }

    async fn put(&self, path: &str, token: &str, body: Value) -> Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn get(&self, path: &str, token: Option<&str>) -> Response {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }

    async fn delete(&self, path: &str, token: &str) -> Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn create_article(&self, token: &str, body: Value) -> Value {
        let response = self.post("/articles", Some(token), body).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        body["data"].clone()
    }
}

/// Spawns the app on a random port with a memory-backed store and a seeded
/// admin account.
async fn spawn_app() -> TestApp {
    let config = Config {
        storage: StorageBackend::Memory,
        database_url: None,
        database_max_connections: 1,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        server_port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        admin_username: None,
        admin_email: None,
        admin_password: None,
    };

    let services = Services::new(Repositories::in_memory(), &config);
    services
        .users
        .seed_admin(ADMIN_USERNAME, "admin@example.com", ADMIN_PASSWORD)
        .await
        .expect("Failed to seed admin");

    let app = routes::create_router(AppState { config, services });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: Client::new(),
    }
}

#[tokio::test]
async fn unknown_path_is_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(format!("{}/random_path_that_does_not_exist", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_is_ok() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_login_and_me() {
    let app = spawn_app().await;
    let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    let response = app.register(&username).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 201);
    assert_eq!(body["data"]["username"], username.as_str());
    assert!(body["data"].get("password_hash").is_none());

    // Same username again
    assert_eq!(app.register(&username).await.status(), StatusCode::BAD_REQUEST);

    let token = app.login(&username, "password123").await;
    let response = app.get("/auth/me", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["username"], username.as_str());

    let response = app
        .put("/auth/me", &token, json!({ "nickname": "Ally", "bio": "hi" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["nickname"], "Ally");
}

#[tokio::test]
async fn register_fails_validation() {
    let app = spawn_app().await;

    // Username too short
    let response = app.register("yo").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 400);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn bad_credentials_and_tokens_are_401() {
    let app = spawn_app().await;
    app.user_token("alice").await;

    let response = app
        .post(
            "/auth/login",
            None,
            json!({ "username": "alice", "password": "not-the-password" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/auth/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 401);

    let response = app.get("/auth/me", Some("garbage")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .post("/articles", None, json!({ "title": "t", "content": "c" }))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn optional_auth_routes_ignore_bad_tokens() {
    let app = spawn_app().await;

    let response = app.get("/articles", Some("garbage")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn hello_world_scenario() {
    let app = spawn_app().await;
    let alice = app.user_token("alice").await;

    let article = app
        .create_article(&alice, json!({ "title": "Hello World", "content": "First post" }))
        .await;
    assert_eq!(article["slug"], "hello-world");
    let article_id = article["id"].as_i64().unwrap();

    let response = app
        .post(
            &format!("/articles/{}/comments", article_id),
            Some(&alice),
            json!({ "content": "Nice!" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let comment: Value = response.json().await.unwrap();
    let comment_id = comment["data"]["id"].as_i64().unwrap();
    assert_eq!(comment["data"]["reply_count"], 0);

    let detail: Value = app
        .get(&format!("/articles/{}", article_id), Some(&alice))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["data"]["comment_count"], 1);

    let response = app
        .post(
            &format!("/articles/{}/comments", article_id),
            Some(&alice),
            json!({ "content": "Thanks", "parent_id": comment_id }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let listed: Value = app
        .get(&format!("/articles/{}/comments", article_id), None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(listed["data"]["pagination"]["total"], 1);
    let top = &listed["data"]["items"][0];
    assert_eq!(top["reply_count"], 1);
    assert_eq!(top["replies"][0]["content"], "Thanks");

    let detail: Value = app
        .get(&format!("/articles/{}", article_id), Some(&alice))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["data"]["comment_count"], 2);

    let like_path = format!("/articles/{}/like", article_id);
    let liked: Value = app.post(&like_path, Some(&alice), json!({})).await.json().await.unwrap();
    assert_eq!(liked["data"]["is_liked"], true);
    let detail: Value = app
        .get(&format!("/articles/{}", article_id), Some(&alice))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["data"]["like_count"], 1);
    assert_eq!(detail["data"]["is_liked"], true);

    let unliked: Value = app.post(&like_path, Some(&alice), json!({})).await.json().await.unwrap();
    assert_eq!(unliked["data"]["is_liked"], false);
    let detail: Value = app
        .get(&format!("/articles/{}", article_id), Some(&alice))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["data"]["like_count"], 0);
}

#[tokio::test]
async fn ownership_is_enforced() {
    let app = spawn_app().await;
    let alice = app.user_token("alice").await;
    let bob = app.user_token("bob").await;

    let article = app
        .create_article(
            &alice,
            json!({ "title": "Alice's", "content": "body", "status": "published" }),
        )
        .await;
    let path = format!("/articles/{}", article["id"]);

    let response = app.put(&path, &bob, json!({ "title": "Bob's now" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&path, &bob).await.status(), StatusCode::FORBIDDEN);

    let response = app
        .post(&format!("{}/comments", path), Some(&alice), json!({ "content": "mine" }))
        .await;
    let comment: Value = response.json().await.unwrap();
    let comment_path = format!("/comments/{}", comment["data"]["id"]);
    let response = app.put(&comment_path, &bob, json!({ "content": "edited" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&comment_path, &bob).await.status(), StatusCode::FORBIDDEN);

    let response = app.put(&comment_path, &alice, json!({ "content": "edited" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.delete(&comment_path, &alice).await.status(), StatusCode::OK);

    let response = app.put(&path, &alice, json!({ "title": "Still Alice's" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["slug"], "still-alice-s");
    assert_eq!(app.delete(&path, &alice).await.status(), StatusCode::OK);
    assert_eq!(app.get(&path, None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn drafts_are_private_to_their_author() {
    let app = spawn_app().await;
    let alice = app.user_token("alice").await;
    let bob = app.user_token("bob").await;

    let draft = app
        .create_article(&alice, json!({ "title": "Draft", "content": "wip" }))
        .await;
    app.create_article(
        &alice,
        json!({ "title": "Out", "content": "done", "status": "published" }),
    )
    .await;
    let path = format!("/articles/{}", draft["id"]);

    assert_eq!(app.get(&path, None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get(&path, Some(&bob)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get(&path, Some(&alice)).await.status(), StatusCode::OK);

    let anonymous: Value = app.get("/articles", None).await.json().await.unwrap();
    assert_eq!(anonymous["data"]["pagination"]["total"], 1);
    let as_alice: Value = app.get("/articles", Some(&alice)).await.json().await.unwrap();
    assert_eq!(as_alice["data"]["pagination"]["total"], 2);
}

#[tokio::test]
async fn article_list_paginates_and_filters() {
    let app = spawn_app().await;
    let alice = app.user_token("alice").await;
    for i in 0..5 {
        app.create_article(
            &alice,
            json!({ "title": format!("Post {}", i), "content": "body", "status": "published" }),
        )
        .await;
    }

    let page: Value = app
        .get("/articles?page=2&page_size=2", None)
        .await
        .json()
        .await
        .unwrap();
    let pagination = &page["data"]["pagination"];
    assert_eq!(pagination["page"], 2);
    assert_eq!(pagination["page_size"], 2);
    assert_eq!(pagination["total"], 5);
    assert_eq!(pagination["total_pages"], 3);
    assert_eq!(page["data"]["items"].as_array().unwrap().len(), 2);

    let response = app
        .get("/articles?page=9223372036854775807&page_size=100", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let beyond: Value = response.json().await.unwrap();
    assert!(beyond["data"]["items"].as_array().unwrap().is_empty());
    assert_eq!(beyond["data"]["pagination"]["total"], 5);

    let oldest: Value = app
        .get("/articles?sort=created_at&order=asc&page_size=1", None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(oldest["data"]["items"][0]["title"], "Post 0");

    let keyword: Value = app
        .get("/articles?keyword=post%203", None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(keyword["data"]["pagination"]["total"], 1);
}

#[tokio::test]
async fn taxonomy_management_requires_admin() {
    let app = spawn_app().await;
    let alice = app.user_token("alice").await;
    let admin = app.admin_token().await;

    let response = app
        .post("/categories", Some(&alice), json!({ "name": "Tech" }))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app.post("/categories", None, json!({ "name": "Tech" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .post("/categories", Some(&admin), json!({ "name": "Tech" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let category: Value = response.json().await.unwrap();
    let category_id = category["data"]["id"].as_i64().unwrap();
    assert_eq!(category["data"]["slug"], "tech");

    let response = app
        .post("/tags", Some(&admin), json!({ "name": "Rust", "color": "#dea584" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let tag: Value = response.json().await.unwrap();
    let tag_id = tag["data"]["id"].as_i64().unwrap();

    let article = app
        .create_article(
            &alice,
            json!({
                "title": "Tagged",
                "content": "body",
                "status": "published",
                "category_ids": [category_id],
                "tag_ids": [tag_id]
            }),
        )
        .await;
    assert_eq!(article["categories"][0]["slug"], "tech");
    assert_eq!(article["tags"][0]["name"], "Rust");

    let by_slug: Value = app.get("/categories/slug/tech", None).await.json().await.unwrap();
    assert_eq!(by_slug["data"]["article_count"], 1);
    let tag_detail: Value = app.get("/tags/slug/rust", None).await.json().await.unwrap();
    assert_eq!(tag_detail["data"]["article_count"], 1);

    let filtered: Value = app
        .get(&format!("/articles?tag_id={}", tag_id), None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(filtered["data"]["pagination"]["total"], 1);

    // Still in use
    let response = app.delete(&format!("/tags/{}", tag_id), &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .put(
            &format!("/articles/{}", article["id"]),
            &alice,
            json!({ "category_ids": [], "tag_ids": [] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.delete(&format!("/tags/{}", tag_id), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.delete(&format!("/categories/{}", category_id), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        app.get(&format!("/categories/{}", category_id), None).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn category_tree_lists_children() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let parent: Value = app
        .post("/categories", Some(&admin), json!({ "name": "Programming" }))
        .await
        .json()
        .await
        .unwrap();
    let parent_id = parent["data"]["id"].as_i64().unwrap();
    app.post(
        "/categories",
        Some(&admin),
        json!({ "name": "Rust", "parent_id": parent_id }),
    )
    .await;

    let tree: Value = app.get("/categories?tree=true", None).await.json().await.unwrap();
    assert_eq!(tree["data"][0]["name"], "Programming");
    assert_eq!(tree["data"][0]["children"][0]["name"], "Rust");

    let children: Value = app
        .get(&format!("/categories?parent_id={}", parent_id), None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(children["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn comment_like_toggles_and_missing_targets_404() {
    let app = spawn_app().await;
    let alice = app.user_token("alice").await;
    let article = app
        .create_article(
            &alice,
            json!({ "title": "Likes", "content": "body", "status": "published" }),
        )
        .await;
    let comment: Value = app
        .post(
            &format!("/articles/{}/comments", article["id"]),
            Some(&alice),
            json!({ "content": "like me" }),
        )
        .await
        .json()
        .await
        .unwrap();

    let path = format!("/comments/{}/like", comment["data"]["id"]);
    let first: Value = app.post(&path, Some(&alice), json!({})).await.json().await.unwrap();
    assert_eq!(first["data"]["is_liked"], true);
    let second: Value = app.post(&path, Some(&alice), json!({})).await.json().await.unwrap();
    assert_eq!(second["data"]["is_liked"], false);

    let response = app.post("/comments/99999/like", Some(&alice), json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app
        .post("/articles/99999/comments", Some(&alice), json!({ "content": "hello?" }))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

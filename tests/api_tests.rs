use news_portal::{
    AppConfig, AppState, MemoryRepository, bootstrap, create_router,
    repository::RepositoryState,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

/// Boots the full HTTP stack against the in-memory repository, with the role
/// catalog and the initial admin account seeded exactly as in production.
async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
    let config = AppConfig::default();

    bootstrap(&repo, &config)
        .await
        .expect("Failed to seed test repository");

    let state = AppState { repo, config };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

async fn token_for(client: &reqwest::Client, app: &TestApp, login: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/token", app.address))
        .form(&[("username", login), ("password", password)])
        .send()
        .await
        .expect("login request failed");
    assert_eq!(response.status(), 200, "login failed for {login}");
    let body: Value = response.json().await.unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

async fn admin_token(client: &reqwest::Client, app: &TestApp) -> String {
    token_for(client, app, "admin", "adminpass").await
}

/// Resolves seeded role names to their catalog ids.
async fn role_id(client: &reqwest::Client, app: &TestApp, name: &str) -> i64 {
    let roles: Vec<Value> = client
        .get(format!("{}/roles", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    roles
        .iter()
        .find(|r| r["name"] == name)
        .unwrap_or_else(|| panic!("role {name} not seeded"))["id"]
        .as_i64()
        .unwrap()
}

/// Registers a user with the given roles and returns (user id, bearer token).
async fn register(
    client: &reqwest::Client,
    app: &TestApp,
    login: &str,
    roles: &[&str],
) -> (i64, String) {
    let mut role_ids = Vec::new();
    for name in roles {
        role_ids.push(role_id(client, app, name).await);
    }
    let response = client
        .post(format!("{}/users", app.address))
        .json(&json!({
            "login": login,
            "email": format!("{login}@example.com"),
            "password": "secret123",
            "role_ids": role_ids,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201, "registration failed for {login}");
    let body: Value = response.json().await.unwrap();
    let id = body["id"].as_i64().unwrap();
    let token = token_for(client, app, login, "secret123").await;
    (id, token)
}

async fn create_article(
    client: &reqwest::Client,
    app: &TestApp,
    token: &str,
    title: &str,
) -> Value {
    let response = client
        .post(format!("{}/news", app.address))
        .bearer_auth(token)
        .json(&json!({ "title": title, "body": "Long enough body text" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201, "article creation failed: {title}");
    response.json().await.unwrap()
}

async fn publish(client: &reqwest::Client, app: &TestApp, token: &str, id: i64) {
    let response = client
        .post(format!("{}/news/{id}/publish", app.address))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

// --- Liveness & identity ---

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn seeded_admin_can_log_in_and_list_users() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &app).await;

    let response = client
        .get(format!("{}/users", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let users: Vec<Value> = response.json().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["login"], "admin");
    // The credential never leaves the server.
    assert!(users[0].get("password").is_none());
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/token", app.address))
        .form(&[("username", "admin"), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "unauthenticated");
}

#[tokio::test]
async fn banned_user_cannot_log_in_but_existing_rules_check_only_at_login() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &app).await;
    let (user_id, user_tok) = register(&client, &app, "banned_reader", &["reader"]).await;

    // Ban the account.
    let response = client
        .patch(format!("{}/users/{user_id}/ban", app.address))
        .bearer_auth(&admin)
        .json(&true)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // A fresh login is refused.
    let response = client
        .post(format!("{}/token", app.address))
        .form(&[("username", "banned_reader"), ("password", "secret123")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // The token issued before the ban still authenticates reads.
    let response = client
        .get(format!("{}/news", app.address))
        .bearer_auth(&user_tok)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn token_for_a_deleted_user_stops_working() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &app).await;
    let (user_id, user_tok) = register(&client, &app, "shortlived", &["author"]).await;

    let response = client
        .delete(format!("{}/users/{user_id}", app.address))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = client
        .post(format!("{}/news", app.address))
        .bearer_auth(&user_tok)
        .json(&json!({ "title": "Ghost", "body": "Long enough body text" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn malformed_bearer_token_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/users", app.address))
        .header("authorization", "Basic abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = client
        .get(format!("{}/users", app.address))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

// --- Registration ---

#[tokio::test]
async fn duplicate_login_conflicts_and_a_new_login_succeeds() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    register(&client, &app, "taken", &[]).await;

    let response = client
        .post(format!("{}/users", app.address))
        .json(&json!({
            "login": "taken",
            "email": "second@example.com",
            "password": "secret123",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "conflict");
    assert_eq!(body["message"], "login already taken");

    // The client retries under a free login and gets through.
    register(&client, &app, "taken2", &[]).await;
}

#[tokio::test]
async fn unknown_role_ids_are_silently_dropped_on_registration() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let reader = role_id(&client, &app, "reader").await;

    let response = client
        .post(format!("{}/users", app.address))
        .json(&json!({
            "login": "optimist",
            "email": "optimist@example.com",
            "password": "secret123",
            "role_ids": [reader, 9999],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let roles = body["roles"].as_array().unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0]["name"], "reader");
}

// --- User listing & profile updates ---

#[tokio::test]
async fn moderators_get_the_reduced_user_projection() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, moderator) = register(&client, &app, "mod1", &["moderator"]).await;
    let (_, reader) = register(&client, &app, "reader1", &["reader"]).await;

    let response = client
        .get(format!("{}/users", app.address))
        .bearer_auth(&moderator)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let users: Vec<Value> = response.json().await.unwrap();
    assert_eq!(users.len(), 3);
    // No contact details in the moderator view.
    assert!(users[0].get("login").is_none());
    assert!(users[0].get("email").is_none());
    assert!(users[0].get("FIO").is_some());

    // Plain readers are refused entirely.
    let response = client
        .get(format!("{}/users", app.address))
        .bearer_auth(&reader)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn author_may_edit_own_profile_but_not_roles() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, token) = register(&client, &app, "self_editor", &["author"]).await;

    let response = client
        .patch(format!("{}/users/{user_id}", app.address))
        .bearer_auth(&token)
        .json(&json!({ "FIO": "S. Editor", "phone": "+100" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["FIO"], "S. Editor");
    assert_eq!(body["phone"], "+100");

    // Self-service role escalation is refused before any write.
    let admin_role = role_id(&client, &app, "admin").await;
    let response = client
        .patch(format!("{}/users/{user_id}", app.address))
        .bearer_auth(&token)
        .json(&json!({ "role_ids": [admin_role] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn author_may_not_edit_someone_else() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, author) = register(&client, &app, "writer_a", &["author"]).await;
    let (other_id, _) = register(&client, &app, "writer_b", &["author"]).await;

    let response = client
        .patch(format!("{}/users/{other_id}", app.address))
        .bearer_auth(&author)
        .json(&json!({ "FIO": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn admin_assigns_roles_and_unknown_role_ids_fail_validation() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &app).await;
    let (user_id, _) = register(&client, &app, "promoted", &["reader"]).await;
    let author_role = role_id(&client, &app, "author").await;

    let response = client
        .patch(format!("{}/users/{user_id}", app.address))
        .bearer_auth(&admin)
        .json(&json!({ "role_ids": [author_role] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["roles"][0]["name"], "author");

    let response = client
        .patch(format!("{}/users/{user_id}", app.address))
        .bearer_auth(&admin)
        .json(&json!({ "role_ids": [9999] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

// --- Ban management ---

#[tokio::test]
async fn admin_cannot_ban_themselves() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &app).await;

    // The seeded admin is the first user.
    let users: Vec<Value> = client
        .get(format!("{}/users", app.address))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let admin_id = users
        .iter()
        .find(|u| u["login"] == "admin")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let response = client
        .patch(format!("{}/users/{admin_id}/ban", app.address))
        .bearer_auth(&admin)
        .json(&true)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn ban_is_admin_only_and_idempotent() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &app).await;
    let (_, moderator) = register(&client, &app, "mod2", &["moderator"]).await;
    let (target_id, _) = register(&client, &app, "target", &["reader"]).await;

    let response = client
        .patch(format!("{}/users/{target_id}/ban", app.address))
        .bearer_auth(&moderator)
        .json(&true)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    for _ in 0..2 {
        let response = client
            .patch(format!("{}/users/{target_id}/ban", app.address))
            .bearer_auth(&admin)
            .json(&true)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["in_ban"], true);
    }
}

// --- News lifecycle ---

#[tokio::test]
async fn created_articles_are_drafts_even_when_the_payload_says_otherwise() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, author) = register(&client, &app, "eager", &["author"]).await;

    let response = client
        .post(format!("{}/news", app.address))
        .bearer_auth(&author)
        .json(&json!({
            "title": "Straight to print",
            "body": "Long enough body text",
            "status": "published",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "draft");
    assert_eq!(body["views"], 0);
    assert!(body["published_at"].is_null());
}

#[tokio::test]
async fn readers_cannot_create_articles() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, reader) = register(&client, &app, "just_reading", &["reader"]).await;

    let response = client
        .post(format!("{}/news", app.address))
        .bearer_auth(&reader)
        .json(&json!({ "title": "Nope", "body": "Long enough body text" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn short_title_fails_validation_with_a_message() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, author) = register(&client, &app, "terse", &["author"]).await;

    let response = client
        .post(format!("{}/news", app.address))
        .bearer_auth(&author)
        .json(&json!({ "title": "ab", "body": "Long enough body text" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["message"], "title must be between 3 and 255 characters");
}

#[tokio::test]
async fn anonymous_listing_shows_published_articles_only() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &app).await;
    let (_, author) = register(&client, &app, "columnist", &["author"]).await;

    create_article(&client, &app, &author, "Unfinished draft").await;
    let public = create_article(&client, &app, &author, "Front page").await;
    publish(&client, &app, &admin, public["id"].as_i64().unwrap()).await;

    let articles: Vec<Value> = client
        .get(format!("{}/news", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["title"], "Front page");
}

#[tokio::test]
async fn authors_see_the_union_of_published_and_their_own() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &app).await;
    let (_, alice) = register(&client, &app, "alice_w", &["author"]).await;
    let (_, bob) = register(&client, &app, "bob_w", &["author"]).await;

    create_article(&client, &app, &alice, "Alice draft").await;
    let bob_public = create_article(&client, &app, &bob, "Bob public").await;
    create_article(&client, &app, &bob, "Bob draft").await;
    publish(&client, &app, &admin, bob_public["id"].as_i64().unwrap()).await;

    let articles: Vec<Value> = client
        .get(format!("{}/news", app.address))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let titles: Vec<&str> = articles.iter().map(|a| a["title"].as_str().unwrap()).collect();
    assert!(titles.contains(&"Alice draft"));
    assert!(titles.contains(&"Bob public"));
    assert!(!titles.contains(&"Bob draft"));

    // Admins see everything.
    let articles: Vec<Value> = client
        .get(format!("{}/news", app.address))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(articles.len(), 3);
}

#[tokio::test]
async fn every_visible_read_bumps_the_view_counter() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &app).await;
    let (_, author) = register(&client, &app, "counted", &["author"]).await;
    let article = create_article(&client, &app, &author, "Counted story").await;
    let id = article["id"].as_i64().unwrap();
    publish(&client, &app, &admin, id).await;

    let first: Value = client
        .get(format!("{}/news/{id}", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["views"], 1);

    // The same caller again: still counts.
    let second: Value = client
        .get(format!("{}/news/{id}", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["views"], 2);
}

#[tokio::test]
async fn invisible_reads_do_not_bump_the_counter() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, author) = register(&client, &app, "private_w", &["author"]).await;
    let (_, reader) = register(&client, &app, "nosy", &["reader"]).await;
    let article = create_article(&client, &app, &author, "Private draft").await;
    let id = article["id"].as_i64().unwrap();

    // Anonymous: 401. Authenticated stranger: 403.
    let response = client
        .get(format!("{}/news/{id}", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    let response = client
        .get(format!("{}/news/{id}", app.address))
        .bearer_auth(&reader)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // The owner's first successful read sees the counter at one.
    let body: Value = client
        .get(format!("{}/news/{id}", app.address))
        .bearer_auth(&author)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["views"], 1);
}

#[tokio::test]
async fn missing_article_is_not_found() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/news/999", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn authors_cannot_publish_and_double_publish_conflicts() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &app).await;
    let (_, author) = register(&client, &app, "impatient", &["author"]).await;
    let article = create_article(&client, &app, &author, "Waiting room").await;
    let id = article["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/news/{id}/publish", app.address))
        .bearer_auth(&author)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = client
        .post(format!("{}/news/{id}/publish", app.address))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "published");
    assert!(!body["published_at"].is_null());

    let response = client
        .post(format!("{}/news/{id}/publish", app.address))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "article is already published");
}

#[tokio::test]
async fn authors_edit_their_own_articles_but_not_the_status_field() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, author) = register(&client, &app, "reviser", &["author"]).await;
    let article = create_article(&client, &app, &author, "First pass").await;
    let id = article["id"].as_i64().unwrap();

    let response = client
        .patch(format!("{}/news/{id}", app.address))
        .bearer_auth(&author)
        .json(&json!({ "title": "Second pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Second pass");
    assert!(!body["redacted_at"].is_null());

    let response = client
        .patch(format!("{}/news/{id}", app.address))
        .bearer_auth(&author)
        .json(&json!({ "status": "published" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn non_owner_author_cannot_edit_but_a_moderator_can() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, owner) = register(&client, &app, "owner_w", &["author"]).await;
    let (_, rival) = register(&client, &app, "rival_w", &["author"]).await;
    let (_, moderator) = register(&client, &app, "mod_w", &["moderator"]).await;
    let article = create_article(&client, &app, &owner, "Contested piece").await;
    let id = article["id"].as_i64().unwrap();

    let response = client
        .patch(format!("{}/news/{id}", app.address))
        .bearer_auth(&rival)
        .json(&json!({ "title": "Stolen piece" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = client
        .patch(format!("{}/news/{id}", app.address))
        .bearer_auth(&moderator)
        .json(&json!({ "status": "published" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "published");
    assert!(!body["published_at"].is_null());
}

#[tokio::test]
async fn explicit_null_clears_the_url_slug() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, author) = register(&client, &app, "slugger", &["author"]).await;

    let response = client
        .post(format!("{}/news", app.address))
        .bearer_auth(&author)
        .json(&json!({
            "title": "Sluggish",
            "body": "Long enough body text",
            "url": "sluggish",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let article: Value = response.json().await.unwrap();
    let id = article["id"].as_i64().unwrap();
    assert_eq!(article["url"], "sluggish");

    let response = client
        .patch(format!("{}/news/{id}", app.address))
        .bearer_auth(&author)
        .json(&json!({ "url": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["url"].is_null());
}

#[tokio::test]
async fn explicit_null_clears_the_author_label_but_absence_keeps_it() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, author) = register(&client, &app, "bylined", &["author"]).await;

    let response = client
        .post(format!("{}/news", app.address))
        .bearer_auth(&author)
        .json(&json!({
            "title": "Bylined piece",
            "body": "Long enough body text",
            "author": "J. Doe",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let article: Value = response.json().await.unwrap();
    let id = article["id"].as_i64().unwrap();

    // An update that never mentions the field leaves it alone.
    let response = client
        .patch(format!("{}/news/{id}", app.address))
        .bearer_auth(&author)
        .json(&json!({ "title": "Bylined piece, revised" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["author"], "J. Doe");

    let response = client
        .patch(format!("{}/news/{id}", app.address))
        .bearer_auth(&author)
        .json(&json!({ "author": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["author"].is_null());
}

#[tokio::test]
async fn explicit_null_clears_nullable_profile_fields() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, token) = register(&client, &app, "erasable", &["author"]).await;

    let response = client
        .patch(format!("{}/users/{user_id}", app.address))
        .bearer_auth(&token)
        .json(&json!({ "FIO": "E. Rasable", "phone": "+200" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Clearing one field must not disturb the other.
    let response = client
        .patch(format!("{}/users/{user_id}", app.address))
        .bearer_auth(&token)
        .json(&json!({ "FIO": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["FIO"].is_null());
    assert_eq!(body["phone"], "+200");

    let response = client
        .patch(format!("{}/users/{user_id}", app.address))
        .bearer_auth(&token)
        .json(&json!({ "phone": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["phone"].is_null());
}

#[tokio::test]
async fn deleting_articles_is_for_moderators_only() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &app).await;
    let (_, author) = register(&client, &app, "attached", &["author"]).await;
    let article = create_article(&client, &app, &author, "Doomed piece").await;
    let id = article["id"].as_i64().unwrap();

    // Even the owner may not delete.
    let response = client
        .delete(format!("{}/news/{id}", app.address))
        .bearer_auth(&author)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = client
        .delete(format!("{}/news/{id}", app.address))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = client
        .delete(format!("{}/news/{id}", app.address))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

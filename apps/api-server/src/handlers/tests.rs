use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};
use uuid::Uuid;

use bulletin_core::domain::{NewGroup, NewPost, PostScope, REQUIRED_MESSAGE, User};
use bulletin_core::ports::{
    BaseRepository, GroupRepository, PasswordService, PostRepository, TokenService,
    UserRepository,
};
use bulletin_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

use super::{configure_routes, not_found};
use crate::observability::RequestIdMiddleware;
use crate::state::AppState;

const LOGIN_URL: &str = "/auth/login/";

struct Harness {
    state: AppState,
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let users: Arc<dyn UserRepository> = store.clone();
        let groups: Arc<dyn GroupRepository> = store.clone();
        let posts: Arc<dyn PostRepository> = store;

        Self {
            state: AppState::from_repositories(
                users.clone(),
                groups.clone(),
                posts.clone(),
                10,
                LOGIN_URL.to_string(),
            ),
            users,
            groups,
            posts,
            tokens: Arc::new(JwtTokenService::new(JwtConfig {
                secret: "handler-test-secret".to_string(),
                expiration_hours: 1,
                issuer: "bulletin-tests".to_string(),
            })),
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }

    async fn user(&self, username: &str, is_admin: bool) -> User {
        let mut user = User::new(
            username.to_string(),
            format!("{}@example.com", username),
            "unused-hash".to_string(),
        );
        user.is_admin = is_admin;
        self.users.save(user).await.unwrap()
    }

    fn bearer(&self, user: &User) -> (header::HeaderName, String) {
        let token = self
            .tokens
            .generate_token(user.id, &user.username, user.roles())
            .unwrap();
        (header::AUTHORIZATION, format!("Bearer {}", token))
    }

    async fn group(&self, slug: &str) -> i64 {
        self.groups
            .create(NewGroup::new("Test group", slug, "Test description"))
            .await
            .unwrap()
            .id
    }

    async fn post(&self, author: &User, text: &str, group_id: Option<i64>) -> i64 {
        self.posts
            .create(NewPost::new(author.id, text.to_string(), group_id))
            .await
            .unwrap()
            .id
    }
}

macro_rules! app {
    ($h:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new($h.state.clone()))
                .app_data(web::Data::new($h.tokens.clone()))
                .app_data(web::Data::new($h.passwords.clone()))
                .configure(configure_routes)
                .default_service(web::to(not_found)),
        )
        .await
    };
}

fn location<B>(res: &ServiceResponse<B>) -> String {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_default()
}

// Listing

#[actix_web::test]
async fn test_group_feed_shows_its_posts() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    let group_id = h.group("test-slug").await;
    h.post(&author, "in the group", Some(group_id)).await;
    h.post(&author, "elsewhere", None).await;
    let app = app!(h);

    let req = test::TestRequest::get().uri("/group/test-slug/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["view"], "posts/group_list");
    assert_eq!(body["context"]["group"]["slug"], "test-slug");
    let items = body["context"]["page_obj"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["text"], "in the group");
}

#[actix_web::test]
async fn test_unknown_group_is_not_found() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/group/nonexistent-slug/")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 404);
    assert!(body.get("context").is_none());
}

#[actix_web::test]
async fn test_profile_pages_clamp() {
    let h = Harness::new();
    let author = h.user("prolific", false).await;
    for i in 0..15 {
        h.post(&author, &format!("post {}", i), None).await;
    }
    let app = app!(h);

    let cases = [
        ("1", 1, 10),
        ("2", 2, 5),
        ("3", 2, 5),
        ("abc", 1, 10),
        ("-4", 1, 10),
        ("99999999999999999999", 2, 5),
        ("-99999999999999999999", 1, 10),
    ];
    for (query, number, len) in cases {
        let req = test::TestRequest::get()
            .uri(&format!("/profile/prolific/?page={}", query))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["view"], "posts/profile");
        assert_eq!(body["context"]["number_of_posts"], 15);
        assert_eq!(body["context"]["page_obj"]["number"], number, "page={}", query);
        assert_eq!(
            body["context"]["page_obj"]["items"].as_array().unwrap().len(),
            len,
            "page={}",
            query
        );
    }
}

#[actix_web::test]
async fn test_index_lists_every_post() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    h.post(&author, "first", None).await;
    h.post(&author, "second", None).await;
    let app = app!(h);

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["view"], "posts/index");
    let items = body["context"]["page_obj"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(body["context"]["page_obj"]["num_pages"], 1);
}

#[actix_web::test]
async fn test_repeated_page_parameter_uses_last_value() {
    let h = Harness::new();
    let author = h.user("prolific", false).await;
    for i in 0..15 {
        h.post(&author, &format!("post {}", i), None).await;
    }
    let app = app!(h);

    let req = test::TestRequest::get().uri("/?page=1&page=2").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["context"]["page_obj"]["number"], 2);

    let req = test::TestRequest::get().uri("/?page=2&page=abc").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["context"]["page_obj"]["number"], 1);
}

#[actix_web::test]
async fn test_post_detail() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    h.post(&author, "other", None).await;
    let post_id = h.post(&author, "the one", None).await;
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["view"], "posts/post_detail");
    assert_eq!(body["context"]["post"]["text"], "the one");
    assert_eq!(body["context"]["author"]["username"], "auth");
    assert_eq!(body["context"]["number_of_posts"], 2);
}

#[actix_web::test]
async fn test_unknown_path_is_problem_document() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::get().uri("/unexisting_page/").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 404);
    assert!(body["request_id"].is_string());
}

// Authoring

#[actix_web::test]
async fn test_anonymous_create_redirects_to_login() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/create/")
        .set_form([("text", "Sneaky")])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/?next=/create/");
    assert_eq!(h.posts.count(PostScope::All).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_anonymous_non_form_body_still_redirects() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    let post_id = h.post(&author, "original", None).await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/create/")
        .set_json(json!({"text": "hi"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/?next=/create/");

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post_id))
        .set_payload("text=x")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        location(&res),
        format!("/auth/login/?next=/posts/{}/edit/", post_id)
    );

    assert_eq!(h.posts.count(PostScope::All).await.unwrap(), 1);
    let post = h.posts.find_by_id(post_id).await.unwrap().unwrap();
    assert_eq!(post.text, "original");
}

#[actix_web::test]
async fn test_author_non_form_body_is_bad_request() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(h.bearer(&author))
        .set_json(json!({"text": "hi"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(h.posts.count(PostScope::All).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_create_form_lists_groups() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    h.group("test-slug").await;
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/create/")
        .insert_header(h.bearer(&author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["view"], "posts/create_post");
    assert_eq!(body["context"]["is_edit"], false);
    assert_eq!(body["context"]["groups"][0]["slug"], "test-slug");
}

#[actix_web::test]
async fn test_create_ignores_submitted_author() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    let group_id = h.group("test-slug").await;
    let app = app!(h);

    let forged = Uuid::new_v4().to_string();
    let group = group_id.to_string();
    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(h.bearer(&author))
        .set_form([
            ("text", "Hello"),
            ("group", group.as_str()),
            ("author", forged.as_str()),
        ])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/auth/");

    let posts = h.posts.list(PostScope::All, 0, 10).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].author_id, author.id);
    assert_eq!(posts[0].text, "Hello");
    assert_eq!(posts[0].group_id, Some(group_id));
}

#[actix_web::test]
async fn test_create_with_unknown_group_rerenders() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(h.bearer(&author))
        .set_form([("text", "Hello"), ("group", "999")])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["view"], "posts/create_post");
    assert!(body["context"]["errors"]["group"].is_array());
    assert_eq!(body["context"]["form"]["text"], "Hello");
    assert_eq!(h.posts.count(PostScope::All).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_garbage_token_counts_as_anonymous() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/create/")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/?next=/create/");
}

#[actix_web::test]
async fn test_non_author_edit_redirects_to_detail() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    let intruder = h.user("intruder", false).await;
    let post_id = h.post(&author, "original", None).await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post_id))
        .insert_header(h.bearer(&intruder))
        .set_form([("text", "defaced")])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", post_id));

    let post = h.posts.find_by_id(post_id).await.unwrap().unwrap();
    assert_eq!(post.text, "original");
    assert_eq!(post.author_id, author.id);
}

#[actix_web::test]
async fn test_anonymous_edit_redirects_to_login() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    let post_id = h.post(&author, "original", None).await;
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", post_id))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        location(&res),
        format!("/auth/login/?next=/posts/{}/edit/", post_id)
    );
}

#[actix_web::test]
async fn test_author_edit_form_is_prefilled() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    let group_id = h.group("test-slug").await;
    let post_id = h.post(&author, "original", Some(group_id)).await;
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", post_id))
        .insert_header(h.bearer(&author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["context"]["is_edit"], true);
    assert_eq!(body["context"]["form"]["text"], "original");
    assert_eq!(body["context"]["form"]["group"], group_id.to_string());
    assert_eq!(body["context"]["post"]["id"], post_id);
}

#[actix_web::test]
async fn test_author_edit_updates_post() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    let post_id = h.post(&author, "original", None).await;
    let before = h.posts.find_by_id(post_id).await.unwrap().unwrap();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post_id))
        .insert_header(h.bearer(&author))
        .set_form([("text", "revised")])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", post_id));

    let after = h.posts.find_by_id(post_id).await.unwrap().unwrap();
    assert_eq!(after.text, "revised");
    assert_eq!(after.pub_date, before.pub_date);
}

#[actix_web::test]
async fn test_author_empty_edit_rerenders() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    let post_id = h.post(&author, "original", None).await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post_id))
        .insert_header(h.bearer(&author))
        .set_form([("text", "")])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["view"], "posts/create_post");
    assert_eq!(body["context"]["is_edit"], true);
    assert_eq!(body["context"]["errors"]["text"][0], REQUIRED_MESSAGE);

    let post = h.posts.find_by_id(post_id).await.unwrap().unwrap();
    assert_eq!(post.text, "original");
}

#[actix_web::test]
async fn test_edit_missing_post_is_not_found() {
    let h = Harness::new();
    let author = h.user("auth", false).await;
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/posts/404/edit/")
        .insert_header(h.bearer(&author))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// Accounts

#[actix_web::test]
async fn test_signup_then_login() {
    let h = Harness::new();
    let app = app!(h);

    let signup = json!({
        "username": "newcomer",
        "email": "newcomer@example.com",
        "password": "correct horse"
    });
    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_json(&signup)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_json(&signup)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(json!({"username": "newcomer", "password": "wrong password"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(json!({"username": "newcomer", "password": "correct horse"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/create/")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_signup_validation() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_json(json!({"username": "has space", "email": "nope", "password": "short"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(h.users.find_by_username("has space").await.unwrap().is_none());
}

#[actix_web::test]
async fn test_login_page_echoes_next() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/auth/login/?next=/create/")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["view"], "users/login");
    assert_eq!(body["context"]["next"], "/create/");
}

// Group administration

#[actix_web::test]
async fn test_group_admin_requires_admin_role() {
    let h = Harness::new();
    let member = h.user("member", false).await;
    let app = app!(h);
    let group = json!({"title": "Cats", "slug": "cats", "description": "About cats"});

    let req = test::TestRequest::post()
        .uri("/admin/groups/")
        .set_json(&group)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/admin/groups/")
        .insert_header(h.bearer(&member))
        .set_json(&group)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );
    assert!(h.groups.find_by_slug("cats").await.unwrap().is_none());
}

#[actix_web::test]
async fn test_admin_creates_and_deletes_group() {
    let h = Harness::new();
    let admin = h.user("root", true).await;
    let app = app!(h);
    let group = json!({"title": "Cats", "slug": "cats", "description": "About cats"});

    let req = test::TestRequest::post()
        .uri("/admin/groups/")
        .insert_header(h.bearer(&admin))
        .set_json(&group)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["slug"], "cats");
    let group_id = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/admin/groups/")
        .insert_header(h.bearer(&admin))
        .set_json(&group)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );

    let post_id = h.post(&admin, "about cats", Some(group_id)).await;

    let req = test::TestRequest::delete()
        .uri("/admin/groups/cats/")
        .insert_header(h.bearer(&admin))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let post = h.posts.find_by_id(post_id).await.unwrap().unwrap();
    assert_eq!(post.group_id, None);
    assert_eq!(post.text, "about cats");

    let req = test::TestRequest::get().uri("/group/cats/").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_invalid_group_slug_is_rejected() {
    let h = Harness::new();
    let admin = h.user("root", true).await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/admin/groups/")
        .insert_header(h.bearer(&admin))
        .set_json(json!({"title": "Bad", "slug": "Not A Slug", "description": "x"}))
        .to_request();

    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[actix_web::test]
async fn test_health_reports_storage() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "up");
}

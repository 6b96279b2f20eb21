use fake::{Fake, faker::internet::en::SafeEmail};
use reqwest::cookie::CookieStore;

use crate::helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn register_returns_201_with_public_user_view() {
    let app = TestApp::new().await;
    let email: String = SafeEmail().fake();

    let response = app.post_register(&email, PASSWORD).await;

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["email"], email.as_str());
    assert_eq!(body["is_active"], true);
    assert_eq!(body["is_superuser"], false);
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_rejects_duplicates_and_bad_input_with_400() {
    let app = TestApp::new().await;
    let email: String = SafeEmail().fake();
    assert_eq!(app.post_register(&email, PASSWORD).await.status().as_u16(), 201);

    let test_cases = [
        (email.as_str(), PASSWORD, "duplicate email"),
        ("not-an-email", PASSWORD, "invalid email"),
        ("short@example.com", "short", "password too short"),
    ];

    for (email, password, description) in test_cases {
        let response = app.post_register(email, password).await;
        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not reject registration with {description}"
        );
    }
}

#[tokio::test]
async fn cookie_login_sets_session_and_logout_clears_it() {
    let app = TestApp::new().await;
    let email = app.signed_in_user().await;

    let url = reqwest::Url::parse(&app.address).unwrap();
    let cookies = app.cookie_jar.cookies(&url).expect("session cookie missing");
    assert!(cookies.to_str().unwrap().contains("portal_session="));

    let me = app.get("/users/me").await;
    assert_eq!(me.status().as_u16(), 200);
    let body: serde_json::Value = me.json().await.unwrap();
    assert_eq!(body["email"], email.as_str());

    let logout = app.post_logout("token-cookie", None).await;
    assert_eq!(logout.status().as_u16(), 204);

    assert_eq!(app.get("/users/me").await.status().as_u16(), 401);
}

#[tokio::test]
async fn bearer_login_returns_token_usable_on_protected_routes() {
    let app = TestApp::new().await;
    let email: String = SafeEmail().fake();
    app.post_register(&email, PASSWORD).await;

    let response = app.post_login("token-api", &email, PASSWORD).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    let me = app.get_with_bearer("/users/me", &token).await;
    assert_eq!(me.status().as_u16(), 200);

    let logout = app.post_logout("token-api", Some(&token)).await;
    assert_eq!(logout.status().as_u16(), 204);
}

#[tokio::test]
async fn login_with_wrong_password_or_unknown_user_returns_401() {
    let app = TestApp::new().await;
    let email: String = SafeEmail().fake();
    app.post_register(&email, PASSWORD).await;

    let test_cases = [
        (email.as_str(), "wrong-password-123"),
        ("nobody@example.com", PASSWORD),
        ("not-an-email", PASSWORD),
    ];

    for (email, password) in test_cases {
        for flavour in ["token-cookie", "token-api"] {
            let response = app.post_login(flavour, email, password).await;
            assert_eq!(response.status().as_u16(), 401, "{flavour} login as {email}");
        }
    }
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = TestApp::new().await;

    assert_eq!(app.get("/users/me").await.status().as_u16(), 401);
    assert_eq!(
        app.get_with_bearer("/users/me", "garbage").await.status().as_u16(),
        401
    );
    assert_eq!(app.post_logout("token-api", None).await.status().as_u16(), 401);
    assert_eq!(app.post_logout("token-cookie", None).await.status().as_u16(), 401);
}

#[tokio::test]
async fn index_greets_anonymous_and_signed_in_users() {
    let app = TestApp::new().await;

    let body: serde_json::Value = app.get("/").await.json().await.unwrap();
    assert_eq!(body["user"], "anonymous");

    let email = app.signed_in_user().await;
    let body: serde_json::Value = app.get("/").await.json().await.unwrap();
    assert_eq!(body["user"], email.as_str());
}

use secrecy::Secret;
use tempfile::TempDir;
use testcontainers_modules::{postgres, testcontainers::runners::AsyncRunner};

use crate::helpers::{PASSWORD, TestApp, png_bytes, test_settings};

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn postgres_backed_portal_persists_users_and_attachments() {
    let container = postgres::Postgres::default().start().await.unwrap();
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();

    let blob_root = TempDir::new().unwrap();
    let mut settings = test_settings(&blob_root);
    settings.database.url = Some(Secret::new(format!(
        "postgres://postgres:postgres@{host}:{port}/postgres"
    )));
    let app = TestApp::spawn(settings, blob_root).await;

    let email = app.signed_in_user().await;
    let me: serde_json::Value = app.get("/users/me").await.json().await.unwrap();
    assert_eq!(me["email"], email.as_str());

    assert_eq!(app.post_register(&email, PASSWORD).await.status().as_u16(), 400);

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(png_bytes(24, 24, 3))
            .file_name("p.png")
            .mime_str("image/png")
            .unwrap(),
    );
    let body: serde_json::Value = app.post_attachments(form).await.json().await.unwrap();
    let id = body["ids"][0].as_str().unwrap();

    let fetched = app.get(&format!("/attachments/{id}")).await;
    assert_eq!(fetched.status().as_u16(), 200);
}

use reqwest::multipart::{Form, Part};

use crate::helpers::{TestApp, gif_bytes, png_bytes};

fn file_part(bytes: Vec<u8>, name: &str, mime: &str) -> Part {
    Part::bytes(bytes).file_name(name.to_string()).mime_str(mime).unwrap()
}

async fn upload_one(app: &TestApp, bytes: Vec<u8>) -> String {
    let form = Form::new()
        .part("file", file_part(bytes, "picture.png", "image/png"))
        .text("description", "holiday");
    let response = app.post_attachments(form).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    body["ids"][0].as_str().unwrap().to_string()
}

#[tokio::test]
async fn upload_then_fetch_original_and_thumbnail() {
    let app = TestApp::new().await;
    app.signed_in_user().await;
    let original = png_bytes(400, 200, 10);

    let id = upload_one(&app, original.clone()).await;
    assert_eq!(id.len(), 64);

    let response = app.get(&format!("/attachments/{id}")).await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert!(response.headers().contains_key("cache-control"));
    assert_eq!(response.bytes().await.unwrap().as_ref(), original.as_slice());

    let thumbnail = app.get(&format!("/attachments/{id}/thumbnail")).await;
    assert_eq!(thumbnail.status().as_u16(), 200);
    assert_eq!(thumbnail.headers()["content-type"], "image/jpeg");
    let bytes = thumbnail.bytes().await.unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert!(decoded.width() <= 128 && decoded.height() <= 128);
}

#[tokio::test]
async fn identical_content_yields_identical_ids() {
    let app = TestApp::new().await;
    app.signed_in_user().await;

    let first = upload_one(&app, png_bytes(32, 32, 99)).await;
    let second = upload_one(&app, png_bytes(32, 32, 99)).await;
    let different = upload_one(&app, png_bytes(32, 32, 100)).await;

    assert_eq!(first, second);
    assert_ne!(first, different);
}

#[tokio::test]
async fn multiple_files_in_one_request_return_all_ids() {
    let app = TestApp::new().await;
    app.signed_in_user().await;

    let form = Form::new()
        .part("file", file_part(png_bytes(16, 16, 1), "a.png", "image/png"))
        .part("file", file_part(png_bytes(16, 16, 2), "b.png", "image/png"))
        .text("description", "pair");
    let response = app.post_attachments(form).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["ids"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn rejected_uploads_answer_400() {
    let app = TestApp::new().await;
    app.signed_in_user().await;

    let test_cases = [
        (
            Form::new().part("file", file_part(gif_bytes(), "anim.gif", "image/gif")),
            "disallowed type",
        ),
        (
            Form::new().part("file", file_part(b"plain words".to_vec(), "x.png", "image/png")),
            "unrecognised content",
        ),
        (
            Form::new().part(
                "file",
                file_part(vec![0u8; 1024 * 1024 + 1], "big.png", "image/png"),
            ),
            "too large",
        ),
        (Form::new().text("description", "nothing attached"), "no file"),
    ];

    for (form, description) in test_cases {
        let response = app.post_attachments(form).await;
        assert_eq!(response.status().as_u16(), 400, "{description}");
    }
}

#[tokio::test]
async fn attachments_are_private_to_their_owner() {
    let app = TestApp::new().await;
    app.signed_in_user().await;
    let id = upload_one(&app, png_bytes(20, 20, 7)).await;

    let stranger = app.fresh_client();
    assert_eq!(
        stranger.get(&format!("/attachments/{id}")).await.status().as_u16(),
        401
    );

    stranger.signed_in_user().await;
    assert_eq!(
        stranger.get(&format!("/attachments/{id}")).await.status().as_u16(),
        403
    );
    assert_eq!(
        stranger
            .get(&format!("/attachments/{id}/thumbnail"))
            .await
            .status()
            .as_u16(),
        403
    );
}

#[tokio::test]
async fn content_owned_by_someone_else_answers_409() {
    let app = TestApp::new().await;
    app.signed_in_user().await;
    upload_one(&app, png_bytes(24, 24, 3)).await;

    let other = app.fresh_client();
    other.signed_in_user().await;
    let form = Form::new()
        .part("file", file_part(png_bytes(24, 24, 3), "mine.png", "image/png"))
        .text("description", "mine too");
    let response = other.post_attachments(form).await;

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn unknown_or_malformed_ids_answer_404() {
    let app = TestApp::new().await;
    app.signed_in_user().await;

    for id in ["0".repeat(64), "not-hex".to_string()] {
        let response = app.get(&format!("/attachments/{id}")).await;
        assert_eq!(response.status().as_u16(), 404, "{id}");
    }
}

#[tokio::test]
async fn upload_requires_a_session() {
    let app = TestApp::new().await;

    let form = Form::new().part("file", file_part(png_bytes(8, 8, 0), "a.png", "image/png"));
    assert_eq!(app.post_attachments(form).await.status().as_u16(), 401);
}

//! End-to-end tests over the full router, backed by the in-memory store.
//!
//! Every request goes through the real route table, extractors, services,
//! and envelope rendering; only the storage backend and (where noted) the
//! external file host are substituted.

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    routing::post,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use speakbook_core::Database;
use speakbook_server::{
    infra::{app_state::AppState, config::Config},
    routes::create_router,
    upload::UploadClient,
};
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_url: None,
        upload_endpoint: "http://127.0.0.1:9/unreachable".to_string(),
        static_dir: None,
    }
}

fn app() -> Router {
    let config = test_config();
    let uploader = UploadClient::new(config.upload_endpoint.clone());
    create_router(AppState::new(Database::new_memory(), uploader, config))
}

fn app_with_upload_endpoint(endpoint: String) -> Router {
    let mut config = test_config();
    config.upload_endpoint = endpoint.clone();
    create_router(AppState::new(
        Database::new_memory(),
        UploadClient::new(endpoint),
        config,
    ))
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send_empty(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

fn sample_book() -> Value {
    json!({
        "title": "The Farm",
        "author": "A. Author",
        "description": "Animal sounds on the farm",
        "category": "animals",
        "coverImageUrl": "https://files.example/farm.png",
        "pages": 12,
        "hotspots": [
            {
                "label": "cow",
                "x": 10, "y": 20, "width": 30, "height": 30,
                "audioUrl": "https://files.example/moo.mp3",
                "sortOrder": 0
            },
            {
                "label": "sheep",
                "x": 50, "y": 50, "width": 20, "height": 20,
                "audioUrl": "https://files.example/baa.mp3",
                "sortOrder": 1
            }
        ]
    })
}

#[tokio::test]
async fn create_book_rejects_blank_title_in_envelope() {
    let app = app();
    let mut book = sample_book();
    book["title"] = json!("   ");

    let (status, body) = send_json(&app, "POST", "/api/books", book).await;
    // domain failures ride the envelope, not the status line
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Book title must not be blank"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn create_then_get_book_round_trip() {
    let app = app();

    let (status, body) = send_json(&app, "POST", "/api/books", sample_book()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let created = &body["data"];
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["status"], json!("published"));
    assert!(created["publishedAt"].is_string());
    assert_eq!(created["hotspots"].as_array().unwrap().len(), 2);

    let (_, body) = send_empty(&app, "GET", &format!("/api/books/{id}")).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["title"], json!("The Farm"));
    assert_eq!(body["data"]["hotspots"][0]["label"], json!("cow"));
}

#[tokio::test]
async fn update_replaces_hotspots_wholesale() {
    let app = app();
    let (_, body) = send_json(&app, "POST", "/api/books", sample_book()).await;
    let id = body["data"]["id"].as_i64().unwrap();

    let mut update = sample_book();
    update["status"] = json!("published");
    update["hotspots"] = json!([
        {
            "label": "horse",
            "x": 40, "y": 40, "width": 10, "height": 10,
            "audioUrl": "https://files.example/neigh.mp3",
            "sortOrder": 0
        }
    ]);

    let (_, body) = send_json(&app, "PUT", &format!("/api/books/{id}"), update).await;
    assert_eq!(body["success"], json!(true));
    let hotspots = body["data"]["hotspots"].as_array().unwrap();
    assert_eq!(hotspots.len(), 1);
    assert_eq!(hotspots[0]["label"], json!("horse"));
}

#[tokio::test]
async fn update_without_status_demotes_to_draft_and_keeps_publish_time() {
    let app = app();
    let (_, body) = send_json(&app, "POST", "/api/books", sample_book()).await;
    let id = body["data"]["id"].as_i64().unwrap();
    let published_at = body["data"]["publishedAt"].clone();

    let mut update = sample_book();
    update.as_object_mut().unwrap().remove("hotspots");

    let (_, body) = send_json(&app, "PUT", &format!("/api/books/{id}"), update).await;
    assert_eq!(body["data"]["status"], json!("draft"));
    // first-publish time survives the demotion
    assert_eq!(body["data"]["publishedAt"], published_at);
}

#[tokio::test]
async fn drafts_are_invisible_to_public_listings() {
    let app = app();
    send_json(&app, "POST", "/api/books", sample_book()).await;
    let (_, body) = send_json(&app, "POST", "/api/books/draft", sample_book()).await;
    assert_eq!(body["data"]["status"], json!("draft"));

    let (_, body) = send_empty(&app, "GET", "/api/books").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = send_empty(&app, "GET", "/api/books/category/animals").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn paged_books_filter_by_keyword_and_derive_flags() {
    let app = app();
    for i in 0..3 {
        let mut book = sample_book();
        book["title"] = json!(format!("Farm Tales {i}"));
        send_json(&app, "POST", "/api/books", book).await;
    }
    let mut other = sample_book();
    other["title"] = json!("Ocean Life");
    other["description"] = json!("Under the sea");
    send_json(&app, "POST", "/api/books", other).await;

    let (_, body) = send_empty(
        &app,
        "GET",
        "/api/books/page?page=1&pageSize=2&searchKeyword=farm",
    )
    .await;
    let page = &body["data"];
    assert_eq!(page["totalElements"], json!(3));
    assert_eq!(page["totalPages"], json!(2));
    assert_eq!(page["content"].as_array().unwrap().len(), 2);
    assert_eq!(page["first"], json!(true));
    assert_eq!(page["last"], json!(false));

    let (_, body) = send_empty(
        &app,
        "GET",
        "/api/books/page?page=2&pageSize=2&searchKeyword=farm",
    )
    .await;
    let page = &body["data"];
    assert_eq!(page["content"].as_array().unwrap().len(), 1);
    assert_eq!(page["last"], json!(true));
}

#[tokio::test]
async fn delete_missing_book_reports_not_found() {
    let app = app();
    let (status, body) = send_empty(&app, "DELETE", "/api/books/42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Book not found, ID: 42"));
}

#[tokio::test]
async fn audio_crud_and_keyword_paging() {
    let app = app();
    let (_, body) = send_json(
        &app,
        "POST",
        "/api/audios",
        json!({"name": "Cat Meow", "url": "https://files.example/meow.mp3", "category": "animals"}),
    )
    .await;
    assert_eq!(body["success"], json!(true));
    let id = body["data"]["id"].as_i64().unwrap();

    send_json(
        &app,
        "POST",
        "/api/audios",
        json!({"name": "Door Bell", "url": "https://files.example/bell.mp3", "category": "household"}),
    )
    .await;

    // keyword matches name or category, case-insensitively
    let (_, body) = send_empty(&app, "GET", "/api/audios/page?keyword=CAT").await;
    let content = body["data"]["content"].as_array().unwrap();
    assert_eq!(content.len(), 1);
    assert_eq!(content[0]["name"], json!("Cat Meow"));

    let (_, body) = send_json(
        &app,
        "PUT",
        &format!("/api/audios/{id}"),
        json!({"name": "Cat Purr", "url": "https://files.example/purr.mp3"}),
    )
    .await;
    assert_eq!(body["data"]["name"], json!("Cat Purr"));
    // unset optionals are cleared on update
    assert!(body["data"].get("category").is_none() || body["data"]["category"].is_null());

    let (_, body) = send_empty(&app, "DELETE", &format!("/api/audios/{id}")).await;
    assert_eq!(body["success"], json!(true));

    let (_, body) = send_empty(&app, "GET", &format!("/api/audios/{id}")).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!(format!("Audio not found, ID: {id}")));
}

#[tokio::test]
async fn audio_validation_rejects_blank_name() {
    let app = app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/audios",
        json!({"url": "https://files.example/x.mp3"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Audio name must not be blank"));
}

#[tokio::test]
async fn student_registration_rejects_taken_email() {
    let app = app();
    let (_, body) = send_json(
        &app,
        "POST",
        "/student",
        json!({"name": "Mia", "email": "mia@example.com"}),
    )
    .await;
    assert_eq!(body["success"], json!(true));
    let id = body["data"].as_i64().unwrap();

    let (_, body) = send_json(
        &app,
        "POST",
        "/student",
        json!({"name": "Other", "email": "mia@example.com"}),
    )
    .await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["message"],
        json!("Email: mia@example.com has been taken")
    );

    let (_, body) = send_empty(&app, "GET", &format!("/student/{id}")).await;
    assert_eq!(body["data"]["name"], json!("Mia"));
    assert_eq!(body["data"]["email"], json!("mia@example.com"));
}

fn multipart_request(uri: &str, parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Request<Body> {
    let boundary = "------------------------test-boundary";
    let mut body = Vec::new();
    for (name, file, bytes) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn upload_rejects_empty_and_wrongly_typed_files() {
    let app = app();

    let request = multipart_request(
        "/api/upload/image",
        &[("file", Some(("empty.png", "image/png")), b"")],
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Please select an image to upload"));

    let request = multipart_request(
        "/api/upload/audio",
        &[("file", Some(("notes.txt", "text/plain")), b"hello")],
    );
    let (_, body) = send(&app, request).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["message"],
        json!("Unsupported media type: unsupported audio file format, please upload MP3, WAV, OGG or M4A")
    );

    // no file part at all behaves like an empty payload
    let request = multipart_request("/api/upload/audio", &[("name", None, b"just a name")]);
    let (_, body) = send(&app, request).await;
    assert_eq!(
        body["message"],
        json!("Please select an audio file to upload")
    );
}

async fn spawn_file_host(status: StatusCode, reply: &'static str) -> String {
    let host = Router::new().route("/", post(move || async move { (status, reply) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, host).await.unwrap();
    });
    format!("http://{addr}/")
}

#[tokio::test]
async fn upload_proxies_to_file_host_and_returns_url() {
    let endpoint = spawn_file_host(StatusCode::OK, "https://files.example/abc123.png").await;
    let app = app_with_upload_endpoint(endpoint);

    let request = multipart_request(
        "/api/upload/image",
        &[("file", Some(("cover.png", "image/png")), b"\x89PNG fake")],
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["url"], json!("https://files.example/abc123.png"));
    assert_eq!(body["data"]["fileName"], json!("cover.png"));
}

#[tokio::test]
async fn upload_surfaces_file_host_failure_in_envelope() {
    let endpoint = spawn_file_host(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
    let app = app_with_upload_endpoint(endpoint);

    let request = multipart_request(
        "/api/upload/image",
        &[("file", Some(("cover.png", "image/png")), b"\x89PNG fake")],
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["message"],
        json!("Upload failed: file host returned status 500 Internal Server Error")
    );
}

#[tokio::test]
async fn audio_upload_creates_record_with_size_and_default_name() {
    let endpoint = spawn_file_host(StatusCode::OK, "https://files.example/song.mp3").await;
    let app = app_with_upload_endpoint(endpoint);

    let payload = b"ID3 fake mp3 bytes";
    let request = multipart_request(
        "/api/audios/upload",
        &[
            ("file", Some(("song.mp3", "audio/mpeg")), payload),
            ("category", None, b"music"),
        ],
    );
    let (_, body) = send(&app, request).await;
    assert_eq!(body["success"], json!(true));
    let audio = &body["data"];
    // no name field given, so the file name is used
    assert_eq!(audio["name"], json!("song.mp3"));
    assert_eq!(audio["url"], json!("https://files.example/song.mp3"));
    assert_eq!(audio["fileSize"], json!(payload.len()));
    assert_eq!(audio["category"], json!("music"));

    let id = audio["id"].as_i64().unwrap();
    let (_, body) = send_empty(&app, "GET", &format!("/api/audios/{id}")).await;
    assert_eq!(body["data"]["name"], json!("song.mp3"));
}

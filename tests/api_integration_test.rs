mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use common::{red_gif, setup};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "---------------------------974767299852498929531610575";

/// Multipart body with one file part plus plain text fields.
fn multipart_body(file_name: &str, content_type: &str, bytes: &[u8], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| panic!("not json: {:?}", String::from_utf8_lossy(&body)))
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/media")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let env = setup().await;
    let (status, json) = send(&env.app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "connected");
    assert_eq!(json["store"], "ready");
}

#[tokio::test]
async fn test_upload_list_get_count_delete() {
    let env = setup().await;
    let app = env.app();

    // 1. Upload an image
    let body = multipart_body(
        "sunset.gif",
        "image/gif",
        &red_gif(400, 100),
        &[("description", "Evening sky"), ("tags", "sky, Evening")],
    );
    let (status, json) = send(&app, upload_request(body)).await;
    if status != StatusCode::CREATED {
        panic!("Upload failed with status {}: {}", status, json);
    }
    let id = json["id"].as_i64().unwrap();
    assert_eq!(json["file_name"], "sunset.gif");
    assert_eq!(json["file_mime_type"], "image/gif");
    assert_eq!(json["generic_type"], "image");
    assert_eq!(json["www_path"], "/files/media/sunset.gif");
    assert_eq!(json["preview_www_path"], "/files/media/sunset_200x200.png");
    assert_eq!(json["description"], "Evening sky");

    // 2. Upload a text document
    let body = multipart_body("notes.txt", "text/plain", b"Hello, media store!", &[]);
    let (status, json) = send(&app, upload_request(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
    assert_eq!(json["generic_type"], "other");
    assert!(json["preview_www_path"].is_null());

    // 3. Same name again is refused
    let body = multipart_body("notes.txt", "text/plain", b"again", &[]);
    let (status, json) = send(&app, upload_request(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("notes.txt"));

    // 4. List images only
    let (status, json) = send(&app, get("/media?types=image")).await;
    assert_eq!(status, StatusCode::OK);
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_i64().unwrap(), id);

    // 5. Tag filter and count
    let (_, json) = send(&app, get("/media/count?tags=evening")).await;
    assert_eq!(json["total"], 1);
    let (_, json) = send(&app, get("/media/count")).await;
    assert_eq!(json["total"], 2);
    let (status, _) = send(&app, get("/media?types=pictures")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 6. Get by id
    let (status, json) = send(&app, get(&format!("/media/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tags"], "sky, Evening");

    // 7. Delete
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/media/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = send(&app, get(&format!("/media/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());
    assert_eq!(env.stored_files(), vec!["notes.txt"]);
}

#[tokio::test]
async fn test_edit_and_remove_thumbnail() {
    let env = setup().await;
    let app = env.app();

    let body = multipart_body("logo.gif", "image/gif", &red_gif(20, 20), &[]);
    let (_, json) = send(&app, upload_request(body)).await;
    let id = json["id"].as_i64().unwrap();

    let body = multipart_body("", "application/octet-stream", b"", &[("description", "Company logo")]);
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/media/{}", id))
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK, "{}", json);
    assert_eq!(json["outcome"], "updated");
    assert_eq!(json["object"]["description"], "Company logo");
    assert_eq!(json["object"]["file_name_on_disk"], "logo.gif");

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/media/{}/thumbnail", id))
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], true);
    assert_eq!(env.stored_files(), vec!["logo.gif"]);
}

#[tokio::test]
async fn test_mime_type_lookup() {
    let env = setup().await;
    let app = env.app();

    let (status, json) = send(&app, get("/mime-types/application/pdf")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["known"], true);
    assert_eq!(json["suffix"], "pdf");
    assert_eq!(json["generic_type"], "document");
    assert_eq!(json["podcastable"], true);
    assert_eq!(json["icon"], "pdf.jpg");

    let (status, json) = send(&app, get("/mime-types/text/x-unknown")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["known"], false);
    assert_eq!(json["generic_type"], "other");
    assert_eq!(json["icon"], "generic.jpg");

    let (status, _) = send(&app, get("/mime-types/image/png%3Bq%3D1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_project_header() {
    let env = setup().await;
    let app = env.app();

    let body = multipart_body("a.gif", "image/gif", &red_gif(10, 10), &[]);
    let (status, _) = send(&app, upload_request(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    for bad in ["abc", "0", "-3"] {
        let request = Request::builder()
            .uri("/media")
            .header("X-Project-Id", bad)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", bad);
    }

    let request = Request::builder()
        .uri("/media/count")
        .header("X-Project-Id", "2")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 0);
}

#[tokio::test]
async fn test_openapi_document() {
    let env = setup().await;
    let (status, json) = send(&env.app(), get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/media"].is_object());
    assert!(json["paths"]["/mime-types/{type}/{subtype}"].is_object());
}

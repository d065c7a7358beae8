mod common;

use axum::http::StatusCode;
use common::*;

#[tokio::test]
async fn test_upload_returns_record() {
    let t = setup("alice:secret").await;
    let cookie = login(&t.app, "alice", "secret").await;

    let (status, json) = upload(&t.app, &cookie, "notes.txt", Some("labs"), b"Integration test content").await;
    assert_eq!(status, StatusCode::OK);

    let id = json["id"].as_i64().unwrap();
    assert_eq!(json["name"], "notes.txt");
    assert_eq!(json["size"], 24);
    assert_eq!(json["data"], format!("/files/{}", id));
    assert!(json["timestamp"].as_i64().unwrap() > 0);

    let on_disk = t.config.upload_dir.join("notes.txt");
    assert_eq!(std::fs::read(on_disk).unwrap(), b"Integration test content");

    let (_, listing) = list(&t.app, Some(&cookie), "labs").await;
    assert_eq!(names(&listing), vec!["notes.txt"]);
}

#[tokio::test]
async fn test_same_name_uploads_get_suffixes() {
    let t = setup("alice:secret").await;
    let cookie = login(&t.app, "alice", "secret").await;

    let mut stored = Vec::new();
    for content in [&b"one"[..], b"two", b"three"] {
        let (status, json) = upload(&t.app, &cookie, "report.pdf", None, content).await;
        assert_eq!(status, StatusCode::OK);
        stored.push(json["name"].as_str().unwrap().to_string());
    }
    assert_eq!(stored, vec!["report.pdf", "report_1.pdf", "report_2.pdf"]);

    assert_eq!(std::fs::read(t.config.upload_dir.join("report.pdf")).unwrap(), b"one");
    assert_eq!(std::fs::read(t.config.upload_dir.join("report_1.pdf")).unwrap(), b"two");
    assert_eq!(std::fs::read(t.config.upload_dir.join("report_2.pdf")).unwrap(), b"three");
}

#[tokio::test]
async fn test_filename_is_sanitized() {
    let t = setup("alice:secret").await;
    let cookie = login(&t.app, "alice", "secret").await;

    let (status, json) = upload(&t.app, &cookie, "../../etc/my notes.txt", None, b"x").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "etc_my_notes.txt");
    assert!(t.config.upload_dir.join("etc_my_notes.txt").exists());

    let (status, json) = upload(&t.app, &cookie, "!!!", None, b"x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid filename");
}

#[tokio::test]
async fn test_unknown_category_falls_back_to_study() {
    let t = setup("alice:secret").await;
    let cookie = login(&t.app, "alice", "secret").await;

    upload(&t.app, &cookie, "a.txt", Some("homework"), b"a").await;
    upload(&t.app, &cookie, "b.txt", None, b"b").await;
    upload(&t.app, &cookie, "c.txt", Some("tests"), b"c").await;

    let (_, study) = list(&t.app, Some(&cookie), "study").await;
    assert_eq!(names(&study), vec!["b.txt", "a.txt"]);

    let (_, tests) = list(&t.app, Some(&cookie), "tests").await;
    assert_eq!(names(&tests), vec!["c.txt"]);

    let (status, homework) = list(&t.app, Some(&cookie), "homework").await;
    assert_eq!(status, StatusCode::OK);
    assert!(homework.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_category_after_file_part_is_honoured() {
    let t = setup("alice:secret").await;
    let cookie = login(&t.app, "alice", "secret").await;

    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"late.txt\"\r\nContent-Type: text/plain\r\n\r\nlate\r\n\
             --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"category\"\r\n\r\nsyllabus\r\n--{BOUNDARY}--\r\n"
        )
        .as_bytes(),
    );
    let (status, _, _) = send(&t.app, upload_request(Some(&cookie), body)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, syllabus) = list(&t.app, Some(&cookie), "syllabus").await;
    assert_eq!(names(&syllabus), vec!["late.txt"]);
}

#[tokio::test]
async fn test_upload_rejections() {
    let t = setup("alice:secret").await;
    let cookie = login(&t.app, "alice", "secret").await;

    let (status, _, body) = send(&t.app, upload_request(None, multipart_body(Some("a.txt"), None, b"a"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Unauthorized");

    let (status, _, body) = send(&t.app, upload_request(Some(&cookie), multipart_body(None, Some("labs"), b""))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "No file");

    let (status, _, body) = send(&t.app, upload_request(Some(&cookie), multipart_body(Some(""), None, b"a"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "No file selected");

    // Nothing was stored by the rejected requests
    let (_, study) = list(&t.app, Some(&cookie), "study").await;
    assert!(study.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let t = setup_with("alice:secret", |config| config.max_file_size = 1024).await;
    let cookie = login(&t.app, "alice", "secret").await;

    let (status, _) = upload(&t.app, &cookie, "big.bin", None, &vec![b'x'; 4096]).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!t.config.upload_dir.join("big.bin").exists());

    let (_, study) = list(&t.app, Some(&cookie), "study").await;
    assert!(study.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_openapi_documents_file_routes() {
    let t = setup("").await;

    let (status, _, body) = send(&t.app, get("/api-docs/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/files/upload"));
    assert!(paths.contains_key("/api/files/{category}"));
    assert!(paths.contains_key("/api/files/{id}"));
}

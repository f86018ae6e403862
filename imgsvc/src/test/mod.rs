//! HTTP-level tests over the full router, with local storage and the in-memory repository.

use crate::{Application, Config, tasks::average_pixel};
use axum::http::StatusCode;
use axum_test::{
    TestServer,
    multipart::{MultipartForm, Part},
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use std::io::Cursor;
use std::path::Path;

fn test_config(upload_dir: &Path) -> Config {
    let mut config = Config::default();
    config.storage.upload_path = Some(upload_dir.to_path_buf());
    config
}

async fn test_server(config: Config) -> TestServer {
    Application::new(config)
        .await
        .expect("Failed to create application")
        .into_test_server()
}

/// 20x20 black PNG whose first three pixels are pure red, green and blue
fn fixture_png() -> Vec<u8> {
    let mut img = RgbImage::new(20, 20);
    img.put_pixel(0, 0, Rgb([255, 0, 0]));
    img.put_pixel(1, 0, Rgb([0, 255, 0]));
    img.put_pixel(2, 0, Rgb([0, 0, 255]));

    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn image_form(bytes: Vec<u8>, filename: &str, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(bytes).file_name(filename).mime_type(mime_type))
}

async fn upload(server: &TestServer, filename: &str) -> Value {
    let response = server
        .post("/images")
        .multipart(image_form(fixture_png(), filename, "image/png"))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[test_log::test(tokio::test)]
async fn test_upload_returns_envelope_with_task_results() {
    let upload_dir = tempfile::tempdir().unwrap();
    let server = test_server(test_config(upload_dir.path())).await;

    let body = upload(&server, "image.png").await;

    let image = body["image"].as_str().unwrap();
    let (key, rest) = image.split_once('_').unwrap();
    assert_eq!(key.len(), 5);
    assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(rest, "image.png");
    assert_eq!(body["image_url"], format!("http://localhost:8080/images/view/{image}"));

    let mean = body["result"][average_pixel::NAME].as_f64().unwrap();
    assert!((mean - 0.6375).abs() < 1e-9);
    assert_eq!(body["result"]["errors"], serde_json::json!({}));

    assert!(upload_dir.path().join(image).is_file());
}

#[test_log::test(tokio::test)]
async fn test_undecodable_image_is_stored_with_task_error() {
    let upload_dir = tempfile::tempdir().unwrap();
    let server = test_server(test_config(upload_dir.path())).await;

    let response = server
        .post("/images")
        .multipart(image_form(b"not an image".to_vec(), "broken.png", "image/png"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert!(body["result"].get(average_pixel::NAME).is_none());
    assert!(body["result"]["errors"][average_pixel::NAME].is_string());
}

#[test_log::test(tokio::test)]
async fn test_disallowed_type_is_rejected() {
    let upload_dir = tempfile::tempdir().unwrap();
    let server = test_server(test_config(upload_dir.path())).await;

    let response = server
        .post("/images")
        .multipart(image_form(b"hello".to_vec(), "notes.txt", "text/plain"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "disallowed_type");
    assert_eq!(body["detail"], "File type not allowed");

    // Nothing was stored or recorded
    assert_eq!(std::fs::read_dir(upload_dir.path()).map(|d| d.count()).unwrap_or(0), 0);
    let history = server.get("/images").await.json::<Vec<Value>>();
    assert!(history.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_missing_file_is_rejected() {
    let upload_dir = tempfile::tempdir().unwrap();
    let server = test_server(test_config(upload_dir.path())).await;

    let response = server
        .post("/images")
        .multipart(MultipartForm::new().add_text("caption", "no file here"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "missing_file");
}

#[test_log::test(tokio::test)]
async fn test_oversized_upload_is_rejected() {
    let upload_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(upload_dir.path());
    config.max_image_size = 1024;
    let server = test_server(config).await;

    let response = server
        .post("/images")
        .multipart(image_form(vec![0u8; 8 * 1024], "big.png", "image/png"))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[test_log::test(tokio::test)]
async fn test_view_returns_stored_bytes() {
    let upload_dir = tempfile::tempdir().unwrap();
    let server = test_server(test_config(upload_dir.path())).await;

    let body = upload(&server, "image.png").await;
    let image = body["image"].as_str().unwrap();

    let response = server.get(&format!("/images/view/{image}")).await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(&response.as_bytes()[..], fixture_png().as_slice());
}

#[test_log::test(tokio::test)]
async fn test_view_unknown_image_is_not_found() {
    let upload_dir = tempfile::tempdir().unwrap();
    let server = test_server(test_config(upload_dir.path())).await;

    let response = server.get("/images/view/nothing_here.png").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["detail"], "File not found");
}

#[test_log::test(tokio::test)]
async fn test_history_is_newest_first_and_paginated() {
    let upload_dir = tempfile::tempdir().unwrap();
    let server = test_server(test_config(upload_dir.path())).await;

    let mut uploaded = Vec::new();
    for name in ["a.png", "b.png", "c.png"] {
        uploaded.push(upload(&server, name).await["image"].as_str().unwrap().to_string());
    }

    let history = server.get("/images").await.json::<Vec<Value>>();
    let names: Vec<&str> = history.iter().map(|item| item["image_name"].as_str().unwrap()).collect();
    let expected: Vec<&str> = uploaded.iter().rev().map(String::as_str).collect();
    assert_eq!(names, expected);

    let first = &history[0];
    assert_eq!(first["image_url"], format!("http://localhost:8080/images/view/{}", uploaded[2]));
    assert!(first["results"][average_pixel::NAME].is_number());
    assert!(first["uploaded_at"].is_string());

    let page = server
        .get("/images")
        .add_query_param("page", 2)
        .add_query_param("count", 2)
        .await
        .json::<Vec<Value>>();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["image_name"], uploaded[0].as_str());

    let past_end = server
        .get("/images")
        .add_query_param("page", 5)
        .await
        .json::<Vec<Value>>();
    assert!(past_end.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_health_and_openapi() {
    let upload_dir = tempfile::tempdir().unwrap();
    let server = test_server(test_config(upload_dir.path())).await;

    let health = server.get("/healthz").await;
    health.assert_status_ok();
    health.assert_text("OK");

    let doc = server.get("/openapi.json").await.json::<Value>();
    assert!(doc["paths"]["/images"]["post"].is_object());
    assert!(doc["paths"]["/images/view/{name}"]["get"].is_object());
}

#[test_log::test(tokio::test)]
async fn test_unknown_upload_type_fails_startup() {
    let upload_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(upload_dir.path());
    config.storage.upload_type = "ftp".to_string();

    let err = Application::new(config).await.err().expect("startup should fail");
    assert!(err.to_string().contains("unsupported upload_type"));
}

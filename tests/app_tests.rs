// Integration tests for the user-facing recording workflow
//
// These tests verify that download/upload without a recording are silent
// no-ops and that a finished recording reaches disk and the backend.

mod common;

use anyhow::Result;
use common::FakePlatform;
use screen_recorder::recorder::{Recorder, RecorderConfig};
use screen_recorder::transfer::TransferClient;
use screen_recorder::ScreenRecorderApp;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(platform: &FakePlatform, server: &MockServer) -> ScreenRecorderApp {
    let recorder = Recorder::spawn(platform.backend(), RecorderConfig::default());
    let transfer = TransferClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    ScreenRecorderApp::new(recorder, transfer, "recording.webm")
}

#[tokio::test]
async fn test_upload_without_recording_makes_no_request() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let platform = FakePlatform::new();
    let mut app = app(&platform, &server);

    assert!(app.upload().await?.is_none());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_upload_of_empty_recording_makes_no_request() -> Result<()> {
    let server = MockServer::start().await;
    let platform = FakePlatform::new();
    let mut app = app(&platform, &server);

    app.start().await?;
    platform.push(Vec::new()).await;
    let artifact = app.stop().await?.expect("artifact");
    assert!(artifact.is_empty());

    assert!(app.upload().await?.is_none());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_upload_while_recording_makes_no_request() -> Result<()> {
    let server = MockServer::start().await;
    let platform = FakePlatform::new();
    let mut app = app(&platform, &server);

    app.start().await?;
    platform.push(b"in progress".to_vec()).await;

    assert!(app.upload().await?.is_none());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_download_without_recording_writes_nothing() -> Result<()> {
    let server = MockServer::start().await;
    let platform = FakePlatform::new();
    let app = app(&platform, &server);
    let dir = TempDir::new()?;

    assert!(app.download(dir.path()).await?.is_none());
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_download_writes_recording_webm() -> Result<()> {
    let server = MockServer::start().await;
    let platform = FakePlatform::new();
    let app = app(&platform, &server);
    let dir = TempDir::new()?;

    app.start().await?;
    platform.push(b"abc".to_vec()).await;
    platform.push(b"def".to_vec()).await;
    app.stop().await?;

    let path = app.download(dir.path()).await?.expect("downloaded file");
    assert_eq!(path, dir.path().join("recording.webm"));
    assert_eq!(std::fs::read(&path)?, b"abcdef");

    Ok(())
}

#[tokio::test]
async fn test_upload_then_refreshes_listing() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/recordings"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 3, "filename": "recording.webm"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/recordings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 3, "filename": "recording.webm"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let platform = FakePlatform::new();
    let mut app = app(&platform, &server);

    app.start().await?;
    platform.push(b"video".to_vec()).await;
    app.stop().await?;

    let recording = app.upload().await?.expect("uploaded recording");
    assert_eq!(recording.id, "3");

    assert_eq!(app.recordings().len(), 1);
    assert_eq!(
        app.playback_url(&app.recordings()[0]),
        format!("{}/api/recordings/3", server.uri())
    );

    Ok(())
}

#[tokio::test]
async fn test_failed_refresh_does_not_fail_upload() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/recordings"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "x", "filename": "recording.webm"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/recordings"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let platform = FakePlatform::new();
    let mut app = app(&platform, &server);

    app.start().await?;
    platform.push(b"video".to_vec()).await;
    app.stop().await?;

    assert!(app.upload().await?.is_some());
    assert!(app.recordings().is_empty());
    assert!(app.refresh().await.is_err());

    Ok(())
}

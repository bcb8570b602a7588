#[path = "../../../helpers/pipeline_mocks.rs"]
mod pipeline_mocks;

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{post, put};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use reelcut::application::ports::{EncodeSession, MediaTranscoder, TranscodeError, TrimRequest};
use reelcut::infrastructure::encoding::FfmpegApiTranscoder;

use pipeline_mocks::InMemoryStore;

struct MockEncodeService {
    base_url: String,
    process_status: u16,
    uploads: Mutex<Vec<(String, Option<String>)>>,
    tasks: Mutex<Vec<serde_json::Value>>,
}

type Shared = Arc<MockEncodeService>;

async fn create_directory(headers: HeaderMap) -> impl IntoResponse {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Basic ffk") {
        return (StatusCode::UNAUTHORIZED, "bad key").into_response();
    }
    Json(serde_json::json!({ "directory": { "id": "dir-7" } })).into_response()
}

async fn create_file(
    State(service): State<Shared>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let file_name = body["file_name"].as_str().unwrap_or_default().to_string();
    let dir = body["dir_id"].as_str().unwrap_or_default().to_string();
    Json(serde_json::json!({
        "file": { "file_path": format!("{}/{}", dir, file_name) },
        "upload": {
            "url": format!("{}/upload/{}", service.base_url, file_name),
            "headers": { "x-upload-token": "tok" }
        }
    }))
}

async fn receive_upload(
    State(service): State<Shared>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> StatusCode {
    let token = headers
        .get("x-upload-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    service.uploads.lock().unwrap().push((name, token));
    StatusCode::OK
}

async fn process(
    State(service): State<Shared>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    if service.process_status != 200 {
        let status = StatusCode::from_u16(service.process_status).unwrap();
        return (status, "slow down").into_response();
    }
    service.tasks.lock().unwrap().push(body["task"].clone());
    Json(serde_json::json!({
        "ok": true,
        "result": [{ "download_url": format!("{}/download/out", service.base_url) }]
    }))
    .into_response()
}

async fn start_mock_encode_server(process_status: u16) -> (Shared, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let service = Arc::new(MockEncodeService {
        base_url: format!("http://{}", addr),
        process_status,
        uploads: Mutex::new(Vec::new()),
        tasks: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/directory", post(create_directory))
        .route("/file", post(create_file))
        .route("/upload/{name}", put(receive_upload))
        .route("/ffmpeg/process", post(process))
        .with_state(service.clone());

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (service, shutdown_tx)
}

fn transcoder(service: &MockEncodeService, store: Arc<InMemoryStore>) -> FfmpegApiTranscoder {
    FfmpegApiTranscoder::new("Basic ffk".to_string(), Some(service.base_url.clone()), store)
}

fn upload_names(service: &MockEncodeService) -> Vec<String> {
    service
        .uploads
        .lock()
        .unwrap()
        .iter()
        .map(|(name, _)| name.clone())
        .collect()
}

#[tokio::test]
async fn given_directory_response_when_opening_session_then_uses_directory_id() {
    let (service, shutdown_tx) = start_mock_encode_server(200).await;
    let transcoder = transcoder(&service, Arc::new(InMemoryStore::default()));

    let session = transcoder.open_session().await.unwrap();

    assert_eq!(session.id(), "dir-7");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_wrong_key_when_opening_session_then_api_error() {
    let (service, shutdown_tx) = start_mock_encode_server(200).await;
    let transcoder =
        FfmpegApiTranscoder::new("wrong".to_string(), Some(service.base_url.clone()), Arc::new(InMemoryStore::default()));

    let result = transcoder.open_session().await;

    assert!(matches!(result, Err(TranscodeError::ApiRequestFailed(m)) if m.contains("401")));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_video_when_extracting_audio_then_uploads_processes_and_republishes() {
    let (service, shutdown_tx) = start_mock_encode_server(200).await;
    let store = Arc::new(InMemoryStore::default());
    let transcoder = transcoder(&service, store.clone());

    let url = transcoder
        .extract_audio(&EncodeSession::new("dir-7"), "https://cdn.test/in.mp4", "Hook 1")
        .await
        .unwrap();

    assert!(url.starts_with("mem://audio/hook-1-"));
    assert!(url.ends_with(".wav"));
    assert_eq!(
        service.uploads.lock().unwrap().clone(),
        vec![("hook-1_original.mp4".to_string(), Some("tok".to_string()))]
    );
    let task = service.tasks.lock().unwrap()[0].clone();
    assert_eq!(task["inputs"][0]["file_path"], "dir-7/hook-1_original.mp4");
    assert_eq!(task["outputs"][0]["file"], "hook-1.wav");
    assert_eq!(store.published.lock().unwrap().len(), 1);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_cleaned_audio_when_trimming_then_both_inputs_are_cut_at_the_window() {
    let (service, shutdown_tx) = start_mock_encode_server(200).await;
    let transcoder = transcoder(&service, Arc::new(InMemoryStore::default()));
    let request = TrimRequest {
        video_url: "https://cdn.test/in.mp4".to_string(),
        name: "hook-1".to_string(),
        start_ms: 850,
        end_ms: 2050,
        replacement_audio_url: Some("https://cdn.test/clean.mp3".to_string()),
        overlay: None,
    };

    let url = transcoder
        .trim(&EncodeSession::new("dir-7"), &request)
        .await
        .unwrap();

    assert!(url.starts_with("mem://videos/trimmed/hook-1-"));
    assert_eq!(
        upload_names(&service),
        vec!["hook-1_original.mp4", "hook-1_cleaned.mp3"]
    );
    let task = service.tasks.lock().unwrap()[0].clone();
    assert_eq!(
        task["inputs"][1]["options"],
        serde_json::json!(["-ss", "0.85", "-t", "1.2"])
    );
    assert_eq!(task["outputs"][0]["file"], "hook-1_trimmed.mp4");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_empty_window_when_trimming_then_rejected_without_calling_service() {
    let (service, shutdown_tx) = start_mock_encode_server(200).await;
    let transcoder = transcoder(&service, Arc::new(InMemoryStore::default()));
    let request = TrimRequest {
        video_url: "https://cdn.test/in.mp4".to_string(),
        name: "hook-1".to_string(),
        start_ms: 900,
        end_ms: 900,
        replacement_audio_url: None,
        overlay: None,
    };

    let result = transcoder.trim(&EncodeSession::new("dir-7"), &request).await;

    assert!(matches!(result, Err(TranscodeError::InvalidRequest(_))));
    assert!(upload_names(&service).is_empty());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_clips_when_concatenating_then_parts_are_uploaded_in_order() {
    let (service, shutdown_tx) = start_mock_encode_server(200).await;
    let transcoder = transcoder(&service, Arc::new(InMemoryStore::default()));
    let urls = vec![
        "https://cdn.test/b.mp4".to_string(),
        "https://cdn.test/a.mp4".to_string(),
    ];

    let url = transcoder
        .concat(&EncodeSession::new("dir-7"), &urls, true, "final")
        .await
        .unwrap();

    assert!(url.starts_with("mem://videos/merged/final-"));
    assert_eq!(upload_names(&service), vec!["final_part0.mp4", "final_part1.mp4"]);
    let task = service.tasks.lock().unwrap()[0].clone();
    assert!(task["filter_complex"].as_str().unwrap().starts_with("[0:v][0:a][1:v][1:a]concat=n=2"));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_service_refuses_with_429_when_processing_then_rate_limited() {
    let (service, shutdown_tx) = start_mock_encode_server(429).await;
    let transcoder = transcoder(&service, Arc::new(InMemoryStore::default()));

    let result = transcoder
        .extract_audio(&EncodeSession::new("dir-7"), "https://cdn.test/in.mp4", "hook-1")
        .await;

    match result {
        Err(e) => {
            assert!(e.is_rate_limited());
            assert!(matches!(e, TranscodeError::RateLimited { status: 429 }));
        }
        Ok(url) => panic!("expected rate limit, got {}", url),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_service_refuses_with_403_when_processing_then_rate_limited() {
    let (service, shutdown_tx) = start_mock_encode_server(403).await;
    let transcoder = transcoder(&service, Arc::new(InMemoryStore::default()));

    let result = transcoder
        .extract_audio(&EncodeSession::new("dir-7"), "https://cdn.test/in.mp4", "hook-1")
        .await;

    assert!(matches!(result, Err(TranscodeError::RateLimited { status: 403 })));
    shutdown_tx.send(()).ok();
}

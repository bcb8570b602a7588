use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use reelcut::application::ports::{TranscriptionEngine, TranscriptionError};
use reelcut::infrastructure::audio::OpenAiWhisperEngine;

async fn start_mock_whisper_server(
    response_status: u16,
    response_body: &'static str,
) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new()
        .route("/media/clip.wav", get(|| async { b"RIFF fake wav".to_vec() }))
        .route(
            "/v1/audio/transcriptions",
            post(move |headers: HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer test-key");
                if !authorized {
                    return (StatusCode::UNAUTHORIZED, "missing key").into_response();
                }
                let status = StatusCode::from_u16(response_status).unwrap();
                (status, response_body).into_response()
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, shutdown_tx)
}

fn engine(base_url: &str) -> OpenAiWhisperEngine {
    OpenAiWhisperEngine::new(
        "test-key".to_string(),
        Some(format!("{}/v1", base_url)),
        None,
    )
}

#[tokio::test]
async fn given_word_timestamps_when_transcribing_then_returns_millisecond_words() {
    let body = r#"{
        "text": " Salut tuturor",
        "words": [
            {"word": "Salut", "start": 0.12, "end": 0.48},
            {"word": "tuturor", "start": 0.48, "end": 1.1}
        ]
    }"#;
    let (base_url, shutdown_tx) = start_mock_whisper_server(200, body).await;

    let transcript = engine(&base_url)
        .transcribe(&format!("{}/media/clip.wav", base_url), "ro")
        .await
        .unwrap();

    assert_eq!(transcript.text, "Salut tuturor");
    assert_eq!(transcript.words.len(), 2);
    assert_eq!(transcript.words[0].text, "Salut");
    assert_eq!(transcript.words[0].start_ms, 120);
    assert_eq!(transcript.words[0].end_ms, 480);
    assert_eq!(transcript.words[1].end_ms, 1100);
    assert_eq!(transcript.raw["words"][1]["word"], "tuturor");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_api_error_status_when_transcribing_then_returns_api_error() {
    let (base_url, shutdown_tx) =
        start_mock_whisper_server(400, r#"{"error": {"message": "bad audio"}}"#).await;

    let result = engine(&base_url)
        .transcribe(&format!("{}/media/clip.wav", base_url), "ro")
        .await;

    match result {
        Err(TranscriptionError::ApiRequestFailed(msg)) => assert!(msg.contains("bad audio")),
        other => panic!("expected api error, got {:?}", other.map(|t| t.text)),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_no_words_in_response_when_transcribing_then_returns_no_words() {
    let (base_url, shutdown_tx) = start_mock_whisper_server(200, r#"{"text": "", "words": []}"#).await;

    let result = engine(&base_url)
        .transcribe(&format!("{}/media/clip.wav", base_url), "ro")
        .await;

    assert!(matches!(result, Err(TranscriptionError::NoWords)));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_missing_audio_when_transcribing_then_returns_download_error() {
    let (base_url, shutdown_tx) = start_mock_whisper_server(200, r#"{"text": ""}"#).await;

    let result = engine(&base_url)
        .transcribe(&format!("{}/media/missing.wav", base_url), "ro")
        .await;

    assert!(matches!(result, Err(TranscriptionError::DownloadFailed(_))));
    shutdown_tx.send(()).ok();
}

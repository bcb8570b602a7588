use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use reelcut::application::ports::MediaTranscoder;
use reelcut::application::services::{
    BatchCoordinator, BatchSettings, ClipJobRunner, MergeEngine, SpeechAligner,
    VoiceCleanupService,
};
use reelcut::infrastructure::audio::OpenAiWhisperEngine;
use reelcut::infrastructure::cleanup::CleanVoiceClient;
use reelcut::infrastructure::encoding::FfmpegApiTranscoder;
use reelcut::infrastructure::observability::{TracingConfig, init_tracing};
use reelcut::infrastructure::storage::MediaStoreFactory;
use reelcut::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;

    let settings = Settings::load(environment).context("Failed to load settings")?;

    let host: std::net::IpAddr = settings
        .server
        .host
        .parse()
        .context("Invalid server host")?;
    let addr = SocketAddr::new(host, settings.server.port);

    let json_logs = settings
        .logging
        .enable_json
        .unwrap_or_else(|| environment.prefers_json_logs());
    let tracing_config = TracingConfig::new(environment.as_str(), json_logs)
        .with_default_filter(settings.logging.level.clone());
    init_tracing(tracing_config).context("Failed to initialize tracing")?;

    let store = MediaStoreFactory::create(&settings.storage).context("Failed to create media store")?;

    let transcoder: Arc<dyn MediaTranscoder> = Arc::new(FfmpegApiTranscoder::new(
        settings.encode.api_key.clone(),
        settings.encode.base_url.clone(),
        Arc::clone(&store),
    ));

    let transcription = Arc::new(OpenAiWhisperEngine::new(
        settings.transcription.api_key.clone(),
        settings.transcription.base_url.clone(),
        settings.transcription.model.clone(),
    ));

    let cleaner = Arc::new(CleanVoiceClient::new(
        settings.cleanup.api_key.clone(),
        settings.cleanup.base_url.clone(),
    ));
    let cleanup = Arc::new(
        VoiceCleanupService::new(cleaner, Arc::clone(&store))
            .with_config(settings.cleanup.options.clone())
            .with_polling(
                Duration::from_secs(settings.cleanup.poll_interval_secs),
                settings.cleanup.max_polls,
            ),
    );

    let aligner = Arc::new(SpeechAligner::new(settings.alignment.margin_ms));

    let runner = Arc::new(
        ClipJobRunner::new(Arc::clone(&transcoder), transcription, cleanup, aligner)
            .with_language(settings.transcription.language.clone()),
    );

    let coordinator = Arc::new(BatchCoordinator::new(
        runner,
        Arc::clone(&transcoder),
        BatchSettings {
            rate_limit_backoff: Duration::from_secs(settings.batch.rate_limit_backoff_secs),
            max_rate_limit_retries: settings.batch.max_rate_limit_retries,
        },
    ));
    let merge_engine = Arc::new(MergeEngine::new(transcoder));

    let state = AppState::new(coordinator, merge_engine, settings.batch.batch_size)
        .with_retention(Duration::from_secs(settings.batch.retention_secs));
    let router = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

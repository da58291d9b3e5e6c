use async_openai::Client as OpenAiClient;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sozo_tutor::controllers::{
    lesson::LessonController, transcription::TranscriptionController, tts::TtsController,
};
use sozo_tutor::domain::dialogue::LessonRepository;
use sozo_tutor::domain::synthesis::SynthesisCache;
use sozo_tutor::infrastructure::config::{Config, LogFormat, TtsProvider};
use sozo_tutor::infrastructure::http::{
    build_router, start_http_server, Controllers, LocalAudioRoute,
};
use sozo_tutor::infrastructure::repositories::{
    AudioStorage, JsonLessonRepository, LocalAudioStorage, OpenAiTranscriptionRepository,
    OpenAiTtsRepository, PollyTtsRepository, S3AudioStorage, TranscriptionRepository,
    TtsRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Sozo tutor backend on {}:{}",
        config.host,
        config.port
    );

    let needs_aws = config.tts_provider == TtsProvider::Polly || config.s3_storage().is_some();
    let aws_config = if needs_aws {
        tracing::info!("Initializing AWS clients with region: {}", config.aws_region);
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()))
            .load()
            .await;
        tracing::info!(region = ?aws_config.region(), "AWS configuration loaded");
        Some(aws_config)
    } else {
        None
    };

    let openai_client = Arc::new(OpenAiClient::new());

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Synthesis provider
    let tts_repo: Arc<dyn TtsRepository> = match (config.tts_provider, &aws_config) {
        (TtsProvider::Polly, Some(aws_config)) => {
            tracing::info!("Using AWS Polly for speech synthesis");
            Arc::new(PollyTtsRepository::new(Arc::new(aws_sdk_polly::Client::new(aws_config))))
        }
        _ => {
            tracing::info!("Using OpenAI for speech synthesis");
            Arc::new(OpenAiTtsRepository::new(openai_client.clone()))
        }
    };

    // 2. Storage fallback chain, highest priority first
    let mut backends: Vec<Arc<dyn AudioStorage>> = Vec::new();
    if let (Some((bucket, public_base_url)), Some(aws_config)) =
        (config.s3_storage(), &aws_config)
    {
        tracing::info!(bucket = %bucket, "S3 audio storage enabled");
        let s3_client = Arc::new(aws_sdk_s3::Client::new(aws_config));
        backends.push(Arc::new(S3AudioStorage::new(s3_client, bucket, public_base_url)));
    }
    backends.push(Arc::new(LocalAudioStorage::new(
        config.local_audio_dir.clone(),
        Some(config.local_audio_url_prefix.clone()),
    )));

    let cache = Arc::new(SynthesisCache::new(
        tts_repo,
        backends,
        config.synthesis_cache_config(),
    ));
    tracing::info!(backends = ?cache.backend_ids(), "Synthesis cache ready");

    // 3. Lessons and transcription
    let lesson_repo: Arc<dyn LessonRepository> = if config.lessons_dir.is_dir() {
        Arc::new(JsonLessonRepository::load(&config.lessons_dir)?)
    } else {
        tracing::warn!(
            dir = %config.lessons_dir.display(),
            "Lessons directory not found, serving no lessons"
        );
        Arc::new(JsonLessonRepository::empty())
    };
    let transcription_repo: Arc<dyn TranscriptionRepository> = Arc::new(
        OpenAiTranscriptionRepository::new(openai_client, config.transcription_model.clone()),
    );

    // 4. Controllers
    let controllers = Controllers {
        tts: Arc::new(TtsController::new(
            cache.clone(),
            config.default_voice,
            config.default_model,
        )),
        lesson: Arc::new(LessonController::new(lesson_repo)),
        transcription: Some(Arc::new(TranscriptionController::new(
            transcription_repo,
            config.provider_timeout,
        ))),
    };

    let app = build_router(
        cache,
        controllers,
        Some(LocalAudioRoute {
            dir: &config.local_audio_dir,
            url_prefix: &config.local_audio_url_prefix,
        }),
    );

    start_http_server(Arc::new(config), app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "sozo_tutor=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "sozo_tutor=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::controllers::{
    health, lesson::LessonController, transcription::TranscriptionController, tts::TtsController,
};
use crate::domain::synthesis::SynthesisCache;
use crate::infrastructure::config::Config;
use crate::infrastructure::repositories::MAX_TRANSCRIPTION_BYTES;

/// Where locally stored audio is served from
pub struct LocalAudioRoute<'a> {
    pub dir: &'a Path,
    pub url_prefix: &'a str,
}

/// Controllers mounted by [`build_router`]
pub struct Controllers {
    pub tts: Arc<TtsController>,
    pub lesson: Arc<LessonController>,
    pub transcription: Option<Arc<TranscriptionController>>,
}

/// Build the application router with all routes configured
pub fn build_router(
    cache: Arc<SynthesisCache>,
    controllers: Controllers,
    local_audio: Option<LocalAudioRoute<'_>>,
) -> Router {
    let Controllers {
        tts: tts_controller,
        lesson: lesson_controller,
        transcription: transcription_controller,
    } = controllers;

    let tts_routes = Router::new()
        .route("/api/text-to-speech", post(TtsController::synthesize))
        .with_state(tts_controller);

    let lesson_routes = Router::new()
        .route("/api/lessons", get(LessonController::list_lessons))
        .route("/api/lessons/:lessonId", get(LessonController::get_lesson))
        .with_state(lesson_controller);

    let mut app = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(cache)
        .merge(tts_routes)
        .merge(lesson_routes);

    if let Some(controller) = transcription_controller {
        let transcription_routes = Router::new()
            .route("/api/transcribe", post(TranscriptionController::transcribe))
            .layer(DefaultBodyLimit::max(MAX_TRANSCRIPTION_BYTES))
            .with_state(controller);
        app = app.merge(transcription_routes);
    }

    if let Some(route) = local_audio {
        // Only a path prefix can be mounted; absolute URLs point at another host.
        if route.url_prefix.starts_with('/') && route.url_prefix.len() > 1 {
            app = app.nest_service(
                route.url_prefix.trim_end_matches('/'),
                ServeDir::new(route.dir),
            );
        }
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

use anyhow::Result;
use sozo_tutor::controllers::{
    lesson::LessonController, transcription::TranscriptionController, tts::TtsController,
};
use sozo_tutor::domain::practice::{
    EngineEvent, GestureGate, PlaybackController, PlaybackEvent, TurnEngine,
};
use sozo_tutor::domain::settings::{PracticeSettings, PracticeTiming};
use sozo_tutor::domain::synthesis::{SpeechModel, SynthesisCache, SynthesisCacheConfig, Voice};
use sozo_tutor::infrastructure::http::{build_router, Controllers, LocalAudioRoute};
use sozo_tutor::infrastructure::repositories::{
    AudioStorage, JsonLessonRepository, LocalAudioStorage, TranscriptionRepository,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

pub mod fixtures;

use api_client::TestClient;
use fakes::{FakeTranscriber, FakeTtsRepository, MemoryAudioStorage, RecordingSink};

pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP application wired with fakes and a temporary audio directory.
pub struct TestContext {
    pub client: TestClient,
    pub tts: Arc<FakeTtsRepository>,
    #[allow(dead_code)]
    pub cache: Arc<SynthesisCache>,
    pub audio_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        Self::with_providers(FakeTtsRepository::new(), FakeTranscriber::hearing("Hello there"))
            .await
    }

    pub async fn with_tts(tts: FakeTtsRepository) -> Result<Self> {
        Self::with_providers(tts, FakeTranscriber::hearing("Hello there")).await
    }

    pub async fn with_transcriber(transcriber: FakeTranscriber) -> Result<Self> {
        Self::with_providers(FakeTtsRepository::new(), transcriber).await
    }

    async fn with_providers(tts: FakeTtsRepository, transcriber: FakeTranscriber) -> Result<Self> {
        let audio_dir = tempfile::tempdir()?;
        let tts = Arc::new(tts);

        let storage: Arc<dyn AudioStorage> = Arc::new(LocalAudioStorage::new(
            audio_dir.path(),
            Some("/audio".to_string()),
        ));
        let cache = Arc::new(SynthesisCache::new(
            tts.clone(),
            vec![storage],
            SynthesisCacheConfig {
                provider_timeout: PROVIDER_TIMEOUT,
                ..SynthesisCacheConfig::default()
            },
        ));

        let lessons = Arc::new(JsonLessonRepository::from_lessons(vec![fixtures::spa_lesson()])?);
        let transcriber: Arc<dyn TranscriptionRepository> = Arc::new(transcriber);

        let controllers = Controllers {
            tts: Arc::new(TtsController::new(cache.clone(), Voice::Echo, SpeechModel::Tts1)),
            lesson: Arc::new(LessonController::new(lessons)),
            transcription: Some(Arc::new(TranscriptionController::new(
                transcriber,
                PROVIDER_TIMEOUT,
            ))),
        };

        let app = build_router(
            cache.clone(),
            controllers,
            Some(LocalAudioRoute {
                dir: audio_dir.path(),
                url_prefix: "/audio",
            }),
        );

        Ok(Self {
            client: TestClient::new(app),
            tts,
            cache,
            audio_dir,
        })
    }
}

/// Settings with every pause set to zero.
pub fn immediate_settings() -> PracticeSettings {
    PracticeSettings::default().with_timing(PracticeTiming::immediate())
}

pub struct HarnessOptions {
    pub tts: FakeTtsRepository,
    pub sink: RecordingSink,
    pub gate: GestureGate,
    pub settings: PracticeSettings,
    pub transcriber: Option<FakeTranscriber>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            tts: FakeTtsRepository::new(),
            sink: RecordingSink::new(),
            gate: GestureGate::unlocked(),
            settings: immediate_settings(),
            transcriber: None,
        }
    }
}

/// A turn engine over fake providers, with both event streams exposed.
pub struct PracticeHarness {
    pub engine: TurnEngine,
    pub events: UnboundedReceiver<EngineEvent>,
    pub playback_events: UnboundedReceiver<PlaybackEvent>,
    pub tts: Arc<FakeTtsRepository>,
    pub sink: Arc<RecordingSink>,
    pub storage: Arc<MemoryAudioStorage>,
}

impl PracticeHarness {
    pub fn new() -> Self {
        Self::build(HarnessOptions::default())
    }

    pub fn build(options: HarnessOptions) -> Self {
        let tts = Arc::new(options.tts);
        let sink = Arc::new(options.sink);
        let storage = Arc::new(MemoryAudioStorage::new("memory"));

        let cache = Arc::new(SynthesisCache::new(
            tts.clone(),
            vec![storage.clone() as Arc<dyn AudioStorage>],
            SynthesisCacheConfig {
                provider_timeout: PROVIDER_TIMEOUT,
                ..SynthesisCacheConfig::default()
            },
        ));

        let (playback, playback_events) =
            PlaybackController::new(sink.clone(), Arc::new(options.gate));
        let (mut engine, events) = TurnEngine::new(cache, playback, options.settings);
        if let Some(transcriber) = options.transcriber {
            engine = engine.with_transcriber(Arc::new(transcriber));
        }

        Self {
            engine,
            events,
            playback_events,
            tts,
            sink,
            storage,
        }
    }

    /// Feed playback events into the engine until playback goes quiet.
    pub async fn settle(&mut self) {
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_millis(50), self.playback_events.recv()).await
        {
            self.engine
                .handle_playback_event(event)
                .await
                .expect("playback event rejected");
        }
    }

    /// Wait for the next playback event without handing it to the engine.
    pub async fn next_playback_event(&mut self) -> PlaybackEvent {
        tokio::time::timeout(Duration::from_secs(1), self.playback_events.recv())
            .await
            .expect("timed out waiting for a playback event")
            .expect("playback channel closed")
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn turn_changes(events: &[EngineEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::TurnChanged { index, .. } => Some(*index),
            _ => None,
        })
        .collect()
}

pub fn completed_count(events: &[EngineEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, EngineEvent::Completed))
        .count()
}

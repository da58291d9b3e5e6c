use crate::e2e::helpers;

use helpers::fakes::{FakeTranscriber, FakeTtsRepository, RecordingSink};
use helpers::fixtures::{
    customer_first_script, four_turn_script, CUSTOMER_CLOSING, CUSTOMER_REPLY, STAFF_ANSWER,
    STAFF_OPENING,
};
use helpers::{completed_count, immediate_settings, turn_changes, HarnessOptions, PracticeHarness};
use pretty_assertions::assert_eq;
use sozo_tutor::domain::dialogue::{DialogueScript, Role};
use sozo_tutor::domain::practice::{
    EngineError, EngineEvent, EngineState, GestureGate, PlaybackEvent,
};
use sozo_tutor::domain::settings::{
    InMemorySettings, PracticeSettings, PracticeTiming, Settings, KEY_MODEL, KEY_SPEECH_RATE,
    KEY_VOICE,
};
use sozo_tutor::domain::synthesis::{ArtifactKey, SpeechModel, Voice};
use sozo_tutor::infrastructure::repositories::AudioStorage;

#[tokio::test]
async fn it_should_wait_for_the_learner_after_the_opening_prompt() {
    let mut harness = PracticeHarness::new();

    harness.engine.start(four_turn_script()).await.unwrap();
    assert_eq!(harness.engine.state(), EngineState::PlayingPrompt);

    harness.settle().await;
    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);
    assert_eq!(harness.engine.current_turn().unwrap().text, STAFF_OPENING);

    let played = harness.sink.played();
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].1, 1.0);
    assert_eq!(harness.tts.calls(), vec![STAFF_OPENING.to_string()]);
}

#[tokio::test]
async fn it_should_complete_a_script_with_one_event_per_turn() {
    let mut harness = PracticeHarness::new();

    harness.engine.start(four_turn_script()).await.unwrap();
    harness.settle().await;

    let score = harness.engine.submit_utterance(STAFF_OPENING).await.unwrap().unwrap();
    assert_eq!(score.value, 1.0);

    // The customer line plays and auto-advances to the next staff line.
    harness.settle().await;
    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);
    assert_eq!(harness.engine.current_turn().unwrap().text, STAFF_ANSWER);

    harness.engine.submit_utterance("It takes about sixty minutes").await.unwrap();
    harness.settle().await;

    assert_eq!(harness.engine.state(), EngineState::Completed);
    assert!(harness.engine.current_turn().is_none());

    let events = harness.drain_events();
    assert_eq!(turn_changes(&events), vec![0, 1, 2, 3]);
    assert_eq!(completed_count(&events), 1);
    assert!(matches!(events.last(), Some(EngineEvent::Completed)));

    let history: Vec<(Role, &str, bool)> = harness
        .engine
        .history()
        .iter()
        .map(|entry| (entry.role, entry.text.as_str(), entry.spoken_by_learner))
        .collect();
    assert_eq!(
        history,
        vec![
            (Role::Staff, STAFF_OPENING, true),
            (Role::Customer, CUSTOMER_REPLY, false),
            (Role::Staff, STAFF_ANSWER, true),
            (Role::Customer, CUSTOMER_CLOSING, false),
        ]
    );
}

#[tokio::test]
async fn it_should_retry_the_same_turn_on_a_poor_match() {
    let mut harness = PracticeHarness::new();
    harness.engine.start(four_turn_script()).await.unwrap();
    harness.settle().await;
    harness.drain_events();

    let score = harness
        .engine
        .submit_utterance("pizza delivery tonight")
        .await
        .unwrap()
        .unwrap();

    assert!(score.value <= 0.5);
    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);

    let session = harness.engine.session().unwrap();
    assert_eq!(session.current_turn_index, 0);
    assert_eq!(session.retry_count, 1);
    assert_eq!(session.last_transcript.as_deref(), Some("pizza delivery tonight"));

    let events = harness.drain_events();
    assert!(matches!(
        events.as_slice(),
        [EngineEvent::Feedback { success: false, score: Some(_), .. }]
    ));
    assert!(harness.engine.history().is_empty());

    // Retries are unlimited and the counter resets once the turn passes.
    harness.engine.submit_utterance("no idea").await.unwrap();
    assert_eq!(harness.engine.session().unwrap().retry_count, 2);
    harness.engine.submit_utterance(STAFF_OPENING).await.unwrap();
    assert_eq!(harness.engine.session().unwrap().current_turn_index, 1);
    assert_eq!(harness.engine.session().unwrap().retry_count, 0);
}

#[tokio::test]
async fn it_should_skip_without_scoring() {
    let mut harness = PracticeHarness::new();
    harness.engine.start(four_turn_script()).await.unwrap();
    harness.settle().await;

    harness.engine.skip().await.unwrap();
    harness.settle().await;

    let session = harness.engine.session().unwrap();
    assert_eq!(session.current_turn_index, 2);
    assert_eq!(session.last_score, None);
    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);

    let first = &harness.engine.history()[0];
    assert_eq!(first.text, STAFF_OPENING);
    assert!(first.spoken_by_learner);

    let feedback = harness
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, EngineEvent::Feedback { .. }))
        .count();
    assert_eq!(feedback, 0);
}

#[tokio::test]
async fn it_should_ignore_blank_transcripts() {
    let mut harness = PracticeHarness::new();
    harness.engine.start(four_turn_script()).await.unwrap();
    harness.settle().await;

    let result = harness.engine.submit_utterance("   ").await.unwrap();
    assert_eq!(result, None);
    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);
    assert_eq!(harness.engine.session().unwrap().retry_count, 0);
}

#[tokio::test]
async fn it_should_reject_input_while_a_prompt_is_playing() {
    let mut harness = PracticeHarness::build(HarnessOptions {
        sink: RecordingSink::holding(),
        ..HarnessOptions::default()
    });
    harness.engine.start(four_turn_script()).await.unwrap();

    let result = harness.engine.submit_utterance(STAFF_OPENING).await;
    assert!(matches!(
        result,
        Err(EngineError::InvalidState {
            operation: "submit_utterance",
            state: EngineState::PlayingPrompt
        })
    ));
    assert!(matches!(harness.engine.skip().await, Err(EngineError::InvalidState { .. })));
    assert_eq!(harness.engine.state(), EngineState::PlayingPrompt);
}

#[tokio::test]
async fn it_should_reject_an_empty_script() {
    let mut harness = PracticeHarness::new();
    let result = harness.engine.start(DialogueScript::new(vec![]).unwrap()).await;

    assert!(matches!(result, Err(EngineError::EmptyScript)));
    assert_eq!(harness.engine.state(), EngineState::Idle);
    assert!(harness.drain_events().is_empty());
}

#[tokio::test]
async fn it_should_ignore_completions_from_earlier_prompts() {
    let mut harness = PracticeHarness::new();
    harness.engine.start(four_turn_script()).await.unwrap();

    let opening = harness.next_playback_event().await;
    assert!(matches!(opening, PlaybackEvent::Finished(_)));
    harness.engine.handle_playback_event(opening).await.unwrap();
    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);

    harness.engine.submit_utterance(STAFF_OPENING).await.unwrap();
    assert_eq!(harness.engine.state(), EngineState::PlayingPrompt);
    assert_eq!(harness.engine.session().unwrap().current_turn_index, 1);

    // A duplicate completion for the opening prompt must not advance the customer turn.
    harness.engine.handle_playback_event(opening).await.unwrap();
    assert_eq!(harness.engine.state(), EngineState::PlayingPrompt);
    assert_eq!(harness.engine.session().unwrap().current_turn_index, 1);

    harness.settle().await;
    assert_eq!(harness.engine.session().unwrap().current_turn_index, 2);
}

#[tokio::test]
async fn it_should_continue_without_audio_when_synthesis_fails() {
    let mut harness = PracticeHarness::build(HarnessOptions {
        tts: FakeTtsRepository::failing(),
        ..HarnessOptions::default()
    });

    harness.engine.start(four_turn_script()).await.unwrap();
    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);
    assert!(harness.sink.played().is_empty());

    // The customer turn has no audio either and advances on its own.
    harness.engine.submit_utterance(STAFF_OPENING).await.unwrap();
    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);
    assert_eq!(harness.engine.session().unwrap().current_turn_index, 2);

    let unavailable: Vec<u32> = harness
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::AudioUnavailable { turn_number, .. } => Some(turn_number),
            _ => None,
        })
        .collect();
    assert_eq!(unavailable, vec![1, 2, 3]);
}

#[tokio::test]
async fn it_should_auto_advance_an_opening_customer_line() {
    let mut harness = PracticeHarness::new();
    harness.engine.start(customer_first_script()).await.unwrap();
    harness.settle().await;

    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);
    assert_eq!(harness.engine.session().unwrap().current_turn_index, 1);
    assert_eq!(harness.engine.history().len(), 1);
    assert!(!harness.engine.history()[0].spoken_by_learner);
}

#[tokio::test]
async fn it_should_let_the_learner_play_the_customer_role() {
    let mut harness = PracticeHarness::build(HarnessOptions {
        settings: immediate_settings().with_learner_role(Role::Customer),
        ..HarnessOptions::default()
    });
    harness.engine.start(four_turn_script()).await.unwrap();
    harness.settle().await;

    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);
    assert_eq!(harness.engine.current_turn().unwrap().text, CUSTOMER_REPLY);
}

#[tokio::test]
async fn it_should_wait_for_a_gesture_before_playing() {
    let mut harness = PracticeHarness::build(HarnessOptions {
        gate: GestureGate::new(),
        ..HarnessOptions::default()
    });
    harness.engine.start(four_turn_script()).await.unwrap();
    harness.settle().await;

    assert_eq!(harness.engine.state(), EngineState::PlayingPrompt);
    assert!(harness.sink.played().is_empty());
    assert!(harness
        .drain_events()
        .iter()
        .any(|event| matches!(event, EngineEvent::TapToPlay)));

    harness.engine.register_gesture();
    harness.settle().await;

    assert_eq!(harness.sink.played().len(), 1);
    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);
}

#[tokio::test]
async fn it_should_replay_the_prompt_from_the_cache() {
    let mut harness = PracticeHarness::new();
    harness.engine.start(four_turn_script()).await.unwrap();
    harness.settle().await;

    harness.engine.replay_prompt().await.unwrap();
    harness.settle().await;

    let played = harness.sink.played();
    assert_eq!(played.len(), 2);
    assert_eq!(played[0].0.locator, played[1].0.locator);
    assert_eq!(harness.tts.call_count(), 1);
    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);
}

#[tokio::test]
async fn it_should_apply_the_learners_stored_preferences() {
    let store = InMemorySettings::new();
    store.set(KEY_SPEECH_RATE, "0.75".to_string());
    store.set(KEY_VOICE, "nova".to_string());
    store.set(KEY_MODEL, "tts-1-hd".to_string());

    let settings = PracticeSettings::from_store(&store).with_timing(PracticeTiming::immediate());
    let mut harness = PracticeHarness::build(HarnessOptions {
        settings,
        ..HarnessOptions::default()
    });

    harness.engine.start(four_turn_script()).await.unwrap();
    harness.settle().await;

    let (audio, rate) = &harness.sink.played()[0];
    assert_eq!(*rate, 0.75);
    assert_eq!(
        audio.key,
        ArtifactKey::derive(STAFF_OPENING, Voice::Nova, SpeechModel::Tts1Hd)
    );
}

#[tokio::test]
async fn it_should_pass_the_bypass_phrase_when_enabled() {
    let mut harness = PracticeHarness::build(HarnessOptions {
        settings: immediate_settings().with_bypass_phrase("Open sesame"),
        ..HarnessOptions::default()
    });
    harness.engine.start(four_turn_script()).await.unwrap();
    harness.settle().await;

    harness.engine.submit_utterance("open sesame!").await.unwrap();
    assert_eq!(harness.engine.session().unwrap().current_turn_index, 1);
}

#[tokio::test]
async fn it_should_score_transcribed_recordings() {
    let mut harness = PracticeHarness::build(HarnessOptions {
        transcriber: Some(FakeTranscriber::hearing(STAFF_OPENING)),
        ..HarnessOptions::default()
    });
    harness.engine.start(four_turn_script()).await.unwrap();
    harness.settle().await;

    let score = harness
        .engine
        .submit_recording(vec![0u8; 2048])
        .await
        .unwrap()
        .unwrap();

    assert_eq!(score.value, 1.0);
    assert_eq!(harness.engine.session().unwrap().current_turn_index, 1);
}

#[tokio::test]
async fn it_should_ask_again_when_recognition_fails() {
    let mut harness = PracticeHarness::build(HarnessOptions {
        transcriber: Some(FakeTranscriber::failing("audio too quiet")),
        ..HarnessOptions::default()
    });
    harness.engine.start(four_turn_script()).await.unwrap();
    harness.settle().await;
    harness.drain_events();

    let result = harness.engine.submit_recording(vec![0u8; 2048]).await.unwrap();

    assert_eq!(result, None);
    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);
    assert_eq!(harness.engine.session().unwrap().retry_count, 0);
    assert!(matches!(
        harness.drain_events().as_slice(),
        [EngineEvent::Feedback { success: false, score: None, .. }]
    ));
}

#[tokio::test]
async fn it_should_require_a_transcriber_for_recordings() {
    let mut harness = PracticeHarness::new();
    harness.engine.start(four_turn_script()).await.unwrap();
    harness.settle().await;

    let result = harness.engine.submit_recording(vec![1, 2, 3]).await;
    assert!(matches!(result, Err(EngineError::TranscriptionUnavailable)));
}

#[tokio::test]
async fn it_should_stop_playback_and_end_the_session() {
    let mut harness = PracticeHarness::build(HarnessOptions {
        sink: RecordingSink::holding(),
        ..HarnessOptions::default()
    });
    harness.engine.start(four_turn_script()).await.unwrap();

    harness.engine.stop();
    harness.engine.stop();

    assert_eq!(harness.engine.state(), EngineState::Idle);
    assert!(harness.engine.session().is_none());
    assert!(matches!(
        harness.next_playback_event().await,
        PlaybackEvent::Interrupted(_)
    ));
    assert_eq!(harness.sink.stop_count(), 1);

    // A fresh start after stopping begins at the first turn again.
    harness.engine.start(four_turn_script()).await.unwrap();
    assert_eq!(harness.engine.session().unwrap().current_turn_index, 0);
}

#[tokio::test]
async fn it_should_play_pre_generated_audio_without_synthesizing() {
    let mut harness = PracticeHarness::new();
    let key = ArtifactKey::derive(STAFF_OPENING, Voice::Echo, SpeechModel::Tts1);
    harness
        .storage
        .put(&key, b"studio recording".to_vec(), "audio/mpeg")
        .await
        .unwrap();

    let mut turns = four_turn_script().turns().to_vec();
    turns[0].cached_audio_ref = Some(key.to_string().to_uppercase());
    harness.engine.start(DialogueScript::new(turns).unwrap()).await.unwrap();
    harness.settle().await;

    let played = harness.sink.played();
    assert_eq!(played[0].0.key, key);
    assert!(played[0].0.cache_hit);
    assert_eq!(harness.tts.call_count(), 0);
}

#[tokio::test]
async fn it_should_synthesize_when_pre_generated_audio_is_missing() {
    let mut harness = PracticeHarness::new();

    let mut turns = four_turn_script().turns().to_vec();
    let absent = ArtifactKey::derive("never generated", Voice::Echo, SpeechModel::Tts1);
    turns[0].cached_audio_ref = Some(absent.to_string());
    harness.engine.start(DialogueScript::new(turns).unwrap()).await.unwrap();
    harness.settle().await;

    assert_eq!(harness.tts.calls(), vec![STAFF_OPENING.to_string()]);
    assert_eq!(harness.storage.len(), 1);
    assert_eq!(harness.engine.state(), EngineState::AwaitingLearnerSpeech);
}

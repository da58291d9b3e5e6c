use super::error::EngineError;
use super::events::{EngineEvent, RECOGNITION_RETRY_MESSAGE, RETRY_MESSAGE, SUCCESS_MESSAGE};
use super::playback::{PlaybackController, PlaybackEvent, PlaybackTicket};
use super::state::{EngineState, HistoryEntry, TurnSession};
use crate::domain::dialogue::{DialogueScript, DialogueTurn, TurnKind};
use crate::domain::scoring::{normalize, ScoreResult, SimilarityScorer};
use crate::domain::settings::PracticeSettings;
use crate::domain::synthesis::{ArtifactKey, AudioRef, SynthesisCache, SynthesisError};
use crate::infrastructure::repositories::{check_recording_size, TranscriptionRepository};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Drives one learner through a dialogue script, turn by turn.
///
/// The engine owns its session. Every operation takes `&mut self`, so
/// inputs are handled one at a time in arrival order; pair it with
/// [`PracticeRunner`](super::PracticeRunner) to feed it from channels.
pub struct TurnEngine {
    cache: Arc<SynthesisCache>,
    transcriber: Option<Arc<dyn TranscriptionRepository>>,
    playback: PlaybackController,
    scorer: SimilarityScorer,
    settings: PracticeSettings,
    events: mpsc::UnboundedSender<EngineEvent>,
    script: Option<DialogueScript>,
    session: Option<TurnSession>,
    history: Vec<HistoryEntry>,
    /// Ticket of the prompt whose completion the engine is waiting for.
    pending_prompt: Option<PlaybackTicket>,
    last_audio: Option<AudioRef>,
}

impl TurnEngine {
    pub fn new(
        cache: Arc<SynthesisCache>,
        playback: PlaybackController,
        settings: PracticeSettings,
    ) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let engine = Self {
            cache,
            transcriber: None,
            playback,
            scorer: SimilarityScorer::new(),
            settings,
            events,
            script: None,
            session: None,
            history: Vec::new(),
            pending_prompt: None,
            last_audio: None,
        };
        (engine, receiver)
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn TranscriptionRepository>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn state(&self) -> EngineState {
        self.session
            .as_ref()
            .map(|session| session.state)
            .unwrap_or_default()
    }

    pub fn session(&self) -> Option<&TurnSession> {
        self.session.as_ref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    pub fn current_turn(&self) -> Option<&DialogueTurn> {
        let index = self.session.as_ref()?.current_turn_index;
        self.script.as_ref()?.get(index)
    }

    /// Begin a new session at the first turn, discarding any previous one.
    pub async fn start(&mut self, script: DialogueScript) -> Result<(), EngineError> {
        if script.is_empty() {
            return Err(EngineError::EmptyScript);
        }

        self.playback.stop();
        self.pending_prompt = None;
        self.last_audio = None;
        self.history.clear();

        let session = TurnSession::new();
        tracing::info!(
            session_id = %session.id,
            turn_count = script.len(),
            learner_role = %self.settings.learner_role,
            "Practice session started"
        );
        self.script = Some(script);
        self.session = Some(session);

        self.present_current_turn().await
    }

    /// Playback of a prompt ended. Completions for anything other than the
    /// current prompt are ignored.
    pub async fn on_prompt_finished(&mut self, ticket: PlaybackTicket) -> Result<(), EngineError> {
        if self.pending_prompt != Some(ticket) {
            tracing::debug!(?ticket, "Ignoring stale playback completion");
            return Ok(());
        }
        self.pending_prompt = None;

        // A replay finishing while the learner is already answering.
        if self.state() != EngineState::PlayingPrompt {
            return Ok(());
        }

        let turn = self.turn_at_cursor()?;
        if self.finish_prompt(&turn).await? {
            self.present_current_turn().await?;
        }
        Ok(())
    }

    /// Score a transcript against the current learner line.
    ///
    /// Returns `None` when the transcript was blank and nothing was scored.
    pub async fn submit_utterance(
        &mut self,
        transcript: &str,
    ) -> Result<Option<ScoreResult>, EngineError> {
        self.ensure_state("submit_utterance", EngineState::AwaitingLearnerSpeech)?;

        if transcript.trim().is_empty() {
            tracing::debug!("Empty transcript, still waiting for the learner");
            return Ok(None);
        }

        let turn = self.turn_at_cursor()?;
        self.set_state(EngineState::Scoring)?;

        let score = self.scorer.score(&turn.text, transcript);
        let bypassed = self.is_bypass_phrase(&turn.text, transcript);
        let success = score.value > self.settings.scoring.success_threshold || bypassed;

        let session = self.session_mut()?;
        session.last_transcript = Some(transcript.to_string());
        session.last_score = Some(score);
        if !success {
            session.retry_count += 1;
        }
        let retry_count = session.retry_count;

        self.set_state(EngineState::Feedback)?;
        tracing::info!(
            turn_number = turn.turn_number,
            score = score.value,
            matched_words = score.matched_words,
            total_words = score.total_words,
            success,
            bypassed,
            retry_count,
            "Utterance scored"
        );

        if success {
            self.emit(EngineEvent::Feedback {
                success: true,
                message: SUCCESS_MESSAGE.to_string(),
                score: Some(score),
            });
            self.append_history(&turn, true);
            tokio::time::sleep(self.settings.timing.success_feedback).await;
            if self.advance()? {
                self.present_current_turn().await?;
            }
        } else {
            self.emit(EngineEvent::Feedback {
                success: false,
                message: RETRY_MESSAGE.to_string(),
                score: Some(score),
            });
            tokio::time::sleep(self.settings.timing.failure_feedback).await;
            self.set_state(EngineState::AwaitingLearnerSpeech)?;
        }

        Ok(Some(score))
    }

    /// Transcribe a recording and score it. Recognition failures ask the
    /// learner to try again without counting as a wrong answer.
    pub async fn submit_recording(
        &mut self,
        audio: Vec<u8>,
    ) -> Result<Option<ScoreResult>, EngineError> {
        self.ensure_state("submit_recording", EngineState::AwaitingLearnerSpeech)?;
        let transcriber = self
            .transcriber
            .clone()
            .ok_or(EngineError::TranscriptionUnavailable)?;

        let outcome = match check_recording_size(audio.len()) {
            Ok(()) => {
                let limit = self.settings.timing.transcription_timeout;
                match tokio::time::timeout(
                    limit,
                    transcriber.transcribe(audio, &self.settings.language),
                )
                .await
                {
                    Ok(Ok(text)) if !text.trim().is_empty() => Ok(text),
                    Ok(Ok(_)) => Err("no speech recognized".to_string()),
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(format!("transcription timed out after {:?}", limit)),
                }
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(transcript) => {
                tracing::debug!(transcript = %transcript, "Recording transcribed");
                self.submit_utterance(&transcript).await
            }
            Err(reason) => {
                tracing::warn!(reason = %reason, "Speech recognition failed");
                self.emit(EngineEvent::Feedback {
                    success: false,
                    message: RECOGNITION_RETRY_MESSAGE.to_string(),
                    score: None,
                });
                Ok(None)
            }
        }
    }

    /// Pass the current learner line without scoring. The canonical text is
    /// recorded as if spoken correctly.
    pub async fn skip(&mut self) -> Result<(), EngineError> {
        self.ensure_state("skip", EngineState::AwaitingLearnerSpeech)?;
        let turn = self.turn_at_cursor()?;

        tracing::info!(turn_number = turn.turn_number, "Learner skipped turn");
        self.playback.stop();
        self.pending_prompt = None;
        self.append_history(&turn, true);

        if self.advance()? {
            self.present_current_turn().await?;
        }
        Ok(())
    }

    /// Play the current line's audio again while the learner is answering.
    pub async fn replay_prompt(&mut self) -> Result<(), EngineError> {
        self.ensure_state("replay_prompt", EngineState::AwaitingLearnerSpeech)?;

        let audio = match self.last_audio.clone() {
            Some(audio) => audio,
            None => {
                let turn = self.turn_at_cursor()?;
                match self.resolve_audio(&turn).await {
                    Ok(audio) => audio,
                    Err(e) => {
                        self.emit(EngineEvent::AudioUnavailable {
                            turn_number: turn.turn_number,
                            reason: e.to_string(),
                        });
                        return Ok(());
                    }
                }
            }
        };

        let ticket = self.playback.play(audio.clone(), self.settings.speech_rate);
        self.last_audio = Some(audio);
        self.pending_prompt = Some(ticket);
        Ok(())
    }

    pub fn register_gesture(&mut self) {
        self.playback.register_gesture();
    }

    /// Tear down the session and silence playback.
    pub fn stop(&mut self) {
        self.playback.stop();
        self.pending_prompt = None;
        self.last_audio = None;
        if let Some(session) = self.session.take() {
            tracing::info!(session_id = %session.id, "Practice session stopped");
        }
        self.script = None;
    }

    pub async fn handle_playback_event(&mut self, event: PlaybackEvent) -> Result<(), EngineError> {
        match event {
            PlaybackEvent::Finished(ticket) => self.on_prompt_finished(ticket).await,
            PlaybackEvent::Interrupted(ticket) => {
                tracing::debug!(?ticket, "Prompt playback interrupted");
                Ok(())
            }
            PlaybackEvent::TapToPlay(ticket) => {
                if self.pending_prompt == Some(ticket) {
                    self.emit(EngineEvent::TapToPlay);
                }
                Ok(())
            }
        }
    }

    /// Announce the turn at the cursor and start its prompt. System turns
    /// whose audio cannot be produced advance on their own, so this loops
    /// until it reaches a turn that waits on playback or the learner.
    async fn present_current_turn(&mut self) -> Result<(), EngineError> {
        loop {
            let index = self.session_mut()?.current_turn_index;
            let turn = self.turn_at_cursor()?;

            self.playback.stop();
            self.pending_prompt = None;
            self.set_state(EngineState::PlayingPrompt)?;
            self.emit(EngineEvent::TurnChanged {
                index,
                turn: turn.clone(),
            });

            match self.resolve_audio(&turn).await {
                Ok(audio) => {
                    let ticket = self.playback.play(audio.clone(), self.settings.speech_rate);
                    tracing::debug!(
                        turn_number = turn.turn_number,
                        cache_hit = audio.cache_hit,
                        ?ticket,
                        "Playing prompt"
                    );
                    self.last_audio = Some(audio);
                    self.pending_prompt = Some(ticket);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        turn_number = turn.turn_number,
                        error = %e,
                        "Prompt audio unavailable, continuing without it"
                    );
                    self.last_audio = None;
                    self.emit(EngineEvent::AudioUnavailable {
                        turn_number: turn.turn_number,
                        reason: e.to_string(),
                    });
                }
            }

            if !self.finish_prompt(&turn).await? {
                return Ok(());
            }
        }
    }

    /// Returns `true` when the cursor moved to a turn that still needs
    /// presenting.
    async fn finish_prompt(&mut self, turn: &DialogueTurn) -> Result<bool, EngineError> {
        match turn.kind(self.settings.learner_role) {
            TurnKind::Learner => {
                self.set_state(EngineState::AwaitingLearnerSpeech)?;
                Ok(false)
            }
            TurnKind::System => {
                self.set_state(EngineState::AutoAdvancing)?;
                self.append_history(turn, false);
                tokio::time::sleep(self.settings.timing.auto_advance_delay).await;
                self.advance()
            }
        }
    }

    /// Move the cursor forward. Returns `false` once the script is done.
    fn advance(&mut self) -> Result<bool, EngineError> {
        self.set_state(EngineState::Advancing)?;
        let turn_count = self.script.as_ref().map(|s| s.len()).unwrap_or(0);

        let session = self.session_mut()?;
        if session.current_turn_index + 1 < turn_count {
            session.current_turn_index += 1;
            session.retry_count = 0;
            session.last_transcript = None;
            session.last_score = None;
            return Ok(true);
        }

        session.current_turn_index = turn_count;
        session.state = EngineState::Completed;
        let session_id = session.id;

        self.playback.stop();
        self.pending_prompt = None;
        tracing::info!(session_id = %session_id, "Practice session completed");
        self.emit(EngineEvent::Completed);
        Ok(false)
    }

    async fn resolve_audio(&self, turn: &DialogueTurn) -> Result<AudioRef, SynthesisError> {
        let voice = self.settings.voice;
        let model = self.settings.model;

        let stored_key = turn
            .cached_audio_ref
            .as_deref()
            .and_then(ArtifactKey::from_stored);
        if let Some(key) = stored_key {
            match self.cache.lookup(&key).await {
                Some(artifact) => {
                    return Ok(AudioRef {
                        key: artifact.key,
                        locator: artifact.locator,
                        cache_hit: true,
                    });
                }
                None => {
                    tracing::warn!(
                        turn_number = turn.turn_number,
                        key = %key,
                        "Pre-generated audio missing, synthesizing instead"
                    );
                }
            }
        }

        let resolution = self.cache.resolve(&turn.text, voice, model).await?;
        Ok(resolution.audio_ref())
    }

    fn is_bypass_phrase(&self, expected: &str, transcript: &str) -> bool {
        let Some(phrase) = &self.settings.scoring.bypass_phrase else {
            return false;
        };
        let spoken = normalize(transcript);
        !spoken.is_empty() && spoken == normalize(phrase) && spoken != normalize(expected)
    }

    fn append_history(&mut self, turn: &DialogueTurn, spoken_by_learner: bool) {
        let entry = HistoryEntry {
            role: turn.role,
            text: turn.text.clone(),
            translation: turn.translation.clone(),
            spoken_by_learner,
        };
        self.history.push(entry.clone());
        self.emit(EngineEvent::TranscriptAppended(entry));
    }

    fn turn_at_cursor(&self) -> Result<DialogueTurn, EngineError> {
        self.current_turn().cloned().ok_or(EngineError::NotStarted)
    }

    fn ensure_state(
        &self,
        operation: &'static str,
        expected: EngineState,
    ) -> Result<(), EngineError> {
        let state = self.state();
        if state != expected {
            tracing::debug!(operation, state = %state, "Rejected engine operation");
            return Err(EngineError::InvalidState { operation, state });
        }
        Ok(())
    }

    fn session_mut(&mut self) -> Result<&mut TurnSession, EngineError> {
        self.session.as_mut().ok_or(EngineError::NotStarted)
    }

    fn set_state(&mut self, state: EngineState) -> Result<(), EngineError> {
        let session = self.session_mut()?;
        tracing::trace!(from = %session.state, to = %state, "Engine state change");
        session.state = state;
        Ok(())
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }
}

use super::engine::TurnEngine;
use super::playback::PlaybackEvent;
use crate::domain::dialogue::DialogueScript;
use tokio::sync::mpsc;

/// Inputs from the UI shell.
#[derive(Debug)]
pub enum PracticeCommand {
    Start(DialogueScript),
    SubmitUtterance(String),
    SubmitRecording(Vec<u8>),
    Skip,
    ReplayPrompt,
    Gesture,
    Stop,
}

/// Feeds UI commands and playback completions into a [`TurnEngine`], one
/// at a time.
pub struct PracticeRunner {
    engine: TurnEngine,
    playback_events: mpsc::UnboundedReceiver<PlaybackEvent>,
}

impl PracticeRunner {
    pub fn new(
        engine: TurnEngine,
        playback_events: mpsc::UnboundedReceiver<PlaybackEvent>,
    ) -> Self {
        Self {
            engine,
            playback_events,
        }
    }

    /// Run until the command channel closes, then hand the engine back.
    pub async fn run(mut self, mut commands: mpsc::Receiver<PracticeCommand>) -> TurnEngine {
        tracing::info!("Practice runner started");

        loop {
            tokio::select! {
                command = commands.recv() => {
                    match command {
                        Some(command) => self.dispatch(command).await,
                        None => break,
                    }
                }
                Some(event) = self.playback_events.recv() => {
                    if let Err(e) = self.engine.handle_playback_event(event).await {
                        tracing::warn!(error = %e, "Failed to handle playback event");
                    }
                }
            }
        }

        self.engine.stop();
        tracing::info!("Command channel closed, practice runner stopped");
        self.engine
    }

    async fn dispatch(&mut self, command: PracticeCommand) {
        let result = match command {
            PracticeCommand::Start(script) => self.engine.start(script).await,
            PracticeCommand::SubmitUtterance(transcript) => {
                self.engine.submit_utterance(&transcript).await.map(|_| ())
            }
            PracticeCommand::SubmitRecording(audio) => {
                self.engine.submit_recording(audio).await.map(|_| ())
            }
            PracticeCommand::Skip => self.engine.skip().await,
            PracticeCommand::ReplayPrompt => self.engine.replay_prompt().await,
            PracticeCommand::Gesture => {
                self.engine.register_gesture();
                Ok(())
            }
            PracticeCommand::Stop => {
                self.engine.stop();
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, state = %self.engine.state(), "Practice command rejected");
        }
    }
}

use crate::domain::synthesis::AudioRef;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Identifies one `play()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackTicket(u64);

/// Every ticket ends with exactly one `Finished` or `Interrupted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback ended, including when the device reported an error.
    Finished(PlaybackTicket),
    /// Playback was stopped or superseded before it ended.
    Interrupted(PlaybackTicket),
    /// Playback is parked until the learner's first gesture.
    TapToPlay(PlaybackTicket),
}

/// The audio output device (an `<audio>` element in the web shell).
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Play `audio` at `rate` and return once it has ended.
    async fn play(&self, audio: &AudioRef, rate: f32) -> Result<(), String>;

    /// Silence the device immediately.
    fn stop(&self) {}
}

/// Browsers refuse autoplay until the user has clicked, typed or touched
/// something. Shared by every controller in a session.
#[derive(Debug, Default)]
pub struct GestureGate {
    unlocked: AtomicBool,
}

impl GestureGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unlocked() -> Self {
        Self {
            unlocked: AtomicBool::new(true),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::Acquire)
    }

    /// Returns `true` for the gesture that unlocked the gate.
    pub fn unlock(&self) -> bool {
        !self.unlocked.swap(true, Ordering::AcqRel)
    }
}

struct ParkedPlayback {
    ticket: PlaybackTicket,
    audio: AudioRef,
    rate: f32,
}

/// Sequences prompt audio: one active playback at a time.
pub struct PlaybackController {
    sink: Arc<dyn AudioSink>,
    gate: Arc<GestureGate>,
    events: mpsc::UnboundedSender<PlaybackEvent>,
    next_ticket: u64,
    active: Arc<Mutex<Option<PlaybackTicket>>>,
    task: Option<JoinHandle<()>>,
    parked: Option<ParkedPlayback>,
}

impl PlaybackController {
    pub fn new(
        sink: Arc<dyn AudioSink>,
        gate: Arc<GestureGate>,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            sink,
            gate,
            events,
            next_ticket: 0,
            active: Arc::new(Mutex::new(None)),
            task: None,
            parked: None,
        };
        (controller, receiver)
    }

    /// Start playing `audio`, interrupting whatever was playing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn play(&mut self, audio: AudioRef, rate: f32) -> PlaybackTicket {
        self.stop();

        self.next_ticket += 1;
        let ticket = PlaybackTicket(self.next_ticket);
        set_active(&self.active, Some(ticket));

        if !self.gate.is_unlocked() {
            tracing::debug!(ticket = ticket.0, "Autoplay locked, waiting for a user gesture");
            self.parked = Some(ParkedPlayback {
                ticket,
                audio,
                rate,
            });
            let _ = self.events.send(PlaybackEvent::TapToPlay(ticket));
            return ticket;
        }

        self.spawn(ticket, audio, rate);
        ticket
    }

    /// Record a learner gesture. Unlocks autoplay for the rest of the
    /// session and starts any playback that was waiting for it.
    pub fn register_gesture(&mut self) {
        if self.gate.unlock() {
            tracing::info!("User gesture received, autoplay unlocked");
        }

        if let Some(parked) = self.parked.take() {
            if current_active(&self.active) == Some(parked.ticket) {
                self.spawn(parked.ticket, parked.audio, parked.rate);
            }
        }
    }

    /// Stop playback. Safe to call at any time, any number of times.
    pub fn stop(&mut self) {
        self.parked = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }

        if let Some(ticket) = take_active(&self.active) {
            self.sink.stop();
            tracing::debug!(ticket = ticket.0, "Playback interrupted");
            let _ = self.events.send(PlaybackEvent::Interrupted(ticket));
        }
    }

    pub fn is_active(&self) -> bool {
        current_active(&self.active).is_some()
    }

    fn spawn(&mut self, ticket: PlaybackTicket, audio: AudioRef, rate: f32) {
        let sink = self.sink.clone();
        let active = self.active.clone();
        let events = self.events.clone();

        self.task = Some(tokio::spawn(async move {
            if let Err(e) = sink.play(&audio, rate).await {
                tracing::warn!(
                    ticket = ticket.0,
                    locator = %audio.locator,
                    error = %e,
                    "Audio playback failed, treating as finished"
                );
            }

            if release(&active, ticket) {
                let _ = events.send(PlaybackEvent::Finished(ticket));
            }
        }));
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn lock(
    active: &Mutex<Option<PlaybackTicket>>,
) -> std::sync::MutexGuard<'_, Option<PlaybackTicket>> {
    active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn set_active(active: &Mutex<Option<PlaybackTicket>>, ticket: Option<PlaybackTicket>) {
    *lock(active) = ticket;
}

fn current_active(active: &Mutex<Option<PlaybackTicket>>) -> Option<PlaybackTicket> {
    *lock(active)
}

fn take_active(active: &Mutex<Option<PlaybackTicket>>) -> Option<PlaybackTicket> {
    lock(active).take()
}

/// Clear `ticket` if it is still the active one.
fn release(active: &Mutex<Option<PlaybackTicket>>, ticket: PlaybackTicket) -> bool {
    let mut guard = lock(active);
    if *guard == Some(ticket) {
        *guard = None;
        true
    } else {
        false
    }
}

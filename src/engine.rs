//! Event-driven engine loop.
//!
//! Single-threaded, cooperative: every input event (fragment, status,
//! navigation, save, reset) is processed to completion before the next,
//! so the transcript has exactly one writer and readers only ever see
//! snapshots. The only suspending work is the reveal timeline, which the
//! scheduler runs between events and cancels whenever the displayed
//! content changes.

use crate::config::EngineConfig;
use crate::messages::{EngineEvent, InputEvent, NavigateIntent, TranscriptSnapshot};
use crate::reconciler::{FragmentOutcome, Reconciler};
use crate::reveal::{RevealEvent, RevealScheduler};
use crate::saved::SavedTurnStore;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Broadcast capacity for engine events. Reveal progress dominates the
/// volume; a slow UI subscriber lags rather than blocking the loop.
const EVENT_CAPACITY: usize = 256;

/// The transcript engine.
///
/// Owns the reconciler, the reveal scheduler, and (optionally) the
/// saved-turn store, and broadcasts [`EngineEvent`]s to subscribers.
pub struct Engine {
    config: EngineConfig,
    reconciler: Reconciler,
    scheduler: RevealScheduler,
    saved: Option<SavedTurnStore>,
    events_tx: broadcast::Sender<EngineEvent>,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let scheduler = RevealScheduler::new(config.reveal.word_interval());
        Self {
            reconciler: Reconciler::new(config.filler.clone()),
            scheduler,
            saved: None,
            config,
            events_tx,
        }
    }

    /// Attach a saved-turn store for `SaveTurn` events.
    #[must_use]
    pub fn with_saved_store(mut self, store: SavedTurnStore) -> Self {
        self.saved = Some(store);
        self
    }

    /// Subscribe to engine output events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events_tx.subscribe()
    }

    /// Point-in-time snapshot of the transcript and cursor.
    #[must_use]
    pub fn snapshot(&self) -> TranscriptSnapshot {
        self.reconciler.transcript().snapshot()
    }

    /// Placeholder line for the playback surface while no turn is
    /// selected (empty transcript or fresh session).
    #[must_use]
    pub fn placeholder(&self) -> String {
        self.config.session.placeholder()
    }

    /// Process one input event to completion.
    ///
    /// Must run inside a tokio runtime: animated reveals and their
    /// forwarders are spawned tasks.
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::Fragment { text } => self.on_fragment(&text),
            InputEvent::Status { text } => self.on_status(&text),
            InputEvent::UserSentMessage => self.reconciler.user_sent_message(),
            InputEvent::Navigate { intent } => self.on_navigate(intent),
            InputEvent::SaveTurn => self.on_save_turn(),
            InputEvent::Reset => self.on_reset(),
        }
    }

    /// Run until `cancel` fires or the input channel closes.
    pub async fn run(mut self, mut input_rx: mpsc::Receiver<InputEvent>, cancel: CancellationToken) {
        info!("engine loop started");
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("engine loop cancelled");
                    break;
                }
                event = input_rx.recv() => {
                    match event {
                        Some(event) => self.handle(event),
                        None => {
                            info!("engine input channel closed");
                            break;
                        }
                    }
                }
            }
        }
        self.scheduler.cancel();
    }

    fn on_fragment(&mut self, text: &str) {
        let outcome = self.reconciler.on_fragment(text);
        let displayed_changed = match outcome {
            FragmentOutcome::NewTurn(_) => {
                // A different turn is now displayed; its words start hidden.
                self.scheduler.reset_baseline();
                true
            }
            FragmentOutcome::TailReplaced(index) => {
                // Same turn grew; keep the baseline so only new words
                // animate. If the user has navigated away from the tail
                // the displayed turn did not change and the reveal
                // timeline must not be re-keyed.
                self.reconciler.transcript().cursor() == Some(index)
            }
        };
        self.emit_snapshot();
        if displayed_changed {
            self.present_displayed(self.config.reveal.animate);
        }
    }

    fn on_status(&mut self, text: &str) {
        let terminal = self.reconciler.on_status(text);
        let _ = self.events_tx.send(EngineEvent::Status {
            text: text.to_owned(),
            terminal,
        });
        if terminal {
            self.emit_snapshot();
        }
    }

    fn on_navigate(&mut self, intent: NavigateIntent) {
        let transcript = self.reconciler.transcript_mut();
        let moved = match intent {
            NavigateIntent::Prev => transcript.move_prev(),
            NavigateIntent::Next => transcript.move_next(),
            NavigateIntent::Index(i) => transcript.move_to(usize::try_from(i).unwrap_or(0)),
        };
        if moved {
            self.emit_snapshot();
            // Manual navigation never replays the animation.
            self.scheduler.reset_baseline();
            self.present_displayed(false);
        }
    }

    fn on_save_turn(&mut self) {
        let Some(text) = self
            .reconciler
            .transcript()
            .displayed()
            .map(|t| t.text.clone())
        else {
            return;
        };
        let Some(store) = self.saved.as_mut() else {
            warn!("save requested but no saved-turn store attached");
            return;
        };
        match store.save(&text, &self.config.session.profile) {
            Ok(appended) => {
                let _ = self.events_tx.send(EngineEvent::TurnSaved {
                    already_saved: !appended,
                });
            }
            Err(e) => warn!(error = %e, "failed to persist saved turn"),
        }
    }

    fn on_reset(&mut self) {
        self.scheduler.cancel();
        self.scheduler.reset_baseline();
        self.reconciler.reset();
        self.emit_snapshot();
    }

    fn emit_snapshot(&self) {
        let snapshot = self.snapshot();
        let displayed_html = snapshot
            .displayed_text()
            .map(crate::render::render_turn_html);
        let _ = self.events_tx.send(EngineEvent::Transcript {
            snapshot,
            displayed_html,
        });
    }

    /// Re-key the reveal timeline onto the displayed turn.
    fn present_displayed(&mut self, animate: bool) {
        let Some(turn_index) = self.reconciler.transcript().cursor() else {
            self.scheduler.cancel();
            return;
        };
        let text = self
            .reconciler
            .transcript()
            .displayed()
            .map(|t| t.text.clone())
            .unwrap_or_default();

        let mut reveal_rx = self.scheduler.present(&text, animate);
        let events_tx = self.events_tx.clone();
        // Forward this timeline into the broadcast stream. The previous
        // timeline's sender is already cancelled, so its forwarder ends
        // without emitting a completion.
        tokio::spawn(async move {
            while let Some(event) = reveal_rx.recv().await {
                let mapped = match event {
                    RevealEvent::Progress { visible, total } => EngineEvent::Reveal {
                        turn: turn_index,
                        visible,
                        total,
                    },
                    RevealEvent::Completed { .. } => EngineEvent::RevealCompleted { turn: turn_index },
                };
                if events_tx.send(mapped).is_err() {
                    break;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn fast_engine() -> Engine {
        let mut config = EngineConfig::default();
        config.reveal.word_interval_ms = 2;
        Engine::new(config)
    }

    fn fragment(text: &str) -> InputEvent {
        InputEvent::Fragment {
            text: text.to_owned(),
        }
    }

    #[tokio::test]
    async fn fragment_flow_updates_snapshot() {
        let mut engine = fast_engine();
        engine.handle(fragment("Hello"));
        engine.handle(fragment("Hello there"));

        let snap = engine.snapshot();
        assert_eq!(snap.turns.len(), 1);
        assert_eq!(snap.turns[0].text, "Hello there");
        assert_eq!(snap.cursor, 0);
    }

    #[tokio::test]
    async fn terminal_status_emits_closed_snapshot() {
        let mut engine = fast_engine();
        let mut rx = engine.subscribe();

        engine.handle(fragment("Hello"));
        engine.handle(InputEvent::Status {
            text: "Ready".to_owned(),
        });

        let mut saw_terminal_status = false;
        let mut saw_closed_turn = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                EngineEvent::Status { terminal, .. } if terminal => saw_terminal_status = true,
                EngineEvent::Transcript { snapshot, .. }
                    if snapshot.turns.first().is_some_and(|t| !t.is_open) =>
                {
                    saw_closed_turn = true;
                }
                _ => {}
            }
        }
        assert!(saw_terminal_status);
        assert!(saw_closed_turn);
    }

    #[tokio::test]
    async fn navigation_clamps_and_reveals_instantly() {
        let mut engine = fast_engine();
        engine.handle(fragment("first"));
        engine.handle(InputEvent::Status {
            text: "Ready".to_owned(),
        });
        engine.handle(InputEvent::UserSentMessage);
        engine.handle(fragment("second"));

        engine.handle(InputEvent::Navigate {
            intent: NavigateIntent::Index(99),
        });
        assert_eq!(engine.snapshot().cursor, 1);

        engine.handle(InputEvent::Navigate {
            intent: NavigateIntent::Index(-5),
        });
        assert_eq!(engine.snapshot().cursor, 0);

        engine.handle(InputEvent::Navigate {
            intent: NavigateIntent::Prev,
        });
        assert_eq!(engine.snapshot().cursor, 0);
        engine.handle(InputEvent::Navigate {
            intent: NavigateIntent::Prev,
        });
        assert_eq!(engine.snapshot().cursor, 0);
    }

    #[tokio::test]
    async fn growing_tail_does_not_re_reveal_navigated_turn() {
        use std::time::Duration;

        let mut engine = fast_engine();
        let mut rx = engine.subscribe();

        engine.handle(fragment("first answer"));
        engine.handle(InputEvent::Status {
            text: "Ready".to_owned(),
        });
        engine.handle(InputEvent::UserSentMessage);
        engine.handle(fragment("second answer growing here"));
        engine.handle(InputEvent::Navigate {
            intent: NavigateIntent::Prev,
        });
        assert_eq!(engine.snapshot().cursor, 0);

        // Let the in-flight reveal timelines run out, then drain.
        tokio::time::sleep(Duration::from_millis(50)).await;
        while rx.try_recv().is_ok() {}

        // Tail keeps growing while turn 0 stays displayed: the reveal
        // timeline must not be re-keyed for an unchanged turn.
        engine.handle(fragment("second answer growing here with more"));
        engine.handle(fragment("second answer growing here with even more"));
        tokio::time::sleep(Duration::from_millis(50)).await;

        while let Ok(event) = rx.try_recv() {
            assert!(
                !matches!(
                    event,
                    EngineEvent::Reveal { .. } | EngineEvent::RevealCompleted { .. }
                ),
                "unexpected reveal event for unchanged displayed turn: {event:?}"
            );
        }
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let mut engine = fast_engine();
        engine.handle(fragment("something"));
        engine.handle(InputEvent::Reset);

        let snap = engine.snapshot();
        assert!(snap.turns.is_empty());
        assert_eq!(snap.cursor, -1);
        assert_eq!(snap.displayed_text(), None);
        assert_eq!(engine.placeholder(), "Hey, I'm listening to your Job Interview");
    }

    #[tokio::test]
    async fn save_turn_roundtrips_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SavedTurnStore::open(dir.path().join("saved.json")).unwrap();
        let mut engine = fast_engine().with_saved_store(store);
        let mut rx = engine.subscribe();

        engine.handle(fragment("Answer worth keeping"));
        engine.handle(InputEvent::SaveTurn);
        engine.handle(InputEvent::SaveTurn);

        let mut saves = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let EngineEvent::TurnSaved { already_saved } = event {
                saves.push(already_saved);
            }
        }
        assert_eq!(saves, vec![false, true]);
    }
}

//! Event and snapshot types passed between the engine and its host.
//!
//! These are intentionally lightweight so the engine can emit events
//! without blocking the event loop, and serde-derived so the stdio
//! bridge can carry them as newline-delimited JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input events consumed by the engine.
///
/// All engine state transitions happen in reaction to one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Raw or growing-transcript text from the generation backend.
    Fragment { text: String },
    /// Free-text status line from the backend/capture layer.
    Status { text: String },
    /// The user sent an outbound message; the next fragment starts a
    /// fresh turn.
    UserSentMessage,
    /// User navigation intent.
    Navigate { intent: NavigateIntent },
    /// Persist the currently displayed turn to the saved-turn store.
    SaveTurn,
    /// Clear all session state (new-session start).
    Reset,
}

/// Where the user wants the transcript cursor to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigateIntent {
    /// One turn back.
    Prev,
    /// One turn forward.
    Next,
    /// Jump to a specific turn index. Signed to mirror the snapshot's
    /// `-1` cursor convention; out-of-range values clamp, negative
    /// values clamp to the first turn.
    Index(i64),
}

/// Events emitted by the engine for the playback surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// The transcript or cursor changed; carries a full point-in-time
    /// snapshot (single-writer discipline: readers never touch live
    /// state) plus the displayed turn rendered as word-span HTML.
    Transcript {
        snapshot: TranscriptSnapshot,
        displayed_html: Option<String>,
    },
    /// Status text passed through unchanged for display.
    Status { text: String, terminal: bool },
    /// One more word of the displayed turn became visible.
    Reveal {
        turn: usize,
        visible: usize,
        total: usize,
    },
    /// The displayed turn finished revealing.
    RevealCompleted { turn: usize },
    /// Result of a save-turn request.
    TurnSaved { already_saved: bool },
}

/// A read-only snapshot of one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    /// Full current text of the turn.
    pub text: String,
    /// True while the turn is still receiving fragments.
    pub is_open: bool,
    /// When the turn was first created.
    pub created_at: DateTime<Utc>,
}

/// A read-only snapshot of the transcript and cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSnapshot {
    /// All turns, in chronological order.
    pub turns: Vec<TurnSnapshot>,
    /// Index of the displayed turn, or -1 when nothing is selected.
    pub cursor: i64,
}

impl TranscriptSnapshot {
    /// Position counter for the UI, e.g. `"3/7"`. Empty when the
    /// transcript is empty.
    #[must_use]
    pub fn counter(&self) -> String {
        if self.turns.is_empty() {
            String::new()
        } else {
            format!("{}/{}", self.cursor + 1, self.turns.len())
        }
    }

    /// Text of the displayed turn, if one is selected.
    #[must_use]
    pub fn displayed_text(&self) -> Option<&str> {
        usize::try_from(self.cursor)
            .ok()
            .and_then(|i| self.turns.get(i))
            .map(|t| t.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn input_event_json_shape() {
        let event: InputEvent =
            serde_json::from_str(r#"{"type":"fragment","text":"hello"}"#).unwrap();
        assert!(matches!(event, InputEvent::Fragment { text } if text == "hello"));

        let event: InputEvent =
            serde_json::from_str(r#"{"type":"navigate","intent":"prev"}"#).unwrap();
        assert!(matches!(
            event,
            InputEvent::Navigate {
                intent: NavigateIntent::Prev
            }
        ));

        // Negative indices are valid wire input (same convention as the
        // snapshot's -1 cursor); navigation clamps them.
        let event: InputEvent =
            serde_json::from_str(r#"{"type":"navigate","intent":{"index":-1}}"#).unwrap();
        assert!(matches!(
            event,
            InputEvent::Navigate {
                intent: NavigateIntent::Index(-1)
            }
        ));
    }

    #[test]
    fn counter_formats_position() {
        let snapshot = TranscriptSnapshot {
            turns: vec![
                TurnSnapshot {
                    text: "a".to_owned(),
                    is_open: false,
                    created_at: Utc::now(),
                },
                TurnSnapshot {
                    text: "b".to_owned(),
                    is_open: true,
                    created_at: Utc::now(),
                },
            ],
            cursor: 1,
        };
        assert_eq!(snapshot.counter(), "2/2");
        assert_eq!(snapshot.displayed_text(), Some("b"));
    }

    #[test]
    fn empty_snapshot_has_no_counter_or_text() {
        let snapshot = TranscriptSnapshot {
            turns: Vec::new(),
            cursor: -1,
        };
        assert_eq!(snapshot.counter(), "");
        assert_eq!(snapshot.displayed_text(), None);
    }
}

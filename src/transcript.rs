//! Ordered turn history with a clamped navigation cursor.
//!
//! The transcript is the single source of truth for what the playback
//! surface shows. It has exactly one writer (the reconciler / engine);
//! readers only ever see cloned [`TranscriptSnapshot`]s.

use crate::messages::{TranscriptSnapshot, TurnSnapshot};
use chrono::{DateTime, Utc};

/// One logical unit of assistant output.
#[derive(Debug, Clone)]
pub struct Turn {
    /// Current full text. Mutable while the turn is open: the backend
    /// resends the whole growing transcript, so each update replaces
    /// this wholesale rather than appending.
    pub text: String,
    /// True while the turn is still receiving fragments. Cleared once
    /// by a terminal status signal; never set again.
    pub is_open: bool,
    /// When the turn was first created.
    pub created_at: DateTime<Utc>,
}

impl Turn {
    fn open(text: String) -> Self {
        Self {
            text,
            is_open: true,
            created_at: Utc::now(),
        }
    }
}

/// Ordered turn history plus the index of the displayed turn.
///
/// Invariant: `cursor` is `None` exactly when no turn is selected,
/// otherwise `cursor < turns.len()`. Every mutation re-validates this.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
    cursor: Option<usize>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Index of the displayed turn, if any.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The displayed turn, if any.
    #[must_use]
    pub fn displayed(&self) -> Option<&Turn> {
        self.cursor.and_then(|i| self.turns.get(i))
    }

    /// The most recent turn, if any.
    #[must_use]
    pub fn tail(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Append a new open turn and move the cursor to it.
    ///
    /// Returns the new turn's index.
    pub fn push_open(&mut self, text: String) -> usize {
        self.turns.push(Turn::open(text));
        let index = self.turns.len() - 1;
        self.cursor = Some(index);
        index
    }

    /// Replace the tail turn's text wholesale.
    ///
    /// No-op if the transcript is empty.
    pub fn replace_tail_text(&mut self, text: String) {
        if let Some(turn) = self.turns.last_mut() {
            turn.text = text;
        }
    }

    /// Close the tail turn. No-op if the transcript is empty.
    pub fn close_tail(&mut self) {
        if let Some(turn) = self.turns.last_mut() {
            turn.is_open = false;
        }
    }

    /// Move the cursor to `index`, clamped to the valid range.
    ///
    /// Returns `true` if the cursor actually moved. No-op on an empty
    /// transcript.
    pub fn move_to(&mut self, index: usize) -> bool {
        if self.turns.is_empty() {
            return false;
        }
        let clamped = index.min(self.turns.len() - 1);
        let moved = self.cursor != Some(clamped);
        self.cursor = Some(clamped);
        moved
    }

    /// Move one turn back. Returns `true` if the cursor moved.
    pub fn move_prev(&mut self) -> bool {
        match self.cursor {
            Some(i) if i > 0 => self.move_to(i - 1),
            _ => false,
        }
    }

    /// Move one turn forward. Returns `true` if the cursor moved.
    pub fn move_next(&mut self) -> bool {
        match self.cursor {
            Some(i) => self.move_to(i + 1),
            None if !self.turns.is_empty() => self.move_to(0),
            None => false,
        }
    }

    /// Clear all turns and deselect. Used at new-session start.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.cursor = None;
    }

    /// Point-in-time snapshot for readers.
    #[must_use]
    pub fn snapshot(&self) -> TranscriptSnapshot {
        TranscriptSnapshot {
            turns: self
                .turns
                .iter()
                .map(|t| TurnSnapshot {
                    text: t.text.clone(),
                    is_open: t.is_open,
                    created_at: t.created_at,
                })
                .collect(),
            cursor: self.cursor.map_or(-1, |i| i as i64),
        }
    }
}

//! Streaming fragment reconciliation.
//!
//! The generation backend streams ever-growing partial transcripts rather
//! than deltas, interleaved with free-text status lines. The reconciler
//! decides, per fragment, whether it replaces the open tail turn or starts
//! a new one, and owns the only mutable reference to the [`Transcript`].
//!
//! Session-level expectation is a single explicit state machine
//! ([`SessionStatus`]) rather than loose flags, so "awaiting a fresh
//! reply" and "tail still open" can never contradict each other: the
//! former lives here, the latter on the turn itself.

use crate::classifier::{self, FragmentKind};
use crate::config::FillerConfig;
use crate::transcript::Transcript;
use tracing::debug;

/// Session-level reconciliation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No session activity yet (or just reset).
    #[default]
    Idle,
    /// Normal streaming: fragments reconcile against the tail turn.
    Listening,
    /// The user just sent an outbound message; the very next fragment
    /// starts a fresh turn no matter what.
    AwaitingNewTurn,
    /// The backend reported an error; the tail turn has been closed.
    Error,
}

/// What a fragment did to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// A new open turn was appended at this index (cursor moved there).
    NewTurn(usize),
    /// The open tail turn's text was replaced wholesale.
    TailReplaced(usize),
}

/// Single writer for transcript state.
#[derive(Debug)]
pub struct Reconciler {
    transcript: Transcript,
    status: SessionStatus,
    filler: FillerConfig,
}

impl Reconciler {
    #[must_use]
    pub fn new(filler: FillerConfig) -> Self {
        Self {
            transcript: Transcript::new(),
            status: SessionStatus::Idle,
            filler,
        }
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Navigation needs cursor mutation but nothing else; hand the
    /// transcript out mutably only to the engine that owns us.
    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// Apply one incoming fragment.
    ///
    /// Rules, evaluated in order:
    /// 1. Awaiting a fresh reply, or empty history: append a new open turn.
    /// 2. Tail open and fragment substantive: replace the tail's text
    ///    (the fragment is the authoritative full text, not a delta).
    /// 3. Otherwise (tail closed, or filler while the tail is open):
    ///    append a new open turn.
    ///
    /// Empty fragments are accepted and produce empty turns.
    pub fn on_fragment(&mut self, fragment: &str) -> FragmentOutcome {
        if self.status == SessionStatus::AwaitingNewTurn || self.transcript.is_empty() {
            self.status = SessionStatus::Listening;
            let index = self.transcript.push_open(fragment.to_owned());
            debug!(index, "fragment started awaited turn");
            return FragmentOutcome::NewTurn(index);
        }

        let tail_open = self.transcript.tail().is_some_and(|t| t.is_open);
        let kind = classifier::classify(&self.filler, fragment);

        if tail_open && kind == FragmentKind::Substantive {
            self.transcript.replace_tail_text(fragment.to_owned());
            let index = self.transcript.len() - 1;
            debug!(index, "fragment replaced open tail");
            FragmentOutcome::TailReplaced(index)
        } else {
            let index = self.transcript.push_open(fragment.to_owned());
            debug!(index, filler = (kind == FragmentKind::Filler), "fragment opened new turn");
            FragmentOutcome::NewTurn(index)
        }
    }

    /// Apply one status line. Returns `true` if the status was terminal.
    ///
    /// A terminal status (ready / listening / error marker, matched
    /// case-insensitively) closes the tail turn; this is the only way a
    /// turn transitions from open to closed.
    pub fn on_status(&mut self, text: &str) -> bool {
        if !is_terminal_status(text) {
            return false;
        }
        self.transcript.close_tail();
        let lowered = text.to_lowercase();
        self.status = if lowered.contains("error") {
            SessionStatus::Error
        } else {
            SessionStatus::Listening
        };
        debug!(status = ?self.status, "terminal status closed tail turn");
        true
    }

    /// Mark that the user sent an outbound message: the next fragment
    /// must start a clean new turn, however short it is.
    pub fn user_sent_message(&mut self) {
        self.status = SessionStatus::AwaitingNewTurn;
    }

    /// Clear all session state. Used at new-session start.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.status = SessionStatus::Idle;
        debug!("session reset");
    }
}

/// Whether a free-text status line marks the current turn as finished.
#[must_use]
pub fn is_terminal_status(text: &str) -> bool {
    let lowered = text.to_lowercase();
    ["ready", "listening", "error"]
        .iter()
        .any(|marker| lowered.contains(marker))
}

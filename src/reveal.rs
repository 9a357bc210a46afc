//! Timed word-by-word reveal of the displayed turn.
//!
//! Each call to [`RevealScheduler::present`] produces a stream of
//! [`RevealEvent`]s that the playback surface consumes to mark words
//! visible. At most one timeline is live at a time: a new `present`
//! cancels the previous one through its cancellation token, and a
//! cancelled timeline never emits [`RevealEvent::Completed`].
//!
//! The word baseline survives across calls so that a growing turn only
//! animates its newly appended words; previously revealed words are
//! caught up instantly.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One step of a reveal timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealEvent {
    /// `visible` words of `total` are now on screen.
    Progress { visible: usize, total: usize },
    /// The whole turn is visible. Emitted exactly once per timeline
    /// that runs to completion, never by a cancelled one.
    Completed { total: usize },
}

/// Count reveal tokens in a turn's markdown text.
///
/// Words are whitespace-delimited. Text inside a fenced or indented
/// code block is excluded entirely: blocks render without word spans
/// and are visible from the start, not revealed word by word. An
/// inline code span counts as one token.
#[must_use]
pub fn count_words(text: &str) -> usize {
    // Same extensions as the renderer, so token totals equal the
    // `data-word` span count the playback surface toggles.
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut count = 0;
    let mut code_depth = 0usize;
    for event in Parser::new_ext(text, options) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => {
                code_depth += 1;
            }
            Event::End(TagEnd::CodeBlock) => {
                code_depth = code_depth.saturating_sub(1);
            }
            Event::Text(t) if code_depth == 0 => {
                count += t.split_whitespace().count();
            }
            Event::Code(_) => {
                count += 1;
            }
            _ => {}
        }
    }
    count
}

/// Drives the cancellable reveal timeline for the displayed turn.
#[derive(Debug)]
pub struct RevealScheduler {
    word_interval: Duration,
    /// Words already shown for the currently displayed turn. Reset when
    /// the displayed turn changes; carried across growing-text updates.
    baseline: usize,
    /// Token for the in-flight timeline, if any.
    active: Option<CancellationToken>,
}

impl RevealScheduler {
    #[must_use]
    pub fn new(word_interval: Duration) -> Self {
        Self {
            word_interval,
            baseline: 0,
            active: None,
        }
    }

    /// Words currently counted as revealed for the displayed turn.
    #[must_use]
    pub fn baseline(&self) -> usize {
        self.baseline
    }

    /// Forget reveal progress. Call when the displayed turn changes or
    /// the session resets, before the next `present`.
    pub fn reset_baseline(&mut self) {
        self.baseline = 0;
    }

    /// Cancel the in-flight timeline, if any, without starting a new one.
    pub fn cancel(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }

    /// Present a turn's text, returning its reveal event stream.
    ///
    /// Cancels any previous timeline first. With `animate` false the
    /// stream completes synchronously (manual navigation, disabled
    /// animation). With `animate` true, words past the current baseline
    /// appear one per `word_interval` tick; the baseline advances to the
    /// new total immediately so that a superseding `present` for grown
    /// text never re-animates these words.
    pub fn present(&mut self, text: &str, animate: bool) -> mpsc::Receiver<RevealEvent> {
        self.cancel();

        let total = count_words(text);
        let start = self.baseline.min(total);
        self.baseline = total;

        // Room for every progress step plus completion, so the
        // synchronous path never blocks on an unconsumed receiver.
        let (tx, rx) = mpsc::channel(total.saturating_sub(start) + 2);

        if !animate || start == total {
            let _ = tx.try_send(RevealEvent::Progress {
                visible: total,
                total,
            });
            let _ = tx.try_send(RevealEvent::Completed { total });
            return rx;
        }

        debug!(start, total, "starting reveal timeline");

        let token = CancellationToken::new();
        self.active = Some(token.clone());
        let interval = self.word_interval;

        tokio::spawn(async move {
            // Instant catch-up of words the user has already seen.
            if tx
                .send(RevealEvent::Progress {
                    visible: start,
                    total,
                })
                .await
                .is_err()
            {
                return;
            }
            for visible in start + 1..=total {
                tokio::select! {
                    () = token.cancelled() => {
                        debug!(visible, total, "reveal timeline cancelled");
                        return;
                    }
                    () = tokio::time::sleep(interval) => {}
                }
                if tx
                    .send(RevealEvent::Progress { visible, total })
                    .await
                    .is_err()
                {
                    return;
                }
            }
            let _ = tx.send(RevealEvent::Completed { total }).await;
        });

        rx
    }
}

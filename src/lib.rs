//! Glance: streaming transcript reconciliation and playback engine.
//!
//! The engine behind a desktop assistant overlay: it receives
//! incrementally produced answer text from an external generation
//! backend and maintains a navigable transcript with a timed
//! word-by-word reveal.
//!
//! # Architecture
//!
//! Events flow through independent stages:
//! - **Classifier**: filters conversational backchannel ("okay", "go on")
//!   out of the merge decision
//! - **Reconciler**: decides append / replace / new-turn per fragment and
//!   owns the turn history and cursor
//! - **Reveal scheduler**: drives the cancellable word-by-word reveal of
//!   the displayed turn
//! - **Renderer**: markdown to word-span HTML for the playback surface
//! - **Host bridge**: newline-delimited JSON over stdin/stdout

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod messages;
pub mod paths;
pub mod reconciler;
pub mod render;
pub mod reveal;
pub mod saved;
pub mod transcript;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use messages::{EngineEvent, InputEvent, NavigateIntent, TranscriptSnapshot};
pub use reconciler::{Reconciler, SessionStatus};
pub use reveal::{RevealEvent, RevealScheduler};
pub use transcript::{Transcript, Turn};

//! Filler-fragment classification.
//!
//! The generation backend interleaves substantive answer text with short
//! conversational backchannel ("hmm", "okay, next", ...). Treating such a
//! fragment as the authoritative text of the open turn would truncate a
//! longer in-progress answer, so the reconciler asks this classifier first.

use crate::config::FillerConfig;

/// Classification of one incoming fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Short backchannel utterance; must not replace an open turn's text.
    Filler,
    /// Real answer content.
    Substantive,
}

/// Classify a fragment as filler or substantive.
///
/// A fragment is filler iff it is shorter than the configured length
/// threshold and its lowercased text contains one of the configured
/// marker phrases. Pure function, no failure modes.
#[must_use]
pub fn classify(config: &FillerConfig, fragment: &str) -> FragmentKind {
    if fragment.len() >= config.max_len {
        return FragmentKind::Substantive;
    }
    let lowered = fragment.to_lowercase();
    if config.markers.iter().any(|m| lowered.contains(m.as_str())) {
        FragmentKind::Filler
    } else {
        FragmentKind::Substantive
    }
}

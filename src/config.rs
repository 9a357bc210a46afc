//! Configuration types for the transcript engine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration for the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Session-level settings (profile, placeholder text).
    pub session: SessionConfig,
    /// Filler-fragment classification settings.
    pub filler: FillerConfig,
    /// Word-reveal animation settings.
    pub reveal: RevealConfig,
}

/// Session-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session profile tag, stamped on saved turns
    /// (e.g. "interview", "sales", "meeting", "presentation").
    pub profile: String,
}

impl SessionConfig {
    /// Human-readable name of the session profile.
    #[must_use]
    pub fn profile_display_name(&self) -> &str {
        match self.profile.as_str() {
            "interview" => "Job Interview",
            "sales" => "Sales Call",
            "meeting" => "Business Meeting",
            "presentation" => "Presentation",
            "negotiation" => "Negotiation",
            "exam" => "Exam Assistant",
            _ => "Session",
        }
    }

    /// Placeholder line shown while no turn is selected.
    #[must_use]
    pub fn placeholder(&self) -> String {
        format!("Hey, I'm listening to your {}", self.profile_display_name())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile: "interview".to_owned(),
        }
    }
}

/// Filler-fragment classification configuration.
///
/// A fragment is classified as filler when it is shorter than
/// `max_len` and contains one of the `markers` phrases. Filler
/// fragments must not overwrite a longer in-progress turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FillerConfig {
    /// Fragments at or above this length (in bytes) are never filler.
    pub max_len: usize,
    /// Lowercase backchannel phrases that mark a short fragment as filler.
    pub markers: Vec<String>,
}

impl Default for FillerConfig {
    fn default() -> Self {
        Self {
            max_len: 30,
            markers: vec![
                "hmm".to_owned(),
                "okay".to_owned(),
                "next".to_owned(),
                "go on".to_owned(),
                "continue".to_owned(),
            ],
        }
    }
}

/// Word-reveal animation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Whether new content animates at all. When disabled every
    /// presentation completes synchronously.
    pub animate: bool,
    /// Delay between successive word reveals, in milliseconds.
    pub word_interval_ms: u64,
}

impl RevealConfig {
    /// Delay between successive word reveals as a [`Duration`].
    #[must_use]
    pub fn word_interval(&self) -> Duration {
        Duration::from_millis(self.word_interval_ms)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            animate: true,
            word_interval_ms: 100,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::EngineError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::EngineError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

use log::LevelFilter;
use piano_core::PianoConfig;
use serde::Deserialize;

/// Options object passed to `mount` from JavaScript. Every field is
/// optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebOptions {
    /// `"error"` through `"trace"`, or `"off"`.
    pub log_level: Option<String>,
    pub piano: PianoConfig,
}

impl WebOptions {
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Info)
    }
}

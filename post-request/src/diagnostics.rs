use crate::{ClientError, RequestTarget};

/// Developer-facing channel for failed attempts.
///
/// The status only records that an attempt failed; the cause goes here.
pub trait DiagnosticSink {
    fn report(&self, target: &RequestTarget, error: &ClientError);
}

/// Logs failures through `tracing` when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracingSink {
    pub enabled: bool,
}

impl TracingSink {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Enabled in debug builds, silent in release builds.
    pub fn for_build() -> Self {
        Self::new(cfg!(debug_assertions))
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::for_build()
    }
}

impl DiagnosticSink for TracingSink {
    fn report(&self, target: &RequestTarget, error: &ClientError) {
        if !self.enabled {
            return;
        }

        tracing::error!(
            url = target.url.as_deref().unwrap_or_default(),
            "POST failed: {error}"
        );
    }
}

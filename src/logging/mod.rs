//! Session logging.
//!
//! The core logs through `tracing`. `RUST_LOG` wins when present; otherwise
//! the filter comes from a [`LogConfig`]. Installation goes through a
//! process-wide `Once`, so an embedding app that already set a subscriber
//! keeps it and the core's events land there.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Once;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Installs the default subscriber when the app builds.
pub struct LoggingPlugin;

impl Plugin for LoggingPlugin {
    fn build(&self, _app: &mut App) {
        init_logging(&LogConfig::default());
    }
}

/// Filter settings for the core's subscriber.
///
/// `directives` holds `target=level` entries appended after the base level,
/// so a later entry wins on overlap, same as `RUST_LOG` itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub base_level: String,
    pub directives: Vec<String>,
    pub compact: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: "info".to_string(),
            // Streaming is the chatty subsystem; assets only matter when a
            // name fails to resolve.
            directives: vec![
                "wildwood_core::world=debug".to_string(),
                "wildwood_core::assets=warn".to_string(),
            ],
            compact: true,
        }
    }
}

impl LogConfig {
    /// One level across the whole crate, no per-module overrides.
    pub fn uniform(level: &str) -> Self {
        Self {
            base_level: level.to_string(),
            directives: Vec::new(),
            compact: true,
        }
    }

    /// Append a `target=level` override.
    pub fn with_directive(mut self, target: &str, level: &str) -> Self {
        self.directives.push(format!("{target}={level}"));
        self
    }

    fn filter_string(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.directives.len());
        parts.push(self.base_level.clone());
        parts.extend(self.directives.iter().cloned());
        parts.join(",")
    }
}

static INSTALL: Once = Once::new();

/// Install the subscriber. First call wins; later calls, and calls made
/// after the host installed its own subscriber, are no-ops.
pub fn init_logging(config: &LogConfig) {
    let fallback = config.filter_string();
    let compact = config.compact;
    INSTALL.call_once(move || {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&fallback));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true);
        // try_init fails when the host already set a global subscriber;
        // that subscriber then receives the core's events.
        let _ = if compact {
            builder.compact().try_init()
        } else {
            builder.try_init()
        };
    });
}

/// Guard that logs how long a block took when it drops.
pub struct TimingSpan {
    started: Instant,
    span: tracing::Span,
}

impl TimingSpan {
    pub fn new(name: &str) -> Self {
        Self {
            started: Instant::now(),
            span: tracing::debug_span!("timed", op = name),
        }
    }
}

impl Drop for TimingSpan {
    fn drop(&mut self) {
        let elapsed_us = self.started.elapsed().as_micros() as u64;
        let _entered = self.span.enter();
        tracing::debug!(elapsed_us, "block finished");
    }
}

//! Record/replay wrapper around a provider round trip.

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use super::cassette::{Cassette, FileCassette, MemoryCassette, RecordedInteraction};
use super::key::FingerprintGenerator;
use crate::{Error, ErrorContext, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VcrMode {
    /// Always invoke the operation; nothing is read or written.
    #[default]
    Passthrough,
    /// Invoke the operation and store successful results.
    Record,
    /// Serve stored results; never invoke the operation.
    Replay,
}

impl VcrMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VcrMode::Passthrough => "passthrough",
            VcrMode::Record => "record",
            VcrMode::Replay => "replay",
        }
    }
}

impl FromStr for VcrMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "off" | "passthrough" => Ok(VcrMode::Passthrough),
            "record" => Ok(VcrMode::Record),
            "replay" => Ok(VcrMode::Replay),
            other => Err(Error::configuration_with_context(
                format!("unknown VCR mode '{}'", other),
                ErrorContext::new()
                    .with_field_path("env.AI_VCR_MODE")
                    .with_details("expected passthrough, record or replay"),
            )),
        }
    }
}

impl std::fmt::Display for VcrMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecorderStats {
    pub replayed: u64,
    pub recorded: u64,
    pub misses: u64,
    pub passthrough: u64,
}

#[derive(Default)]
struct AtomicStats {
    replayed: AtomicU64,
    recorded: AtomicU64,
    misses: AtomicU64,
    passthrough: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> RecorderStats {
        RecorderStats {
            replayed: self.replayed.load(Ordering::Relaxed),
            recorded: self.recorded.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            passthrough: self.passthrough.load(Ordering::Relaxed),
        }
    }
}

/// Intercepts a provider round trip so that an identical request can be served from
/// a cassette.
///
/// Only successful results are recorded. A replayed value goes through the same
/// serde round trip as a recorded one, so callers cannot tell them apart.
#[derive(Clone)]
pub struct ConversationRecorder {
    mode: VcrMode,
    cassette: Arc<dyn Cassette>,
    keys: FingerprintGenerator,
    stats: Arc<AtomicStats>,
}

impl ConversationRecorder {
    pub fn new(mode: VcrMode, cassette: Arc<dyn Cassette>) -> Self {
        Self {
            mode,
            cassette,
            keys: FingerprintGenerator::new(),
            stats: Arc::new(AtomicStats::default()),
        }
    }

    pub fn passthrough() -> Self {
        Self::new(VcrMode::Passthrough, Arc::new(MemoryCassette::new()))
    }

    /// File-backed recorder rooted at `dir`.
    pub fn with_dir(mode: VcrMode, dir: impl Into<PathBuf>) -> Self {
        Self::new(mode, Arc::new(FileCassette::new(dir)))
    }

    pub fn with_fingerprints(mut self, keys: FingerprintGenerator) -> Self {
        self.keys = keys;
        self
    }

    pub fn mode(&self) -> VcrMode {
        self.mode
    }

    pub fn stats(&self) -> RecorderStats {
        self.stats.to_stats()
    }

    pub fn cassette_name(&self) -> &'static str {
        self.cassette.name()
    }

    /// Run `operation` for `request` according to the recorder mode.
    pub async fn with_recording<R, T, F, Fut>(
        &self,
        model: &str,
        request: &R,
        operation: F,
    ) -> Result<T>
    where
        R: Serialize + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.mode == VcrMode::Passthrough {
            self.stats.passthrough.fetch_add(1, Ordering::Relaxed);
            return operation().await;
        }

        let fingerprint = self.keys.generate(model, request)?;

        if self.mode == VcrMode::Replay {
            return match self.cassette.load(&fingerprint).await? {
                Some(interaction) => {
                    self.stats.replayed.fetch_add(1, Ordering::Relaxed);
                    debug!(%fingerprint, cassette = self.cassette.name(), "replaying recorded interaction");
                    Ok(serde_json::from_value(interaction.response)?)
                }
                None => {
                    self.stats.misses.fetch_add(1, Ordering::Relaxed);
                    Err(Error::recording_with_context(
                        "no recorded interaction for request",
                        ErrorContext::new()
                            .with_details(format!("fingerprint {}", fingerprint))
                            .with_source("vcr_replay"),
                    ))
                }
            };
        }

        let value = operation().await?;
        let interaction = RecordedInteraction {
            fingerprint,
            model: model.to_string(),
            request: serde_json::to_value(request)?,
            response: serde_json::to_value(&value)?,
        };
        self.cassette.store(&interaction).await?;
        self.stats.recorded.fetch_add(1, Ordering::Relaxed);
        info!(fingerprint = %interaction.fingerprint, cassette = self.cassette.name(), "recorded interaction");
        Ok(value)
    }
}

impl Default for ConversationRecorder {
    fn default() -> Self {
        Self::passthrough()
    }
}

impl std::fmt::Debug for ConversationRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationRecorder")
            .field("mode", &self.mode)
            .field("cassette", &self.cassette.name())
            .finish()
    }
}

//! 录制/回放模块：按请求指纹录制并回放 provider 响应，用于可复现测试。
//!
//! # VCR Module
//!
//! A [`ConversationRecorder`] wraps each provider round trip. In `record` mode
//! the live response is stored under a [`Fingerprint`] of the request; in `replay`
//! mode the stored response is returned without touching the network.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ConversationRecorder`] | Mode-driven record/replay wrapper |
//! | [`VcrMode`] | `passthrough` (default), `record` or `replay` |
//! | [`Cassette`] | Storage trait for recorded interactions |
//! | [`FileCassette`] | One JSON file per fingerprint under a directory |
//! | [`MemoryCassette`] | In-process storage |
//! | [`FingerprintGenerator`] | SHA-256 over the canonical request and model |

mod cassette;
mod key;
mod recorder;

pub use cassette::{Cassette, FileCassette, MemoryCassette, RecordedInteraction};
pub use key::{Fingerprint, FingerprintGenerator};
pub use recorder::{ConversationRecorder, RecorderStats, VcrMode};

//! Token counters reported by the provider and the per-call usage record.

use std::ops::Add;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Counts as reported in a response. `completion_tokens` is absent when the
/// provider only reports total and prompt counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounters {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: Option<u64>,
}

impl UsageCounters {
    pub fn new(total_tokens: u64, prompt_tokens: u64) -> Self {
        Self {
            total_tokens,
            prompt_tokens,
            completion_tokens: None,
        }
    }

    pub fn output_tokens(&self) -> u64 {
        self.completion_tokens
            .unwrap_or_else(|| self.total_tokens.saturating_sub(self.prompt_tokens))
    }
}

impl Add for UsageCounters {
    type Output = UsageCounters;

    fn add(self, rhs: Self) -> Self::Output {
        UsageCounters {
            total_tokens: self.total_tokens + rhs.total_tokens,
            prompt_tokens: self.prompt_tokens + rhs.prompt_tokens,
            completion_tokens: Some(self.output_tokens() + rhs.output_tokens()),
        }
    }
}

/// Usage of one accounted call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageRecord {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
    pub duration: Duration,
}

impl UsageRecord {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }
}

//! Process-wide cost and duration totals.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use tracing::debug;

use super::pricing::ModelPricing;
use super::usage::{UsageCounters, UsageRecord};

static GLOBAL_LEDGER: Lazy<Arc<CostLedger>> = Lazy::new(|| Arc::new(CostLedger::new()));

/// Shared ledger used by clients that are not given their own.
pub fn global_ledger() -> Arc<CostLedger> {
    GLOBAL_LEDGER.clone()
}

/// Snapshot of ledger totals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LedgerTotals {
    pub total_cost_usd: f64,
    pub total_duration: Duration,
    pub calls: u64,
}

/// Monotonic accumulator of cost (USD) and API duration.
///
/// Cost is stored as `f64` bits in an `AtomicU64`, so concurrent updates never lose
/// an addition.
#[derive(Debug, Default)]
pub struct CostLedger {
    cost_bits: AtomicU64,
    duration_micros: AtomicU64,
    calls: AtomicU64,
}

impl CostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one call's cost and duration. Negative costs are ignored.
    pub fn accumulate(&self, cost_usd: f64, duration: Duration) {
        if cost_usd > 0.0 {
            let mut current = self.cost_bits.load(Ordering::Relaxed);
            loop {
                let next = (f64::from_bits(current) + cost_usd).to_bits();
                match self.cost_bits.compare_exchange_weak(
                    current,
                    next,
                    Ordering::AcqRel,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => break,
                    Err(actual) => current = actual,
                }
            }
        }
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.duration_micros.fetch_add(micros, Ordering::Relaxed);
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_cost_usd(&self) -> f64 {
        f64::from_bits(self.cost_bits.load(Ordering::Acquire))
    }

    pub fn total_duration(&self) -> Duration {
        Duration::from_micros(self.duration_micros.load(Ordering::Relaxed))
    }

    pub fn totals(&self) -> LedgerTotals {
        LedgerTotals {
            total_cost_usd: self.total_cost_usd(),
            total_duration: self.total_duration(),
            calls: self.calls.load(Ordering::Relaxed),
        }
    }

    /// Zero all totals. Intended for tests.
    pub fn reset(&self) {
        self.cost_bits.store(0f64.to_bits(), Ordering::Release);
        self.duration_micros.store(0, Ordering::Relaxed);
        self.calls.store(0, Ordering::Relaxed);
    }
}

/// Converts provider token counts into a cost and books it on a ledger.
#[derive(Debug, Clone)]
pub struct CostAccountant {
    pricing: ModelPricing,
    ledger: Arc<CostLedger>,
}

impl CostAccountant {
    pub fn new(pricing: ModelPricing, ledger: Arc<CostLedger>) -> Self {
        Self { pricing, ledger }
    }

    /// Accountant booking onto the process-wide ledger.
    pub fn global(pricing: ModelPricing) -> Self {
        Self::new(pricing, global_ledger())
    }

    pub fn pricing(&self) -> &ModelPricing {
        &self.pricing
    }

    pub fn ledger(&self) -> &Arc<CostLedger> {
        &self.ledger
    }

    /// Record one call. Missing counters count as zero tokens; the duration is
    /// booked regardless.
    pub fn record(&self, usage: Option<UsageCounters>, duration: Duration) -> UsageRecord {
        let usage = usage.unwrap_or_default();
        let input_tokens = usage.prompt_tokens;
        let output_tokens = usage.output_tokens();
        let cost = self.pricing.calculate_cost(input_tokens, output_tokens);
        self.ledger.accumulate(cost.total_cost, duration);
        debug!(
            model = self.pricing.model.as_str(),
            input_tokens,
            output_tokens,
            cost_usd = cost.total_cost,
            duration_ms = duration.as_millis() as u64,
            "recorded call cost"
        );
        UsageRecord {
            input_tokens,
            output_tokens,
            cost_usd: cost.total_cost,
            duration,
        }
    }
}

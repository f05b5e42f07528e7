//! Token 用量与成本核算模块：价格表、用量计数与全局成本账本。
//!
//! # Token Usage and Cost Accounting Module
//!
//! Every completed provider call is priced from its reported token counts and
//! booked on a [`CostLedger`], together with its wall-clock duration.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ModelPricing`] | Per-1k-token input/output rates |
//! | [`UsageCounters`] | Token counts as reported by the provider |
//! | [`CostAccountant`] | Prices a call and books it on a ledger |
//! | [`CostLedger`] | Monotonic, thread-safe totals (see [`global_ledger`]) |
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use ai_conductor::tokens::{CostAccountant, CostLedger, ModelPricing, UsageCounters};
//!
//! let accountant = CostAccountant::new(ModelPricing::gemini_pro(), Arc::new(CostLedger::new()));
//! let record = accountant.record(Some(UsageCounters::new(1500, 1000)), Duration::from_millis(250));
//! assert!((record.cost_usd - 0.0005).abs() < 1e-12);
//! ```

mod ledger;
mod pricing;
mod usage;

pub use ledger::{global_ledger, CostAccountant, CostLedger, LedgerTotals};
pub use pricing::{CostBreakdown, ModelPricing};
pub use usage::{UsageCounters, UsageRecord};

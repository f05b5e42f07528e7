//! Model pricing and cost calculation.

use serde::{Deserialize, Serialize};

/// Per-1k-token rates for one model, in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub model: String,
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
}

impl ModelPricing {
    pub fn new(model: &str, input: f64, output: f64) -> Self {
        Self {
            model: model.into(),
            input_cost_per_1k: input,
            output_cost_per_1k: output,
        }
    }

    pub fn gemini_pro() -> Self {
        Self::new("gemini-pro", 0.00025, 0.0005)
    }

    /// Known rates for `model`; unknown models fall back to Gemini Pro pricing.
    pub fn for_model(model: &str) -> Self {
        let m = model.to_lowercase();
        if m.starts_with("gemini-pro") || m.starts_with("gemini-1.0-pro") {
            Self::gemini_pro()
        } else {
            Self {
                model: model.to_string(),
                ..Self::gemini_pro()
            }
        }
    }

    pub fn calculate_cost(&self, input_tokens: u64, output_tokens: u64) -> CostBreakdown {
        let input_cost = (input_tokens as f64 / 1000.0) * self.input_cost_per_1k;
        let output_cost = (output_tokens as f64 / 1000.0) * self.output_cost_per_1k;
        CostBreakdown {
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }
}

impl Default for ModelPricing {
    fn default() -> Self {
        Self::gemini_pro()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

impl CostBreakdown {
    pub fn format_detailed(&self) -> String {
        if self.total_cost < 0.01 {
            format!("{:.4}¢", self.total_cost * 100.0)
        } else {
            format!("${:.4}", self.total_cost)
        }
    }
}

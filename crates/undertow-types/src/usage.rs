//! Token-usage accounting emitted with the final summary event.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Identity of a model as reported on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelId {
    #[serde(rename = "model_vendor")]
    pub vendor: String,
    #[serde(rename = "model_type")]
    pub kind: String,
    #[serde(rename = "model_name")]
    pub name: String,
}

impl ModelId {
    pub fn new(
        vendor: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            kind: kind.into(),
            name: name.into(),
        }
    }
}

/// Token counts for one model bucket. Monotonically non-decreasing within
/// a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_token_count: u64,
    pub output_token_count: u64,
}

impl TokenUsage {
    pub fn new(input: u64, output: u64) -> Self {
        Self {
            input_token_count: input,
            output_token_count: output,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.input_token_count == 0 && self.output_token_count == 0
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_token_count += rhs.input_token_count;
        self.output_token_count += rhs.output_token_count;
    }
}

/// One entry of the `models` array in the final summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub model: ModelId,
    pub usage: TokenUsage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_accumulates() {
        let mut u = TokenUsage::default();
        u += TokenUsage::new(100, 42);
        u += TokenUsage::new(10, 8);
        assert_eq!(u, TokenUsage::new(110, 50));
    }

    #[test]
    fn model_usage_wire_shape() {
        let entry = ModelUsage {
            model: ModelId::new("openai", "gpt-4.1-nano", "gpt-4.1-nano-2025-04-14"),
            usage: TokenUsage::new(100, 42),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["model"]["model_vendor"], "openai");
        assert_eq!(json["usage"]["input_token_count"], 100);
        assert_eq!(json["usage"]["output_token_count"], 42);
    }
}

//! Built-in Gemini tiers.
//!
//! Used when no configuration file is available. Values track the published
//! limits for `gemini-2.5-flash`.

use crate::Tier;

/// Gemini API usage tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum GeminiTier {
    /// Free tier: 10 RPM, 250K TPM, 250 RPD
    #[strum(serialize = "free")]
    Free,
    /// Paid tier 1: 1000 RPM, 1M TPM, 10K RPD
    #[strum(serialize = "tier1", serialize = "tier_1")]
    Tier1,
}

impl Tier for GeminiTier {
    fn rpm(&self) -> Option<u32> {
        match self {
            GeminiTier::Free => Some(10),
            GeminiTier::Tier1 => Some(1000),
        }
    }

    fn tpm(&self) -> Option<u64> {
        match self {
            GeminiTier::Free => Some(250_000),
            GeminiTier::Tier1 => Some(1_000_000),
        }
    }

    fn rpd(&self) -> Option<u32> {
        match self {
            GeminiTier::Free => Some(250),
            GeminiTier::Tier1 => Some(10_000),
        }
    }

    fn max_concurrent(&self) -> Option<u32> {
        match self {
            GeminiTier::Free => Some(1),
            GeminiTier::Tier1 => Some(4),
        }
    }

    fn daily_quota_usd(&self) -> Option<f64> {
        None
    }

    fn cost_per_million_input_tokens(&self) -> Option<f64> {
        match self {
            GeminiTier::Free => Some(0.0),
            GeminiTier::Tier1 => Some(0.30),
        }
    }

    fn cost_per_million_output_tokens(&self) -> Option<f64> {
        match self {
            GeminiTier::Free => Some(0.0),
            GeminiTier::Tier1 => Some(2.50),
        }
    }

    fn name(&self) -> &str {
        match self {
            GeminiTier::Free => "Free",
            GeminiTier::Tier1 => "Tier 1",
        }
    }
}

//! Fact-finding algorithms.

use serde::{Deserialize, Serialize};

/// Which hypothesis-search strategy a search/check stage runs.
///
/// Each algorithm keeps its own artifacts under `FACTS/<dir_name>/`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FactsAlgorithm {
    /// Hidden connections between known facts
    #[strum(serialize = "main")]
    Main,
    /// Gaps and blind spots in the source material
    #[strum(to_string = "blind_spots", serialize = "blind")]
    BlindSpots,
}

impl FactsAlgorithm {
    /// Directory name under `FACTS/`.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Main => "ALG_MAIN",
            Self::BlindSpots => "ALG_BLIND",
        }
    }

    /// Suffix used by the editable stage file names (`interesting_facts_<suffix>`).
    pub fn stage_suffix(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::BlindSpots => "blind",
        }
    }

    /// Prompt book key prefix for this algorithm.
    pub fn prompt_key(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::BlindSpots => "blind_spots",
        }
    }
}

//! Pipeline stages.

use serde::{Deserialize, Serialize};

/// The five steps of the script-writing pipeline, in execution order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// Expand the source database into an extended fact sheet
    Expand,
    /// Multi-lens hypothesis search
    Search,
    /// Verify hypotheses with web search
    Check,
    /// Build the series/chapter outline
    Structure,
    /// Write chapter text
    Write,
}

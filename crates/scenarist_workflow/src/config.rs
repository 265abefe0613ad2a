//! Engine settings and per-run options.

use scenarist_core::FactsAlgorithm;
use scenarist_rate_limit::WorkflowSettings;
use serde::{Deserialize, Serialize};

/// Sampling and pass-count settings for every stage.
///
/// # Example
///
/// ```
/// use scenarist_workflow::WorkflowConfig;
///
/// let config = WorkflowConfig::builder()
///     .lens_count_main(5u32)
///     .resume(true)
///     .build()
///     .unwrap();
/// assert_eq!(*config.lens_count_main(), 5);
/// assert_eq!(*config.lens_count_blind(), 2);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into), default)]
pub struct WorkflowConfig {
    /// Model override for every call; the driver's model when unset
    model: Option<String>,
    /// Lens passes for the main algorithm
    lens_count_main: u32,
    /// Lens passes for the blind-spots algorithm
    lens_count_blind: u32,
    /// Temperature of the expand stage
    expand_temperature: f32,
    /// Temperature of lens searches
    search_temperature: f32,
    /// Temperature of hypothesis checks
    check_temperature: f32,
    /// Temperature of the structure stage
    structure_temperature: f32,
    /// Default temperature of chapter writing
    write_temperature: f32,
    /// Output cap for free-text calls
    max_output_tokens: u32,
    /// Output cap for the structure call
    structure_max_output_tokens: u32,
    /// Characters of the previous chapter passed for continuity
    continuity_chars: usize,
    /// Reuse lens files left by an interrupted search
    resume: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self::from(&WorkflowSettings::default())
    }
}

impl From<&WorkflowSettings> for WorkflowConfig {
    fn from(settings: &WorkflowSettings) -> Self {
        Self {
            model: Some(settings.default_model.clone()),
            lens_count_main: settings.lens_count_main,
            lens_count_blind: settings.lens_count_blind,
            expand_temperature: settings.expand_temperature,
            search_temperature: settings.search_temperature,
            check_temperature: settings.check_temperature,
            structure_temperature: settings.structure_temperature,
            write_temperature: settings.write_temperature,
            max_output_tokens: settings.max_output_tokens,
            structure_max_output_tokens: settings.structure_max_output_tokens,
            continuity_chars: settings.continuity_chars,
            resume: false,
        }
    }
}

impl WorkflowConfig {
    /// Creates a new config builder.
    pub fn builder() -> WorkflowConfigBuilder {
        WorkflowConfigBuilder::default()
    }

    /// Lens passes configured for `algorithm` (at least one).
    pub fn lens_count(&self, algorithm: FactsAlgorithm) -> u32 {
        let count = match algorithm {
            FactsAlgorithm::Main => self.lens_count_main,
            FactsAlgorithm::BlindSpots => self.lens_count_blind,
        };
        count.max(1)
    }

    /// Copy with resume switched on or off.
    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    /// Copy with a different model override.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

/// Overrides for the write stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Output cap per chapter
    pub max_output_tokens: Option<u32>,
    /// Model for chapter writing
    pub model: Option<String>,
}

/// What a full pipeline run does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Episodes to outline
    pub num_series: u32,
    /// Algorithms searched and checked, in order
    pub algorithms: Vec<FactsAlgorithm>,
    /// Write stage overrides
    pub write: WriteOptions,
}

impl PipelineOptions {
    /// Both algorithms, default write settings.
    pub fn new(num_series: u32) -> Self {
        Self {
            num_series,
            algorithms: vec![FactsAlgorithm::Main, FactsAlgorithm::BlindSpots],
            write: WriteOptions::default(),
        }
    }
}

//! Layered configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (`scenarist.toml` shipped with the library)
//! 2. `~/.config/scenarist/scenarist.toml`
//! 3. `./scenarist.toml`
//! 4. `SCENARIST_*` environment variables (`__` separates sections, e.g.
//!    `SCENARIST_WORKFLOW__DEFAULT_MODEL`)

use crate::Tier;
use config::{Config, Environment, File, FileFormat};
use scenarist_error::{ConfigError, ScenaristError, ScenaristResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../scenarist.toml");

/// Model-specific rate limit overrides.
///
/// ```toml
/// [providers.gemini.tiers.free.models."gemini-2.5-pro"]
/// rpm = 5
/// rpd = 100
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct ModelTierConfig {
    /// Requests per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<u32>,
    /// Tokens per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpm: Option<u64>,
    /// Requests per day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpd: Option<u32>,
    /// Concurrent requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<u32>,
    /// Daily spending cap in USD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_quota_usd: Option<f64>,
    /// Cost per million input tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_million_input_tokens: Option<f64>,
    /// Cost per million output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_million_output_tokens: Option<f64>,
}

/// Limits for one provider tier, with optional per-model overrides.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TierConfig {
    /// Display name of the tier
    pub name: String,
    /// Requests per minute
    #[serde(default)]
    pub rpm: Option<u32>,
    /// Tokens per minute
    #[serde(default)]
    pub tpm: Option<u64>,
    /// Requests per day
    #[serde(default)]
    pub rpd: Option<u32>,
    /// Concurrent requests
    #[serde(default)]
    pub max_concurrent: Option<u32>,
    /// Daily spending cap in USD
    #[serde(default)]
    pub daily_quota_usd: Option<f64>,
    /// Cost per million input tokens
    #[serde(default)]
    pub cost_per_million_input_tokens: Option<f64>,
    /// Cost per million output tokens
    #[serde(default)]
    pub cost_per_million_output_tokens: Option<f64>,
    /// Per-model overrides
    #[serde(default)]
    pub models: HashMap<String, ModelTierConfig>,
}

impl Tier for TierConfig {
    fn rpm(&self) -> Option<u32> {
        self.rpm
    }

    fn tpm(&self) -> Option<u64> {
        self.tpm
    }

    fn rpd(&self) -> Option<u32> {
        self.rpd
    }

    fn max_concurrent(&self) -> Option<u32> {
        self.max_concurrent
    }

    fn daily_quota_usd(&self) -> Option<f64> {
        self.daily_quota_usd
    }

    fn cost_per_million_input_tokens(&self) -> Option<f64> {
        self.cost_per_million_input_tokens
    }

    fn cost_per_million_output_tokens(&self) -> Option<f64> {
        self.cost_per_million_output_tokens
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TierConfig {
    /// Copies the limits of any [`Tier`] into a config without model overrides.
    pub fn from_tier(tier: &dyn Tier) -> Self {
        Self {
            name: tier.name().to_string(),
            rpm: tier.rpm(),
            tpm: tier.tpm(),
            rpd: tier.rpd(),
            max_concurrent: tier.max_concurrent(),
            daily_quota_usd: tier.daily_quota_usd(),
            cost_per_million_input_tokens: tier.cost_per_million_input_tokens(),
            cost_per_million_output_tokens: tier.cost_per_million_output_tokens(),
            models: HashMap::new(),
        }
    }

    /// Tier limits with the overrides for `model_name` applied.
    pub fn for_model(&self, model_name: &str) -> TierConfig {
        match self.models.get(model_name) {
            Some(m) => TierConfig {
                name: self.name.clone(),
                rpm: m.rpm.or(self.rpm),
                tpm: m.tpm.or(self.tpm),
                rpd: m.rpd.or(self.rpd),
                max_concurrent: m.max_concurrent.or(self.max_concurrent),
                daily_quota_usd: m.daily_quota_usd.or(self.daily_quota_usd),
                cost_per_million_input_tokens: m
                    .cost_per_million_input_tokens
                    .or(self.cost_per_million_input_tokens),
                cost_per_million_output_tokens: m
                    .cost_per_million_output_tokens
                    .or(self.cost_per_million_output_tokens),
                models: HashMap::new(),
            },
            None => self.clone(),
        }
    }
}

/// Tiers for one provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Tier used when none is requested
    pub default_tier: String,
    /// Tier name to limits
    pub tiers: HashMap<String, TierConfig>,
}

/// Workflow engine settings (`[workflow]`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Model used when a stage does not override it
    pub default_model: String,
    /// Lens passes for the main algorithm
    pub lens_count_main: u32,
    /// Lens passes for the blind-spots algorithm
    pub lens_count_blind: u32,
    /// Temperature for the expand stage
    pub expand_temperature: f32,
    /// Temperature for lens searches
    pub search_temperature: f32,
    /// Temperature for hypothesis checking
    pub check_temperature: f32,
    /// Temperature for structure building
    pub structure_temperature: f32,
    /// Temperature for chapter writing
    pub write_temperature: f32,
    /// Output token cap for free-text stages
    pub max_output_tokens: u32,
    /// Output token cap for the structure stage
    pub structure_max_output_tokens: u32,
    /// Characters of the previous chapter passed for continuity
    pub continuity_chars: usize,
    /// Optional prompt book overriding the bundled one
    pub prompts_path: Option<PathBuf>,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            default_model: "gemini-2.5-flash".to_string(),
            lens_count_main: 3,
            lens_count_blind: 2,
            expand_temperature: 0.7,
            search_temperature: 0.7,
            check_temperature: 0.7,
            structure_temperature: 0.7,
            write_temperature: 0.7,
            max_output_tokens: 4096,
            structure_max_output_tokens: 8192,
            continuity_chars: 1500,
            prompts_path: None,
        }
    }
}

/// Artifact storage settings (`[storage]`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding `<owner_id>/proj_<id>_<topic>` folders
    pub projects_root: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            projects_root: PathBuf::from("projects_root"),
        }
    }
}

/// Top-level configuration.
///
/// # Example
///
/// ```no_run
/// use scenarist_rate_limit::ScenaristConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ScenaristConfig::load()?;
/// let tier = config.get_tier("gemini", None).unwrap();
/// println!("Gemini {} RPM: {:?}", tier.name, tier.rpm);
/// println!("Lens passes: {}", config.workflow.lens_count_main);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct ScenaristConfig {
    /// Provider name to tiers
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Workflow engine settings
    #[serde(default)]
    pub workflow: WorkflowSettings,
    /// Artifact storage settings
    #[serde(default)]
    pub storage: StorageSettings,
}

impl ScenaristConfig {
    /// Bundled defaults only.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file fails to parse.
    pub fn bundled() -> ScenaristResult<Self> {
        Self::build(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    /// Load a single configuration file layered over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> ScenaristResult<Self> {
        debug!("Loading configuration from file");
        Self::build(
            Config::builder()
                .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
                .add_source(File::from(path.as_ref())),
        )
    }

    /// Load configuration from every source, in precedence order.
    ///
    /// Missing user files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if any present source fails to parse.
    #[instrument]
    pub fn load() -> ScenaristResult<Self> {
        debug!("Loading configuration: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/scenarist/scenarist.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("scenarist").required(false))
            .add_source(
                Environment::with_prefix("SCENARIST")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> ScenaristResult<Self> {
        builder
            .build()
            .map_err(|e| {
                ScenaristError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ScenaristError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Tier limits for a provider, falling back to its default tier.
    #[instrument(skip(self))]
    pub fn get_tier(&self, provider: &str, tier_name: Option<&str>) -> Option<TierConfig> {
        let provider_config = self.providers.get(provider)?;
        let tier = tier_name.unwrap_or(&provider_config.default_tier);
        debug!(provider, tier, "Looking up tier configuration");
        provider_config.tiers.get(tier).cloned()
    }
}

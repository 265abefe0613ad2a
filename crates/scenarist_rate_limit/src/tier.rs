//! Tier trait for representing API rate limit constraints.

/// Rate limiting constraints for an API tier.
///
/// All methods return `Option<T>` where `None` means unlimited or not
/// applicable.
///
/// # Example
///
/// ```
/// use scenarist_rate_limit::Tier;
///
/// struct Sandbox;
///
/// impl Tier for Sandbox {
///     fn rpm(&self) -> Option<u32> { Some(10) }
///     fn tpm(&self) -> Option<u64> { Some(250_000) }
///     fn rpd(&self) -> Option<u32> { Some(250) }
///     fn max_concurrent(&self) -> Option<u32> { Some(1) }
///     fn daily_quota_usd(&self) -> Option<f64> { None }
///     fn cost_per_million_input_tokens(&self) -> Option<f64> { Some(0.0) }
///     fn cost_per_million_output_tokens(&self) -> Option<f64> { Some(0.0) }
///     fn name(&self) -> &str { "Sandbox" }
/// }
///
/// assert_eq!(Sandbox.rpm(), Some(10));
/// ```
pub trait Tier: Send + Sync {
    /// Requests per minute limit.
    fn rpm(&self) -> Option<u32>;

    /// Tokens per minute limit.
    fn tpm(&self) -> Option<u64>;

    /// Requests per day limit.
    fn rpd(&self) -> Option<u32>;

    /// Maximum concurrent requests.
    fn max_concurrent(&self) -> Option<u32>;

    /// Daily spending cap in USD.
    fn daily_quota_usd(&self) -> Option<f64>;

    /// Cost per million input tokens in USD.
    fn cost_per_million_input_tokens(&self) -> Option<f64>;

    /// Cost per million output tokens in USD.
    fn cost_per_million_output_tokens(&self) -> Option<f64>;

    /// Name of the tier (e.g. "Free", "Tier 1").
    fn name(&self) -> &str;

    /// Estimated cost in USD of a call with the given token counts.
    fn estimate_cost(&self, input_tokens: u64, output_tokens: u64) -> Option<f64> {
        let input = self.cost_per_million_input_tokens()?;
        let output = self.cost_per_million_output_tokens()?;
        Some((input_tokens as f64 * input + output_tokens as f64 * output) / 1_000_000.0)
    }
}

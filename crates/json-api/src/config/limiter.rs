//! Rate Limiter Config

use clap::Args;

use greenlight_app::rate_limit::RateLimiterSettings;

/// Per-client token bucket settings.
#[derive(Debug, Args)]
pub struct LimiterConfig {
    /// Enable per-client rate limiting
    #[arg(
        long,
        env = "LIMITER_ENABLED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub limiter_enabled: bool,

    /// Tokens regained per second
    #[arg(long, env = "LIMITER_RPS", default_value_t = 2.0, value_parser = parse_rate)]
    pub limiter_rps: f64,

    /// Bucket capacity
    #[arg(
        long,
        env = "LIMITER_BURST",
        default_value_t = 4,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub limiter_burst: u32,
}

/// A refill rate must be a finite number of tokens per second above zero.
fn parse_rate(value: &str) -> Result<f64, String> {
    let rate: f64 = value
        .trim()
        .parse()
        .map_err(|error| format!("`{value}` is not a number: {error}"))?;

    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("`{value}` must be a finite rate above zero"))
    }
}

impl LimiterConfig {
    #[must_use]
    pub fn settings(&self) -> RateLimiterSettings {
        RateLimiterSettings {
            enabled: self.limiter_enabled,
            rate: self.limiter_rps,
            burst: self.limiter_burst,
        }
    }
}

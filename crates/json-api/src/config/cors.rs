//! CORS Config

use clap::Args;

/// Cross-origin settings.
#[derive(Debug, Args)]
pub struct CorsConfig {
    /// Space separated origins allowed to make cross-origin requests
    #[arg(long, env = "CORS_TRUSTED_ORIGINS", default_value = "")]
    pub cors_trusted_origins: String,
}

impl CorsConfig {
    #[must_use]
    pub fn trusted_origins(&self) -> Vec<&str> {
        self.cors_trusted_origins.split_whitespace().collect()
    }
}

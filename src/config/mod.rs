//! Runtime settings, read from the process environment.
//!
//! Every key lives under `JOB_NOTIFY__`, with `__` separating sections, so
//! `JOB_NOTIFY__REALTIME__ENDPOINT` fills `realtime.endpoint`. A `.env` file in
//! the working directory is honored during development.
//!
//! ```no_run
//! use job_notifications::config::AppConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! config.validate()?;
//! println!("Tailing {}", config.realtime.endpoint);
//! # Ok(())
//! # }
//! ```

mod error;
mod feed;
mod identity;
mod realtime;
mod telemetry;

pub use error::{ConfigError, ValidationError};
pub use feed::FeedConfig;
pub use identity::IdentityConfig;
pub use realtime::RealtimeConfig;
pub use telemetry::TelemetryConfig;

use serde::Deserialize;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "JOB_NOTIFY";

/// Everything the notification tail needs to start.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Messaging service connection
    pub realtime: RealtimeConfig,

    /// Notification feed
    #[serde(default)]
    pub feed: FeedConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Current user (binary only)
    pub identity: Option<IdentityConfig>,
}

impl AppConfig {
    /// Reads `.env` (if any) and then the environment.
    ///
    /// Fails when a required key such as `REALTIME__ENDPOINT` is absent or a
    /// value does not parse into its field type. Range checks are left to
    /// [`AppConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Checks each section, stopping at the first problem.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.realtime.validate()?;
        self.feed.validate()?;
        self.telemetry.validate()?;
        if let Some(identity) = &self.identity {
            identity.validate()?;
        }
        Ok(())
    }
}

//! Notification feed configuration

use serde::Deserialize;

use crate::domain::notification::DEFAULT_CAPACITY;

use super::error::ValidationError;

const MAX_CAPACITY: usize = 1000;

/// Notification feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Notifications kept before the oldest is evicted
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl FeedConfig {
    /// Validate feed configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(ValidationError::InvalidCapacity);
        }
        Ok(())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

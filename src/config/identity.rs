//! Current user configuration
//!
//! The library never reads ambient login state; the binary takes the user
//! it tails notifications for from here.

use serde::Deserialize;

use crate::domain::foundation::UserId;
use crate::domain::user::User;

use super::error::ValidationError;

/// Current user configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Identity provider subject of the current user
    pub user_id: String,

    /// Display name of the current user
    pub name: Option<String>,
}

impl IdentityConfig {
    /// Build the user snapshot
    pub fn user(&self) -> Result<User, ValidationError> {
        let id = UserId::new(self.user_id.clone())
            .map_err(|_| ValidationError::MissingRequired("IDENTITY__USER_ID"))?;
        let user = User::new(id);
        Ok(match &self.name {
            Some(name) => user.with_name(name.clone()),
            None => user,
        })
    }

    /// Validate identity configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.user().map(|_| ())
    }
}

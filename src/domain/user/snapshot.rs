//! User snapshot value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

/// Fallback label when a sender carries no usable name at all.
pub const UNKNOWN_USER_LABEL: &str = "Unknown user";

/// Snapshot of a user at the time it was observed.
///
/// Only `id` is required. The remaining fields are whatever the upstream
/// payload carried and are used for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: Option<String>,
    profile_picture: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    email: Option<String>,
}

impl User {
    /// Creates a user snapshot carrying only an identifier.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            name: None,
            profile_picture: None,
            given_name: None,
            family_name: None,
            email: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = non_blank(name.into());
        self
    }

    /// Sets the avatar reference.
    pub fn with_profile_picture(mut self, url: impl Into<String>) -> Self {
        self.profile_picture = non_blank(url.into());
        self
    }

    /// Sets given and family name, used when no display name is present.
    pub fn with_full_name(
        mut self,
        given_name: Option<String>,
        family_name: Option<String>,
    ) -> Self {
        self.given_name = given_name.and_then(non_blank);
        self.family_name = family_name.and_then(non_blank);
        self
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = non_blank(email.into());
        self
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn profile_picture(&self) -> Option<&str> {
        self.profile_picture.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Best available label for this user.
    ///
    /// Order: display name, "given family", email, then a fixed fallback.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }

        let full: Vec<&str> = [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !full.is_empty() {
            return full.join(" ");
        }

        self.email
            .clone()
            .unwrap_or_else(|| UNKNOWN_USER_LABEL.to_string())
    }

    /// Whether this snapshot refers to the given user.
    pub fn is(&self, other: &UserId) -> bool {
        &self.id == other
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User::new(UserId::new(id).unwrap())
    }

    #[test]
    fn display_name_prefers_name() {
        let u = user("u1")
            .with_name("Ada Lovelace")
            .with_full_name(Some("Augusta".into()), Some("King".into()));
        assert_eq!(u.display_name(), "Ada Lovelace");
    }

    #[test]
    fn display_name_falls_back_to_given_and_family() {
        let u = user("u1").with_full_name(Some("Grace".into()), Some("Hopper".into()));
        assert_eq!(u.display_name(), "Grace Hopper");
    }

    #[test]
    fn display_name_uses_single_part_when_other_missing() {
        let u = user("u1").with_full_name(None, Some("Hopper".into()));
        assert_eq!(u.display_name(), "Hopper");
    }

    #[test]
    fn display_name_falls_back_to_email_then_label() {
        let u = user("u1").with_email("grace@example.com");
        assert_eq!(u.display_name(), "grace@example.com");

        assert_eq!(user("u2").display_name(), UNKNOWN_USER_LABEL);
    }

    #[test]
    fn blank_fields_are_treated_as_missing() {
        let u = user("u1").with_name("   ").with_profile_picture("");
        assert_eq!(u.name(), None);
        assert_eq!(u.profile_picture(), None);
    }

    #[test]
    fn is_compares_identifier() {
        let u = user("u1");
        assert!(u.is(&UserId::new("u1").unwrap()));
        assert!(!u.is(&UserId::new("u2").unwrap()));
    }
}

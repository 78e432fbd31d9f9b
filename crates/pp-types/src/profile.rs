use serde::{Deserialize, Serialize};

use crate::auth::{Identity, UserId};

/// Profile row stored alongside the identity (`profiles` table).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            name: None,
            avatar_url: None,
        }
    }
}

/// Name and avatar shown in the navigation shell for the signed-in identity.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayProfile {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl DisplayProfile {
    /// Resolve the display profile for `identity`.
    ///
    /// The profile name wins, then the `full_name` metadata, then the email.
    /// Blank values count as missing.
    pub fn resolve(identity: &Identity, profile: Option<&UserProfile>) -> Self {
        let display_name = profile
            .and_then(|p| non_blank(p.name.as_deref()))
            .or_else(|| non_blank(identity.full_name.as_deref()))
            .or_else(|| non_blank(identity.email.as_deref()))
            .map(str::to_string);
        let avatar_url = profile.and_then(|p| non_blank(p.avatar_url.as_deref())).map(str::to_string);

        Self {
            display_name,
            avatar_url,
        }
    }

    /// Upper-cased first character of the display name, `U` when unknown.
    pub fn initial(&self) -> String {
        self.display_name
            .as_deref()
            .and_then(|name| name.chars().next())
            .unwrap_or('U')
            .to_uppercase()
            .collect()
    }

    /// Label for the profile link, falling back to a generic caption.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or("Your profile")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::new("u-1").with_email("ada@example.com").with_full_name("Ada Lovelace")
    }

    #[test]
    fn test_profile_name_wins() {
        let mut profile = UserProfile::new(UserId::from("u-1"));
        profile.name = Some("Countess".to_string());
        profile.avatar_url = Some("https://cdn.example/a.png".to_string());

        let resolved = DisplayProfile::resolve(&identity(), Some(&profile));
        assert_eq!(resolved.display_name.as_deref(), Some("Countess"));
        assert_eq!(resolved.avatar_url.as_deref(), Some("https://cdn.example/a.png"));
    }

    #[test]
    fn test_fallback_chain() {
        let blank = UserProfile {
            user_id: UserId::from("u-1"),
            name: Some("  ".to_string()),
            avatar_url: None,
        };
        assert_eq!(
            DisplayProfile::resolve(&identity(), Some(&blank)).display_name.as_deref(),
            Some("Ada Lovelace")
        );

        let email_only = Identity::new("u-2").with_email("bob@example.com");
        assert_eq!(
            DisplayProfile::resolve(&email_only, None).display_name.as_deref(),
            Some("bob@example.com")
        );

        let bare = Identity::new("u-3");
        let resolved = DisplayProfile::resolve(&bare, None);
        assert_eq!(resolved.display_name, None);
        assert_eq!(resolved.label(), "Your profile");
    }

    #[test]
    fn test_initial() {
        let resolved = DisplayProfile::resolve(&identity(), None);
        assert_eq!(resolved.initial(), "A");
        assert_eq!(DisplayProfile::default().initial(), "U");

        let lower = DisplayProfile {
            display_name: Some("émile".to_string()),
            avatar_url: None,
        };
        assert_eq!(lower.initial(), "É");
    }
}

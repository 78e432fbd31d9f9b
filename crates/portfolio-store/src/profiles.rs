//! The profile page: name, avatar and password.

use std::sync::Arc;

use async_trait::async_trait;
use pp_types::{UserId, UserProfile};
use secrecy::{ExposeSecret, SecretString};
use session_core::{Authenticator, Authorized, ProfileSource, SessionError, SessionResult, change_password};
use tracing::{info, warn};

use crate::{
    error::StoreResult, store::{ObjectStore, ProfileStore}, upload::{ImageKind, ImageUpload}
};

/// Message shown after a successful save.
pub const PROFILE_UPDATED: &str = "Profile updated";

/// What the profile form submits.
#[derive(Debug)]
pub struct ProfileForm {
    pub name: String,
    pub avatar: Option<ImageUpload>,
    pub old_password: SecretString,
    /// Blank keeps the current password.
    pub new_password: SecretString,
}

impl ProfileForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: None,
            old_password: SecretString::from(String::new()),
            new_password: SecretString::from(String::new()),
        }
    }

    pub fn with_avatar(mut self, avatar: ImageUpload) -> Self {
        self.avatar = Some(avatar);
        self
    }

    pub fn with_password_change(mut self, old_password: SecretString, new_password: SecretString) -> Self {
        self.old_password = old_password;
        self.new_password = new_password;
        self
    }
}

#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileStore>,
    objects: Arc<dyn ObjectStore>,
    auth: Arc<dyn Authenticator>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileStore>, objects: Arc<dyn ObjectStore>, auth: Arc<dyn Authenticator>) -> Self {
        Self { profiles, objects, auth }
    }

    /// The caller's profile row, or an empty one if none exists yet.
    pub async fn load(&self, auth: &Authorized) -> StoreResult<UserProfile> {
        let user = auth.user_id();
        Ok(self
            .profiles
            .fetch_profile(user)
            .await?
            .unwrap_or_else(|| UserProfile::new(user.clone())))
    }

    /// Save name and avatar, then change the password if a new one was given.
    ///
    /// The profile row is written before the password check, so a wrong old
    /// password still keeps the new name. A failed avatar upload keeps the
    /// previous avatar.
    pub async fn save(&self, auth: &Authorized, current: &UserProfile, form: ProfileForm) -> StoreResult<UserProfile> {
        let user = auth.user_id();
        let mut avatar_url = current.avatar_url.clone();
        if let Some(avatar) = form.avatar {
            match self.objects.upload(avatar.into_object(user, ImageKind::Avatar)).await {
                Ok(path) => avatar_url = Some(self.objects.public_url(&path)),
                Err(err) => warn!(user = %user, error = %err, "avatar upload failed, keeping previous avatar"),
            }
        }

        let profile = UserProfile {
            user_id: user.clone(),
            name: Some(form.name),
            avatar_url,
        };
        self.profiles.upsert_profile(&profile).await?;
        info!(user = %user, "profile saved");

        if !form.new_password.expose_secret().is_empty() {
            change_password(self.auth.as_ref(), auth.identity(), &form.old_password, &form.new_password).await?;
            info!(user = %user, "password changed");
        }
        Ok(profile)
    }

    /// [`save`](Self::save) reduced to the status line the page shows.
    pub async fn save_with_message(&self, auth: &Authorized, current: &UserProfile, form: ProfileForm) -> (Option<UserProfile>, String) {
        match self.save(auth, current, form).await {
            Ok(profile) => (Some(profile), PROFILE_UPDATED.to_string()),
            Err(err) => (None, err.to_string()),
        }
    }
}

/// Exposes a [`ProfileStore`] as the shell's [`ProfileSource`].
pub struct ProfileLookup {
    profiles: Arc<dyn ProfileStore>,
}

impl ProfileLookup {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ProfileSource for ProfileLookup {
    async fn fetch_profile(&self, user: &UserId) -> SessionResult<Option<UserProfile>> {
        self.profiles
            .fetch_profile(user)
            .await
            .map_err(|err| SessionError::Profile(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use pp_types::Identity;
    use session_core::{MemorySessionStore, ProfileResolver, StoreProfileResolver, test_support::authorized};

    use super::*;
    use crate::memory::MemoryPortfolioStore;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    struct Fixture {
        sessions: Arc<MemorySessionStore>,
        store: Arc<MemoryPortfolioStore>,
        service: ProfileService,
        auth: Authorized,
    }

    async fn fixture() -> Fixture {
        let sessions = Arc::new(MemorySessionStore::new());
        let identity = sessions.add_user("ada@example.com", "old");
        sessions.sign_in_with_password("ada@example.com", &secret("old")).await.unwrap();
        let store = Arc::new(MemoryPortfolioStore::new());
        let service = ProfileService::new(store.clone(), store.clone(), sessions.clone());
        Fixture {
            sessions,
            store,
            service,
            auth: authorized(identity),
        }
    }

    #[tokio::test]
    async fn test_save_name_and_avatar() {
        let f = fixture().await;
        let current = f.service.load(&f.auth).await.unwrap();
        assert_eq!(current.name, None);

        let form = ProfileForm::new("Ada").with_avatar(ImageUpload::new("me.png", vec![1, 2]));
        let (saved, message) = f.service.save_with_message(&f.auth, &current, form).await;
        assert_eq!(message, "Profile updated");
        let saved = saved.unwrap();
        let url = saved.avatar_url.clone().unwrap();
        assert!(url.starts_with("memory://objects/user-1/avatar/") && url.ends_with(".png"));
        assert_eq!(f.service.load(&f.auth).await.unwrap(), saved);

        // shell sees the stored name
        let resolver = StoreProfileResolver::new(ProfileLookup::new(f.store.clone()));
        let display = resolver.resolve(f.auth.identity()).await;
        assert_eq!(display.display_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_wrong_old_password_reports_message_but_keeps_name() {
        let f = fixture().await;
        let current = f.service.load(&f.auth).await.unwrap();
        let form = ProfileForm::new("Ada L.").with_password_change(secret("wrong"), secret("new"));
        let (saved, message) = f.service.save_with_message(&f.auth, &current, form).await;
        assert_eq!(saved, None);
        assert_eq!(message, "Old password is incorrect.");
        assert_eq!(f.service.load(&f.auth).await.unwrap().name.as_deref(), Some("Ada L."));
    }

    #[tokio::test]
    async fn test_password_change() {
        let f = fixture().await;
        let current = f.service.load(&f.auth).await.unwrap();
        let form = ProfileForm::new("").with_password_change(secret("old"), secret("new"));
        f.service.save(&f.auth, &current, form).await.unwrap();
        assert!(f.sessions.sign_in_with_password("ada@example.com", &secret("new")).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_avatar_upload_keeps_previous() {
        let f = fixture().await;
        f.store.fail_uploads(true);
        let mut current = UserProfile::new(f.auth.user_id().clone());
        current.avatar_url = Some("https://cdn.example/old.png".to_string());
        let form = ProfileForm::new("Ada").with_avatar(ImageUpload::new("me.png", vec![1]));
        let saved = f.service.save(&f.auth, &current, form).await.unwrap();
        assert_eq!(saved.avatar_url.as_deref(), Some("https://cdn.example/old.png"));
        assert_eq!(f.store.object_count(), 0);
    }
}

//! Display-name resolution for the navigation shell.

use std::sync::Arc;

use async_trait::async_trait;
use pp_types::{DisplayProfile, Identity, UserId, UserProfile};
use tracing::warn;

use crate::{error::SessionResult, store::MaybeSendSync};

/// Anything that can look up the profile row of an identity.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ProfileSource: MaybeSendSync {
    async fn fetch_profile(&self, user: &UserId) -> SessionResult<Option<UserProfile>>;
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<T> ProfileSource for Arc<T>
where
    T: ProfileSource + ?Sized,
{
    async fn fetch_profile(&self, user: &UserId) -> SessionResult<Option<UserProfile>> {
        (**self).fetch_profile(user).await
    }
}

/// Resolves the name and avatar shown for a signed-in identity.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ProfileResolver: MaybeSendSync {
    async fn resolve(&self, identity: &Identity) -> DisplayProfile;
}

/// [`ProfileResolver`] backed by a profile table, falling back to identity
/// metadata when the row is missing or cannot be fetched.
pub struct StoreProfileResolver<P> {
    source: P,
}

impl<P> StoreProfileResolver<P> {
    pub fn new(source: P) -> Self {
        Self { source }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<P> ProfileResolver for StoreProfileResolver<P>
where
    P: ProfileSource,
{
    async fn resolve(&self, identity: &Identity) -> DisplayProfile {
        let profile = match self.source.fetch_profile(&identity.id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(user = %identity.id, error = %err, "profile lookup failed, using identity metadata");
                None
            }
        };
        DisplayProfile::resolve(identity, profile.as_ref())
    }
}

/// Resolver that never looks anything up.
pub struct MetadataProfileResolver;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ProfileResolver for MetadataProfileResolver {
    async fn resolve(&self, identity: &Identity) -> DisplayProfile {
        DisplayProfile::resolve(identity, None)
    }
}

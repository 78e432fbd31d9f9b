//! Services shared by every component, provided once by the app root.

use std::sync::Arc;

use backend_client::{BackendClient, ClientResult, TokenStore};
use dioxus::prelude::*;
use portfolio_store::{ProfileLookup, ProfileService, ProjectService};
use pp_types::BackendConfig;
use session_core::{SessionContext, SessionMirror, StoreProfileResolver};

#[derive(Clone)]
pub struct AppServices {
    pub backend: Arc<BackendClient>,
    pub session: SessionContext,
    pub projects: ProjectService,
    pub profiles: ProfileService,
    /// Session view of the navigation shell.
    pub mirror: SessionMirror,
}

impl AppServices {
    /// Wire everything to one backend client.
    pub fn connect(config: BackendConfig, tokens: Arc<dyn TokenStore>, magic_link_redirect: Option<String>) -> ClientResult<Self> {
        let mut client = BackendClient::new(config)?.with_token_store(tokens);
        if let Some(redirect) = magic_link_redirect {
            client = client.with_magic_link_redirect(redirect);
        }
        let backend = Arc::new(client);

        let resolver = StoreProfileResolver::new(ProfileLookup::new(backend.clone()));
        let session = SessionContext::from_backend(backend.clone(), Arc::new(resolver));
        let projects = ProjectService::new(backend.clone(), backend.clone());
        let profiles = ProfileService::new(backend.clone(), backend.clone(), backend.clone());

        Ok(Self {
            backend,
            session,
            projects,
            profiles,
            mirror: SessionMirror::new(),
        })
    }
}

impl PartialEq for AppServices {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.backend, &other.backend)
    }
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices").field("session", &self.session).finish_non_exhaustive()
    }
}

pub fn use_services() -> AppServices {
    use_context::<AppServices>()
}

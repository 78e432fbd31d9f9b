//! Wiring shared by every view: where sessions come from, how they change,
//! and how display profiles are resolved.

use std::sync::Arc;

use crate::{
    gate::{AuthGate, GateConfig, drive_gate}, mirror::SessionMirror, profile::ProfileResolver, store::{Authenticator, SessionSource}
};

#[derive(Clone)]
pub struct SessionContext {
    pub source: Arc<dyn SessionSource>,
    pub auth: Arc<dyn Authenticator>,
    pub profiles: Arc<dyn ProfileResolver>,
    pub gate_config: GateConfig,
}

impl SessionContext {
    pub fn new(source: Arc<dyn SessionSource>, auth: Arc<dyn Authenticator>, profiles: Arc<dyn ProfileResolver>) -> Self {
        Self {
            source,
            auth,
            profiles,
            gate_config: GateConfig::default(),
        }
    }

    /// Context where one backend is both the session source and the authenticator.
    pub fn from_backend<B>(backend: Arc<B>, profiles: Arc<dyn ProfileResolver>) -> Self
    where
        B: SessionSource + Authenticator + 'static,
    {
        Self::new(backend.clone(), backend, profiles)
    }

    pub fn with_gate_config(mut self, gate_config: GateConfig) -> Self {
        self.gate_config = gate_config;
        self
    }

    /// Mount a pending gate for the view at `requested`.
    pub fn mount_gate(&self, requested: impl Into<String>) -> AuthGate {
        AuthGate::mount(requested, self.gate_config.clone())
    }

    /// Resolve and follow `gate` until it is torn down.
    pub async fn guard(&self, gate: AuthGate) {
        drive_gate(self.source.as_ref(), gate).await
    }

    /// Follow the session for the navigation shell until `mirror` is stopped.
    pub async fn mirror(&self, mirror: &SessionMirror) {
        mirror.run(self.source.as_ref(), self.profiles.as_ref()).await
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext").field("gate_config", &self.gate_config).finish_non_exhaustive()
    }
}

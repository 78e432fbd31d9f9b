//! Authorization gate for protected views.
//!
//! One [`AuthGate`] exists per mounted protected view. It starts `Pending`,
//! resolves from the initial session snapshot, follows session notifications
//! for as long as the view lives, and is torn down with the view. The render
//! decision is a pure function of its resolution state, see [`decide`].

mod driver;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use driver::drive_gate;
use pp_types::{Identity, ReturnTo, SIGN_IN_PATH, Session, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::{
    error::{GateError, SessionError}, store::SubscriptionHandle, ticket::{Sequencer, Ticket}
};

/// Tri-state derived from session snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// No snapshot applied yet.
    #[default]
    Pending,
    /// Resolved, nobody is signed in.
    Denied,
    /// Resolved, a session is present.
    Granted,
}

/// What a failed session fetch means for the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailurePolicy {
    /// Treat the failure exactly like "no session".
    #[default]
    Deny,
    /// Leave an already resolved state alone; a pending gate still denies.
    KeepLastKnown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    pub on_fetch_failure: FetchFailurePolicy,
    /// Where denied visitors are sent.
    pub sign_in_path: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            on_fetch_failure: FetchFailurePolicy::Deny,
            sign_in_path: SIGN_IN_PATH.to_string(),
        }
    }
}

/// One session observation fed into the gate.
#[derive(Debug, Clone, Copy)]
pub enum Observation<'a> {
    Present(&'a Session),
    Absent,
    /// The snapshot could not be obtained.
    Failed,
}

impl<'a> Observation<'a> {
    pub fn from_snapshot(snapshot: Option<&'a Session>) -> Self {
        match snapshot {
            Some(session) => Observation::Present(session),
            None => Observation::Absent,
        }
    }

    pub fn from_fetch(result: &'a Result<Option<Session>, SessionError>) -> Self {
        match result {
            Ok(snapshot) => Self::from_snapshot(snapshot.as_ref()),
            Err(_) => Observation::Failed,
        }
    }
}

/// Instruction handed to the router when a visitor is denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectRequest {
    /// Sign-in entry point.
    pub target: String,
    /// Location that triggered the gate, if it is a valid local path.
    pub return_to: Option<ReturnTo>,
}

impl RedirectRequest {
    /// Target with the return location encoded as the `from` query parameter.
    pub fn href(&self) -> String {
        match &self.return_to {
            Some(to) => {
                let encoded: String = url::form_urlencoded::byte_serialize(to.as_str().as_bytes()).collect();
                format!("{}?from={}", self.target, encoded)
            }
            None => self.target.clone(),
        }
    }
}

/// Render decision for a protected view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Show the loading indicator only.
    Loading,
    /// Do not render content; navigate to sign-in.
    Redirect(RedirectRequest),
    /// Render the wrapped content unchanged.
    Render,
}

/// Pure render decision for `resolution` on the view at `requested`.
pub fn decide(resolution: Resolution, requested: &str, config: &GateConfig) -> GateDecision {
    match resolution {
        Resolution::Pending => GateDecision::Loading,
        Resolution::Denied => GateDecision::Redirect(RedirectRequest {
            target: config.sign_in_path.clone(),
            return_to: ReturnTo::parse(requested),
        }),
        Resolution::Granted => GateDecision::Render,
    }
}

/// Proof that a gate was granted, carrying the signed-in identity.
///
/// Only a granted [`AuthGate`] hands these out, so anything that requires one
/// cannot run while the gate is pending or denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorized {
    identity: Identity,
}

impl Authorized {
    pub(crate) fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> &UserId {
        &self.identity.id
    }
}

#[derive(Debug, Default)]
struct GateCore {
    resolution: Resolution,
    identity: Option<Identity>,
    sequencer: Sequencer,
    torn_down: bool,
    subscription: Option<SubscriptionHandle>,
}

struct GateInner {
    requested: String,
    config: GateConfig,
    initial: Ticket,
    core: Mutex<GateCore>,
    resolution_tx: watch::Sender<Resolution>,
}

/// Per-view authorization state holder. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AuthGate {
    inner: Arc<GateInner>,
}

impl AuthGate {
    /// Mount a gate for the view at `requested` in the `Pending` state.
    ///
    /// The ticket for the initial snapshot is issued here, before any
    /// notification can take one, so every notification outranks it.
    pub fn mount(requested: impl Into<String>, config: GateConfig) -> Self {
        let mut core = GateCore::default();
        let initial = core.sequencer.issue();
        let (resolution_tx, _) = watch::channel(Resolution::Pending);
        let requested = requested.into();
        debug!(path = %requested, "gate mounted");

        Self {
            inner: Arc::new(GateInner {
                requested,
                config,
                initial,
                core: Mutex::new(core),
                resolution_tx,
            }),
        }
    }

    fn core(&self) -> MutexGuard<'_, GateCore> {
        self.inner.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn requested(&self) -> &str {
        &self.inner.requested
    }

    pub fn config(&self) -> &GateConfig {
        &self.inner.config
    }

    /// Ticket reserved for the initial snapshot.
    pub fn initial_ticket(&self) -> Ticket {
        self.inner.initial
    }

    /// Take a ticket for a notification that just arrived. `None` after teardown.
    pub fn issue_ticket(&self) -> Option<Ticket> {
        let mut core = self.core();
        if core.torn_down {
            return None;
        }
        Some(core.sequencer.issue())
    }

    /// Apply an observation under `ticket`. Returns whether observers were notified.
    ///
    /// Writes after teardown and writes whose ticket is older than the last
    /// applied one are discarded. Writing the state the gate already holds
    /// does not notify.
    pub fn apply(&self, ticket: Ticket, observation: Observation<'_>) -> bool {
        let mut core = self.core();
        if core.torn_down {
            trace!(ticket = ticket.seq(), "write after teardown ignored");
            return false;
        }

        let (resolution, identity) = match observation {
            Observation::Present(session) => (Resolution::Granted, Some(&session.identity)),
            Observation::Absent => (Resolution::Denied, None),
            Observation::Failed => match self.inner.config.on_fetch_failure {
                FetchFailurePolicy::Deny => (Resolution::Denied, None),
                FetchFailurePolicy::KeepLastKnown if core.resolution == Resolution::Pending => (Resolution::Denied, None),
                FetchFailurePolicy::KeepLastKnown => {
                    // consume the ticket so an even older write cannot land later
                    core.sequencer.admit(ticket);
                    debug!(path = %self.inner.requested, "session fetch failed, keeping last known state");
                    return false;
                }
            },
        };

        if !core.sequencer.admit(ticket) {
            debug!(
                ticket = ticket.seq(),
                applied = core.sequencer.last_applied(),
                "stale gate write discarded"
            );
            return false;
        }

        if core.resolution == resolution && core.identity.as_ref() == identity {
            return false;
        }

        core.resolution = resolution;
        core.identity = identity.cloned();
        drop(core);

        debug!(path = %self.inner.requested, ?resolution, ticket = ticket.seq(), "gate resolved");
        self.inner.resolution_tx.send_replace(resolution);
        true
    }

    pub fn resolution(&self) -> Resolution {
        self.core().resolution
    }

    /// Observe resolution changes (for re-rendering).
    pub fn watch(&self) -> watch::Receiver<Resolution> {
        self.inner.resolution_tx.subscribe()
    }

    pub fn decision(&self) -> GateDecision {
        decide(self.resolution(), &self.inner.requested, &self.inner.config)
    }

    /// Hand out a write proof if, and only if, the gate is granted.
    pub fn authorize(&self) -> Result<Authorized, GateError> {
        let core = self.core();
        if core.torn_down {
            return Err(GateError::TornDown);
        }
        match (core.resolution, &core.identity) {
            (Resolution::Granted, Some(identity)) => Ok(Authorized::new(identity.clone())),
            (Resolution::Pending, _) => Err(GateError::Pending),
            _ => Err(GateError::Denied),
        }
    }

    /// Remember the subscription so teardown can cancel it.
    ///
    /// Returns `false` (and cancels the handle) when the gate is already gone.
    pub fn attach_subscription(&self, handle: SubscriptionHandle) -> bool {
        let mut core = self.core();
        if core.torn_down {
            handle.cancel();
            return false;
        }
        if let Some(previous) = core.subscription.replace(handle) {
            previous.cancel();
        }
        true
    }

    /// Unmount: cancel the subscription now and refuse every later write.
    pub fn teardown(&self) {
        let mut core = self.core();
        if core.torn_down {
            return;
        }
        core.torn_down = true;
        if let Some(handle) = core.subscription.take() {
            handle.cancel();
        }
        debug!(path = %self.inner.requested, "gate torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.core().torn_down
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core();
        f.debug_struct("AuthGate")
            .field("requested", &self.inner.requested)
            .field("resolution", &core.resolution)
            .field("torn_down", &core.torn_down)
            .finish()
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;

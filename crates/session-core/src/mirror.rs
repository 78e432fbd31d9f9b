//! Session mirror for the navigation shell.
//!
//! The shell (navbar, avatar, sign-out button) keeps its own copy of the
//! session state. It runs its own fetch and subscription, independent of any
//! gate, and resolves the display profile for whoever is signed in.

use std::{
    future::Future, pin::Pin, sync::{Arc, Mutex, MutexGuard, PoisonError}
};

use pp_types::{DisplayProfile, Identity, SIGN_IN_PATH, Session};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    error::SessionResult, gate::Resolution, profile::ProfileResolver, store::{Authenticator, SessionSource, SubscriptionHandle}, ticket::{Sequencer, Ticket}
};

#[cfg(not(target_arch = "wasm32"))]
type ProfileLookup<'a> = Pin<Box<dyn Future<Output = DisplayProfile> + Send + 'a>>;
#[cfg(target_arch = "wasm32")]
type ProfileLookup<'a> = Pin<Box<dyn Future<Output = DisplayProfile> + 'a>>;

/// A profile lookup in flight, tagged with the snapshot it belongs to.
type PendingProfile<'a> = (Ticket, ProfileLookup<'a>);

/// What the shell renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellState {
    pub resolution: Resolution,
    pub identity: Option<Identity>,
    pub profile: DisplayProfile,
}

impl ShellState {
    pub fn is_signed_in(&self) -> bool {
        self.resolution == Resolution::Granted
    }
}

#[derive(Default)]
struct MirrorCore {
    sequencer: Sequencer,
    stopped: bool,
    subscription: Option<SubscriptionHandle>,
}

struct MirrorInner {
    core: Mutex<MirrorCore>,
    state: watch::Sender<ShellState>,
}

#[derive(Clone)]
pub struct SessionMirror {
    inner: Arc<MirrorInner>,
}

impl Default for SessionMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMirror {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ShellState::default());
        Self {
            inner: Arc::new(MirrorInner {
                core: Mutex::new(MirrorCore::default()),
                state,
            }),
        }
    }

    fn core(&self) -> MutexGuard<'_, MirrorCore> {
        self.inner.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ShellState {
        self.inner.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<ShellState> {
        self.inner.state.subscribe()
    }

    /// Record a snapshot. The resolution switches immediately; when someone
    /// is signed in the returned ticket and identity are used to resolve the
    /// profile, see [`apply_profile`](Self::apply_profile).
    pub fn observe(&self, snapshot: Option<&Session>) -> Option<(Ticket, Identity)> {
        let ticket = self.issue()?;
        self.record(ticket, snapshot)
    }

    fn issue(&self) -> Option<Ticket> {
        let mut core = self.core();
        (!core.stopped).then(|| core.sequencer.issue())
    }

    /// Apply `snapshot` under `ticket`; nothing changes if a newer snapshot
    /// was applied first.
    fn record(&self, ticket: Ticket, snapshot: Option<&Session>) -> Option<(Ticket, Identity)> {
        let mut core = self.core();
        if core.stopped || !core.sequencer.admit(ticket) {
            return None;
        }
        drop(core);

        match snapshot {
            Some(session) => {
                let identity = session.identity.clone();
                self.inner.state.send_if_modified(|state| {
                    let same_user = state.identity.as_ref().map(|i| &i.id) == Some(&identity.id);
                    if state.resolution == Resolution::Granted && state.identity.as_ref() == Some(&identity) {
                        return false;
                    }
                    state.resolution = Resolution::Granted;
                    state.identity = Some(identity.clone());
                    if !same_user {
                        // placeholder until the profile row arrives
                        state.profile = DisplayProfile::resolve(&identity, None);
                    }
                    true
                });
                Some((ticket, identity))
            }
            None => {
                self.inner.state.send_if_modified(|state| {
                    if state.resolution == Resolution::Denied {
                        return false;
                    }
                    *state = ShellState {
                        resolution: Resolution::Denied,
                        ..ShellState::default()
                    };
                    true
                });
                None
            }
        }
    }

    /// Store a resolved profile unless a newer snapshot arrived meanwhile.
    pub fn apply_profile(&self, ticket: Ticket, profile: DisplayProfile) -> bool {
        let core = self.core();
        if core.stopped || core.sequencer.last_applied() != ticket.seq() {
            debug!(ticket = ticket.seq(), "stale profile discarded");
            return false;
        }
        drop(core);
        self.inner.state.send_if_modified(|state| {
            if state.profile == profile {
                return false;
            }
            state.profile = profile;
            true
        })
    }

    /// Fetch the session once and follow notifications until
    /// [`stop`](Self::stop) is called or the source goes away.
    ///
    /// Profile lookups run alongside the notification stream; a newer
    /// snapshot drops the lookup still in flight.
    pub async fn run<S, R>(&self, source: &S, resolver: &R)
    where
        S: SessionSource + ?Sized,
        R: ProfileResolver + ?Sized,
    {
        let mut subscription = source.subscribe();
        let initial = {
            let mut core = self.core();
            if core.stopped {
                subscription.cancel();
                return;
            }
            core.subscription = Some(subscription.handle());
            core.sequencer.issue()
        };

        let fetch = source.current();
        tokio::pin!(fetch);
        let mut fetched = false;
        let mut pending: Option<PendingProfile<'_>> = None;

        loop {
            tokio::select! {
                result = &mut fetch, if !fetched => {
                    fetched = true;
                    let snapshot = result.unwrap_or_else(|err| {
                        warn!(error = %err, "shell session fetch failed");
                        None
                    });
                    if let Some((ticket, identity)) = self.record(initial, snapshot.as_ref()) {
                        pending = Some((ticket, lookup(resolver, identity)));
                    }
                }
                event = subscription.next() => {
                    let Some(event) = event else { break };
                    let Some(ticket) = self.issue() else { break };
                    pending = self
                        .record(ticket, event.session())
                        .map(|(ticket, identity)| (ticket, lookup(resolver, identity)));
                }
                (ticket, profile) = settle(&mut pending), if pending.is_some() => {
                    pending = None;
                    self.apply_profile(ticket, profile);
                }
            }
        }
        debug!("session mirror stopped");
    }

    /// Stop following the session; later snapshots are ignored.
    pub fn stop(&self) {
        let mut core = self.core();
        core.stopped = true;
        if let Some(handle) = core.subscription.take() {
            handle.cancel();
        }
    }

    /// Sign out through `auth` and return where the shell should navigate.
    pub async fn sign_out<A>(&self, auth: &A) -> SessionResult<&'static str>
    where
        A: Authenticator + ?Sized,
    {
        auth.sign_out().await?;
        self.observe(None);
        Ok(SIGN_IN_PATH)
    }
}

fn lookup<R>(resolver: &R, identity: Identity) -> ProfileLookup<'_>
where
    R: ProfileResolver + ?Sized,
{
    Box::pin(async move { resolver.resolve(&identity).await })
}

async fn settle(pending: &mut Option<PendingProfile<'_>>) -> (Ticket, DisplayProfile) {
    match pending {
        Some((ticket, lookup)) => (*ticket, lookup.await),
        None => std::future::pending().await,
    }
}

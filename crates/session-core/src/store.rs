//! Session store seams.
//!
//! [`SessionSource`] is the read side every gate and the shell depend on: a
//! single-shot snapshot plus a push subscription. [`Authenticator`] is the
//! write side used only by the sign-in, sign-up, profile and sign-out flows.

use std::{
    collections::HashMap, sync::{
        Arc, Mutex, MutexGuard, PoisonError, Weak, atomic::{AtomicU64, Ordering}
    }
};

use async_trait::async_trait;
use pp_types::{Identity, Session};
use secrecy::SecretString;
use tokio::sync::mpsc;
use tracing::debug;

use crate::{
    error::{SessionError, SessionResult}, signin::SignUpOutcome
};

/// `Send + Sync` on native targets, nothing in the browser where futures and
/// handles are single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}

/// Read side of the session store.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SessionSource: MaybeSendSync {
    /// Point-in-time snapshot of the current session, if any.
    async fn current(&self) -> SessionResult<Option<Session>>;

    /// Register for session-change notifications until the subscription is
    /// cancelled or dropped.
    fn subscribe(&self) -> SessionSubscription;
}

/// Write side of the session store.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Authenticator: MaybeSendSync {
    /// Password sign-in. `Ok(None)` means the backend accepted the request
    /// without opening a session (e.g. unconfirmed email).
    async fn sign_in_with_password(&self, email: &str, password: &SecretString) -> SessionResult<Option<Session>>;

    async fn sign_up(&self, email: &str, password: &SecretString) -> SessionResult<SignUpOutcome>;

    /// Email a one-time sign-in link, creating the user if needed.
    async fn send_magic_link(&self, email: &str) -> SessionResult<()>;

    async fn sign_out(&self) -> SessionResult<()>;

    /// Replace the password of the signed-in identity without re-verifying.
    /// Use [`change_password`] for the user-facing flow.
    async fn set_password(&self, new_password: &SecretString) -> SessionResult<()>;
}

/// Change the password of `identity` after confirming `current` is correct.
pub async fn change_password<A>(
    auth: &A,
    identity: &Identity,
    current: &SecretString,
    new_password: &SecretString,
) -> SessionResult<()>
where
    A: Authenticator + ?Sized,
{
    let email = identity.email.as_deref().ok_or(SessionError::NotSignedIn)?;
    match auth.sign_in_with_password(email, current).await {
        Ok(Some(_)) => {}
        Ok(None) | Err(SessionError::Rejected(_)) => return Err(SessionError::IncorrectPassword),
        Err(err) => return Err(err),
    }
    auth.set_password(new_password).await
}

/// Notification pushed to subscribers when the session changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    UserUpdated(Session),
    SignedOut,
    /// The backend dropped the session on its own (token expiry, revocation).
    Expired,
}

impl SessionEvent {
    /// Session carried by the notification, `None` for sign-out and expiry.
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionEvent::SignedIn(s) | SessionEvent::TokenRefreshed(s) | SessionEvent::UserUpdated(s) => Some(s),
            SessionEvent::SignedOut | SessionEvent::Expired => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::SignedIn(_) => "signed_in",
            SessionEvent::TokenRefreshed(_) => "token_refreshed",
            SessionEvent::UserUpdated(_) => "user_updated",
            SessionEvent::SignedOut => "signed_out",
            SessionEvent::Expired => "expired",
        }
    }
}

struct NotifierInner {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<u64, mpsc::UnboundedSender<SessionEvent>>>,
}

impl NotifierInner {
    fn subscribers(&self) -> MutexGuard<'_, HashMap<u64, mpsc::UnboundedSender<SessionEvent>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fan-out registry of session subscribers.
///
/// Each subscriber owns its own unbounded queue so a slow view never makes
/// another one miss a notification. Cancelling a subscription removes its
/// queue from the registry immediately.
#[derive(Clone)]
pub struct SessionNotifier {
    inner: Arc<NotifierInner>,
}

impl Default for SessionNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionNotifier {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                next_id: AtomicU64::new(1),
                subscribers: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn subscribe(&self) -> SessionSubscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.subscribers().insert(id, tx);
        debug!(subscription = id, "session subscriber registered");

        SessionSubscription {
            rx,
            handle: SubscriptionHandle {
                id,
                registry: Arc::downgrade(&self.inner),
            },
        }
    }

    /// Deliver `event` to every live subscriber, returning how many received it.
    pub fn publish(&self, event: SessionEvent) -> usize {
        let mut subscribers = self.inner.subscribers();
        subscribers.retain(|_, tx| !tx.is_closed());
        let mut delivered = 0;
        for tx in subscribers.values() {
            if tx.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        debug!(event = event.kind(), delivered, "session change published");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.inner.subscribers();
        subscribers.retain(|_, tx| !tx.is_closed());
        subscribers.len()
    }
}

/// Cloneable cancel handle for a [`SessionSubscription`].
#[derive(Clone)]
pub struct SubscriptionHandle {
    id: u64,
    registry: Weak<NotifierInner>,
}

impl SubscriptionHandle {
    /// Unregister synchronously. Nothing published afterwards is delivered.
    pub fn cancel(&self) {
        if let Some(inner) = self.registry.upgrade()
            && inner.subscribers().remove(&self.id).is_some()
        {
            debug!(subscription = self.id, "session subscriber cancelled");
        }
    }

    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|inner| inner.subscribers().contains_key(&self.id))
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Receiving end of a session subscription. Dropping it cancels.
pub struct SessionSubscription {
    rx: mpsc::UnboundedReceiver<SessionEvent>,
    handle: SubscriptionHandle,
}

impl SessionSubscription {
    /// Next notification; `None` once cancelled or when the store goes away.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }

    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

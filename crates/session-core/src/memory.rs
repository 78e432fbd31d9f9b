//! In-process session store.
//!
//! Behaves like the hosted auth service from the UI's point of view: a user
//! registry, one current session, change notifications. Used by tests and by
//! offline/demo wiring. Fetches can be held back or made to fail so gate races
//! can be reproduced deterministically.

use std::{
    collections::HashMap, sync::{
        Mutex, MutexGuard, PoisonError, atomic::{AtomicUsize, Ordering}
    }
};

use async_trait::async_trait;
use pp_types::{Identity, Session};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    error::{SessionError, SessionResult}, signin::SignUpOutcome, store::{Authenticator, SessionEvent, SessionNotifier, SessionSource, SessionSubscription}
};

struct MemoryUser {
    identity: Identity,
    password: SecretString,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, MemoryUser>,
    current: Option<Session>,
    magic_links: Vec<String>,
    next_user: u64,
}

pub struct MemorySessionStore {
    state: Mutex<MemoryState>,
    notifier: SessionNotifier,
    fetch_open: watch::Sender<bool>,
    fetch_calls: AtomicUsize,
    fetches_answered: AtomicUsize,
    failing_fetches: AtomicUsize,
    /// When set, sign-up creates the user without opening a session.
    confirm_email: bool,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        let (fetch_open, _) = watch::channel(true);
        Self {
            state: Mutex::new(MemoryState::default()),
            notifier: SessionNotifier::new(),
            fetch_open,
            fetch_calls: AtomicUsize::new(0),
            fetches_answered: AtomicUsize::new(0),
            failing_fetches: AtomicUsize::new(0),
            confirm_email: false,
        }
    }

    /// Sign-ups wait for email confirmation instead of signing in.
    pub fn with_email_confirmation(mut self) -> Self {
        self.confirm_email = true;
        self
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a user that can sign in with `password`.
    pub fn add_user(&self, email: &str, password: &str) -> Identity {
        let mut state = self.state();
        Self::insert_user(&mut state, email, SecretString::from(password.to_string()))
    }

    fn insert_user(state: &mut MemoryState, email: &str, password: SecretString) -> Identity {
        state.next_user += 1;
        let identity = Identity::new(format!("user-{}", state.next_user)).with_email(email);
        state.users.insert(
            email.to_lowercase(),
            MemoryUser {
                identity: identity.clone(),
                password,
            },
        );
        identity
    }

    /// Replace the current session without going through sign-in and notify.
    pub fn set_session(&self, session: Option<Session>) {
        let event = match &session {
            Some(s) => SessionEvent::SignedIn(s.clone()),
            None => SessionEvent::SignedOut,
        };
        self.state().current = session;
        self.notifier.publish(event);
    }

    /// Drop the current session as if the backend expired it.
    pub fn expire(&self) {
        let had_session = self.state().current.take().is_some();
        if had_session {
            info!("session expired");
            self.notifier.publish(SessionEvent::Expired);
        }
    }

    /// Emails that were sent a magic link, oldest first.
    pub fn magic_links_sent(&self) -> Vec<String> {
        self.state().magic_links.clone()
    }

    /// Complete the most recent magic link sent to `email`.
    pub fn complete_magic_link(&self, email: &str) -> SessionResult<Session> {
        let session = {
            let mut state = self.state();
            if !state.magic_links.iter().any(|e| e.eq_ignore_ascii_case(email)) {
                return Err(SessionError::rejected("Email link is invalid or has expired"));
            }
            let identity = state
                .users
                .get(&email.to_lowercase())
                .map(|u| u.identity.clone())
                .ok_or_else(|| SessionError::rejected("User not found"))?;
            let session = Session::new(identity);
            state.current = Some(session.clone());
            session
        };
        self.notifier.publish(SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    /// Hold every `current()` call until [`resume_fetches`](Self::resume_fetches).
    ///
    /// A held fetch answers with the snapshot taken when it was called.
    pub fn pause_fetches(&self) {
        self.fetch_open.send_replace(false);
    }

    pub fn resume_fetches(&self) {
        self.fetch_open.send_replace(true);
    }

    /// Make the next `count` fetches fail with a transport error.
    pub fn fail_next_fetches(&self, count: usize) {
        self.failing_fetches.store(count, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Fetches that have returned to their caller.
    pub fn fetches_answered(&self) -> usize {
        self.fetches_answered.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SessionSource for MemorySessionStore {
    async fn current(&self) -> SessionResult<Option<Session>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing_fetches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let snapshot = self.state().current.clone();

        let mut open = self.fetch_open.subscribe();
        let closed = open.wait_for(|open| *open).await.is_err();
        self.fetches_answered.fetch_add(1, Ordering::SeqCst);
        if closed {
            return Err(SessionError::transport("session store closed"));
        }
        if failing {
            debug!("injected session fetch failure");
            return Err(SessionError::transport("injected failure"));
        }
        Ok(snapshot)
    }

    fn subscribe(&self) -> SessionSubscription {
        self.notifier.subscribe()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Authenticator for MemorySessionStore {
    async fn sign_in_with_password(&self, email: &str, password: &SecretString) -> SessionResult<Option<Session>> {
        let session = {
            let mut state = self.state();
            let user = state
                .users
                .get(&email.to_lowercase())
                .filter(|u| u.password.expose_secret() == password.expose_secret())
                .ok_or_else(|| SessionError::rejected("Invalid login credentials"))?;
            let session = Session::new(user.identity.clone());
            state.current = Some(session.clone());
            session
        };
        info!(email, "signed in");
        self.notifier.publish(SessionEvent::SignedIn(session.clone()));
        Ok(Some(session))
    }

    async fn sign_up(&self, email: &str, password: &SecretString) -> SessionResult<SignUpOutcome> {
        let (identity, session) = {
            let mut state = self.state();
            if state.users.contains_key(&email.to_lowercase()) {
                return Err(SessionError::rejected("User already registered"));
            }
            let identity = Self::insert_user(&mut state, email, password.clone());
            let session = (!self.confirm_email).then(|| Session::new(identity.clone()));
            if let Some(s) = &session {
                state.current = Some(s.clone());
            }
            (identity, session)
        };
        if let Some(s) = &session {
            self.notifier.publish(SessionEvent::SignedIn(s.clone()));
        }
        Ok(SignUpOutcome {
            identity: Some(identity),
            session,
        })
    }

    async fn send_magic_link(&self, email: &str) -> SessionResult<()> {
        let mut state = self.state();
        if !state.users.contains_key(&email.to_lowercase()) {
            // links create the user on first use
            Self::insert_user(&mut state, email, SecretString::from(String::new()));
        }
        state.magic_links.push(email.to_string());
        Ok(())
    }

    async fn sign_out(&self) -> SessionResult<()> {
        self.state().current = None;
        info!("signed out");
        self.notifier.publish(SessionEvent::SignedOut);
        Ok(())
    }

    async fn set_password(&self, new_password: &SecretString) -> SessionResult<()> {
        let session = {
            let mut state = self.state();
            let current = state.current.clone().ok_or(SessionError::NotSignedIn)?;
            let key = current.identity.email.as_deref().map(str::to_lowercase).unwrap_or_default();
            let user = state.users.get_mut(&key).ok_or(SessionError::NotSignedIn)?;
            user.password = new_password.clone();
            current
        };
        self.notifier.publish(SessionEvent::UserUpdated(session));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::change_password;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[tokio::test]
    async fn test_sign_in_publishes_and_sets_current() {
        let store = MemorySessionStore::new();
        store.add_user("ada@example.com", "pw");
        let mut sub = store.subscribe();

        let session = store.sign_in_with_password("ADA@example.com", &secret("pw")).await.unwrap();
        assert!(session.is_some());
        assert_eq!(store.current().await.unwrap(), session);
        assert!(matches!(sub.next().await, Some(SessionEvent::SignedIn(_))));

        let err = store.sign_in_with_password("ada@example.com", &secret("nope")).await.unwrap_err();
        assert_eq!(err, SessionError::rejected("Invalid login credentials"));
    }

    #[tokio::test]
    async fn test_sign_up_with_confirmation_opens_no_session() {
        let store = MemorySessionStore::new().with_email_confirmation();
        let outcome = store.sign_up("new@example.com", &secret("pw")).await.unwrap();
        assert!(outcome.identity.is_some());
        assert!(outcome.session.is_none());
        assert_eq!(store.current().await.unwrap(), None);

        assert!(store.sign_up("new@example.com", &secret("pw")).await.is_err());
    }

    #[tokio::test]
    async fn test_magic_link_round_trip() {
        let store = MemorySessionStore::new();
        store.send_magic_link("link@example.com").await.unwrap();
        assert_eq!(store.magic_links_sent(), vec!["link@example.com".to_string()]);

        let session = store.complete_magic_link("link@example.com").unwrap();
        assert_eq!(session.identity.email.as_deref(), Some("link@example.com"));
        assert!(store.complete_magic_link("other@example.com").is_err());
    }

    #[tokio::test]
    async fn test_change_password_verifies_old_password() {
        let store = MemorySessionStore::new();
        let identity = store.add_user("ada@example.com", "old");
        store.sign_in_with_password("ada@example.com", &secret("old")).await.unwrap();

        let err = change_password(&store, &identity, &secret("wrong"), &secret("new")).await.unwrap_err();
        assert_eq!(err, SessionError::IncorrectPassword);
        assert_eq!(err.to_string(), "Old password is incorrect.");

        change_password(&store, &identity, &secret("old"), &secret("new")).await.unwrap();
        assert!(store.sign_in_with_password("ada@example.com", &secret("new")).await.is_ok());
    }

    #[tokio::test]
    async fn test_injected_failures_are_counted() {
        let store = MemorySessionStore::new();
        store.fail_next_fetches(1);
        assert!(store.current().await.is_err());
        assert!(store.current().await.is_ok());
        assert_eq!(store.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_expire_notifies_only_with_session() {
        let store = MemorySessionStore::new();
        let mut sub = store.subscribe();
        store.expire();
        store.set_session(Some(Session::new(Identity::new("u-9"))));
        store.expire();

        assert!(matches!(sub.next().await, Some(SessionEvent::SignedIn(_))));
        assert_eq!(sub.next().await, Some(SessionEvent::Expired));
    }
}

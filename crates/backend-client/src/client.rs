//! [`BackendClient`]: the hosted backend behind every seam the app uses.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, atomic::{AtomicU64, Ordering}
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portfolio_store::{
    NewProject, ObjectStore, ObjectUpload, ProfileStore, ProjectPatch, ProjectStore, StepRow, StoreResult
};
use pp_types::{BackendConfig, Identity, Project, ProjectId, Session, Step, StepId, UserId, UserProfile};
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use session_core::{
    Authenticator, SessionEvent, SessionNotifier, SessionResult, SessionSource, SessionSubscription, SignUpOutcome
};
use tracing::{debug, info, warn};

use crate::{
    endpoints::{Endpoints, Order, Query},
    error::{ClientError, ClientResult},
    fragment::parse_fragment,
    tokens::{MemoryTokenStore, TokenStore},
    wire::{AuthState, PersistedAuth, SignUpResponse, TokenResponse, UserResponse, error_message},
};

const PROJECTS: &str = "projects";
const STEPS: &str = "project_steps";
const PROFILES: &str = "profiles";
const STEP_COLUMNS: &str = "id,project_id,title,is_done,position";

const RETURN_REPRESENTATION: &str = "return=representation";
const RETURN_MINIMAL: &str = "return=minimal";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=minimal";

pub struct BackendClient {
    http: reqwest::Client,
    config: BackendConfig,
    endpoints: Endpoints,
    state: Mutex<Option<AuthState>>,
    /// Bumped on every install; only changed with `state` locked.
    generation: AtomicU64,
    /// One token refresh at a time.
    refresh_lock: tokio::sync::Mutex<()>,
    notifier: SessionNotifier,
    tokens: Arc<dyn TokenStore>,
    magic_link_redirect: Option<String>,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> ClientResult<Self> {
        let endpoints = Endpoints::new(&config)?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            config,
            endpoints,
            state: Mutex::new(None),
            generation: AtomicU64::new(0),
            refresh_lock: tokio::sync::Mutex::new(()),
            notifier: SessionNotifier::new(),
            tokens: Arc::new(MemoryTokenStore::new()),
            magic_link_redirect: None,
        })
    }

    /// Persist the sign-in in `tokens`, restoring whatever it already holds.
    pub fn with_token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        let restored = tokens.load().and_then(|raw| match serde_json::from_str::<PersistedAuth>(&raw) {
            Ok(saved) => Some(AuthState::from(saved)),
            Err(err) => {
                warn!(error = %err, "discarding unreadable saved sign-in");
                tokens.clear();
                None
            }
        });
        if let Some(state) = &restored {
            debug!(user = %state.session.identity.id, "restored saved sign-in");
        }
        *self.state.get_mut().unwrap_or_else(PoisonError::into_inner) = restored;
        self.tokens = tokens;
        self
    }

    /// Where magic links send the browser back to.
    pub fn with_magic_link_redirect(mut self, url: impl Into<String>) -> Self {
        self.magic_link_redirect = Some(url.into());
        self
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, Option<AuthState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bearer(&self) -> String {
        self.state()
            .as_ref()
            .map(|s| s.tokens.access_token.expose_secret().to_string())
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    fn request(&self, method: Method, url: url::Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer())
    }

    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(&body, status.as_u16()),
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send(&self, request: RequestBuilder) -> ClientResult<()> {
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Install a new sign-in (or none), persist it and tell subscribers.
    fn replace_state(&self, state: Option<AuthState>, event: SessionEvent) {
        self.install(None, state, event);
    }

    /// Like [`replace_state`](Self::replace_state), but only while the held
    /// sign-in is still the one of `expected` generation.
    fn install(&self, expected: Option<u64>, state: Option<AuthState>, event: SessionEvent) -> bool {
        let mut slot = self.state();
        if expected.is_some_and(|generation| generation != self.generation.load(Ordering::SeqCst)) {
            return false;
        }
        match &state {
            Some(s) => match serde_json::to_string(&s.persisted()) {
                Ok(raw) => self.tokens.save(&raw),
                Err(err) => warn!(error = %err, "could not persist sign-in"),
            },
            None => self.tokens.clear(),
        }
        *slot = state;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.notifier.publish(event);
        true
    }

    fn current_session(&self) -> Option<Session> {
        self.state().as_ref().map(|s| s.session.clone())
    }

    /// What a refresh started now would have to do.
    fn refresh_step(&self, now: DateTime<Utc>) -> RefreshStep {
        let state = self.state();
        match state.as_ref() {
            None => RefreshStep::Done(None),
            Some(s) if !s.tokens.needs_refresh_at(now) => RefreshStep::Done(Some(s.session.clone())),
            Some(s) => RefreshStep::Due {
                generation: self.generation.load(Ordering::SeqCst),
                refresh_token: s.tokens.refresh_token.clone(),
            },
        }
    }

    /// Refresh the held tokens if they still need it once this caller gets
    /// its turn. Callers that queued behind a refresh reuse its outcome.
    async fn refresh(&self) -> ClientResult<Option<Session>> {
        let _turn = self.refresh_lock.lock().await;
        let (generation, refresh_token) = match self.refresh_step(Utc::now()) {
            RefreshStep::Done(session) => return Ok(session),
            RefreshStep::Due {
                generation,
                refresh_token,
            } => (generation, refresh_token),
        };
        let request = self
            .request(Method::POST, self.endpoints.token("refresh_token"))
            .json(&json!({ "refresh_token": refresh_token.expose_secret() }));
        let response = self.send_json::<TokenResponse>(request).await;
        self.finish_refresh(generation, response)
    }

    /// Install the outcome of a refresh started at `generation`. A sign-in
    /// that changed in the meantime wins over the outcome.
    fn finish_refresh(&self, generation: u64, response: ClientResult<TokenResponse>) -> ClientResult<Option<Session>> {
        match response {
            Ok(response) => {
                let state = AuthState::from_token_response(response, Utc::now());
                let session = state.session.clone();
                if self.install(Some(generation), Some(state), SessionEvent::TokenRefreshed(session.clone())) {
                    debug!(user = %session.identity.id, "session refreshed");
                    Ok(Some(session))
                } else {
                    debug!("sign-in changed during refresh, refreshed tokens dropped");
                    Ok(self.current_session())
                }
            }
            Err(err @ ClientError::Api { .. }) => {
                if self.install(Some(generation), None, SessionEvent::Expired) {
                    info!(error = %err, "refresh rejected, session expired");
                } else {
                    debug!(error = %err, "refresh rejected for a sign-in that was already replaced");
                }
                Ok(self.current_session())
            }
            Err(err) => Err(err),
        }
    }

    /// Finish a magic-link sign-in from the redirect's URL fragment.
    ///
    /// Returns `None` when the fragment carries no tokens.
    pub async fn complete_magic_link(&self, fragment: &str) -> ClientResult<Option<Session>> {
        let Some(parsed) = parse_fragment(fragment, Utc::now())? else {
            return Ok(None);
        };
        let request = self
            .http
            .get(self.endpoints.auth("user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(parsed.tokens.access_token.expose_secret());
        let user: UserResponse = self.send_json(request).await?;
        let state = AuthState::new(parsed.tokens, Identity::from(user));
        let session = state.session.clone();
        info!(user = %session.identity.id, kind = parsed.kind.as_deref().unwrap_or("unknown"), "magic link completed");
        self.replace_state(Some(state), SessionEvent::SignedIn(session.clone()));
        Ok(Some(session))
    }

    /// Ask the auth service who the current token belongs to.
    pub async fn fetch_user(&self) -> ClientResult<Identity> {
        if self.state().is_none() {
            return Err(ClientError::NotSignedIn);
        }
        let user: UserResponse = self.send_json(self.request(Method::GET, self.endpoints.auth("user"))).await?;
        Ok(user.into())
    }

    fn rest(&self, method: Method, query: &Query) -> RequestBuilder {
        self.request(method, self.endpoints.rest(query))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SessionSource for BackendClient {
    async fn current(&self) -> SessionResult<Option<Session>> {
        let snapshot = self
            .state()
            .as_ref()
            .map(|s| (s.session.clone(), s.tokens.needs_refresh_at(Utc::now())));
        match snapshot {
            None => Ok(None),
            Some((session, false)) => Ok(Some(session)),
            Some((_, true)) => Ok(self.refresh().await?),
        }
    }

    fn subscribe(&self) -> SessionSubscription {
        self.notifier.subscribe()
    }
}

enum RefreshStep {
    Done(Option<Session>),
    Due { generation: u64, refresh_token: SecretString },
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Authenticator for BackendClient {
    async fn sign_in_with_password(&self, email: &str, password: &SecretString) -> SessionResult<Option<Session>> {
        let request = self
            .request(Method::POST, self.endpoints.token("password"))
            .json(&Credentials {
                email,
                password: password.expose_secret(),
            });
        let response: TokenResponse = self.send_json(request).await?;
        let state = AuthState::from_token_response(response, Utc::now());
        let session = state.session.clone();
        info!(user = %session.identity.id, "signed in");
        self.replace_state(Some(state), SessionEvent::SignedIn(session.clone()));
        Ok(Some(session))
    }

    async fn sign_up(&self, email: &str, password: &SecretString) -> SessionResult<SignUpOutcome> {
        let request = self
            .request(Method::POST, self.endpoints.auth("signup"))
            .json(&Credentials {
                email,
                password: password.expose_secret(),
            });
        let response: SignUpResponse = self.send_json(request).await?;
        Ok(match response {
            SignUpResponse::Session(tokens) => {
                let state = AuthState::from_token_response(tokens, Utc::now());
                let session = state.session.clone();
                self.replace_state(Some(state), SessionEvent::SignedIn(session.clone()));
                SignUpOutcome {
                    identity: Some(session.identity.clone()),
                    session: Some(session),
                }
            }
            SignUpResponse::User(user) => SignUpOutcome {
                identity: Some(user.into()),
                session: None,
            },
        })
    }

    async fn send_magic_link(&self, email: &str) -> SessionResult<()> {
        let request = self
            .request(Method::POST, self.endpoints.otp(self.magic_link_redirect.as_deref()))
            .json(&json!({ "email": email, "create_user": true }));
        self.send(request).await?;
        Ok(())
    }

    async fn sign_out(&self) -> SessionResult<()> {
        if self.state().is_some() {
            let request = self.request(Method::POST, self.endpoints.auth("logout"));
            // the local sign-in is dropped even when the server call fails
            if let Err(err) = self.send(request).await {
                warn!(error = %err, "server-side sign-out failed");
            }
        }
        self.replace_state(None, SessionEvent::SignedOut);
        info!("signed out");
        Ok(())
    }

    async fn set_password(&self, new_password: &SecretString) -> SessionResult<()> {
        if self.state().is_none() {
            return Err(ClientError::NotSignedIn.into());
        }
        let request = self
            .request(Method::PUT, self.endpoints.auth("user"))
            .json(&json!({ "password": new_password.expose_secret() }));
        let user: UserResponse = self.send_json(request).await?;

        let updated = {
            let mut state = self.state();
            state.as_mut().map(|s| {
                s.session.identity = user.into();
                s.clone()
            })
        };
        if let Some(state) = updated {
            let session = state.session.clone();
            self.replace_state(Some(state), SessionEvent::UserUpdated(session));
        }
        Ok(())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ProjectStore for BackendClient {
    async fn list_projects(&self, owner: &UserId) -> StoreResult<Vec<Project>> {
        let query = Query::table(PROJECTS)
            .select("*")
            .eq("user_id", owner.as_str())
            .order("created_at", Order::Desc);
        Ok(self.send_json(self.rest(Method::GET, &query)).await?)
    }

    async fn get_project(&self, owner: &UserId, id: &ProjectId) -> StoreResult<Option<Project>> {
        let query = Query::table(PROJECTS)
            .select("*")
            .eq("id", id.as_str())
            .eq("user_id", owner.as_str());
        let rows: Vec<Project> = self.send_json(self.rest(Method::GET, &query)).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_project(&self, project: &NewProject) -> StoreResult<Project> {
        let request = self
            .rest(Method::POST, &Query::table(PROJECTS).select("*"))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[project]);
        let rows: Vec<Project> = self.send_json(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ClientError::Decode("insert returned no project".to_string()).into())
    }

    async fn update_project(&self, owner: &UserId, id: &ProjectId, patch: &ProjectPatch) -> StoreResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let query = Query::table(PROJECTS).eq("id", id.as_str()).eq("user_id", owner.as_str());
        let request = self.rest(Method::PATCH, &query).header("Prefer", RETURN_MINIMAL).json(patch);
        Ok(self.send(request).await?)
    }

    async fn delete_project(&self, owner: &UserId, id: &ProjectId) -> StoreResult<()> {
        let steps = Query::table(STEPS).eq("project_id", id.as_str());
        self.send(self.rest(Method::DELETE, &steps)).await?;
        let query = Query::table(PROJECTS).eq("id", id.as_str()).eq("user_id", owner.as_str());
        Ok(self.send(self.rest(Method::DELETE, &query)).await?)
    }

    async fn list_steps(&self, project: &ProjectId) -> StoreResult<Vec<Step>> {
        let query = Query::table(STEPS)
            .select(STEP_COLUMNS)
            .eq("project_id", project.as_str())
            .order("position", Order::Asc);
        Ok(self.send_json(self.rest(Method::GET, &query)).await?)
    }

    async fn insert_steps(&self, steps: &[StepRow]) -> StoreResult<()> {
        if steps.is_empty() {
            return Ok(());
        }
        let request = self
            .rest(Method::POST, &Query::table(STEPS))
            .header("Prefer", RETURN_MINIMAL)
            .json(steps);
        Ok(self.send(request).await?)
    }

    async fn upsert_steps(&self, steps: &[StepRow]) -> StoreResult<()> {
        if steps.is_empty() {
            return Ok(());
        }
        let request = self
            .rest(Method::POST, &Query::table(STEPS).on_conflict("id"))
            .header("Prefer", MERGE_DUPLICATES)
            .json(steps);
        Ok(self.send(request).await?)
    }

    async fn delete_steps(&self, ids: &[StepId]) -> StoreResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let query = Query::table(STEPS).in_list("id", ids.iter().map(StepId::as_str));
        Ok(self.send(self.rest(Method::DELETE, &query)).await?)
    }

    async fn set_step_done(&self, id: &StepId, is_done: bool) -> StoreResult<()> {
        let query = Query::table(STEPS).eq("id", id.as_str());
        let request = self
            .rest(Method::PATCH, &query)
            .header("Prefer", RETURN_MINIMAL)
            .json(&json!({ "is_done": is_done }));
        Ok(self.send(request).await?)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ProfileStore for BackendClient {
    async fn fetch_profile(&self, user: &UserId) -> StoreResult<Option<UserProfile>> {
        let query = Query::table(PROFILES)
            .select("user_id,name,avatar_url")
            .eq("user_id", user.as_str());
        let rows: Vec<UserProfile> = self.send_json(self.rest(Method::GET, &query)).await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        let request = self
            .rest(Method::POST, &Query::table(PROFILES).on_conflict("user_id"))
            .header("Prefer", MERGE_DUPLICATES)
            .json(&[profile]);
        Ok(self.send(request).await?)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ObjectStore for BackendClient {
    async fn upload(&self, object: ObjectUpload) -> StoreResult<String> {
        let bucket = &self.config.storage_bucket;
        let mut request = self
            .request(Method::POST, self.endpoints.object(bucket, &object.path))
            .header("cache-control", format!("max-age={}", object.cache_control))
            .header("x-upsert", if object.upsert { "true" } else { "false" });
        if let Some(content_type) = &object.content_type {
            request = request.header("content-type", content_type);
        }
        self.send(request.body(object.bytes)).await?;
        debug!(bucket = %bucket, path = %object.path, "object uploaded");
        Ok(object.path)
    }

    fn public_url(&self, path: &str) -> String {
        self.endpoints.public_object(&self.config.storage_bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn config() -> BackendConfig {
        BackendConfig::new("https://demo.supabase.co", "anon-key").unwrap()
    }

    // nothing listens here, so server calls fail fast
    fn unreachable() -> BackendConfig {
        BackendConfig::new("http://127.0.0.1:9", "anon-key").unwrap()
    }

    fn token_response(access_token: &str, user: &str) -> TokenResponse {
        serde_json::from_value(json!({
            "access_token": access_token,
            "refresh_token": "rt-2",
            "expires_in": 3600,
            "user": { "id": user }
        }))
        .unwrap()
    }

    fn rejected() -> ClientError {
        ClientError::Api {
            status: 400,
            message: "Invalid Refresh Token".into(),
        }
    }

    fn saved(expires_in: Duration) -> String {
        serde_json::to_string(&PersistedAuth {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expires_at: Some(Utc::now() + expires_in),
            identity: Identity::new("u-1").with_email("ada@example.com"),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_restored_sign_in_is_current_without_network() {
        let tokens = Arc::new(MemoryTokenStore::new());
        tokens.save(&saved(Duration::hours(1)));
        let client = BackendClient::new(config()).unwrap().with_token_store(tokens);

        let session = client.current().await.unwrap().unwrap();
        assert_eq!(session.identity.email.as_deref(), Some("ada@example.com"));
        assert_eq!(client.bearer(), "at");
    }

    #[tokio::test]
    async fn test_sign_out_during_refresh_is_not_undone() {
        let tokens = Arc::new(MemoryTokenStore::new());
        tokens.save(&saved(Duration::minutes(-5)));
        let client = BackendClient::new(unreachable()).unwrap().with_token_store(tokens.clone());
        let mut events = client.subscribe();

        let RefreshStep::Due { generation, .. } = client.refresh_step(Utc::now()) else {
            panic!("expired sign-in should need a refresh");
        };
        client.sign_out().await.unwrap();
        let outcome = client.finish_refresh(generation, Ok(token_response("at-2", "u-1"))).unwrap();

        assert_eq!(outcome, None);
        assert_eq!(tokens.load(), None);
        assert_eq!(client.bearer(), "anon-key");
        assert_eq!(client.current().await.unwrap(), None);
        assert!(matches!(events.next().await, Some(SessionEvent::SignedOut)));
        assert!(
            tokio::time::timeout(std::time::Duration::from_millis(50), events.next()).await.is_err(),
            "no refresh event after sign-out"
        );
    }

    #[tokio::test]
    async fn test_rejected_refresh_keeps_newer_sign_in() {
        let tokens = Arc::new(MemoryTokenStore::new());
        tokens.save(&saved(Duration::minutes(-5)));
        let client = BackendClient::new(unreachable()).unwrap().with_token_store(tokens.clone());

        let RefreshStep::Due { generation, .. } = client.refresh_step(Utc::now()) else {
            panic!("expired sign-in should need a refresh");
        };
        let newer = AuthState::from_token_response(token_response("at-2", "u-2"), Utc::now());
        let session = newer.session.clone();
        client.replace_state(Some(newer), SessionEvent::SignedIn(session));

        let outcome = client.finish_refresh(generation, Err(rejected())).unwrap();
        assert_eq!(outcome.map(|s| s.identity.id), Some(UserId::from("u-2")));
        assert!(tokens.load().is_some());
        assert_eq!(client.bearer(), "at-2");
    }

    #[tokio::test]
    async fn test_rejected_refresh_expires_unchanged_sign_in() {
        let tokens = Arc::new(MemoryTokenStore::new());
        tokens.save(&saved(Duration::minutes(-5)));
        let client = BackendClient::new(unreachable()).unwrap().with_token_store(tokens.clone());
        let mut events = client.subscribe();

        let RefreshStep::Due { generation, .. } = client.refresh_step(Utc::now()) else {
            panic!("expired sign-in should need a refresh");
        };
        assert_eq!(client.finish_refresh(generation, Err(rejected())).unwrap(), None);
        assert_eq!(tokens.load(), None);
        assert!(matches!(events.next().await, Some(SessionEvent::Expired)));
    }

    #[tokio::test]
    async fn test_queued_refresh_reuses_finished_one() {
        let tokens = Arc::new(MemoryTokenStore::new());
        tokens.save(&saved(Duration::minutes(-5)));
        let client = Arc::new(BackendClient::new(unreachable()).unwrap().with_token_store(tokens));

        let turn = client.refresh_lock.lock().await;
        let waiter = {
            let client = client.clone();
            tokio::spawn(async move { client.current().await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!waiter.is_finished(), "second refresh should wait for the first");

        let fresh = AuthState::from_token_response(token_response("at-2", "u-1"), Utc::now());
        let session = fresh.session.clone();
        let generation = client.generation.load(Ordering::SeqCst);
        assert!(client.install(Some(generation), Some(fresh), SessionEvent::TokenRefreshed(session)));
        drop(turn);

        let session = tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .expect("queued refresh did not finish")
            .unwrap()
            .unwrap()
            .expect("refreshed session");
        assert_eq!(session.identity.id.as_str(), "u-1");
        assert_eq!(client.bearer(), "at-2");
    }

    #[tokio::test]
    async fn test_unreadable_saved_sign_in_is_dropped() {
        let tokens = Arc::new(MemoryTokenStore::new());
        tokens.save("{not json");
        let client = BackendClient::new(config()).unwrap().with_token_store(tokens.clone());

        assert_eq!(client.current().await.unwrap(), None);
        assert_eq!(tokens.load(), None);
        assert_eq!(client.bearer(), "anon-key");
    }

    #[tokio::test]
    async fn test_magic_link_fragment_without_tokens_is_ignored() {
        let client = BackendClient::new(config()).unwrap();
        assert_eq!(client.complete_magic_link("#/projects").await.unwrap(), None);
        let err = client
            .complete_magic_link("#error_description=Email+link+is+invalid+or+has+expired")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Email link is invalid or has expired");
    }

    #[test]
    fn test_public_url_uses_configured_bucket() {
        let client = BackendClient::new(config().with_storage_bucket("avatars")).unwrap();
        assert_eq!(
            client.public_url("u-1/a.png"),
            "https://demo.supabase.co/storage/v1/object/public/avatars/u-1/a.png"
        );
    }

    #[test]
    fn test_error_mapping() {
        let rejected = ClientError::Api {
            status: 400,
            message: "Invalid login credentials".into(),
        };
        assert_eq!(
            session_core::SessionError::from(rejected),
            session_core::SessionError::rejected("Invalid login credentials")
        );
        let outage = ClientError::Api {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(matches!(
            session_core::SessionError::from(outage),
            session_core::SessionError::Transport(_)
        ));
    }
}

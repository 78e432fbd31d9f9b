//! Sign-in and sign-up flows.
//!
//! The gate that denied a visitor passes the location they asked for along as
//! an explicit [`ReturnTo`]. [`SignInFlow`] owns it and hands it out exactly
//! once, on the first successful sign-in.

use pp_types::{DEFAULT_LANDING_PATH, Identity, ReturnTo, Session};
use secrecy::SecretString;
use tracing::{debug, info};

use crate::{
    error::SessionResult, gate::RedirectRequest, store::Authenticator
};

/// Confirmation shown after a magic link was requested.
pub const MAGIC_LINK_SENT: &str = "Magic link sent. Check your email.";

/// Result of a password sign-in attempt that the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// A session was opened; navigate here.
    Navigate(String),
    /// Accepted but no session yet (e.g. email not confirmed); stay on the page.
    Stay,
}

/// What the backend returned for a sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub identity: Option<Identity>,
    /// Absent while the email still needs confirming.
    pub session: Option<Session>,
}

impl SignUpOutcome {
    /// Where to go once the sign-up returned a user.
    pub fn destination(&self) -> Option<&'static str> {
        self.identity.as_ref().map(|_| DEFAULT_LANDING_PATH)
    }
}

/// State of one visit to the sign-in page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInFlow {
    return_to: Option<ReturnTo>,
}

impl SignInFlow {
    pub fn new(return_to: Option<ReturnTo>) -> Self {
        Self { return_to }
    }

    /// Build from the raw `from` query value. Anything that is not a local
    /// path is ignored.
    pub fn from_query(from: Option<&str>) -> Self {
        Self::new(from.and_then(ReturnTo::parse))
    }

    pub fn from_redirect(redirect: &RedirectRequest) -> Self {
        Self::new(redirect.return_to.clone())
    }

    pub fn return_to(&self) -> Option<&ReturnTo> {
        self.return_to.as_ref()
    }

    /// Consume the return location. Later calls yield the landing path.
    pub fn take_destination(&mut self) -> String {
        ReturnTo::destination(self.return_to.take().as_ref()).to_string()
    }

    /// The visitor is already signed in: skip the form, drop the return
    /// location and go to the landing page.
    pub fn already_signed_in(&mut self) -> String {
        self.return_to = None;
        DEFAULT_LANDING_PATH.to_string()
    }

    pub async fn sign_in<A>(&mut self, auth: &A, email: &str, password: &SecretString) -> SessionResult<SignInOutcome>
    where
        A: Authenticator + ?Sized,
    {
        match auth.sign_in_with_password(email.trim(), password).await? {
            Some(session) => {
                let destination = self.take_destination();
                info!(user = %session.identity.id, %destination, "sign-in succeeded");
                Ok(SignInOutcome::Navigate(destination))
            }
            None => {
                debug!("sign-in accepted without a session");
                Ok(SignInOutcome::Stay)
            }
        }
    }

    /// Request a magic link. Returns the confirmation message to show.
    pub async fn send_magic_link<A>(&self, auth: &A, email: &str) -> SessionResult<&'static str>
    where
        A: Authenticator + ?Sized,
    {
        auth.send_magic_link(email.trim()).await?;
        info!("magic link requested");
        Ok(MAGIC_LINK_SENT)
    }
}

/// Register a new account. Returns the outcome plus where to navigate, if anywhere.
pub async fn sign_up<A>(auth: &A, email: &str, password: &SecretString) -> SessionResult<(SignUpOutcome, Option<&'static str>)>
where
    A: Authenticator + ?Sized,
{
    let outcome = auth.sign_up(email.trim(), password).await?;
    let destination = outcome.destination();
    info!(created = outcome.identity.is_some(), confirmed = outcome.session.is_some(), "sign-up finished");
    Ok((outcome, destination))
}

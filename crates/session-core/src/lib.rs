//! Session handling for Project Portfolio.
//!
//! The session store (owned by the hosted backend) is the single source of
//! truth for "is somebody signed in". This crate defines the seams the UI uses
//! to observe it ([`SessionSource`]) and to change it ([`Authenticator`]), the
//! per-view [`AuthGate`] that decides between loading, redirect and content,
//! the navigation shell's [`SessionMirror`], and the sign-in flow that consumes
//! the remembered return location.

pub mod context;
pub mod error;
pub mod gate;
pub mod memory;
pub mod mirror;
pub mod profile;
pub mod signin;
pub mod store;
pub mod ticket;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use context::SessionContext;
pub use error::{GateError, SessionError, SessionResult};
pub use gate::{
    AuthGate, Authorized, FetchFailurePolicy, GateConfig, GateDecision, Observation, RedirectRequest, Resolution, decide, drive_gate
};
pub use memory::MemorySessionStore;
pub use mirror::{SessionMirror, ShellState};
pub use profile::{MetadataProfileResolver, ProfileResolver, ProfileSource, StoreProfileResolver};
pub use signin::{MAGIC_LINK_SENT, SignInFlow, SignInOutcome, SignUpOutcome, sign_up};
pub use store::{
    Authenticator, MaybeSendSync, SessionEvent, SessionNotifier, SessionSource, SessionSubscription, SubscriptionHandle, change_password
};
pub use ticket::{Sequencer, Ticket};

//! Client for the hosted backend: auth, the `projects`/`project_steps`/`profiles`
//! tables, and object storage.
//!
//! [`BackendClient`] implements the session seams of `session-core` and the
//! store seams of `portfolio-store`, so the rest of the app never talks HTTP.

mod client;
mod endpoints;
mod error;
mod fragment;
mod tokens;
mod wire;

pub use client::BackendClient;
pub use endpoints::{Endpoints, Order, Query};
pub use error::{ClientError, ClientResult};
pub use fragment::{FragmentTokens, parse_fragment};
pub use tokens::{MemoryTokenStore, TokenStore};
pub use wire::{PersistedAuth, TokenSet};

//! Helpers for tests in crates that take an [`Authorized`] proof.

use pp_types::Identity;

use crate::gate::Authorized;

/// Mint a write proof for `identity` without mounting a gate.
pub fn authorized(identity: Identity) -> Authorized {
    Authorized::new(identity)
}

//! AWS-oriented adapters and handlers for the ephemeral environment Lambdas.
//!
//! This crate owns runtime integration details (Lambda handlers, adapter
//! seams over the provider's control plane, and logging setup). Report and
//! record contracts live in `ephemeral_env_core`.

pub mod adapters;
pub mod handlers;
pub mod logging;

#[cfg(test)]
pub(crate) mod test_helpers;

//! Thin Google API shims. Each submodule implements one of the core
//! contracts; none of them carries scheduling logic.

pub mod auth;
pub mod calendar;
pub mod docs;
pub mod drive;
pub mod sheets;

use runcal_core::RuncalError;

/// Collapse any provider-side error into the core's provider variant.
pub(crate) fn provider_err(err: impl std::fmt::Display) -> RuncalError {
    RuncalError::Provider(err.to_string())
}

//! Outbound target screening.
//!
//! Analysis targets come from API callers, so the page probe must not be
//! usable to reach loopback, private or link-local services. Screening runs
//! before the probe and again on every redirect hop.

mod target;

pub use target::{redirect_policy, validate_target, UnsafeTarget};

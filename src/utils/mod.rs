//! Shared helpers for outbound calls.

mod retry;

pub(crate) use retry::with_retry;

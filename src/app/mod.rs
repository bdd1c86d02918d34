//! Input handling shared by the library entry points.

pub mod url;

// Re-export public API
pub use url::{host_of, normalize_url};

//! HTTP handlers.

mod analyze;
mod ask;
mod estimate;
mod history;
mod metrics;
mod status;

pub use analyze::{analyze_get_handler, analyze_post_handler};
pub use ask::ask_handler;
pub use estimate::estimate_handler;
pub use history::{mine_handler, recent_handler};
pub use metrics::metrics_handler;
pub use status::status_handler;

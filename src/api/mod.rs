//! API layer - HTTP endpoint handlers organized by domain.

mod cache;
mod health;
mod metrics;
mod routes;
mod template;

pub use cache::{clear_all_templates, clear_template};
pub use health::health;
pub use metrics::prometheus_metrics;
pub use routes::{api_routes, public_routes};
pub use template::{get_template, render_template, send_template, RenderRequest, SendRequest};

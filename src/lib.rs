// Infrastructure layer (shared components)
pub mod infrastructure;

pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::metrics;
pub use infrastructure::redis;

// Domain layer (business logic)
pub mod domain;

pub use domain::cache;
pub use domain::mail;
pub use domain::template;

// Application layer
pub mod api;
pub mod server;

// Supporting modules
pub mod tasks;

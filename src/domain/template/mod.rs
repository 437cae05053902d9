//! Remote email template pipeline.
//!
//! This module provides:
//! - `TemplateFetcher`: template API client with a read-through cache
//! - `render` / `build_message`: placeholder substitution ({{variable}} and {variable})
//! - Template, context and message types
//!
//! # Example
//!
//! ```ignore
//! let fetcher = TemplateFetcher::new(&settings.api, &settings.cache, cache)?;
//!
//! let template = fetcher.fetch_template(&TemplateId::from(42)).await?;
//!
//! let data = RenderContext::new()
//!     .with("name", "John")
//!     .with("order_id", "ORD-123");
//!
//! let message = build_message(&template, &data);
//! ```

mod fetcher;
mod renderer;
mod types;

pub use fetcher::TemplateFetcher;
pub use renderer::{build_message, render};
pub use types::{
    Address, MessageSpec, RenderContext, ScalarValue, Template, TemplateError, TemplateId,
    TemplateResult,
};

//! Domain layer
//!
//! - `template`: remote template fetching and placeholder rendering
//! - `cache`: template cache backends (memory, Redis)
//! - `mail`: message composition and hand-off to a mail sender

pub mod cache;
pub mod mail;
pub mod template;

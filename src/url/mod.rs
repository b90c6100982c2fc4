//! URL handling module for Sitecrawl
//!
//! This module resolves discovered links into absolute frontier keys and classifies
//! them by origin relative to the crawl seed.

mod normalize;
mod origin;

// Re-export main functions
pub use normalize::{is_fetchable, normalize_url, resolve};
pub use origin::Origin;

//! URL handling module for Reach
//!
//! This module provides URL normalization and the origin/scheme checks the
//! crawler applies to discovered links.

mod normalize;
mod origin;

pub use normalize::{normalize_parsed, normalize_url};
pub use origin::{is_http_scheme, same_origin};

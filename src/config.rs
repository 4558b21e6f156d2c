//! # Configuration Module
//!
//! Sitemap behaviour that is chosen by the deployment rather than by the
//! endpoints themselves.
//!
//! ## Sources
//!
//! 1. Defaults ([`SitemapConfig::default`])
//! 2. The optional `config:` section of a sitemap manifest
//! 3. Environment variables, applied last with [`SitemapConfig::apply_env`]
//!
//! ## Environment Variables
//!
//! ### `SITEMAP_STATIC_CASE`
//!
//! Comparison strategy for static path segments: `sensitive` or
//! `insensitive`. Default: `insensitive`, so `/Shop/Items` and `/shop/items`
//! reach the same endpoint.
//!
//! ```bash
//! export SITEMAP_STATIC_CASE=sensitive
//! ```

use crate::uri::CaseSensitivity;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable overriding [`SitemapConfig::static_case`].
pub const STATIC_CASE_ENV: &str = "SITEMAP_STATIC_CASE";

/// Configuration of a [`SitemapManager`](crate::sitemap::SitemapManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// How static segments are compared when matching and merging
    pub static_case: CaseSensitivity,
}

impl SitemapConfig {
    /// Defaults overridden by the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Apply environment overrides on top of `self`.
    #[must_use]
    pub fn apply_env(mut self) -> Self {
        if let Ok(val) = env::var(STATIC_CASE_ENV) {
            self.static_case = CaseSensitivity::parse(&val);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_case_insensitive() {
        assert_eq!(
            SitemapConfig::default().static_case,
            CaseSensitivity::Insensitive
        );
    }

    #[test]
    fn test_deserialize_partial_section() {
        let cfg: SitemapConfig = serde_yaml::from_str("static_case: sensitive").unwrap();
        assert_eq!(cfg.static_case, CaseSensitivity::Sensitive);
        let cfg: SitemapConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, SitemapConfig::default());
    }
}

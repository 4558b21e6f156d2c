//! # CLI Module
//!
//! Command-line inspection of a sitemap manifest.
//!
//! ## Commands
//!
//! ### `dump`
//!
//! Print the merged tree:
//!
//! ```bash
//! sitemap-cli dump --manifest sitemap.yaml
//! ```
//!
//! ### `search`
//!
//! Route a request path and print the outcome, endpoint and parameters:
//!
//! ```bash
//! sitemap-cli search --manifest sitemap.yaml /shop/catalog/items/42
//! ```
//!
//! ### `uri`
//!
//! Reverse-resolve an endpoint:
//!
//! ```bash
//! sitemap-cli uri --manifest sitemap.yaml --endpoint item \
//!     --application shop --module catalog --param id=42
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use sitemap_router::cli::{run, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run(&cli, &mut std::io::stdout())?;
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run, run_cli, Cli, Commands};

//! # Sitemap Module
//!
//! The sitemap is a tree of path segments. Each node may carry an
//! [`EndpointBinding`](crate::endpoint::EndpointBinding); the root never does.
//! It answers two questions:
//!
//! - **Forward** ([`SitemapTree::search`]): which endpoint serves this path,
//!   and with which variable values?
//! - **Reverse** ([`SitemapTree::get_uri`]): what URI reaches this endpoint,
//!   given values for its variables?
//!
//! ## Construction
//!
//! Every [`EndpointDescriptor`](crate::endpoint::EndpointDescriptor) becomes a
//! single-chain tree, and the chains are merged into one tree in ascending
//! order of segment count ([`SitemapBuilder`]). Merging reuses structurally
//! equal children, grafts everything else and never replaces an existing
//! binding: the first registration of a path is the one served.
//!
//! ## Matching order
//!
//! Children are tried in registration order, and the first child whose
//! matcher accepts the request segment is taken without backtracking. A
//! `{name:string}` variable registered before a sibling literal therefore
//! shadows that literal.
//!
//! ## Publishing
//!
//! A built tree is immutable. [`SitemapManager`] holds the current tree behind
//! an atomic pointer swap, so searches always see one complete tree.

mod builder;
mod manager;
mod node;
mod reverse;
mod search;


pub use builder::{build_sitemap, merge, SitemapBuilder};
pub use manager::SitemapManager;
pub use node::{NodeId, PreOrder, SitemapNode, SitemapTree};
pub use search::{MatchOutcome, ParamVec, SearchContext, SearchResult, MAX_INLINE_PARAMS};

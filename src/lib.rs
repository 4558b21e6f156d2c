//! # sitemap-router
//!
//! **sitemap-router** merges the paths of independently registered endpoints
//! (pages, REST resources, status pages) into one typed routing tree, matches
//! request paths against it and resolves endpoints back into URIs.
//!
//! ## Overview
//!
//! Endpoints belong to an application and optionally to a module of that
//! application. Applications and modules come and go at runtime; every
//! change rebuilds the whole tree off to the side and swaps it in atomically,
//! so routing never sees a half-built tree and never takes a lock.
//!
//! ## Architecture
//!
//! - **[`uri`]** - path segments with typed variable matchers, URI values and query multimaps
//! - **[`endpoint`]** - endpoint bindings, owners, conditions and descriptors
//! - **[`sitemap`]** - the tree, merging, search, reverse resolution and the swapping manager
//! - **[`registry`]** - explicit application/module/endpoint registration with change listeners
//! - **[`manifest`]** - YAML/JSON manifests feeding a registry
//! - **[`hot_reload`]** - manifest file watching
//! - **[`config`]** - deployment-level settings (static segment case policy)
//! - **[`logging`]** - `tracing` subscriber setup for binaries
//! - **[`cli`]** - the `sitemap-cli` commands
//!
//! ### Refresh Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant App as Application
//!     participant Reg as EndpointRegistry
//!     participant Mgr as SitemapManager
//!     participant Req as Request thread
//!
//!     App->>Reg: add_module("shop", "catalog", "/catalog")
//!     Reg->>Mgr: registry_changed()
//!     Mgr->>Reg: descriptors()
//!     Mgr->>Mgr: build mini-trees, sort by depth, merge
//!     Mgr->>Mgr: ArcSwap::store(new tree)
//!     Req->>Mgr: search("/shop/catalog/items/42")
//!     Mgr-->>Req: SearchResult { item, id=42 }
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use sitemap_router::endpoint::{EndpointBinding, OwnerContext};
//! use sitemap_router::ids::EndpointId;
//! use sitemap_router::registry::EndpointRegistry;
//! use sitemap_router::sitemap::{MatchOutcome, SearchContext, SitemapManager};
//! use std::sync::Arc;
//!
//! let registry = EndpointRegistry::new();
//! let manager = Arc::new(SitemapManager::default());
//! registry.subscribe(manager.clone());
//!
//! registry.add_application("shop", "/shop").unwrap();
//! registry.add_module("shop", "catalog", "/catalog").unwrap();
//! registry
//!     .add_endpoint(
//!         EndpointBinding::new("item", OwnerContext::module("shop", "catalog")),
//!         "/items/{id:uint}",
//!     )
//!     .unwrap();
//!
//! let result = manager.search("/shop/catalog/items/42", SearchContext::default());
//! assert_eq!(result.outcome, MatchOutcome::Exact);
//! assert_eq!(result.get_param("id"), Some("42"));
//!
//! let uri = manager.get_uri(&EndpointId::new("item"), &[("id", "7")]).unwrap();
//! assert_eq!(uri.to_string(), "/shop/catalog/items/7");
//! ```
//!
//! ## Path Templates
//!
//! | Template | Matches |
//! |----------|---------|
//! | `items` | the literal text (case policy from [`config::SitemapConfig`]) |
//! | `{name}` / `{name:string}` | any non-empty segment |
//! | `{id:uint}` | ASCII digits |
//! | `{price:double}` | decimal number, `.` or `,` separator, optional exponent |
//! | `{id:guid}` | hyphenated or 32-digit hex GUID |
//!
//! A third part names a display format: `{date:string:yyyy-MM-dd}`.

pub mod cli;
pub mod config;
pub mod endpoint;
pub mod hot_reload;
pub mod ids;
pub mod logging;
pub mod manifest;
pub mod registry;
pub mod sitemap;
pub mod uri;

pub use config::SitemapConfig;
pub use endpoint::{EndpointBinding, EndpointDescriptor, EndpointKind, EndpointSource, OwnerContext};
pub use ids::{ApplicationId, EndpointId, ModuleId};
pub use manifest::{load_manifest, load_registry, Manifest};
pub use registry::{EndpointRegistry, RegistryError, RegistryListener};
pub use sitemap::{MatchOutcome, SearchContext, SearchResult, SitemapManager, SitemapTree};
pub use uri::{CaseSensitivity, PathSegment, UriResource};

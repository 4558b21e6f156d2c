//! # Hot Reload Module
//!
//! Live reloading of a sitemap manifest without restarting the process.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sitemap_router::hot_reload::watch_manifest;
//! use sitemap_router::registry::EndpointRegistry;
//! use sitemap_router::sitemap::SitemapManager;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(EndpointRegistry::new());
//! let manager = Arc::new(SitemapManager::default());
//! registry.subscribe(manager.clone());
//!
//! // Keep the watcher alive for as long as reloads are wanted
//! let _watcher = watch_manifest("sitemap.yaml", registry.clone())?;
//! ```
//!
//! ## Reload Process
//!
//! 1. **Detection** - the filesystem watcher reports a modify or create event
//! 2. **Parse** - the manifest is loaded into a fresh registry
//! 3. **Replace** - the watched registry takes over the new content, which
//!    notifies its listeners (a subscribed manager rebuilds and swaps its tree)
//!
//! ## Error Handling
//!
//! If the new manifest fails to parse or register, the error is logged and
//! the previous registrations stay active.
//!
//! The `config` section of a reloaded manifest is ignored: the case policy
//! of a running manager is fixed at construction.

use crate::manifest;
use crate::registry::EndpointRegistry;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Watch a manifest file and replace the contents of `registry` when it
/// changes.
pub fn watch_manifest<P>(
    manifest_path: P,
    registry: Arc<EndpointRegistry>,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
{
    let path: PathBuf = manifest_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    reload(&watch_path, &registry);
                }
            }
            Err(e) => error!(error = %e, "Manifest watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

/// Load `path` and replace the registry contents; keeps the old content on error.
pub fn reload(path: &Path, registry: &EndpointRegistry) -> bool {
    match manifest::load_registry(path) {
        Ok((_, fresh)) => {
            info!(
                manifest = %path.display(),
                endpoints = fresh.endpoints().len(),
                "hot-reload: applying manifest"
            );
            registry.replace_all(&fresh);
            true
        }
        Err(e) => {
            error!(
                manifest = %path.display(),
                error = %format!("{e:#}"),
                "hot-reload: manifest rejected, keeping previous routes"
            );
            false
        }
    }
}

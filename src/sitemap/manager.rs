use super::builder::SitemapBuilder;
use super::node::SitemapTree;
use super::search::{SearchContext, SearchResult};
use crate::config::SitemapConfig;
use crate::endpoint::{EndpointSource, OwnerContext};
use crate::ids::EndpointId;
use crate::registry::{EndpointRegistry, RegistryListener};
use crate::uri::UriResource;
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Owner of the current sitemap.
///
/// [`refresh`](Self::refresh) builds a complete new tree off to the side and
/// publishes it with one atomic swap. [`search`](Self::search) and
/// [`get_uri`](Self::get_uri) load the snapshot current on entry and never
/// take a lock, so they can run concurrently with each other and with a
/// refresh. When refreshes race, each publishes a complete tree and the last
/// swap wins.
pub struct SitemapManager {
    current: ArcSwap<SitemapTree>,
    config: SitemapConfig,
    generation: AtomicU64,
}

impl SitemapManager {
    /// A manager holding an empty tree.
    #[must_use]
    pub fn new(config: SitemapConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(SitemapTree::new(config.static_case)),
            config,
            generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn config(&self) -> SitemapConfig {
        self.config
    }

    /// The current tree. The snapshot stays valid after later refreshes.
    #[must_use]
    pub fn snapshot(&self) -> Arc<SitemapTree> {
        self.current.load_full()
    }

    /// Number of completed refreshes.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Rebuild the tree from `source` and swap it in.
    pub fn refresh<S: EndpointSource + ?Sized>(&self, source: &S) -> Arc<SitemapTree> {
        let build_start = Instant::now();
        let descriptors = source.descriptors();
        let descriptor_count = descriptors.len();

        let mut builder = SitemapBuilder::new(self.config.static_case);
        builder.extend(descriptors);
        let mut tree = builder.build();

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tree.set_generation(generation);
        let tree = Arc::new(tree);
        self.current.store(Arc::clone(&tree));

        let build_duration = build_start.elapsed();
        if build_duration > Duration::from_millis(50) {
            warn!(
                generation,
                descriptors = descriptor_count,
                nodes = tree.len(),
                endpoints = tree.endpoint_count(),
                duration_us = build_duration.as_micros(),
                "Slow sitemap refresh detected"
            );
        } else {
            info!(
                generation,
                descriptors = descriptor_count,
                nodes = tree.len(),
                endpoints = tree.endpoint_count(),
                duration_us = build_duration.as_micros(),
                "Sitemap refreshed"
            );
        }
        tree
    }

    /// Route a request path against the current snapshot.
    #[must_use]
    pub fn search(&self, path: &str, context: SearchContext) -> SearchResult {
        self.current.load().search(path, context)
    }

    /// Route an already parsed request URI against the current snapshot.
    #[must_use]
    pub fn search_uri(&self, uri: &UriResource, context: SearchContext) -> SearchResult {
        self.current.load().search_uri(uri, context)
    }

    /// See [`SitemapTree::get_uri`].
    #[must_use]
    pub fn get_uri(&self, endpoint_id: &EndpointId, params: &[(&str, &str)]) -> Option<UriResource> {
        self.current.load().get_uri(endpoint_id, params)
    }

    /// See [`SitemapTree::get_uri_for_owner`].
    #[must_use]
    pub fn get_uri_for_owner(
        &self,
        endpoint_id: &EndpointId,
        owner: &OwnerContext,
        params: &[(&str, &str)],
    ) -> Option<UriResource> {
        self.current
            .load()
            .get_uri_for_owner(endpoint_id, owner, params)
    }

    /// Print the current tree to stdout.
    pub fn dump(&self) {
        let tree = self.current.load();
        println!(
            "[sitemap] generation={} nodes={} endpoints={}",
            tree.generation(),
            tree.len(),
            tree.endpoint_count()
        );
        print!("{}", tree.dump());
    }
}

impl Default for SitemapManager {
    fn default() -> Self {
        Self::new(SitemapConfig::default())
    }
}

impl RegistryListener for SitemapManager {
    fn registry_changed(&self, registry: &EndpointRegistry) {
        self.refresh(registry);
    }
}

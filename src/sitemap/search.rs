//! Forward routing over a sitemap snapshot - the search hot path.
//!
//! The search is a single descent without backtracking: at each node the
//! children are tried in registration order and the first one whose matcher
//! accepts the next request segment wins. The cost is bounded by
//! `depth × children per node`.

use super::node::{NodeId, SitemapTree};
use crate::endpoint::EndpointBinding;
use crate::ids::EndpointId;
use crate::uri::{PathSegment, UriResource};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage, `(name, value)` in path order.
///
/// Names are shared with the tree's variable segments (`Arc<str>`); values
/// are per-request data.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Caller data passed through a search untouched.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    pub method: http::Method,
    /// Requested culture, e.g. `de-DE`
    pub culture: Option<String>,
    pub host: Option<String>,
    pub headers: http::HeaderMap,
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Every request segment was consumed and the final node has a binding
    Exact,
    /// A leaf binding with `include_sub_paths` took the unconsumed segments
    SubPath,
    /// No binding serves this path
    NotFound,
}

/// Result of [`SitemapTree::search`].
///
/// "No route" is a result with `binding == None`, never an error.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The endpoint serving the request
    pub binding: Option<Arc<EndpointBinding>>,
    pub outcome: MatchOutcome,
    /// Deepest binding on the descended path, for status / not-found handling
    pub fallback: Option<Arc<EndpointBinding>>,
    /// Bound copies of the matched segments, root first
    pub bound_path: Vec<PathSegment>,
    /// Raw request segments left over by a sub-path match
    pub remaining: Vec<String>,
    /// Resolved request URI (bound path, remaining segments, query, fragment)
    pub uri: UriResource,
    /// Variable values in path order
    pub params: ParamVec,
    pub context: SearchContext,
}

impl SearchResult {
    fn not_found(uri: UriResource, context: SearchContext) -> Self {
        Self {
            binding: None,
            outcome: MatchOutcome::NotFound,
            fallback: None,
            bound_path: vec![PathSegment::Root],
            remaining: Vec::new(),
            uri,
            params: ParamVec::new(),
            context,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.binding.is_some()
    }

    #[must_use]
    pub fn endpoint_id(&self) -> Option<&EndpointId> {
        self.binding.as_ref().map(|b| &b.endpoint_id)
    }

    /// Get a path parameter by name.
    ///
    /// Uses "last write wins" semantics when the same name appears at
    /// several depths (e.g. `/org/{id}/user/{id}` returns the user id).
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Note: This allocates - use [`get_param`](Self::get_param) on hot paths.
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// `true` when a binding matched and all of its conditions hold for the
    /// context this search was made with.
    #[must_use]
    pub fn conditions_fulfilled(&self) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| b.conditions_fulfilled(&self.context))
    }

    /// Run the binding's request handler, if there is one.
    #[must_use]
    pub fn invoke(&self) -> Option<http::Response<Vec<u8>>> {
        let handler = self.binding.as_ref()?.handler.as_ref()?;
        Some(handler(self))
    }
}

/// Outcome of the structural descent, before it is turned into a [`SearchResult`].
struct Descent {
    binding: Option<Arc<EndpointBinding>>,
    outcome: MatchOutcome,
    fallback: Option<Arc<EndpointBinding>>,
    bound_path: Vec<PathSegment>,
    consumed: usize,
}

impl SitemapTree {
    /// Match a request path (absolute or relative URI) against the tree.
    ///
    /// Segments are percent-decoded and empty segments (trailing or doubled
    /// slashes) are ignored. Query and fragment are carried into the
    /// resolved URI. Unparseable input yields a not-found result.
    ///
    /// # Example
    ///
    /// ```
    /// use sitemap_router::endpoint::{EndpointBinding, EndpointDescriptor, OwnerContext};
    /// use sitemap_router::sitemap::{build_sitemap, MatchOutcome, SearchContext};
    /// use sitemap_router::uri::{parse_path_template, CaseSensitivity};
    ///
    /// let tree = build_sitemap(
    ///     vec![EndpointDescriptor::new(
    ///         EndpointBinding::new("item", OwnerContext::application("shop")),
    ///         parse_path_template("/shop").unwrap(),
    ///         parse_path_template("/items/{id:uint}").unwrap(),
    ///     )],
    ///     CaseSensitivity::Insensitive,
    /// );
    /// let result = tree.search("/shop/items/42?tab=reviews", SearchContext::default());
    /// assert_eq!(result.outcome, MatchOutcome::Exact);
    /// assert_eq!(result.get_param("id"), Some("42"));
    /// assert_eq!(result.uri.to_string(), "/shop/items/42?tab=reviews");
    /// ```
    #[must_use]
    pub fn search(&self, path: &str, context: SearchContext) -> SearchResult {
        match UriResource::parse(path) {
            Ok(uri) => self.search_uri(&uri, context),
            Err(error) => {
                debug!(path = %path, error = %error, "Unparseable request path");
                SearchResult::not_found(UriResource::root(), context)
            }
        }
    }

    /// Match an already parsed request URI.
    #[must_use]
    pub fn search_uri(&self, request: &UriResource, context: SearchContext) -> SearchResult {
        let raw: Vec<String> = request
            .path_segments()
            .iter()
            .map(ToString::to_string)
            .filter(|s| !s.is_empty())
            .collect();
        let decoded: Vec<String> = raw
            .iter()
            .map(|s| urlencoding::decode(s).map_or_else(|_| s.clone(), |d| d.into_owned()))
            .collect();
        let decoded_refs: SmallVec<[&str; 16]> = decoded.iter().map(String::as_str).collect();

        let descent = self.descend(&decoded_refs);

        let remaining: Vec<String> = match descent.outcome {
            MatchOutcome::SubPath => raw[descent.consumed..].to_vec(),
            _ => Vec::new(),
        };
        let mut uri = request.take(0);
        for segment in descent.bound_path.iter().skip(1) {
            uri.push(segment.clone());
        }
        for segment in &remaining {
            uri.push(PathSegment::literal(segment.as_str()));
        }
        let uri = uri
            .with_query_opt(request.query().cloned())
            .with_fragment_opt(request.fragment().map(str::to_string));

        let params: ParamVec = descent
            .bound_path
            .iter()
            .filter_map(|segment| match segment {
                PathSegment::Variable(v) => v
                    .value
                    .as_ref()
                    .map(|value| (Arc::clone(&v.name), value.clone())),
                _ => None,
            })
            .collect();

        debug!(
            path = %request,
            outcome = ?descent.outcome,
            endpoint_id = ?descent.binding.as_ref().map(|b| b.endpoint_id.as_str()),
            fallback = ?descent.fallback.as_ref().map(|b| b.endpoint_id.as_str()),
            params = ?params,
            generation = self.generation(),
            "Sitemap search"
        );

        SearchResult {
            binding: descent.binding,
            outcome: descent.outcome,
            fallback: descent.fallback,
            bound_path: descent.bound_path,
            remaining,
            uri,
            params,
            context,
        }
    }

    /// Match already decoded request segments; no logging, no URI assembly.
    #[must_use]
    pub fn search_segments(&self, segments: &[&str]) -> (Option<Arc<EndpointBinding>>, MatchOutcome) {
        let descent = self.descend(segments);
        (descent.binding, descent.outcome)
    }

    fn descend(&self, segments: &[&str]) -> Descent {
        let case = self.case_sensitivity();
        let mut node: NodeId = SitemapTree::ROOT;
        let mut bound_path = Vec::with_capacity(segments.len() + 1);
        bound_path.push(PathSegment::Root);
        let mut fallback: Option<Arc<EndpointBinding>> = None;
        let mut consumed = 0;

        loop {
            let current = self.node(node);
            if let Some(binding) = current.binding() {
                fallback = Some(Arc::clone(binding));
            }

            let Some(&raw) = segments.get(consumed) else {
                let binding = current.binding().cloned();
                let outcome = if binding.is_some() {
                    MatchOutcome::Exact
                } else {
                    MatchOutcome::NotFound
                };
                return Descent {
                    binding,
                    outcome,
                    fallback,
                    bound_path,
                    consumed,
                };
            };

            let next = current
                .children()
                .iter()
                .copied()
                .find(|&child| self.node(child).segment().matches(raw, case));

            match next {
                Some(child) => {
                    bound_path.push(self.node(child).segment().bind(raw));
                    node = child;
                    consumed += 1;
                }
                None => {
                    let catch_all = current
                        .binding()
                        .filter(|b| current.is_leaf() && b.include_sub_paths)
                        .cloned();
                    let outcome = if catch_all.is_some() {
                        MatchOutcome::SubPath
                    } else {
                        MatchOutcome::NotFound
                    };
                    return Descent {
                        binding: catch_all,
                        outcome,
                        fallback,
                        bound_path,
                        consumed,
                    };
                }
            }
        }
    }
}

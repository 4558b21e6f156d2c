//! # Endpoint Module
//!
//! The sitemap only needs one capability from pages, REST resources and
//! status pages: an [`EndpointDescriptor`] naming the endpoint, the path it
//! lives at, the conditions guarding it and whether it also serves deeper
//! sub-paths. Everything kind-specific (HTML vs. JSON, templating, ...) lives
//! in the caller-installed [`RequestHandler`].
//!
//! ## Ownership
//!
//! Every endpoint belongs to an application and optionally to a module of
//! that application ([`OwnerContext`]). The full path of an endpoint is the
//! application context path, then the module context path, then the
//! endpoint's own path:
//!
//! ```text
//! /shop          application "shop"
//!     /catalog   module "catalog"
//!         /items/{id:uint}   endpoint "item"
//! => /shop/catalog/items/{id:uint}
//! ```

use crate::ids::{ApplicationId, EndpointId, ModuleId};
use crate::sitemap::{SearchContext, SearchResult};
use crate::uri::PathSegment;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What kind of endpoint a binding refers to.
///
/// Informational only; routing treats all kinds alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    #[default]
    Page,
    Resource,
    RestApi,
    StatusPage,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndpointKind::Page => "page",
            EndpointKind::Resource => "resource",
            EndpointKind::RestApi => "rest_api",
            EndpointKind::StatusPage => "status_page",
        };
        f.write_str(s)
    }
}

/// Application (and optional module) owning an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerContext {
    pub application: ApplicationId,
    #[serde(default)]
    pub module: Option<ModuleId>,
}

impl OwnerContext {
    pub fn application(application: impl Into<ApplicationId>) -> Self {
        Self {
            application: application.into(),
            module: None,
        }
    }

    pub fn module(application: impl Into<ApplicationId>, module: impl Into<ModuleId>) -> Self {
        Self {
            application: application.into(),
            module: Some(module.into()),
        }
    }
}

impl fmt::Display for OwnerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(module) => write!(f, "{}/{}", self.application, module),
            None => write!(f, "{}", self.application),
        }
    }
}

/// Opaque predicate attached to an endpoint.
///
/// The sitemap never evaluates conditions; it reports the structural match
/// and the caller decides (e.g. authorization, feature flags, culture).
pub trait Condition: Send + Sync + fmt::Debug {
    fn is_fulfilled(&self, context: &SearchContext) -> bool;
}

/// Caller-installed request handler, invoked by the caller after a search.
pub type RequestHandler = Arc<dyn Fn(&SearchResult) -> http::Response<Vec<u8>> + Send + Sync>;

/// The endpoint information stored at a sitemap node.
#[derive(Clone)]
pub struct EndpointBinding {
    pub endpoint_id: EndpointId,
    pub owner: OwnerContext,
    pub kind: EndpointKind,
    pub conditions: Vec<Arc<dyn Condition>>,
    /// Serve any deeper, otherwise unregistered sub-path as well
    pub include_sub_paths: bool,
    pub handler: Option<RequestHandler>,
}

impl EndpointBinding {
    pub fn new(endpoint_id: impl Into<EndpointId>, owner: OwnerContext) -> Self {
        Self {
            endpoint_id: endpoint_id.into(),
            owner,
            kind: EndpointKind::Page,
            conditions: Vec::new(),
            include_sub_paths: false,
            handler: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: EndpointKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Arc<dyn Condition>) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn include_sub_paths(mut self, include: bool) -> Self {
        self.include_sub_paths = include;
        self
    }

    #[must_use]
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&SearchResult) -> http::Response<Vec<u8>> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// `true` when every attached condition holds for `context`.
    #[must_use]
    pub fn conditions_fulfilled(&self, context: &SearchContext) -> bool {
        self.conditions.iter().all(|c| c.is_fulfilled(context))
    }

    /// Exact owner match; `module: None` requires an application-level endpoint.
    #[must_use]
    pub fn is_owned_by(&self, application: &ApplicationId, module: Option<&ModuleId>) -> bool {
        self.owner.application == *application && self.owner.module.as_ref() == module
    }
}

impl fmt::Debug for EndpointBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointBinding")
            .field("endpoint_id", &self.endpoint_id)
            .field("owner", &self.owner)
            .field("kind", &self.kind)
            .field("conditions", &self.conditions)
            .field("include_sub_paths", &self.include_sub_paths)
            .field("handler", &self.handler.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// One endpoint's contribution to the sitemap.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    pub binding: Arc<EndpointBinding>,
    /// Application then module context path segments
    pub context_path: Vec<PathSegment>,
    /// The endpoint's own segments
    pub own_path: Vec<PathSegment>,
}

impl EndpointDescriptor {
    pub fn new(
        binding: EndpointBinding,
        context_path: Vec<PathSegment>,
        own_path: Vec<PathSegment>,
    ) -> Self {
        Self {
            binding: Arc::new(binding),
            context_path,
            own_path,
        }
    }

    /// Total number of segments below the root.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.context_path.len() + self.own_path.len()
    }

    /// Context path followed by the own path.
    pub fn full_path(&self) -> impl Iterator<Item = &PathSegment> {
        self.context_path.iter().chain(self.own_path.iter())
    }
}

/// Anything that can enumerate endpoint descriptors for a refresh.
pub trait EndpointSource {
    fn descriptors(&self) -> Vec<EndpointDescriptor>;
}

impl EndpointSource for [EndpointDescriptor] {
    fn descriptors(&self) -> Vec<EndpointDescriptor> {
        self.to_vec()
    }
}

impl EndpointSource for Vec<EndpointDescriptor> {
    fn descriptors(&self) -> Vec<EndpointDescriptor> {
        self.clone()
    }
}

//! # Registry Module
//!
//! Explicit registration table for applications, modules and endpoints.
//!
//! The registry is the [`EndpointSource`] a
//! [`SitemapManager`](crate::sitemap::SitemapManager) rebuilds from. Every
//! successful mutation notifies the subscribed [`RegistryListener`]s after
//! the write lock has been released, so a listener may read the registry
//! (the manager does exactly that to refresh).
//!
//! ```rust
//! use sitemap_router::endpoint::{EndpointBinding, OwnerContext};
//! use sitemap_router::registry::EndpointRegistry;
//! use sitemap_router::sitemap::{SearchContext, SitemapManager};
//! use std::sync::Arc;
//!
//! let registry = EndpointRegistry::new();
//! let manager = Arc::new(SitemapManager::default());
//! registry.subscribe(manager.clone());
//!
//! registry.add_application("shop", "/shop").unwrap();
//! registry
//!     .add_endpoint(
//!         EndpointBinding::new("home", OwnerContext::application("shop")),
//!         "/home",
//!     )
//!     .unwrap();
//!
//! let result = manager.search("/shop/home", SearchContext::default());
//! assert!(result.is_match());
//! ```
//!
//! Removing an application removes its modules and endpoints; removing a
//! module removes its endpoints.

use crate::endpoint::{EndpointBinding, EndpointDescriptor, EndpointSource, OwnerContext};
use crate::ids::{ApplicationId, EndpointId, ModuleId};
use crate::uri::{parse_path_template, CaseSensitivity, PathSegment, TemplateError};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Notified after every registry change.
pub trait RegistryListener: Send + Sync {
    fn registry_changed(&self, registry: &EndpointRegistry);
}

#[derive(Debug, Clone)]
pub struct ApplicationEntry {
    pub id: ApplicationId,
    pub context_path: Vec<PathSegment>,
}

#[derive(Debug, Clone)]
pub struct ModuleEntry {
    pub id: ModuleId,
    pub application: ApplicationId,
    pub context_path: Vec<PathSegment>,
}

#[derive(Debug, Clone)]
pub struct EndpointEntry {
    pub binding: Arc<EndpointBinding>,
    pub path: Vec<PathSegment>,
}

#[derive(Debug, Clone, Default)]
struct RegistryState {
    applications: Vec<ApplicationEntry>,
    modules: Vec<ModuleEntry>,
    endpoints: Vec<EndpointEntry>,
}

impl RegistryState {
    fn application(&self, id: &ApplicationId) -> Option<&ApplicationEntry> {
        self.applications.iter().find(|a| a.id == *id)
    }

    fn module(&self, application: &ApplicationId, id: &ModuleId) -> Option<&ModuleEntry> {
        self.modules
            .iter()
            .find(|m| m.application == *application && m.id == *id)
    }

    fn context_path(&self, owner: &OwnerContext) -> Option<Vec<PathSegment>> {
        let mut path = self.application(&owner.application)?.context_path.clone();
        if let Some(module) = &owner.module {
            path.extend(self.module(&owner.application, module)?.context_path.iter().cloned());
        }
        Some(path)
    }

    /// Context path followed by the endpoint's own path.
    fn full_path(&self, owner: &OwnerContext, own: &[PathSegment]) -> Option<Vec<PathSegment>> {
        let mut path = self.context_path(owner)?;
        path.extend(own.iter().cloned());
        Some(path)
    }

    /// First endpoint whose full path is the same sitemap node as `full`.
    fn endpoint_at(&self, full: &[PathSegment], case: CaseSensitivity) -> Option<&EndpointEntry> {
        self.endpoints.iter().find(|e| {
            self.full_path(&e.binding.owner, &e.path).is_some_and(|existing| {
                existing.len() == full.len()
                    && existing
                        .iter()
                        .zip(full)
                        .all(|(a, b)| a.structurally_eq(b, case))
            })
        })
    }
}

/// Errors returned by registry mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateApplication(ApplicationId),
    DuplicateModule {
        application: ApplicationId,
        module: ModuleId,
    },
    DuplicateEndpoint {
        endpoint: EndpointId,
        owner: OwnerContext,
    },
    UnknownApplication(ApplicationId),
    UnknownModule {
        application: ApplicationId,
        module: ModuleId,
    },
    InvalidPath(TemplateError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateApplication(id) => {
                write!(f, "application '{id}' is already registered")
            }
            RegistryError::DuplicateModule {
                application,
                module,
            } => write!(
                f,
                "module '{module}' is already registered in application '{application}'"
            ),
            RegistryError::DuplicateEndpoint { endpoint, owner } => {
                write!(f, "endpoint '{endpoint}' is already registered for '{owner}'")
            }
            RegistryError::UnknownApplication(id) => write!(f, "unknown application '{id}'"),
            RegistryError::UnknownModule {
                application,
                module,
            } => write!(f, "unknown module '{module}' in application '{application}'"),
            RegistryError::InvalidPath(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::InvalidPath(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TemplateError> for RegistryError {
    fn from(e: TemplateError) -> Self {
        RegistryError::InvalidPath(e)
    }
}

/// Registration table of applications, modules and endpoints.
#[derive(Default)]
pub struct EndpointRegistry {
    state: RwLock<RegistryState>,
    listeners: RwLock<Vec<Arc<dyn RegistryListener>>>,
    case: CaseSensitivity,
}

impl EndpointRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose duplicate-path check folds static segments under `case`.
    ///
    /// Use the same policy as the [`SitemapManager`](crate::sitemap::SitemapManager)
    /// built from it.
    #[must_use]
    pub fn with_case_sensitivity(case: CaseSensitivity) -> Self {
        Self {
            case,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case
    }

    /// Subscribe to changes. The listener is not called for the current state.
    pub fn subscribe(&self, listener: Arc<dyn RegistryListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        let listeners: Vec<Arc<dyn RegistryListener>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(Arc::clone)
            .collect();
        for listener in listeners {
            listener.registry_changed(self);
        }
    }

    /// Register an application under a context path template (`/shop`).
    pub fn add_application(
        &self,
        id: impl Into<ApplicationId>,
        context_path: &str,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        let context_path = parse_path_template(context_path)?;
        {
            let mut state = self.write();
            if state.application(&id).is_some() {
                return Err(RegistryError::DuplicateApplication(id));
            }
            debug!(application = %id, "Application registered");
            state.applications.push(ApplicationEntry { id, context_path });
        }
        self.notify();
        Ok(())
    }

    /// Remove an application with all of its modules and endpoints.
    pub fn remove_application(&self, id: &ApplicationId) -> bool {
        {
            let mut state = self.write();
            let before = state.applications.len();
            state.applications.retain(|a| a.id != *id);
            if state.applications.len() == before {
                return false;
            }
            state.modules.retain(|m| m.application != *id);
            state.endpoints.retain(|e| e.binding.owner.application != *id);
            debug!(application = %id, "Application removed");
        }
        self.notify();
        true
    }

    /// Register a module of an existing application.
    pub fn add_module(
        &self,
        application: impl Into<ApplicationId>,
        id: impl Into<ModuleId>,
        context_path: &str,
    ) -> Result<(), RegistryError> {
        let application = application.into();
        let id = id.into();
        let context_path = parse_path_template(context_path)?;
        {
            let mut state = self.write();
            if state.application(&application).is_none() {
                return Err(RegistryError::UnknownApplication(application));
            }
            if state.module(&application, &id).is_some() {
                return Err(RegistryError::DuplicateModule {
                    application,
                    module: id,
                });
            }
            debug!(application = %application, module = %id, "Module registered");
            state.modules.push(ModuleEntry {
                id,
                application,
                context_path,
            });
        }
        self.notify();
        Ok(())
    }

    /// Remove a module and its endpoints.
    pub fn remove_module(&self, application: &ApplicationId, id: &ModuleId) -> bool {
        {
            let mut state = self.write();
            let before = state.modules.len();
            state
                .modules
                .retain(|m| !(m.application == *application && m.id == *id));
            if state.modules.len() == before {
                return false;
            }
            state.endpoints.retain(|e| {
                !(e.binding.owner.application == *application
                    && e.binding.owner.module.as_ref() == Some(id))
            });
            debug!(application = %application, module = %id, "Module removed");
        }
        self.notify();
        true
    }

    /// Register an endpoint at `path` below its owner's context path.
    ///
    /// The same endpoint id may be registered by different owners. Two
    /// endpoints resolving to the same full path are accepted with a warning;
    /// the sitemap serves the first one.
    pub fn add_endpoint(&self, binding: EndpointBinding, path: &str) -> Result<(), RegistryError> {
        let path = parse_path_template(path)?;
        {
            let mut state = self.write();
            let owner = &binding.owner;
            if state.application(&owner.application).is_none() {
                return Err(RegistryError::UnknownApplication(owner.application.clone()));
            }
            if let Some(module) = &owner.module {
                if state.module(&owner.application, module).is_none() {
                    return Err(RegistryError::UnknownModule {
                        application: owner.application.clone(),
                        module: module.clone(),
                    });
                }
            }
            if state
                .endpoints
                .iter()
                .any(|e| e.binding.endpoint_id == binding.endpoint_id && e.binding.owner == *owner)
            {
                return Err(RegistryError::DuplicateEndpoint {
                    endpoint: binding.endpoint_id.clone(),
                    owner: owner.clone(),
                });
            }

            let full_path = state.full_path(owner, &path).unwrap_or_default();
            let full = full_template(&full_path);
            if let Some(existing) = state.endpoint_at(&full_path, self.case) {
                warn!(
                    path = %full,
                    kept = %existing.binding.endpoint_id,
                    shadowed = %binding.endpoint_id,
                    "Endpoint path already registered; the earlier registration is served"
                );
            }

            debug!(endpoint = %binding.endpoint_id, owner = %owner, path = %full, "Endpoint registered");
            state.endpoints.push(EndpointEntry {
                binding: Arc::new(binding),
                path,
            });
        }
        self.notify();
        Ok(())
    }

    /// Remove an endpoint registration of `owner`.
    pub fn remove_endpoint(&self, endpoint: &EndpointId, owner: &OwnerContext) -> bool {
        {
            let mut state = self.write();
            let before = state.endpoints.len();
            state
                .endpoints
                .retain(|e| !(e.binding.endpoint_id == *endpoint && e.binding.owner == *owner));
            if state.endpoints.len() == before {
                return false;
            }
        }
        self.notify();
        true
    }

    /// Remove everything.
    pub fn clear(&self) {
        *self.write() = RegistryState::default();
        self.notify();
    }

    /// Replace the whole content with that of `other` (listeners of `other`
    /// are not copied) and notify once.
    pub fn replace_all(&self, other: &EndpointRegistry) {
        let fresh = other.read().clone();
        *self.write() = fresh;
        self.notify();
    }

    #[must_use]
    pub fn applications(&self) -> Vec<ApplicationEntry> {
        self.read().applications.clone()
    }

    #[must_use]
    pub fn modules(&self) -> Vec<ModuleEntry> {
        self.read().modules.clone()
    }

    #[must_use]
    pub fn endpoints(&self) -> Vec<EndpointEntry> {
        self.read().endpoints.clone()
    }
}

fn full_template(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        out.push('/');
        out.push_str(&segment.template());
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

impl EndpointSource for EndpointRegistry {
    /// One descriptor per endpoint, in registration order.
    fn descriptors(&self) -> Vec<EndpointDescriptor> {
        let state = self.read();
        state
            .endpoints
            .iter()
            .filter_map(|e| {
                let context_path = state.context_path(&e.binding.owner)?;
                Some(EndpointDescriptor {
                    binding: Arc::clone(&e.binding),
                    context_path,
                    own_path: e.path.clone(),
                })
            })
            .collect()
    }
}

impl fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("EndpointRegistry")
            .field("applications", &state.applications.len())
            .field("modules", &state.modules.len())
            .field("endpoints", &state.endpoints.len())
            .field("case", &self.case)
            .finish()
    }
}

//! # Manifest Module
//!
//! Declarative description of applications, modules and endpoints, loaded
//! from YAML or JSON and turned into an [`EndpointRegistry`].
//!
//! ```yaml
//! config:
//!   static_case: insensitive
//! applications:
//!   - id: shop
//!     context_path: /shop
//!     endpoints:
//!       - { id: home, path: /home }
//!     modules:
//!       - id: catalog
//!         context_path: /catalog
//!         endpoints:
//!           - { id: item, path: "/items/{id:uint}", kind: resource }
//!           - { id: docs, path: /docs, include_sub_paths: true }
//! ```
//!
//! Files ending in `.yaml` or `.yml` are parsed as YAML, everything else as
//! JSON. Environment overrides ([`SitemapConfig::apply_env`]) are applied to
//! the `config` section by [`load_manifest`].
//!
//! An empty or whitespace-only file is a load error; a manifest without
//! applications has to say so explicitly (`applications: []`).

use crate::config::SitemapConfig;
use crate::endpoint::{EndpointBinding, EndpointKind, OwnerContext};
use crate::registry::{EndpointRegistry, RegistryError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub config: SitemapConfig,
    #[serde(default)]
    pub applications: Vec<ApplicationManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationManifest {
    pub id: String,
    #[serde(default)]
    pub context_path: String,
    #[serde(default)]
    pub endpoints: Vec<EndpointManifest>,
    #[serde(default)]
    pub modules: Vec<ModuleManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub id: String,
    #[serde(default)]
    pub context_path: String,
    #[serde(default)]
    pub endpoints: Vec<EndpointManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointManifest {
    pub id: String,
    pub path: String,
    #[serde(default)]
    pub kind: EndpointKind,
    #[serde(default)]
    pub include_sub_paths: bool,
}

impl EndpointManifest {
    fn binding(&self, owner: OwnerContext) -> EndpointBinding {
        EndpointBinding::new(self.id.as_str(), owner)
            .with_kind(self.kind)
            .include_sub_paths(self.include_sub_paths)
    }
}

impl Manifest {
    /// Parse YAML (which also accepts JSON documents).
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("invalid YAML manifest")
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("invalid JSON manifest")
    }

    /// Register everything into `registry`, in document order: each
    /// application, then its own endpoints, then its modules with their
    /// endpoints.
    pub fn apply_to(&self, registry: &EndpointRegistry) -> Result<(), RegistryError> {
        for app in &self.applications {
            registry.add_application(app.id.as_str(), &app.context_path)?;
            for endpoint in &app.endpoints {
                registry.add_endpoint(
                    endpoint.binding(OwnerContext::application(app.id.as_str())),
                    &endpoint.path,
                )?;
            }
            for module in &app.modules {
                registry.add_module(app.id.as_str(), module.id.as_str(), &module.context_path)?;
                for endpoint in &module.endpoints {
                    registry.add_endpoint(
                        endpoint.binding(OwnerContext::module(app.id.as_str(), module.id.as_str())),
                        &endpoint.path,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// A fresh registry (without listeners) holding this manifest, using the
    /// manifest's case policy.
    pub fn to_registry(&self) -> Result<EndpointRegistry, RegistryError> {
        let registry = EndpointRegistry::with_case_sensitivity(self.config.static_case);
        self.apply_to(&registry)?;
        Ok(registry)
    }
}

/// Load a manifest file; the format is chosen by extension.
pub fn load_manifest(path: impl AsRef<Path>) -> anyhow::Result<Manifest> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    if content.trim().is_empty() {
        anyhow::bail!("manifest {} is empty", path.display());
    }
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    let mut manifest = if is_yaml {
        Manifest::from_yaml(&content)
    } else {
        Manifest::from_json(&content)
    }
    .with_context(|| format!("failed to parse manifest {}", path.display()))?;
    manifest.config = manifest.config.apply_env();
    Ok(manifest)
}

/// Load a manifest file straight into a fresh registry.
pub fn load_registry(path: impl AsRef<Path>) -> anyhow::Result<(SitemapConfig, EndpointRegistry)> {
    let path = path.as_ref();
    let manifest = load_manifest(path)?;
    let registry = manifest
        .to_registry()
        .with_context(|| format!("invalid registrations in manifest {}", path.display()))?;
    Ok((manifest.config, registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::EndpointSource;
    use crate::uri::CaseSensitivity;

    const SHOP: &str = r#"
config:
  static_case: sensitive
applications:
  - id: shop
    context_path: /shop
    endpoints:
      - { id: home, path: /home }
    modules:
      - id: catalog
        context_path: /catalog
        endpoints:
          - { id: item, path: "/items/{id:uint}", kind: resource }
          - { id: docs, path: /docs, include_sub_paths: true }
"#;

    #[test]
    fn test_parse_yaml_manifest() {
        let manifest = Manifest::from_yaml(SHOP).unwrap();
        assert_eq!(manifest.config.static_case, CaseSensitivity::Sensitive);
        let shop = &manifest.applications[0];
        assert_eq!(shop.context_path, "/shop");
        let catalog = &shop.modules[0];
        assert_eq!(catalog.endpoints[0].kind, EndpointKind::Resource);
        assert_eq!(catalog.endpoints[1].kind, EndpointKind::Page);
        assert!(catalog.endpoints[1].include_sub_paths);
    }

    #[test]
    fn test_json_manifest_defaults() {
        let manifest =
            Manifest::from_json(r#"{"applications":[{"id":"root","endpoints":[{"id":"a","path":"/a"}]}]}"#)
                .unwrap();
        assert_eq!(manifest.config, SitemapConfig::default());
        assert_eq!(manifest.applications[0].context_path, "");
    }

    #[test]
    fn test_to_registry_preserves_document_order() {
        let registry = Manifest::from_yaml(SHOP).unwrap().to_registry().unwrap();
        let ids: Vec<String> = registry
            .descriptors()
            .iter()
            .map(|d| d.binding.endpoint_id.to_string())
            .collect();
        assert_eq!(ids, vec!["home", "item", "docs"]);
        assert_eq!(registry.case_sensitivity(), CaseSensitivity::Sensitive);
    }

    #[test]
    fn test_empty_manifest_file_is_rejected() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        std::fs::write(file.path(), " \n\t\n").unwrap();
        let err = load_manifest(file.path()).unwrap_err();
        assert!(err.to_string().contains("is empty"));

        std::fs::write(file.path(), "applications: []\n").unwrap();
        assert!(load_manifest(file.path()).unwrap().applications.is_empty());
    }

    #[test]
    fn test_invalid_path_is_reported() {
        let manifest = Manifest::from_yaml(
            "applications:\n  - id: a\n    endpoints:\n      - { id: x, path: \"/{id:integer}\" }\n",
        )
        .unwrap();
        assert!(matches!(
            manifest.to_registry(),
            Err(RegistryError::InvalidPath(_))
        ));
    }
}

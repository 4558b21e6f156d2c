#![allow(dead_code)]

pub mod temp_files {
    use tempfile::NamedTempFile;

    /// Creates a temporary manifest; the file is removed when the handle drops
    pub fn create_temp_manifest(content: &str, ext: &str) -> NamedTempFile {
        let file = tempfile::Builder::new()
            .prefix("sitemap_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp_manifest(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> NamedTempFile {
        create_temp_manifest(content, "json")
    }
}

pub mod fixtures {
    use sitemap_router::endpoint::{EndpointBinding, OwnerContext};
    use sitemap_router::registry::EndpointRegistry;

    /// Shop application with a catalog module
    pub const SHOP_YAML: &str = r#"
applications:
  - id: shop
    context_path: /shop
    endpoints:
      - { id: home, path: /home }
      - { id: not_found, path: /404, kind: status_page }
    modules:
      - id: catalog
        context_path: /catalog
        endpoints:
          - { id: item_list, path: /items }
          - { id: item, path: "/items/{id:uint}", kind: resource }
          - { id: item_by_slug, path: "/items/{slug}" }
          - { id: docs, path: /docs, include_sub_paths: true }
  - id: admin
    context_path: /admin
    endpoints:
      - { id: console, path: "", include_sub_paths: true }
"#;

    /// The same registrations as [`SHOP_YAML`], made through the API.
    pub fn shop_registry() -> EndpointRegistry {
        let registry = EndpointRegistry::new();
        registry.add_application("shop", "/shop").unwrap();
        registry.add_module("shop", "catalog", "/catalog").unwrap();
        registry
            .add_endpoint(
                EndpointBinding::new("home", OwnerContext::application("shop")),
                "/home",
            )
            .unwrap();
        registry
            .add_endpoint(
                EndpointBinding::new("item_list", OwnerContext::module("shop", "catalog")),
                "/items",
            )
            .unwrap();
        registry
            .add_endpoint(
                EndpointBinding::new("item", OwnerContext::module("shop", "catalog")),
                "/items/{id:uint}",
            )
            .unwrap();
        registry
            .add_endpoint(
                EndpointBinding::new("item_by_slug", OwnerContext::module("shop", "catalog")),
                "/items/{slug}",
            )
            .unwrap();
        registry
    }
}

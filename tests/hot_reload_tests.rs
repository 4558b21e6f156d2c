#![allow(clippy::unwrap_used, clippy::expect_used)]

use sitemap_router::hot_reload::{reload, watch_manifest};
use sitemap_router::manifest::{load_manifest, load_registry};
use sitemap_router::registry::EndpointRegistry;
use sitemap_router::sitemap::{SearchContext, SitemapManager};
use sitemap_router::uri::CaseSensitivity;
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{fixtures, temp_files};

const MANIFEST_V1: &str = r#"
applications:
  - id: app
    context_path: /app
    endpoints:
      - { id: foo_one, path: /foo }
"#;

const MANIFEST_V2: &str = r#"
applications:
  - id: app
    context_path: /app
    endpoints:
      - { id: foo_two, path: /foo }
"#;

fn foo(manager: &SitemapManager) -> Option<String> {
    manager
        .search("/app/foo", SearchContext::default())
        .endpoint_id()
        .map(ToString::to_string)
}

#[test]
fn test_load_yaml_and_json() {
    let yaml = temp_files::create_temp_yaml(fixtures::SHOP_YAML);
    let json = temp_files::create_temp_json(
        r#"{"config":{"static_case":"sensitive"},"applications":[{"id":"app","context_path":"/app","endpoints":[{"id":"a","path":"/a"}]}]}"#,
    );

    let (_, registry) = load_registry(yaml.path()).unwrap();
    assert_eq!(registry.endpoints().len(), 7);

    let manifest = load_manifest(json.path()).unwrap();
    if std::env::var("SITEMAP_STATIC_CASE").is_err() {
        assert_eq!(manifest.config.static_case, CaseSensitivity::Sensitive);
    }
}

#[test]
fn test_load_errors_carry_the_path() {
    let broken = temp_files::create_temp_yaml("applications: [ {id: ");
    let err = load_manifest(broken.path()).unwrap_err();
    assert!(format!("{err:#}").contains(broken.path().to_str().unwrap()));

    let missing = std::env::temp_dir().join("sitemap_test_does_not_exist.yaml");
    assert!(load_manifest(&missing).is_err());
}

#[test]
fn test_reload_keeps_previous_routes_on_error() {
    let file = temp_files::create_temp_yaml(MANIFEST_V1);
    let path = file.path();
    let registry = EndpointRegistry::new();
    let manager = Arc::new(SitemapManager::default());
    registry.subscribe(manager.clone());

    assert!(reload(path, &registry));
    assert_eq!(foo(&manager).as_deref(), Some("foo_one"));

    std::fs::write(path, "applications: [ {id: app, endpoints: [ {id: x, path: \"/{bad\"} ] } ]").unwrap();
    assert!(!reload(path, &registry));
    assert_eq!(foo(&manager).as_deref(), Some("foo_one"));
}

#[test]
fn test_reload_of_truncated_manifest_keeps_routes() {
    let file = temp_files::create_temp_yaml(MANIFEST_V1);
    let path = file.path();
    let registry = EndpointRegistry::new();
    let manager = Arc::new(SitemapManager::default());
    registry.subscribe(manager.clone());
    assert!(reload(path, &registry));
    let generation = manager.generation();

    std::fs::write(path, "").unwrap();
    assert!(!reload(path, &registry));
    std::fs::write(path, "\n  \n").unwrap();
    assert!(!reload(path, &registry));

    assert_eq!(foo(&manager).as_deref(), Some("foo_one"));
    assert_eq!(manager.generation(), generation);
    assert_eq!(registry.endpoints().len(), 1);
}

#[test]
fn test_watch_manifest_reload() {
    let file = temp_files::create_temp_yaml(MANIFEST_V1);
    let path = file.path();
    let (_, initial) = load_registry(path).unwrap();
    let registry = Arc::new(EndpointRegistry::new());
    let manager = Arc::new(SitemapManager::default());
    registry.subscribe(manager.clone());
    registry.replace_all(&initial);
    assert_eq!(foo(&manager).as_deref(), Some("foo_one"));

    let watcher = watch_manifest(path, registry.clone()).expect("watch_manifest");

    // allow watcher thread to start
    std::thread::sleep(Duration::from_millis(100));

    // modify the manifest
    std::fs::write(path, MANIFEST_V2).unwrap();

    // wait for the refresh to land
    for _ in 0..40 {
        if foo(&manager).as_deref() == Some("foo_two") {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    assert_eq!(foo(&manager).as_deref(), Some("foo_two"));

    drop(watcher);
}

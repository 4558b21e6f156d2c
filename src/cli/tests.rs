//! Unit tests for CLI commands

use crate::cli::{run, Cli, Commands};
use clap::Parser;
use std::io::Write;

const MANIFEST: &str = r#"
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

fn manifest_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(MANIFEST.as_bytes()).unwrap();
    file
}

fn run_args(args: &[&str]) -> (anyhow::Result<()>, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    let result = run(&cli, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_uri_command_parses_params() {
    let cli = Cli::try_parse_from([
        "sitemap-cli",
        "uri",
        "--manifest",
        "m.yaml",
        "--endpoint",
        "item",
        "--param",
        "id=42",
        "-p",
        "tab=a=b",
    ])
    .unwrap();

    match cli.command {
        Commands::Uri {
            endpoint, params, ..
        } => {
            assert_eq!(endpoint, "item");
            assert_eq!(
                params,
                vec![
                    ("id".to_string(), "42".to_string()),
                    ("tab".to_string(), "a=b".to_string())
                ]
            );
        }
        _ => panic!("Expected Uri command"),
    }
}

#[test]
fn test_malformed_param_is_rejected() {
    assert!(Cli::try_parse_from([
        "sitemap-cli",
        "uri",
        "--manifest",
        "m.yaml",
        "--endpoint",
        "item",
        "--param",
        "id",
    ])
    .is_err());
}

#[test]
fn test_module_requires_application() {
    assert!(Cli::try_parse_from([
        "sitemap-cli",
        "uri",
        "--manifest",
        "m.yaml",
        "--endpoint",
        "item",
        "--module",
        "catalog",
    ])
    .is_err());
}

#[test]
fn test_dump_prints_tree() {
    let file = manifest_file();
    let path = file.path().to_str().unwrap();
    let (result, out) = run_args(&["sitemap-cli", "dump", "--manifest", path]);
    result.unwrap();
    assert!(out.starts_with("# 7 nodes, 3 endpoints\n/\n  shop\n"));
    assert!(out.contains("{id:uint} -> item (shop/catalog)"));
    assert!(out.contains("docs -> docs (shop/catalog) [+sub-paths]"));
}

#[test]
fn test_search_prints_params() {
    let file = manifest_file();
    let path = file.path().to_str().unwrap();
    let (result, out) = run_args(&[
        "sitemap-cli",
        "search",
        "--manifest",
        path,
        "/shop/catalog/items/42",
    ]);
    result.unwrap();
    assert!(out.contains("outcome: exact"));
    assert!(out.contains("endpoint: item (shop/catalog, resource)"));
    assert!(out.contains("param id = 42"));
}

#[test]
fn test_search_miss_is_an_error() {
    let file = manifest_file();
    let path = file.path().to_str().unwrap();
    let (result, out) = run_args(&["sitemap-cli", "search", "--manifest", path, "/shop/nope"]);
    assert!(result.is_err());
    assert!(out.contains("outcome: not_found"));
}

#[test]
fn test_uri_command_resolves() {
    let file = manifest_file();
    let path = file.path().to_str().unwrap();
    let (result, out) = run_args(&[
        "sitemap-cli",
        "uri",
        "--manifest",
        path,
        "--endpoint",
        "item",
        "--application",
        "shop",
        "--module",
        "catalog",
        "--param",
        "id=7",
    ]);
    result.unwrap();
    assert_eq!(out, "/shop/catalog/items/7\n");
}

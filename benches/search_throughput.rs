use criterion::{criterion_group, criterion_main, Criterion};
use sitemap_router::endpoint::EndpointSource;
use sitemap_router::ids::EndpointId;
use sitemap_router::manifest::Manifest;
use sitemap_router::sitemap::{SearchContext, SitemapManager};
use std::hint::black_box;

fn example_manifest() -> &'static str {
    r#"
applications:
  - id: zoo
    context_path: /zoo
    endpoints:
      - { id: health, path: /health }
      - { id: animals, path: /animals }
      - { id: animal, path: "/animals/{id:uint}" }
      - { id: animal_toy, path: "/animals/{id:uint}/toys/{toy_id:uint}" }
      - { id: animal_by_name, path: "/animals/{name}" }
      - { id: habitat_section, path: "/{category}/animals/{id:uint}/habitats/{habitat_id:guid}/sections/{section_id:uint}" }
  - id: inventory
    context_path: "/inventory/{warehouse_id:uint}"
    modules:
      - id: feeds
        context_path: "/feeds/{feed_id:uint}"
        endpoints:
          - { id: post_item_batch, path: "/items/{item_id:uint}/batches/{batch_id:uint}" }
          - { id: feed_docs, path: /docs, include_sub_paths: true }
  - id: complex
    context_path: /complex
    endpoints:
      - { id: complex_many_params, path: "/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}" }
"#
}

fn manager() -> (SitemapManager, Vec<sitemap_router::EndpointDescriptor>) {
    let registry = Manifest::from_yaml(example_manifest())
        .expect("failed to parse manifest")
        .to_registry()
        .expect("failed to register manifest");
    let manager = SitemapManager::default();
    manager.refresh(&registry);
    (manager, registry.descriptors())
}

fn bench_search_throughput(c: &mut Criterion) {
    let (manager, _) = manager();
    c.bench_function("sitemap_search", |b| {
        let test_paths = [
            "/zoo/animals/123",
            "/zoo/animals/123/toys/456",
            "/zoo/animals/rex",
            "/zoo/cats/animals/123/habitats/3fa85f64-5717-4562-b3fc-2c963f66afa6/sections/5",
            "/inventory/1/feeds/2/items/3/batches/4",
            "/inventory/1/feeds/2/docs/a/b/c",
            "/complex/1/2/3/4/5/6/7/8/9",
            "/does/not/exist",
        ];
        b.iter(|| {
            for path in test_paths.iter() {
                let res = manager.search(path, SearchContext::default());
                black_box(&res);
            }
        })
    });
}

fn bench_get_uri(c: &mut Criterion) {
    let (manager, _) = manager();
    let id = EndpointId::new("post_item_batch");
    let params = [
        ("warehouse_id", "1"),
        ("feed_id", "2"),
        ("item_id", "3"),
        ("batch_id", "4"),
    ];
    c.bench_function("sitemap_get_uri", |b| {
        b.iter(|| black_box(manager.get_uri(&id, &params)))
    });
}

fn bench_refresh(c: &mut Criterion) {
    let (manager, descriptors) = manager();
    c.bench_function("sitemap_refresh", |b| {
        b.iter(|| black_box(manager.refresh(&descriptors)))
    });
}

criterion_group!(benches, bench_search_throughput, bench_get_uri, bench_refresh);
criterion_main!(benches);

//! Building and merging sitemap trees.
//!
//! Every endpoint descriptor becomes a single-branch mini-tree
//! (`Root → application path → module path → own path`), and the mini-trees
//! are folded into one tree with [`merge`]. Descriptors are merged in
//! ascending order of segment count so that shallow context paths exist
//! before deeper resources attach beneath them; equal counts keep their
//! registration order, which is also the sibling order used by search.

use super::node::{NodeId, SitemapTree};
use crate::endpoint::EndpointDescriptor;
use crate::uri::CaseSensitivity;
use std::sync::Arc;
use tracing::{debug, warn};

/// Merge `source` into `target`.
///
/// - children with the same structural identity are merged recursively
/// - a target node without a binding adopts the source binding; an existing
///   binding is kept (first registered wins)
/// - unmatched source children are attached wholesale, after the existing
///   children of the target node
///
/// Nothing happens if the two roots differ structurally.
pub fn merge(target: &mut SitemapTree, source: &SitemapTree) {
    merge_nodes(target, SitemapTree::ROOT, source, SitemapTree::ROOT);
}

fn merge_nodes(target: &mut SitemapTree, t: NodeId, source: &SitemapTree, s: NodeId) {
    let case = target.case_sensitivity();
    if !target
        .node(t)
        .segment()
        .structurally_eq(source.node(s).segment(), case)
    {
        return;
    }

    for &sc in source.children(s) {
        let source_child = source.node(sc);
        match target.find_child(t, source_child.segment()) {
            Some(tc) => {
                let existing = target.node(tc).binding().cloned();
                match (existing, source_child.binding()) {
                    (None, Some(binding)) => target.set_binding(tc, Arc::clone(binding)),
                    (Some(kept), Some(shadowed)) if !Arc::ptr_eq(&kept, shadowed) => {
                        debug!(
                            path = %target.uri_of(tc),
                            kept = %kept.endpoint_id,
                            shadowed = %shadowed.endpoint_id,
                            "Duplicate registration shadowed"
                        );
                    }
                    _ => {}
                }
                merge_nodes(target, tc, source, sc);
            }
            None => graft(target, t, source, sc),
        }
    }
}

/// Copy the subtree of `source` rooted at `s` under `parent`.
fn graft(target: &mut SitemapTree, parent: NodeId, source: &SitemapTree, s: NodeId) {
    let node = source.node(s);
    let copied = target.add_child(parent, node.segment().clone(), node.binding().cloned());
    for &child in node.children() {
        graft(target, copied, source, child);
    }
}

/// Collects endpoint descriptors and builds a merged [`SitemapTree`].
///
/// # Example
///
/// ```
/// use sitemap_router::endpoint::{EndpointBinding, EndpointDescriptor, OwnerContext};
/// use sitemap_router::sitemap::SitemapBuilder;
/// use sitemap_router::uri::{parse_path_template, CaseSensitivity};
///
/// let mut builder = SitemapBuilder::new(CaseSensitivity::Insensitive);
/// builder.add(EndpointDescriptor::new(
///     EndpointBinding::new("item", OwnerContext::application("shop")),
///     parse_path_template("/shop").unwrap(),
///     parse_path_template("/items/{id:uint}").unwrap(),
/// ));
/// let tree = builder.build();
/// assert_eq!(tree.endpoint_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SitemapBuilder {
    case: CaseSensitivity,
    descriptors: Vec<EndpointDescriptor>,
}

impl SitemapBuilder {
    #[must_use]
    pub fn new(case: CaseSensitivity) -> Self {
        Self {
            case,
            descriptors: Vec::new(),
        }
    }

    pub fn add(&mut self, descriptor: EndpointDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn extend(&mut self, descriptors: impl IntoIterator<Item = EndpointDescriptor>) -> &mut Self {
        self.descriptors.extend(descriptors);
        self
    }

    /// Build the merged tree.
    ///
    /// Descriptors whose full path is empty would bind the root and are skipped.
    #[must_use]
    pub fn build(mut self) -> SitemapTree {
        // stable: equal segment counts keep registration order
        self.descriptors.sort_by_key(EndpointDescriptor::segment_count);

        let mut tree = SitemapTree::new(self.case);
        for descriptor in &self.descriptors {
            if descriptor.segment_count() == 0 {
                warn!(
                    endpoint_id = %descriptor.binding.endpoint_id,
                    owner = %descriptor.binding.owner,
                    "Endpoint resolves to the root path and cannot be bound; skipped"
                );
                continue;
            }
            let mini = SitemapTree::from_chain(
                descriptor.full_path(),
                Arc::clone(&descriptor.binding),
                self.case,
            );
            merge(&mut tree, &mini);
        }
        tree
    }
}

/// Build a tree from descriptors in one call.
#[must_use]
pub fn build_sitemap(
    descriptors: impl IntoIterator<Item = EndpointDescriptor>,
    case: CaseSensitivity,
) -> SitemapTree {
    let mut builder = SitemapBuilder::new(case);
    builder.extend(descriptors);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{EndpointBinding, OwnerContext};
    use crate::uri::parse_path_template;

    fn descriptor(id: &str, context: &str, own: &str) -> EndpointDescriptor {
        EndpointDescriptor::new(
            EndpointBinding::new(id, OwnerContext::application("app")),
            parse_path_template(context).unwrap(),
            parse_path_template(own).unwrap(),
        )
    }

    #[test]
    fn test_shared_prefixes_are_merged() {
        let tree = build_sitemap(
            vec![
                descriptor("list", "/shop", "/items"),
                descriptor("item", "/shop", "/items/{id:uint}"),
                descriptor("cart", "/shop", "/cart"),
            ],
            CaseSensitivity::Insensitive,
        );
        // root, shop, items, {id}, cart
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.endpoint_count(), 3);
        assert_eq!(tree.children(SitemapTree::ROOT).len(), 1);
    }

    #[test]
    fn test_shallow_first_adoption() {
        // The deep endpoint is registered first but the intermediate node still
        // receives the shallow binding.
        let tree = build_sitemap(
            vec![
                descriptor("item", "/shop", "/items/{id:uint}"),
                descriptor("list", "/shop", "/items"),
            ],
            CaseSensitivity::Insensitive,
        );
        let shop = tree.children(SitemapTree::ROOT)[0];
        let items = tree.children(shop)[0];
        assert_eq!(
            tree.node(items).binding().unwrap().endpoint_id.as_str(),
            "list"
        );
        assert_eq!(tree.endpoint_count(), 2);
    }

    #[test]
    fn test_first_registered_wins() {
        let tree = build_sitemap(
            vec![descriptor("first", "", "/dup"), descriptor("second", "", "/dup")],
            CaseSensitivity::Insensitive,
        );
        assert_eq!(tree.len(), 2);
        let dup = tree.children(SitemapTree::ROOT)[0];
        assert_eq!(tree.node(dup).binding().unwrap().endpoint_id.as_str(), "first");
    }

    #[test]
    fn test_root_descriptor_is_skipped() {
        let tree = build_sitemap(
            vec![descriptor("home", "/", "")],
            CaseSensitivity::Insensitive,
        );
        assert_eq!(tree.len(), 1);
        assert!(tree.node(SitemapTree::ROOT).binding().is_none());
    }

    #[test]
    fn test_variables_with_different_names_stay_apart() {
        let tree = build_sitemap(
            vec![
                descriptor("by_id", "", "/users/{id:uint}"),
                descriptor("by_name", "", "/users/{name}"),
            ],
            CaseSensitivity::Insensitive,
        );
        let users = tree.children(SitemapTree::ROOT)[0];
        assert_eq!(tree.children(users).len(), 2);
    }

    #[test]
    fn test_merge_with_mismatched_roots_is_noop() {
        let mut target = build_sitemap(vec![descriptor("a", "", "/a")], CaseSensitivity::Insensitive);
        let before = target.len();
        // A source whose "root" is a static segment cannot merge into a Root.
        let mut source = SitemapTree::new(CaseSensitivity::Insensitive);
        let b = source.add_child(
            SitemapTree::ROOT,
            crate::uri::PathSegment::literal("b"),
            None,
        );
        merge_nodes(&mut target, SitemapTree::ROOT, &source, b);
        assert_eq!(target.len(), before);
    }
}

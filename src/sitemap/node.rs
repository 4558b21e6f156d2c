//! Arena-backed sitemap tree.
//!
//! Nodes live in a `Vec` and refer to each other by [`NodeId`]; the parent
//! link is a plain index, so the whole tree is a single owned value that can
//! be put behind an `Arc` and swapped atomically.

use crate::endpoint::EndpointBinding;
use crate::uri::{CaseSensitivity, PathSegment, UriResource};
use std::sync::Arc;

/// Index of a node inside its [`SitemapTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One node of the sitemap.
#[derive(Debug, Clone)]
pub struct SitemapNode {
    segment: PathSegment,
    binding: Option<Arc<EndpointBinding>>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl SitemapNode {
    /// Structural segment of this node (never bound).
    #[must_use]
    pub fn segment(&self) -> &PathSegment {
        &self.segment
    }

    #[must_use]
    pub fn binding(&self) -> Option<&Arc<EndpointBinding>> {
        self.binding.as_ref()
    }

    /// Children in registration order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// An immutable-once-built routing tree.
///
/// Node 0 is always the root, whose segment is [`PathSegment::Root`] and
/// which never carries a binding. Children of a node have pairwise distinct
/// structural identity under the tree's [`CaseSensitivity`].
#[derive(Debug, Clone)]
pub struct SitemapTree {
    nodes: Vec<SitemapNode>,
    case: CaseSensitivity,
    generation: u64,
}

impl SitemapTree {
    pub const ROOT: NodeId = NodeId(0);

    /// A tree holding only the root.
    #[must_use]
    pub fn new(case: CaseSensitivity) -> Self {
        Self {
            nodes: vec![SitemapNode {
                segment: PathSegment::Root,
                binding: None,
                children: Vec::new(),
                parent: None,
            }],
            case,
            generation: 0,
        }
    }

    /// A single-branch tree `Root → s1 → … → sn` with `binding` on `sn`.
    ///
    /// An empty chain yields a bare root; the binding is dropped because the
    /// root never binds.
    pub fn from_chain<'a>(
        chain: impl IntoIterator<Item = &'a PathSegment>,
        binding: Arc<EndpointBinding>,
        case: CaseSensitivity,
    ) -> Self {
        let mut tree = Self::new(case);
        let mut current = Self::ROOT;
        for segment in chain {
            current = tree.add_child(current, segment.clone(), None);
        }
        if current != Self::ROOT {
            tree.nodes[current.0].binding = Some(binding);
        }
        tree
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Node by id. Ids are only handed out by this tree, so they are always in range.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SitemapNode {
        &self.nodes[id.0]
    }

    /// Node by id, `None` for ids that belong to another tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&SitemapNode> {
        self.nodes.get(id.0)
    }

    #[inline]
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Number of nodes including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case
    }

    /// Refresh counter of the manager that built this tree (0 if built standalone).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// Number of nodes carrying a binding.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.binding.is_some()).count()
    }

    pub(crate) fn add_child(
        &mut self,
        parent: NodeId,
        segment: PathSegment,
        binding: Option<Arc<EndpointBinding>>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SitemapNode {
            segment,
            binding,
            children: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn set_binding(&mut self, id: NodeId, binding: Arc<EndpointBinding>) {
        if id != Self::ROOT {
            self.nodes[id.0].binding = Some(binding);
        }
    }

    /// Child of `parent` with the same structural identity as `segment`.
    #[must_use]
    pub fn find_child(&self, parent: NodeId, segment: &PathSegment) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.node(c).segment.structurally_eq(segment, self.case))
    }

    /// Depth below the root (root is 0).
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).parent;
        while let Some(p) = current {
            depth += 1;
            current = self.node(p).parent;
        }
        depth
    }

    /// Segments from the root down to `id`, root included.
    #[must_use]
    pub fn path_to(&self, id: NodeId) -> Vec<PathSegment> {
        let mut path = Vec::with_capacity(8);
        let mut current = Some(id);
        while let Some(n) = current {
            let node = self.node(n);
            path.push(node.segment.clone());
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// Relative URI template of a node (`/a/{id:uint}/b`).
    #[must_use]
    pub fn uri_of(&self, id: NodeId) -> UriResource {
        UriResource::from_segments(self.path_to(id))
    }

    /// Nodes in pre-order (parent before children, children in registration order).
    #[must_use]
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![Self::ROOT],
        }
    }

    /// Same shape, segments and bindings, with children compared in order.
    #[must_use]
    pub fn structurally_eq(&self, other: &SitemapTree) -> bool {
        self.nodes_eq(Self::ROOT, other, Self::ROOT)
    }

    fn nodes_eq(&self, a: NodeId, other: &SitemapTree, b: NodeId) -> bool {
        let (na, nb) = (self.node(a), other.node(b));
        let same_binding = match (&na.binding, &nb.binding) {
            (None, None) => true,
            (Some(x), Some(y)) => x.endpoint_id == y.endpoint_id && x.owner == y.owner,
            _ => false,
        };
        same_binding
            && na.segment == nb.segment
            && na.children.len() == nb.children.len()
            && na
                .children
                .iter()
                .zip(nb.children.iter())
                .all(|(&ca, &cb)| self.nodes_eq(ca, other, cb))
    }

    /// Indented text rendering, one node per line.
    ///
    /// ```text
    /// /
    ///   shop
    ///     items -> item_list (shop)
    ///       {id:uint} -> item (shop/catalog)
    /// ```
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for id in self.pre_order() {
            let node = self.node(id);
            let depth = self.depth(id);
            let label = if node.segment.is_root() {
                "/".to_string()
            } else {
                node.segment.template()
            };
            out.push_str(&format!("{:indent$}{label}", "", indent = depth * 2));
            if let Some(binding) = &node.binding {
                out.push_str(&format!(" -> {} ({})", binding.endpoint_id, binding.owner));
                if binding.include_sub_paths {
                    out.push_str(" [+sub-paths]");
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Pre-order iterator over a [`SitemapTree`].
pub struct PreOrder<'a> {
    tree: &'a SitemapTree,
    stack: Vec<NodeId>,
}

impl Iterator for PreOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::OwnerContext;
    use crate::uri::VariableKind;

    fn binding(id: &str) -> Arc<EndpointBinding> {
        Arc::new(EndpointBinding::new(id, OwnerContext::application("app")))
    }

    #[test]
    fn test_from_chain_binds_leaf() {
        let chain = [
            PathSegment::literal("a"),
            PathSegment::variable(VariableKind::UnsignedInt, "id"),
        ];
        let tree = SitemapTree::from_chain(&chain, binding("x"), CaseSensitivity::Insensitive);
        assert_eq!(tree.len(), 3);
        assert!(tree.node(tree.root()).binding().is_none());
        let leaf = tree.pre_order().last().unwrap();
        assert_eq!(tree.node(leaf).binding().unwrap().endpoint_id.as_str(), "x");
        assert_eq!(tree.uri_of(leaf).to_string(), "/a/{id:uint}");
        assert_eq!(tree.depth(leaf), 2);
    }

    #[test]
    fn test_empty_chain_never_binds_root() {
        let tree = SitemapTree::from_chain(std::iter::empty(), binding("x"), CaseSensitivity::Insensitive);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.endpoint_count(), 0);
    }

    #[test]
    fn test_pre_order_respects_registration_order() {
        let mut tree = SitemapTree::new(CaseSensitivity::Insensitive);
        let a = tree.add_child(SitemapTree::ROOT, PathSegment::literal("a"), None);
        let b = tree.add_child(SitemapTree::ROOT, PathSegment::literal("b"), None);
        let a1 = tree.add_child(a, PathSegment::literal("a1"), None);
        let order: Vec<NodeId> = tree.pre_order().collect();
        assert_eq!(order, vec![SitemapTree::ROOT, a, a1, b]);
    }

    #[test]
    fn test_find_child_uses_case_policy() {
        let mut tree = SitemapTree::new(CaseSensitivity::Insensitive);
        let a = tree.add_child(SitemapTree::ROOT, PathSegment::literal("Shop"), None);
        assert_eq!(
            tree.find_child(SitemapTree::ROOT, &PathSegment::literal("shop")),
            Some(a)
        );

        let mut strict = SitemapTree::new(CaseSensitivity::Sensitive);
        strict.add_child(SitemapTree::ROOT, PathSegment::literal("Shop"), None);
        assert!(strict
            .find_child(SitemapTree::ROOT, &PathSegment::literal("shop"))
            .is_none());
    }

    #[test]
    fn test_dump_shows_bindings() {
        let tree = SitemapTree::from_chain(
            &[PathSegment::literal("admin")],
            Arc::new(
                EndpointBinding::new("admin", OwnerContext::application("app"))
                    .include_sub_paths(true),
            ),
            CaseSensitivity::Insensitive,
        );
        assert_eq!(tree.dump(), "/\n  admin -> admin (app) [+sub-paths]\n");
    }
}

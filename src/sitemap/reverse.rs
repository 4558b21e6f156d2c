//! Reverse resolution: endpoint identity → concrete URI.

use super::node::{NodeId, SitemapTree};
use crate::endpoint::OwnerContext;
use crate::ids::EndpointId;
use crate::uri::UriResource;
use tracing::debug;

impl SitemapTree {
    /// First node in pre-order bound to `endpoint_id`, optionally restricted
    /// to an exact owner (application, and module if given).
    #[must_use]
    pub fn find_endpoint(
        &self,
        endpoint_id: &EndpointId,
        owner: Option<&OwnerContext>,
    ) -> Option<NodeId> {
        self.pre_order().find(|&id| {
            self.node(id).binding().is_some_and(|b| {
                b.endpoint_id == *endpoint_id
                    && owner.map_or(true, |o| {
                        b.is_owned_by(&o.application, o.module.as_ref())
                    })
            })
        })
    }

    /// URI of the first registration of `endpoint_id`, with `params`
    /// substituted into its variable segments.
    ///
    /// Returns `None` if the endpoint is not registered, a variable has no
    /// supplied value, or a value does not satisfy the variable's kind.
    ///
    /// # Example
    ///
    /// ```
    /// use sitemap_router::endpoint::{EndpointBinding, EndpointDescriptor, OwnerContext};
    /// use sitemap_router::ids::EndpointId;
    /// use sitemap_router::sitemap::build_sitemap;
    /// use sitemap_router::uri::{parse_path_template, CaseSensitivity};
    ///
    /// let tree = build_sitemap(
    ///     vec![EndpointDescriptor::new(
    ///         EndpointBinding::new("b", OwnerContext::application("app")),
    ///         Vec::new(),
    ///         parse_path_template("/a/{id:uint}/b").unwrap(),
    ///     )],
    ///     CaseSensitivity::Insensitive,
    /// );
    /// let uri = tree.get_uri(&EndpointId::new("b"), &[("id", "42")]).unwrap();
    /// assert_eq!(uri.to_string(), "/a/42/b");
    /// ```
    #[must_use]
    pub fn get_uri(&self, endpoint_id: &EndpointId, params: &[(&str, &str)]) -> Option<UriResource> {
        self.resolve(endpoint_id, None, params)
    }

    /// Like [`get_uri`](Self::get_uri) but only considers registrations owned
    /// by exactly `owner`.
    #[must_use]
    pub fn get_uri_for_owner(
        &self,
        endpoint_id: &EndpointId,
        owner: &OwnerContext,
        params: &[(&str, &str)],
    ) -> Option<UriResource> {
        self.resolve(endpoint_id, Some(owner), params)
    }

    fn resolve(
        &self,
        endpoint_id: &EndpointId,
        owner: Option<&OwnerContext>,
        params: &[(&str, &str)],
    ) -> Option<UriResource> {
        let Some(node) = self.find_endpoint(endpoint_id, owner) else {
            debug!(
                endpoint_id = %endpoint_id,
                owner = ?owner.map(ToString::to_string),
                "Reverse lookup for unregistered endpoint"
            );
            return None;
        };
        let template = self.uri_of(node);
        let bound = template.bind_variables(params);
        if bound.is_none() {
            debug!(
                endpoint_id = %endpoint_id,
                template = %template,
                "Reverse lookup is missing or has invalid parameter values"
            );
        }
        bound
    }
}

#[cfg(test)]
mod tests {
    use crate::endpoint::{EndpointBinding, EndpointDescriptor, OwnerContext};
    use crate::ids::EndpointId;
    use crate::sitemap::build_sitemap;
    use crate::uri::{parse_path_template, CaseSensitivity};

    fn descriptor(id: &str, owner: OwnerContext, context: &str, own: &str) -> EndpointDescriptor {
        EndpointDescriptor::new(
            EndpointBinding::new(id, owner),
            parse_path_template(context).unwrap(),
            parse_path_template(own).unwrap(),
        )
    }

    #[test]
    fn test_static_path_needs_no_params() {
        let tree = build_sitemap(
            vec![descriptor("home", OwnerContext::application("app"), "/app", "/home")],
            CaseSensitivity::Insensitive,
        );
        let uri = tree.get_uri(&EndpointId::new("home"), &[]).unwrap();
        assert_eq!(uri.to_string(), "/app/home");
    }

    #[test]
    fn test_partial_substitution_is_not_produced() {
        let tree = build_sitemap(
            vec![descriptor(
                "post",
                OwnerContext::application("app"),
                "",
                "/users/{user:uint}/posts/{post:guid}",
            )],
            CaseSensitivity::Insensitive,
        );
        let id = EndpointId::new("post");
        assert!(tree.get_uri(&id, &[("user", "1")]).is_none());
        let uri = tree
            .get_uri(
                &id,
                &[("user", "1"), ("post", "3fa85f6457174562b3fc2c963f66afa6")],
            )
            .unwrap();
        assert_eq!(uri.to_string(), "/users/1/posts/3fa85f6457174562b3fc2c963f66afa6");
    }

    #[test]
    fn test_owner_scoped_lookup() {
        let tree = build_sitemap(
            vec![
                descriptor("settings", OwnerContext::module("a", "m"), "/a/m", "/settings"),
                descriptor("settings", OwnerContext::module("b", "m"), "/b/m", "/settings"),
            ],
            CaseSensitivity::Insensitive,
        );
        let id = EndpointId::new("settings");
        assert_eq!(tree.get_uri(&id, &[]).unwrap().to_string(), "/a/m/settings");
        assert_eq!(
            tree.get_uri_for_owner(&id, &OwnerContext::module("b", "m"), &[])
                .unwrap()
                .to_string(),
            "/b/m/settings"
        );
        assert!(tree
            .get_uri_for_owner(&id, &OwnerContext::application("b"), &[])
            .is_none());
    }

    #[test]
    fn test_unknown_endpoint() {
        let tree = build_sitemap(Vec::new(), CaseSensitivity::Insensitive);
        assert!(tree.get_uri(&EndpointId::new("nope"), &[]).is_none());
    }
}

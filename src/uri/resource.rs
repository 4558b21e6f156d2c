use super::query::QueryParams;
use super::segment::PathSegment;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A URI as a sequence of path segments plus optional query and fragment.
///
/// The path always starts with [`PathSegment::Root`]; an empty path is
/// normalised to that single root segment and renders as `/`. A URI without
/// `scheme://` is relative and renders without scheme and authority.
///
/// Parsing keeps static segment text verbatim, so for any concrete URI `u`
/// `u.parse::<UriResource>()?.to_string() == u` (except `""` → `"/"`).
///
/// # Example
///
/// ```
/// use sitemap_router::uri::UriResource;
///
/// let uri: UriResource = "https://example.com/shop/items?page=2#top".parse().unwrap();
/// assert_eq!(uri.scheme(), Some("https"));
/// assert_eq!(uri.authority(), Some("example.com"));
/// assert_eq!(uri.path(), "/shop/items");
/// assert_eq!(uri.query_first("page"), Some("2"));
/// assert_eq!(uri.to_string(), "https://example.com/shop/items?page=2#top");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriResource {
    scheme: Option<String>,
    authority: Option<String>,
    segments: Vec<PathSegment>,
    query: Option<QueryParams>,
    fragment: Option<String>,
}

impl Default for UriResource {
    fn default() -> Self {
        Self::root()
    }
}

impl UriResource {
    /// The relative URI `/`.
    #[must_use]
    pub fn root() -> Self {
        Self {
            scheme: None,
            authority: None,
            segments: vec![PathSegment::Root],
            query: None,
            fragment: None,
        }
    }

    /// Relative URI from path segments; a root segment is prepended if missing.
    pub fn from_segments(segments: impl IntoIterator<Item = PathSegment>) -> Self {
        let mut uri = Self::root();
        for segment in segments {
            if !segment.is_root() {
                uri.segments.push(segment);
            }
        }
        uri
    }

    /// Parse an absolute (`scheme://authority/path`) or relative (`/path`) URI.
    pub fn parse(input: &str) -> Result<Self, UriParseError> {
        let (rest, fragment) = match input.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (input, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(QueryParams::parse(query))),
            None => (rest, None),
        };

        let (scheme, authority, path) = match rest.find("://") {
            Some(pos) if !rest[..pos].contains('/') => {
                let scheme = &rest[..pos];
                validate_scheme(scheme)?;
                let after = &rest[pos + 3..];
                let (authority, path) = match after.find('/') {
                    Some(slash) => (&after[..slash], &after[slash..]),
                    None => (after, ""),
                };
                let authority = (!authority.is_empty()).then(|| authority.to_string());
                (Some(scheme.to_string()), authority, path)
            }
            _ => (None, None, rest),
        };

        let mut segments = vec![PathSegment::Root];
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        if !trimmed.is_empty() {
            segments.extend(trimmed.split('/').map(PathSegment::literal));
        }

        Ok(Self {
            scheme,
            authority,
            segments,
            query,
            fragment,
        })
    }

    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    #[must_use]
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    #[must_use]
    pub fn query(&self) -> Option<&QueryParams> {
        self.query.as_ref()
    }

    /// `true` when there is no `scheme://` prefix.
    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.scheme.is_none()
    }

    /// All segments including the leading root.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Segments after the root.
    #[must_use]
    pub fn path_segments(&self) -> &[PathSegment] {
        &self.segments[1..]
    }

    /// Number of segments after the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len() - 1
    }

    /// First value of a query key.
    #[must_use]
    pub fn query_first(&self, key: &str) -> Option<&str> {
        self.query.as_ref().and_then(|q| q.first(key))
    }

    /// Last value of a query key.
    #[must_use]
    pub fn query_last(&self, key: &str) -> Option<&str> {
        self.query.as_ref().and_then(|q| q.last(key))
    }

    /// All values of a query key, in order.
    pub fn query_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query.iter().flat_map(move |q| q.all(key))
    }

    /// Render only the path (`/a/b`).
    #[must_use]
    pub fn path(&self) -> String {
        let mut out = String::new();
        self.write_path(&mut out);
        out
    }

    fn write_path(&self, out: &mut String) {
        if self.segments.len() == 1 {
            out.push('/');
            return;
        }
        for segment in self.path_segments() {
            out.push('/');
            out.push_str(&segment.to_string());
        }
    }

    /// Add one segment to the end of the path.
    pub fn push(&mut self, segment: PathSegment) {
        if !segment.is_root() {
            self.segments.push(segment);
        }
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn append(mut self, segment: PathSegment) -> Self {
        self.push(segment);
        self
    }

    /// Path concatenation: `self`'s path followed by `other`'s path segments.
    ///
    /// Scheme, authority, query and fragment are taken from `self`.
    #[must_use]
    pub fn concat(&self, other: &UriResource) -> Self {
        let mut uri = self.clone();
        uri.segments.extend(other.path_segments().iter().cloned());
        uri
    }

    /// Keep the first `n` segments after the root; query and fragment are dropped.
    #[must_use]
    pub fn take(&self, n: usize) -> Self {
        let keep = (n + 1).min(self.segments.len());
        Self {
            scheme: self.scheme.clone(),
            authority: self.authority.clone(),
            segments: self.segments[..keep].to_vec(),
            query: None,
            fragment: None,
        }
    }

    /// Drop the first `n` segments after the root; the result is relative.
    #[must_use]
    pub fn skip(&self, n: usize) -> Self {
        Self::from_segments(self.path_segments().iter().skip(n).cloned())
            .with_query_opt(self.query.clone())
            .with_fragment_opt(self.fragment.clone())
    }

    /// The URI one level up, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let depth = self.depth();
        (depth > 0).then(|| self.take(depth - 1))
    }

    #[must_use]
    pub fn with_query(self, query: QueryParams) -> Self {
        self.with_query_opt(Some(query))
    }

    #[must_use]
    pub fn with_fragment(self, fragment: impl Into<String>) -> Self {
        self.with_fragment_opt(Some(fragment.into()))
    }

    pub(crate) fn with_query_opt(mut self, query: Option<QueryParams>) -> Self {
        self.query = query;
        self
    }

    pub(crate) fn with_fragment_opt(mut self, fragment: Option<String>) -> Self {
        self.fragment = fragment;
        self
    }

    /// Names of the variable segments on the path, in order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(PathSegment::name)
    }

    /// Bind every variable segment from `params`.
    ///
    /// Returns `None` if any variable has no supplied value or the value is
    /// rejected by the variable's matcher. Already bound segments are rebound
    /// when a value is supplied and kept otherwise.
    #[must_use]
    pub fn bind_variables(&self, params: &[(&str, &str)]) -> Option<Self> {
        let mut segments = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            let PathSegment::Variable(var) = segment else {
                segments.push(segment.clone());
                continue;
            };
            let supplied = params
                .iter()
                .rev()
                .find(|(k, _)| *k == var.name.as_ref())
                .map(|(_, v)| *v);
            match (supplied, var.value.as_deref()) {
                (Some(value), _) if var.kind.matches(value) => segments.push(segment.bind(value)),
                (Some(_), _) => return None,
                (None, Some(_)) => segments.push(segment.clone()),
                (None, None) => return None,
            }
        }
        Some(Self {
            segments,
            ..self.clone()
        })
    }
}

fn validate_scheme(scheme: &str) -> Result<(), UriParseError> {
    let mut chars = scheme.chars();
    match chars.next() {
        None => return Err(UriParseError::EmptyScheme),
        Some(c) if !c.is_ascii_alphabetic() => {
            return Err(UriParseError::InvalidScheme {
                scheme: scheme.to_string(),
            })
        }
        Some(_) => {}
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Ok(())
    } else {
        Err(UriParseError::InvalidScheme {
            scheme: scheme.to_string(),
        })
    }
}

impl Display for UriResource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}://")?;
            if let Some(authority) = &self.authority {
                f.write_str(authority)?;
            }
        }
        let mut path = String::new();
        self.write_path(&mut path);
        f.write_str(&path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

impl FromStr for UriResource {
    type Err = UriParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for UriResource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for UriResource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<UriResource>().map_err(serde::de::Error::custom)
    }
}

/// Error raised for URIs that do not follow `scheme "://" authority? path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriParseError {
    /// `://host/path`
    EmptyScheme,
    /// Scheme must start with a letter and contain only `[A-Za-z0-9+.-]`
    InvalidScheme {
        /// The rejected scheme text
        scheme: String,
    },
}

impl Display for UriParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UriParseError::EmptyScheme => write!(f, "URI parse error: empty scheme before '://'"),
            UriParseError::InvalidScheme { scheme } => {
                write!(f, "URI parse error: invalid scheme '{scheme}'")
            }
        }
    }
}

impl std::error::Error for UriParseError {}

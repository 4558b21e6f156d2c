//! Path segments and their matchers.
//!
//! A URI path is a sequence of [`PathSegment`]s. The first segment of every
//! path is the implicit [`PathSegment::Root`]; the rest are either literal
//! [`PathSegment::Static`] text or typed [`PathSegment::Variable`] segments
//! that bind a named parameter.
//!
//! ## Template syntax
//!
//! | Template            | Segment                                   |
//! |---------------------|-------------------------------------------|
//! | `items`             | `Static("items")`                         |
//! | `{name}`            | `Variable(String, "name")`                |
//! | `{id:uint}`         | `Variable(UnsignedInt, "id")`             |
//! | `{ratio:double}`    | `Variable(Double, "ratio")`               |
//! | `{key:guid}`        | `Variable(Guid, "key")`                   |
//! | `{id:uint:Item {}}` | `Variable(UnsignedInt, "id")` + display   |
//!
//! ## Matching priority
//!
//! The sitemap tries sibling segments in registration order and never
//! backtracks, so the matchers are deliberately discriminating: `uint`
//! accepts only digits, `guid` only the two canonical hex layouts, and
//! `string` anything non-empty.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

static DOUBLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?[0-9]+(?:[,.][0-9]+)?(?:[eE][+-]?[0-9]+)?$")
        .expect("double segment regex should be valid")
});

static GUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}|[0-9a-fA-F]{32})$",
    )
    .expect("guid segment regex should be valid")
});

/// Comparison strategy for static segments.
///
/// Used both when matching request text and when deciding whether two
/// static segments are the same node during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    /// `Items` and `items` are different segments
    Sensitive,
    /// ASCII case folding; `Items` and `items` are the same segment
    #[default]
    Insensitive,
}

impl CaseSensitivity {
    /// Compare two segment texts under this strategy.
    #[inline]
    #[must_use]
    pub fn eq(self, a: &str, b: &str) -> bool {
        match self {
            CaseSensitivity::Sensitive => a == b,
            CaseSensitivity::Insensitive => a.eq_ignore_ascii_case(b),
        }
    }

    /// Parse `sensitive` / `insensitive`, defaulting to insensitive.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "sensitive" | "true" => CaseSensitivity::Sensitive,
            _ => CaseSensitivity::Insensitive,
        }
    }
}

/// Type constraint of a variable segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    /// Any non-empty segment
    String,
    /// One or more ASCII digits, no sign
    #[serde(rename = "uint")]
    UnsignedInt,
    /// Signed decimal with optional fraction and exponent
    Double,
    /// `8-4-4-4-12` hyphenated or 32 hex digits
    Guid,
}

impl VariableKind {
    /// Template keyword for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::String => "string",
            VariableKind::UnsignedInt => "uint",
            VariableKind::Double => "double",
            VariableKind::Guid => "guid",
        }
    }

    /// Check raw segment text against this kind's pattern.
    #[must_use]
    pub fn matches(self, raw: &str) -> bool {
        match self {
            VariableKind::String => !raw.is_empty(),
            VariableKind::UnsignedInt => !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()),
            VariableKind::Double => DOUBLE_REGEX.is_match(raw),
            VariableKind::Guid => GUID_REGEX.is_match(raw),
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableKind {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "string" | "str" => Ok(VariableKind::String),
            "uint" | "unsigned" | "u64" => Ok(VariableKind::UnsignedInt),
            "double" | "f64" | "float" => Ok(VariableKind::Double),
            "guid" | "uuid" => Ok(VariableKind::Guid),
            other => Err(TemplateError::UnknownKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// A typed, named variable segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSegment {
    /// Pattern the raw text must satisfy
    pub kind: VariableKind,
    /// Parameter name (e.g. `id`)
    pub name: Arc<str>,
    /// Optional display format; `{}` is replaced by the bound value
    pub display_format: Option<Arc<str>>,
    /// Bound raw value, set on copies produced by [`PathSegment::bind`]
    pub value: Option<String>,
}

/// One `/`-delimited component of a URI path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// The implicit first segment of every path
    Root,
    /// Literal text
    Static(String),
    /// Typed parameter
    Variable(VariableSegment),
}

impl PathSegment {
    /// Literal segment.
    pub fn literal(text: impl Into<String>) -> Self {
        PathSegment::Static(text.into())
    }

    /// Unbound variable segment without a display format.
    pub fn variable(kind: VariableKind, name: &str) -> Self {
        PathSegment::Variable(VariableSegment {
            kind,
            name: Arc::from(name),
            display_format: None,
            value: None,
        })
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self, PathSegment::Root)
    }

    #[inline]
    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(self, PathSegment::Variable(_))
    }

    /// Parameter name of a variable segment.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            PathSegment::Variable(v) => Some(&v.name),
            _ => None,
        }
    }

    /// Bound value of a variable segment.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            PathSegment::Variable(v) => v.value.as_deref(),
            _ => None,
        }
    }

    /// Check whether `raw` (already percent-decoded) is accepted by this segment.
    ///
    /// Root only accepts the empty text in front of the leading slash, so it
    /// never matches a request segment during a search.
    #[must_use]
    pub fn matches(&self, raw: &str, case: CaseSensitivity) -> bool {
        match self {
            PathSegment::Root => raw.is_empty(),
            PathSegment::Static(text) => case.eq(text, raw),
            PathSegment::Variable(v) => v.kind.matches(raw),
        }
    }

    /// Produce a bound copy carrying the matched `raw` text.
    ///
    /// Variables keep `raw` as their value and static segments take `raw` as
    /// their text, so a case-folded match reports the request's spelling.
    /// The root is returned unchanged.
    #[must_use]
    pub fn bind(&self, raw: &str) -> PathSegment {
        match self {
            PathSegment::Root => PathSegment::Root,
            PathSegment::Static(_) => PathSegment::Static(raw.to_string()),
            PathSegment::Variable(v) => PathSegment::Variable(VariableSegment {
                kind: v.kind,
                name: Arc::clone(&v.name),
                display_format: v.display_format.clone(),
                value: Some(raw.to_string()),
            }),
        }
    }

    /// Same variant, kind and name; bound values are ignored.
    #[must_use]
    pub fn structurally_eq(&self, other: &PathSegment, case: CaseSensitivity) -> bool {
        match (self, other) {
            (PathSegment::Root, PathSegment::Root) => true,
            (PathSegment::Static(a), PathSegment::Static(b)) => case.eq(a, b),
            (PathSegment::Variable(a), PathSegment::Variable(b)) => {
                a.kind == b.kind && a.name == b.name
            }
            _ => false,
        }
    }

    /// Human readable label, applying the display format of bound variables.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            PathSegment::Variable(VariableSegment {
                display_format: Some(format),
                value: Some(value),
                ..
            }) => format.replace("{}", value),
            other => other.to_string(),
        }
    }

    /// Template form: bound variables are rendered as their template, not their value.
    #[must_use]
    pub fn template(&self) -> String {
        match self {
            PathSegment::Root => String::new(),
            PathSegment::Static(text) => text.clone(),
            PathSegment::Variable(v) => {
                let mut out = String::with_capacity(v.name.len() + 8);
                out.push('{');
                out.push_str(&v.name);
                if v.kind != VariableKind::String || v.display_format.is_some() {
                    out.push(':');
                    out.push_str(v.kind.as_str());
                }
                if let Some(format) = &v.display_format {
                    out.push(':');
                    out.push_str(format);
                }
                out.push('}');
                out
            }
        }
    }

    /// Parse one template segment (`items`, `{id:uint}`, ...).
    pub fn parse_template(segment: &str) -> Result<PathSegment, TemplateError> {
        let Some(inner) = segment.strip_prefix('{') else {
            if segment.contains('{') || segment.contains('}') {
                return Err(TemplateError::UnbalancedBraces {
                    segment: segment.to_string(),
                });
            }
            return Ok(PathSegment::Static(segment.to_string()));
        };
        let Some(inner) = inner.strip_suffix('}') else {
            return Err(TemplateError::UnbalancedBraces {
                segment: segment.to_string(),
            });
        };

        let mut parts = inner.splitn(3, ':');
        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyName {
                segment: segment.to_string(),
            });
        }
        let kind = match parts.next() {
            Some(kind) => kind.parse::<VariableKind>()?,
            None => VariableKind::String,
        };
        let display_format = parts.next().filter(|f| !f.is_empty()).map(Arc::from);

        Ok(PathSegment::Variable(VariableSegment {
            kind,
            name: Arc::from(name),
            display_format,
            value: None,
        }))
    }
}

impl fmt::Display for PathSegment {
    /// Bound variables render their value percent-encoded; unbound ones their template.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Root => Ok(()),
            PathSegment::Static(text) => f.write_str(text),
            PathSegment::Variable(VariableSegment {
                value: Some(value), ..
            }) => f.write_str(&urlencoding::encode(value)),
            PathSegment::Variable(_) => f.write_str(&self.template()),
        }
    }
}

/// Parse a path template such as `/items/{id:uint}/edit` into segments.
///
/// The leading root is not included and empty segments are dropped, so
/// `""`, `"/"` and `"//"` all yield an empty chain.
pub fn parse_path_template(path: &str) -> Result<Vec<PathSegment>, TemplateError> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(PathSegment::parse_template)
        .collect()
}

/// Error raised for malformed path templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// `{id` or `id}` or `a{b}`
    UnbalancedBraces {
        /// The offending segment
        segment: String,
    },
    /// `{}` or `{:uint}`
    EmptyName {
        /// The offending segment
        segment: String,
    },
    /// `{id:integer}`
    UnknownKind {
        /// The unrecognised kind keyword
        kind: String,
    },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UnbalancedBraces { segment } => {
                write!(f, "path template error: unbalanced braces in segment '{segment}'")
            }
            TemplateError::EmptyName { segment } => {
                write!(f, "path template error: variable without a name in segment '{segment}'")
            }
            TemplateError::UnknownKind { kind } => {
                write!(
                    f,
                    "path template error: unknown variable kind '{kind}' \
                    (expected string, uint, double or guid)"
                )
            }
        }
    }
}

impl std::error::Error for TemplateError {}

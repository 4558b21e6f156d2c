//! # URI Module
//!
//! Value types for URIs and their path segments.
//!
//! - [`PathSegment`] - root, static and typed variable segments with their matchers
//! - [`UriResource`] - segments plus scheme, authority, query and fragment
//! - [`QueryParams`] - order-preserving query multimap
//!
//! The grammar is `scheme "://" authority? path ("?" query)? ("#" fragment)?`
//! with `path = "/" segment ("/" segment)*`. Relative references omit the
//! `scheme://authority` part. Rendering a parsed URI reproduces its input,
//! except that an empty path becomes `/`.

mod query;
mod resource;
mod segment;

pub use query::QueryParams;
pub use resource::{UriParseError, UriResource};
pub use segment::{
    parse_path_template, CaseSensitivity, PathSegment, TemplateError, VariableKind,
    VariableSegment,
};

//! Error types returned when building or querying a route table.

use thiserror::Error;

/// Errors raised while inserting into or deleting from a `Tree`.
///
/// A failed call never leaves a partially mutated tree visible to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The route pattern was empty.
    #[error("path empty")]
    EmptyPath,

    /// The route key was `0`, which is reserved for "no route".
    #[error("key empty")]
    EmptyKey,

    /// The route pattern did not start with `/`.
    #[error("path must start with /")]
    MissingLeadingSlash,

    /// A `{` in the route pattern was never closed, was empty or spanned a `/`.
    #[error("no right bracket: {0}")]
    MalformedParam(String),

    /// A `{*name}` wildcard was followed by more of the route pattern.
    #[error("wildcard must end the path: {0}")]
    WildcardNotLast(String),

    /// The same route pattern is already bound to a different key.
    #[error("path already taken")]
    PathAlreadyTaken,

    /// A parameter at the same position is already registered under another name.
    #[error("param name conflict")]
    ParamNameConflict,
}

/// Errors returned by the `Router` route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The request method has no route table.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// An empty request path or route pattern was supplied.
    #[error("path empty")]
    EmptyPath,

    /// No route matched the request path.
    #[error("path not found")]
    PathNotFound,

    /// A route matched but its handler slot is empty.
    #[error("handler not found")]
    HandlerNotFound,

    /// The underlying `Tree` rejected the change.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

//! Defines the compressed `Tree` of route patterns and its `Node` members.

use std::fmt;

use log::trace;

use crate::error::TreeError;
use crate::tree::node::Node;
use crate::tree::scan::{find_param_end, find_param_start};

pub mod node;
pub(crate) mod scan;

/// A compressed trie (radix tree) mapping route patterns to numeric keys.
///
/// Patterns are literal paths starting with `/`. A `{name}` token captures one `/` delimited
/// segment of the request path, a `{*name}` token ends the pattern and captures everything that
/// remains. A key of `0` is reserved for "no route".
///
/// `insert` and `delete` consume the `Tree` and hand back the updated value, leaving nothing
/// behind when they fail. To keep serving lookups from the current value while a change is
/// prepared, `clone` it first; the clone shares no storage with the original.
///
/// # Examples
///
/// ```rust
/// use radix_router::tree::Tree;
///
/// let tree = Tree::new()
///     .insert("/user/{id}", 1)
///     .and_then(|t| t.insert("/files/{*rest}", 2))
///     .unwrap();
///
/// let m = tree.find("/user/42").unwrap();
/// assert_eq!(m.key(), 1);
/// assert_eq!(m.param("id"), Some("42"));
///
/// let m = tree.find("/files/a/b/c").unwrap();
/// assert_eq!(m.param("*rest"), Some("a/b/c"));
///
/// assert!(tree.find("/nonexistent").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    root: Node,
}

impl Tree {
    /// Creates an empty `Tree`.
    pub fn new() -> Self {
        trace!(" creating new tree");
        Tree::default()
    }

    /// Borrow the root `Node`.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Adds the route `path`, terminating in `key`.
    ///
    /// Inserting a pattern that is already present with the same key changes nothing.
    #[must_use = "the updated tree is returned"]
    pub fn insert(mut self, path: &str, key: u64) -> Result<Tree, TreeError> {
        validate(path)?;
        validate_params(path)?;
        if key == 0 {
            return Err(TreeError::EmptyKey);
        }

        trace!(" inserting `{}` with key {}", path, key);
        self.root.insert(path, key)?;
        Ok(self)
    }

    /// Removes the route `path`. Removing a route that does not exist is not an error.
    #[must_use = "the updated tree is returned"]
    pub fn delete(mut self, path: &str) -> Result<Tree, TreeError> {
        validate(path)?;

        let fragment = self.root.path();
        if !path.starts_with(fragment) {
            return Ok(self);
        }

        trace!(" deleting `{}`", path);
        let rest = &path[fragment.len()..];
        if rest.is_empty() {
            self.root.unset_key();
        } else {
            self.root.delete(rest);
        }

        if self.root.is_empty() {
            self.root = Node::default();
        }

        Ok(self)
    }

    /// Finds the key of the route matching `path`, `0` if there is none.
    ///
    /// `emit` is called with the name and value of each captured parameter once the match is
    /// certain, innermost parameter first. Names of wildcard parameters keep their leading `*`.
    /// Values are slices of `path`.
    pub fn search<'t, 'p, F>(&'t self, path: &'p str, mut emit: F) -> u64
    where
        F: FnMut(&'t str, &'p str),
    {
        if path.is_empty() {
            return 0;
        }

        self.root.search(path, &mut emit)
    }

    /// Finds the route matching `path`, collecting parameters in path order.
    pub fn find<'t, 'p>(&'t self, path: &'p str) -> Option<Match<'t, 'p>> {
        let mut params = Vec::new();
        let key = self.search(path, |name, value| params.push((name, value)));

        if key == 0 {
            return None;
        }

        params.reverse();
        Some(Match { key, params })
    }

    /// Number of routes held.
    pub fn count(&self) -> usize {
        self.root.count()
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

fn validate(path: &str) -> Result<(), TreeError> {
    if path.is_empty() {
        return Err(TreeError::EmptyPath);
    }

    if !path.starts_with('/') {
        return Err(TreeError::MissingLeadingSlash);
    }

    Ok(())
}

fn validate_params(path: &str) -> Result<(), TreeError> {
    let mut rest = path;

    while let Some(start) = find_param_start(rest) {
        let end = find_param_end(&rest[start..])
            .ok_or_else(|| TreeError::MalformedParam(path.to_owned()))?;
        let (token, tail) = rest[start..].split_at(end);

        if token.starts_with("{*") && !tail.is_empty() {
            return Err(TreeError::WildcardNotLast(path.to_owned()));
        }
        rest = tail;
    }

    Ok(())
}

/// A successful lookup: the route key and the captured parameters in path order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'t, 'p> {
    key: u64,
    params: Vec<(&'t str, &'p str)>,
}

impl<'t, 'p> Match<'t, 'p> {
    /// The key of the matched route, never `0`.
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Captured `(name, value)` pairs, leftmost parameter first.
    pub fn params(&self) -> &[(&'t str, &'p str)] {
        &self.params
    }

    /// Value captured for parameter `name`. Wildcard names include the leading `*`.
    pub fn param(&self, name: &str) -> Option<&'p str> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }
}

//! Defines `Node` and `NodeKind` for `Tree`.

use std::fmt;
use std::mem;

use log::trace;

use crate::error::TreeError;
use crate::tree::scan::{
    find_param_end, find_param_start, find_slash_or_end, longest_common_prefix,
};

/// Indicates how a `Node` consumes bytes of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Matches its fragment byte for byte.
    Static,

    /// Matches a single `/` delimited segment and binds it to the parameter name. When the name
    /// starts with `*` the remainder of the path is bound instead, `/` characters included.
    Param,
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Static
    }
}

/// A recursive member of `Tree` holding one fragment of one or more route patterns.
///
/// Children are ordered: a `Param` child, when present, is always the first element, and no two
/// `Static` children start with the same char. This lets a lookup pick the single candidate
/// child by looking at one char of the request path.
///
/// A `Static` node without a key never has exactly one `Static` child; such chains are merged
/// into a single node as routes are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    path: String,
    children: Vec<Node>,
    key: u64,
    kind: NodeKind,
}

impl Node {
    fn param(token: &str) -> Node {
        Node {
            path: token.to_owned(),
            kind: NodeKind::Param,
            ..Node::default()
        }
    }

    fn with_path(path: &str) -> Node {
        Node {
            path: path.to_owned(),
            ..Node::default()
        }
    }

    /// The fragment this `Node` consumes. For `Param` nodes this is the whole token, braces
    /// included, e.g. `{id}`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The key stored here, `0` when no route ends at this `Node`.
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Provides the kind of fragment this `Node` represents.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Children in lookup order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The parameter name, braces stripped. Empty for `Static` nodes.
    pub fn param_name(&self) -> &str {
        match self.kind {
            NodeKind::Param => &self.path[1..self.path.len() - 1],
            NodeKind::Static => "",
        }
    }

    /// True when this is a `Param` node capturing the rest of the path.
    pub fn is_wildcard(&self) -> bool {
        self.param_name().starts_with('*')
    }

    /// True when the node carries neither a key nor children.
    pub fn is_empty(&self) -> bool {
        self.key == 0 && self.children.is_empty()
    }

    /// Number of routes ending at this `Node` or below it.
    pub fn count(&self) -> usize {
        let own = if self.key != 0 { 1 } else { 0 };
        own + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Adds `path` below this node, ending in `key`.
    ///
    /// `path` is relative to the parent of this node, i.e. it still starts with the bytes this
    /// node consumes.
    pub(crate) fn insert(&mut self, path: &str, key: u64) -> Result<(), TreeError> {
        if path.is_empty() {
            return Err(TreeError::EmptyPath);
        }
        if key == 0 {
            return Err(TreeError::EmptyKey);
        }

        if self.path.is_empty() {
            return self.insert_fresh(path, key);
        }

        if self.kind == NodeKind::Static && self.path == path {
            return self.assign_key(key);
        }

        let mut path = path;

        let i = longest_common_prefix(path, &self.path);
        if i > 0 {
            if self.path.len() > i {
                self.split(i);
            }

            path = &path[i..];
            if path.is_empty() {
                return self.assign_key(key);
            }

            if find_param_start(path) == Some(0) {
                return self.insert_param(path, key);
            }
        }

        let first_static = self.first_static();
        for child in self.children[first_static..].iter_mut() {
            let prefix = longest_common_prefix(path, &child.path);
            if prefix == 0 {
                continue;
            }

            if child.path.len() > prefix {
                child.split(prefix);
            }

            return child.insert(path, key);
        }

        match find_param_start(path) {
            Some(0) => self.insert_param(path, key),
            Some(start) => {
                let mut child = Node::with_path(&path[..start]);
                child.insert_param(&path[start..], key)?;
                self.add_static_child(child);
                Ok(())
            }
            None => {
                let mut child = Node::with_path(path);
                child.key = key;
                self.add_static_child(child);
                Ok(())
            }
        }
    }

    fn insert_fresh(&mut self, path: &str, key: u64) -> Result<(), TreeError> {
        if let Some(start) = find_param_start(path) {
            if find_param_end(&path[start..]).is_none() {
                return Err(TreeError::MalformedParam(path.to_owned()));
            }

            self.path = path[..start].to_owned();
            return self.insert_param(&path[start..], key);
        }

        self.assign_key(key)?;
        self.path = path.to_owned();
        Ok(())
    }

    /// Merges `path`, which starts with a `{` token, into the parameter slot of this node.
    fn insert_param(&mut self, path: &str, key: u64) -> Result<(), TreeError> {
        let end =
            find_param_end(path).ok_or_else(|| TreeError::MalformedParam(path.to_owned()))?;
        let (token, rest) = path.split_at(end);

        if self.first_static() == 1 {
            if self.children[0].path != token {
                return Err(TreeError::ParamNameConflict);
            }
        } else {
            trace!(" adding param `{}` below `{}`", token, self.path);
            self.children.insert(0, Node::param(token));
        }

        let param = &mut self.children[0];
        if rest.is_empty() {
            param.assign_key(key)
        } else {
            param.insert(rest, key)
        }
    }

    fn assign_key(&mut self, key: u64) -> Result<(), TreeError> {
        if self.key != 0 && self.key != key {
            return Err(TreeError::PathAlreadyTaken);
        }

        self.key = key;
        Ok(())
    }

    /// Cuts the fragment at `at`; this node keeps the head and a single child takes over the
    /// tail along with the key, kind and children.
    fn split(&mut self, at: usize) {
        let tail = self.path.split_off(at);
        trace!(" splitting `{}` from `{}`", tail, self.path);

        let child = Node {
            path: tail,
            children: mem::take(&mut self.children),
            key: mem::take(&mut self.key),
            kind: self.kind,
        };

        self.kind = NodeKind::Static;
        self.children = vec![child];
    }

    fn first_static(&self) -> usize {
        match self.children.first() {
            Some(child) if child.kind == NodeKind::Param => 1,
            _ => 0,
        }
    }

    fn add_static_child(&mut self, child: Node) {
        trace!(" adding child `{}` to `{}`", child.path, self.path);
        let at = self.first_static();
        self.children.insert(at, child);
    }

    /// Removes the route `path`, relative to the end of this node's fragment.
    ///
    /// Unknown paths are ignored.
    pub(crate) fn delete(&mut self, path: &str) {
        let mut remove = None;

        for (i, child) in self.children.iter_mut().enumerate() {
            if !path.starts_with(child.path.as_str()) {
                continue;
            }

            if path.len() == child.path.len() {
                if child.children.is_empty() {
                    remove = Some(i);
                } else {
                    child.unset_key();
                }
            } else {
                child.delete(&path[child.path.len()..]);
                if child.is_empty() {
                    remove = Some(i);
                }
            }

            break;
        }

        if let Some(i) = remove {
            let child = self.children.remove(i);
            trace!(" removed child `{}` from `{}`", child.path, self.path);
        }

        self.compact();
    }

    /// Clears the key of this node, keeping any descendants.
    pub(crate) fn unset_key(&mut self) {
        self.key = 0;
        self.compact();
    }

    /// Absorbs the only child of a keyless `Static` node.
    fn compact(&mut self) {
        if self.kind != NodeKind::Static || self.key != 0 || self.children.len() != 1 {
            return;
        }

        if self.children[0].kind == NodeKind::Param {
            return;
        }

        if let Some(child) = self.children.pop() {
            trace!(" merging `{}` into `{}`", child.path, self.path);
            self.path.push_str(&child.path);
            self.key = child.key;
            self.children = child.children;
        }
    }

    /// Finds the key of the route matching `path`, which must start with the bytes this node
    /// consumes.
    ///
    /// `emit` receives every captured parameter once a match is certain, innermost first.
    /// Nothing is emitted when `0` is returned.
    pub(crate) fn search<'t, 'p, F>(&'t self, path: &'p str, emit: &mut F) -> u64
    where
        F: FnMut(&'t str, &'p str),
    {
        match self.kind {
            NodeKind::Static => self.search_static(path, emit),
            NodeKind::Param => self.search_param(path, emit),
        }
    }

    fn search_static<'t, 'p, F>(&'t self, path: &'p str, emit: &mut F) -> u64
    where
        F: FnMut(&'t str, &'p str),
    {
        if path.len() > self.path.len() {
            if self.children.is_empty() || !path.starts_with(self.path.as_str()) {
                return 0;
            }

            self.search_children(&path[self.path.len()..], emit)
        } else if path == self.path {
            self.key
        } else {
            0
        }
    }

    fn search_param<'t, 'p, F>(&'t self, path: &'p str, emit: &mut F) -> u64
    where
        F: FnMut(&'t str, &'p str),
    {
        let name = self.param_name();

        if self.is_wildcard() {
            if path.is_empty() || self.key == 0 {
                return 0;
            }

            emit(name, path);
            return self.key;
        }

        let end = find_slash_or_end(path);
        if end == 0 {
            return 0;
        }

        let (value, rest) = path.split_at(end);
        if rest.is_empty() {
            if self.key != 0 {
                emit(name, value);
            }
            return self.key;
        }

        if self.children.is_empty() {
            return 0;
        }

        let key = self.search_children(rest, emit);
        if key != 0 {
            emit(name, value);
        }
        key
    }

    /// Descends into the one `Static` child sharing the first char of `path`, falling back to
    /// the `Param` child. `path` must not be empty.
    fn search_children<'t, 'p, F>(&'t self, path: &'p str, emit: &mut F) -> u64
    where
        F: FnMut(&'t str, &'p str),
    {
        let first = path.chars().next();

        let (param, statics) = match self.children.split_first() {
            Some((child, rest)) if child.kind == NodeKind::Param => (Some(child), rest),
            _ => (None, &self.children[..]),
        };

        if let Some(child) = statics
            .iter()
            .find(|c| c.path.chars().next() == first)
        {
            let key = child.search(path, emit);
            if key != 0 {
                return key;
            }
        }

        match param {
            Some(child) => child.search(path, emit),
            None => 0,
        }
    }
}

/// Renders the subtree one fragment per line, e.g.
///
/// ```plain
/// /f
///  ├oo=1
///  └aa=2
/// ```
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str("/")?;
        } else {
            f.write_str(&self.path)?;
        }

        if self.key != 0 {
            write!(f, "={}", self.key)?;
        }

        if !self.children.is_empty() {
            f.write_str("\n")?;
        }

        // One column per char, so multi-byte fragments stay aligned.
        let indent = " ".repeat(self.path.chars().count().saturating_sub(1));
        let last = self.children.len().saturating_sub(1);

        for (i, child) in self.children.iter().enumerate() {
            let (head, tail) = if i == last { ("└", " ") } else { ("├", "|") };
            let rendered = child.to_string();

            for (j, line) in rendered.split('\n').filter(|l| !l.is_empty()).enumerate() {
                let marker = if j == 0 { head } else { tail };
                writeln!(f, "{}{}{}", indent, marker, line)?;
            }
        }

        Ok(())
    }
}

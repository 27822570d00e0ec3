//! Defines `Params`, the owned parameter values captured while routing a request.

use std::ops::Index;

/// A single captured parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name as written in the route pattern, without braces. Wildcard names keep their
    /// leading `*`.
    pub key: String,

    /// The captured part of the request path.
    pub value: String,
}

/// Parameters captured for a matched route, leftmost first.
///
/// # Examples
///
/// ```rust
/// use radix_router::params::Params;
///
/// let mut params = Params::new();
/// params.set("id", "42");
/// params.set("*rest", "a/b");
///
/// assert_eq!(params.get("id"), Some("42"));
/// assert_eq!(&params["*rest"], "a/b");
/// assert_eq!(params.get("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    params: Vec<Param>,
}

impl Params {
    /// Creates an empty `Params`.
    pub fn new() -> Self {
        Params::default()
    }

    /// Value of the first parameter called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key == name)
            .map(|p| p.value.as_str())
    }

    /// Replaces the value of `name`, appending it when absent. An empty `value` removes the
    /// parameter.
    pub fn set(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            self.params.retain(|p| p.key != name);
            return;
        }

        match self.params.iter_mut().find(|p| p.key == name) {
            Some(p) => p.value = value.to_owned(),
            None => self.push(name, value),
        }
    }

    pub(crate) fn push(&mut self, name: &str, value: &str) {
        self.params.push(Param {
            key: name.to_owned(),
            value: value.to_owned(),
        });
    }

    pub(crate) fn reverse(&mut self) {
        self.params.reverse();
    }

    /// Iterates the parameters, leftmost first.
    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.params.iter()
    }

    /// Number of captured parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl Index<&str> for Params {
    type Output = str;

    /// Panics when `name` was not captured; use `get` for a fallible lookup.
    fn index(&self, name: &str) -> &str {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no parameter named `{}`", name),
        }
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_tests() {
        let mut params = Params::new();
        assert!(params.is_empty());

        params.set("a", "1");
        params.set("b", "2");
        params.set("a", "3");

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a"), Some("3"));
        assert_eq!(params.get("b"), Some("2"));
        assert_eq!(
            params.iter().map(|p| p.key.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn set_empty_removes_tests() {
        let mut params = Params::new();
        params.set("a", "1");
        params.set("b", "2");
        params.set("a", "");

        assert_eq!(params.get("a"), None);
        assert_eq!(params.len(), 1);

        params.set("missing", "");
        assert_eq!(params.len(), 1);
    }

    #[test]
    #[should_panic(expected = "no parameter named `nope`")]
    fn index_missing_panics_tests() {
        let params = Params::new();
        let _ = &params["nope"];
    }
}

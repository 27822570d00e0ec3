//! Defines the `Router`, a per-method table of route trees with lock-free lookups.

pub mod handlers;
pub mod method;

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use arc_swap::ArcSwap;
use log::{debug, trace};

use crate::error::{RouterError, TreeError};
use crate::params::Params;
use crate::tree::Tree;

use self::handlers::HandlerRegistry;
use self::method::{ANY_SLOT, SLOTS};

pub use self::handlers::HandlerId;
pub use self::method::ANY;

/// Responsible for resolving a `(method, path)` pair to a registered handler and the parameters
/// captured from the path.
///
/// Every method owns a `Tree`. Lookups read the currently published tree without taking a lock.
/// Changes are serialized: the writer clones the published tree, applies the change to the
/// clone and publishes the result in a single atomic swap, so a lookup observes either the old
/// or the new table, never a partially updated one. A failed change publishes nothing.
///
/// Routes registered for the `ANY` pseudo-method answer every method that has no matching
/// route of its own.
///
/// # Examples
///
/// ```rust
/// use radix_router::router::{Router, ANY};
///
/// let router = Router::new();
/// router.register("GET", "/user/{id}", "show user").unwrap();
/// router.register(ANY, "/static/{*path}", "serve file").unwrap();
///
/// let m = router.route("GET", "/user/42").unwrap();
/// assert_eq!(*m.handler(), "show user");
/// assert_eq!(m.params().get("id"), Some("42"));
///
/// let m = router.route("POST", "/static/css/site.css").unwrap();
/// assert_eq!(*m.handler(), "serve file");
/// assert_eq!(m.params().get("*path"), Some("css/site.css"));
/// ```
pub struct Router<H> {
    trees: Vec<ArcSwap<Tree>>,
    handlers: RwLock<HandlerRegistry<H>>,
    writer: Mutex<()>,
}

/// The outcome of a successful `Router::route` call.
#[derive(Debug, Clone)]
pub struct RouteMatch<H> {
    id: HandlerId,
    handler: H,
    params: Params,
}

impl<H> RouteMatch<H> {
    /// Id of the matched handler.
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Borrow the matched handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Parameters captured from the request path, leftmost first.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Splits the match into the handler and the captured parameters.
    pub fn into_parts(self) -> (H, Params) {
        (self.handler, self.params)
    }
}

impl<H> Router<H>
where
    H: Clone,
{
    /// Creates a `Router` without routes or handlers.
    pub fn new() -> Self {
        Router {
            trees: (0..SLOTS)
                .map(|_| ArcSwap::from_pointee(Tree::new()))
                .collect(),
            handlers: RwLock::new(HandlerRegistry::new()),
            writer: Mutex::new(()),
        }
    }

    /// Stores `handler` and returns the id routes use to refer to it.
    pub fn add_handler(&self, handler: H) -> HandlerId {
        let id = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(handler);

        debug!(" registered handler {}", id);
        id
    }

    /// Releases the slot of `id` for reuse. Routes still pointing at `id` stop resolving to a
    /// handler until the slot is filled again.
    pub fn remove_handler(&self, id: HandlerId) -> Option<H> {
        let handler = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);

        if handler.is_some() {
            debug!(" released handler {}", id);
        }
        handler
    }

    /// The handler stored under `id`.
    pub fn handler(&self, id: HandlerId) -> Option<H> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Routes `method` requests for `path` to the handler `id`.
    pub fn add(&self, method: &str, path: &str, id: HandlerId) -> Result<(), RouterError> {
        self.update(method, path, |tree| tree.insert(path, id.key()))?;
        debug!(" added route {} {} -> {}", method, path, id);
        Ok(())
    }

    /// Stores `handler` and routes `method` requests for `path` to it. The handler is released
    /// again when the route cannot be added.
    pub fn register(&self, method: &str, path: &str, handler: H) -> Result<HandlerId, RouterError> {
        let id = self.add_handler(handler);

        if let Err(e) = self.add(method, path, id) {
            self.remove_handler(id);
            return Err(e);
        }

        Ok(id)
    }

    /// Removes the route for `method` and `path`. Removing an unknown route is not an error.
    pub fn remove(&self, method: &str, path: &str) -> Result<(), RouterError> {
        self.update(method, path, |tree| tree.delete(path))?;
        debug!(" removed route {} {}", method, path);
        Ok(())
    }

    fn update<F>(&self, method: &str, path: &str, change: F) -> Result<(), RouterError>
    where
        F: FnOnce(Tree) -> Result<Tree, TreeError>,
    {
        let slot = method::slot(method).ok_or(RouterError::MethodNotAllowed)?;
        if path.is_empty() {
            return Err(RouterError::EmptyPath);
        }

        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.trees[slot].load_full();
        let updated = change(Tree::clone(&current))?;
        self.trees[slot].store(Arc::new(updated));

        Ok(())
    }

    /// Resolves a request to the id of its handler and the parameters captured from `path`.
    pub fn lookup(&self, method: &str, path: &str) -> Result<(HandlerId, Params), RouterError> {
        let slot = method::slot(method).ok_or(RouterError::MethodNotAllowed)?;
        if path.is_empty() {
            return Err(RouterError::EmptyPath);
        }

        let mut params = Params::new();
        let mut key = self.search(slot, path, &mut params);

        if key == 0 && slot != ANY_SLOT {
            trace!(" no {} route for `{}`, trying {}", method, path, ANY);
            key = self.search(ANY_SLOT, path, &mut params);
        }

        if key == 0 {
            return Err(RouterError::PathNotFound);
        }

        params.reverse();
        Ok((HandlerId::from(key), params))
    }

    /// Resolves a request to its handler and the parameters captured from `path`.
    pub fn route(&self, method: &str, path: &str) -> Result<RouteMatch<H>, RouterError> {
        let (id, params) = self.lookup(method, path)?;
        let handler = self.handler(id).ok_or(RouterError::HandlerNotFound)?;

        Ok(RouteMatch {
            id,
            handler,
            params,
        })
    }

    /// Resolves a request to its handler alone.
    pub fn find(&self, method: &str, path: &str) -> Result<H, RouterError> {
        self.route(method, path).map(|m| m.handler)
    }

    fn search(&self, slot: usize, path: &str, params: &mut Params) -> u64 {
        let tree = self.trees[slot].load();
        tree.search(path, |name, value| params.push(name, value))
    }

    /// Total number of routes over all methods.
    pub fn count(&self) -> usize {
        self.trees.iter().map(|t| t.load().count()).sum()
    }

    /// Snapshot of the tree currently serving `method`, for inspection.
    pub fn tree(&self, method: &str) -> Option<Arc<Tree>> {
        method::slot(method).map(|slot| self.trees[slot].load_full())
    }
}

impl<H> Default for Router<H>
where
    H: Clone,
{
    fn default() -> Self {
        Router::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    #[test]
    fn add_validation_tests() {
        let router: Router<&str> = Router::new();
        let id = HandlerId::from(123);

        assert_eq!(router.add("", "/a", id), Err(RouterError::MethodNotAllowed));
        assert_eq!(
            router.add("unsupported", "/a", id),
            Err(RouterError::MethodNotAllowed)
        );
        assert_eq!(router.add("POST", "", id), Err(RouterError::EmptyPath));
        assert_eq!(
            router.add("POST", "apath", id),
            Err(RouterError::Tree(TreeError::MissingLeadingSlash))
        );
        assert_eq!(router.count(), 0);
    }

    #[test]
    fn route_per_method_tests() {
        let router = Router::new();
        let methods = [
            "GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "CONNECT", "OPTIONS", "TRACE",
        ];

        for method in methods.iter() {
            let lower = method.to_lowercase();
            router
                .register(method, &format!("/{}0", lower), format!("{} 0", method))
                .unwrap();
            router
                .register(method, &format!("/{}1/{{param}}", lower), format!("{} 1", method))
                .unwrap();
        }
        assert_eq!(router.count(), methods.len() * 2);

        for method in methods.iter() {
            let lower = method.to_lowercase();

            let m = router.route(method, &format!("/{}0", lower)).unwrap();
            assert_eq!(m.handler(), &format!("{} 0", method));
            assert!(m.params().is_empty());

            let m = router.route(method, &format!("/{}1/value", lower)).unwrap();
            assert_eq!(m.handler(), &format!("{} 1", method));
            assert_eq!(m.params().get("param"), Some("value"));

            assert_eq!(
                router.route(method, "/unknown").unwrap_err(),
                RouterError::PathNotFound
            );
        }

        // Routes of one method are invisible to the others.
        assert_eq!(
            router.route("POST", "/get0").unwrap_err(),
            RouterError::PathNotFound
        );
    }

    #[test]
    fn any_fallback_tests() {
        let router = Router::new();
        router.register("GET", "/thing", "get thing").unwrap();
        router.register(ANY, "/thing", "any thing").unwrap();
        router.register(ANY, "/{*path}", "catch all").unwrap();

        assert_eq!(*router.route("GET", "/thing").unwrap().handler(), "get thing");
        assert_eq!(*router.route("PUT", "/thing").unwrap().handler(), "any thing");
        assert_eq!(*router.route(ANY, "/thing").unwrap().handler(), "any thing");

        let m = router.route("DELETE", "/a/b").unwrap();
        assert_eq!(*m.handler(), "catch all");
        assert_eq!(m.params().get("*path"), Some("a/b"));
    }

    #[test]
    fn lookup_errors_tests() {
        let router: Router<&str> = Router::new();

        assert_eq!(
            router.lookup("BREW", "/pot").unwrap_err(),
            RouterError::MethodNotAllowed
        );
        assert_eq!(router.lookup("GET", "").unwrap_err(), RouterError::EmptyPath);
        assert_eq!(
            router.lookup("GET", "/pot").unwrap_err(),
            RouterError::PathNotFound
        );
        assert_eq!(router.find("GET", "/pot"), Err(RouterError::PathNotFound));
    }

    #[test]
    fn wildcard_beside_static_tests() {
        for order in &[[0usize, 1], [1, 0]] {
            let routes = [("/api/{*path}", "wildcard"), ("/api/v1/foo/bar", "static")];
            let router = Router::new();
            for &i in order.iter() {
                router.register(ANY, routes[i].0, routes[i].1).unwrap();
            }

            assert_eq!(router.find("POST", "/api/v1/foo/bar"), Ok("static"));

            let m = router.route("POST", "/api/something/else").unwrap();
            assert_eq!(*m.handler(), "wildcard");
            assert_eq!(m.params().get("*path"), Some("something/else"));

            let m = router.route("GET", "/api/v1/foo/baz").unwrap();
            assert_eq!(*m.handler(), "wildcard");
            assert_eq!(m.params().get("*path"), Some("v1/foo/baz"));
        }
    }

    #[test]
    fn handler_registry_tests() {
        let router = Router::new();

        let h1 = router.add_handler("one");
        let h2 = router.add_handler("two");
        let h3 = router.add_handler("three");
        assert_eq!((h1.key(), h2.key(), h3.key()), (1, 2, 3));

        router.add("GET", "/two", h2).unwrap();
        assert_eq!(router.remove_handler(h2), Some("two"));
        assert_eq!(
            router.route("GET", "/two").unwrap_err(),
            RouterError::HandlerNotFound
        );

        let (id, _) = router.lookup("GET", "/two").unwrap();
        assert_eq!(id, h2);

        assert_eq!(router.add_handler("four"), h2);
        assert_eq!(*router.route("GET", "/two").unwrap().handler(), "four");
    }

    #[test]
    fn register_failure_releases_handler_tests() {
        let router = Router::new();
        let first = router.register("GET", "/a", "first").unwrap();

        assert_eq!(
            router.register("GET", "/a", "second"),
            Err(RouterError::Tree(TreeError::PathAlreadyTaken))
        );
        assert_eq!(
            router.register("GET", "/a/{x", "third"),
            Err(RouterError::Tree(TreeError::MalformedParam("/a/{x".to_owned())))
        );

        // The slots taken by the failed registrations were released again.
        let next = router.add_handler("next");
        assert_eq!(next.key(), first.key() + 1);
        assert_eq!(*router.route("GET", "/a").unwrap().handler(), "first");
    }

    #[test]
    fn remove_tests() {
        let router = Router::new();
        router.register("GET", "/a/{x}", "a").unwrap();
        router.register("GET", "/b", "b").unwrap();

        router.remove("GET", "/a/{x}").unwrap();
        router.remove("GET", "/does/not/exist").unwrap();

        assert_eq!(
            router.route("GET", "/a/1").unwrap_err(),
            RouterError::PathNotFound
        );
        assert_eq!(*router.route("GET", "/b").unwrap().handler(), "b");
        assert_eq!(router.count(), 1);

        assert_eq!(
            router.remove("BREW", "/b"),
            Err(RouterError::MethodNotAllowed)
        );
        assert_eq!(router.remove("GET", ""), Err(RouterError::EmptyPath));
    }

    #[test]
    fn published_snapshot_is_immutable_tests() {
        let router = Router::new();
        router.register("GET", "/a", "a").unwrap();

        let snapshot = router.tree("GET").unwrap();
        router.register("GET", "/b", "b").unwrap();
        router.remove("GET", "/a").unwrap();

        assert_eq!(snapshot.count(), 1);
        assert_eq!(snapshot.search("/a", |_, _| {}), 1);
        assert_eq!(snapshot.search("/b", |_, _| {}), 0);
        assert!(router.tree("BREW").is_none());
    }

    #[test]
    fn concurrent_lookup_tests() {
        let router = Arc::new(Router::new());
        router.register("GET", "/stable/{id}", "stable").unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let router = router.clone();
                let done = done.clone();
                thread::spawn(move || {
                    let mut lookups = 0;
                    while !done.load(Ordering::Acquire) || lookups == 0 {
                        let m = router.route("GET", "/stable/7").unwrap();
                        assert_eq!(*m.handler(), "stable");
                        assert_eq!(m.params().get("id"), Some("7"));
                        lookups += 1;
                    }
                })
            })
            .collect();

        for i in 0..200 {
            let path = format!("/churn/{}", i);
            router.register("GET", &path, "churn").unwrap();
            if i % 2 == 0 {
                router.remove("GET", &path).unwrap();
            }
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(router.count(), 101);
    }
}

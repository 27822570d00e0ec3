//! Defines the `RouterService` type which is used to serve a `Router` with Hyper.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::{BoxFuture, FutureExt};
use hyper::service::Service;
use hyper::{Body, Request, Response, StatusCode};
use log::debug;
use percent_encoding::percent_decode_str;

use crate::error::RouterError;
use crate::params::Params;
use crate::router::{HandlerId, Router};

/// The future returned by a `Handler`.
pub type HandlerFuture = BoxFuture<'static, Response<Body>>;

/// A shared, type erased `Handler`, as stored in the `Router` served by `RouterService`.
pub type BoxHandler = Arc<dyn Handler>;

/// Produces the response for a routed request.
///
/// Implemented for every `Fn(Request<Body>, Params) -> impl Future<Output = Response<Body>>`
/// closure, so plain `async fn`s can be registered directly.
///
/// The id of the matched handler is available from the request extensions as a `HandlerId`.
pub trait Handler: Send + Sync + 'static {
    /// Handles `req`, which matched a route that captured `params`.
    fn handle(&self, req: Request<Body>, params: Params) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request<Body>, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response<Body>> + Send + 'static,
{
    fn handle(&self, req: Request<Body>, params: Params) -> HandlerFuture {
        (self)(req, params).boxed()
    }
}

/// Wraps a `Router` of `BoxHandler` values and dispatches incoming requests to them.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use hyper::{Body, Request, Response};
/// use radix_router::params::Params;
/// use radix_router::router::Router;
/// use radix_router::service::{BoxHandler, RouterService};
///
/// async fn hello(_req: Request<Body>, params: Params) -> Response<Body> {
///     Response::new(Body::from(format!("hello {}", &params["name"])))
/// }
///
/// let router = Router::new();
/// let handler: BoxHandler = Arc::new(hello);
/// router.register("GET", "/hello/{name}", handler).unwrap();
///
/// let service = RouterService::new(Arc::new(router));
/// # drop(service);
/// ```
#[derive(Clone)]
pub struct RouterService {
    router: Arc<Router<BoxHandler>>,
    not_found: BoxHandler,
    method_not_allowed: BoxHandler,
    global: Option<BoxHandler>,
}

impl RouterService {
    /// Creates a `RouterService` answering unrouted requests with empty `404 Not Found` and
    /// `405 Method Not Allowed` responses.
    pub fn new(router: Arc<Router<BoxHandler>>) -> Self {
        RouterService {
            router,
            not_found: Arc::new(status_handler(StatusCode::NOT_FOUND)),
            method_not_allowed: Arc::new(status_handler(StatusCode::METHOD_NOT_ALLOWED)),
            global: None,
        }
    }

    /// Replaces the handler invoked when no route matches the request path.
    pub fn with_not_found<H>(mut self, handler: H) -> Self
    where
        H: Handler,
    {
        self.not_found = Arc::new(handler);
        self
    }

    /// Replaces the handler invoked for request methods the router does not support.
    pub fn with_method_not_allowed<H>(mut self, handler: H) -> Self
    where
        H: Handler,
    {
        self.method_not_allowed = Arc::new(handler);
        self
    }

    /// Sets the handler invoked for matched routes whose handler id has no stored handler.
    pub fn with_global_handler<H>(mut self, handler: H) -> Self
    where
        H: Handler,
    {
        self.global = Some(Arc::new(handler));
        self
    }

    /// Borrow the served `Router`, e.g. to change routes while serving.
    pub fn router(&self) -> &Arc<Router<BoxHandler>> {
        &self.router
    }

    fn dispatch(&self, mut req: Request<Body>) -> HandlerFuture {
        let path = match percent_decode_str(req.uri().path()).decode_utf8() {
            Ok(path) => path.into_owned(),
            Err(_) => {
                debug!(" [{}] invalid request path: {}", req.method(), req.uri().path());
                return status_response(StatusCode::BAD_REQUEST).boxed();
            }
        };

        let (id, params) = match self.router.lookup(req.method().as_str(), &path) {
            Ok(found) => found,
            Err(RouterError::MethodNotAllowed) => {
                debug!(" [{}] method not allowed: {}", req.method(), path);
                return self.method_not_allowed.handle(req, Params::new());
            }
            Err(e) => {
                debug!(" [{}] {}: {}", req.method(), e, path);
                return self.not_found.handle(req, Params::new());
            }
        };

        let handler = match self.router.handler(id).or_else(|| self.global.clone()) {
            Some(handler) => handler,
            None => {
                debug!(" [{}] no handler {} for {}", req.method(), id, path);
                return self.not_found.handle(req, Params::new());
            }
        };

        debug!(" [{}] {} dispatched to handler {}", req.method(), path, id);
        req.extensions_mut().insert::<HandlerId>(id);
        handler.handle(req, params)
    }
}

impl Service<Request<Body>> for RouterService {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response<Body>, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        self.dispatch(req).map(Ok).boxed()
    }
}

fn status_handler(
    status: StatusCode,
) -> impl Fn(Request<Body>, Params) -> BoxFuture<'static, Response<Body>> + Send + Sync + 'static {
    move |_, _| status_response(status).boxed()
}

async fn status_response(status: StatusCode) -> Response<Body> {
    let mut res = Response::new(Body::empty());
    *res.status_mut() = status;
    res
}

//! radix_router &ndash; a compressed-trie request router with named parameters and wildcards.
//!
//! Routes are literal paths which may contain `{name}` tokens, each capturing a single `/`
//! delimited segment, and a trailing `{*name}` token capturing the rest of the path. The
//! `tree` module holds the matching engine, `router` keeps one tree per HTTP method and
//! `service` serves a `Router` with Hyper.
#![warn(missing_docs, deprecated)]
#![doc(test(no_crate_inject, attr(deny(warnings))))]

pub mod error;
pub mod params;
pub mod router;
pub mod service;
pub mod start;
pub mod tree;

pub use error::{RouterError, TreeError};
pub use params::{Param, Params};
pub use router::{HandlerId, RouteMatch, Router};
pub use service::{BoxHandler, Handler, HandlerFuture, RouterService};
pub use start::{bind_server, init_server, start, start_with_num_threads, StartError};
pub use tree::Tree;

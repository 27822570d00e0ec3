//! Functions for serving a `RouterService` over plain HTTP.

use std::io;
use std::net::ToSocketAddrs;

use hyper::server::conn::Http;
use log::{debug, error, info};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::runtime::{self, Runtime};

use crate::service::RouterService;

/// Error which can occur when attempting to start a server.
#[derive(Error, Debug)]
pub enum StartError {
    /// I/O error while building the runtime or binding the listener.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Starts serving `service` on `addr`, with one worker thread per CPU.
pub fn start<A>(addr: A, service: RouterService) -> Result<(), StartError>
where
    A: ToSocketAddrs + 'static + Send,
{
    start_with_num_threads(addr, service, num_cpus::get())
}

/// Starts serving `service` on `addr` with a designated number of worker threads.
pub fn start_with_num_threads<A>(
    addr: A,
    service: RouterService,
    threads: usize,
) -> Result<(), StartError>
where
    A: ToSocketAddrs + 'static + Send,
{
    let runtime = new_runtime(threads)?;
    runtime.block_on(init_server(addr, service))
}

/// Binds `addr` and serves `service` on it until the future is dropped.
///
/// Exposed for callers that drive their own runtime or need to handle shutdown themselves.
pub async fn init_server<A>(addr: A, service: RouterService) -> Result<(), StartError>
where
    A: ToSocketAddrs + 'static + Send,
{
    let listener = tcp_listener(addr).await?;
    let addr = listener.local_addr()?;

    info! {
        target: "radix_router::start",
        " radix_router listening on http://{}", addr
    }

    bind_server(listener, service).await
}

/// Accepts connections from `listener` and serves each on its own task.
pub async fn bind_server(listener: TcpListener, service: RouterService) -> ! {
    let protocol = Http::new();

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(" socket error: {}", e);
                continue;
            }
        };

        let connection = protocol.serve_connection(socket, service.clone());
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!(" connection from {} closed with error: {}", peer, e);
            }
        });
    }
}

fn new_runtime(threads: usize) -> io::Result<Runtime> {
    runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .thread_name("radix-router-worker")
        .enable_all()
        .build()
}

async fn tcp_listener<A>(addr: A) -> io::Result<TcpListener>
where
    A: ToSocketAddrs + 'static,
{
    let addr = addr.to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(io::ErrorKind::Other, "unable to resolve listener address")
    })?;

    TcpListener::bind(addr).await
}

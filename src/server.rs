use crate::{router, store::FlowStore};

use alloc::sync::Arc;
use core::{convert::Infallible, future::Future};
use futures_util::FutureExt;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use std::io;
use tokio::net::TcpListener;

/// Serves HTTP/1 connections from `tcp` until `stop` resolves. Each connection runs on its own task,
/// and failed accepts are logged and skipped.
pub async fn serve<F>(tcp: TcpListener, store: Arc<dyn FlowStore>, stop: F) -> io::Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    let http = http1::Builder::new();
    let mut stop = core::pin::pin!(stop);
    loop {
        let res = tokio::select! {
            accept_res = tcp.accept() => accept_res,
            stop_res = &mut stop => break stop_res,
        };

        let (stream, other) = match res {
            Ok(pair) => pair,
            Err(err) => {
                log::error!("{err:?}");
                continue;
            }
        };

        log::info!("new connection from {other}");

        let store = store.clone();
        let svc = hyper::service::service_fn(move |req| router::handle(store.clone(), req).map(Ok::<_, Infallible>));
        let conn = http.serve_connection(TokioIo::new(stream), svc);
        tokio::spawn(async move {
            if let Err(err) = conn.await {
                log::error!("connection from {other} failed: {err}");
            }
        });
    }
}

//! Per-request tracing.

use std::future::Future;
use std::time::Instant;

use tracing::{Instrument, info, info_span};

use crate::method::Method;
use crate::response::Response;

/// Runs `fut` inside an `http.request` span and logs its outcome.
///
/// Everything the handler logs is attached to the span, so a subscriber
/// sees method and path on every event of the request.
pub async fn instrument<F>(method: Method, path: &str, fut: F) -> Response
where
    F: Future<Output = Response>,
{
    let span = info_span!("http.request", %method, path);
    let start = Instant::now();

    let res = fut.instrument(span.clone()).await;

    let status: u16 = res.status_code().into();
    let latency_us = start.elapsed().as_micros() as u64;
    span.in_scope(|| info!(status, latency_us, "request completed"));
    res
}

/// The webhook server module exposes the admission endpoint over warp
use std::{future::Future, net::SocketAddr, path::Path, sync::Arc};

use tracing::{error, info};
use warp::{
    http::StatusCode,
    hyper::body::Bytes,
    reply::{self, Reply, Response},
    Filter, Rejection,
};

use crate::{config::ConfigTable, error::AdmitError, mutate::admit};

/// Largest request body accepted, matching the API server's own request size limit.
pub const MAX_BODY_BYTES: u64 = 3 * 1024 * 1024;

/// Answer one request body. Failures become a 500 carrying the error text, not an admission denial.
pub fn serve_review(body: &[u8], table: &ConfigTable) -> Response {
    match admit(body, table) {
        Ok(encoded) => reply::with_header(encoded, "content-type", "application/json").into_response(),
        Err(err) => failure(err),
    }
}

fn failure(err: AdmitError) -> Response {
    error!("Error: {:?}", err);
    reply::with_status(err.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response()
}

/// POST on any path is an admission review.
pub fn routes(
    table: Arc<ConfigTable>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::post()
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .map(move |body: Bytes| serve_review(&body, &table))
        .recover(|rejection: Rejection| async move {
            // Bodies warp could not read never reach the handler.
            let err = AdmitError::TransportRead(format!("{:?}", rejection));
            Ok::<_, Rejection>(failure(err))
        })
        .with(warp::trace::request())
}

pub fn webhook_task(
    tls_cert: &Path,
    tls_key: &Path,
    addr: SocketAddr,
    table: Arc<ConfigTable>,
) -> impl Future<Output = ()> + 'static {
    info!("Starting webhook server on {}", addr);
    let (_addr, fut) = warp::serve(routes(table))
        .tls()
        .cert_path(tls_cert)
        .key_path(tls_key)
        .bind_with_graceful_shutdown(addr, async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for CTRL+C: {}", err);
            }
        });
    fut
}

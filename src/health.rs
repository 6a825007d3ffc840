//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can the store be reached right now? |

use tracing::warn;

use crate::todo::SharedStore;
use crate::{Request, Response, Status};

/// Always returns `200 OK` with body `"ok"`. If the process can respond to
/// HTTP at all, it is alive.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Returns `200 OK` with body `"ready"` while the store answers a ping,
/// `503 Service Unavailable` otherwise.
pub async fn readiness(store: SharedStore, _req: Request) -> Response {
    match store.ping().await {
        Ok(()) => Response::text("ready"),
        Err(e) => {
            warn!("readiness check failed: {e}");
            Response::status(Status::ServiceUnavailable)
        }
    }
}

//! Liveness and readiness probes.
//!
//! Readiness requires both the startup flag and a successful read of the
//! settings record, so a stalled record store takes the instance out of
//! rotation without restarting it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use tracing::warn;

use crate::domain::ports::RecordStore;
use crate::domain::records::{Collection, GENERAL_INFO_KEY};

/// Probe state shared across workers.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    records: Arc<dyn RecordStore>,
}

impl HealthState {
    /// Start live but not ready.
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            records,
        }
    }

    /// Mark startup as complete.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness probes, e.g. while draining for shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    async fn store_reachable(&self) -> bool {
        match self.records.get(Collection::Events, GENERAL_INFO_KEY).await {
            Ok(_) => true,
            Err(error) => {
                warn!(%error, "readiness check could not reach the record store");
                false
            }
        }
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Ready to serve traffic"),
        (status = 503, description = "Starting up or record store unreachable")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    let ok = state.is_ready() && state.store_reachable().await;
    HealthState::probe_response(ok)
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is alive"),
        (status = 503, description = "Shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;

    use crate::domain::ports::{MockRecordStore, RecordStoreError};

    fn store(reachable: bool) -> Arc<dyn RecordStore> {
        let mut store = MockRecordStore::new();
        store.expect_get().returning(move |_, _| {
            if reachable {
                Ok(None)
            } else {
                Err(RecordStoreError::timeout("deadline elapsed"))
            }
        });
        Arc::new(store)
    }

    async fn probe(state: HealthState, uri: &str) -> (StatusCode, Option<String>) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(ready)
                .service(live),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let cache = res
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        (res.status(), cache)
    }

    #[rstest]
    #[case(false, true, StatusCode::SERVICE_UNAVAILABLE)]
    #[case(true, false, StatusCode::SERVICE_UNAVAILABLE)]
    #[case(true, true, StatusCode::OK)]
    #[actix_web::test]
    async fn readiness_needs_startup_and_store(
        #[case] started: bool,
        #[case] reachable: bool,
        #[case] expected: StatusCode,
    ) {
        let state = HealthState::new(store(reachable));
        if started {
            state.mark_ready();
        }
        let (status, cache) = probe(state, "/health/ready").await;
        assert_eq!(status, expected);
        assert_eq!(cache.as_deref(), Some("no-store"));
    }

    #[rstest]
    #[actix_web::test]
    async fn liveness_fails_after_mark_unhealthy() {
        let state = HealthState::new(store(true));
        assert_eq!(probe(state, "/health/live").await.0, StatusCode::OK);

        let state = HealthState::new(store(true));
        state.mark_unhealthy();
        assert_eq!(
            probe(state, "/health/live").await.0,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}

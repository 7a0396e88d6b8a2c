use std::sync::Arc;

use axum::{body::Bytes, http::StatusCode, Json};
use dispatch::{DispatchCore, DispatchError};
use shared::error::ApiError;
use tokio::sync::Semaphore;
use tracing::error;

use crate::config::{HandlerExecution, Settings};

pub(crate) type HttpError = (StatusCode, Json<ApiError>);

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) core: DispatchCore,
    execution: HandlerExecution,
    permits: Arc<Semaphore>,
}

impl AppState {
    pub(crate) fn new(core: DispatchCore, settings: &Settings) -> Self {
        Self {
            core,
            execution: settings.handler_execution,
            permits: Arc::new(Semaphore::new(settings.max_concurrent_handlers)),
        }
    }

    /// Run one update request through the dispatch core under the configured
    /// execution mode.
    pub(crate) async fn execute(&self, body: Bytes) -> Result<Vec<u8>, HttpError> {
        match self.execution {
            HandlerExecution::Inline => self.core.handle(&body).map_err(dispatch_failure),
            HandlerExecution::BlockingPool => {
                let permit = Arc::clone(&self.permits)
                    .acquire_owned()
                    .await
                    .map_err(|_| internal("callback pool is shut down"))?;
                let core = self.core.clone();
                let result = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    core.handle(&body)
                })
                .await
                .map_err(|e| {
                    error!(error = %e, "callback task did not complete");
                    internal("callback task did not complete")
                })?;
                result.map_err(dispatch_failure)
            }
        }
    }
}

pub(crate) fn status_for(err: &DispatchError) -> StatusCode {
    match err {
        DispatchError::UnknownTarget(_) => StatusCode::NOT_FOUND,
        DispatchError::MissingValue(_)
        | DispatchError::MalformedRequest(_)
        | DispatchError::HandlerArguments { .. } => StatusCode::BAD_REQUEST,
        DispatchError::DuplicateTarget(_)
        | DispatchError::HandlerFailed { .. }
        | DispatchError::Codec(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn dispatch_failure(err: DispatchError) -> HttpError {
    if !err.is_client_error() {
        error!(%err, "dispatch failed");
    }
    (status_for(&err), Json(err.into()))
}

fn internal(message: &str) -> HttpError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::internal(message)),
    )
}

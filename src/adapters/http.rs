use crate::domain::model::{Port, SyncReport};
use crate::domain::ports::PortDomainService;
use crate::utils::error::{ErrorKind, PortError};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::io;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    service: Arc<dyn PortDomainService>,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(service: Arc<dyn PortDomainService>, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ports", post(sync_ports))
        .route("/ports/:unloc", get(get_port_by_unloc))
        .with_state(state)
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for PortError {
    fn into_response(self) -> Response {
        (status_for(self.kind()), self.to_string()).into_response()
    }
}

/// 請求本文直接串流給同步引擎，不會整包讀進記憶體
async fn sync_ports(
    State(state): State<AppState>,
    body: Body,
) -> Result<Json<SyncReport>, PortError> {
    let chunks = body
        .into_data_stream()
        .map(|chunk| chunk.map_err(io::Error::other));
    let mut reader = StreamReader::new(chunks);

    let cancel = state.shutdown.child_token();
    let report = state.service.sync_ports(&mut reader, &cancel).await?;
    Ok(Json(report))
}

async fn get_port_by_unloc(
    State(state): State<AppState>,
    Path(unloc): Path<String>,
) -> Result<Json<Port>, PortError> {
    let port = state.service.get_port(&unloc).await?;
    Ok(Json(port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ErrorKind::Internal),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_carries_message() {
        let response = PortError::NotFound {
            unloc: "AEAJM".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = PortError::EmptyInput.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

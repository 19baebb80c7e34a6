use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tidewave_core::{CoreError, Rejection};
use tidewave_types::api::ErrorQuery;
use tracing::{debug, error};

use crate::views::StatusPage;

/// Failure of an HTML handler, rendered as the status page.
#[derive(Debug)]
pub struct PageError(pub StatusCode);

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let page = StatusPage::new(self.0, None);
        match page.render() {
            Ok(html) => (self.0, Html(html)).into_response(),
            Err(e) => {
                error!("Failed to render status page: {}", e);
                (self.0, self.0.canonical_reason().unwrap_or("error")).into_response()
            }
        }
    }
}

impl From<StatusCode> for PageError {
    fn from(status: StatusCode) -> Self {
        Self(status)
    }
}

impl From<anyhow::Error> for PageError {
    fn from(err: anyhow::Error) -> Self {
        Self(status_for(&err))
    }
}

/// Map a storage or core failure to the status the client sees, logging the
/// ones that are the server's fault.
pub fn status_for(err: &anyhow::Error) -> StatusCode {
    match err.downcast_ref::<CoreError>() {
        Some(CoreError::AllocationRetryExhausted { requested, attempts }) => {
            error!("No free splash id near {} after {} attempts", requested, attempts);
            StatusCode::SERVICE_UNAVAILABLE
        }
        Some(CoreError::InvalidScope(scope)) => {
            debug!("Unknown scope {}", scope);
            StatusCode::NOT_FOUND
        }
        Some(CoreError::Rejected(_)) => StatusCode::BAD_REQUEST,
        Some(CoreError::StorageUnavailable(msg)) => {
            error!("Storage unavailable: {}", msg);
            StatusCode::INTERNAL_SERVER_ERROR
        }
        None => {
            error!("Request failed: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn render<T: Template>(page: &T) -> Result<Html<String>, PageError> {
    page.render().map(Html).map_err(|e| {
        error!("Template render error: {}", e);
        PageError(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

/// The validation failure carried by `err`, if that is what it is.
pub fn rejection(err: &anyhow::Error) -> Option<Rejection> {
    match err.downcast_ref::<CoreError>() {
        Some(CoreError::Rejected(r)) => Some(*r),
        _ => None,
    }
}

/// Message for a `?error=<code>` query. Unknown codes show nothing.
pub fn error_message(query: &ErrorQuery) -> Option<&'static str> {
    query
        .error
        .as_deref()
        .and_then(Rejection::from_code)
        .map(Rejection::message)
}
